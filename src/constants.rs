// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use std::fmt;

use serde::{Deserialize, Serialize};

/// `event` value of every command response envelope.
pub const EVENT_COMMAND_RESULT: &str = "command result";

/// Field that collects event arguments beyond the declared names.
pub const OTHER_FIELD: &str = "other";

/// Field of the outbound payload holding the event name.
pub const EVENT_FIELD: &str = "event";

/// Client lifecycle events the node reacts to for status signalling.
pub const EVENT_CONNECT: &str = "connect";
pub const EVENT_CLOSE: &str = "close";
pub const EVENT_CONNECTION_ERROR: &str = "connection error";
pub const EVENT_TFA_REQUEST: &str = "tfa request";
pub const EVENT_CAPTCHA_REQUEST: &str = "captcha request";

/// Every property name the client accepts for station and device setters.
///
/// Setter requests naming anything else are rejected before reaching the client.
pub const PROPERTY_NAMES: &[&str] = &[
    // Common
    "name",
    "model",
    "serialNumber",
    "hardwareVersion",
    "softwareVersion",
    "type",
    // Device
    "stationSerialNumber",
    "enabled",
    "antitheftDetection",
    "autoNightvision",
    "nightvision",
    "battery",
    "batteryTemperature",
    "batteryLow",
    "batteryIsCharging",
    "lastChargingDays",
    "lastChargingTotalEvents",
    "lastChargingRecordedEvents",
    "lastChargingFalseEvents",
    "batteryUsageLastWeek",
    "locked",
    "motionDetected",
    "personDetected",
    "personName",
    "petDetected",
    "soundDetected",
    "cryingDetected",
    "ringing",
    "statusLed",
    "motionDetection",
    "motionDetectionType",
    "motionDetectionSensitivity",
    "motionTracking",
    "soundDetection",
    "soundDetectionType",
    "soundDetectionSensitivity",
    "petDetection",
    "rtspStream",
    "rtspStreamUrl",
    "watermark",
    "state",
    "stateChirpVolume",
    "stateChirpTone",
    "videoStreamingQuality",
    "videoRecordingQuality",
    "videoWdr",
    "lightSettingsEnable",
    "lightSettingsBrightnessManual",
    "lightSettingsBrightnessMotion",
    "lightSettingsBrightnessSchedule",
    "lightSettingsMotionTriggered",
    "lightSettingsMotionTriggeredDistance",
    "lightSettingsMotionTriggeredTimer",
    "microphone",
    "speaker",
    "speakerVolume",
    "ringtoneVolume",
    "audioRecording",
    "powerSource",
    "powerWorkingMode",
    "recordingEndClipMotionStops",
    "recordingClipLength",
    "recordingRetriggerInterval",
    "chargingStatus",
    "wifiRssi",
    "wifiSignalLevel",
    "sensorOpen",
    "sensorChangeTime",
    "motionSensorPirEvent",
    "basicLockStatus",
    "advancedLockStatus",
    "doorbellLedNightMode",
    "notificationType",
    "notificationPerson",
    "notificationPet",
    "notificationAllOtherMotion",
    "notificationCrying",
    "notificationAllSound",
    "notificationIntervalTime",
    "notificationRing",
    "notificationMotion",
    "chimeIndoor",
    "chimeHomebase",
    "chimeHomebaseRingtoneVolume",
    "chimeHomebaseRingtoneType",
    "rotationSpeed",
    "continuousRecording",
    "continuousRecordingType",
    "snooze",
    "snoozeTime",
    "pictureUrl",
    // Station
    "lanIpAddress",
    "macAddress",
    "guardMode",
    "currentMode",
    "timeFormat",
    "alarmVolume",
    "alarmTone",
    "promptVolume",
    "notificationSwitchModeSchedule",
    "notificationSwitchModeGeofence",
    "notificationSwitchModeApp",
    "notificationSwitchModeKeypad",
    "notificationStartAlarmDelay",
    "homeSecuritySettings",
    "awaySecuritySettings",
    "custom1SecuritySettings",
    "custom2SecuritySettings",
    "custom3SecuritySettings",
    "offSecuritySettings",
    "alarm",
    "alarmType",
    "alarmArmed",
    "alarmArmDelay",
    "alarmDelay",
    "alarmDelayType",
    "switchModeWithAccessCode",
    "autoEndAlarm",
    "turnOffAlarmWithButton",
    "sdStatus",
    "sdCapacity",
    "sdCapacityAvailable",
];

/// A property name known to the client.
///
/// Can only be obtained through [`PropertyName::from_name`], so a value of this
/// type is always a legal setter target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyName(&'static str);

impl PropertyName {
    pub fn from_name(s: &str) -> Option<Self> {
        PROPERTY_NAMES.iter().copied().find(|n| *n == s).map(Self)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// How the client sets up P2P sessions with stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum P2PConnectionType {
    /// 0 - Try the local network first, fall back to the cloud relay
    #[default]
    PreferLocal,
    /// 1 - Local network only
    OnlyLocal,
    /// 2 - Whichever path answers first
    Quickest,
}

impl P2PConnectionType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::PreferLocal),
            1 => Some(Self::OnlyLocal),
            2 => Some(Self::Quickest),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::PreferLocal => 0,
            Self::OnlyLocal => 1,
            Self::Quickest => 2,
        }
    }
}

impl From<P2PConnectionType> for u8 {
    fn from(t: P2PConnectionType) -> Self {
        t.code()
    }
}

impl TryFrom<u8> for P2PConnectionType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown P2P connection type: {code}"))
    }
}
