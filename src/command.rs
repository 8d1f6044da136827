// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::SecurityClient;
use crate::config::LoginOptions;
use crate::constants::PropertyName;
use crate::error::{BridgeError, Result};
use crate::message::{CommandRequest, CommandResult, Lenient};
use crate::value::ClientValue;

/// Commands accepted from the host, one per client operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    SetStationProperty,
    SetDeviceProperty,
    GetConfig,
    GetVersion,
    IsPushConnected,
    IsConnected,
    Connect,
    Close,
    SetCameraMaxLivestreamDuration,
    GetCameraMaxLivestreamDuration,
    RefreshCloudData,
    /// Older name of `refresh cloud data`
    RefreshData,
    IsStationConnected,
    ConnectToStation,
    GetStation,
    GetStations,
    GetStationDevice,
    GetDevice,
    GetDevices,
}

impl Command {
    pub const ALL: [Command; 19] = [
        Self::SetStationProperty,
        Self::SetDeviceProperty,
        Self::GetConfig,
        Self::GetVersion,
        Self::IsPushConnected,
        Self::IsConnected,
        Self::Connect,
        Self::Close,
        Self::SetCameraMaxLivestreamDuration,
        Self::GetCameraMaxLivestreamDuration,
        Self::RefreshCloudData,
        Self::RefreshData,
        Self::IsStationConnected,
        Self::ConnectToStation,
        Self::GetStation,
        Self::GetStations,
        Self::GetStationDevice,
        Self::GetDevice,
        Self::GetDevices,
    ];

    /// Look up a command by its exact wire name.
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// The wire name (e.g., "get stations").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetStationProperty => "set station property",
            Self::SetDeviceProperty => "set device property",
            Self::GetConfig => "get config",
            Self::GetVersion => "get version",
            Self::IsPushConnected => "is push connected",
            Self::IsConnected => "is connected",
            Self::Connect => "connect",
            Self::Close => "close",
            Self::SetCameraMaxLivestreamDuration => "set camera max livestream duration",
            Self::GetCameraMaxLivestreamDuration => "get camera max livestream duration",
            Self::RefreshCloudData => "refresh cloud data",
            Self::RefreshData => "refresh data",
            Self::IsStationConnected => "is station connected",
            Self::ConnectToStation => "connect to station",
            Self::GetStation => "get station",
            Self::GetStations => "get stations",
            Self::GetStationDevice => "get station device",
            Self::GetDevice => "get device",
            Self::GetDevices => "get devices",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run one inbound command against the client and build its response.
///
/// Returns `None` only when a property setter names an unknown property:
/// that request is dropped with a warning and the client is never called.
/// Every other failure, including an unknown command, becomes an error result.
pub async fn dispatch<C>(client: &C, request: &CommandRequest) -> Option<CommandResult>
where
    C: SecurityClient + ?Sized,
{
    match execute(client, request).await {
        Ok(value) => Some(CommandResult::success(
            request.command.clone(),
            value.unwrap_properties(),
        )),
        Err(BridgeError::UnknownProperty { target, name }) => {
            warn!("Cannot set unknown {target} property: \"{name}\"");
            None
        }
        Err(e) => {
            warn!("Command \"{}\" failed: {e}", request.command);
            Some(CommandResult::failure(request.command.clone(), e.to_payload()))
        }
    }
}

async fn execute<C>(client: &C, req: &CommandRequest) -> Result<ClientValue>
where
    C: SecurityClient + ?Sized,
{
    let command = Command::from_name(&req.command).ok_or_else(|| BridgeError::UnknownCommand {
        command: req.command.clone(),
    })?;
    debug!("Command: {command}");

    let value: ClientValue = match command {
        Command::SetStationProperty => {
            let name = property_name("station", req)?;
            let station_sn = required(command, "stationSN", &req.station_sn)?;
            let value = required_value(command, req)?;
            client.set_station_property(station_sn, name, value.clone()).await?;
            ClientValue::Undefined
        }
        Command::SetDeviceProperty => {
            let name = property_name("device", req)?;
            let device_sn = required(command, "deviceSN", &req.device_sn)?;
            let value = required_value(command, req)?;
            client.set_device_property(device_sn, name, value.clone()).await?;
            ClientValue::Undefined
        }
        Command::GetConfig => {
            let mut config = serde_json::to_value(client.get_config().await?)?;
            if let Value::Object(map) = &mut config {
                map.remove("username");
                map.remove("password");
            }
            config.into()
        }
        Command::GetVersion => client.get_version().await?.into(),
        Command::IsPushConnected => client.is_push_connected().await?.into(),
        Command::IsConnected => client.is_connected().await?.into(),
        Command::Connect => client.connect(login_options(command, req)?).await?.into(),
        Command::Close => client.close().await?.into(),
        Command::SetCameraMaxLivestreamDuration => {
            let seconds = *required(command, "seconds", &req.seconds)?;
            client.set_camera_max_livestream_duration(seconds).await?.into()
        }
        Command::GetCameraMaxLivestreamDuration => {
            client.get_camera_max_livestream_duration().await?.into()
        }
        Command::RefreshCloudData | Command::RefreshData => {
            client.refresh_cloud_data().await?.into()
        }
        Command::IsStationConnected => {
            let station_sn = required(command, "stationSN", &req.station_sn)?;
            client.is_station_connected(station_sn).await?.into()
        }
        Command::ConnectToStation => {
            let station_sn = required(command, "stationSN", &req.station_sn)?;
            let connection_type =
                optional(command, "p2pConnectionType", &req.p2p_connection_type)?.copied();
            client.connect_to_station(station_sn, connection_type).await?.into()
        }
        Command::GetStation => {
            let station_sn = required(command, "stationSN", &req.station_sn)?;
            client.get_station(station_sn).await?.into()
        }
        Command::GetStations => client.get_stations().await?.into(),
        Command::GetStationDevice => {
            let station_sn = required(command, "stationSN", &req.station_sn)?;
            let channel = *required(command, "channel", &req.channel)?;
            client.get_station_device(station_sn, channel).await?.into()
        }
        Command::GetDevice => {
            let device_sn = required(command, "deviceSN", &req.device_sn)?;
            client.get_device(device_sn).await?.into()
        }
        Command::GetDevices => client.get_devices().await?.into(),
    };

    Ok(value)
}

fn optional<'a, T>(
    command: Command,
    field: &'static str,
    value: &'a Option<Lenient<T>>,
) -> Result<Option<&'a T>> {
    match value {
        None => Ok(None),
        Some(Lenient::Valid(v)) => Ok(Some(v)),
        Some(Lenient::Invalid(raw)) => Err(BridgeError::InvalidField {
            command: command.as_str(),
            field,
            reason: format!("unexpected value {raw}"),
        }),
    }
}

fn required<'a, T>(
    command: Command,
    field: &'static str,
    value: &'a Option<Lenient<T>>,
) -> Result<&'a T> {
    optional(command, field, value)?.ok_or(BridgeError::MissingField {
        command: command.as_str(),
        field,
    })
}

/// A setter's `value`; an explicit `null` counts as present.
fn required_value(command: Command, req: &CommandRequest) -> Result<&Value> {
    req.value.as_ref().ok_or(BridgeError::MissingField {
        command: command.as_str(),
        field: "value",
    })
}

/// Validate a setter's property name before anything else about the request.
///
/// An absent or non-string name is as unknown as a misspelled one.
fn property_name(target: &'static str, req: &CommandRequest) -> Result<PropertyName> {
    let name = match &req.name {
        Some(Lenient::Valid(name)) => name.clone(),
        Some(Lenient::Invalid(raw)) => raw.to_string(),
        None => String::new(),
    };
    PropertyName::from_name(&name).ok_or(BridgeError::UnknownProperty { target, name })
}

/// Login options for `connect`, with a top-level `verifyCode` folded in.
fn login_options(command: Command, req: &CommandRequest) -> Result<Option<LoginOptions>> {
    let options = optional(command, "loginOptions", &req.login_options)?;
    let code = optional(command, "verifyCode", &req.verify_code)?;
    Ok(match (options, code) {
        (None, None) => None,
        (options, code) => {
            let mut options = options.cloned().unwrap_or_default();
            if let Some(code) = code {
                options.verify_code = Some(code.clone());
            }
            Some(options)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_resolve() {
        for command in Command::ALL {
            assert_eq!(Command::from_name(command.as_str()), Some(command));
        }
    }

    #[test]
    fn test_command_lookup_is_exact() {
        assert_eq!(Command::from_name("get stations"), Some(Command::GetStations));
        assert_eq!(Command::from_name("Get Stations"), None);
        assert_eq!(Command::from_name("get stations "), None);
        assert_eq!(Command::from_name("get image"), None);
    }

    #[test]
    fn test_verify_code_folds_into_login_options() {
        let mut req = CommandRequest::new("connect");
        assert_eq!(login_options(Command::Connect, &req).unwrap(), None);

        req.verify_code = Some("123456".to_string().into());
        assert_eq!(
            login_options(Command::Connect, &req).unwrap(),
            Some(LoginOptions {
                verify_code: Some("123456".to_string()),
                ..LoginOptions::default()
            })
        );

        let req: CommandRequest = serde_json::from_value(serde_json::json!({
            "command": "connect",
            "loginOptions": { "captcha": { "captchaId": "id1", "captchaCode": "abcd" }, "force": true }
        }))
        .unwrap();
        let options = login_options(Command::Connect, &req).unwrap().unwrap();
        assert!(options.force);
        assert_eq!(options.captcha.unwrap().captcha_code, "abcd");
    }

    #[test]
    fn test_mistyped_login_options_are_invalid() {
        let req: CommandRequest = serde_json::from_value(serde_json::json!({
            "command": "connect",
            "loginOptions": "force"
        }))
        .unwrap();
        assert!(matches!(
            login_options(Command::Connect, &req),
            Err(BridgeError::InvalidField { field: "loginOptions", .. })
        ));
    }
}
