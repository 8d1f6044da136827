// MIT License - Copyright (c) 2026 Peter Wright
// Eufy Security bridge

pub mod device;
pub mod station;

pub use device::Device;
pub use station::Station;
