//! Sensor subsystem — the gas sensor collaborator behind [`SensorPort`].
//!
//! [`SensorPort`]: crate::app::ports::SensorPort

pub mod bme680;

pub use bme680::Bme680Sensor;
