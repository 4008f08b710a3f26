//! Unified error types for the AirSense firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level acquisition loop's error handling uniform. All variants are
//! `Copy` so they can be threaded through the monitor without allocation.

use core::fmt;

use crate::app::ports::{SensorError, StorageError};
use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sensor collaborator reported an unrecoverable condition.
    Sensor(SensorError),
    /// Non-volatile storage read/write/commit failed.
    Storage(StorageError),
    /// Configuration payload was malformed or out of range.
    Config(ConfigError),
    /// Subsystem initialisation failed at boot.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
