//! Runtime configuration parameters
//!
//! The three client-tunable refresh intervals for the AirSense system.
//! Values live for the process lifetime (defaults at cold start) and are
//! only replaced through a validated API update.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Lower bound for every interval.
pub const MIN_INTERVAL_MS: u32 = 1000;
/// Upper bound for the log-persist interval.
pub const MAX_LOG_INTERVAL_MS: u32 = 99_999_000;

/// Core runtime configuration, in the wire shape the API serves:
/// `{"sensorInt":5000,"graphInt":60000,"logInt":1800000}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Client sensor refresh interval (milliseconds)
    #[serde(rename = "sensorInt")]
    pub sensor_interval_ms: u32,
    /// Client graph refresh interval (milliseconds)
    #[serde(rename = "graphInt")]
    pub graph_interval_ms: u32,
    /// Server log persist interval (milliseconds)
    #[serde(rename = "logInt")]
    pub log_interval_ms: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sensor_interval_ms: 5_000,
            graph_interval_ms: 60_000,
            // 5 day log at one entry per half hour
            log_interval_ms: 1_800_000,
        }
    }
}

impl RuntimeConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensor_interval_ms < MIN_INTERVAL_MS
            || self.graph_interval_ms < MIN_INTERVAL_MS
            || self.log_interval_ms < MIN_INTERVAL_MS
            || self.log_interval_ms > MAX_LOG_INTERVAL_MS
        {
            return Err(ConfigError::OutOfRange);
        }
        Ok(())
    }

    /// Parse a JSON update payload and, if it validates, replace all three
    /// intervals at once. On any error the current values are untouched.
    pub fn apply_update(&mut self, payload: &str) -> Result<(), ConfigError> {
        let candidate: RuntimeConfig =
            serde_json::from_str(payload).map_err(|_| ConfigError::Malformed)?;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
}

/// Why a configuration update was rejected. The API layer maps each
/// variant to its own error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Payload was not parseable as the three required fields.
    Malformed,
    /// A field failed range validation.
    OutOfRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "payload not parseable"),
            Self::OutOfRange => write!(f, "interval out of range"),
        }
    }
}
