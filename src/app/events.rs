//! Outbound application events.
//!
//! The [`Monitor`](super::service::Monitor) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — today that is the serial log.

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// A fresh calibrated reading was acquired and cached.
    ReadingAcquired { iaq: f32, iaq_accuracy: u8 },

    /// A persisted calibration blob was handed back to the fusion algorithm.
    CalibrationRestored,

    /// No valid calibration was found; the storage slot was zeroed.
    CalibrationErased,

    /// The calibration blob was persisted (`sequence` counts saves since boot).
    CalibrationSaved { sequence: u32 },

    /// The reading history was reloaded from flash.
    LogRestored,

    /// The stored history was unusable and was re-seeded with nominal values.
    LogReinitialized,

    /// The in-memory history was written to flash.
    LogPersisted { entries: usize },

    /// A history write failed; the in-memory copy stays authoritative.
    LogPersistFailed,

    /// The system entered the terminal inactive state.
    Halted(&'static str),
}
