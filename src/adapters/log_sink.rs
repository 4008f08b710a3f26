//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ReadingAcquired { iaq, iaq_accuracy } => {
                info!("READ  | IAQ={iaq:.1} acc={iaq_accuracy}");
            }
            AppEvent::CalibrationRestored => info!("CAL   | persisted state restored"),
            AppEvent::CalibrationErased => info!("CAL   | no state, cold start"),
            AppEvent::CalibrationSaved { sequence } => {
                info!("CAL   | state persisted (save #{sequence})");
            }
            AppEvent::LogRestored => info!("LOG   | history reloaded from flash"),
            AppEvent::LogReinitialized => info!("LOG   | history re-seeded with nominal values"),
            AppEvent::LogPersisted { entries } => info!("LOG   | {entries} entries persisted"),
            AppEvent::LogPersistFailed => warn!("LOG   | persist failed, memory copy authoritative"),
            AppEvent::Halted(reason) => warn!("HALT  | {reason}"),
        }
    }
}
