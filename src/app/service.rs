//! Application service — the acquisition core.
//!
//! [`Monitor`] owns all mutable state of the system: the current reading,
//! the rolling history, the runtime configuration, and the calibration
//! store. One [`tick`](Monitor::tick) services one fresh-reading cycle.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │        Monitor          │
//! StoragePort ◀──▶│  cache · log · config   │◀──▶ LogMedium
//!                 └────────────────────────┘
//! ```

use log::{error, warn};

use crate::calibration::{CalibrationState, CalibrationStore};
use crate::config::{ConfigError, RuntimeConfig};
use crate::history::ReadingLog;
use crate::reading::Reading;

use super::events::AppEvent;
use super::ports::{
    ClockPort, EventSink, LogMedium, Measurement, SensorHealth, SensorPort, StoragePort,
};

/// The application service orchestrates every acquisition cycle.
pub struct Monitor {
    config: RuntimeConfig,
    current: Reading,
    log: ReadingLog,
    calibration: CalibrationStore,
    last_log_persist_ms: u64,
    active: bool,
    halt_reason: Option<&'static str>,
}

impl Monitor {
    /// Construct the service with default configuration and a nominal
    /// reading in every slot. Call the `init_*` methods next.
    pub fn new(clock: &impl ClockPort) -> Self {
        let seed = Reading::nominal(clock.timestamp());
        Self {
            config: RuntimeConfig::default(),
            current: seed.clone(),
            log: ReadingLog::filled_with(seed),
            calibration: CalibrationStore::new(),
            last_log_persist_ms: 0,
            active: true,
            halt_reason: None,
        }
    }

    // ── Boot-time initialisation ──────────────────────────────

    /// Restore persisted calibration into the sensor collaborator.
    ///
    /// An unrecoverable sensor status here halts the system; a missing or
    /// invalid record is normal cold-start behavior.
    pub fn init_calibration(
        &mut self,
        storage: &mut impl StoragePort,
        sensor: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) {
        match self.calibration.load(storage, sensor) {
            Ok(CalibrationState::Present) => sink.emit(&AppEvent::CalibrationRestored),
            Ok(CalibrationState::Absent) => sink.emit(&AppEvent::CalibrationErased),
            Err(e) => {
                error!("calibration restore failed: {e}");
                self.halt("calibration restore failed", sink);
            }
        }
    }

    /// Load the reading history from flash, or re-seed it with nominal
    /// values (stamped now) and persist the fresh copy immediately so the
    /// stored document matches memory.
    pub fn init_log(
        &mut self,
        medium: &mut impl LogMedium,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        match medium.load() {
            Ok(document) => match self.log.restore(&document) {
                Ok(()) => {
                    sink.emit(&AppEvent::LogRestored);
                    return;
                }
                Err(e) => warn!("stored log unusable ({e:?}), re-initialising"),
            },
            Err(e) => warn!("no stored log ({e}), initialising"),
        }

        self.log = ReadingLog::filled_with(Reading::nominal(clock.timestamp()));
        sink.emit(&AppEvent::LogReinitialized);
        self.persist_log(medium, clock.uptime_ms(), sink);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one acquisition cycle: poll the sensor, stamp and cache the
    /// reading, drive calibration persistence, and persist the history when
    /// its interval has elapsed. A tick without a fresh reading only
    /// re-checks sensor health.
    pub fn tick(
        &mut self,
        sensor: &mut impl SensorPort,
        storage: &mut impl StoragePort,
        medium: &mut impl LogMedium,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        if !self.active {
            return;
        }

        let Some(sample) = sensor.poll() else {
            match sensor.status() {
                SensorHealth::Warning(code) => warn!("sensor warning code {code}"),
                SensorHealth::Fault(code) => warn!("sensor fault code {code}"),
                SensorHealth::Ok => {}
            }
            return;
        };

        let now_ms = clock.uptime_ms();
        self.current = stamp(sample, clock);
        sink.emit(&AppEvent::ReadingAcquired {
            iaq: sample.iaq,
            iaq_accuracy: sample.iaq_accuracy,
        });

        match self
            .calibration
            .maybe_save(sample.iaq_accuracy, now_ms, storage, sensor)
        {
            Ok(true) => sink.emit(&AppEvent::CalibrationSaved {
                sequence: self.calibration.saves_performed(),
            }),
            Ok(false) => {}
            Err(e) => {
                error!("calibration save failed: {e}");
                self.halt("calibration save failed", sink);
                return;
            }
        }

        if now_ms - self.last_log_persist_ms > u64::from(self.config.log_interval_ms) {
            self.log.append(self.current.clone());
            self.persist_log(medium, now_ms, sink);
            self.last_log_persist_ms = now_ms;
        }
    }

    /// Enter the terminal inactive state: no further ticks are serviced and
    /// the API layer answers every request with a halt notice. The process
    /// itself keeps running.
    pub fn halt(&mut self, reason: &'static str, sink: &mut impl EventSink) {
        error!("halting: {reason}");
        self.active = false;
        self.halt_reason = Some(reason);
        sink.emit(&AppEvent::Halted(reason));
    }

    // ── Queries & configuration ───────────────────────────────

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn halt_reason(&self) -> Option<&'static str> {
        self.halt_reason
    }

    /// The most recent reading.
    pub fn current(&self) -> &Reading {
        &self.current
    }

    /// The rolling history, oldest first.
    pub fn log(&self) -> &ReadingLog {
        &self.log
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Apply a validated configuration update (all three intervals replaced
    /// together, or nothing changes).
    pub fn update_config(&mut self, payload: &str) -> Result<(), ConfigError> {
        self.config.apply_update(payload)
    }

    // ── Internal ──────────────────────────────────────────────

    fn persist_log(&mut self, medium: &mut impl LogMedium, now_ms: u64, sink: &mut impl EventSink) {
        let result = medium
            .replace()
            .and_then(|mut w| self.log.persist(&mut w, now_ms / 1000));
        match result {
            Ok(()) => sink.emit(&AppEvent::LogPersisted {
                entries: crate::history::LOG_SIZE,
            }),
            Err(e) => {
                warn!("log persist failed: {e}");
                sink.emit(&AppEvent::LogPersistFailed);
            }
        }
    }
}

/// Attach the current wall-clock time to a raw sample.
fn stamp(sample: Measurement, clock: &impl ClockPort) -> Reading {
    Reading {
        time: clock.timestamp(),
        temperature_c: sample.temperature_c,
        pressure_hpa: sample.pressure_hpa,
        humidity_pct: sample.humidity_pct,
        iaq: sample.iaq,
        iaq_accuracy: sample.iaq_accuracy,
        co2_ppm: sample.co2_ppm,
        voc_ppm: sample.voc_ppm,
    }
}
