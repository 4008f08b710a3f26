//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Monitor (domain)
//! ```
//!
//! Driven adapters (the gas sensor, non-volatile storage, the flash
//! filesystem, the system clock, event sinks) implement these traits. The
//! [`Monitor`](super::service::Monitor) consumes them via generics, so the
//! domain core never touches hardware directly.

use crate::app::events::AppEvent;
use crate::reading::Timestamp;

/// Size of the fusion library's opaque state blob. The firmware never
/// inspects its contents; the value only matters for the storage layout
/// (one length-sentinel byte followed by the blob).
pub const CALIBRATION_BLOB_SIZE: usize = 139;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One calibrated sample from the fusion pipeline, not yet timestamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub pressure_hpa: f32,
    pub humidity_pct: f32,
    pub iaq: f32,
    pub iaq_accuracy: u8,
    pub co2_ppm: f32,
    pub voc_ppm: f32,
}

/// Health of the sensor collaborator, mapped from the vendor status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorHealth {
    Ok,
    /// Degraded but recoverable (positive vendor status). Logged, processing
    /// continues.
    Warning(i32),
    /// Unrecoverable (negative vendor status).
    Fault(i32),
}

/// Fusion sample-rate profiles supported by the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    /// One output set every 3 s.
    LowPower,
    /// One output set every 300 s.
    UltraLowPower,
}

/// Capability interface of the sensor collaborator. The fusion algorithm
/// behind it is opaque: the domain only sees calibrated outputs, a health
/// status, and the calibration blob as an uninterpreted byte buffer.
pub trait SensorPort {
    /// Select the sample-rate profile. Called once during bring-up.
    fn configure(&mut self, rate: SampleRate) -> Result<(), SensorError>;

    /// A fresh calibrated sample, or `None` when no new output is ready.
    fn poll(&mut self) -> Option<Measurement>;

    /// Current collaborator health.
    fn status(&mut self) -> SensorHealth;

    /// Copy the current calibration state into `blob`.
    fn calibration(&mut self, blob: &mut [u8; CALIBRATION_BLOB_SIZE]) -> Result<(), SensorError>;

    /// Hand a previously persisted calibration state back to the algorithm.
    fn restore_calibration(&mut self, blob: &[u8; CALIBRATION_BLOB_SIZE])
    -> Result<(), SensorError>;
}

/// Errors from [`SensorPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The vendor algorithm reported an unrecoverable status code.
    Unrecoverable(i32),
    /// The I2C transport failed.
    Bus,
    /// No device with the expected chip id answered on the bus.
    NotDetected,
}

impl core::fmt::Display for SensorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unrecoverable(code) => write!(f, "unrecoverable status {code}"),
            Self::Bus => write!(f, "bus transfer failed"),
            Self::NotDetected => write!(f, "chip id mismatch"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value blob storage. Writes commit before returning.
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write and commit a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;
}

/// Errors from [`StoragePort`] and [`LogMedium`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key or file does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Log medium port (driven adapter: domain ↔ flash filesystem)
// ───────────────────────────────────────────────────────────────

/// Home of the persisted log document.
///
/// `replace` removes any existing document and opens a fresh writer — the
/// erase-then-create sequence means a power cut mid-write loses the old
/// copy. Boot-time restore falls back to re-initialisation in that case.
pub trait LogMedium {
    type Writer: std::io::Write;

    /// Erase the stored document and open a writer for its replacement.
    fn replace(&mut self) -> Result<Self::Writer, StorageError>;

    /// The stored document, in full.
    fn load(&self) -> Result<String, StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain ↔ system time)
// ───────────────────────────────────────────────────────────────

/// Wall-clock and monotonic time queries.
pub trait ClockPort {
    /// Current UTC time as `%FT%T.000Z`.
    fn timestamp(&self) -> Timestamp;

    /// Milliseconds since boot (monotonic).
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port. Adapters
/// decide where they go (serial log today; anything else tomorrow).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
