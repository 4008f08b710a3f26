//! Sensor calibration persistence.
//!
//! The fusion algorithm needs its state blob restored after a power cycle
//! to resume accurate air-quality output without a multi-day recalibration.
//! The stored record is one length-sentinel byte followed by the opaque
//! blob; a sentinel equal to the expected blob size marks the record valid,
//! anything else means cold start.
//!
//! Save policy: the first save waits for full calibration (accuracy 3),
//! after which saves fire on a fixed grid of absolute offsets from boot —
//! `counter * period`, not `last_save + period` — four times a day.

use log::info;

use crate::app::ports::{
    CALIBRATION_BLOB_SIZE, SensorError, SensorHealth, SensorPort, StorageError, StoragePort,
};
use crate::error::Result;

/// Interval between periodic calibration saves: 360 minutes.
pub const STATE_SAVE_PERIOD_MS: u64 = 360 * 60 * 1000;

const CAL_NAMESPACE: &str = "airsense";
const CAL_KEY: &str = "calib";

/// Outcome of a boot-time [`CalibrationStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// A valid blob was found and applied to the sensor collaborator.
    Present,
    /// No valid record; storage was zeroed and the algorithm cold-starts.
    Absent,
}

/// Persists and restores the opaque calibration blob.
pub struct CalibrationStore {
    save_counter: u32,
}

impl CalibrationStore {
    pub fn new() -> Self {
        Self { save_counter: 0 }
    }

    /// Number of saves performed since boot.
    pub fn saves_performed(&self) -> u32 {
        self.save_counter
    }

    /// Restore persisted calibration into the sensor collaborator.
    ///
    /// A record whose sentinel does not match the expected blob size (or a
    /// missing/short record) yields `Absent` after a full zero erase. An
    /// unrecoverable sensor status while applying the blob is fatal — the
    /// caller must halt.
    pub fn load(
        &mut self,
        storage: &mut impl StoragePort,
        sensor: &mut impl SensorPort,
    ) -> Result<CalibrationState> {
        let mut record = [0u8; CALIBRATION_BLOB_SIZE + 1];
        let len = match storage.read(CAL_NAMESPACE, CAL_KEY, &mut record) {
            Ok(len) => len,
            Err(StorageError::NotFound) => 0,
            Err(e) => return Err(e.into()),
        };

        if len == CALIBRATION_BLOB_SIZE + 1 && record[0] as usize == CALIBRATION_BLOB_SIZE {
            info!("calibration: restoring persisted state");
            let mut blob = [0u8; CALIBRATION_BLOB_SIZE];
            blob.copy_from_slice(&record[1..]);
            sensor.restore_calibration(&blob)?;
            if let SensorHealth::Fault(code) = sensor.status() {
                return Err(SensorError::Unrecoverable(code).into());
            }
            Ok(CalibrationState::Present)
        } else {
            info!("calibration: no valid state, erasing");
            self.erase(storage)?;
            Ok(CalibrationState::Absent)
        }
    }

    /// Zero the whole record, sentinel included.
    pub fn erase(&self, storage: &mut impl StoragePort) -> core::result::Result<(), StorageError> {
        storage.write(CAL_NAMESPACE, CAL_KEY, &[0u8; CALIBRATION_BLOB_SIZE + 1])
    }

    /// Persist the current calibration if a save is due.
    ///
    /// Returns whether a save happened. The counter advances when a save
    /// slot is claimed, before the write is attempted — a failed write does
    /// not re-arm the same slot.
    pub fn maybe_save(
        &mut self,
        accuracy: u8,
        elapsed_ms: u64,
        storage: &mut impl StoragePort,
        sensor: &mut impl SensorPort,
    ) -> Result<bool> {
        let due = if self.save_counter == 0 {
            // First save waits for full calibration.
            accuracy >= 3
        } else {
            u64::from(self.save_counter) * STATE_SAVE_PERIOD_MS < elapsed_ms
        };
        if !due {
            return Ok(false);
        }
        self.save_counter += 1;

        let mut blob = [0u8; CALIBRATION_BLOB_SIZE];
        sensor.calibration(&mut blob)?;
        if let SensorHealth::Fault(code) = sensor.status() {
            return Err(SensorError::Unrecoverable(code).into());
        }

        let mut record = [0u8; CALIBRATION_BLOB_SIZE + 1];
        record[0] = CALIBRATION_BLOB_SIZE as u8;
        record[1..].copy_from_slice(&blob);
        storage.write(CAL_NAMESPACE, CAL_KEY, &record)?;
        info!("calibration: state persisted (save #{})", self.save_counter);
        Ok(true)
    }
}

impl Default for CalibrationStore {
    fn default() -> Self {
        Self::new()
    }
}
