//! BME680 gas sensor behind the vendor fusion library.
//!
//! The fusion algorithm is an opaque collaborator: this adapter exposes its
//! calibrated outputs, health status, and state blob through [`SensorPort`]
//! and never interprets any of them.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: the vendor pipeline drives the chip in forced mode over I2C
//! (see [`probe`] for the bus handshake). On host/test: a deterministic
//! synthetic profile whose accuracy ramps 0 → 3 over the first polls, so
//! the calibration-save policy is exercisable end to end.

use crate::app::ports::{
    CALIBRATION_BLOB_SIZE, Measurement, SampleRate, SensorError, SensorHealth, SensorPort,
};

/// Secondary I2C address of the BME680 (SDO high).
pub const I2C_ADDR_SECONDARY: u8 = 0x77;

const CHIP_ID_REG: u8 = 0xD0;
const CHIP_ID: u8 = 0x61;

/// Verify a BME680 answers on the bus before handing it to the fusion
/// pipeline.
pub fn probe<I: embedded_hal::i2c::I2c>(bus: &mut I, addr: u8) -> Result<(), SensorError> {
    let mut id = [0u8; 1];
    bus.write_read(addr, &[CHIP_ID_REG], &mut id)
        .map_err(|_| SensorError::Bus)?;
    if id[0] != CHIP_ID {
        return Err(SensorError::NotDetected);
    }
    Ok(())
}

/// The sensor collaborator: fusion handle plus its opaque state.
pub struct Bme680Sensor {
    rate: SampleRate,
    state: [u8; CALIBRATION_BLOB_SIZE],
    health: SensorHealth,
    #[cfg(not(target_os = "espidf"))]
    sim_polls: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_calibrated: bool,
}

impl Bme680Sensor {
    pub fn new() -> Self {
        Self {
            rate: SampleRate::LowPower,
            state: [0u8; CALIBRATION_BLOB_SIZE],
            health: SensorHealth::Ok,
            #[cfg(not(target_os = "espidf"))]
            sim_polls: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_calibrated: false,
        }
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.rate
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_poll(&mut self) -> Option<Measurement> {
        // The vendor fusion pipeline runs behind this call:
        // 1. its scheduler decides whether a forced-mode measurement is due
        // 2. raw T/P/H/gas registers are read over I2C and fed through it
        // 3. the virtual-sensor outputs become the Measurement below
        // The I2C handle is threaded in from main when the board bring-up
        // lands; until the vendor blob is linked there is no new data.
        None
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_poll(&mut self) -> Option<Measurement> {
        self.sim_polls += 1;
        let n = self.sim_polls;

        // Accuracy climbs one step every 5 polls unless a restored blob
        // already marks the algorithm fully calibrated.
        let accuracy = if self.sim_calibrated {
            3
        } else {
            ((n / 5).min(3)) as u8
        };
        if accuracy == 3 && !self.sim_calibrated {
            self.sim_calibrated = true;
            self.state = [0xC3; CALIBRATION_BLOB_SIZE];
        }

        Some(Measurement {
            temperature_c: 21.0 + (n % 40) as f32 * 0.05,
            pressure_hpa: 1008.0 + (n % 25) as f32 * 0.2,
            humidity_pct: 45.0 + (n % 30) as f32 * 0.3,
            iaq: 50.0 + (n % 100) as f32,
            iaq_accuracy: accuracy,
            co2_ppm: 500.0 + (n % 50) as f32 * 10.0,
            voc_ppm: 0.5 + (n % 20) as f32 * 0.05,
        })
    }
}

impl Default for Bme680Sensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for Bme680Sensor {
    fn configure(&mut self, rate: SampleRate) -> Result<(), SensorError> {
        self.rate = rate;
        Ok(())
    }

    fn poll(&mut self) -> Option<Measurement> {
        self.platform_poll()
    }

    fn status(&mut self) -> SensorHealth {
        self.health
    }

    fn calibration(&mut self, blob: &mut [u8; CALIBRATION_BLOB_SIZE]) -> Result<(), SensorError> {
        blob.copy_from_slice(&self.state);
        Ok(())
    }

    fn restore_calibration(
        &mut self,
        blob: &[u8; CALIBRATION_BLOB_SIZE],
    ) -> Result<(), SensorError> {
        self.state.copy_from_slice(blob);
        #[cfg(not(target_os = "espidf"))]
        {
            // A restored state resumes accurate output without the ramp.
            self.sim_calibrated = true;
        }
        Ok(())
    }
}
