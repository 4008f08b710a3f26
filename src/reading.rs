//! Sensor reading value type and its wire form.
//!
//! A [`Reading`] is produced once per acquisition cycle and never mutated.
//! The wire form carries the JSON field names the web client expects and a
//! `uptime` field stamped at serialization time — uptime is a property of
//! the moment a reading is sent, not of the reading itself, so it is
//! dropped again when a persisted entry is read back.

use serde::{Deserialize, Serialize};

/// Nominal sea level pressure, hPa.
pub const SEA_LEVEL_HPA: f32 = 1013.25;

/// ISO 8601 timestamp with a literal zero millisecond field,
/// e.g. `2018-04-30T16:00:13.000Z`. Always exactly 24 bytes.
pub type Timestamp = heapless::String<24>;

/// One calibrated sensor sample, stamped with wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub time: Timestamp,
    /// Heat-compensated temperature, degrees C
    pub temperature_c: f32,
    /// Barometric pressure, hPa
    pub pressure_hpa: f32,
    /// Relative humidity, %RH
    pub humidity_pct: f32,
    /// Static indoor air quality index
    pub iaq: f32,
    /// Fusion algorithm confidence, 0 (uncalibrated) to 3 (fully calibrated)
    pub iaq_accuracy: u8,
    /// CO2 equivalent, ppm
    pub co2_ppm: f32,
    /// Breath-VOC equivalent, ppm
    pub voc_ppm: f32,
}

impl Reading {
    /// Placeholder reading used to pre-fill the log at first boot and to
    /// seed the current-reading slot before the first acquisition tick.
    pub fn nominal(time: Timestamp) -> Self {
        Self {
            time,
            temperature_c: 20.0,
            pressure_hpa: SEA_LEVEL_HPA,
            humidity_pct: 50.0,
            iaq: 100.0,
            iaq_accuracy: 0,
            co2_ppm: 500.0,
            voc_ppm: 0.5,
        }
    }

    /// Wire form of this reading, stamped with the current uptime.
    pub fn to_wire(&self, uptime_secs: u64) -> WireReading {
        WireReading {
            uptime: uptime_secs,
            time: self.time.clone(),
            temp: self.temperature_c,
            pres: self.pressure_hpa,
            humy: self.humidity_pct,
            iaq: self.iaq,
            iaq_acc: self.iaq_accuracy,
            co2: self.co2_ppm,
            voc: self.voc_ppm,
        }
    }
}

/// JSON shape served by the API and stored in the persisted log document:
/// `{"uptime":12345,"time":"2018-04-30T16:00:13.000Z","temp":55.1,...}`.
///
/// Field declaration order is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireReading {
    pub uptime: u64,
    pub time: Timestamp,
    pub temp: f32,
    pub pres: f32,
    pub humy: f32,
    #[serde(rename = "IAQ")]
    pub iaq: f32,
    #[serde(rename = "IAQacc")]
    pub iaq_acc: u8,
    #[serde(rename = "CO2")]
    pub co2: f32,
    #[serde(rename = "VOC")]
    pub voc: f32,
}

impl From<WireReading> for Reading {
    fn from(w: WireReading) -> Self {
        Self {
            time: w.time,
            temperature_c: w.temp,
            pressure_hpa: w.pres,
            humidity_pct: w.humy,
            iaq: w.iaq,
            iaq_accuracy: w.iaq_acc,
            co2_ppm: w.co2,
            voc_ppm: w.voc,
        }
    }
}
