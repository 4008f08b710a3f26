//! Mock port implementations for integration tests.
//!
//! Every adapter the [`Monitor`](airsense::app::service::Monitor) touches
//! has an in-memory stand-in here, so tests can script sensor behavior and
//! assert on exactly what reached storage.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};
use std::rc::Rc;

use airsense::app::events::AppEvent;
use airsense::app::ports::{
    CALIBRATION_BLOB_SIZE, EventSink, LogMedium, Measurement, SampleRate, SensorError,
    SensorHealth, SensorPort, StorageError, StoragePort,
};

// ── Storage ───────────────────────────────────────────────────

pub struct MemStorage {
    store: HashMap<String, Vec<u8>>,
}

#[allow(dead_code)]
impl MemStorage {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
        }
    }

    pub fn record(&self, namespace: &str, key: &str) -> Option<&Vec<u8>> {
        self.store.get(&format!("{namespace}::{key}"))
    }
}

impl StoragePort for MemStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.get(&format!("{namespace}::{key}")) {
            Some(data) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store
            .insert(format!("{namespace}::{key}"), data.to_vec());
        Ok(())
    }
}

// ── Log medium ────────────────────────────────────────────────

/// In-memory home for the persisted log document.
pub struct MemLogMedium {
    bytes: Rc<RefCell<Vec<u8>>>,
    present: Rc<RefCell<bool>>,
    pub fail_writes: bool,
}

pub struct MemWriter {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[allow(dead_code)]
impl MemLogMedium {
    pub fn new() -> Self {
        Self {
            bytes: Rc::new(RefCell::new(Vec::new())),
            present: Rc::new(RefCell::new(false)),
            fail_writes: false,
        }
    }

    pub fn preload(&mut self, document: &str) {
        *self.bytes.borrow_mut() = document.as_bytes().to_vec();
        *self.present.borrow_mut() = true;
    }

    pub fn document(&self) -> Option<String> {
        if !*self.present.borrow() {
            return None;
        }
        String::from_utf8(self.bytes.borrow().clone()).ok()
    }
}

impl LogMedium for MemLogMedium {
    type Writer = MemWriter;

    fn replace(&mut self) -> Result<MemWriter, StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.bytes.borrow_mut().clear();
        *self.present.borrow_mut() = true;
        Ok(MemWriter {
            bytes: self.bytes.clone(),
        })
    }

    fn load(&self) -> Result<String, StorageError> {
        if !*self.present.borrow() {
            return Err(StorageError::NotFound);
        }
        String::from_utf8(self.bytes.borrow().clone()).map_err(|_| StorageError::IoError)
    }
}

// ── Sensor ────────────────────────────────────────────────────

/// A sensor collaborator whose outputs the test scripts up front.
pub struct ScriptedSensor {
    pub queue: VecDeque<Measurement>,
    pub health: SensorHealth,
    pub state: [u8; CALIBRATION_BLOB_SIZE],
    pub restored: Option<[u8; CALIBRATION_BLOB_SIZE]>,
    pub fail_calibration_read: bool,
    pub status_checks: u32,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            health: SensorHealth::Ok,
            state: [0x42; CALIBRATION_BLOB_SIZE],
            restored: None,
            fail_calibration_read: false,
            status_checks: 0,
        }
    }

    pub fn push(&mut self, m: Measurement) {
        self.queue.push_back(m);
    }
}

impl SensorPort for ScriptedSensor {
    fn configure(&mut self, _rate: SampleRate) -> Result<(), SensorError> {
        Ok(())
    }

    fn poll(&mut self) -> Option<Measurement> {
        self.queue.pop_front()
    }

    fn status(&mut self) -> SensorHealth {
        self.status_checks += 1;
        self.health
    }

    fn calibration(&mut self, blob: &mut [u8; CALIBRATION_BLOB_SIZE]) -> Result<(), SensorError> {
        if self.fail_calibration_read {
            return Err(SensorError::Unrecoverable(-4));
        }
        blob.copy_from_slice(&self.state);
        Ok(())
    }

    fn restore_calibration(
        &mut self,
        blob: &[u8; CALIBRATION_BLOB_SIZE],
    ) -> Result<(), SensorError> {
        self.restored = Some(*blob);
        Ok(())
    }
}

/// A plausible measurement with a chosen air-quality accuracy.
pub fn measurement(iaq: f32, iaq_accuracy: u8) -> Measurement {
    Measurement {
        temperature_c: 22.5,
        pressure_hpa: 1004.7,
        humidity_pct: 48.0,
        iaq,
        iaq_accuracy,
        co2_ppm: 580.0,
        voc_ppm: 0.7,
    }
}

// ── Event sink ────────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count_of(&self, matcher: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| matcher(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
