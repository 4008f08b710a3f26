//! Integration tests for the acquisition core against mock adapters.
//!
//! These run on the host and verify the full tick pipeline — sensor poll,
//! cache update, calibration persistence, interval-gated history writes —
//! without any real hardware.

use crate::mock_ports::{MemLogMedium, MemStorage, RecordingSink, ScriptedSensor, measurement};

use airsense::adapters::clock::FixedClock;
use airsense::app::events::AppEvent;
use airsense::app::ports::{CALIBRATION_BLOB_SIZE, SensorHealth};
use airsense::app::service::Monitor;
use airsense::calibration::STATE_SAVE_PERIOD_MS;
use airsense::history::LOG_SIZE;

fn rig() -> (Monitor, ScriptedSensor, MemStorage, MemLogMedium, FixedClock, RecordingSink) {
    let clock = FixedClock::at("2024-06-01T12:00:00.000Z", 0);
    let monitor = Monitor::new(&clock);
    (
        monitor,
        ScriptedSensor::new(),
        MemStorage::new(),
        MemLogMedium::new(),
        clock,
        RecordingSink::new(),
    )
}

#[test]
fn fresh_reading_updates_the_cache() {
    let (mut monitor, mut sensor, mut storage, mut medium, mut clock, mut sink) = rig();

    sensor.push(measurement(85.0, 1));
    clock.set_time("2024-06-01T12:00:03.000Z");
    clock.advance(3_000);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);

    let current = monitor.current();
    assert_eq!(current.iaq, 85.0);
    assert_eq!(current.temperature_c, 22.5);
    assert_eq!(current.time.as_str(), "2024-06-01T12:00:03.000Z");
    assert_eq!(
        sink.count_of(|e| matches!(e, AppEvent::ReadingAcquired { .. })),
        1
    );
}

#[test]
fn tick_without_fresh_reading_rechecks_health() {
    let (mut monitor, mut sensor, mut storage, mut medium, clock, mut sink) = rig();
    let before = monitor.current().clone();

    sensor.health = SensorHealth::Warning(2);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);

    assert_eq!(sensor.status_checks, 1, "health must be re-checked");
    assert_eq!(monitor.current(), &before, "cache untouched");
    assert!(monitor.is_active(), "warnings never halt");
}

#[test]
fn history_persists_once_per_interval() {
    let (mut monitor, mut sensor, mut storage, mut medium, clock, mut sink) = rig();
    monitor
        .update_config(r#"{"sensorInt":1000,"graphInt":60000,"logInt":1000}"#)
        .unwrap();

    // Within the interval: reading cached, nothing persisted.
    sensor.push(measurement(10.0, 0));
    clock.advance(500);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);
    assert!(medium.document().is_none());

    // Past the interval: append + persist fires.
    sensor.push(measurement(11.0, 0));
    clock.advance(1_000);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);

    let document = medium.document().expect("history persisted");
    assert!(document.contains("\"IAQ\":11.0"));
    assert_eq!(monitor.log().latest().iaq, 11.0);
    assert_eq!(
        sink.count_of(|e| matches!(e, AppEvent::LogPersisted { .. })),
        1
    );

    // Immediately after, the gate is closed again.
    sensor.push(measurement(12.0, 0));
    clock.advance(200);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);
    assert_eq!(
        sink.count_of(|e| matches!(e, AppEvent::LogPersisted { .. })),
        1
    );
}

#[test]
fn failed_history_write_keeps_memory_authoritative() {
    let (mut monitor, mut sensor, mut storage, mut medium, clock, mut sink) = rig();
    monitor
        .update_config(r#"{"sensorInt":1000,"graphInt":60000,"logInt":1000}"#)
        .unwrap();
    medium.fail_writes = true;

    sensor.push(measurement(42.0, 0));
    clock.advance(2_000);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);

    assert!(monitor.is_active(), "persist failure is not fatal");
    assert_eq!(monitor.log().latest().iaq, 42.0);
    assert_eq!(sink.count_of(|e| matches!(e, AppEvent::LogPersistFailed)), 1);
}

#[test]
fn first_calibration_save_waits_for_full_accuracy() {
    let (mut monitor, mut sensor, mut storage, mut medium, clock, mut sink) = rig();

    for accuracy in [0, 1, 2] {
        sensor.push(measurement(50.0, accuracy));
        clock.advance(3_000);
        monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);
    }
    assert!(storage.record("airsense", "calib").is_none());

    // Accuracy reaches 3 for the first time: exactly one save, this tick.
    sensor.push(measurement(50.0, 3));
    clock.advance(3_000);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);

    let record = storage.record("airsense", "calib").expect("state persisted");
    assert_eq!(record[0] as usize, CALIBRATION_BLOB_SIZE);
    assert_eq!(&record[1..], &[0x42; CALIBRATION_BLOB_SIZE]);
    assert_eq!(
        sink.count_of(|e| matches!(e, AppEvent::CalibrationSaved { .. })),
        1
    );

    // More fully calibrated readings inside the save period: no new saves.
    sensor.push(measurement(50.0, 3));
    clock.advance(3_000);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);
    assert_eq!(
        sink.count_of(|e| matches!(e, AppEvent::CalibrationSaved { .. })),
        1
    );
}

#[test]
fn periodic_saves_fire_after_the_save_period() {
    let (mut monitor, mut sensor, mut storage, mut medium, clock, mut sink) = rig();

    sensor.push(measurement(50.0, 3));
    clock.advance(3_000);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);

    sensor.push(measurement(50.0, 3));
    clock.advance(STATE_SAVE_PERIOD_MS);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);

    assert_eq!(
        sink.count_of(|e| matches!(e, AppEvent::CalibrationSaved { .. })),
        2
    );
}

#[test]
fn calibration_read_failure_is_fatal() {
    let (mut monitor, mut sensor, mut storage, mut medium, clock, mut sink) = rig();
    sensor.fail_calibration_read = true;

    sensor.push(measurement(50.0, 3));
    clock.advance(3_000);
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);

    assert!(!monitor.is_active());
    assert_eq!(sink.count_of(|e| matches!(e, AppEvent::Halted(_))), 1);

    // Halted: further ticks are ignored.
    sensor.push(measurement(60.0, 3));
    monitor.tick(&mut sensor, &mut storage, &mut medium, &clock, &mut sink);
    assert_ne!(monitor.current().iaq, 60.0);
}

#[test]
fn boot_without_calibration_record_zeroes_storage() {
    let (mut monitor, mut sensor, mut storage, _medium, _clock, mut sink) = rig();

    monitor.init_calibration(&mut storage, &mut sensor, &mut sink);

    assert!(monitor.is_active());
    assert!(sensor.restored.is_none());
    let record = storage.record("airsense", "calib").expect("erase writes zeros");
    assert_eq!(record.len(), CALIBRATION_BLOB_SIZE + 1);
    assert!(record.iter().all(|&b| b == 0));
    assert_eq!(sink.count_of(|e| matches!(e, AppEvent::CalibrationErased)), 1);
}

#[test]
fn boot_with_calibration_record_hands_blob_to_sensor() {
    let (mut monitor, mut sensor, mut storage, _medium, _clock, mut sink) = rig();

    let mut record = vec![CALIBRATION_BLOB_SIZE as u8];
    record.extend_from_slice(&[0x9D; CALIBRATION_BLOB_SIZE]);
    use airsense::app::ports::StoragePort;
    storage.write("airsense", "calib", &record).unwrap();

    monitor.init_calibration(&mut storage, &mut sensor, &mut sink);

    assert_eq!(sensor.restored, Some([0x9D; CALIBRATION_BLOB_SIZE]));
    assert_eq!(
        sink.count_of(|e| matches!(e, AppEvent::CalibrationRestored)),
        1
    );
}

#[test]
fn init_log_restores_a_stored_document() {
    let (mut monitor, _sensor, _storage, mut medium, clock, mut sink) = rig();

    // A previous run's document with a recognisable entry at the end.
    let mut previous = Monitor::new(&clock);
    let mut scripted = ScriptedSensor::new();
    let mut storage = MemStorage::new();
    previous
        .update_config(r#"{"sensorInt":1000,"graphInt":60000,"logInt":1000}"#)
        .unwrap();
    scripted.push(measurement(64.5, 0));
    clock.advance(2_000);
    previous.tick(&mut scripted, &mut storage, &mut medium, &clock, &mut sink);
    let stored = medium.document().unwrap();

    monitor.init_log(&mut medium, &clock, &mut sink);

    assert_eq!(sink.count_of(|e| matches!(e, AppEvent::LogRestored)), 1);
    assert_eq!(monitor.log().latest().iaq, 64.5);
    assert!(stored.contains("\"IAQ\":64.5"));
}

#[test]
fn init_log_without_document_seeds_nominal_and_persists() {
    let (mut monitor, _sensor, _storage, mut medium, clock, mut sink) = rig();

    monitor.init_log(&mut medium, &clock, &mut sink);

    assert_eq!(sink.count_of(|e| matches!(e, AppEvent::LogReinitialized)), 1);
    let entries: Vec<_> = monitor.log().iter().collect();
    assert_eq!(entries.len(), LOG_SIZE);
    assert!(entries.iter().all(|r| r.pressure_hpa == 1013.25
        && r.temperature_c == 20.0
        && r.humidity_pct == 50.0
        && r.iaq == 100.0
        && r.iaq_accuracy == 0
        && r.co2_ppm == 500.0
        && r.voc_ppm == 0.5));
    assert!(
        entries.iter().all(|r| r.time == entries[0].time),
        "all seeded entries share one timestamp"
    );

    // The on-storage copy matches memory immediately.
    let document = medium.document().expect("seed persisted");
    assert_eq!(document, monitor.log().render_document(0).unwrap());
}

#[test]
fn init_log_with_corrupt_document_falls_back_to_nominal() {
    let (mut monitor, _sensor, _storage, mut medium, clock, mut sink) = rig();
    medium.preload("{\"logfile\":[{\"uptime\":garbage");

    monitor.init_log(&mut medium, &clock, &mut sink);

    assert_eq!(sink.count_of(|e| matches!(e, AppEvent::LogReinitialized)), 1);
    assert!(monitor.log().iter().all(|r| r.iaq == 100.0));
    let document = medium.document().expect("fresh document written");
    assert!(document.starts_with("{\"logfile\":["));
}
