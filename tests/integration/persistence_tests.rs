//! End-to-end persistence tests against a real directory-backed FlashFs.
//!
//! These exercise the same code path the device uses for the SPIFFS-
//! resident document: erase-then-create replacement, full restore at boot,
//! and nominal re-initialisation when the stored copy is unusable.

use std::path::PathBuf;

use crate::mock_ports::{MemStorage, RecordingSink, ScriptedSensor, measurement};

use airsense::adapters::clock::FixedClock;
use airsense::adapters::flashfs::FlashFs;
use airsense::app::events::AppEvent;
use airsense::app::ports::{ClockPort, LogMedium};
use airsense::app::service::Monitor;

fn scratch(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("airsense-persist-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn history_survives_a_reboot() {
    let dir = scratch("reboot");
    let clock = FixedClock::at("2024-06-01T12:00:00.000Z", 0);
    let mut sink = RecordingSink::new();

    // First run: acquire a few readings and let the interval gate persist them.
    {
        let mut flashfs = FlashFs::mount_at(&dir).unwrap();
        let mut m = Monitor::new(&clock);
        let mut sensor = ScriptedSensor::new();
        let mut storage = MemStorage::new();
        m.update_config(r#"{"sensorInt":1000,"graphInt":60000,"logInt":1000}"#)
            .unwrap();

        for i in 0..3 {
            sensor.push(measurement(30.0 + i as f32, 0));
            clock.advance(1_500);
            m.tick(&mut sensor, &mut storage, &mut flashfs, &clock, &mut sink);
        }
        assert_eq!(m.log().latest().iaq, 32.0);
    }

    // Second run: a fresh monitor restores the same sequence.
    {
        let mut flashfs = FlashFs::mount_at(&dir).unwrap();
        let mut m = Monitor::new(&clock);
        m.init_log(&mut flashfs, &clock, &mut sink);

        assert_eq!(sink.count_of(|e| matches!(e, AppEvent::LogRestored)), 1);
        assert_eq!(m.log().latest().iaq, 32.0);
        let tail: Vec<f32> = m.log().iter().rev().take(3).map(|r| r.iaq).collect();
        assert_eq!(tail, vec![32.0, 31.0, 30.0]);
    }
}

#[test]
fn repeated_persist_is_byte_identical() {
    let dir = scratch("idempotent");
    let mut flashfs = FlashFs::mount_at(&dir).unwrap();
    let clock = FixedClock::at("2024-06-01T12:00:00.000Z", 0);
    let m = Monitor::new(&clock);

    let mut w = flashfs.replace().unwrap();
    m.log().persist(&mut w, 9).unwrap();
    drop(w);
    let first = flashfs.load().unwrap();

    let mut w = flashfs.replace().unwrap();
    m.log().persist(&mut w, 9).unwrap();
    drop(w);
    let second = flashfs.load().unwrap();

    assert_eq!(first, second);
}

#[test]
fn corrupt_document_triggers_nominal_reinitialisation() {
    let dir = scratch("corrupt");
    let mut flashfs = FlashFs::mount_at(&dir).unwrap();
    std::fs::write(dir.join("logfile.json"), b"{\"logfile\":[{\"upt").unwrap();

    let clock = FixedClock::at("2024-06-01T12:00:00.000Z", 0);
    let mut m = Monitor::new(&clock);
    let mut sink = RecordingSink::new();
    m.init_log(&mut flashfs, &clock, &mut sink);

    assert_eq!(sink.count_of(|e| matches!(e, AppEvent::LogReinitialized)), 1);
    assert!(m.log().iter().all(|r| r.iaq == 100.0));

    // The re-seeded document replaced the corrupt one on storage.
    let stored = flashfs.load().unwrap();
    assert_eq!(stored, m.log().render_document(clock.uptime_ms() / 1000).unwrap());

    // And it restores cleanly on the next boot.
    let mut next = Monitor::new(&clock);
    next.init_log(&mut flashfs, &clock, &mut sink);
    assert_eq!(sink.count_of(|e| matches!(e, AppEvent::LogRestored)), 1);
}
