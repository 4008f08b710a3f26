//! AirSense Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  Bme680Sensor   NvsAdapter   FlashFs      SystemClock        │
//! │  (SensorPort)   (Storage)    (LogMedium   (ClockPort)        │
//! │  WifiAdapter    EspHttpServer  + assets)  LogEventSink       │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ─────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │              Monitor (pure logic)                  │      │
//! │  │  cache · history · config · calibration policy     │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bring-up order mirrors the hardware dependencies: sensor and its
//! persisted calibration first, then flash filesystem, network, time sync,
//! HTTP server, and finally the reading history. Any failure flips the
//! monitor into its terminal inactive state — the process stays up, the
//! API (if reachable) answers every request with the halt notice.

#![deny(unused_must_use)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{error, info};

use airsense::adapters::clock::SystemClock;
use airsense::adapters::flashfs::FlashFs;
use airsense::adapters::log_sink::LogEventSink;
use airsense::adapters::nvs::NvsAdapter;
use airsense::adapters::wifi::WifiAdapter;
use airsense::api::server::create_http_server;
use airsense::app::ports::SampleRate;
use airsense::app::ports::SensorPort;
use airsense::app::service::Monitor;
use airsense::sensors::Bme680Sensor;

use esp_idf_svc::sntp::{EspSntp, SyncStatus};

/// Cadence of the acquisition loop. The fusion pipeline reports fresh data
/// at its own (slower) sample rate; polls in between are no-ops.
const POLL_PERIOD_MS: u64 = 250;

const TIME_SYNC_ATTEMPTS: u32 = 3;
const TIME_SYNC_DELAY_MS: u64 = 500;

/// Everything the acquisition loop needs, built during bring-up.
struct App {
    sensor: Bme680Sensor,
    storage: NvsAdapter,
    flashfs: FlashFs,
    _wifi: WifiAdapter,
    _sntp: EspSntp<'static>,
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("AirSense v{}", env!("CARGO_PKG_VERSION"));

    let clock = SystemClock::new();
    let mut sink = LogEventSink::new();
    let mut monitor = Monitor::new(&clock);

    // ── 2. Bring-up ───────────────────────────────────────────
    let app = match bring_up(&mut monitor, &clock, &mut sink) {
        Ok(app) => Some(app),
        Err(reason) => {
            monitor.halt(reason, &mut sink);
            None
        }
    };

    let Some(mut app) = app else {
        // Terminal inactive state: inert, but alive for the operator.
        loop {
            thread::sleep(Duration::from_secs(60));
        }
    };

    // ── 3. HTTP server over the shared state ──────────────────
    let monitor = Arc::new(Mutex::new(monitor));
    let server = match create_http_server(monitor.clone(), app.flashfs.clone()) {
        Ok(server) => Some(server),
        Err(e) => {
            error!("web server start failed: {e:#}");
            monitor
                .lock()
                .unwrap()
                .halt("web server start failed", &mut sink);
            None
        }
    };
    let _server = server;

    info!("System ready. Entering acquisition loop.");

    // ── 4. Acquisition loop ───────────────────────────────────
    loop {
        {
            let mut m = monitor.lock().unwrap();
            m.tick(
                &mut app.sensor,
                &mut app.storage,
                &mut app.flashfs,
                &clock,
                &mut sink,
            );
        }
        thread::sleep(Duration::from_millis(POLL_PERIOD_MS));
    }
}

/// Initialise every collaborator in dependency order. The message of the
/// first failure becomes the halt reason.
fn bring_up(
    monitor: &mut Monitor,
    clock: &SystemClock,
    sink: &mut LogEventSink,
) -> core::result::Result<App, &'static str> {
    info!("sensor initialisation...");
    let mut sensor = Bme680Sensor::new();
    sensor
        .configure(SampleRate::LowPower)
        .map_err(|_| "sensor initialisation failed")?;

    info!("storage initialisation...");
    let mut storage = NvsAdapter::new().map_err(|_| "storage initialisation failed")?;

    monitor.init_calibration(&mut storage, &mut sensor, sink);
    if !monitor.is_active() {
        return Err("calibration restore failed");
    }

    info!("flash filesystem initialisation...");
    let mut flashfs = FlashFs::mount().map_err(|_| "flash filesystem mount failed")?;

    info!("WiFi initialisation...");
    let mut wifi = WifiAdapter::new();
    wifi.set_credentials(
        option_env!("WIFI_SSID").unwrap_or(""),
        option_env!("WIFI_PASS").unwrap_or(""),
    )
    .map_err(|_| "WiFi credentials invalid")?;
    wifi.connect().map_err(|_| "WiFi initialisation failed")?;

    info!("time sync...");
    let sntp = sync_time()?;

    info!("loading log from flash...");
    monitor.init_log(&mut flashfs, clock, sink);

    info!("initialisation complete");
    Ok(App {
        sensor,
        storage,
        flashfs,
        _wifi: wifi,
        _sntp: sntp,
    })
}

/// Start SNTP and wait briefly for the first sync so timestamps are real
/// before the log is seeded.
fn sync_time() -> core::result::Result<EspSntp<'static>, &'static str> {
    let sntp = EspSntp::new_default().map_err(|_| "time sync initialisation failed")?;
    for _ in 0..TIME_SYNC_ATTEMPTS {
        if sntp.get_sync_status() == SyncStatus::Completed {
            info!("system time set from NTP");
            return Ok(sntp);
        }
        thread::sleep(Duration::from_millis(TIME_SYNC_DELAY_MS));
    }
    Err("time sync failed")
}
