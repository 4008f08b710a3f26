//! System clock adapter.
//!
//! Implements [`ClockPort`] for the AirSense system.
//!
//! - **`target_os = "espidf"`** — uptime wraps `esp_timer_get_time()`
//!   (microsecond precision, monotonic); wall-clock time comes from the
//!   system clock, which SNTP sets during bring-up.
//! - **all other targets** — `std::time::Instant` and the host clock.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::app::ports::ClockPort;
use crate::reading::Timestamp;

/// `%FT%T.000Z` — second precision with a literal zero millisecond field.
const ISO_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].000Z");

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn timestamp(&self) -> Timestamp {
        let formatted = time::OffsetDateTime::now_utc()
            .format(ISO_FORMAT)
            .unwrap_or_default();
        Timestamp::try_from(formatted.as_str()).unwrap_or_default()
    }

    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Deterministic clock for host tests and simulation: a fixed timestamp and
/// a manually advanced uptime.
#[cfg(not(target_os = "espidf"))]
pub struct FixedClock {
    time: Timestamp,
    uptime_ms: core::cell::Cell<u64>,
}

#[cfg(not(target_os = "espidf"))]
impl FixedClock {
    pub fn at(time: &str, uptime_ms: u64) -> Self {
        Self {
            time: Timestamp::try_from(time).unwrap_or_default(),
            uptime_ms: core::cell::Cell::new(uptime_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.uptime_ms.set(self.uptime_ms.get() + ms);
    }

    pub fn set_time(&mut self, time: &str) {
        self.time = Timestamp::try_from(time).unwrap_or_default();
    }
}

#[cfg(not(target_os = "espidf"))]
impl ClockPort for FixedClock {
    fn timestamp(&self) -> Timestamp {
        self.time.clone()
    }

    fn uptime_ms(&self) -> u64 {
        self.uptime_ms.get()
    }
}
