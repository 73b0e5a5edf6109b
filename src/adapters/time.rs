//! System clock adapter.
//!
//! Implements [`ClockPort`]: monotonic uptime plus a wall clock the
//! operator sets from the date/time screen.
//!
//! - **`espidf`** wraps `esp_timer_get_time()` (microsecond precision,
//!   monotonic) and writes the wall clock back with `settimeofday` so the
//!   C side of ESP-IDF agrees.
//! - **host** uses `std::time::Instant` for testing and simulation.
//!
//! The wall clock is kept as an offset from uptime, so setting it never
//! disturbs the monotonic base the control loops time against.

use chrono::{Duration, NaiveDateTime};
use log::info;

use crate::app::ports::ClockPort;

pub struct SystemClock {
    #[cfg(not(feature = "espidf"))]
    start: std::time::Instant,
    /// Wall-clock time at uptime zero.
    epoch: NaiveDateTime,
}

impl SystemClock {
    /// Start with the wall clock at `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        let mut clock = Self {
            #[cfg(not(feature = "espidf"))]
            start: std::time::Instant::now(),
            epoch: now,
        };
        clock.epoch = now - Duration::milliseconds(clock.now_ms() as i64);
        clock
    }

    /// Microseconds since boot.
    #[cfg(feature = "espidf")]
    fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since the adapter was created.
    #[cfg(not(feature = "espidf"))]
    fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Push the wall clock into the C runtime.
    #[cfg(feature = "espidf")]
    fn sync_system_time(at: NaiveDateTime) {
        let tv = esp_idf_svc::sys::timeval {
            tv_sec: at.and_utc().timestamp() as esp_idf_svc::sys::time_t,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::settimeofday(&tv, core::ptr::null()) } != 0 {
            log::warn!("settimeofday failed");
        }
    }

    #[cfg(not(feature = "espidf"))]
    fn sync_system_time(_at: NaiveDateTime) {}
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(NaiveDateTime::default())
    }
}

impl ClockPort for SystemClock {
    fn now_ms(&self) -> u64 {
        self.uptime_us() / 1000
    }

    fn wall_clock(&self) -> NaiveDateTime {
        self.epoch + Duration::milliseconds(self.now_ms() as i64)
    }

    fn set_wall_clock(&mut self, at: NaiveDateTime) {
        self.epoch = at - Duration::milliseconds(self.now_ms() as i64);
        Self::sync_system_time(at);
        info!("Wall clock set to {}", at.format("%Y-%m-%d %H:%M:%S"));
    }
}
