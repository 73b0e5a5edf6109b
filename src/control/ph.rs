//! CO2 solenoid control from pH readings.
//!
//! Dissolved CO2 lowers pH, so the solenoid opens while the reading sits
//! above the target and closes once it falls back to (or below) it.
//!
//! ```text
//!        pH > target, dwell elapsed
//!   OFF ───────────────────────────▶ ON
//!    ▲                               │
//!    └───────────────────────────────┘
//!      pH <= target, dwell elapsed
//!      OR calibrating (immediate)
//! ```
//!
//! A state change is honoured only after `min_dwell_ms` has passed since the
//! previous change, in both directions. The one exception is calibration:
//! while the probe is being calibrated its readings are meaningless, so the
//! solenoid is forced off on the first tick regardless of dwell.
//!
//! With PID enabled the comparison is replaced by time proportioning: at
//! the start of every [`PID_WINDOW_MS`] window the PID output sets how long
//! the solenoid stays open within that window. The window replaces the
//! dwell; calibration still forces the solenoid off.

use chrono::NaiveDateTime;
use log::{debug, info};

use super::pid::{PidController, PidTunings};
use crate::app::ports::ClockPort;

/// Length of one time-proportioning window in PID mode.
pub const PID_WINDOW_MS: u64 = 10_000;

/// Output change decided by [`PhControl::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolenoidChange {
    /// New solenoid state.
    pub on: bool,
    /// Milliseconds since the previous change (or since construction).
    pub elapsed_ms: u64,
    /// Wall-clock time of the change.
    pub at: NaiveDateTime,
}

/// PID output mapped onto solenoid on-time.
#[derive(Debug, Clone)]
struct PidWindow {
    pid: PidController,
    /// Start of the running window; `None` until the first reading.
    window_start_ms: Option<u64>,
    on_time_ms: u64,
}

impl PidWindow {
    fn new(tunings: PidTunings, target_ph: f32) -> Self {
        let mut pid = PidController::new(tunings, target_ph);
        pid.set_reverse(true);
        pid.set_limits(0.0, PID_WINDOW_MS as f32);
        Self {
            pid,
            window_start_ms: None,
            on_time_ms: 0,
        }
    }

    /// Whether the solenoid should be open at `now_ms`. A new on-time is
    /// computed whenever a window starts.
    fn demand(&mut self, measured_ph: f32, target_ph: f32, now_ms: u64) -> bool {
        let start = match self.window_start_ms {
            Some(start) if now_ms.saturating_sub(start) < PID_WINDOW_MS => start,
            previous => {
                let dt = previous.map_or(0.0, |s| now_ms.saturating_sub(s) as f32 / 1000.0);
                self.pid.set_target(target_ph);
                self.on_time_ms = self.pid.compute(measured_ph, dt).round() as u64;
                debug!(
                    "pH PID: {} ms of {} ms at pH {:.3}",
                    self.on_time_ms, PID_WINDOW_MS, measured_ph
                );
                self.window_start_ms = Some(now_ms);
                now_ms
            }
        };
        now_ms.saturating_sub(start) < self.on_time_ms
    }

    fn restart(&mut self) {
        self.pid.reset();
        self.window_start_ms = None;
        self.on_time_ms = 0;
    }
}

/// Two-state (OFF/ON) CO2 controller.
#[derive(Debug, Clone)]
pub struct PhControl {
    target_ph: f32,
    solenoid_on: bool,
    /// Monotonic time of the last actual change, or of construction.
    last_change_ms: u64,
    /// `false` until the first transition; the dwell only guards later ones.
    has_changed: bool,
    calibrating: bool,
    min_dwell_ms: u64,
    /// Time-proportioned mode; on/off comparison when `None`.
    pid: Option<PidWindow>,
}

impl PhControl {
    /// Solenoid starts OFF; the construction time is the reference point
    /// for the first reported elapsed time.
    pub fn new(target_ph: f32, min_dwell_ms: u64, clock: &impl ClockPort) -> Self {
        Self {
            target_ph,
            solenoid_on: false,
            last_change_ms: clock.now_ms(),
            has_changed: false,
            calibrating: false,
            min_dwell_ms,
            pid: None,
        }
    }

    /// Evaluate one control tick against `measured_ph`.
    ///
    /// Returns the change to apply, or `None` when the solenoid keeps its
    /// current state.
    pub fn update(&mut self, measured_ph: f32, clock: &impl ClockPort) -> Option<SolenoidChange> {
        let now_ms = clock.now_ms();
        let want_on = match (&mut self.pid, self.calibrating) {
            (Some(window), true) => {
                window.restart();
                false
            }
            (None, true) => false,
            (Some(window), false) => window.demand(measured_ph, self.target_ph, now_ms),
            (None, false) => measured_ph > self.target_ph,
        };

        if want_on == self.solenoid_on {
            return None;
        }

        if self.pid.is_none() && !self.calibrating && !self.dwell_elapsed(now_ms) {
            debug!(
                "pH control: {} deferred, {} ms of {} ms dwell",
                if want_on { "on" } else { "off" },
                now_ms.saturating_sub(self.last_change_ms),
                self.min_dwell_ms
            );
            return None;
        }

        let elapsed_ms = now_ms.saturating_sub(self.last_change_ms);
        self.solenoid_on = want_on;
        self.last_change_ms = now_ms;
        self.has_changed = true;

        info!(
            "pH control: solenoid {} (pH {:.3}, target {:.3}{})",
            if want_on { "ON" } else { "OFF" },
            measured_ph,
            self.target_ph,
            if self.calibrating { ", calibrating" } else { "" }
        );

        Some(SolenoidChange {
            on: want_on,
            elapsed_ms,
            at: clock.wall_clock(),
        })
    }

    /// Change the set point. Takes effect on the next [`update`](Self::update).
    pub fn set_target_ph(&mut self, target_ph: f32) {
        self.target_ph = target_ph;
    }

    pub fn target_ph(&self) -> f32 {
        self.target_ph
    }

    /// Mark a calibration procedure as running (or finished).
    pub fn set_calibrating(&mut self, calibrating: bool) {
        self.calibrating = calibrating;
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    pub fn is_on(&self) -> bool {
        self.solenoid_on
    }

    /// Switch between PID (`Some`) and on/off (`None`) control. New gains
    /// keep the running window; enabling starts a fresh one on the next
    /// update.
    pub fn set_pid(&mut self, tunings: Option<PidTunings>) {
        match tunings {
            Some(t) => {
                if let Some(window) = &mut self.pid {
                    window.pid.set_tunings(t);
                } else {
                    info!("pH control: PID mode (kp {}, ki {}, kd {})", t.kp, t.ki, t.kd);
                    self.pid = Some(PidWindow::new(t, self.target_ph));
                }
            }
            None => {
                if self.pid.take().is_some() {
                    info!("pH control: on/off mode");
                }
            }
        }
    }

    pub fn pid_enabled(&self) -> bool {
        self.pid.is_some()
    }

    /// Change the dwell interval (config reload).
    pub fn set_min_dwell_ms(&mut self, min_dwell_ms: u64) {
        self.min_dwell_ms = min_dwell_ms;
    }

    fn dwell_elapsed(&self, now_ms: u64) -> bool {
        !self.has_changed || now_ms.saturating_sub(self.last_change_ms) >= self.min_dwell_ms
    }
}
