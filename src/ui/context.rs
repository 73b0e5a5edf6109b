//! Shared context handed to every screen.
//!
//! `TankContext` is the blackboard screens read from when rendering and
//! write requests into when a key commits a setting. It holds a copy of the
//! configuration, the latest probe snapshot, timing, and a small queue of
//! [`AppCommand`]s the service drains after each key press.

use chrono::NaiveDateTime;
use heapless::Deque;
use log::warn;

use crate::app::commands::AppCommand;
use crate::app::ports::PhSlope;
use crate::config::TankConfig;

/// Pending commands a single key press can produce.
const REQUEST_QUEUE_CAP: usize = 4;

// ---------------------------------------------------------------------------
// Sensor snapshot (written by the service each tick)
// ---------------------------------------------------------------------------

/// Latest probe values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorSnapshot {
    /// Last good pH reading; `None` until the probe has reported.
    pub ph: Option<f32>,
    /// Last good running-average temperature (Celsius); `None` until the
    /// first sample.
    pub temperature_c: Option<f32>,
    /// Probe slope, once reported.
    pub ph_slope: Option<PhSlope>,
}

/// Network identity shown on the address screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub mac: [u8; 6],
    pub ip: Option<[u8; 4]>,
}

// ---------------------------------------------------------------------------
// TankContext
// ---------------------------------------------------------------------------

pub struct TankContext {
    /// Live configuration (kept in sync by the service).
    pub config: TankConfig,
    /// Latest probe values.
    pub sensors: SensorSnapshot,
    /// Milliseconds since boot.
    pub uptime_ms: u64,
    /// Wall-clock time at the start of the tick.
    pub now: NaiveDateTime,
    /// Current CO2 solenoid state.
    pub solenoid_on: bool,
    /// Current heater/chiller state.
    pub thermal_on: bool,
    pub device: DeviceInfo,
    requests: Deque<AppCommand, REQUEST_QUEUE_CAP>,
}

impl TankContext {
    pub fn new(config: TankConfig) -> Self {
        Self {
            config,
            sensors: SensorSnapshot::default(),
            uptime_ms: 0,
            now: NaiveDateTime::default(),
            solenoid_on: false,
            thermal_on: false,
            device: DeviceInfo::default(),
            requests: Deque::new(),
        }
    }

    /// Queue a command for the service. Dropped with a warning when full.
    pub fn request(&mut self, cmd: AppCommand) {
        if let Err(cmd) = self.requests.push_back(cmd) {
            warn!("UI request queue full, dropping {:?}", cmd);
        }
    }

    /// Take the oldest queued command.
    pub fn next_request(&mut self) -> Option<AppCommand> {
        self.requests.pop_front()
    }

    pub fn has_requests(&self) -> bool {
        !self.requests.is_empty()
    }
}
