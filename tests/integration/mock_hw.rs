//! Mock adapters for integration tests.
//!
//! Every port the [`AppService`](tankcontroller::app::service::AppService)
//! consumes gets a recording or scriptable double here, so tests can drive
//! the full tick pipeline on the host.

use std::cell::{Cell, RefCell};

use chrono::{Duration, NaiveDate, NaiveDateTime};

use tankcontroller::app::events::AppEvent;
use tankcontroller::app::ports::{
    ActuatorPort, ClockPort, ConfigError, ConfigPort, DisplayPort, EventSink, PhProbePort,
    PhSlope, TemperatureProbePort,
};
use tankcontroller::config::TankConfig;
use tankcontroller::error::{ActuatorError, SensorError};

// ── MockActuators ─────────────────────────────────────────────

/// Records all actuator calls for later assertion.
#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Solenoid(bool),
    Thermal(bool),
    AllOff,
}

pub struct MockActuators {
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockActuators {
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }

    pub fn last_call(&self) -> Option<&ActuatorCall> {
        self.calls.last()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Last commanded solenoid state (derived from recorded calls).
    pub fn solenoid_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Solenoid(on) => Some(*on),
                ActuatorCall::AllOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Last commanded heater/chiller state.
    pub fn thermal_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Thermal(on) => Some(*on),
                ActuatorCall::AllOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Every solenoid state written, in order.
    pub fn solenoid_history(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Solenoid(on) => Some(*on),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockActuators {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockActuators {
    fn set_solenoid(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::Solenoid(on));
        Ok(())
    }

    fn set_thermal(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::Thermal(on));
        Ok(())
    }

    fn all_off(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::AllOff);
        Ok(())
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Manually advanced clock. The wall clock moves in step with `now_ms`.
pub struct MockClock {
    pub ms: u64,
    base: NaiveDateTime,
}

#[allow(dead_code)]
impl MockClock {
    /// Clock at `ms = 0` reading the given wall-clock time.
    pub fn at(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> Self {
        let base = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .expect("valid test date");
        Self { ms: 0, base }
    }

    pub fn new() -> Self {
        Self::at(2024, 1, 1, 0, 0, 0)
    }

    pub fn advance(&mut self, ms: u64) {
        self.ms += ms;
    }

    pub fn set(&mut self, ms: u64) {
        self.ms = ms;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u64 {
        self.ms
    }

    fn wall_clock(&self) -> NaiveDateTime {
        self.base + Duration::milliseconds(self.ms as i64)
    }

    fn set_wall_clock(&mut self, at: NaiveDateTime) {
        self.base = at - Duration::milliseconds(self.ms as i64);
    }
}

// ── Probes ────────────────────────────────────────────────────

/// pH probe returning whatever the test sets.
pub struct MockPhProbe {
    pub reading: Result<f32, SensorError>,
    pub slope: Option<PhSlope>,
    pub calibrations: Vec<f32>,
    pub cleared: u32,
    pub slope_requests: u32,
}

#[allow(dead_code)]
impl MockPhProbe {
    pub fn reading(ph: f32) -> Self {
        Self {
            reading: Ok(ph),
            slope: None,
            calibrations: Vec::new(),
            cleared: 0,
            slope_requests: 0,
        }
    }

    pub fn set(&mut self, ph: f32) {
        self.reading = Ok(ph);
    }
}

impl PhProbePort for MockPhProbe {
    fn ph(&self) -> Result<f32, SensorError> {
        self.reading
    }

    fn slope(&self) -> Option<PhSlope> {
        self.slope
    }

    fn calibrate_midpoint(&mut self, buffer_ph: f32) {
        self.calibrations.push(buffer_ph);
    }

    fn clear_calibration(&mut self) {
        self.cleared += 1;
    }

    fn request_slope(&mut self) {
        self.slope_requests += 1;
    }
}

/// Temperature probe returning whatever the test sets.
pub struct MockTemperatureProbe {
    pub reading: Result<f32, SensorError>,
    pub calibrations: Vec<f32>,
}

#[allow(dead_code)]
impl MockTemperatureProbe {
    pub fn reading(c: f32) -> Self {
        Self {
            reading: Ok(c),
            calibrations: Vec::new(),
        }
    }

    pub fn set(&mut self, c: f32) {
        self.reading = Ok(c);
    }
}

impl TemperatureProbePort for MockTemperatureProbe {
    fn temperature_c(&self) -> Result<f32, SensorError> {
        self.reading
    }

    fn calibrate(&mut self, actual_c: f32) {
        self.calibrations.push(actual_c);
    }
}

// ── MockDisplay ───────────────────────────────────────────────

/// Two-line display that keeps whatever was written last.
pub struct MockDisplay {
    pub lines: [String; 2],
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn new() -> Self {
        Self {
            lines: [String::new(), String::new()],
        }
    }

    pub fn line(&self, row: usize) -> &str {
        &self.lines[row]
    }
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for MockDisplay {
    fn write_line(&mut self, text: &str, row: u8) {
        if let Some(line) = self.lines.get_mut(usize::from(row)) {
            *line = text.to_string();
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn solenoid_changes(&self) -> Vec<(bool, u64)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::SolenoidChanged { on, elapsed_ms, .. } => Some((*on, *elapsed_ms)),
                _ => None,
            })
            .collect()
    }

    pub fn telemetry_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Telemetry(_)))
            .count()
    }

    pub fn has_label_drift(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, AppEvent::LabelDrift { .. }))
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockConfigStore ───────────────────────────────────────────

/// Config store that counts saves and keeps the last one.
pub struct MockConfigStore {
    pub saved: RefCell<Option<TankConfig>>,
    pub saves: Cell<u32>,
}

#[allow(dead_code)]
impl MockConfigStore {
    pub fn new() -> Self {
        Self {
            saved: RefCell::new(None),
            saves: Cell::new(0),
        }
    }
}

impl Default for MockConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPort for MockConfigStore {
    fn load(&self) -> Result<TankConfig, ConfigError> {
        Ok(self.saved.borrow().clone().unwrap_or_default())
    }

    fn save(&self, config: &TankConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.saves.set(self.saves.get() + 1);
        *self.saved.borrow_mut() = Some(config.clone());
        Ok(())
    }
}
