//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the UI host, the pH and thermal controllers, and the
//! shared [`TankContext`]. All I/O flows through port traits injected at
//! call sites, so the whole service runs against mock adapters in tests.
//!
//! ```text
//!  ClockPort ───┐                          ┌──▶ ActuatorPort
//!  Probe ports ─┼─▶ ┌──────────────────┐ ──┼──▶ DisplayPort
//!  keypad ──────┘   │    AppService    │   └──▶ EventSink
//!                   │ UI · pH · Thermal│
//!                   └──────────────────┘
//! ```
//!
//! Each [`tick`](AppService::tick) runs in a fixed order: swap in any staged
//! screen, hand its calibration flag to the pH loop, read the probes, run
//! both controllers, drive the actuators, then draw the display. A
//! calibration screen therefore holds the solenoid off from the very tick
//! it becomes active. Neither controller acts on a probe that has not
//! produced a usable value; the thermal output is released instead.

use log::{info, warn};

use crate::config::TankConfig;
use crate::control::ph::PhControl;
use crate::control::pid::PidTunings;
use crate::control::thermal::Thermostat;
use crate::sensors::SensorHub;
use crate::ui::context::{DeviceInfo, TankContext};
use crate::ui::{ScreenId, UiHost};

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{
    ActuatorPort, ClockPort, ConfigPort, DisplayPort, EventSink, PhProbePort,
    TemperatureProbePort,
};

/// Unsaved config is written this long after the first change.
const AUTO_SAVE_DELAY_MS: u64 = 5_000;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    ui: UiHost,
    ctx: TankContext,
    ph: PhControl,
    thermal: Thermostat,
    /// Monotonic time seen at the start of the latest tick.
    now_ms: u64,
    tick_count: u64,
    last_telemetry_ms: u64,
    /// `false` after an actuator write failed; the next tick re-applies.
    actuators_synced: bool,
    config_dirty: bool,
    dirty_since_ms: u64,
}

impl AppService {
    /// Construct the service from configuration. The clock marks the
    /// reference point for the first solenoid change.
    pub fn new(config: TankConfig, clock: &impl ClockPort) -> Self {
        let now_ms = clock.now_ms();
        let mut ph = PhControl::new(config.target_ph, config.ph_min_dwell_ms(), clock);
        ph.set_pid(Self::pid_tunings(&config));
        let thermal = Self::thermostat_for(&config);
        let mut ctx = TankContext::new(config);
        ctx.uptime_ms = now_ms;
        ctx.now = clock.wall_clock();

        Self {
            ui: UiHost::new(),
            ctx,
            ph,
            thermal,
            now_ms,
            tick_count: 0,
            last_telemetry_ms: now_ms,
            actuators_synced: false,
            config_dirty: false,
            dirty_since_ms: 0,
        }
    }

    fn pid_tunings(config: &TankConfig) -> Option<PidTunings> {
        config.pid_enabled.then_some(PidTunings {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
        })
    }

    fn thermostat_for(config: &TankConfig) -> Thermostat {
        Thermostat::new(
            config.heater,
            config.target_temperature_c,
            config.thermal_hysteresis_c,
            u64::from(config.chiller_min_dwell_secs) * 1000,
        )
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the initial screen.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        let screen = self.ui.active_id();
        sink.emit(&AppEvent::Started(screen));
        info!("AppService started on {}", screen.name());
    }

    /// Network identity for the address screen.
    pub fn set_device_info(&mut self, device: DeviceInfo) {
        self.ctx.device = device;
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    pub fn tick(
        &mut self,
        clock: &impl ClockPort,
        probes: &mut SensorHub<impl PhProbePort, impl TemperatureProbePort>,
        hw: &mut impl ActuatorPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        self.now_ms = clock.now_ms();
        self.ctx.uptime_ms = self.now_ms;
        self.ctx.now = clock.wall_clock();

        // 1. Staged screen becomes active; its calibration flag goes with it.
        if let Some((from, to)) = self.ui.advance() {
            sink.emit(&AppEvent::ScreenChanged { from, to });
            if to == ScreenId::SeePhSlope {
                probes.ph.request_slope();
            }
        }
        self.ph.set_calibrating(self.ui.in_calibration());

        // 2. Probes
        self.ctx.sensors = probes.read_all(&self.ctx.sensors);

        // 3. pH loop (the solenoid starts off and stays off until a reading)
        let mut changed = false;
        let ph_change = self
            .ctx
            .sensors
            .ph
            .and_then(|ph| self.ph.update(ph, clock));
        if let Some(change) = ph_change {
            changed = true;
            sink.emit(&AppEvent::SolenoidChanged {
                on: change.on,
                elapsed_ms: change.elapsed_ms,
                at: change.at,
            });
        }

        // 4. Thermal loop
        let thermal_change = match self.ctx.sensors.temperature_c {
            Some(c) => self.thermal.update(c, self.now_ms),
            None => self.thermal.release(self.now_ms),
        };
        if let Some(on) = thermal_change {
            changed = true;
            sink.emit(&AppEvent::ThermalChanged {
                on,
                heater: self.thermal.is_heater(),
            });
        }

        // 5. Actuators
        if changed || !self.actuators_synced {
            self.apply_actuators(hw);
        }

        // 6. Telemetry
        let interval_ms = u64::from(self.ctx.config.telemetry_interval_secs) * 1000;
        if self.now_ms.saturating_sub(self.last_telemetry_ms) >= interval_ms {
            self.last_telemetry_ms = self.now_ms;
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }

        // 7. Display
        self.ui.render(&self.ctx, display, sink);
    }

    // ── Operator input ────────────────────────────────────────

    /// Feed one keypad character to the active screen and apply whatever
    /// settings it committed.
    pub fn handle_key(
        &mut self,
        key: char,
        clock: &mut impl ClockPort,
        probes: &mut SensorHub<impl PhProbePort, impl TemperatureProbePort>,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        self.ui.handle_key(key, &mut self.ctx);
        while let Some(cmd) = self.ctx.next_request() {
            self.handle_command(cmd, clock, probes, hw, sink);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a settings change or device request.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        clock: &mut impl ClockPort,
        probes: &mut SensorHub<impl PhProbePort, impl TemperatureProbePort>,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetTargetPh(ph) => {
                let mut cfg = self.ctx.config.clone();
                cfg.target_ph = ph;
                self.apply_config(cfg, hw, sink);
            }
            AppCommand::SetTargetTemperature(c) => {
                let mut cfg = self.ctx.config.clone();
                cfg.target_temperature_c = c;
                self.apply_config(cfg, hw, sink);
            }
            AppCommand::SetHeater(heater) => {
                let mut cfg = self.ctx.config.clone();
                cfg.heater = heater;
                self.apply_config(cfg, hw, sink);
            }
            AppCommand::SetPidEnabled(on) => {
                let mut cfg = self.ctx.config.clone();
                cfg.pid_enabled = on;
                self.apply_config(cfg, hw, sink);
            }
            AppCommand::SetKp(v) => {
                let mut cfg = self.ctx.config.clone();
                cfg.kp = v;
                self.apply_config(cfg, hw, sink);
            }
            AppCommand::SetKi(v) => {
                let mut cfg = self.ctx.config.clone();
                cfg.ki = v;
                self.apply_config(cfg, hw, sink);
            }
            AppCommand::SetKd(v) => {
                let mut cfg = self.ctx.config.clone();
                cfg.kd = v;
                self.apply_config(cfg, hw, sink);
            }
            AppCommand::SetTankId(id) => {
                let mut cfg = self.ctx.config.clone();
                cfg.tank_id = id;
                self.apply_config(cfg, hw, sink);
            }
            AppCommand::SetGoogleSheetInterval(mins) => {
                let mut cfg = self.ctx.config.clone();
                cfg.google_sheet_interval_mins = mins;
                self.apply_config(cfg, hw, sink);
            }
            AppCommand::CalibratePh(buffer) => probes.ph.calibrate_midpoint(buffer),
            AppCommand::ClearPhCalibration => probes.ph.clear_calibration(),
            AppCommand::CalibrateTemperature(actual) => probes.temperature.calibrate(actual),
            AppCommand::SetDateTime(at) => {
                clock.set_wall_clock(at);
                self.ctx.now = clock.wall_clock();
            }
        }
    }

    /// Validate and adopt a new configuration, pushing the changes into
    /// the controllers. Invalid configs are logged and dropped.
    fn apply_config(
        &mut self,
        cfg: TankConfig,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        if let Err(e) = cfg.validate() {
            warn!("Rejected config change: {}", e);
            return;
        }
        if cfg == self.ctx.config {
            return;
        }
        let old = core::mem::replace(&mut self.ctx.config, cfg);
        let new = &self.ctx.config;

        // New set point and dwell apply from the next tick.
        self.ph.set_target_ph(new.target_ph);
        self.ph.set_min_dwell_ms(new.ph_min_dwell_ms());
        self.ph.set_pid(Self::pid_tunings(new));

        if new.heater != old.heater
            || new.thermal_hysteresis_c != old.thermal_hysteresis_c
            || new.chiller_min_dwell_secs != old.chiller_min_dwell_secs
        {
            let was_on = self.thermal.is_on();
            self.thermal = Self::thermostat_for(new);
            if was_on {
                sink.emit(&AppEvent::ThermalChanged {
                    on: false,
                    heater: old.heater,
                });
                self.apply_actuators(hw);
            }
        } else {
            self.thermal.set_target(new.target_temperature_c);
        }

        self.mark_config_dirty();
        info!("Configuration updated at runtime");
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            at: self.ctx.now,
            tank_id: self.ctx.config.tank_id,
            ph: self.ctx.sensors.ph,
            target_ph: self.ph.target_ph(),
            temperature_c: self.ctx.sensors.temperature_c,
            target_temperature_c: self.thermal.target(),
            solenoid_on: self.ph.is_on(),
            thermal_on: self.thermal.is_on(),
            screen: self.ui.active_id(),
        }
    }

    pub fn solenoid_on(&self) -> bool {
        self.ph.is_on()
    }

    pub fn thermal_on(&self) -> bool {
        self.thermal.is_on()
    }

    pub fn active_screen(&self) -> ScreenId {
        self.ui.active_id()
    }

    /// Screen waiting to be swapped in on the next tick.
    pub fn staged_screen(&self) -> Option<ScreenId> {
        self.ui.staged_id()
    }

    /// `true` while the pH loop is held by a calibration screen.
    pub fn in_calibration(&self) -> bool {
        self.ph.is_calibrating()
    }

    pub fn context(&self) -> &TankContext {
        &self.ctx
    }

    pub fn ui(&self) -> &UiHost {
        &self.ui
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> TankConfig {
        self.ctx.config.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Drive both outputs to the controllers' states.
    fn apply_actuators(&mut self, hw: &mut impl ActuatorPort) {
        let solenoid = hw.set_solenoid(self.ph.is_on());
        let thermal = hw.set_thermal(self.thermal.is_on());
        self.actuators_synced = true;
        if let Err(e) = solenoid {
            warn!("Solenoid write failed: {}", e);
            self.actuators_synced = false;
        }
        if let Err(e) = thermal {
            warn!("Thermal write failed: {}", e);
            self.actuators_synced = false;
        }
        self.ctx.solenoid_on = self.ph.is_on();
        self.ctx.thermal_on = self.thermal.is_on();
    }

    /// Release every output (shutdown or fatal error).
    pub fn shutdown(&mut self, hw: &mut impl ActuatorPort) {
        if let Err(e) = hw.all_off() {
            warn!("Shutdown: actuator release failed: {}", e);
        }
    }

    // ── Config dirty-flag management ──────────────────────────

    /// Mark the config as modified.
    fn mark_config_dirty(&mut self) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_ms = self.now_ms;
        }
    }

    /// Save once the config has been dirty for five seconds. Returns `true`
    /// if it was saved.
    pub fn auto_save_if_needed(&mut self, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        if self.now_ms.saturating_sub(self.dirty_since_ms) < AUTO_SAVE_DELAY_MS {
            return false;
        }
        match storage.save(&self.ctx.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config auto-saved to NVS");
                true
            }
            Err(e) => {
                warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
