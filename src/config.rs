//! System configuration parameters
//!
//! All tunable parameters for the tank controller. Values are loaded from
//! NVS at boot and changed at runtime through the "set" screens.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankConfig {
    // --- pH ---
    /// Target pH; CO2 is injected while the reading is above it
    pub target_ph: f32,
    /// Minimum time the CO2 solenoid stays in a state (seconds)
    pub ph_min_dwell_secs: u16,

    // --- Temperature ---
    /// Target water temperature (Celsius)
    pub target_temperature_c: f32,
    /// `true` = heater attached, `false` = chiller attached
    pub heater: bool,
    /// Half-band around the target before the thermal output switches (Celsius)
    pub thermal_hysteresis_c: f32,
    /// Minimum time the chiller compressor stays in a state (seconds)
    pub chiller_min_dwell_secs: u16,

    // --- PID ---
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub pid_enabled: bool,

    // --- Identity / logging ---
    /// Tank number shown on the display and in uploaded logs
    pub tank_id: u16,
    /// Spreadsheet upload interval (minutes)
    pub google_sheet_interval_mins: u16,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            // pH
            target_ph: 8.1,
            ph_min_dwell_secs: 10,

            // Temperature
            target_temperature_c: 16.75,
            heater: true,
            thermal_hysteresis_c: 0.05,
            chiller_min_dwell_secs: 30,

            // PID
            kp: 100_000.0,
            ki: 0.0,
            kd: 0.0,
            pid_enabled: false,

            tank_id: 0,
            google_sheet_interval_mins: 20,

            // Timing
            control_loop_interval_ms: 1000, // 1 Hz
            telemetry_interval_secs: 60,    // 1/min
        }
    }
}

impl TankConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=14.0).contains(&self.target_ph) {
            return Err(ConfigError::ValidationFailed("target_ph must be 0.0–14.0"));
        }
        if !(1..=600).contains(&self.ph_min_dwell_secs) {
            return Err(ConfigError::ValidationFailed(
                "ph_min_dwell_secs must be 1–600",
            ));
        }
        if !(0.0..=40.0).contains(&self.target_temperature_c) {
            return Err(ConfigError::ValidationFailed(
                "target_temperature_c must be 0.0–40.0",
            ));
        }
        if !(0.0..=2.0).contains(&self.thermal_hysteresis_c) {
            return Err(ConfigError::ValidationFailed(
                "thermal_hysteresis_c must be 0.0–2.0",
            ));
        }
        if self.chiller_min_dwell_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "chiller_min_dwell_secs must be 0–600",
            ));
        }
        if self.kp < 0.0 || self.ki < 0.0 || self.kd < 0.0 {
            return Err(ConfigError::ValidationFailed("PID gains must be >= 0"));
        }
        if !(1..=1440).contains(&self.google_sheet_interval_mins) {
            return Err(ConfigError::ValidationFailed(
                "google_sheet_interval_mins must be 1–1440",
            ));
        }
        if !(100..=5000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 100–5000",
            ));
        }
        if !(5..=3600).contains(&self.telemetry_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_secs must be 5–3600",
            ));
        }
        Ok(())
    }

    /// pH dwell in milliseconds.
    pub fn ph_min_dwell_ms(&self) -> u64 {
        u64::from(self.ph_min_dwell_secs) * 1000
    }
}
