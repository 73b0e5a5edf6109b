//! Heater / chiller on-off control with hysteresis.
//!
//! The tank has either a heater or a chiller on the thermal relay. Both use
//! a half-band of `hysteresis_c` around the target so the relay does not
//! chatter on sensor noise. A chiller's compressor additionally gets a
//! minimum dwell between changes.

use log::{info, warn};

/// On-off thermostat for a single heater or chiller output.
#[derive(Debug, Clone)]
pub struct Thermostat {
    heater: bool,
    target_c: f32,
    hysteresis_c: f32,
    chiller_min_dwell_ms: u64,
    output_on: bool,
    last_change_ms: Option<u64>,
}

impl Thermostat {
    pub fn new(heater: bool, target_c: f32, hysteresis_c: f32, chiller_min_dwell_ms: u64) -> Self {
        Self {
            heater,
            target_c,
            hysteresis_c,
            chiller_min_dwell_ms,
            output_on: false,
            last_change_ms: None,
        }
    }

    /// Evaluate one control tick. Returns the new output state on a change.
    pub fn update(&mut self, temperature_c: f32, now_ms: u64) -> Option<bool> {
        let low = self.target_c - self.hysteresis_c;
        let high = self.target_c + self.hysteresis_c;

        let want_on = if self.heater {
            if temperature_c < low {
                true
            } else if temperature_c > high {
                false
            } else {
                self.output_on
            }
        } else if temperature_c > high {
            true
        } else if temperature_c < low {
            false
        } else {
            self.output_on
        };

        if want_on == self.output_on {
            return None;
        }

        if !self.heater {
            if let Some(last) = self.last_change_ms {
                if now_ms.saturating_sub(last) < self.chiller_min_dwell_ms {
                    return None;
                }
            }
        }

        self.output_on = want_on;
        self.last_change_ms = Some(now_ms);
        info!(
            "Thermal: {} {} at {:.2} C (target {:.2} C)",
            if self.heater { "heater" } else { "chiller" },
            if want_on { "ON" } else { "OFF" },
            temperature_c,
            self.target_c
        );
        Some(want_on)
    }

    /// Tick without a usable temperature: the output is switched off at
    /// once, whatever the dwell. Returns `Some(false)` if it was on.
    pub fn release(&mut self, now_ms: u64) -> Option<bool> {
        if !self.output_on {
            return None;
        }
        self.output_on = false;
        self.last_change_ms = Some(now_ms);
        warn!(
            "Thermal: {} OFF, no temperature reading",
            if self.heater { "heater" } else { "chiller" }
        );
        Some(false)
    }

    pub fn set_target(&mut self, target_c: f32) {
        self.target_c = target_c;
    }

    pub fn target(&self) -> f32 {
        self.target_c
    }

    pub fn is_heater(&self) -> bool {
        self.heater
    }

    pub fn is_on(&self) -> bool {
        self.output_on
    }
}
