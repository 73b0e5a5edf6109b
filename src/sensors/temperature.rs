//! Tank temperature probe.
//!
//! Keeps a ring buffer of raw samples and reports their running average
//! plus a calibration offset. On the device the samples come from an NTC
//! thermistor (10 kOhm @ 25 C, B = 3950) in a divider with a fixed
//! 10 kOhm resistor, converted with [`ntc_celsius`].

use log::{info, warn};

use crate::app::ports::TemperatureProbePort;
use crate::error::SensorError;

const RING_BUF_CAP: usize = 10;

/// Consecutive bad samples after which the average is discarded.
const FAULT_LIMIT: u8 = 3;

/// Plausible raw range; anything outside is a wiring fault.
const RAW_MIN_C: f32 = -20.0;
const RAW_MAX_C: f32 = 120.0;

const R25: f32 = 10_000.0;
const BETA: f32 = 3950.0;
const T25_K: f32 = 298.15;
const R_DIVIDER: f32 = 10_000.0;
const V_REF_MV: f32 = 3300.0;

/// Convert the divider voltage (millivolts) to Celsius with the simplified
/// Beta equation. `None` for an open or shorted thermistor.
pub fn ntc_celsius(millivolts: u16) -> Option<f32> {
    let v = f32::from(millivolts);
    if v <= 10.0 || v >= V_REF_MV - 10.0 {
        return None;
    }
    let r_ntc = R_DIVIDER * v / (V_REF_MV - v);
    let inv_t = (1.0 / T25_K) + (1.0 / BETA) * (r_ntc / R25).ln();
    if inv_t <= 0.0 {
        return None;
    }
    Some((1.0 / inv_t) - 273.15)
}

pub struct TemperatureProbe {
    ring: [f32; RING_BUF_CAP],
    head: usize,
    count: usize,
    /// Added to the raw average.
    correction_c: f32,
    consecutive_faults: u8,
}

impl TemperatureProbe {
    pub fn new() -> Self {
        Self {
            ring: [0.0; RING_BUF_CAP],
            head: 0,
            count: 0,
            correction_c: 0.0,
            consecutive_faults: 0,
        }
    }

    /// Probe with a previously stored calibration offset.
    pub fn with_correction(correction_c: f32) -> Self {
        Self {
            correction_c,
            ..Self::new()
        }
    }

    pub fn push_sample(&mut self, raw_c: f32) {
        if !(RAW_MIN_C..=RAW_MAX_C).contains(&raw_c) {
            warn!("Temperature probe: discarding sample {:.2} C", raw_c);
            self.record_fault();
            return;
        }
        self.consecutive_faults = 0;
        self.ring[self.head] = raw_c;
        self.head = (self.head + 1) % RING_BUF_CAP;
        if self.count < RING_BUF_CAP {
            self.count += 1;
        }
    }

    /// A sample could not be taken (ADC error, open or shorted thermistor).
    /// After [`FAULT_LIMIT`] in a row the buffered average is dropped and
    /// the probe reports no reading until fresh samples arrive.
    pub fn record_fault(&mut self) {
        self.consecutive_faults = self.consecutive_faults.saturating_add(1);
        if self.consecutive_faults >= FAULT_LIMIT && self.count > 0 {
            warn!("Temperature probe: {} faults in a row, reading invalid", FAULT_LIMIT);
            self.count = 0;
            self.head = 0;
        }
    }

    pub fn correction(&self) -> f32 {
        self.correction_c
    }

    fn raw_average(&self) -> Option<f32> {
        if self.count == 0 {
            return None;
        }
        let sum: f32 = self.ring[..self.count].iter().sum();
        Some(sum / self.count as f32)
    }
}

impl Default for TemperatureProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl TemperatureProbePort for TemperatureProbe {
    fn temperature_c(&self) -> Result<f32, SensorError> {
        self.raw_average()
            .map(|avg| avg + self.correction_c)
            .ok_or(SensorError::NoReading)
    }

    fn calibrate(&mut self, actual_c: f32) {
        let Some(avg) = self.raw_average() else {
            warn!("Temperature calibration ignored: no samples yet");
            return;
        };
        self.correction_c = actual_c - avg;
        info!(
            "Temperature calibrated: offset {:+.2} C (raw {:.2}, actual {:.2})",
            self.correction_c, avg, actual_c
        );
    }
}
