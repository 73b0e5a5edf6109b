//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (ESP-IDF logger on the device, whatever logger the
//! host installs otherwise).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::ui::Reading;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | tank={} | pH={:.3}/{:.3} | T={:.2}/{:.2}\u{00b0}C | \
                     co2={} thermal={} | screen={}",
                    t.tank_id,
                    Reading(t.ph),
                    t.target_ph,
                    Reading(t.temperature_c),
                    t.target_temperature_c,
                    if t.solenoid_on { "ON" } else { "OFF" },
                    if t.thermal_on { "ON" } else { "OFF" },
                    t.screen.name(),
                );
            }
            AppEvent::ScreenChanged { from, to } => {
                info!("SCREEN | {} -> {}", from.name(), to.name());
            }
            AppEvent::SolenoidChanged { on, elapsed_ms, at } => {
                info!(
                    "CO2 | {} after {} ms at {}",
                    if *on { "on" } else { "off" },
                    elapsed_ms,
                    at.format("%Y-%m-%d %H:%M:%S")
                );
            }
            AppEvent::ThermalChanged { on, heater } => {
                info!(
                    "THERMAL | {} {}",
                    if *heater { "heater" } else { "chiller" },
                    if *on { "on" } else { "off" }
                );
            }
            AppEvent::LabelDrift {
                label,
                old_sum,
                new_sum,
            } => {
                warn!("CANARY | {} changed from {} to {}", label, old_sum, new_sum);
            }
            AppEvent::Started(screen) => {
                info!("START | initial_screen={}", screen.name());
            }
        }
    }
}

