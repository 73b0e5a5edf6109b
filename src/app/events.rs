//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them: write the serial log protocol, go
//! through the `log` facade, or collect them in a test.

use chrono::NaiveDateTime;

use crate::ui::ScreenId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the initial screen).
    Started(ScreenId),

    /// The UI host swapped in a new screen.
    ScreenChanged { from: ScreenId, to: ScreenId },

    /// The CO2 solenoid changed state.
    SolenoidChanged {
        on: bool,
        /// Milliseconds since the previous change.
        elapsed_ms: u64,
        /// Wall-clock time of the change.
        at: NaiveDateTime,
    },

    /// The heater/chiller output changed state.
    ThermalChanged { on: bool, heater: bool },

    /// A menu label's checksum moved away from its baseline.
    LabelDrift {
        label: &'static str,
        old_sum: u32,
        new_sum: u32,
    },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub at: NaiveDateTime,
    pub tank_id: u16,
    /// `None` until the probe has reported.
    pub ph: Option<f32>,
    pub target_ph: f32,
    pub temperature_c: Option<f32>,
    pub target_temperature_c: f32,
    pub solenoid_on: bool,
    pub thermal_on: bool,
    pub screen: ScreenId,
}
