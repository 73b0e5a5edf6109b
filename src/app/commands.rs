//! Inbound commands to the application service.
//!
//! Leaf screens never touch devices or controllers directly. They queue
//! these commands on the [`TankContext`](crate::ui::context::TankContext)
//! and the [`AppService`](super::service::AppService) applies them after
//! the key has been handled.

use chrono::NaiveDateTime;

/// Commands that screens send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// New pH set point.
    SetTargetPh(f32),
    /// New temperature set point (Celsius).
    SetTargetTemperature(f32),
    /// Select heater (`true`) or chiller (`false`) mode.
    SetHeater(bool),
    /// Enable or disable PID mode.
    SetPidEnabled(bool),
    SetKp(f32),
    SetKi(f32),
    SetKd(f32),
    SetTankId(u16),
    /// Spreadsheet upload interval in minutes.
    SetGoogleSheetInterval(u16),

    /// Single-point pH calibration at the given buffer value.
    CalibratePh(f32),
    /// Drop the pH probe's calibration.
    ClearPhCalibration,
    /// Offset the temperature probe so it reads the given value.
    CalibrateTemperature(f32),

    /// Set the wall clock.
    SetDateTime(NaiveDateTime),
}
