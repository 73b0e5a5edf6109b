//! Leaf screens reached from the main menu.
//!
//! | Kind               | Keys                                        | Result                  |
//! |--------------------|---------------------------------------------|-------------------------|
//! | `Info`             | any                                         | back to menu            |
//! | `Number`           | `0-9` `*` (point) `B` (erase) `#`/`A` `D`   | queues a set command    |
//! | `Toggle`           | `1` `9` `D`                                 | queues a set command    |
//! | `ClearCalibration` | `A` confirm, `D` cancel                     | queues clear request    |
//! | `SetTime`          | as `Number`, five fields in turn            | queues the new date     |
//!
//! Leaf screens never talk to devices. Committed values go onto the
//! context's request queue as [`AppCommand`]s.

use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};

use super::context::TankContext;
use super::entry::NumberEntry;
use super::menu::{SetCommand, ViewCommand};
use super::{Reading, ScreenId, write_row};
use crate::app::commands::AppCommand;
use crate::app::ports::DisplayPort;

/// Outcome of a key press on a leaf screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafOutcome {
    Stay,
    /// Return to the main menu.
    Done,
}

// ---------------------------------------------------------------------------
// Numeric fields
// ---------------------------------------------------------------------------

/// Settings entered as a single number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberField {
    PhTarget,
    TemperatureTarget,
    GoogleMins,
    Kp,
    Ki,
    Kd,
    TankId,
    /// Buffer solution pH for a midpoint calibration.
    PhCalibration,
    /// Reference thermometer reading.
    TemperatureCalibration,
}

impl NumberField {
    fn id(self) -> ScreenId {
        match self {
            Self::PhTarget => ScreenId::SetPhSetPoint,
            Self::TemperatureTarget => ScreenId::SetTempSetPoint,
            Self::GoogleMins => ScreenId::SetGoogleSheetInterval,
            Self::Kp => ScreenId::SetKp,
            Self::Ki => ScreenId::SetKi,
            Self::Kd => ScreenId::SetKd,
            Self::TankId => ScreenId::SetTankId,
            Self::PhCalibration => ScreenId::PhCalibration,
            Self::TemperatureCalibration => ScreenId::TemperatureCalibration,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Self::PhTarget => "Set pH target",
            Self::TemperatureTarget => "Set Temperature",
            Self::GoogleMins => "G Sheet Minutes",
            Self::Kp => "Set KP",
            Self::Ki => "Set KI",
            Self::Kd => "Set KD",
            Self::TankId => "Set Tank ID#",
            Self::PhCalibration => "pH buffer value",
            Self::TemperatureCalibration => "Real Temperature",
        }
    }

    fn is_integer(self) -> bool {
        matches!(self, Self::GoogleMins | Self::TankId)
    }

    /// Accepted inclusive range.
    fn range(self) -> (f32, f32) {
        match self {
            Self::PhTarget | Self::PhCalibration => (0.0, 14.0),
            Self::TemperatureTarget | Self::TemperatureCalibration => (0.0, 40.0),
            Self::GoogleMins => (1.0, 1440.0),
            Self::Kp | Self::Ki | Self::Kd => (0.0, 1_000_000.0),
            Self::TankId => (0.0, u16::MAX as f32),
        }
    }

    fn command(self, value: f32) -> AppCommand {
        match self {
            Self::PhTarget => AppCommand::SetTargetPh(value),
            Self::TemperatureTarget => AppCommand::SetTargetTemperature(value),
            Self::GoogleMins => AppCommand::SetGoogleSheetInterval(value as u16),
            Self::Kp => AppCommand::SetKp(value),
            Self::Ki => AppCommand::SetKi(value),
            Self::Kd => AppCommand::SetKd(value),
            Self::TankId => AppCommand::SetTankId(value as u16),
            Self::PhCalibration => AppCommand::CalibratePh(value),
            Self::TemperatureCalibration => AppCommand::CalibrateTemperature(value),
        }
    }

    /// Value shown before anything is typed.
    fn render_current(self, ctx: &TankContext, display: &mut impl DisplayPort) {
        let cfg = &ctx.config;
        match self {
            Self::PhTarget => write_row(display, 1, format_args!("{:5.3}", cfg.target_ph)),
            Self::TemperatureTarget => write_row(
                display,
                1,
                format_args!("{:5.2}", cfg.target_temperature_c),
            ),
            Self::GoogleMins => write_row(
                display,
                1,
                format_args!("{}", cfg.google_sheet_interval_mins),
            ),
            Self::Kp => write_row(display, 1, format_args!("{:.1}", cfg.kp)),
            Self::Ki => write_row(display, 1, format_args!("{:.1}", cfg.ki)),
            Self::Kd => write_row(display, 1, format_args!("{:.1}", cfg.kd)),
            Self::TankId => write_row(display, 1, format_args!("{}", cfg.tank_id)),
            Self::PhCalibration => {
                write_row(display, 1, format_args!("pH={:5.3}", Reading(ctx.sensors.ph)))
            }
            Self::TemperatureCalibration => write_row(
                display,
                1,
                format_args!("T={:5.2}", Reading(ctx.sensors.temperature_c)),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NumberScreen {
    field: NumberField,
    entry: NumberEntry,
}

impl NumberScreen {
    fn new(field: NumberField) -> Self {
        let entry = if field.is_integer() {
            NumberEntry::integer()
        } else {
            NumberEntry::decimal()
        };
        Self { field, entry }
    }

    fn handle_key(&mut self, key: char, ctx: &mut TankContext) -> LeafOutcome {
        match key {
            'D' => LeafOutcome::Done,
            '#' | 'A' => self.commit(ctx),
            _ => {
                self.entry.push_key(key);
                LeafOutcome::Stay
            }
        }
    }

    fn commit(&mut self, ctx: &mut TankContext) -> LeafOutcome {
        let Some(value) = self.entry.value() else {
            return LeafOutcome::Stay;
        };
        let (lo, hi) = self.field.range();
        if !(lo..=hi).contains(&value) {
            warn!(
                "{}: {} outside {}..={}",
                self.field.prompt(),
                value,
                lo,
                hi
            );
            self.entry.clear();
            return LeafOutcome::Stay;
        }
        info!("{}: {}", self.field.prompt(), value);
        ctx.request(self.field.command(value));
        LeafOutcome::Done
    }

    fn render(&self, ctx: &TankContext, display: &mut impl DisplayPort) {
        display.write_line(self.field.prompt(), 0);
        if self.entry.is_empty() {
            self.field.render_current(ctx, display);
        } else {
            display.write_line(self.entry.as_str(), 1);
        }
    }
}

// ---------------------------------------------------------------------------
// Toggles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleField {
    /// `1` heater, `9` chiller.
    ChillOrHeat,
    /// `1` on, `9` off.
    Pid,
}

impl ToggleField {
    fn id(self) -> ScreenId {
        match self {
            Self::ChillOrHeat => ScreenId::SetChillOrHeat,
            Self::Pid => ScreenId::EnablePid,
        }
    }

    fn handle_key(self, key: char, ctx: &mut TankContext) -> LeafOutcome {
        let choice = match key {
            '1' => true,
            '9' => false,
            'D' => return LeafOutcome::Done,
            _ => return LeafOutcome::Stay,
        };
        ctx.request(match self {
            Self::ChillOrHeat => AppCommand::SetHeater(choice),
            Self::Pid => AppCommand::SetPidEnabled(choice),
        });
        LeafOutcome::Done
    }

    fn render(self, ctx: &TankContext, display: &mut impl DisplayPort) {
        match self {
            Self::ChillOrHeat => {
                write_row(
                    display,
                    0,
                    format_args!(
                        "Now: {}",
                        if ctx.config.heater { "Heat" } else { "Chill" }
                    ),
                );
                display.write_line("1:Heat  9:Chill", 1);
            }
            Self::Pid => {
                write_row(
                    display,
                    0,
                    format_args!(
                        "PID is {}",
                        if ctx.config.pid_enabled { "ON" } else { "OFF" }
                    ),
                );
                display.write_line("1:On  9:Off", 1);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Date and time
// ---------------------------------------------------------------------------

const TIME_FIELDS: [(&str, u32, u32); 5] = [
    ("Set Year (YYYY):", 2000, 2099),
    ("Month (1-12):", 1, 12),
    ("Day (1-31):", 1, 31),
    ("Hour (0-23):", 0, 23),
    ("Minute (0-59):", 0, 59),
];

/// Year, month, day, hour and minute, entered one after another.
#[derive(Debug, Clone)]
pub struct SetTimeScreen {
    field: usize,
    values: [u32; 5],
    entry: NumberEntry,
}

impl SetTimeScreen {
    fn new() -> Self {
        Self {
            field: 0,
            values: [0; 5],
            entry: NumberEntry::integer(),
        }
    }

    /// Index of the field being entered.
    pub fn field(&self) -> usize {
        self.field
    }

    fn handle_key(&mut self, key: char, ctx: &mut TankContext) -> LeafOutcome {
        match key {
            'D' => return LeafOutcome::Done,
            '#' | 'A' => {}
            _ => {
                self.entry.push_key(key);
                return LeafOutcome::Stay;
            }
        }

        let Some(value) = self.entry.whole() else {
            return LeafOutcome::Stay;
        };
        self.entry.clear();
        let (prompt, lo, hi) = TIME_FIELDS[self.field];
        if !(lo..=hi).contains(&value) {
            warn!("{} {} out of range", prompt, value);
            return LeafOutcome::Stay;
        }
        self.values[self.field] = value;
        if self.field + 1 < TIME_FIELDS.len() {
            self.field += 1;
            return LeafOutcome::Stay;
        }

        match self.assemble() {
            Some(at) => {
                info!("Date/time set to {}", at.format("%Y-%m-%d %H:%M"));
                ctx.request(AppCommand::SetDateTime(at));
                LeafOutcome::Done
            }
            None => {
                warn!(
                    "Invalid date {}-{:02}-{:02}",
                    self.values[0], self.values[1], self.values[2]
                );
                // Re-enter from the day.
                self.field = 2;
                LeafOutcome::Stay
            }
        }
    }

    fn assemble(&self) -> Option<NaiveDateTime> {
        let [year, month, day, hour, minute] = self.values;
        NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?.and_hms_opt(hour, minute, 0)
    }

    fn render(&self, ctx: &TankContext, display: &mut impl DisplayPort) {
        display.write_line(TIME_FIELDS[self.field].0, 0);
        if self.entry.is_empty() {
            write_row(display, 1, format_args!("{}", ctx.now.format("%Y-%m-%d %H:%M")));
        } else {
            display.write_line(self.entry.as_str(), 1);
        }
    }
}

// ---------------------------------------------------------------------------
// LeafScreen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum LeafScreen {
    Info(ViewCommand),
    Number(NumberScreen),
    Toggle(ToggleField),
    ClearCalibration,
    SetTime(SetTimeScreen),
}

impl LeafScreen {
    pub fn for_view(cmd: ViewCommand) -> Self {
        Self::Info(cmd)
    }

    pub fn for_set(cmd: SetCommand) -> Self {
        let number = |field| Self::Number(NumberScreen::new(field));
        match cmd {
            SetCommand::Calibration => number(NumberField::PhCalibration),
            SetCommand::CalibrationClear => Self::ClearCalibration,
            SetCommand::ChillOrHeat => Self::Toggle(ToggleField::ChillOrHeat),
            SetCommand::GoogleMins => number(NumberField::GoogleMins),
            SetCommand::Ph => number(NumberField::PhTarget),
            SetCommand::Kd => number(NumberField::Kd),
            SetCommand::Ki => number(NumberField::Ki),
            SetCommand::Kp => number(NumberField::Kp),
            SetCommand::PidOnOff => Self::Toggle(ToggleField::Pid),
            SetCommand::TankId => number(NumberField::TankId),
            SetCommand::TempCalibration => number(NumberField::TemperatureCalibration),
            SetCommand::Temperature => number(NumberField::TemperatureTarget),
            SetCommand::Time => Self::SetTime(SetTimeScreen::new()),
        }
    }

    pub fn id(&self) -> ScreenId {
        match self {
            Self::Info(cmd) => match cmd {
                ViewCommand::GoogleMins => ScreenId::SeeGoogleMins,
                ViewCommand::Address => ScreenId::SeeDeviceAddress,
                ViewCommand::LogFile => ScreenId::SeeLogFile,
                ViewCommand::Pid => ScreenId::SeePidConstants,
                ViewCommand::PhSlope => ScreenId::SeePhSlope,
                ViewCommand::TankId => ScreenId::SeeTankId,
                ViewCommand::Time => ScreenId::SeeDeviceUptime,
                ViewCommand::Version => ScreenId::SeeVersion,
            },
            Self::Number(screen) => screen.field.id(),
            Self::Toggle(field) => field.id(),
            Self::ClearCalibration => ScreenId::ClearCalibration,
            Self::SetTime(_) => ScreenId::SetTime,
        }
    }

    /// `true` for the pH probe calibration procedure.
    pub fn is_calibration(&self) -> bool {
        matches!(
            self,
            Self::Number(NumberScreen {
                field: NumberField::PhCalibration,
                ..
            })
        )
    }

    pub fn handle_key(&mut self, key: char, ctx: &mut TankContext) -> LeafOutcome {
        match self {
            Self::Info(_) => LeafOutcome::Done,
            Self::Number(screen) => screen.handle_key(key, ctx),
            Self::Toggle(field) => field.handle_key(key, ctx),
            Self::ClearCalibration => match key {
                'A' => {
                    ctx.request(AppCommand::ClearPhCalibration);
                    LeafOutcome::Done
                }
                'D' => LeafOutcome::Done,
                _ => LeafOutcome::Stay,
            },
            Self::SetTime(screen) => screen.handle_key(key, ctx),
        }
    }

    pub fn render(&self, ctx: &TankContext, display: &mut impl DisplayPort) {
        match self {
            Self::Info(cmd) => render_info(*cmd, ctx, display),
            Self::Number(screen) => screen.render(ctx, display),
            Self::Toggle(field) => field.render(ctx, display),
            Self::ClearCalibration => {
                display.write_line("Clear pH calibra", 0);
                display.write_line("A: yes   D: no", 1);
            }
            Self::SetTime(screen) => screen.render(ctx, display),
        }
    }
}

fn render_info(cmd: ViewCommand, ctx: &TankContext, display: &mut impl DisplayPort) {
    let cfg = &ctx.config;
    match cmd {
        ViewCommand::GoogleMins => {
            display.write_line("Google Sheet Int", 0);
            write_row(
                display,
                1,
                format_args!("{} min", cfg.google_sheet_interval_mins),
            );
        }
        ViewCommand::Address => {
            match ctx.device.ip {
                Some([a, b, c, d]) => write_row(display, 0, format_args!("{}.{}.{}.{}", a, b, c, d)),
                None => display.write_line("No IP address", 0),
            }
            let m = ctx.device.mac;
            write_row(
                display,
                1,
                format_args!(
                    "M:{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
                    m[0], m[1], m[2], m[3], m[4], m[5]
                ),
            );
        }
        ViewCommand::LogFile => {
            display.write_line("Current Log File", 0);
            write_row(display, 1, format_args!("{}", ctx.now.format("%Y%m%d.txt")));
        }
        ViewCommand::Pid => {
            write_row(display, 0, format_args!("Kp:{:.1} Ki:{:.1}", cfg.kp, cfg.ki));
            write_row(
                display,
                1,
                format_args!(
                    "Kd:{:.1} PID {}",
                    cfg.kd,
                    if cfg.pid_enabled { "ON" } else { "OFF" }
                ),
            );
        }
        ViewCommand::PhSlope => {
            display.write_line("pH slope", 0);
            match ctx.sensors.ph_slope {
                Some(s) => write_row(
                    display,
                    1,
                    format_args!(
                        "{:.1}%,{:.1}%,{:.1}",
                        s.acid_percent, s.base_percent, s.offset_mv
                    ),
                ),
                None => display.write_line("Not reported", 1),
            }
        }
        ViewCommand::TankId => {
            display.write_line("Tank ID:", 0);
            write_row(display, 1, format_args!("{}", cfg.tank_id));
        }
        ViewCommand::Time => {
            write_row(display, 0, format_args!("{}", ctx.now.format("%Y-%m-%d %H:%M")));
            let secs = ctx.uptime_ms / 1000;
            write_row(
                display,
                1,
                format_args!(
                    "Up {}d {}h {}m {}s",
                    secs / 86_400,
                    secs / 3600 % 24,
                    secs / 60 % 60,
                    secs % 60
                ),
            );
        }
        ViewCommand::Version => {
            display.write_line("Software Version", 0);
            display.write_line(env!("CARGO_PKG_VERSION"), 1);
        }
    }
}
