//! Main menu: live status view plus the "view" and "set" submenus.
//!
//! ```text
//!  level1:   Status ◀──up/down──▶ View ◀──up/down──▶ Set   (wraps)
//!               │ right             │ right            │ right
//!               ▼                   ▼                  ▼
//!             View header        item 0..8          item 0..13
//!                                   │ right            │ right
//!                                   ▼                  ▼
//!                               leaf screen        leaf screen
//! ```
//!
//! Keys: `2` up, `8` down, `4` left, `6` right, `D` reset to the status view.
//! `A` and `B` jump straight to the pH and temperature set-point screens.

use log::warn;

use super::context::TankContext;
use super::leaf::LeafScreen;
use super::{Reading, Transition, write_row};
use crate::app::ports::{DisplayPort, LCD_COLS};

/// Temperatures are clamped to this range before display.
pub const TEMPERATURE_DISPLAY_MIN: f32 = 0.0;
pub const TEMPERATURE_DISPLAY_MAX: f32 = 99.99;

const VIEW_BANNER: &str = "View settings";
const SET_BANNER: &str = "Change settings ";
const KEY_HINT: &str = "<4   ^2  8v   6>";

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Items of the "view" submenu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ViewCommand {
    GoogleMins = 0,
    Address = 1,
    LogFile = 2,
    Pid = 3,
    PhSlope = 4,
    TankId = 5,
    Time = 6,
    Version = 7,
}

const VIEW_LABELS: [&str; ViewCommand::COUNT] = [
    "View Google mins",
    "View IP and MAC ",
    "View log file   ",
    "View PID        ",
    "View pH slope   ",
    "View tank ID    ",
    "View time       ",
    "View version    ",
];

impl ViewCommand {
    pub const COUNT: usize = 8;

    pub const ALL: [Self; Self::COUNT] = [
        Self::GoogleMins,
        Self::Address,
        Self::LogFile,
        Self::Pid,
        Self::PhSlope,
        Self::TankId,
        Self::Time,
        Self::Version,
    ];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Fixed-width menu label.
    pub fn label(self) -> &'static str {
        VIEW_LABELS[self as usize]
    }
}

/// Items of the "set" submenu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SetCommand {
    Calibration = 0,
    CalibrationClear = 1,
    ChillOrHeat = 2,
    GoogleMins = 3,
    Ph = 4,
    Kd = 5,
    Ki = 6,
    Kp = 7,
    PidOnOff = 8,
    TankId = 9,
    TempCalibration = 10,
    Temperature = 11,
    Time = 12,
}

const SET_LABELS: [&str; SetCommand::COUNT] = [
    "pH calibration  ",
    "Clear pH calibra",
    "Set chill/heat  ",
    "Set Google mins ",
    "Set pH target   ",
    "Set KD          ",
    "Set KI          ",
    "Set KP          ",
    "PID on/off      ",
    "Set Tank ID     ",
    "Temp calibration",
    "Set temperature ",
    "Set date/time   ",
];

impl SetCommand {
    pub const COUNT: usize = 13;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Calibration,
        Self::CalibrationClear,
        Self::ChillOrHeat,
        Self::GoogleMins,
        Self::Ph,
        Self::Kd,
        Self::Ki,
        Self::Kp,
        Self::PidOnOff,
        Self::TankId,
        Self::TempCalibration,
        Self::Temperature,
        Self::Time,
    ];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Fixed-width menu label.
    pub fn label(self) -> &'static str {
        SET_LABELS[self as usize]
    }
}

// ---------------------------------------------------------------------------
// Label canary
// ---------------------------------------------------------------------------

/// The label whose checksum is watched for memory corruption.
const CANARY: SetCommand = SetCommand::Ph;

/// A watched label no longer sums to its recorded baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelDrift {
    pub label: &'static str,
    pub old_sum: u32,
    pub new_sum: u32,
}

/// Sum of the character codes of the first [`LCD_COLS`] bytes of `label`.
pub fn label_checksum(label: &str) -> u32 {
    label.bytes().take(LCD_COLS).map(u32::from).sum()
}

/// Compare `label` against `baseline`. Returns the fresh sum and, when a
/// non-zero baseline differs from it, the drift to report.
pub fn check_label(baseline: u32, label: &'static str) -> (u32, Option<LabelDrift>) {
    let sum = label_checksum(label);
    let drift = (baseline != 0 && baseline != sum).then(|| LabelDrift {
        label: label.trim_end(),
        old_sum: baseline,
        new_sum: sum,
    });
    (sum, drift)
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Top-level mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Level1 {
    Status = 0,
    View = 1,
    Set = 2,
}

impl Level1 {
    const ALL: [Self; 3] = [Self::Status, Self::View, Self::Set];

    fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % 3]
    }

    fn prev(self) -> Self {
        Self::ALL[(self as usize + 2) % 3]
    }

    /// Number of items in this mode's submenu.
    pub fn item_count(self) -> usize {
        match self {
            Self::Status => 0,
            Self::View => ViewCommand::COUNT,
            Self::Set => SetCommand::COUNT,
        }
    }
}

/// Where the operator is in the menu tree. `level2 == None` means the
/// submenu header (or the status view) is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationPosition {
    pub level1: Level1,
    pub level2: Option<usize>,
}

impl NavigationPosition {
    pub const TOP: Self = Self {
        level1: Level1::Status,
        level2: None,
    };
}

/// Logical key events of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Left,
    Right,
    Reset,
    PhSetPoint,
    TemperatureSetPoint,
}

impl MenuKey {
    pub fn from_char(key: char) -> Option<Self> {
        match key {
            '2' => Some(Self::Up),
            '8' => Some(Self::Down),
            '4' => Some(Self::Left),
            '6' => Some(Self::Right),
            'D' => Some(Self::Reset),
            'A' => Some(Self::PhSetPoint),
            'B' => Some(Self::TemperatureSetPoint),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// MainMenu
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MainMenu {
    position: NavigationPosition,
    /// Last checksum of the canary label.
    label_baseline: u32,
}

impl MainMenu {
    pub fn new() -> Self {
        Self {
            position: NavigationPosition::TOP,
            label_baseline: label_checksum(CANARY.label()),
        }
    }

    pub fn position(&self) -> NavigationPosition {
        self.position
    }

    /// Handle a raw key. Returns a transition when an item is committed.
    pub fn handle_key(&mut self, key: char) -> Option<Transition> {
        match MenuKey::from_char(key)? {
            MenuKey::Up => self.up(),
            MenuKey::Down => self.down(),
            MenuKey::Left => self.left(),
            MenuKey::Right => return self.right(),
            MenuKey::Reset => self.reset(),
            MenuKey::PhSetPoint => {
                return Some(Transition::leaf(LeafScreen::for_set(SetCommand::Ph)));
            }
            MenuKey::TemperatureSetPoint => {
                return Some(Transition::leaf(LeafScreen::for_set(
                    SetCommand::Temperature,
                )));
            }
        }
        None
    }

    pub fn left(&mut self) {
        if self.position.level2.is_some() {
            self.position.level2 = None;
        } else {
            self.position.level1 = Level1::Status;
        }
    }

    /// Descend one level; on an item, commit it.
    pub fn right(&mut self) -> Option<Transition> {
        match self.position {
            NavigationPosition {
                level1: Level1::Status,
                ..
            } => {
                self.position = NavigationPosition {
                    level1: Level1::View,
                    level2: None,
                };
                None
            }
            NavigationPosition { level2: None, .. } => {
                self.position.level2 = Some(0);
                None
            }
            NavigationPosition {
                level1,
                level2: Some(idx),
            } => Self::commit(level1, idx),
        }
    }

    pub fn up(&mut self) {
        match self.position.level2 {
            None => self.position.level1 = self.position.level1.prev(),
            Some(idx) => {
                let count = self.position.level1.item_count();
                self.position.level2 = Some((idx + count - 1) % count);
            }
        }
    }

    pub fn down(&mut self) {
        match self.position.level2 {
            None => self.position.level1 = self.position.level1.next(),
            Some(idx) => {
                let count = self.position.level1.item_count();
                self.position.level2 = Some((idx + 1) % count);
            }
        }
    }

    pub fn reset(&mut self) {
        self.position = NavigationPosition::TOP;
    }

    fn commit(level1: Level1, idx: usize) -> Option<Transition> {
        let leaf = match level1 {
            Level1::View => LeafScreen::for_view(ViewCommand::from_index(idx)?),
            Level1::Set => LeafScreen::for_set(SetCommand::from_index(idx)?),
            Level1::Status => return None,
        };
        Some(Transition::leaf(leaf))
    }

    /// Menu whose recorded label sum is `baseline` instead of the real one.
    #[cfg(test)]
    pub(crate) fn with_label_baseline(baseline: u32) -> Self {
        Self {
            label_baseline: baseline,
            ..Self::new()
        }
    }

    /// Re-check the canary label and adopt the fresh sum as the baseline.
    pub fn check_labels(&mut self) -> Option<LabelDrift> {
        let (sum, drift) = check_label(self.label_baseline, CANARY.label());
        if let Some(d) = drift {
            warn!("{} changed from {} to {}", d.label, d.old_sum, d.new_sum);
        }
        self.label_baseline = sum;
        drift
    }

    pub fn render(&self, ctx: &TankContext, display: &mut impl DisplayPort) {
        let NavigationPosition { level1, level2 } = self.position;
        match (level1, level2) {
            (Level1::Status, _) => {
                Self::render_status(ctx, display);
                return;
            }
            (Level1::View, None) => display.write_line(VIEW_BANNER, 0),
            (Level1::Set, None) => display.write_line(SET_BANNER, 0),
            (Level1::View, Some(idx)) => {
                if let Some(cmd) = ViewCommand::from_index(idx) {
                    display.write_line(cmd.label(), 0);
                }
            }
            (Level1::Set, Some(idx)) => {
                if let Some(cmd) = SetCommand::from_index(idx) {
                    display.write_line(cmd.label(), 0);
                }
            }
        }
        display.write_line(KEY_HINT, 1);
    }

    /// Live pH and temperature against their targets.
    fn render_status(ctx: &TankContext, display: &mut impl DisplayPort) {
        write_row(
            display,
            0,
            format_args!(
                "pH={:5.3}   {:5.3}",
                Reading(ctx.sensors.ph),
                ctx.config.target_ph
            ),
        );
        let temperature = ctx
            .sensors
            .temperature_c
            .map(|c| c.clamp(TEMPERATURE_DISPLAY_MIN, TEMPERATURE_DISPLAY_MAX));
        write_row(
            display,
            1,
            format_args!(
                "T={:5.2} {} {:5.2}",
                Reading(temperature),
                if ctx.config.heater { 'H' } else { 'C' },
                ctx.config.target_temperature_c
            ),
        );
    }
}

impl Default for MainMenu {
    fn default() -> Self {
        Self::new()
    }
}
