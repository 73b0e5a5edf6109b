//! Operator interface: a screen host driving a two-line LCD and a keypad.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  UiHost                                                    │
//! │   active: Screen ──────────────┐                           │
//! │     MainMenu  (navigation)     │ handle_key() may stage    │
//! │     Leaf(..)  (view/set)       ▼                           │
//! │   next:   Option<Transition> { screen, calibration }       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Screens never replace themselves. A key handler returns a
//! [`Transition`]; the host stages it and swaps it in at the start of the
//! following tick ([`UiHost::advance`]). The calibration flag travels with
//! the staged screen so the pH loop learns about it on the same tick the
//! calibration screen becomes active.

pub mod context;
pub mod entry;
pub mod leaf;
pub mod menu;

use core::fmt::{self, Write as _};

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::{DisplayPort, EventSink, LCD_COLS};
use context::TankContext;
use leaf::{LeafOutcome, LeafScreen};
use menu::MainMenu;

// ---------------------------------------------------------------------------
// Screen identity
// ---------------------------------------------------------------------------

/// Every screen the host can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    MainMenu,
    // View screens
    SeeGoogleMins,
    SeeDeviceAddress,
    SeeLogFile,
    SeePidConstants,
    SeePhSlope,
    SeeTankId,
    SeeDeviceUptime,
    SeeVersion,
    // Set screens
    PhCalibration,
    ClearCalibration,
    SetChillOrHeat,
    SetGoogleSheetInterval,
    SetPhSetPoint,
    SetKd,
    SetKi,
    SetKp,
    EnablePid,
    SetTankId,
    TemperatureCalibration,
    SetTempSetPoint,
    SetTime,
}

impl ScreenId {
    pub fn name(self) -> &'static str {
        match self {
            Self::MainMenu => "MainMenu",
            Self::SeeGoogleMins => "SeeGoogleMins",
            Self::SeeDeviceAddress => "SeeDeviceAddress",
            Self::SeeLogFile => "SeeLogFile",
            Self::SeePidConstants => "SeePidConstants",
            Self::SeePhSlope => "SeePhSlope",
            Self::SeeTankId => "SeeTankId",
            Self::SeeDeviceUptime => "SeeDeviceUptime",
            Self::SeeVersion => "SeeVersion",
            Self::PhCalibration => "PhCalibration",
            Self::ClearCalibration => "ClearCalibration",
            Self::SetChillOrHeat => "SetChillOrHeat",
            Self::SetGoogleSheetInterval => "SetGoogleSheetInterval",
            Self::SetPhSetPoint => "SetPhSetPoint",
            Self::SetKd => "SetKd",
            Self::SetKi => "SetKi",
            Self::SetKp => "SetKp",
            Self::EnablePid => "EnablePid",
            Self::SetTankId => "SetTankId",
            Self::TemperatureCalibration => "TemperatureCalibration",
            Self::SetTempSetPoint => "SetTempSetPoint",
            Self::SetTime => "SetTime",
        }
    }
}

// ---------------------------------------------------------------------------
// Screens and transitions
// ---------------------------------------------------------------------------

/// The screen occupying the active slot.
#[derive(Debug, Clone)]
pub enum Screen {
    MainMenu(MainMenu),
    Leaf(LeafScreen),
}

impl Screen {
    pub fn id(&self) -> ScreenId {
        match self {
            Self::MainMenu(_) => ScreenId::MainMenu,
            Self::Leaf(leaf) => leaf.id(),
        }
    }
}

/// A screen staged to become active on the next tick.
#[derive(Debug, Clone)]
pub struct Transition {
    pub screen: Screen,
    /// `true` while this screen runs a probe calibration.
    pub calibration: bool,
}

impl Transition {
    /// Back to a fresh main menu at the top level.
    pub fn main_menu() -> Self {
        Self {
            screen: Screen::MainMenu(MainMenu::new()),
            calibration: false,
        }
    }

    /// Into a leaf screen; the calibration flag follows the leaf's kind.
    pub fn leaf(leaf: LeafScreen) -> Self {
        let calibration = leaf.is_calibration();
        Self {
            screen: Screen::Leaf(leaf),
            calibration,
        }
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Holds the active screen and the staged next one.
pub struct UiHost {
    active: Screen,
    next: Option<Transition>,
    in_calibration: bool,
}

impl UiHost {
    /// Start on the main menu.
    pub fn new() -> Self {
        Self {
            active: Screen::MainMenu(MainMenu::new()),
            next: None,
            in_calibration: false,
        }
    }

    /// Stage a screen for the next tick, replacing any earlier staging.
    pub fn set_next(&mut self, transition: Transition) {
        debug!(
            "UI: staged {} (calibration={})",
            transition.screen.id().name(),
            transition.calibration
        );
        self.next = Some(transition);
    }

    /// Dispatch one key press to the active screen.
    pub fn handle_key(&mut self, key: char, ctx: &mut TankContext) {
        let staged = match &mut self.active {
            Screen::MainMenu(menu) => menu.handle_key(key),
            Screen::Leaf(leaf) => match leaf.handle_key(key, ctx) {
                LeafOutcome::Stay => None,
                LeafOutcome::Done => Some(Transition::main_menu()),
            },
        };
        if let Some(transition) = staged {
            self.set_next(transition);
        }
    }

    /// Swap in the staged screen, if any. Returns `(from, to)` on a swap.
    pub fn advance(&mut self) -> Option<(ScreenId, ScreenId)> {
        let transition = self.next.take()?;
        let from = self.active.id();
        let to = transition.screen.id();
        self.active = transition.screen;
        self.in_calibration = transition.calibration;
        info!("UI transition: {} -> {}", from.name(), to.name());
        Some((from, to))
    }

    /// Draw the active screen.
    pub fn render(
        &mut self,
        ctx: &TankContext,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) {
        match &mut self.active {
            Screen::MainMenu(menu) => {
                if let Some(drift) = menu.check_labels() {
                    sink.emit(&AppEvent::LabelDrift {
                        label: drift.label,
                        old_sum: drift.old_sum,
                        new_sum: drift.new_sum,
                    });
                }
                menu.render(ctx, display);
            }
            Screen::Leaf(leaf) => leaf.render(ctx, display),
        }
    }

    /// One host iteration: swap in any staged screen, then draw.
    pub fn tick(
        &mut self,
        ctx: &TankContext,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> Option<(ScreenId, ScreenId)> {
        let swapped = self.advance();
        self.render(ctx, display, sink);
        swapped
    }

    /// `true` while the active screen is a calibration procedure.
    pub fn in_calibration(&self) -> bool {
        self.in_calibration
    }

    pub fn active_id(&self) -> ScreenId {
        self.active.id()
    }

    pub fn active(&self) -> &Screen {
        &self.active
    }

    /// Screen waiting to be swapped in.
    pub fn staged_id(&self) -> Option<ScreenId> {
        self.next.as_ref().map(|t| t.screen.id())
    }
}

impl Default for UiHost {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Rendering helpers
// ---------------------------------------------------------------------------

/// Scratch buffer for one display line; wide enough that formatting never
/// fails before truncation.
pub(crate) type LineBuf = heapless::String<32>;

/// Format `args` and write the first [`LCD_COLS`] characters to `row`.
pub(crate) fn write_row(display: &mut impl DisplayPort, row: u8, args: fmt::Arguments<'_>) {
    let mut line = LineBuf::new();
    // Overflow only drops the tail, which truncation removes anyway.
    let _ = line.write_fmt(args);
    let end = line
        .char_indices()
        .nth(LCD_COLS)
        .map_or(line.len(), |(i, _)| i);
    display.write_line(&line[..end], row);
}

/// A probe value that may not exist yet. Formats like the inner `f32`, or
/// as dashes filling the field width when absent.
#[derive(Debug, Clone, Copy)]
pub struct Reading(pub Option<f32>);

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => fmt::Display::fmt(&v, f),
            None => {
                for _ in 0..f.width().unwrap_or(2) {
                    f.write_char('-')?;
                }
                Ok(())
            }
        }
    }
}
