//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (probes, actuators, display, clock, event sinks, storage)
//! implement these traits. The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and never reaches for a global device instance.

use chrono::NaiveDateTime;

use crate::config::TankConfig;
use crate::error::{ActuatorError, SensorError};

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time plus a settable wall clock.
pub trait ClockPort {
    /// Milliseconds since boot. Never goes backwards.
    fn now_ms(&self) -> u64;

    /// Current local wall-clock time.
    fn wall_clock(&self) -> NaiveDateTime;

    /// Set the wall clock (from the date/time screen).
    fn set_wall_clock(&mut self, at: NaiveDateTime);
}

// ───────────────────────────────────────────────────────────────
// Probe ports (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// pH probe slope as reported by the probe after calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhSlope {
    /// Acid-side slope as a percentage of the ideal probe.
    pub acid_percent: f32,
    /// Base-side slope as a percentage of the ideal probe.
    pub base_percent: f32,
    /// Zero-point offset in millivolts.
    pub offset_mv: f32,
}

/// pH probe. Response parsing lives behind this trait.
pub trait PhProbePort {
    /// Latest pH reading.
    fn ph(&self) -> Result<f32, SensorError>;

    /// Last reported slope, if the probe has answered a slope query.
    fn slope(&self) -> Option<PhSlope>;

    /// Start a single-point calibration at `buffer_ph`.
    fn calibrate_midpoint(&mut self, buffer_ph: f32);

    /// Discard the probe's stored calibration.
    fn clear_calibration(&mut self);

    /// Ask the probe to report its slope; the answer arrives later through
    /// [`slope`](Self::slope).
    fn request_slope(&mut self);
}

/// Temperature probe.
pub trait TemperatureProbePort {
    /// Running average of recent samples (Celsius), calibration applied.
    fn temperature_c(&self) -> Result<f32, SensorError>;

    /// Record the true temperature so later readings are offset to match.
    fn calibrate(&mut self, actual_c: f32);
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Energise (`true`) or release the CO2 solenoid.
    fn set_solenoid(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Switch the heater or chiller relay.
    fn set_thermal(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Release every output — safe shutdown.
    fn all_off(&mut self) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Number of character columns on the LCD.
pub const LCD_COLS: usize = 16;

/// Two-line character display. `row` is 0 or 1; `text` is at most
/// [`LCD_COLS`] characters and the adapter pads the remainder with spaces.
pub trait DisplayPort {
    fn write_line(&mut self, text: &str, row: u8);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, SD card).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`TankConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<TankConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &TankConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / EEPROM)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage. Keys are namespaced per subsystem and
/// writes are atomic.
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
