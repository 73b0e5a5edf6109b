//! pH probe (EZO-style serial pH circuit).
//!
//! The probe streams readings on its own UART. This type holds the latest
//! reading and reported slope, and queues outgoing probe commands for the
//! transport to write. Byte-level framing is the transport's job.

use core::fmt;

use heapless::Deque;
use log::{info, warn};

use crate::app::ports::{PhProbePort, PhSlope};
use crate::error::SensorError;

/// Commands waiting for the probe transport.
const OUTBOX_CAP: usize = 4;

/// A command for the pH circuit. `Display` produces the wire text
/// including the trailing carriage return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeCommand {
    /// Enable (`true`) or disable the `*OK` acknowledgement.
    Acknowledge(bool),
    /// Continuous reading mode, one sample per second.
    Continuous,
    /// Single-point calibration at the given buffer pH.
    CalibrateMid(f32),
    ClearCalibration,
    QuerySlope,
}

impl fmt::Display for ProbeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acknowledge(on) => write!(f, "*OK,{}\r", u8::from(*on)),
            Self::Continuous => write!(f, "C,1\r"),
            Self::CalibrateMid(ph) => write!(f, "Cal,mid,{:.3}\r", ph),
            Self::ClearCalibration => write!(f, "Cal,clear\r"),
            Self::QuerySlope => write!(f, "Slope,?\r"),
        }
    }
}

/// Probe calibration as last commanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationStatus {
    #[default]
    Unknown,
    Cleared,
    Midpoint,
}

pub struct PhProbe {
    value: Option<f32>,
    out_of_range: bool,
    slope: Option<PhSlope>,
    calibration: CalibrationStatus,
    outbox: Deque<ProbeCommand, OUTBOX_CAP>,
}

impl PhProbe {
    /// New probe; queues the start-up commands (acknowledgements off,
    /// continuous readings on).
    pub fn new() -> Self {
        let mut probe = Self {
            value: None,
            out_of_range: false,
            slope: None,
            calibration: CalibrationStatus::default(),
            outbox: Deque::new(),
        };
        probe.send(ProbeCommand::Acknowledge(false));
        probe.send(ProbeCommand::Continuous);
        probe
    }

    /// Store a reading from the probe. Values outside 0..=14 are kept out
    /// of the control loop.
    pub fn record_reading(&mut self, ph: f32) {
        if !(0.0..=14.0).contains(&ph) {
            warn!("pH probe: discarding out-of-range reading {}", ph);
            self.out_of_range = true;
            return;
        }
        self.out_of_range = false;
        self.value = Some(ph);
    }

    /// Store the slope reported in answer to [`ProbeCommand::QuerySlope`].
    pub fn record_slope(&mut self, slope: PhSlope) {
        info!(
            "pH probe slope: acid {:.1}% base {:.1}% offset {:.1} mV",
            slope.acid_percent, slope.base_percent, slope.offset_mv
        );
        self.slope = Some(slope);
    }

    pub fn calibration(&self) -> CalibrationStatus {
        self.calibration
    }

    /// Next command for the transport to write.
    pub fn next_command(&mut self) -> Option<ProbeCommand> {
        self.outbox.pop_front()
    }

    fn send(&mut self, cmd: ProbeCommand) {
        if let Err(cmd) = self.outbox.push_back(cmd) {
            warn!("pH probe: outbox full, dropping {:?}", cmd);
        }
    }
}

impl Default for PhProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl PhProbePort for PhProbe {
    fn ph(&self) -> Result<f32, SensorError> {
        if self.out_of_range {
            return Err(SensorError::OutOfRange);
        }
        self.value.ok_or(SensorError::NoReading)
    }

    fn slope(&self) -> Option<PhSlope> {
        self.slope
    }

    fn calibrate_midpoint(&mut self, buffer_ph: f32) {
        info!("pH probe: midpoint calibration at {:.3}", buffer_ph);
        self.calibration = CalibrationStatus::Midpoint;
        // The old slope no longer applies.
        self.slope = None;
        self.send(ProbeCommand::CalibrateMid(buffer_ph));
        self.send(ProbeCommand::QuerySlope);
    }

    fn clear_calibration(&mut self) {
        info!("pH probe: calibration cleared");
        self.calibration = CalibrationStatus::Cleared;
        self.slope = None;
        self.send(ProbeCommand::ClearCalibration);
    }

    fn request_slope(&mut self) {
        self.send(ProbeCommand::QuerySlope);
    }
}
