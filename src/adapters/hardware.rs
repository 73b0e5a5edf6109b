//! GPIO actuator adapter.
//!
//! Drives the CO2 solenoid relay and the heater/chiller relay through
//! [`embedded_hal::digital::OutputPin`], so the same code runs against
//! ESP-IDF `PinDriver`s on the device and recording pins in tests. Both
//! relays are active HIGH.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::ActuatorPort;
use crate::error::{self, ActuatorError};

/// Solenoid and thermal relays behind [`ActuatorPort`].
pub struct GpioActuators<S, T> {
    solenoid: S,
    thermal: T,
    solenoid_on: bool,
    thermal_on: bool,
}

impl<S: OutputPin, T: OutputPin> GpioActuators<S, T> {
    /// Takes the pins and drives both outputs low.
    pub fn new(solenoid: S, thermal: T) -> error::Result<Self> {
        let mut hw = Self {
            solenoid,
            thermal,
            solenoid_on: false,
            thermal_on: false,
        };
        hw.all_off()?;
        Ok(hw)
    }

    pub fn is_solenoid_on(&self) -> bool {
        self.solenoid_on
    }

    pub fn is_thermal_on(&self) -> bool {
        self.thermal_on
    }

    fn drive(pin: &mut impl OutputPin, on: bool) -> Result<(), ActuatorError> {
        let result = if on { pin.set_high() } else { pin.set_low() };
        result.map_err(|_| ActuatorError::GpioWriteFailed)
    }
}

impl<S: OutputPin, T: OutputPin> ActuatorPort for GpioActuators<S, T> {
    fn set_solenoid(&mut self, on: bool) -> Result<(), ActuatorError> {
        Self::drive(&mut self.solenoid, on)?;
        self.solenoid_on = on;
        Ok(())
    }

    fn set_thermal(&mut self, on: bool) -> Result<(), ActuatorError> {
        Self::drive(&mut self.thermal, on)?;
        self.thermal_on = on;
        Ok(())
    }

    fn all_off(&mut self) -> Result<(), ActuatorError> {
        // Try both even if the first fails.
        let solenoid = self.set_solenoid(false);
        let thermal = self.set_thermal(false);
        if let Err(e) = solenoid {
            warn!("all_off: solenoid release failed");
            return Err(e);
        }
        thermal
    }
}
