//! Probe drivers and the aggregating [`SensorHub`].
//!
//! The hub owns both probes and produces a [`SensorSnapshot`] each tick
//! that gets written into `TankContext.sensors`.

pub mod ph;
pub mod temperature;

use log::warn;

use crate::app::ports::{PhProbePort, TemperatureProbePort};
use crate::ui::context::SensorSnapshot;

/// Aggregates the pH and temperature probes.
pub struct SensorHub<P, T> {
    pub ph: P,
    pub temperature: T,
}

impl<P: PhProbePort, T: TemperatureProbePort> SensorHub<P, T> {
    pub fn new(ph: P, temperature: T) -> Self {
        Self { ph, temperature }
    }

    /// Read both probes into a snapshot.
    ///
    /// A failed pH read is logged and the value from `previous` is kept, so
    /// one garbled serial line does not disturb the control loop. The
    /// temperature probe smooths over bad samples itself, so an error there
    /// means there is no usable temperature and the snapshot says so.
    pub fn read_all(&self, previous: &SensorSnapshot) -> SensorSnapshot {
        let ph = match self.ph.ph() {
            Ok(ph) => Some(ph),
            Err(e) => {
                warn!("pH probe: {}", e);
                previous.ph
            }
        };
        let temperature_c = match self.temperature.temperature_c() {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("Temperature probe: {}", e);
                None
            }
        };
        SensorSnapshot {
            ph,
            temperature_c,
            ph_slope: self.ph.slope(),
        }
    }
}
