//! PID controller for CO2 dosing
//!
//! Proportional-integral-derivative controller whose output is the
//! solenoid on-time within one time-proportioning window.

/// Gains as entered on the keypad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidTunings {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// PID controller
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f32,
    ki: f32,
    kd: f32,
    setpoint: f32,
    integral: f32,
    prev_error: f32,
    output_min: f32,
    output_max: f32,
    /// Output rises as the measurement rises above the set point.
    reverse: bool,
}

impl PidController {
    pub fn new(tunings: PidTunings, setpoint: f32) -> Self {
        Self {
            kp: tunings.kp,
            ki: tunings.ki,
            kd: tunings.kd,
            setpoint,
            integral: 0.0,
            prev_error: 0.0,
            output_min: 0.0,
            output_max: 100.0,
            reverse: false,
        }
    }

    /// Set output limits
    pub fn set_limits(&mut self, min: f32, max: f32) {
        self.output_min = min;
        self.output_max = max;
    }

    /// Update setpoint
    pub fn set_target(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
    }

    /// Replace the gains, keeping accumulated state.
    pub fn set_tunings(&mut self, tunings: PidTunings) {
        self.kp = tunings.kp;
        self.ki = tunings.ki;
        self.kd = tunings.kd;
    }

    pub fn tunings(&self) -> PidTunings {
        PidTunings {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
        }
    }

    /// Drive the output up when the measurement is above the set point.
    pub fn set_reverse(&mut self, reverse: bool) {
        self.reverse = reverse;
    }

    /// Compute PID output given current measurement
    pub fn compute(&mut self, measurement: f32, dt: f32) -> f32 {
        let error = if self.reverse {
            measurement - self.setpoint
        } else {
            self.setpoint - measurement
        };

        // Proportional
        let p = self.kp * error;

        // Integral (with anti-windup)
        self.integral += error * dt;
        let i = self.ki * self.integral;

        // Derivative
        let derivative = if dt > 0.0 {
            (error - self.prev_error) / dt
        } else {
            0.0
        };
        let d = self.kd * derivative;

        self.prev_error = error;

        let output = (p + i + d).clamp(self.output_min, self.output_max);

        // Saturated: undo this step's integration
        if output >= self.output_max || output <= self.output_min {
            self.integral -= error * dt;
        }

        output
    }

    /// Reset controller state
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }
}
