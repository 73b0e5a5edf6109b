//! Closed-loop controllers for water chemistry and temperature.
//!
//! Both controllers are pure: they take a reading and the clock, and
//! return the output change (if any). The service applies the change to
//! the actuators and emits the event.

pub mod ph;
pub mod pid;
pub mod thermal;
