//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements            | Connects to                  |
//! |---------------|-----------------------|------------------------------|
//! | `display`     | DisplayPort           | Log console (no LCD fitted)  |
//! | `hardware`    | ActuatorPort          | Solenoid / thermal relays    |
//! | `log_sink`    | EventSink             | `log` facade                 |
//! | `serial_sink` | EventSink             | Serial log protocol          |
//! | `nvs`         | ConfigPort            | NVS / in-memory store        |
//! |               | StoragePort           |                              |
//! | `time`        | ClockPort             | ESP32 system timer           |
//!
//! `device_id` reads the factory MAC shown on the address screen.

pub mod device_id;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod serial_sink;
pub mod time;
