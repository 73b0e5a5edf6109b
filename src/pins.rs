//! GPIO / peripheral pin assignments for the tank controller board.
//!
//! Single source of truth: the device binary takes every pin number from
//! here rather than hard-coding it.

// ---------------------------------------------------------------------------
// Actuators (relay board, active HIGH)
// ---------------------------------------------------------------------------

/// CO2 dosing solenoid relay.
pub const SOLENOID_GPIO: i32 = 4;
/// Heater or chiller relay.
pub const THERMAL_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Probes
// ---------------------------------------------------------------------------

/// pH circuit UART (UART1).
pub const PH_UART_TX_GPIO: i32 = 17;
pub const PH_UART_RX_GPIO: i32 = 18;
pub const PH_UART_BAUD: u32 = 9_600;

/// NTC thermistor — 10 kΩ @ 25 °C, voltage divider to ADC1 channel 8.
pub const TEMP_ADC_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Operator console
// ---------------------------------------------------------------------------

/// Keypad characters arrive on the USB console (UART0).
pub const CONSOLE_BAUD: u32 = 115_200;
