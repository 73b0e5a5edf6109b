//! Tank Controller Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioActuators   ConsoleDisplay   NvsAdapter    SystemClock    │
//! │  (ActuatorPort)  (DisplayPort)    (Config+NVS)  (ClockPort)    │
//! │  PhProbe (UART1) TemperatureProbe (ADC1)                       │
//! │  LogEventSink + SerialEventSink (EventSink)                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  UI host · pH control · Thermostat                     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keypad characters arrive on the console UART; the loop polls it and the
//! pH probe UART, and runs one control tick per configured interval.

use core::fmt;

use anyhow::Result;
use chrono::NaiveDate;
use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::delay::{FreeRtos, NON_BLOCK};
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use tankcontroller::adapters::device_id;
use tankcontroller::adapters::display::ConsoleDisplay;
use tankcontroller::adapters::hardware::GpioActuators;
use tankcontroller::adapters::log_sink::LogEventSink;
use tankcontroller::adapters::nvs::NvsAdapter;
use tankcontroller::adapters::serial_sink::{SerialEventSink, TeeSink};
use tankcontroller::adapters::time::SystemClock;
use tankcontroller::app::ports::{ClockPort, ConfigPort, PhSlope};
use tankcontroller::app::service::AppService;
use tankcontroller::config::TankConfig;
use tankcontroller::pins;
use tankcontroller::sensors::SensorHub;
use tankcontroller::sensors::ph::PhProbe;
use tankcontroller::sensors::temperature::{TemperatureProbe, ntc_celsius};
use tankcontroller::ui::context::DeviceInfo;

/// Main loop poll period.
const POLL_MS: u32 = 20;

/// Serial log protocol goes to stdout (the console UART).
struct ConsoleOut;

impl fmt::Write for ConsoleOut {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        print!("{}", s);
        Ok(())
    }
}

/// Accumulates pH probe bytes into carriage-return terminated lines.
struct ProbeLine(heapless::String<32>);

impl ProbeLine {
    /// Feed one byte; returns the finished line on `\r`.
    fn push(&mut self, byte: u8) -> Option<heapless::String<32>> {
        match byte {
            b'\r' => Some(core::mem::take(&mut self.0)),
            b'\n' => None,
            b => {
                if self.0.push(char::from(b)).is_err() {
                    self.0.clear();
                }
                None
            }
        }
    }
}

/// Route one probe response into the probe model.
fn handle_probe_line(probe: &mut PhProbe, line: &str) {
    if let Some(rest) = line.strip_prefix("?Slope,") {
        let mut parts = rest.split(',').map(str::parse::<f32>);
        if let (Some(Ok(acid)), Some(Ok(base)), Some(Ok(offset))) =
            (parts.next(), parts.next(), parts.next())
        {
            probe.record_slope(PhSlope {
                acid_percent: acid,
                base_percent: base,
                offset_mv: offset,
            });
        }
    } else if let Ok(ph) = line.parse::<f32>() {
        probe.record_reading(ph);
    } else if !line.starts_with("*OK") && !line.is_empty() {
        warn!("pH probe: unexpected response {:?}", line);
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Tank controller v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = NvsAdapter::new()
        .map_err(|e| anyhow::anyhow!("NVS init failed: {}", e))?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            TankConfig::default()
        }
    };

    // ── 3. Construct adapters ─────────────────────────────────
    let boot_time = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let mut clock = SystemClock::new(boot_time);

    let solenoid = PinDriver::output(unsafe { AnyOutputPin::new(pins::SOLENOID_GPIO) })?;
    let thermal = PinDriver::output(unsafe { AnyOutputPin::new(pins::THERMAL_GPIO) })?;
    let mut hw = GpioActuators::new(solenoid, thermal)
        .map_err(|e| anyhow::anyhow!("actuator init failed: {}", e))?;

    let ph_uart = UartDriver::new(
        peripherals.uart1,
        unsafe { AnyOutputPin::new(pins::PH_UART_TX_GPIO) },
        unsafe { AnyInputPin::new(pins::PH_UART_RX_GPIO) },
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(Hertz(pins::PH_UART_BAUD)),
    )?;
    let console = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,
        peripherals.pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(Hertz(pins::CONSOLE_BAUD)),
    )?;

    let adc = AdcDriver::new(peripherals.adc1)?;
    let adc_config = AdcChannelConfig {
        attenuation: DB_11,
        ..Default::default()
    };
    let mut temp_channel = AdcChannelDriver::new(&adc, peripherals.pins.gpio9, &adc_config)?;

    let mut probes = SensorHub::new(
        PhProbe::new(),
        TemperatureProbe::with_correction(nvs.load_temperature_correction()),
    );

    let mut display = ConsoleDisplay::new();
    let mut sink = TeeSink {
        first: LogEventSink::new(),
        second: SerialEventSink::new(ConsoleOut),
    };

    let mac = device_id::read_mac();
    info!("Device ID: {}", device_id::device_id(&mac));

    // ── 4. Construct app service ──────────────────────────────
    let mut app = AppService::new(config, &clock);
    app.set_device_info(DeviceInfo { mac, ip: None });
    app.start(&mut sink);

    info!("System ready. Entering main loop.");

    // ── 5. Main loop ──────────────────────────────────────────
    let mut probe_line = ProbeLine(heapless::String::new());
    let mut last_tick_ms = 0u64;
    let mut buf = [0u8; 16];

    loop {
        // pH probe: outgoing commands, then incoming responses.
        while let Some(cmd) = probes.ph.next_command() {
            let mut text = heapless::String::<32>::new();
            if fmt::Write::write_fmt(&mut text, format_args!("{}", cmd)).is_ok() {
                if let Err(e) = ph_uart.write(text.as_bytes()) {
                    warn!("pH probe write failed: {}", e);
                }
            }
        }
        while let Ok(n @ 1..) = ph_uart.read(&mut buf, NON_BLOCK) {
            for &b in &buf[..n] {
                if let Some(line) = probe_line.push(b) {
                    handle_probe_line(&mut probes.ph, &line);
                }
            }
        }

        // Keypad.
        while let Ok(n @ 1..) = console.read(&mut buf, NON_BLOCK) {
            for &b in &buf[..n] {
                let key = char::from(b).to_ascii_uppercase();
                if key.is_ascii_graphic() {
                    let correction = probes.temperature.correction();
                    app.handle_key(key, &mut clock, &mut probes, &mut hw, &mut sink);
                    if probes.temperature.correction() != correction {
                        if let Err(e) =
                            nvs.store_temperature_correction(probes.temperature.correction())
                        {
                            warn!("Temperature correction not saved: {}", e);
                        }
                    }
                }
            }
        }

        // Control tick.
        let now_ms = clock.now_ms();
        let interval_ms = u64::from(app.context().config.control_loop_interval_ms);
        if now_ms.saturating_sub(last_tick_ms) >= interval_ms {
            last_tick_ms = now_ms;
            match adc.read(&mut temp_channel) {
                Ok(mv) => match ntc_celsius(mv) {
                    Some(c) => probes.temperature.push_sample(c),
                    None => {
                        warn!("Thermistor open or shorted ({} mV)", mv);
                        probes.temperature.record_fault();
                    }
                },
                Err(e) => {
                    warn!("Temperature ADC read failed: {}", e);
                    probes.temperature.record_fault();
                }
            }
            app.tick(&clock, &mut probes, &mut hw, &mut display, &mut sink);
            app.auto_save_if_needed(&nvs);
        }

        FreeRtos::delay_ms(POLL_MS);
    }
}
