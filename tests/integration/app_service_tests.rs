//! Integration tests for the keypad → UI host → AppService → actuators
//! pipeline.
//!
//! These run on the host and drive the whole tick sequence against the
//! mock adapters in [`super::mock_hw`].

use tankcontroller::adapters::serial_sink::{SerialEventSink, TeeSink};
use tankcontroller::app::commands::AppCommand;
use tankcontroller::app::events::AppEvent;
use tankcontroller::app::service::AppService;
use tankcontroller::config::TankConfig;
use tankcontroller::sensors::SensorHub;
use tankcontroller::ui::ScreenId;

use super::mock_hw::{
    ActuatorCall, MockActuators, MockClock, MockConfigStore, MockDisplay, MockPhProbe,
    MockTemperatureProbe, RecordingSink,
};

type Probes = SensorHub<MockPhProbe, MockTemperatureProbe>;

struct Rig {
    app: AppService,
    clock: MockClock,
    probes: Probes,
    hw: MockActuators,
    display: MockDisplay,
    sink: TeeSink<RecordingSink, SerialEventSink<String>>,
}

impl Rig {
    /// Service with a pH target of 7.0, temperature steady at its target.
    fn new(clock: MockClock) -> Self {
        let config = TankConfig {
            target_ph: 7.0,
            ..TankConfig::default()
        };
        let mut app = AppService::new(config, &clock);
        let mut sink = TeeSink {
            first: RecordingSink::new(),
            second: SerialEventSink::new(String::new()),
        };
        app.start(&mut sink);
        Self {
            app,
            clock,
            probes: SensorHub::new(
                MockPhProbe::reading(7.0),
                MockTemperatureProbe::reading(16.75),
            ),
            hw: MockActuators::new(),
            display: MockDisplay::new(),
            sink,
        }
    }

    fn tick_at(&mut self, ms: u64) {
        self.clock.set(ms);
        self.app.tick(
            &self.clock,
            &mut self.probes,
            &mut self.hw,
            &mut self.display,
            &mut self.sink,
        );
    }

    fn keys(&mut self, keys: &str) {
        for key in keys.chars() {
            self.app.handle_key(
                key,
                &mut self.clock,
                &mut self.probes,
                &mut self.hw,
                &mut self.sink,
            );
        }
    }

    fn command(&mut self, cmd: AppCommand) {
        self.app.handle_command(
            cmd,
            &mut self.clock,
            &mut self.probes,
            &mut self.hw,
            &mut self.sink,
        );
    }

    fn events(&self) -> &RecordingSink {
        &self.sink.first
    }

    fn serial(&self) -> &str {
        self.sink.second.get_ref()
    }
}

fn default_rig() -> Rig {
    Rig::new(MockClock::new())
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn starts_on_main_menu_with_outputs_released() {
    let mut rig = default_rig();
    assert_eq!(
        rig.events().events.first(),
        Some(&AppEvent::Started(ScreenId::MainMenu))
    );

    rig.tick_at(0);
    assert_eq!(rig.app.active_screen(), ScreenId::MainMenu);
    assert_eq!(
        rig.hw.calls,
        vec![ActuatorCall::Solenoid(false), ActuatorCall::Thermal(false)],
        "first tick syncs both outputs"
    );
    assert_eq!(rig.display.line(0), "pH=7.000   7.000");
    assert_eq!(rig.display.line(1), "T=16.75 H 16.75");
}

// ── pH control through the full tick ──────────────────────────

#[test]
fn solenoid_turns_on_and_logs_timestamped_line() {
    let mut rig = Rig::new(MockClock::at(2021, 1, 15, 1, 48, 24));
    rig.probes.ph.set(8.0);

    rig.tick_at(1000);

    assert!(rig.app.solenoid_on());
    assert!(rig.hw.solenoid_on());
    assert_eq!(rig.events().solenoid_changes(), vec![(true, 1000)]);
    assert_eq!(
        rig.serial(),
        "2021-01-15 01:48:25\r\nCO2 bubbler turned on after 1000 ms\r\n"
    );
}

#[test]
fn solenoid_dwell_holds_in_both_directions() {
    let mut rig = default_rig();
    rig.probes.ph.set(8.0);
    rig.tick_at(1000);
    assert!(rig.app.solenoid_on());

    // Back at target: off is wanted but only 8.5 s have passed.
    rig.probes.ph.set(7.0);
    rig.tick_at(9500);
    assert!(rig.app.solenoid_on());

    rig.tick_at(11_000);
    assert!(!rig.app.solenoid_on());

    // Above target again, but the dwell now runs from the off switch.
    rig.probes.ph.set(7.25);
    rig.tick_at(11_500);
    assert!(!rig.app.solenoid_on());

    rig.tick_at(21_000);
    assert!(rig.app.solenoid_on());

    assert_eq!(
        rig.events().solenoid_changes(),
        vec![(true, 1000), (false, 10_000), (true, 10_000)]
    );
    assert_eq!(rig.hw.solenoid_history(), vec![true, false, true]);
}

#[test]
fn reading_equal_to_target_keeps_solenoid_off() {
    let mut rig = default_rig();
    for ms in (0..30_000).step_by(1000) {
        rig.tick_at(ms);
    }
    assert!(!rig.app.solenoid_on());
    assert!(rig.events().solenoid_changes().is_empty());
}

#[test]
fn failed_ph_read_keeps_last_good_reading() {
    let mut rig = default_rig();
    rig.probes.ph.set(8.0);
    rig.tick_at(1000);
    assert!(rig.app.solenoid_on());

    rig.probes.ph.reading = Err(tankcontroller::error::SensorError::NoReading);
    rig.tick_at(20_000);
    assert!(rig.app.solenoid_on(), "no reading must not be taken as pH 0");
    assert_eq!(rig.app.context().sensors.ph, Some(8.0));
}

#[test]
fn lost_temperature_reading_releases_heater() {
    let mut rig = default_rig();
    rig.probes.temperature.set(15.0);
    rig.tick_at(1000);
    assert!(rig.hw.thermal_on());

    rig.probes.temperature.reading = Err(tankcontroller::error::SensorError::NoReading);
    rig.tick_at(2000);
    assert_eq!(rig.app.context().sensors.temperature_c, None);
    assert!(!rig.app.thermal_on());
    assert!(!rig.hw.thermal_on());
    assert_eq!(rig.display.line(1), "T=----- H 16.75");

    rig.tick_at(3000);
    assert!(!rig.hw.thermal_on(), "stays off while the reading is missing");
}

#[test]
fn pid_mode_pulses_solenoid_within_window() {
    let mut rig = default_rig();
    rig.command(AppCommand::SetPidEnabled(true));
    rig.probes.ph.set(7.05);
    for ms in (1000..=11_000).step_by(500) {
        rig.tick_at(ms);
    }
    // Half-window on-time with the default gain, then a new window.
    assert_eq!(
        rig.events().solenoid_changes(),
        vec![(true, 1000), (false, 5000), (true, 5000)]
    );

    rig.command(AppCommand::SetPidEnabled(false));
    rig.probes.ph.set(6.5);
    rig.tick_at(12_000);
    assert!(rig.app.solenoid_on(), "on/off mode waits out the dwell");
    rig.tick_at(21_000);
    assert!(!rig.app.solenoid_on());
}

// ── Calibration through the menu ──────────────────────────────

#[test]
fn ph_calibration_screen_forces_solenoid_off() {
    let mut rig = default_rig();
    rig.probes.ph.set(8.0);
    rig.tick_at(1000);
    assert!(rig.app.solenoid_on());

    // Status -> View -> Set -> first item -> commit "pH calibration".
    rig.keys("6866");
    assert_eq!(rig.app.staged_screen(), Some(ScreenId::PhCalibration));
    assert_eq!(rig.app.active_screen(), ScreenId::MainMenu);
    assert!(!rig.app.in_calibration(), "flag waits for the swap");

    // Swapped in on the next tick; off immediately despite the dwell.
    rig.tick_at(1500);
    assert_eq!(rig.app.active_screen(), ScreenId::PhCalibration);
    assert!(rig.app.in_calibration());
    assert!(!rig.app.solenoid_on());
    assert!(!rig.hw.solenoid_on());
    assert_eq!(rig.events().solenoid_changes(), vec![(true, 1000), (false, 500)]);
    assert_eq!(rig.display.line(0), "pH buffer value");

    // Readings are ignored for as long as the calibration screen is up.
    for ms in (2000..40_000).step_by(1000) {
        rig.tick_at(ms);
        assert!(!rig.app.solenoid_on());
    }

    rig.keys("7#");
    assert_eq!(rig.probes.ph.calibrations, vec![7.0]);
    assert_eq!(rig.app.staged_screen(), Some(ScreenId::MainMenu));

    rig.tick_at(40_000);
    assert_eq!(rig.app.active_screen(), ScreenId::MainMenu);
    assert!(!rig.app.in_calibration());
    assert!(rig.app.solenoid_on(), "control resumes once calibration ends");
}

#[test]
fn cancelled_calibration_also_releases_the_hold() {
    let mut rig = default_rig();
    rig.keys("6866");
    rig.tick_at(1000);
    assert!(rig.app.in_calibration());

    rig.keys("D");
    rig.tick_at(2000);
    assert_eq!(rig.app.active_screen(), ScreenId::MainMenu);
    assert!(!rig.app.in_calibration());
    assert!(rig.probes.ph.calibrations.is_empty());
}

#[test]
fn other_set_screens_do_not_hold_the_loop() {
    let mut rig = default_rig();
    rig.keys("B");
    rig.tick_at(1000);
    assert_eq!(rig.app.active_screen(), ScreenId::SetTempSetPoint);
    assert!(!rig.app.in_calibration());
}

// ── Settings entry ────────────────────────────────────────────

#[test]
fn ph_shortcut_sets_target() {
    let mut rig = default_rig();
    rig.probes.ph.set(7.4);
    rig.keys("A");
    rig.tick_at(1000);
    assert_eq!(rig.app.active_screen(), ScreenId::SetPhSetPoint);
    assert!(rig.app.solenoid_on(), "7.4 is above the old 7.0 target");

    rig.keys("7*5#");
    assert_eq!(rig.app.current_config().target_ph, 7.5);
    assert!(rig.app.is_config_dirty());

    rig.tick_at(12_000);
    assert_eq!(rig.app.active_screen(), ScreenId::MainMenu);
    assert!(!rig.app.solenoid_on(), "7.4 is at or below the new target");
    assert_eq!(rig.app.build_telemetry().target_ph, 7.5);
}

#[test]
fn out_of_range_entry_is_not_applied() {
    let mut rig = default_rig();
    rig.keys("A");
    rig.tick_at(1000);
    rig.keys("15#");
    assert_eq!(rig.app.current_config().target_ph, 7.0);
    assert_eq!(rig.app.active_screen(), ScreenId::SetPhSetPoint);
    assert!(!rig.app.is_config_dirty());
}

#[test]
fn switching_to_chiller_releases_running_heater() {
    let mut rig = default_rig();
    rig.probes.temperature.set(15.0);
    rig.tick_at(1000);
    assert!(rig.app.thermal_on());
    assert!(rig.hw.thermal_on());

    rig.command(AppCommand::SetHeater(false));
    assert!(!rig.app.thermal_on());
    assert!(!rig.hw.thermal_on());
    assert!(
        rig.events()
            .events
            .contains(&AppEvent::ThermalChanged { on: false, heater: true })
    );
}

#[test]
fn temperature_calibration_reaches_probe() {
    let mut rig = default_rig();
    rig.command(AppCommand::CalibrateTemperature(17.5));
    assert_eq!(rig.probes.temperature.calibrations, vec![17.5]);
}

#[test]
fn set_date_time_moves_wall_clock() {
    use tankcontroller::app::ports::ClockPort;

    let mut rig = default_rig();
    let at = chrono::NaiveDate::from_ymd_opt(2025, 6, 30)
        .and_then(|d| d.and_hms_opt(12, 30, 0))
        .expect("valid date");
    rig.command(AppCommand::SetDateTime(at));
    assert_eq!(rig.clock.wall_clock(), at);
    assert_eq!(rig.app.context().now, at);
}

// ── Config persistence ────────────────────────────────────────

#[test]
fn config_auto_saves_after_five_seconds() {
    let mut rig = default_rig();
    let store = MockConfigStore::new();
    rig.tick_at(1000);

    rig.command(AppCommand::SetTankId(7));
    assert!(rig.app.is_config_dirty());
    assert!(!rig.app.auto_save_if_needed(&store));

    rig.tick_at(5_999);
    assert!(!rig.app.auto_save_if_needed(&store));

    rig.tick_at(6_000);
    assert!(rig.app.auto_save_if_needed(&store));
    assert!(!rig.app.is_config_dirty());
    assert_eq!(store.saves.get(), 1);
    assert_eq!(store.saved.borrow().as_ref().map(|c| c.tank_id), Some(7));
}

#[test]
fn unchanged_value_does_not_dirty_config() {
    let mut rig = default_rig();
    rig.command(AppCommand::SetTargetPh(7.0));
    assert!(!rig.app.is_config_dirty());
}

#[test]
fn saved_config_is_not_saved_again() {
    let mut rig = default_rig();
    let store = MockConfigStore::new();
    rig.command(AppCommand::SetGoogleSheetInterval(30));
    rig.tick_at(5000);
    assert!(rig.app.auto_save_if_needed(&store));
    rig.tick_at(20_000);
    assert!(!rig.app.auto_save_if_needed(&store));
    assert_eq!(store.saves.get(), 1);
}

// ── Telemetry and diagnostics ─────────────────────────────────

#[test]
fn telemetry_follows_configured_interval() {
    let mut rig = default_rig();
    rig.tick_at(59_999);
    assert_eq!(rig.events().telemetry_count(), 0);
    rig.tick_at(60_000);
    assert_eq!(rig.events().telemetry_count(), 1);
    rig.tick_at(119_999);
    assert_eq!(rig.events().telemetry_count(), 1);
    rig.tick_at(120_000);
    assert_eq!(rig.events().telemetry_count(), 2);
}

#[test]
fn slope_view_asks_for_fresh_slope() {
    let mut rig = default_rig();
    // View submenu, fifth item.
    rig.keys("6622226");
    assert_eq!(rig.probes.ph.slope_requests, 0);
    rig.tick_at(1000);
    assert_eq!(rig.app.active_screen(), ScreenId::SeePhSlope);
    assert_eq!(rig.probes.ph.slope_requests, 1);

    rig.tick_at(2000);
    assert_eq!(rig.probes.ph.slope_requests, 1, "only on entry");
}

#[test]
fn screen_changes_are_reported() {
    let mut rig = default_rig();
    rig.keys("6");
    rig.keys("6");
    rig.keys("6");
    rig.tick_at(1000);
    assert!(rig.events().events.contains(&AppEvent::ScreenChanged {
        from: ScreenId::MainMenu,
        to: ScreenId::SeeGoogleMins,
    }));
}

#[test]
fn labels_do_not_drift_in_normal_operation() {
    let mut rig = default_rig();
    for ms in (0..10_000).step_by(500) {
        rig.tick_at(ms);
        rig.keys("8");
    }
    assert!(!rig.events().has_label_drift());
    assert!(!rig.serial().contains("changed from"));
}

#[test]
fn shutdown_releases_everything() {
    let mut rig = default_rig();
    rig.app.shutdown(&mut rig.hw);
    assert_eq!(rig.hw.last_call(), Some(&ActuatorCall::AllOff));
}
