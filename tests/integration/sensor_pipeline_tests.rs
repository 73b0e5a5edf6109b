//! Real probe models and the host NVS adapter wired into the service.

use tankcontroller::adapters::nvs::NvsAdapter;
use tankcontroller::app::ports::{ConfigPort, PhProbePort, PhSlope, TemperatureProbePort};
use tankcontroller::app::service::AppService;
use tankcontroller::config::TankConfig;
use tankcontroller::sensors::SensorHub;
use tankcontroller::sensors::ph::{CalibrationStatus, PhProbe, ProbeCommand};
use tankcontroller::sensors::temperature::TemperatureProbe;
use tankcontroller::ui::ScreenId;

use super::mock_hw::{MockActuators, MockClock, MockDisplay, RecordingSink};

struct Rig {
    app: AppService,
    clock: MockClock,
    probes: SensorHub<PhProbe, TemperatureProbe>,
    hw: MockActuators,
    display: MockDisplay,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: TankConfig) -> Self {
        let clock = MockClock::new();
        let app = AppService::new(config, &clock);
        let mut probes = SensorHub::new(PhProbe::new(), TemperatureProbe::new());
        // Start-up commands are the transport's business.
        while probes.ph.next_command().is_some() {}
        Self {
            app,
            clock,
            probes,
            hw: MockActuators::new(),
            display: MockDisplay::new(),
            sink: RecordingSink::new(),
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

    fn outbox(&mut self) -> Vec<ProbeCommand> {
        std::iter::from_fn(|| self.probes.ph.next_command()).collect()
    }
}

#[test]
fn no_reading_yet_leaves_solenoid_off() {
    let mut rig = Rig::new(TankConfig::default());
    rig.tick_at(1000);
    assert!(!rig.app.solenoid_on());
    assert_eq!(rig.app.context().sensors.ph, None);
}

#[test]
fn no_temperature_sample_yet_leaves_heater_off() {
    let mut rig = Rig::new(TankConfig::default());
    for ms in (1000..=5000).step_by(1000) {
        rig.tick_at(ms);
    }
    assert_eq!(rig.app.context().sensors.temperature_c, None);
    assert!(!rig.app.thermal_on());
    assert!(!rig.hw.thermal_on());
    assert_eq!(rig.display.line(0), "pH=-----   8.100");
}

#[test]
fn thermistor_faults_release_heater() {
    let mut rig = Rig::new(TankConfig::default());
    rig.probes.temperature.push_sample(16.0);
    rig.tick_at(1000);
    assert!(rig.hw.thermal_on());

    for _ in 0..3 {
        rig.probes.temperature.record_fault();
    }
    rig.tick_at(2000);
    assert!(!rig.app.thermal_on());
    assert!(!rig.hw.thermal_on());
}

#[test]
fn out_of_range_reading_is_not_acted_on() {
    let mut rig = Rig::new(TankConfig::default());
    rig.probes.ph.record_reading(8.0);
    rig.tick_at(1000);
    assert!(!rig.app.solenoid_on(), "8.0 is below the 8.1 default target");

    rig.probes.ph.record_reading(22.0);
    rig.tick_at(2000);
    assert!(!rig.app.solenoid_on());
    assert_eq!(rig.app.context().sensors.ph, Some(8.0));
}

#[test]
fn menu_calibration_sends_probe_commands() {
    let mut rig = Rig::new(TankConfig::default());
    rig.probes.ph.record_reading(6.9);
    rig.keys("6866");
    rig.tick_at(1000);
    assert_eq!(rig.app.active_screen(), ScreenId::PhCalibration);

    rig.keys("7#");
    assert_eq!(rig.probes.ph.calibration(), CalibrationStatus::Midpoint);
    assert_eq!(
        rig.outbox(),
        vec![ProbeCommand::CalibrateMid(7.0), ProbeCommand::QuerySlope]
    );
}

#[test]
fn reported_slope_shows_on_view_screen() {
    let mut rig = Rig::new(TankConfig::default());
    rig.probes.ph.record_slope(PhSlope {
        acid_percent: 99.7,
        base_percent: 100.3,
        offset_mv: 1.9,
    });
    // View submenu, fifth item.
    rig.keys("6622226");
    rig.tick_at(1000);
    assert_eq!(rig.app.active_screen(), ScreenId::SeePhSlope);
    assert_eq!(rig.display.line(0), "pH slope");
    assert_eq!(rig.display.line(1), "99.7%,100.3%,1.9");
}

#[test]
fn opening_slope_view_queries_slope() {
    let mut rig = Rig::new(TankConfig::default());
    rig.keys("6622226");
    assert!(rig.outbox().is_empty());
    rig.tick_at(1000);
    assert_eq!(rig.outbox(), vec![ProbeCommand::QuerySlope]);
}

#[test]
fn clear_calibration_drops_slope() {
    let mut rig = Rig::new(TankConfig::default());
    rig.probes.ph.record_slope(PhSlope {
        acid_percent: 98.0,
        base_percent: 97.0,
        offset_mv: 3.0,
    });
    // Set submenu, second item, then confirm.
    rig.keys("68686");
    rig.tick_at(1000);
    assert_eq!(rig.app.active_screen(), ScreenId::ClearCalibration);
    rig.keys("A");
    assert_eq!(rig.probes.ph.calibration(), CalibrationStatus::Cleared);
    assert_eq!(rig.probes.ph.slope(), None);
    assert_eq!(rig.outbox(), vec![ProbeCommand::ClearCalibration]);
}

#[test]
fn temperature_calibration_through_menu() {
    let mut rig = Rig::new(TankConfig::default());
    for _ in 0..5 {
        rig.probes.temperature.push_sample(17.0);
    }
    // Set submenu, wrap up to "Temp calibration".
    rig.keys("6862226");
    rig.tick_at(1000);
    assert_eq!(rig.app.active_screen(), ScreenId::TemperatureCalibration);

    rig.keys("18#");
    assert_eq!(rig.probes.temperature.correction(), 1.0);
    assert_eq!(rig.probes.temperature.temperature_c(), Ok(18.0));
}

#[test]
fn heater_follows_averaged_temperature() {
    let mut rig = Rig::new(TankConfig::default());
    rig.probes.temperature.push_sample(16.0);
    rig.tick_at(1000);
    assert!(rig.app.thermal_on());
    assert!(rig.hw.thermal_on());

    for _ in 0..10 {
        rig.probes.temperature.push_sample(17.5);
    }
    rig.tick_at(2000);
    assert!(!rig.app.thermal_on());
}

#[test]
fn nvs_round_trips_config_and_correction() {
    let mut nvs = NvsAdapter::new().expect("host NVS");
    assert_eq!(nvs.load().expect("defaults"), TankConfig::default());

    let cfg = TankConfig {
        target_ph: 7.8,
        tank_id: 3,
        heater: false,
        ..TankConfig::default()
    };
    nvs.save(&cfg).expect("save");
    assert_eq!(nvs.load().expect("load"), cfg);

    nvs.store_temperature_correction(-0.4).expect("store");
    assert_eq!(nvs.load_temperature_correction(), -0.4);
    let probe = TemperatureProbe::with_correction(nvs.load_temperature_correction());
    assert_eq!(probe.correction(), -0.4);
}

#[test]
fn service_saves_through_nvs() {
    let nvs = NvsAdapter::new().expect("host NVS");
    let mut rig = Rig::new(TankConfig::default());
    rig.keys("B");
    rig.tick_at(1000);
    rig.keys("20#");
    rig.tick_at(6000);
    assert!(rig.app.auto_save_if_needed(&nvs));
    assert_eq!(nvs.load().expect("load").target_temperature_c, 20.0);
}
