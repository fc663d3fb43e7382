//! Configuration loading tests against real files.

use std::io::Write;
use std::path::Path;

use pallet_common::prelude::*;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn full_document_loads_and_validates() {
    let file = write_config(
        r#"
[shared]
log_level = "debug"
service_name = "cell-7"

[cycle]
period_us = 5000
telemetry_interval = 10

[stacking]
slots = [{ x = 10, y = 20 }, { x = 30, y = 20 }, { x = 10, y = 40 }, { x = 30, y = 40 }]
wait_pos = { x = 1, y = 2, z = 3 }
pickup_pos = { x = 4, y = 5, z = 6 }
travel_height = 50
box_height = 25
floor_height = 200
boxes_per_pallet = 12

[inlet]
transport_ticks = 4

[magazine]
reload_ticks = 2

[tasks]
arena_bytes = 1024

[simulation]
motor_speed = 40
piston_travel_ticks = 2

[[operator.events]]
tick = 0
action = "activate"

[[operator.events]]
tick = 100
action = "deactivate"
"#,
    );

    let config = PalletizerConfig::load_validated(file.path()).unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.shared.service_name, "cell-7");
    assert_eq!(config.cycle.period_us, 5000);
    assert_eq!(config.cycle.telemetry_interval, 10);
    assert_eq!(config.stacking.slots[3], Slot::new(30, 40));
    assert_eq!(config.stacking.wait_pos, Position::new(1, 2, 3));
    assert_eq!(config.stacking.pickup_pos, Position::new(4, 5, 6));
    assert_eq!(config.stacking.travel_height, 50);
    assert_eq!(config.stacking.stack_position(4), Position::new(10, 20, 225));
    assert_eq!(config.inlet.transport_ticks, 4);
    assert_eq!(config.magazine.reload_ticks, 2);
    assert_eq!(config.tasks.arena_bytes, 1024);
    assert_eq!(config.simulation.motor_speed, 40);
    assert_eq!(config.simulation.piston_travel_ticks, 2);
    assert_eq!(
        config.operator.events[1],
        OperatorEvent {
            tick: 100,
            action: OperatorAction::Deactivate
        }
    );
}

#[test]
fn invalid_values_fail_validation_not_parsing() {
    let file = write_config("[stacking]\nbox_height = 0\n");

    assert!(PalletizerConfig::load(file.path()).is_ok());
    assert!(matches!(
        PalletizerConfig::load_validated(file.path()),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn unknown_error_kind_is_a_parse_error() {
    let file = write_config(
        r#"
[[operator.events]]
tick = 1
action = { raise = "meteor_strike" }
"#,
    );

    assert!(matches!(
        PalletizerConfig::load(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn missing_file_is_reported() {
    let err = PalletizerConfig::load(Path::new("/nonexistent/cell.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(ref p) if p.contains("cell.toml")));
}

#[test]
fn shipped_drill_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/palletizer.toml");
    let config = PalletizerConfig::load_validated(&path).unwrap();

    // Everything but logging and the script matches the reference cell.
    let reference = PalletizerConfig::default();
    assert_eq!(config.stacking, reference.stacking);
    assert_eq!(config.simulation, reference.simulation);
    assert_eq!(config.tasks, reference.tasks);
    assert_eq!(config.operator.events.len(), 4);
    assert_eq!(
        config.operator.events[1],
        OperatorEvent {
            tick: 5,
            action: OperatorAction::Raise(ErrorKind::EmergencyStop),
        }
    );
}
