//! Error branch and recovery through the operator script.

use std::io::Write;

use pallet_common::prelude::*;
use tempfile::NamedTempFile;

use super::{record, scheduler, scripted, transitions};

#[test]
fn emergency_stop_halts_and_rehomes() {
    let config = scripted(&[
        (0, OperatorAction::Activate),
        (5, OperatorAction::Raise(ErrorKind::EmergencyStop)),
        (40, OperatorAction::Clear(ErrorKind::EmergencyStop)),
        (45, OperatorAction::Activate),
    ]);
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 200);

    // Halted mid-move; axes hold their position while the error stands.
    let halted_at = frames[5].position;
    assert_eq!(halted_at, Position::new(55, 55, 100));
    for frame in &frames[5..40] {
        assert_eq!(frame.arm, ArmState::Undefined, "tick {}", frame.tick);
        assert_eq!(frame.position, halted_at, "tick {}", frame.tick);
    }

    let timeline: Vec<(u64, ArmState)> = transitions(&frames[30..])
        .into_iter()
        .map(|frame| (frame.tick, frame.arm))
        .take(4)
        .collect();
    assert_eq!(
        timeline,
        vec![
            (30, ArmState::Undefined),
            (40, ArmState::Homing),
            (44, ArmState::InHomePos),
            (45, ArmState::ToWaitPos),
        ]
    );
    assert_eq!(frames[44].position, Position::ORIGIN);

    // Stacking resumes.
    assert_eq!(frames.last().expect("frames").nr_boxes, 5);
    assert!(scheduler.arm().is_alive());
    assert!(scheduler.cell().settings().is_active());
}

#[test]
fn emergency_stop_with_box_in_gripper_recovers() {
    let config = scripted(&[
        (0, OperatorAction::Activate),
        (20, OperatorAction::Raise(ErrorKind::EmergencyStop)),
        (30, OperatorAction::Clear(ErrorKind::EmergencyStop)),
        (40, OperatorAction::Activate),
    ]);
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 200);

    // Stopped while carrying the first box.
    assert_eq!(frames[19].arm, ArmState::TransportBox);
    assert_eq!(frames[20].arm, ArmState::Undefined);
    assert_eq!(frames[30].arm, ArmState::Homing);

    let homed = frames[30..]
        .iter()
        .position(|f| f.arm == ArmState::InHomePos)
        .expect("arm never rehomed");
    assert_eq!(frames[30 + homed].position, Position::ORIGIN);

    assert!(scheduler.arm().is_alive());
    assert!(
        frames[40..].iter().any(|f| f.arm == ArmState::ReleaseBox),
        "stacking did not resume"
    );
    // The held box was dropped, not counted.
    assert!(frames[..40].iter().all(|f| f.nr_boxes == 0));
    assert!(frames.last().expect("frames").nr_boxes >= 3);
}

#[test]
fn uncleared_error_blocks_activation() {
    let config = scripted(&[
        (0, OperatorAction::Activate),
        (5, OperatorAction::Raise(ErrorKind::BoxCaughtOnConveyor)),
        (10, OperatorAction::Activate),
    ]);
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 100);

    let settings = scheduler.cell().settings();
    assert!(!settings.is_active());
    assert_eq!(settings.error_count(), 1);
    assert!(settings.is_set(ErrorKind::BoxCaughtOnConveyor));
    assert!(frames[5..].iter().all(|f| f.arm == ArmState::Undefined));
    assert_eq!(frames.last().expect("frames").nr_boxes, 0);
}

#[test]
fn error_raised_while_idle_rehomes_after_clear() {
    let config = scripted(&[
        (3, OperatorAction::Raise(ErrorKind::InvalidGripperPos)),
        (10, OperatorAction::Clear(ErrorKind::InvalidGripperPos)),
    ]);
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 15);

    assert_eq!(frames[2].arm, ArmState::InHomePos);
    assert_eq!(frames[3].arm, ArmState::Undefined);
    assert_eq!(frames[9].arm, ArmState::Undefined);
    assert_eq!(frames[10].arm, ArmState::Homing);
    assert_eq!(frames[11].arm, ArmState::InHomePos);
}

#[test]
fn repeated_raise_needs_single_clear() {
    let config = scripted(&[
        (0, OperatorAction::Activate),
        (5, OperatorAction::Raise(ErrorKind::EmergencyStop)),
        (6, OperatorAction::Raise(ErrorKind::EmergencyStop)),
        (7, OperatorAction::Raise(ErrorKind::EmergencyStop)),
        (8, OperatorAction::Clear(ErrorKind::EmergencyStop)),
        (9, OperatorAction::Activate),
    ]);
    let mut scheduler = scheduler(&config);
    record(&mut scheduler, 10);

    let settings = scheduler.cell().settings();
    assert_eq!(settings.error_count(), 0);
    assert!(settings.is_active());
}

#[test]
fn drill_script_loads_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
[stacking]
boxes_per_pallet = 8

[[operator.events]]
tick = 0
action = "activate"

[[operator.events]]
tick = 5
action = { raise = "emergency_stop" }

[[operator.events]]
tick = 40
action = { clear = "emergency_stop" }
"#,
    )
    .unwrap();
    file.flush().unwrap();

    let config = PalletizerConfig::load_validated(file.path()).unwrap();
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 60);

    assert_eq!(frames[5].arm, ArmState::Undefined);
    assert_eq!(frames[40].arm, ArmState::Homing);
    // Not reactivated: the arm homes and stays put.
    assert_eq!(frames[59].arm, ArmState::InHomePos);
    assert!(!scheduler.cell().settings().is_active());
}
