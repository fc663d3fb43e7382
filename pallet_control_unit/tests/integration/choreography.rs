//! Cell choreography on the reference configuration.
//!
//! Arm, Magazine and Inlet run against the simulated rig with the default
//! operator script (activate at tick 0).

use pallet_common::prelude::*;

use super::{Frame, record, scheduler, scripted, transitions};

fn arm_timeline(frames: &[Frame]) -> Vec<(u64, ArmState)> {
    transitions(frames)
        .into_iter()
        .map(|frame| (frame.tick, frame.arm))
        .collect()
}

#[test]
fn first_cycle_timeline() {
    let config = PalletizerConfig::default();
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 41);

    assert_eq!(
        arm_timeline(&frames),
        vec![
            (0, ArmState::Homing),
            (1, ArmState::InHomePos),
            (2, ArmState::ToWaitPos),
            (7, ArmState::Waiting),
            (11, ArmState::TakeBox),
            (17, ArmState::TransportBox),
            (28, ArmState::ReleaseBox),
            (31, ArmState::ToWaitPos),
            (40, ArmState::Waiting),
        ]
    );
    // Inlet finished its transport while the arm was waiting.
    assert_eq!(frames[9].inlet, InletState::MoveBox);
    assert_eq!(frames[10].inlet, InletState::BoxReady);
    assert_eq!(frames[40].nr_boxes, 1);
}

#[test]
fn box_leaves_inlet_when_transport_begins() {
    let config = PalletizerConfig::default();
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 400);

    let mut pickups = 0;
    for pair in frames.windows(2) {
        let (before, after) = (pair[0], pair[1]);
        if before.arm == ArmState::TakeBox && after.arm == ArmState::TransportBox {
            assert_eq!(before.inlet, InletState::BoxReady, "tick {}", before.tick);
            assert_ne!(after.inlet, InletState::BoxReady, "tick {}", after.tick);
            pickups += 1;
        }
    }
    assert!(pickups >= 12);
}

#[test]
fn exactly_one_box_per_cycle() {
    let config = PalletizerConfig::default();
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 400);

    let pickup_ticks: Vec<usize> = frames
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].arm != ArmState::TakeBox && pair[1].arm == ArmState::TakeBox)
        .map(|(i, _)| i + 1)
        .collect();
    assert!(pickup_ticks.len() >= 12);

    for window in pickup_ticks.windows(2) {
        let (start, end) = (window[0], window[1]);
        assert_eq!(
            frames[end].nr_boxes,
            frames[start].nr_boxes + 1,
            "cycle starting at tick {start}"
        );
    }

    // The counter never moves by more than one per tick.
    for pair in frames.windows(2) {
        assert!(pair[1].nr_boxes - pair[0].nr_boxes <= 1);
    }
}

#[test]
fn first_twelve_boxes_follow_stacking_pattern() {
    let config = PalletizerConfig::default();
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 400);

    let releases: Vec<Frame> = transitions(&frames)
        .into_iter()
        .filter(|frame| frame.arm == ArmState::ReleaseBox)
        .take(12)
        .collect();
    assert_eq!(releases.len(), 12);

    let slots = [(250, 300), (150, 300), (250, 200), (150, 200)];
    for (i, frame) in releases.iter().enumerate() {
        let (x, y) = slots[i % 4];
        let z = 300 + (i as i64 / 4) * 30;
        assert_eq!(frame.nr_boxes, i as u64);
        assert_eq!(frame.position, Position::new(x, y, z), "box {i}");
        assert_eq!(frame.position, config.stacking.stack_position(i as u64));
    }
}

#[test]
fn deactivation_lets_running_cycle_finish() {
    let config = scripted(&[(0, OperatorAction::Activate), (20, OperatorAction::Deactivate)]);
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 120);

    // Deactivated mid-transport: the box is still delivered.
    assert_eq!(frames[20].arm, ArmState::TransportBox);
    let last = frames.last().expect("frames");
    assert_eq!(last.arm, ArmState::Waiting);
    assert_eq!(last.nr_boxes, 1);
    assert_eq!(last.position, config.stacking.wait_pos);
    assert_eq!(scheduler.arm().depth(), 1);
    assert!(!scheduler.cell().settings().is_active());
}

#[test]
fn inactive_cell_only_homes() {
    let config = scripted(&[]);
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 50);

    let last = frames.last().expect("frames");
    assert_eq!(last.arm, ArmState::InHomePos);
    assert_eq!(last.inlet, InletState::Undefined);
    assert_eq!(last.magazine, MagazineState::Ready);
    assert_eq!(last.position, Position::ORIGIN);
}
