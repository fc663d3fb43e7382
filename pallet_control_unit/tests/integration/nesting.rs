//! Call-tree nesting and frame arena discipline on the real task families.

use std::mem::size_of;

use pallet_common::prelude::*;
use pallet_control_unit::cycle::{CycleError, TickScheduler};
use pallet_control_unit::error::{ArenaError, TaskFault};
use pallet_control_unit::state::{ArmFrame, arm_task};
use pallet_control_unit::task::{FrameAddr, FrameArena};
use pallet_control_unit::timer::ManualClock;
use pallet_control_unit::workcell::Workcell;
use pallet_hal::simulated_rig;

use super::scheduler;

#[test]
fn nested_frames_must_be_freed_in_lifo_order() {
    let config = PalletizerConfig::default();
    let mut scheduler = scheduler(&config);
    scheduler.tick().expect("tick");

    // Supervisor -> Homing -> GoTo.
    let arm = scheduler.arm();
    assert_eq!(arm.depth(), 3);
    assert!(matches!(arm.root(), Some(ArmFrame::Supervisor(_))));
    let addrs: Vec<FrameAddr> = arm.frame_addrs().collect();
    let mut arena = arm.arena().clone();

    assert_eq!(
        arena.deallocate(addrs[1]),
        Err(ArenaError::OutOfOrder {
            freed: addrs[1].offset(),
            top: addrs[2].offset(),
        })
    );
    for addr in addrs.into_iter().rev() {
        arena.deallocate(addr).expect("LIFO free");
    }
    assert_eq!(arena.used(), 0);
}

#[test]
fn arena_usage_follows_call_depth() {
    let config = PalletizerConfig::default();
    let mut scheduler = scheduler(&config);
    for _ in 0..400 {
        scheduler.tick().expect("tick");
        let arm = scheduler.arm();
        assert_eq!(arm.arena().depth(), arm.depth());
    }

    let frame = FrameArena::rounded(size_of::<ArmFrame>());
    let arena = scheduler.arm().arena();
    assert_eq!(arena.high_water(), 3 * frame);
    assert!(arena.high_water() <= arena.capacity());
    assert_eq!(scheduler.magazine().arena().depth(), 1);
    assert_eq!(scheduler.inlet().arena().depth(), 1);
}

#[test]
fn undersized_arena_is_rejected_before_first_tick() {
    let mut config = PalletizerConfig::default();
    config.tasks.arena_bytes = FrameArena::rounded(size_of::<ArmFrame>());

    let err = TickScheduler::new(&config, simulated_rig(&config.simulation), ManualClock::new())
        .unwrap_err();
    assert!(matches!(err, CycleError::Config(ConfigError::ValidationError(_))));
}

#[test]
fn arena_exhaustion_inside_a_step_is_fatal() {
    let config = PalletizerConfig::default();
    let mut cell = Workcell::new(&config, simulated_rig(&config.simulation));
    let mut arm = arm_task(FrameArena::rounded(size_of::<ArmFrame>())).expect("root fits");

    cell.advance_collaborators();
    let fault = arm.step(&mut cell.arm_view()).unwrap_err();
    assert!(matches!(
        fault,
        TaskFault::Arena {
            task: "Arm",
            source: ArenaError::Exhausted { .. }
        }
    ));
    assert!(!arm.is_alive());
    assert_eq!(arm.arena().used(), 0);
    assert_eq!(
        arm.step(&mut cell.arm_view()).unwrap_err(),
        TaskFault::NotAlive { task: "Arm" }
    );
}
