//! Pallet swap when the magazine reaches capacity.

use pallet_common::prelude::*;

use super::{record, scheduler};

fn small_pallet() -> PalletizerConfig {
    let mut config = PalletizerConfig::default();
    config.stacking.boxes_per_pallet = 4;
    config
}

#[test]
fn full_pallet_reloads_for_reload_ticks() {
    let config = small_pallet();
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 300);

    let reload = frames
        .iter()
        .position(|f| f.magazine == MagazineState::Reloading)
        .expect("magazine never reloaded");
    assert_eq!(frames[reload].tick, 123);

    let before = frames[reload - 1];
    assert_eq!(before.magazine, MagazineState::Ready);
    assert_eq!(before.nr_boxes, 3);
    // The fourth box lands and is counted away in the same tick.
    assert_eq!(frames[reload].nr_boxes, 0);

    let reload_ticks = config.magazine.reload_ticks as usize;
    for frame in &frames[reload..reload + reload_ticks] {
        assert_eq!(frame.magazine, MagazineState::Reloading, "tick {}", frame.tick);
    }
    assert_eq!(frames[reload + reload_ticks].magazine, MagazineState::Ready);
}

#[test]
fn box_counter_never_reaches_capacity_between_ticks() {
    let config = small_pallet();
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 300);

    assert!(frames.iter().all(|f| f.nr_boxes < 4));
    assert!(frames.iter().all(|f| f.magazine != MagazineState::Empty));

    let summary = scheduler.summary();
    assert_eq!(summary.pallets_completed, 2);
    assert_eq!(summary.boxes_stacked, 9);
}

#[test]
fn arm_waits_for_reloaded_pallet() {
    let config = small_pallet();
    let mut scheduler = scheduler(&config);
    let frames = record(&mut scheduler, 300);

    for pair in frames.windows(2) {
        if pair[1].arm == ArmState::TakeBox && pair[0].arm != ArmState::TakeBox {
            assert_eq!(pair[0].magazine, MagazineState::Ready, "tick {}", pair[1].tick);
        }
    }
}
