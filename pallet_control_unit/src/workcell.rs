//! Shared cell context.
//!
//! The [`Workcell`] owns everything the tasks share: the settings gate, the
//! published task states, the box counter and the arm rig. Tasks never hold
//! on to it. Each tick the scheduler hands every task family a short-lived
//! view that exposes mutators only for what that family owns:
//!
//! | View            | Writes                                           | Reads                     |
//! |-----------------|--------------------------------------------------|---------------------------|
//! | [`ArmCtx`]      | `ArmState`, rig, box counter (+1), inlet hand-off | settings, `MagazineState` |
//! | [`MagazineCtx`] | `MagazineState`, box counter (reset)             | box counter               |
//! | [`InletCtx`]    | `InletState`                                     | settings                  |
//!
//! Tasks are stepped Arm, Magazine, Inlet, so every task observes the
//! others' states as they were published up to one tick earlier.

use pallet_common::prelude::{
    ArmRig, ArmState, InletState, MagazineState, PalletizerConfig, StackingConfig,
};

use crate::settings::Settings;

/// Running box count for the pallet currently in the magazine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoxCounter {
    on_pallet: u64,
    stacked: u64,
    pallets: u64,
}

impl BoxCounter {
    pub const fn new() -> Self {
        Self {
            on_pallet: 0,
            stacked: 0,
            pallets: 0,
        }
    }

    /// Boxes on the current pallet (`nr_boxes`).
    #[inline]
    pub const fn count(&self) -> u64 {
        self.on_pallet
    }

    /// Boxes stacked since start-up.
    #[inline]
    pub const fn stacked(&self) -> u64 {
        self.stacked
    }

    /// Full pallets swapped out since start-up.
    #[inline]
    pub const fn pallets(&self) -> u64 {
        self.pallets
    }

    /// A box was released onto the pallet.
    pub fn increment(&mut self) {
        self.on_pallet += 1;
        self.stacked += 1;
    }

    /// The pallet was swapped for an empty one.
    pub fn reset(&mut self) {
        self.on_pallet = 0;
        self.pallets += 1;
    }
}

/// The arm's access to the inlet state.
///
/// The arm may read the inlet state and, after picking the box up, clear it
/// to [`InletState::NoBox`]. It cannot publish any other inlet state.
#[derive(Debug)]
pub struct InletHandoff<'a> {
    state: &'a mut InletState,
}

impl InletHandoff<'_> {
    #[inline]
    pub fn state(&self) -> InletState {
        *self.state
    }

    /// Mark the box as taken.
    pub fn take_box(&mut self) {
        *self.state = InletState::NoBox;
    }
}

/// Context for one step of the arm task.
#[derive(Debug)]
pub struct ArmCtx<'a> {
    pub settings: &'a Settings,
    pub stacking: &'a StackingConfig,
    pub rig: &'a mut ArmRig,
    pub boxes: &'a mut BoxCounter,
    pub state: &'a mut ArmState,
    pub inlet: InletHandoff<'a>,
    pub magazine: MagazineState,
}

impl ArmCtx<'_> {
    /// Publish a new arm state.
    #[inline]
    pub fn publish(&mut self, state: ArmState) {
        *self.state = state;
    }
}

/// Context for one step of the inlet task.
#[derive(Debug)]
pub struct InletCtx<'a> {
    pub settings: &'a Settings,
    pub transport_ticks: u32,
    pub state: &'a mut InletState,
}

/// Context for one step of the magazine task.
#[derive(Debug)]
pub struct MagazineCtx<'a> {
    pub capacity: u64,
    pub reload_ticks: u32,
    pub boxes: &'a mut BoxCounter,
    pub state: &'a mut MagazineState,
}

/// Everything the tasks share, created once at start-up.
#[derive(Debug)]
pub struct Workcell {
    settings: Settings,
    stacking: StackingConfig,
    transport_ticks: u32,
    reload_ticks: u32,
    rig: ArmRig,
    boxes: BoxCounter,
    arm: ArmState,
    inlet: InletState,
    magazine: MagazineState,
}

impl Workcell {
    /// Build the cell around `rig`. All states start `Undefined`, the gate
    /// starts inactive.
    pub fn new(config: &PalletizerConfig, rig: ArmRig) -> Self {
        Self {
            settings: Settings::new(),
            stacking: config.stacking,
            transport_ticks: config.inlet.transport_ticks,
            reload_ticks: config.magazine.reload_ticks,
            rig,
            boxes: BoxCounter::new(),
            arm: ArmState::Undefined,
            inlet: InletState::Undefined,
            magazine: MagazineState::Undefined,
        }
    }

    pub fn arm_view(&mut self) -> ArmCtx<'_> {
        ArmCtx {
            settings: &self.settings,
            stacking: &self.stacking,
            rig: &mut self.rig,
            boxes: &mut self.boxes,
            state: &mut self.arm,
            inlet: InletHandoff {
                state: &mut self.inlet,
            },
            magazine: self.magazine,
        }
    }

    pub fn magazine_view(&mut self) -> MagazineCtx<'_> {
        MagazineCtx {
            capacity: self.stacking.boxes_per_pallet,
            reload_ticks: self.reload_ticks,
            boxes: &mut self.boxes,
            state: &mut self.magazine,
        }
    }

    pub fn inlet_view(&mut self) -> InletCtx<'_> {
        InletCtx {
            settings: &self.settings,
            transport_ticks: self.transport_ticks,
            state: &mut self.inlet,
        }
    }

    /// Advance every physical collaborator by one tick.
    pub fn advance_collaborators(&mut self) {
        self.rig.advance();
    }

    /// Operator boundary access to the gate.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn stacking(&self) -> &StackingConfig {
        &self.stacking
    }

    #[inline]
    pub fn rig(&self) -> &ArmRig {
        &self.rig
    }

    #[inline]
    pub fn boxes(&self) -> &BoxCounter {
        &self.boxes
    }

    #[inline]
    pub fn nr_boxes(&self) -> u64 {
        self.boxes.count()
    }

    #[inline]
    pub fn arm_state(&self) -> ArmState {
        self.arm
    }

    #[inline]
    pub fn inlet_state(&self) -> InletState {
        self.inlet
    }

    #[inline]
    pub fn magazine_state(&self) -> MagazineState {
        self.magazine
    }
}
