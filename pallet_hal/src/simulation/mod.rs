//! Tick-driven collaborator models.

mod motor;
mod piston;

pub use motor::SimulatedMotor;
pub use piston::SimulatedPiston;

use pallet_common::cell::config::SimulationConfig;
use pallet_common::hal::rig::ArmRig;
use tracing::debug;

/// Build an arm rig from simulated parts.
///
/// All axes start at 0 with no pending target; the gripper starts extended.
pub fn simulated_rig(config: &SimulationConfig) -> ArmRig {
    debug!(
        motor_speed = config.motor_speed,
        piston_travel_ticks = config.piston_travel_ticks,
        "building simulated arm rig"
    );
    ArmRig::new(
        Box::new(SimulatedMotor::new(config.motor_speed)),
        Box::new(SimulatedMotor::new(config.motor_speed)),
        Box::new(SimulatedMotor::new(config.motor_speed)),
        Box::new(SimulatedPiston::new(config.piston_travel_ticks)),
    )
}
