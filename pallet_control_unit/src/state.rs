//! Task family root.
//!
//! One perpetual cooperative task per physical subsystem. Each module owns
//! its frame type, its task alias and a constructor.

pub mod arm;
pub mod inlet;
pub mod magazine;

pub use arm::{ArmFrame, ArmTask, arm_task};
pub use inlet::{InletConveyor, InletTask, inlet_task};
pub use magazine::{MagazineTask, PalletMagazine, magazine_task};
