//! Target positions and stacking slots.

use serde::{Deserialize, Serialize};

/// Integer (x, y, z) target triple in axis units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Position {
    /// The homing reference.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

/// Horizontal placement of one box within a pallet layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Slot {
    pub x: i64,
    pub y: i64,
}

impl Slot {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Lift the slot to height `z`.
    #[inline]
    pub const fn at_height(self, z: i64) -> Position {
        Position::new(self.x, self.y, z)
    }
}

/// Build the four slots of a 2×2 layer from two x and two y coordinates.
///
/// Order: `(x1, y1)`, `(x2, y1)`, `(x1, y2)`, `(x2, y2)`.
pub const fn grid_slots(x1: i64, x2: i64, y1: i64, y2: i64) -> [Slot; 4] {
    [
        Slot::new(x1, y1),
        Slot::new(x2, y1),
        Slot::new(x1, y2),
        Slot::new(x2, y2),
    ]
}
