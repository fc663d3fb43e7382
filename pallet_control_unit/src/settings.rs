//! Process-wide activation and error gate.
//!
//! Invariant: `is_active() ⇒ error_count() == 0`. Tasks only ever see a
//! `&Settings`; the mutators are called from the operator boundary
//! (see [`crate::operator`]) between ticks.

use pallet_common::prelude::{ErrorFlags, ErrorKind};

/// Activation flag plus the set of outstanding process errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    active: bool,
    error_count: u32,
    errors: ErrorFlags,
}

impl Settings {
    /// Inactive gate with no errors.
    pub const fn new() -> Self {
        Self {
            active: false,
            error_count: 0,
            errors: ErrorFlags::empty(),
        }
    }

    /// Activate the cell. No-op while any error is outstanding.
    ///
    /// Returns whether the gate is active afterwards.
    pub fn activate(&mut self) -> bool {
        if self.error_count == 0 {
            self.active = true;
        }
        self.active
    }

    /// Deactivate the cell.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Raise `kind`. Always deactivates; counts each kind at most once.
    ///
    /// Returns `true` if `kind` was newly raised.
    pub fn raise(&mut self, kind: ErrorKind) -> bool {
        self.active = false;
        if self.errors.contains(kind.flag()) {
            return false;
        }
        self.errors.insert(kind.flag());
        self.error_count += 1;
        true
    }

    /// Clear `kind` if it is raised. Does not reactivate the cell.
    ///
    /// Returns `true` if `kind` was raised.
    pub fn clear(&mut self, kind: ErrorKind) -> bool {
        if !self.errors.contains(kind.flag()) {
            return false;
        }
        self.errors.remove(kind.flag());
        self.error_count = self.error_count.saturating_sub(1);
        true
    }

    #[inline]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub const fn has_error(&self) -> bool {
        self.error_count > 0
    }

    #[inline]
    pub const fn error_count(&self) -> u32 {
        self.error_count
    }

    #[inline]
    pub const fn is_set(&self, kind: ErrorKind) -> bool {
        self.errors.contains(kind.flag())
    }

    /// Raw set of outstanding errors, for telemetry.
    #[inline]
    pub const fn errors(&self) -> ErrorFlags {
        self.errors
    }
}
