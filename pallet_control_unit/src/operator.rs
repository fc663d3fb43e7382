//! Scripted operator boundary.
//!
//! The only caller of the settings mutators. Events are applied at the start
//! of their tick, before any task runs, in script order for equal ticks.

use heapless::Vec;
use pallet_common::consts::MAX_OPERATOR_EVENTS;
use pallet_common::prelude::{ConfigError, OperatorAction, OperatorEvent};
use tracing::{info, warn};

use crate::settings::Settings;

/// Operator events sorted by tick, with a cursor to the next pending one.
#[derive(Debug, Clone, Default)]
pub struct OperatorScript {
    events: Vec<OperatorEvent, MAX_OPERATOR_EVENTS>,
    next: usize,
}

impl OperatorScript {
    /// Build a script from configured events.
    ///
    /// # Errors
    /// [`ConfigError::ValidationError`] if there are more than
    /// [`MAX_OPERATOR_EVENTS`] events.
    pub fn new(events: &[OperatorEvent]) -> Result<Self, ConfigError> {
        let mut sorted: Vec<OperatorEvent, MAX_OPERATOR_EVENTS> =
            Vec::from_slice(events).map_err(|_| {
                ConfigError::ValidationError(format!(
                    "operator script has {} events, at most {MAX_OPERATOR_EVENTS} allowed",
                    events.len()
                ))
            })?;
        // Stable: equal ticks keep script order.
        sorted.sort_by_key(|event| event.tick);
        Ok(Self {
            events: sorted,
            next: 0,
        })
    }

    /// Events not applied yet.
    pub fn pending(&self) -> &[OperatorEvent] {
        &self.events[self.next..]
    }

    /// Apply every event due at or before `tick`. Returns how many ran.
    pub fn apply_due(&mut self, tick: u64, settings: &mut Settings) -> usize {
        let start = self.next;
        while let Some(event) = self.events.get(self.next) {
            if event.tick > tick {
                break;
            }
            apply(event.action, tick, settings);
            self.next += 1;
        }
        self.next - start
    }
}

fn apply(action: OperatorAction, tick: u64, settings: &mut Settings) {
    match action {
        OperatorAction::Activate => {
            if settings.activate() {
                info!(tick, "cell activated");
            } else {
                warn!(
                    tick,
                    errors = settings.error_count(),
                    "activation refused, errors outstanding"
                );
            }
        }
        OperatorAction::Deactivate => {
            settings.deactivate();
            info!(tick, "cell deactivated");
        }
        OperatorAction::Raise(kind) => {
            let fresh = settings.raise(kind);
            warn!(tick, %kind, fresh, errors = settings.error_count(), "error raised");
        }
        OperatorAction::Clear(kind) => {
            let was_set = settings.clear(kind);
            info!(tick, %kind, was_set, errors = settings.error_count(), "error cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pallet_common::prelude::ErrorKind;

    fn event(tick: u64, action: OperatorAction) -> OperatorEvent {
        OperatorEvent { tick, action }
    }

    #[test]
    fn applies_events_at_their_tick() {
        let mut script = OperatorScript::new(&[
            event(0, OperatorAction::Activate),
            event(3, OperatorAction::Deactivate),
        ])
        .unwrap();
        let mut settings = Settings::new();

        assert_eq!(script.apply_due(0, &mut settings), 1);
        assert!(settings.is_active());
        assert_eq!(script.apply_due(1, &mut settings), 0);
        assert_eq!(script.apply_due(2, &mut settings), 0);
        assert!(settings.is_active());
        assert_eq!(script.apply_due(3, &mut settings), 1);
        assert!(!settings.is_active());
        assert!(script.pending().is_empty());
    }

    #[test]
    fn out_of_order_script_is_sorted_stably() {
        let mut script = OperatorScript::new(&[
            event(5, OperatorAction::Activate),
            event(2, OperatorAction::Raise(ErrorKind::EmergencyStop)),
            event(5, OperatorAction::Clear(ErrorKind::EmergencyStop)),
        ])
        .unwrap();
        assert_eq!(script.pending()[0].tick, 2);

        let mut settings = Settings::new();
        script.apply_due(2, &mut settings);
        assert!(settings.has_error());

        // Activate runs before clear at tick 5, so it is refused.
        script.apply_due(5, &mut settings);
        assert!(!settings.has_error());
        assert!(!settings.is_active());
    }

    #[test]
    fn skipped_ticks_catch_up() {
        let mut script = OperatorScript::new(&[
            event(1, OperatorAction::Raise(ErrorKind::BoxCaughtOnConveyor)),
            event(2, OperatorAction::Clear(ErrorKind::BoxCaughtOnConveyor)),
        ])
        .unwrap();
        let mut settings = Settings::new();
        assert_eq!(script.apply_due(10, &mut settings), 2);
        assert_eq!(settings.error_count(), 0);
    }

    #[test]
    fn oversized_script_is_rejected() {
        let events = [event(0, OperatorAction::Activate); MAX_OPERATOR_EVENTS + 1];
        assert!(matches!(
            OperatorScript::new(&events),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
