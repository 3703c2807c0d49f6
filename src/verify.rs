//! ═══════════════════════════════════════════════════════════════════════════════
//! VERIFY — Verification Window Engine
//! ═══════════════════════════════════════════════════════════════════════════════
//! Consumes finalized-round evidence and advances every in-flight prediction
//! whose window covers the round. A prediction not confirmed by its last
//! allowed attempt is refuted exactly there, never later.
//! ═══════════════════════════════════════════════════════════════════════════════

use crate::registry::{PredictionRecord, PredictionRegistry, PredictionState};
use crate::suit::contains_suit;

/// How a prediction left the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Predicted suit found in the evidence; attempt 0 is the target round
    Confirmed { attempt: u64 },
    /// Window exhausted without a confirmation
    Refuted,
}

/// One resolved prediction plus its resolution
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub record: PredictionRecord,
    pub resolution: Resolution,
}

/// Advance every due prediction against the finalized round `round` whose
/// first evidence group is `group0`. Returns the resolutions in ascending
/// target order; unresolved records stay live with their attempt count
/// bumped.
pub fn advance(
    registry: &mut PredictionRegistry,
    round: u64,
    group0: &str,
) -> Vec<VerifyOutcome> {
    let mut outcomes = Vec::new();

    for target in registry.target_rounds() {
        if target > round {
            // not yet due
            continue;
        }
        let (window, predicted) = match registry.get(target) {
            Some(r) => (r.window, r.predicted),
            None => continue,
        };

        // A record past its window cannot exist: the round stream is
        // contiguous and the exhausting round already refuted it.
        debug_assert!(
            target + window >= round,
            "stale prediction for round {} survived past {}",
            target,
            target + window
        );

        let attempt = round - target;
        if contains_suit(group0, predicted) {
            if let Ok(record) = registry.resolve(target, PredictionState::Confirmed) {
                outcomes.push(VerifyOutcome {
                    record,
                    resolution: Resolution::Confirmed { attempt },
                });
            }
        } else if round >= target + window {
            if let Ok(record) = registry.resolve(target, PredictionState::Refuted) {
                outcomes.push(VerifyOutcome {
                    record,
                    resolution: Resolution::Refuted,
                });
            }
        } else if let Some(record) = registry.get_mut(target) {
            record.attempts += 1;
        }
    }

    outcomes
}
