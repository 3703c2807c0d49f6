//! ═══════════════════════════════════════════════════════════════════════════════
//! TRIGGER — Trigger Mode Controller
//! ═══════════════════════════════════════════════════════════════════════════════
//! Runs once per accepted incoming message, finalized or not, and produces at
//! most one decision: fire a prediction for a future round, or hold with a
//! named reason.
//!
//! Three competing mode behaviors:
//! - Standard: fixed offset, gated by a passive suppression deadline
//! - Gap-sequence: multi-step gap protocol; ignores suppression entirely
//! - Suppressed: standard mode with a live deadline, no trigger at all
//! ═══════════════════════════════════════════════════════════════════════════════

use crate::announce::RoundFacts;
use crate::config::EngineConfig;
use crate::policy::TransformPolicy;
use crate::suit::{first_card_in, Suit};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A fired trigger, ready to become a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub target_round: u64,
    pub predicted: Suit,
    pub source_round: u64,
    pub source_suit: Suit,
}

/// Why no trigger fired for this message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldReason {
    /// Standard-mode suppression deadline still in the future
    Suppressed,
    /// Gap-sequence mode waiting for a later source round
    GapNotReached { required: u64 },
    /// Fewer than two evidence groups in the announcement
    MissingTriggerGroup,
    /// No suit found in the trigger evidence group
    NoSuitInGroup,
    /// Target round would overflow the round counter
    TargetOverflow,
}

/// Outcome of one trigger evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerDecision {
    Fire(Trigger),
    Hold(HoldReason),
}

/// Evaluate the active trigger mode against one round announcement.
///
/// Gap-sequence state (cursor, anchor, first-fire flag) mutates in place on
/// a fire; the caller persists the config afterwards so a restart resumes
/// mid-sequence.
pub fn evaluate(
    config: &mut EngineConfig,
    policy: TransformPolicy,
    facts: &RoundFacts,
    now: DateTime<Utc>,
) -> TriggerDecision {
    if config.gap_sequence_active {
        evaluate_gap_sequence(config, policy, facts)
    } else {
        evaluate_standard(config, policy, facts, now)
    }
}

fn evaluate_standard(
    config: &EngineConfig,
    policy: TransformPolicy,
    facts: &RoundFacts,
    now: DateTime<Utc>,
) -> TriggerDecision {
    if config.is_suppressed(now) {
        return TriggerDecision::Hold(HoldReason::Suppressed);
    }
    fire_from(config, policy, facts)
}

fn evaluate_gap_sequence(
    config: &mut EngineConfig,
    policy: TransformPolicy,
    facts: &RoundFacts,
) -> TriggerDecision {
    if !config.gap_first_fire_done {
        let decision = fire_from(config, policy, facts);
        if let TriggerDecision::Fire(_) = decision {
            config.gap_first_fire_done = true;
            config.gap_anchor_round = facts.round;
        }
        return decision;
    }

    // gap_sequence is non-empty while the mode is active (validated on set)
    let gap = config
        .gap_sequence
        .get(config.gap_cursor)
        .copied()
        .unwrap_or(1);
    let required = config.gap_anchor_round.saturating_add(gap);
    if facts.round < required {
        return TriggerDecision::Hold(HoldReason::GapNotReached { required });
    }

    let decision = fire_from(config, policy, facts);
    if let TriggerDecision::Fire(_) = decision {
        config.gap_cursor = (config.gap_cursor + 1) % config.gap_sequence.len();
        config.gap_anchor_round = facts.round;
    }
    decision
}

/// Build the trigger from the second evidence group of the source message
fn fire_from(
    config: &EngineConfig,
    policy: TransformPolicy,
    facts: &RoundFacts,
) -> TriggerDecision {
    let group = match facts.groups.get(1) {
        Some(g) => g,
        None => return TriggerDecision::Hold(HoldReason::MissingTriggerGroup),
    };
    let card = match first_card_in(group) {
        Some(c) => c,
        None => return TriggerDecision::Hold(HoldReason::NoSuitInGroup),
    };
    // the round number is broadcast-controlled, never trust its magnitude
    let target_round = match facts.round.checked_add(config.standard_offset) {
        Some(t) => t,
        None => return TriggerDecision::Hold(HoldReason::TargetOverflow),
    };
    let predicted = policy.predict(card.suit, facts.round, card.rank_parity());
    TriggerDecision::Fire(Trigger {
        target_round,
        predicted,
        source_round: facts.round,
        source_suit: card.suit,
    })
}

/// How fired triggers reach the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Every fired trigger creates a registry entry immediately
    Immediate,
    /// Bounded stock: at most `max_active` live predictions; overflow parks
    /// in a queue and is promoted once the target comes within `proximity`
    /// rounds, or dropped once the window is missed (distance <= 1).
    BoundedStock { max_active: usize, proximity: u64 },
}

impl Default for DispatchMode {
    fn default() -> Self {
        DispatchMode::Immediate
    }
}

/// A trigger parked for deferred activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedPrediction {
    pub target_round: u64,
    pub predicted: Suit,
    pub source_round: u64,
    pub source_suit: Suit,
}

impl From<Trigger> for QueuedPrediction {
    fn from(t: Trigger) -> Self {
        Self {
            target_round: t.target_round,
            predicted: t.predicted,
            source_round: t.source_round,
            source_suit: t.source_suit,
        }
    }
}

/// Result of one queue sweep
#[derive(Debug, Default)]
pub struct SweepOutcome {
    /// Entries promoted to the registry this sweep, ascending target order
    pub promoted: Vec<QueuedPrediction>,
    /// Target rounds dropped because their send window was missed
    pub dropped: Vec<u64>,
}

/// FIFO queue of parked triggers, keyed by target round.
/// Re-evaluated on every finalized message.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: BTreeMap<u64, QueuedPrediction>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a trigger. Returns false when the target is already queued.
    pub fn park(&mut self, queued: QueuedPrediction) -> bool {
        if self.entries.contains_key(&queued.target_round) {
            return false;
        }
        self.entries.insert(queued.target_round, queued);
        true
    }

    pub fn contains(&self, target_round: u64) -> bool {
        self.entries.contains_key(&target_round)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> Vec<QueuedPrediction> {
        self.entries.values().copied().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Evaluate every queued entry against the current round.
    ///
    /// Distance-to-target decides the fate: <= 1 means the send window was
    /// missed and the entry is discarded, not retried; within the proximity
    /// band the entry is promoted while registry room remains; anything
    /// farther out stays parked.
    pub fn sweep(&mut self, current_round: u64, proximity: u64, mut room: usize) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();
        let targets: Vec<u64> = self.entries.keys().copied().collect();
        for target in targets {
            let distance = target.saturating_sub(current_round);
            if distance <= 1 {
                self.entries.remove(&target);
                outcome.dropped.push(target);
                continue;
            }
            if distance <= proximity && room > 0 {
                if let Some(entry) = self.entries.remove(&target) {
                    outcome.promoted.push(entry);
                    room -= 1;
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announce::parse_announcement;
    use crate::suit::Suit::*;

    fn facts(round: u64) -> RoundFacts {
        // trigger group carries K♥: odd rank, heart
        parse_announcement(&format!("#N {} (3♦)(K♥ 2♣) ✅", round)).unwrap()
    }

    #[test]
    fn test_standard_fire() {
        let mut config = EngineConfig::default();
        let decision = evaluate(
            &mut config,
            TransformPolicy::Simple,
            &facts(1219),
            Utc::now(),
        );
        match decision {
            TriggerDecision::Fire(t) => {
                assert_eq!(t.target_round, 1220);
                assert_eq!(t.source_round, 1219);
                assert_eq!(t.source_suit, Heart);
                assert_eq!(t.predicted, Spade); // odd-round pairing
            }
            other => panic!("expected fire, got {:?}", other),
        }
    }

    #[test]
    fn test_standard_suppressed() {
        let mut config = EngineConfig::default();
        let now = Utc::now();
        config.suppress_for(600, now).unwrap();
        let decision = evaluate(&mut config, TransformPolicy::Simple, &facts(10), now);
        assert_eq!(decision, TriggerDecision::Hold(HoldReason::Suppressed));
    }

    #[test]
    fn test_malformed_trigger_reasons() {
        let mut config = EngineConfig::default();
        let one_group = parse_announcement("#N 5 (3♦)").unwrap();
        assert_eq!(
            evaluate(&mut config, TransformPolicy::Simple, &one_group, Utc::now()),
            TriggerDecision::Hold(HoldReason::MissingTriggerGroup)
        );

        let no_suit = parse_announcement("#N 5 (3♦)(nothing)").unwrap();
        assert_eq!(
            evaluate(&mut config, TransformPolicy::Simple, &no_suit, Utc::now()),
            TriggerDecision::Hold(HoldReason::NoSuitInGroup)
        );
    }

    #[test]
    fn test_target_overflow_holds() {
        let mut config = EngineConfig::default();
        let d = evaluate(
            &mut config,
            TransformPolicy::Simple,
            &facts(u64::MAX),
            Utc::now(),
        );
        assert_eq!(d, TriggerDecision::Hold(HoldReason::TargetOverflow));
    }

    #[test]
    fn test_gap_sequence_advancement() {
        let mut config = EngineConfig::default();
        config.set_gap_sequence(vec![3, 4, 5]).unwrap();
        let now = Utc::now();

        // first trigger fires immediately and anchors at 100
        let d = evaluate(&mut config, TransformPolicy::Simple, &facts(100), now);
        assert!(matches!(d, TriggerDecision::Fire(_)));
        assert!(config.gap_first_fire_done);
        assert_eq!(config.gap_anchor_round, 100);
        assert_eq!(config.gap_cursor, 0);

        // round 102 < 100 + 3: no second trigger
        let d = evaluate(&mut config, TransformPolicy::Simple, &facts(102), now);
        assert_eq!(
            d,
            TriggerDecision::Hold(HoldReason::GapNotReached { required: 103 })
        );
        assert_eq!(config.gap_cursor, 0);

        // round 103 satisfies the gap: cursor advances to gap 4, anchor moves
        let d = evaluate(&mut config, TransformPolicy::Simple, &facts(103), now);
        assert!(matches!(d, TriggerDecision::Fire(_)));
        assert_eq!(config.gap_cursor, 1);
        assert_eq!(config.gap_anchor_round, 103);
    }

    #[test]
    fn test_gap_cursor_wraps() {
        let mut config = EngineConfig::default();
        config.set_gap_sequence(vec![2]).unwrap();
        let now = Utc::now();
        evaluate(&mut config, TransformPolicy::Simple, &facts(10), now);
        evaluate(&mut config, TransformPolicy::Simple, &facts(12), now);
        assert_eq!(config.gap_cursor, 0); // single-entry sequence wraps to itself
        evaluate(&mut config, TransformPolicy::Simple, &facts(14), now);
        assert_eq!(config.gap_anchor_round, 14);
    }

    #[test]
    fn test_gap_mode_overrides_suppression() {
        let mut config = EngineConfig::default();
        let now = Utc::now();
        config.suppress_for(600, now).unwrap();
        config.set_gap_sequence(vec![3]).unwrap();
        // next trigger fires as if no suppression existed
        let d = evaluate(&mut config, TransformPolicy::Simple, &facts(50), now);
        assert!(matches!(d, TriggerDecision::Fire(_)));
    }

    #[test]
    fn test_queue_promote_and_drop_bands() {
        let mut queue = PendingQueue::new();
        for target in [101, 103, 110] {
            queue.park(QueuedPrediction {
                target_round: target,
                predicted: Diamond,
                source_round: target - 1,
                source_suit: Heart,
            });
        }

        // current 100: 101 is distance 1 (missed), 103 is distance 3
        // (promoted), 110 stays parked
        let outcome = queue.sweep(100, 3, 2);
        assert_eq!(outcome.dropped, vec![101]);
        assert_eq!(outcome.promoted.len(), 1);
        assert_eq!(outcome.promoted[0].target_round, 103);
        assert_eq!(queue.len(), 1);
        assert!(queue.contains(110));
    }

    #[test]
    fn test_queue_respects_room() {
        let mut queue = PendingQueue::new();
        for target in [104, 105] {
            queue.park(QueuedPrediction {
                target_round: target,
                predicted: Club,
                source_round: 100,
                source_suit: Spade,
            });
        }
        // both within proximity, but room for one
        let outcome = queue.sweep(102, 3, 1);
        assert_eq!(outcome.promoted.len(), 1);
        assert_eq!(outcome.promoted[0].target_round, 104);
        assert!(queue.contains(105));
    }

    #[test]
    fn test_queue_park_duplicate() {
        let mut queue = PendingQueue::new();
        let q = QueuedPrediction {
            target_round: 7,
            predicted: Spade,
            source_round: 6,
            source_suit: Heart,
        };
        assert!(queue.park(q));
        assert!(!queue.park(q));
    }
}
