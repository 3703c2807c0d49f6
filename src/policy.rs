//! ═══════════════════════════════════════════════════════════════════════════════
//! POLICY — Suit Transformation Rule Engine
//! ═══════════════════════════════════════════════════════════════════════════════
//! Pure mapping (observed suit, round parity, rank parity) → predicted suit.
//!
//! Two independently evolved policies coexist and must both stay testable as
//! named algorithms. They are enumerated data, not formulas: do not try to
//! unify them.
//! ═══════════════════════════════════════════════════════════════════════════════

use crate::suit::{RankParity, Suit};
use serde::{Deserialize, Serialize};

/// Which transformation table drives predictions. Selected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TransformPolicy {
    /// Round-parity pairing swap only
    Simple,
    /// Round parity × rank parity decision table
    #[default]
    Extended,
}

impl TransformPolicy {
    /// Predicted suit for the observed card of a source round.
    ///
    /// Total and deterministic over the whole input domain.
    pub fn predict(&self, observed: Suit, source_round: u64, rank: RankParity) -> Suit {
        match self {
            TransformPolicy::Simple => simple(observed, source_round),
            TransformPolicy::Extended => extended(observed, source_round, rank),
        }
    }
}

/// Odd rounds swap within {♠,♥} {♣,♦}; even rounds within {♠,♣} {♦,♥}.
fn simple(observed: Suit, source_round: u64) -> Suit {
    if source_round % 2 == 1 {
        swap_odd(observed)
    } else {
        swap_even(observed)
    }
}

/// The sixteen-entry table. Each arm is fixed data; the apparent overlaps
/// with the simple policy are historical coincidence, not structure.
fn extended(observed: Suit, source_round: u64, rank: RankParity) -> Suit {
    let round_odd = source_round % 2 == 1;
    match (round_odd, rank) {
        (false, RankParity::Odd) => swap_even(observed),
        (false, RankParity::Even) => swap_odd(observed),
        (true, RankParity::Odd) => swap_odd(observed),
        (true, RankParity::Even) => swap_cross(observed),
    }
}

/// ♠↔♥, ♣↔♦
fn swap_odd(s: Suit) -> Suit {
    match s {
        Suit::Spade => Suit::Heart,
        Suit::Heart => Suit::Spade,
        Suit::Club => Suit::Diamond,
        Suit::Diamond => Suit::Club,
    }
}

/// ♠↔♣, ♦↔♥
fn swap_even(s: Suit) -> Suit {
    match s {
        Suit::Spade => Suit::Club,
        Suit::Club => Suit::Spade,
        Suit::Diamond => Suit::Heart,
        Suit::Heart => Suit::Diamond,
    }
}

/// ♠↔♦, ♥↔♣
fn swap_cross(s: Suit) -> Suit {
    match s {
        Suit::Spade => Suit::Diamond,
        Suit::Diamond => Suit::Spade,
        Suit::Heart => Suit::Club,
        Suit::Club => Suit::Heart,
    }
}
