//! ═══════════════════════════════════════════════════════════════════════════════
//! REGISTRY — Authoritative Map of In-Flight Predictions
//! ═══════════════════════════════════════════════════════════════════════════════
//! One live record per target round, at most. Records exist only while
//! Pending: resolution removes them immediately after the outward
//! notification is attempted. The registry is the source of truth for
//! verification; outward message state is best effort.
//! ═══════════════════════════════════════════════════════════════════════════════

use crate::error::RegistryError;
use crate::suit::Suit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque handle to a published prediction message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHandle(pub i64);

/// Lifecycle state of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionState {
    Pending,
    Confirmed,
    Refuted,
}

/// One outstanding prediction, keyed by its target round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// The future round this prediction is about (unique key)
    pub target_round: u64,
    /// Predicted suit
    pub predicted: Suit,
    /// Round whose evidence triggered this prediction
    pub source_round: u64,
    /// Observed suit that was transformed
    pub source_suit: Suit,
    /// Handle of the published message; None when the publish call failed.
    /// Verification still applies, only the outward edit is skipped.
    pub handle: Option<MessageHandle>,
    /// Verification window width fixed at creation time
    pub window: u64,
    /// Failed verification attempts observed so far
    pub attempts: u64,
    pub state: PredictionState,
}

impl PredictionRecord {
    /// Last round on which this prediction may still be confirmed
    pub fn last_attempt_round(&self) -> u64 {
        self.target_round + self.window
    }
}

/// The in-flight prediction map. All mutation happens on the engine's
/// single event-processing thread; no interior locking.
#[derive(Debug, Default)]
pub struct PredictionRegistry {
    live: BTreeMap<u64, PredictionRecord>,
    max_active: Option<usize>,
}

impl PredictionRegistry {
    /// Registry without a live-entry ceiling
    pub fn unbounded() -> Self {
        Self {
            live: BTreeMap::new(),
            max_active: None,
        }
    }

    /// Registry capped at `max_active` live entries
    pub fn bounded(max_active: usize) -> Self {
        Self {
            live: BTreeMap::new(),
            max_active: Some(max_active),
        }
    }

    /// Insert a new pending record. Fails on a duplicate target round or
    /// when the live-entry ceiling is reached.
    pub fn create(&mut self, record: PredictionRecord) -> Result<(), RegistryError> {
        if self.live.contains_key(&record.target_round) {
            return Err(RegistryError::AlreadyExists(record.target_round));
        }
        if let Some(cap) = self.max_active {
            if self.live.len() >= cap {
                return Err(RegistryError::CapacityExceeded);
            }
        }
        self.live.insert(record.target_round, record);
        Ok(())
    }

    /// Resolve a prediction: stamp the final state and remove the record.
    pub fn resolve(
        &mut self,
        target_round: u64,
        state: PredictionState,
    ) -> Result<PredictionRecord, RegistryError> {
        let mut record = self
            .live
            .remove(&target_round)
            .ok_or(RegistryError::NotFound(target_round))?;
        record.state = state;
        Ok(record)
    }

    pub fn contains(&self, target_round: u64) -> bool {
        self.live.contains_key(&target_round)
    }

    pub fn get(&self, target_round: u64) -> Option<&PredictionRecord> {
        self.live.get(&target_round)
    }

    pub fn get_mut(&mut self, target_round: u64) -> Option<&mut PredictionRecord> {
        self.live.get_mut(&target_round)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Whether another record may be created under the current ceiling
    pub fn has_room(&self) -> bool {
        self.max_active.map(|cap| self.live.len() < cap).unwrap_or(true)
    }

    /// Live records ordered by target round
    pub fn snapshot(&self) -> Vec<PredictionRecord> {
        self.live.values().cloned().collect()
    }

    /// Target rounds of live records, ascending
    pub fn target_rounds(&self) -> Vec<u64> {
        self.live.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}
