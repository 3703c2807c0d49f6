//! ═══════════════════════════════════════════════════════════════════════════════
//! SUITCAST — Prediction Scheduling & Verification Engine
//! ═══════════════════════════════════════════════════════════════════════════════
//! Ingests structured card-round announcements from a broadcast channel and
//! derives timed predictions about future rounds: parse, trigger, publish,
//! verify across a bounded window, resolve.
//!
//! Connectivity, health endpoints and admin rendering live outside this
//! crate; the engine consumes raw text plus a channel identity and speaks to
//! the outside world only through the `Publisher` seam.
//! ═══════════════════════════════════════════════════════════════════════════════

// ═══════════════════════════════════════════════════════════════════════════════
// FOUNDATION MODULES — alphabet, parsing, transformation rules
// ═══════════════════════════════════════════════════════════════════════════════

pub mod announce;
pub mod policy;
pub mod suit;

// ═══════════════════════════════════════════════════════════════════════════════
// CORE MODULES — state, decisions, verification
// ═══════════════════════════════════════════════════════════════════════════════

pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod message;
pub mod registry;
pub mod trigger;
pub mod verify;

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEDULING — background reset timers
// ═══════════════════════════════════════════════════════════════════════════════

pub mod reset;

// Re-export common error types
pub use error::{ConfigError, PublishError, RegistryError, SuitcastError, SuitcastResult};

// Re-export core types
pub use announce::{parse_announcement, RoundFacts};
pub use config::{EngineConfig, STANDARD_OFFSET_DEFAULT, SUPPRESS_CEILING_SECS, VERIFY_WINDOW_MAX};
pub use dedup::{text_fingerprint, BoundedGuard};
pub use engine::{
    EngineEvent, EngineMode, EngineStatus, InboundEvent, PredictionEngine, Publisher,
};
pub use policy::TransformPolicy;
pub use registry::{MessageHandle, PredictionRecord, PredictionRegistry, PredictionState};
pub use reset::{next_daily_occurrence, DailyAnchor, ResetScheduler};
pub use suit::{
    contains_suit, first_card_in, first_suit_in, normalize_suits, ObservedCard, Rank, RankParity,
    Suit,
};
pub use trigger::{
    DispatchMode, HoldReason, PendingQueue, QueuedPrediction, Trigger, TriggerDecision,
};
pub use verify::{Resolution, VerifyOutcome};
