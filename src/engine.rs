//! ═══════════════════════════════════════════════════════════════════════════════
//! ENGINE — Serialized Prediction Decision Core
//! ═══════════════════════════════════════════════════════════════════════════════
//! One engine object owns the registry, the parked queue, the duplicate
//! guards and the configuration; every event (message, edit, admin command,
//! reset) passes through `handle` on a single logical thread, so no locking
//! is needed anywhere in the core.
//!
//! Outward publish/edit calls are best effort: a failure is logged and never
//! rolled back, the registry stays the source of truth for verification.
//! ═══════════════════════════════════════════════════════════════════════════════

use crate::announce::{parse_announcement, RoundFacts};
use crate::config::EngineConfig;
use crate::dedup::{text_fingerprint, BoundedGuard};
use crate::error::{ConfigError, PublishError};
use crate::message;
use crate::policy::TransformPolicy;
use crate::registry::{MessageHandle, PredictionRecord, PredictionRegistry, PredictionState};
use crate::trigger::{
    self, DispatchMode, HoldReason, PendingQueue, QueuedPrediction, Trigger, TriggerDecision,
};
use crate::verify::{self, Resolution};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Seam to the external channel collaborator. Publishing returns an opaque
/// handle used for later edits; both calls may fail without consequence to
/// engine state.
pub trait Publisher {
    fn publish(&mut self, text: &str) -> Result<MessageHandle, PublishError>;
    fn edit(&mut self, handle: MessageHandle, text: &str) -> Result<(), PublishError>;
}

/// One inbound message event from the broadcast layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Originating channel identity
    pub channel: i64,
    /// Raw announcement text
    pub text: String,
    /// Whether this is an edit of a previously seen message
    #[serde(default)]
    pub is_edit: bool,
}

/// Everything the engine processes, in arrival order
#[derive(Debug, Clone)]
pub enum EngineEvent {
    Message(InboundEvent),
    /// Scheduled full-state clear; just another serialized event
    Reset,
}

/// Currently effective trigger mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Standard,
    GapSequence,
    Suppressed,
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineMode::Standard => write!(f, "standard"),
            EngineMode::GapSequence => write!(f, "gap-sequence"),
            EngineMode::Suppressed => write!(f, "suppressed"),
        }
    }
}

/// Structured status for the admin layer. Live and queued predictions are
/// reported as separate counts, never merged.
#[derive(Debug, Clone)]
pub struct EngineStatus {
    pub current_round: u64,
    pub mode: EngineMode,
    pub live: Vec<PredictionRecord>,
    pub queued: Vec<QueuedPrediction>,
    pub suppress_until: Option<DateTime<Utc>>,
}

/// The prediction scheduling and verification engine
pub struct PredictionEngine<P: Publisher> {
    publisher: P,
    config: EngineConfig,
    config_path: Option<PathBuf>,
    policy: TransformPolicy,
    dispatch: DispatchMode,
    source_channel: i64,
    registry: PredictionRegistry,
    queue: PendingQueue,
    trigger_guard: BoundedGuard<u64>,
    verify_guard: BoundedGuard<(u64, u64)>,
    current_round: u64,
}

impl<P: Publisher> PredictionEngine<P> {
    pub fn new(publisher: P, config: EngineConfig, source_channel: i64) -> Self {
        Self {
            publisher,
            config,
            config_path: None,
            policy: TransformPolicy::default(),
            dispatch: DispatchMode::Immediate,
            source_channel,
            registry: PredictionRegistry::unbounded(),
            queue: PendingQueue::new(),
            trigger_guard: BoundedGuard::default(),
            verify_guard: BoundedGuard::default(),
            current_round: 0,
        }
    }

    /// Select the transformation policy (default: Extended)
    pub fn with_policy(mut self, policy: TransformPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Select the dispatch strategy (default: Immediate)
    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.registry = match dispatch {
            DispatchMode::Immediate => PredictionRegistry::unbounded(),
            DispatchMode::BoundedStock { max_active, .. } => {
                PredictionRegistry::bounded(max_active)
            }
        };
        self.dispatch = dispatch;
        self
    }

    /// Persist configuration changes to this path
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Process one serialized event
    pub fn handle(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Message(msg) => self.handle_message(&msg),
            EngineEvent::Reset => self.reset_all(),
        }
    }

    /// Process one inbound message (new or edited)
    pub fn handle_message(&mut self, event: &InboundEvent) {
        if event.channel != self.source_channel {
            return;
        }
        let facts = match parse_announcement(&event.text) {
            Some(f) => f,
            // not a round announcement, silently skip
            None => return,
        };
        self.current_round = facts.round;

        // Trigger side runs on every message, finalized or not; an edit of
        // an already-seen round never re-triggers.
        let kind = if event.is_edit { "edit" } else { "replay" };
        if self.trigger_guard.insert(facts.round) {
            self.run_trigger(&facts);
        } else {
            log::debug!("round {}: {} on trigger side, skipped", facts.round, kind);
        }

        // Verification advances on finalized messages only; the fingerprint
        // lets an edited text drive verification exactly once.
        if facts.finalized {
            let key = (facts.round, text_fingerprint(&event.text));
            if self.verify_guard.insert(key) {
                self.run_verification(&facts);
                self.sweep_queue(facts.round);
            } else {
                log::debug!(
                    "round {}: {} on verification side, skipped",
                    facts.round,
                    kind
                );
            }
        }
    }

    fn run_trigger(&mut self, facts: &RoundFacts) {
        let gap_mode = self.config.gap_sequence_active;
        match trigger::evaluate(&mut self.config, self.policy, facts, Utc::now()) {
            TriggerDecision::Fire(t) => {
                if gap_mode {
                    // resume mid-sequence after a restart
                    self.persist_config();
                }
                log::info!(
                    "trigger: round {} observed {} -> predict {} for round {}",
                    t.source_round,
                    t.source_suit,
                    t.predicted,
                    t.target_round
                );
                self.dispatch_trigger(t);
            }
            TriggerDecision::Hold(HoldReason::MissingTriggerGroup) => {
                log::warn!(
                    "round {}: fewer than two evidence groups, trigger skipped",
                    facts.round
                );
            }
            TriggerDecision::Hold(HoldReason::NoSuitInGroup) => {
                log::warn!(
                    "round {}: no suit in trigger group, trigger skipped",
                    facts.round
                );
            }
            TriggerDecision::Hold(HoldReason::TargetOverflow) => {
                log::warn!(
                    "round {}: target round would overflow, trigger skipped",
                    facts.round
                );
            }
            TriggerDecision::Hold(reason) => {
                log::debug!("round {}: no trigger ({:?})", facts.round, reason);
            }
        }
    }

    fn dispatch_trigger(&mut self, t: Trigger) {
        if self.registry.contains(t.target_round) {
            log::debug!(
                "prediction for round {} already live, trigger ignored",
                t.target_round
            );
            return;
        }
        if self.queue.contains(t.target_round) {
            log::debug!(
                "prediction for round {} already queued, trigger ignored",
                t.target_round
            );
            return;
        }
        match self.dispatch {
            DispatchMode::Immediate => self.activate(t.into()),
            DispatchMode::BoundedStock { max_active, .. } => {
                if self.registry.has_room() {
                    self.activate(t.into());
                } else {
                    log::info!(
                        "stock full ({}/{}), parking prediction for round {}",
                        self.registry.len(),
                        max_active,
                        t.target_round
                    );
                    self.queue.park(t.into());
                }
            }
        }
    }

    /// Publish the waiting message and register the pending record.
    /// A failed publish still creates the record: verification applies,
    /// only the outward edit is skipped later.
    fn activate(&mut self, entry: QueuedPrediction) {
        let text = message::render(entry.target_round, entry.predicted, message::WAITING);
        let handle = match self.publisher.publish(&text) {
            Ok(h) => Some(h),
            Err(e) => {
                log::error!("publish failed for round {}: {}", entry.target_round, e);
                None
            }
        };
        let record = PredictionRecord {
            target_round: entry.target_round,
            predicted: entry.predicted,
            source_round: entry.source_round,
            source_suit: entry.source_suit,
            handle,
            window: self.config.verification_window,
            attempts: 0,
            state: PredictionState::Pending,
        };
        match self.registry.create(record) {
            Ok(()) => log::info!(
                "prediction live: round {} -> {} (source round {})",
                entry.target_round,
                entry.predicted,
                entry.source_round
            ),
            Err(e) => log::warn!(
                "prediction for round {} not registered: {}",
                entry.target_round,
                e
            ),
        }
    }

    fn sweep_queue(&mut self, current_round: u64) {
        let (max_active, proximity) = match self.dispatch {
            DispatchMode::BoundedStock {
                max_active,
                proximity,
            } => (max_active, proximity),
            DispatchMode::Immediate => return,
        };
        let room = max_active.saturating_sub(self.registry.len());
        let outcome = self.queue.sweep(current_round, proximity, room);
        for target in outcome.dropped {
            log::warn!(
                "queued prediction for round {} missed its send window, dropped",
                target
            );
        }
        for entry in outcome.promoted {
            log::info!(
                "round {} within {} rounds, promoting queued prediction",
                entry.target_round,
                proximity
            );
            self.activate(entry);
        }
    }

    fn run_verification(&mut self, facts: &RoundFacts) {
        let group0 = facts.groups.first().map(String::as_str).unwrap_or("");
        let outcomes = verify::advance(&mut self.registry, facts.round, group0);
        for outcome in outcomes {
            let status = message::resolution_token(outcome.resolution);
            let text = message::render(outcome.record.target_round, outcome.record.predicted, status);
            if let Some(handle) = outcome.record.handle {
                if let Err(e) = self.publisher.edit(handle, &text) {
                    log::error!(
                        "edit failed for round {}: {}",
                        outcome.record.target_round,
                        e
                    );
                }
            }
            match outcome.resolution {
                Resolution::Confirmed { attempt } => log::info!(
                    "prediction for round {} confirmed at attempt {}",
                    outcome.record.target_round,
                    attempt
                ),
                Resolution::Refuted => log::info!(
                    "prediction for round {} refuted, window exhausted",
                    outcome.record.target_round
                ),
            }
        }
    }

    // ── Admin control surface ───────────────────────────────────────────────
    // Validated operations; a rejection leaves prior configuration unchanged.
    // Every accepted change is persisted immediately.

    pub fn set_standard_offset(&mut self, offset: u64) -> Result<(), ConfigError> {
        self.config.set_standard_offset(offset)?;
        self.persist_config();
        Ok(())
    }

    pub fn set_verification_window(&mut self, width: u64) -> Result<(), ConfigError> {
        self.config.set_verification_window(width)?;
        self.persist_config();
        Ok(())
    }

    /// Suppress standard-mode triggering for `secs` seconds; 0 clears.
    /// Returns the new deadline. Ignored entirely while gap mode is active.
    pub fn suppress_for_secs(
        &mut self,
        secs: u64,
    ) -> Result<Option<DateTime<Utc>>, ConfigError> {
        let deadline = self.config.suppress_for(secs, Utc::now())?;
        self.persist_config();
        Ok(deadline)
    }

    /// Activate gap-sequence mode with an explicit sequence
    pub fn set_gap_sequence(&mut self, sequence: Vec<u64>) -> Result<(), ConfigError> {
        self.config.set_gap_sequence(sequence)?;
        self.persist_config();
        log::info!(
            "gap-sequence mode active: {:?}, awaiting first trigger",
            self.config.gap_sequence
        );
        Ok(())
    }

    /// Activate gap-sequence mode from an admin-supplied comma list
    pub fn set_gap_sequence_from_str(&mut self, input: &str) -> Result<(), ConfigError> {
        let sequence = EngineConfig::parse_gap_sequence(input)?;
        self.set_gap_sequence(sequence)
    }

    /// Return to standard triggering
    pub fn clear_gap_sequence(&mut self) {
        self.config.clear_gap_sequence();
        self.persist_config();
        log::info!("gap-sequence mode cleared, back to standard triggering");
    }

    /// Currently effective trigger mode
    pub fn mode(&self) -> EngineMode {
        if self.config.gap_sequence_active {
            EngineMode::GapSequence
        } else if self.config.is_suppressed(Utc::now()) {
            EngineMode::Suppressed
        } else {
            EngineMode::Standard
        }
    }

    /// Structured status for the admin layer
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            current_round: self.current_round,
            mode: self.mode(),
            live: self.registry.snapshot(),
            queued: self.queue.snapshot(),
            suppress_until: self.config.suppress_until,
        }
    }

    /// Full state clear: registry, queue, guards, round counter.
    /// Configuration (offsets, mode, sequence state) survives a reset.
    pub fn reset_all(&mut self) {
        let live = self.registry.len();
        let queued = self.queue.len();
        self.registry.clear();
        self.queue.clear();
        self.trigger_guard.clear();
        self.verify_guard.clear();
        self.current_round = 0;
        log::warn!(
            "full state reset: {} live and {} queued predictions cleared",
            live,
            queued
        );
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    fn persist_config(&self) {
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save(path) {
                log::error!("failed to persist config to {}: {}", path.display(), e);
            }
        }
    }
}
