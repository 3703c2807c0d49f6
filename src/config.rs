//! ═══════════════════════════════════════════════════════════════════════════════
//! CONFIG — Persisted Engine Tunables
//! ═══════════════════════════════════════════════════════════════════════════════
//! Loaded at startup, saved on every admin-driven change and after every
//! gap-sequence state transition, so a restart resumes mid-sequence with
//! identical behavior. Saving then loading must round-trip exactly.
//! ═══════════════════════════════════════════════════════════════════════════════

use crate::error::{ConfigError, SuitcastResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default prediction offset: target = source + offset
pub const STANDARD_OFFSET_DEFAULT: u64 = 1;

/// Verification window width bounds (inclusive)
pub const VERIFY_WINDOW_MAX: u64 = 10;

/// Hard ceiling for an admin-set suppression deadline, in seconds
pub const SUPPRESS_CEILING_SECS: u64 = 86_400;

/// Persisted engine configuration.
///
/// Invariant: while `gap_sequence_active` is true, `suppress_until` is
/// ignored entirely. The two are mutually exclusive in effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rounds between source and target (>= 1)
    pub standard_offset: u64,
    /// Extra verification attempts after the target round (0..=10)
    pub verification_window: u64,
    /// Gap-sequence trigger mode toggle
    pub gap_sequence_active: bool,
    /// Multi-step gap sequence, each entry > 0
    pub gap_sequence: Vec<u64>,
    /// Index into the sequence, wraps modulo length
    pub gap_cursor: usize,
    /// Last source round that satisfied a gap
    pub gap_anchor_round: u64,
    /// Whether the immediate first trigger already fired since (re)activation
    pub gap_first_fire_done: bool,
    /// Standard-mode suppression deadline; None means not suppressed
    pub suppress_until: Option<DateTime<Utc>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            standard_offset: STANDARD_OFFSET_DEFAULT,
            verification_window: 0,
            gap_sequence_active: false,
            gap_sequence: Vec::new(),
            gap_cursor: 0,
            gap_anchor_round: 0,
            gap_first_fire_done: false,
            suppress_until: None,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load(path: &Path) -> SuitcastResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save to a JSON file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> SuitcastResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("suitcast")
            .join("engine.json")
    }

    /// Set the standard offset. Rejects zero.
    pub fn set_standard_offset(&mut self, offset: u64) -> Result<(), ConfigError> {
        if offset < 1 {
            return Err(ConfigError::OffsetOutOfRange(offset));
        }
        self.standard_offset = offset;
        Ok(())
    }

    /// Set the verification window width. Rejects values above 10.
    pub fn set_verification_window(&mut self, width: u64) -> Result<(), ConfigError> {
        if width > VERIFY_WINDOW_MAX {
            return Err(ConfigError::WindowOutOfRange(width));
        }
        self.verification_window = width;
        Ok(())
    }

    /// Set or clear the suppression deadline. Zero seconds clears it;
    /// durations above the ceiling are rejected. Returns the new deadline.
    pub fn suppress_for(
        &mut self,
        secs: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, ConfigError> {
        if secs == 0 {
            self.suppress_until = None;
            return Ok(None);
        }
        if secs > SUPPRESS_CEILING_SECS {
            return Err(ConfigError::SuppressionTooLong {
                requested: secs,
                ceiling: SUPPRESS_CEILING_SECS,
            });
        }
        let deadline = now + Duration::seconds(secs as i64);
        self.suppress_until = Some(deadline);
        Ok(Some(deadline))
    }

    /// Whether standard-mode triggering is currently suppressed.
    /// Active gap-sequence mode ignores the deadline regardless of its value.
    pub fn is_suppressed(&self, now: DateTime<Utc>) -> bool {
        if self.gap_sequence_active {
            return false;
        }
        self.suppress_until.map(|t| now < t).unwrap_or(false)
    }

    /// Activate gap-sequence mode with a fresh sequence. Resets the cursor,
    /// anchor and first-fire flag to force an immediate first trigger, and
    /// clears any pending suppression deadline.
    pub fn set_gap_sequence(&mut self, sequence: Vec<u64>) -> Result<(), ConfigError> {
        if sequence.is_empty() {
            return Err(ConfigError::EmptyGapSequence);
        }
        if let Some(bad) = sequence.iter().find(|g| **g == 0) {
            return Err(ConfigError::InvalidGapEntry(bad.to_string()));
        }
        self.gap_sequence = sequence;
        self.gap_sequence_active = true;
        self.gap_cursor = 0;
        self.gap_anchor_round = 0;
        self.gap_first_fire_done = false;
        self.suppress_until = None;
        Ok(())
    }

    /// Deactivate gap-sequence mode, returning to standard triggering.
    pub fn clear_gap_sequence(&mut self) {
        self.gap_sequence_active = false;
        self.gap_sequence.clear();
        self.gap_cursor = 0;
        self.gap_anchor_round = 0;
        self.gap_first_fire_done = false;
    }

    /// Parse an admin-supplied comma-separated gap list ("3,4,5").
    pub fn parse_gap_sequence(input: &str) -> Result<Vec<u64>, ConfigError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyGapSequence);
        }
        trimmed
            .split(',')
            .map(|part| {
                let part = part.trim();
                match part.parse::<u64>() {
                    Ok(n) if n > 0 => Ok(n),
                    _ => Err(ConfigError::InvalidGapEntry(part.to_string())),
                }
            })
            .collect()
    }
}
