//! ═══════════════════════════════════════════════════════════════════════════════
//! ANNOUNCE — Round Announcement Parser
//! ═══════════════════════════════════════════════════════════════════════════════
//! Pure extraction of structured facts from raw broadcast text. No state.
//!
//! A message without a round-number token is simply not a round announcement;
//! that is a skip, never an error.
//! ═══════════════════════════════════════════════════════════════════════════════

/// Facts derived once per observed message. Ephemeral, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundFacts {
    /// Round number following the `#N` marker
    pub round: u64,
    /// Every maximal parenthesized substring, left to right.
    /// Index 0 is the verification group, index 1 the trigger group.
    pub groups: Vec<String>,
    /// Terminal-result marker present and no in-progress marker
    pub finalized: bool,
}

/// Marker token preceding the round number
const ROUND_MARKER: char = '#';

/// In-progress marker: its presence always means "not finalized"
const IN_PROGRESS_MARKER: char = '⏰';

/// Terminal-result markers
const FINAL_MARKERS: [char; 2] = ['✅', '🔰'];

/// Parse a raw message into round facts, or `None` when it carries no
/// round-number token.
pub fn parse_announcement(text: &str) -> Option<RoundFacts> {
    let round = extract_round_number(text)?;
    Some(RoundFacts {
        round,
        groups: extract_groups(text),
        finalized: is_finalized(text),
    })
}

/// First integer following the `#N` marker, case-insensitive
fn extract_round_number(text: &str) -> Option<u64> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i + 1 < chars.len() {
        if chars[i] == ROUND_MARKER && chars[i + 1].eq_ignore_ascii_case(&'n') {
            let mut j = i + 2;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            let start = j;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j > start {
                let digits: String = chars[start..j].iter().collect();
                if let Ok(n) = digits.parse() {
                    return Some(n);
                }
            }
        }
        i += 1;
    }
    None
}

/// Every maximal `( ... )` substring, in document order. Groups do not nest.
fn extract_groups(text: &str) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current: Option<String> = None;
    for c in text.chars() {
        match c {
            '(' => current = Some(String::new()),
            ')' => {
                if let Some(group) = current.take() {
                    groups.push(group);
                }
            }
            _ => {
                if let Some(group) = current.as_mut() {
                    group.push(c);
                }
            }
        }
    }
    groups
}

/// Finalized means a terminal marker is present and no in-progress marker
fn is_finalized(text: &str) -> bool {
    if text.contains(IN_PROGRESS_MARKER) {
        return false;
    }
    FINAL_MARKERS.iter().any(|m| text.contains(*m))
}
