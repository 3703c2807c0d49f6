//! ═══════════════════════════════════════════════════════════════════════════════
//! MESSAGE — Outbound Text Grammar
//! ═══════════════════════════════════════════════════════════════════════════════
//! `Game:{round}:{displaySymbol} statut :{statusToken}`
//!
//! The status token is the only part that changes over a prediction's life:
//! waiting, a numbered confirmation keyed by attempt index, or a refutation.
//! ═══════════════════════════════════════════════════════════════════════════════

use crate::suit::Suit;
use crate::verify::Resolution;

/// Waiting for the target round
pub const WAITING: &str = "🔮";

/// Window exhausted without a confirmation
pub const REFUTED: &str = "❌";

/// Numbered confirmation glyphs, one per attempt index 0..=10
const CONFIRMED: [&str; 11] = [
    "✅0️⃣", "✅1️⃣", "✅2️⃣", "✅3️⃣", "✅4️⃣", "✅5️⃣", "✅6️⃣", "✅7️⃣", "✅8️⃣", "✅9️⃣", "✅🔟",
];

/// Confirmation token for an attempt index. Indexes beyond the maximum
/// window width clamp to the last glyph; the verification engine never
/// produces them.
pub fn confirmation_token(attempt: u64) -> &'static str {
    let idx = (attempt as usize).min(CONFIRMED.len() - 1);
    CONFIRMED[idx]
}

/// Status token for a resolution
pub fn resolution_token(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::Confirmed { attempt } => confirmation_token(attempt),
        Resolution::Refuted => REFUTED,
    }
}

/// Render the outbound prediction message
pub fn render(target_round: u64, predicted: Suit, status: &str) -> String {
    format!(
        "Game:{}:{} statut :{}",
        target_round,
        predicted.display(),
        status
    )
}
