//! ═══════════════════════════════════════════════════════════════════════════════
//! SUIT — Four-Symbol Alphabet, Aliases, Ranks
//! ═══════════════════════════════════════════════════════════════════════════════
//! The announcement stream spells the same logical suit several ways
//! (emoji-presentation variants, the red heart emoji). Everything downstream
//! works on one canonical glyph per suit, so normalization lives here and
//! nowhere else.
//! ═══════════════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four predictable outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spade,
    Heart,
    Diamond,
    Club,
}

/// All suits in canonical scan order
pub const ALL_SUITS: [Suit; 4] = [Suit::Heart, Suit::Spade, Suit::Diamond, Suit::Club];

impl Suit {
    /// Canonical single-char glyph
    pub fn glyph(&self) -> char {
        match self {
            Suit::Spade => '♠',
            Suit::Heart => '♥',
            Suit::Diamond => '♦',
            Suit::Club => '♣',
        }
    }

    /// Display glyph for outbound messages (emoji presentation)
    pub fn display(&self) -> &'static str {
        match self {
            Suit::Spade => "♠️",
            Suit::Heart => "❤️",
            Suit::Diamond => "♦️",
            Suit::Club => "♣️",
        }
    }

    /// Parse a canonical glyph (post-normalization)
    pub fn from_glyph(c: char) -> Option<Suit> {
        match c {
            '♠' => Some(Suit::Spade),
            '♥' => Some(Suit::Heart),
            '♦' => Some(Suit::Diamond),
            '♣' => Some(Suit::Club),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// Card rank as it appears in an evidence group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

/// Parity class of a rank, the input the extended transformation keys on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankParity {
    Odd,
    Even,
}

impl Rank {
    /// Parse a rank token ("A", "2".."10", "J", "Q", "K"), case-insensitive
    pub fn from_token(token: &str) -> Option<Rank> {
        match token.to_ascii_uppercase().as_str() {
            "A" | "1" => Some(Rank::Ace),
            "2" => Some(Rank::Two),
            "3" => Some(Rank::Three),
            "4" => Some(Rank::Four),
            "5" => Some(Rank::Five),
            "6" => Some(Rank::Six),
            "7" => Some(Rank::Seven),
            "8" => Some(Rank::Eight),
            "9" => Some(Rank::Nine),
            "10" => Some(Rank::Ten),
            "J" => Some(Rank::Jack),
            "Q" => Some(Rank::Queen),
            "K" => Some(Rank::King),
            _ => None,
        }
    }

    /// Odd: A/3/5/7/9/J/K. Even: 2/4/6/8/10/Q.
    pub fn parity(&self) -> RankParity {
        match self {
            Rank::Ace
            | Rank::Three
            | Rank::Five
            | Rank::Seven
            | Rank::Nine
            | Rank::Jack
            | Rank::King => RankParity::Odd,
            Rank::Two | Rank::Four | Rank::Six | Rank::Eight | Rank::Ten | Rank::Queen => {
                RankParity::Even
            }
        }
    }
}

/// First card observed in an evidence group: suit plus optional rank token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedCard {
    pub suit: Suit,
    pub rank: Option<Rank>,
}

impl ObservedCard {
    /// Rank parity with the fixed missing-rank policy applied.
    ///
    /// A group whose leading card carries no readable rank token is treated
    /// as odd. This is a documented product rule, not a parser guess: it
    /// materially changes predictions and is carried forward as-is.
    pub fn rank_parity(&self) -> RankParity {
        self.rank.map(|r| r.parity()).unwrap_or(RankParity::Odd)
    }
}

/// Collapse every surface alias to its canonical suit glyph.
///
/// Hearts have three spellings in the wild (❤️, ❤, ♥️); the black suits
/// each have an emoji-presentation variant.
pub fn normalize_suits(text: &str) -> String {
    text.replace("❤️", "♥")
        .replace('❤', "♥")
        .replace("♥️", "♥")
        .replace("♠️", "♠")
        .replace("♦️", "♦")
        .replace("♣️", "♣")
}

/// Leftmost canonical suit in document order, independent of alias spelling
pub fn first_suit_in(text: &str) -> Option<Suit> {
    normalize_suits(text).chars().find_map(Suit::from_glyph)
}

/// Leftmost card: suit plus the rank token immediately preceding the glyph
pub fn first_card_in(text: &str) -> Option<ObservedCard> {
    let normalized = normalize_suits(text);
    let mut token = String::new();
    for c in normalized.chars() {
        if let Some(suit) = Suit::from_glyph(c) {
            let rank = Rank::from_token(&token);
            return Some(ObservedCard { suit, rank });
        }
        if c.is_ascii_alphanumeric() {
            token.push(c);
        } else {
            token.clear();
        }
    }
    None
}

/// Alias-normalized membership test
pub fn contains_suit(text: &str, target: Suit) -> bool {
    normalize_suits(text).contains(target.glyph())
}

/// All suits present in a group, in canonical scan order
pub fn suits_in(text: &str) -> Vec<Suit> {
    let normalized = normalize_suits(text);
    ALL_SUITS
        .iter()
        .copied()
        .filter(|s| normalized.contains(s.glyph()))
        .collect()
}
