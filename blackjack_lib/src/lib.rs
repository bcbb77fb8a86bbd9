//! Card level primitives shared by the blackjack simulator: ranks, the deck, hand scoring,
//! round outcomes and the error type every game operation reports through.

pub mod advisor;
pub mod deck;
pub mod hand;

pub use advisor::{recommend_move, Action, Recommendation};
pub use deck::{create_deck, Deck, DECK_SIZE};
pub use hand::{hand_value, Hand, BLACKJACK};

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while playing a game of blackjack.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlackjackGameError {
    #[error("unknown strategy `{0}`, expected one of flat, martingale, random")]
    UnknownStrategy(String),
    #[error("deck underflow: needed {needed} card(s) but only {remaining} remain")]
    DeckUnderflow { needed: usize, remaining: usize },
    #[error("invalid card rank `{0}`")]
    InvalidRank(String),
}

/// The rank of a card. Suits never affect scoring so a card is fully described by its rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
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
    Ace,
}

impl Rank {
    /// All thirteen ranks in ascending order.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// The value the rank contributes to a hand before any soft ace adjustment, aces count 11.
    pub fn value(&self) -> u32 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
        }
    }

    pub fn is_ace(&self) -> bool {
        matches!(self, Rank::Ace)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Rank {
    type Err = BlackjackGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Rank::ALL
            .into_iter()
            .find(|rank| rank.symbol().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| BlackjackGameError::InvalidRank(s.to_string()))
    }
}

/// The result of a single round from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Display for Outcome {
    /// Outcomes are displayed upper cased, the way the round report prints them.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "WIN"),
            Outcome::Loss => write!(f, "LOSS"),
            Outcome::Tie => write!(f, "TIE"),
        }
    }
}
