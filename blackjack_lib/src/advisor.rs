//! A simple hit/stand advisor. The advice is based on the chance that the next card busts the hand,
//! weighed against the strength of the dealer's face up card when the chance is neither clearly low nor clearly high.

use crate::{Hand, Rank, BLACKJACK};
use serde::Serialize;
use std::fmt::Display;

const LOW_BUST_RISK: f64 = 40.0;
const HIGH_BUST_RISK: f64 = 60.0;
const STRONG_DEALER_CARD: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Hit,
    Stand,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Hit => write!(f, "Hit"),
            Action::Stand => write!(f, "Stand"),
        }
    }
}

/// Advice for how to play the current hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub action: Action,
    /// Confidence in the advice, 0 to 100.
    pub confidence: u32,
    /// Chance in percent that drawing one more card busts the hand.
    pub bust_probability: f64,
    pub reason: String,
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}% confidence, {:.1}% bust chance): {}",
            self.action, self.confidence, self.bust_probability, self.reason
        )
    }
}

/// Percentage of the thirteen ranks that would bust `total` if drawn next. An ace is counted as 1 when 11 would bust.
fn bust_probability(total: u32) -> f64 {
    let busts = Rank::ALL
        .iter()
        .filter(|rank| {
            let mut value = rank.value();
            if rank.is_ace() && total + value > BLACKJACK {
                value = 1;
            }
            total + value > BLACKJACK
        })
        .count();
    (busts as f64 / Rank::ALL.len() as f64) * 100.0
}

/// Recommends hitting or standing on `hand` given the dealer's face up card.
pub fn recommend_move(hand: &Hand, dealers_up_card: Rank) -> Recommendation {
    let bust_probability = bust_probability(hand.value());
    let dealer_value = dealers_up_card.value();

    let (action, confidence, reason) = if bust_probability <= LOW_BUST_RISK {
        (
            Action::Hit,
            (100.0 - bust_probability / 2.0).round() as u32,
            format!(
                "bust probability is low ({:.1}%), drawing another card is safe",
                bust_probability
            ),
        )
    } else if bust_probability >= HIGH_BUST_RISK {
        (
            Action::Stand,
            bust_probability.round() as u32,
            format!(
                "bust probability is high ({:.1}%), standing is safer",
                bust_probability
            ),
        )
    } else if dealer_value >= STRONG_DEALER_CARD {
        (
            Action::Hit,
            65,
            format!(
                "dealer shows a strong card ({}), a hit may be needed",
                dealers_up_card
            ),
        )
    } else {
        (
            Action::Stand,
            70,
            format!(
                "dealer shows a weak card ({}), standing may be better",
                dealers_up_card
            ),
        )
    };

    Recommendation {
        action,
        confidence,
        bust_probability,
        reason,
    }
}
