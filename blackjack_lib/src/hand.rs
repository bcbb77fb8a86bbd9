use crate::Rank;
use std::fmt::Display;

/// The best possible total, anything above it is a bust.
pub const BLACKJACK: u32 = 21;

/// Scores `hand` counting every ace as 11, then softens aces to 1 one at a time while the total busts.
/// The result may still exceed 21 once there are no aces left to soften.
pub fn hand_value(hand: &[Rank]) -> u32 {
    let mut value = 0;
    let mut aces = 0;
    for rank in hand {
        if rank.is_ace() {
            aces += 1;
        }
        value += rank.value();
    }

    while value > BLACKJACK && aces > 0 {
        value -= 10;
        aces -= 1;
    }
    value
}

/// The cards held by either the player or the dealer during a single round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Rank>,
}

impl Hand {
    pub fn new() -> Self {
        Hand { cards: Vec::new() }
    }

    pub fn receive_card(&mut self, card: Rank) {
        self.cards.push(card);
    }

    pub fn value(&self) -> u32 {
        hand_value(&self.cards)
    }

    pub fn is_bust(&self) -> bool {
        self.value() > BLACKJACK
    }

    /// True when the hand is exactly two cards totalling 21.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value() == BLACKJACK
    }

    pub fn cards(&self) -> &[Rank] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl From<Vec<Rank>> for Hand {
    fn from(cards: Vec<Rank>) -> Self {
        Hand { cards }
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cards = self
            .cards
            .iter()
            .map(Rank::to_string)
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "[{}] ({})", cards, self.value())
    }
}
