use crate::{BlackjackGameError, Rank};
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of cards in a freshly built deck.
pub const DECK_SIZE: usize = 52;

const COPIES_PER_RANK: usize = 4;

/// A single 52 card deck of ranks. Cards are drawn from the end of the underlying vector,
/// i.e. the last element is the top of the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Rank>,
}

impl Deck {
    /// Associated function that builds four copies of every rank and shuffles them uniformly with `rng`.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Deck {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for _ in 0..COPIES_PER_RANK {
            cards.extend_from_slice(&Rank::ALL);
        }
        cards.shuffle(rng);
        Deck { cards }
    }

    /// Builds a deck with a fixed ordering, the last card of `cards` is drawn first.
    pub fn from_cards(cards: Vec<Rank>) -> Deck {
        Deck { cards }
    }

    /// Removes the top card of the deck.
    pub fn draw(&mut self) -> Result<Rank, BlackjackGameError> {
        self.cards.pop().ok_or(BlackjackGameError::DeckUnderflow {
            needed: 1,
            remaining: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The remaining cards, bottom first.
    pub fn cards(&self) -> &[Rank] {
        &self.cards
    }
}

/// Convenience wrapper around [`Deck::new`].
pub fn create_deck<R: Rng + ?Sized>(rng: &mut R) -> Deck {
    Deck::new(rng)
}
