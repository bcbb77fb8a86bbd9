//! Module that focuses on the simulation of a single run of blackjack for one betting strategy. A run is exposed
//! as an iterator of `RoundRecord`s so the rounds can be consumed, reported or collected lazily.

pub mod player;
pub mod strategy;
pub mod table;
pub mod prelude {
    pub use super::{BlackjackGameSim, RoundRecord};
    pub use crate::game::player::PlayerSim;
    pub use crate::game::strategy;
    pub use crate::game::table::{play_round, RoundResult, HIT_THRESHOLD};
    pub use blackjack_lib::{BlackjackGameError, Deck, Hand, Outcome, Rank};
}

pub use prelude::*;
use rand::Rng;
use tracing::{debug, warn};

/// The state of the game after a single round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    /// One based round number.
    pub round: u32,
    pub outcome: Outcome,
    pub bet: u32,
    /// The player's balance after the round was settled.
    pub balance: i64,
    pub player_total: u32,
    pub dealer_total: u32,
    /// Whether the player was dealt a two card 21.
    pub natural: bool,
    /// Whether the deck was rebuilt before this round.
    pub reshuffled: bool,
    pub players_hand: Hand,
    pub dealers_hand: Hand,
}

impl RoundRecord {
    /// True when the player has nothing left to bet with.
    pub fn bankrupt(&self) -> bool {
        self.balance <= 0
    }
}

/// Struct that simulates a run of blackjack rounds for one player. Owns the deck, the player and the random number generator.
/// Iterating yields one `RoundRecord` per round and stops after `num_rounds` rounds, after the round that leaves the
/// player with a balance of zero or less, or after the first error.
pub struct BlackjackGameSim<R: Rng> {
    deck: Deck,
    player: PlayerSim,
    rng: R,
    num_rounds: u32,
    reshuffle_threshold: usize,
    round: u32,
    finished: bool,
    pub ended_early: bool,
}

impl<R: Rng> BlackjackGameSim<R> {
    /// Associated method for building a new game, the first deck is shuffled with `rng`.
    pub fn new(
        player: PlayerSim,
        num_rounds: u32,
        reshuffle_threshold: usize,
        mut rng: R,
    ) -> BlackjackGameSim<R> {
        let deck = Deck::new(&mut rng);
        BlackjackGameSim::with_deck(player, deck, num_rounds, reshuffle_threshold, rng)
    }

    /// Builds a game that starts from a given `deck`. Decks built on reshuffle still come from `rng`.
    pub fn with_deck(
        player: PlayerSim,
        deck: Deck,
        num_rounds: u32,
        reshuffle_threshold: usize,
        rng: R,
    ) -> BlackjackGameSim<R> {
        BlackjackGameSim {
            deck,
            player,
            rng,
            num_rounds,
            reshuffle_threshold,
            round: 0,
            finished: false,
            ended_early: false,
        }
    }

    pub fn balance(&self) -> i64 {
        self.player.balance()
    }

    pub fn label(&self) -> String {
        self.player.label()
    }

    pub fn rounds_played(&self) -> u32 {
        self.round
    }

    pub fn cards_remaining(&self) -> usize {
        self.deck.len()
    }

    fn play_next_round(&mut self) -> Result<RoundRecord, BlackjackGameError> {
        self.round += 1;

        let reshuffled = self.deck.len() < self.reshuffle_threshold;
        if reshuffled {
            debug!(
                round = self.round,
                remaining = self.deck.len(),
                "deck running low, reshuffling"
            );
            self.deck = Deck::new(&mut self.rng);
        }

        let bet = self.player.bet(&mut self.rng);
        let result = play_round(&mut self.deck)?;
        self.player.settle(result.outcome, bet);

        Ok(RoundRecord {
            round: self.round,
            outcome: result.outcome,
            bet,
            balance: self.player.balance(),
            player_total: result.player_total(),
            dealer_total: result.dealer_total(),
            natural: result.natural(),
            reshuffled,
            players_hand: result.players_hand,
            dealers_hand: result.dealers_hand,
        })
    }
}

impl<R: Rng> Iterator for BlackjackGameSim<R> {
    type Item = Result<RoundRecord, BlackjackGameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.round >= self.num_rounds {
            return None;
        }

        match self.play_next_round() {
            Ok(record) => {
                if record.bankrupt() {
                    warn!(
                        strategy = %self.player.label(),
                        round = record.round,
                        balance = record.balance,
                        "player ran out of money"
                    );
                    self.finished = true;
                    self.ended_early = true;
                }
                Some(Ok(record))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::strategy::StrategyKind;
    use rand::rngs::StdRng;
    use blackjack_lib::Rank::*;
    use rand::SeedableRng;

    fn game(kind: StrategyKind, balance: i64, rounds: u32, seed: u64) -> BlackjackGameSim<StdRng> {
        let player = PlayerSim::new(balance, 10, kind.strategy());
        BlackjackGameSim::new(player, rounds, 15, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn plays_the_requested_number_of_rounds() {
        let records: Vec<RoundRecord> = game(StrategyKind::Flat, 1_000_000, 50, 1)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 50);
        assert!(records.iter().enumerate().all(|(i, r)| r.round == i as u32 + 1));
    }

    #[test]
    fn balance_follows_outcomes() {
        let mut balance = 500;
        for record in game(StrategyKind::Random, 500, 50, 2) {
            let record = record.unwrap();
            match record.outcome {
                Outcome::Win => balance += i64::from(record.bet),
                Outcome::Loss => balance -= i64::from(record.bet),
                Outcome::Tie => {}
            }
            assert_eq!(record.balance, balance);
        }
    }

    #[test]
    fn same_seed_same_run() {
        for kind in StrategyKind::ALL {
            let first: Vec<_> = game(kind, 500, 50, 99).collect();
            let second: Vec<_> = game(kind, 500, 50, 99).collect();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn stops_once_the_player_is_broke() {
        // A balance of one with flat bets of ten is gone after the first loss at that balance.
        for seed in 0..10 {
            let mut sim = game(StrategyKind::Flat, 1, 10_000, seed);
            let records: Vec<RoundRecord> = sim.by_ref().map(Result::unwrap).collect();
            let last = records.last().unwrap();
            assert!(last.bankrupt());
            assert_eq!(last.outcome, Outcome::Loss);
            assert!(records[..records.len() - 1].iter().all(|r| !r.bankrupt()));
            assert!(sim.ended_early);
            assert!(sim.next().is_none());
        }
    }

    #[test]
    fn deck_is_rebuilt_below_the_threshold() {
        let mut sim = game(StrategyKind::Flat, 1_000_000, 300, 5);
        let mut reshuffles = 0;
        for record in sim.by_ref() {
            if record.unwrap().reshuffled {
                reshuffles += 1;
            }
        }
        assert!(reshuffles > 0);
        assert_eq!(sim.rounds_played(), 300);
    }

    #[test]
    fn short_deck_is_replaced_by_a_full_one() {
        let player = PlayerSim::new(500, 10, StrategyKind::Flat.strategy());
        let mut sim = BlackjackGameSim::with_deck(
            player,
            Deck::from_cards(vec![Ace; 10]),
            1,
            15,
            StdRng::seed_from_u64(3),
        );

        let record = sim.next().unwrap().unwrap();
        assert!(record.reshuffled);
        let dealt = record.players_hand.len() + record.dealers_hand.len();
        assert_eq!(sim.cards_remaining(), blackjack_lib::deck::DECK_SIZE - dealt);
    }

    #[test]
    fn fixed_deck_forces_a_bust() {
        // Player 10 6 then K busts, dealer holds 10 7. Filler keeps the deck above the reshuffle threshold.
        let mut cards = vec![Two; 20];
        cards.extend([King, Seven, Six, Ten, Ten]);
        let player = PlayerSim::new(500, 10, StrategyKind::Flat.strategy());
        let mut sim = BlackjackGameSim::with_deck(
            player,
            Deck::from_cards(cards),
            1,
            15,
            StdRng::seed_from_u64(0),
        );

        let record = sim.next().unwrap().unwrap();
        assert_eq!(record.outcome, Outcome::Loss);
        assert_eq!(record.player_total, 26);
        assert_eq!(record.dealer_total, 17);
        assert_eq!(record.balance, 490);
        assert!(!record.reshuffled);
        assert!(sim.next().is_none());
    }

    #[test]
    fn underflow_ends_the_run() {
        let player = PlayerSim::new(500, 10, StrategyKind::Flat.strategy());
        // Threshold zero never reshuffles, so three cards cannot cover a deal.
        let mut sim = BlackjackGameSim::with_deck(
            player,
            Deck::from_cards(vec![Ten, Ten, Ten]),
            5,
            0,
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(
            sim.next(),
            Some(Err(BlackjackGameError::DeckUnderflow { .. }))
        ));
        assert!(sim.next().is_none());
    }
}
