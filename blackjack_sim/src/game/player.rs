use crate::game::strategy::{BettingState, BettingStrategy};
use blackjack_lib::Outcome;
use rand::RngCore;
use std::fmt::Display;

/// Struct for a simulated player: a bankroll, the result of the last round and the betting strategy in use.
pub struct PlayerSim {
    pub balance: i64,
    pub last_result: Option<Outcome>,
    base_bet: u32,
    strategy: Box<dyn BettingStrategy + Send>,
}

impl PlayerSim {
    /// Associated function to create a new `PlayerSim` struct.
    pub fn new(
        starting_balance: i64,
        base_bet: u32,
        strategy: Box<dyn BettingStrategy + Send>,
    ) -> PlayerSim {
        PlayerSim {
            balance: starting_balance,
            last_result: None,
            base_bet,
            strategy,
        }
    }

    /// Method for determining whether the player can keep playing, i.e. has money left.
    pub fn continue_play(&self) -> bool {
        self.balance > 0
    }

    /// Getter method for the players current balance.
    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Asks the betting strategy for the next bet.
    pub fn bet(&self, rng: &mut dyn RngCore) -> u32 {
        let state = BettingState::new(self.balance, self.base_bet, self.last_result);
        self.strategy.bet(state, rng)
    }

    /// Pays out or collects `bet` according to `outcome` and remembers the outcome for the next bet.
    pub fn settle(&mut self, outcome: Outcome, bet: u32) {
        match outcome {
            Outcome::Win => self.balance += i64::from(bet),
            Outcome::Loss => self.balance -= i64::from(bet),
            Outcome::Tie => {}
        }
        self.last_result = Some(outcome);
    }

    pub fn label(&self) -> String {
        self.strategy.label()
    }
}

impl Display for PlayerSim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last = match self.last_result {
            Some(outcome) => outcome.to_string(),
            None => "-".to_string(),
        };
        write!(
            f,
            "strategy: {}, balance: {}, last result: {}",
            self.label(),
            self.balance,
            last
        )
    }
}
