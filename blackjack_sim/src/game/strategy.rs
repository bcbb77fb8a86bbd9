//! Betting strategies. Each strategy turns the player's current bankroll, the table's base bet and the
//! result of the previous round into the bet for the next round.

use blackjack_lib::{BlackjackGameError, Outcome};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub mod prelude {
    pub use super::{
        BettingState, BettingStrategy, FlatBettingStrategy, MartingaleBettingStrategy,
        RandomBettingStrategy, StrategyKind,
    };
}

/// Everything a `BettingStrategy` may look at when deciding a bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BettingState {
    pub balance: i64,
    pub base_bet: u32,
    /// `None` before the first round has been played.
    pub last_result: Option<Outcome>,
}

impl BettingState {
    pub fn new(balance: i64, base_bet: u32, last_result: Option<Outcome>) -> BettingState {
        BettingState {
            balance,
            base_bet,
            last_result,
        }
    }
}

/// Trait for a betting strategy. The random number generator is only consumed by strategies that need one.
pub trait BettingStrategy {
    fn bet(&self, state: BettingState, rng: &mut dyn RngCore) -> u32;
    /// Human readable name, e.g. `Martingale`.
    fn label(&self) -> String;
}

/// Caps `bet` at the player's balance, a non positive balance caps the bet at zero.
fn clamp_to_balance(bet: u32, balance: i64) -> u32 {
    u32::try_from(balance.max(0)).map_or(bet, |balance| bet.min(balance))
}

/// Always bets the base bet. Note that the bet is not capped at the player's balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatBettingStrategy;

impl BettingStrategy for FlatBettingStrategy {
    fn bet(&self, state: BettingState, _rng: &mut dyn RngCore) -> u32 {
        state.base_bet
    }

    fn label(&self) -> String {
        StrategyKind::Flat.label()
    }
}

/// Bets twice the base bet right after a loss and the base bet otherwise. The doubled bet does not
/// compound over a losing streak.
#[derive(Debug, Clone, Copy, Default)]
pub struct MartingaleBettingStrategy;

impl BettingStrategy for MartingaleBettingStrategy {
    fn bet(&self, state: BettingState, _rng: &mut dyn RngCore) -> u32 {
        match state.last_result {
            Some(Outcome::Loss) => {
                clamp_to_balance(state.base_bet.saturating_mul(2), state.balance)
            }
            _ => state.base_bet,
        }
    }

    fn label(&self) -> String {
        StrategyKind::Martingale.label()
    }
}

/// Bets a uniformly random amount between one and three times the base bet inclusive, capped at the balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomBettingStrategy;

impl BettingStrategy for RandomBettingStrategy {
    fn bet(&self, state: BettingState, rng: &mut dyn RngCore) -> u32 {
        let upper = state.base_bet.saturating_mul(3);
        let bet = rng.gen_range(state.base_bet..=upper);
        clamp_to_balance(bet, state.balance)
    }

    fn label(&self) -> String {
        StrategyKind::Random.label()
    }
}

/// The closed set of betting strategies that can be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Flat,
    Martingale,
    Random,
}

impl StrategyKind {
    /// Every strategy, in the order they are compared by default.
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Flat,
        StrategyKind::Martingale,
        StrategyKind::Random,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Flat => "flat",
            StrategyKind::Martingale => "martingale",
            StrategyKind::Random => "random",
        }
    }

    /// The name with its first letter capitalized.
    pub fn label(&self) -> String {
        let mut chars = self.name().chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Returns the strategy object this kind dispatches to.
    pub fn strategy(&self) -> Box<dyn BettingStrategy + Send> {
        match self {
            StrategyKind::Flat => Box::new(FlatBettingStrategy),
            StrategyKind::Martingale => Box::new(MartingaleBettingStrategy),
            StrategyKind::Random => Box::new(RandomBettingStrategy),
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = BlackjackGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| BlackjackGameError::UnknownStrategy(s.to_string()))
    }
}
