use crate::game::RoundRecord;
use crate::{BlackjackSimulatorConfig, SimulationError};
use blackjack_lib::Outcome;
use serde::Serialize;
use std::fmt::Display;

/// Simple struct for recording all of the interesting data points accumulated during a simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub label: String,
    pub rounds: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub naturals: u32,
    pub reshuffles: u32,
    pub starting_balance: i64,
    pub final_balance: i64,
    pub ended_early: bool,
    /// The balance after each round, in order.
    pub balance_history: Vec<i64>,
}

impl SimulationSummary {
    pub fn new(label: String, starting_balance: i64) -> SimulationSummary {
        SimulationSummary {
            label,
            rounds: 0,
            wins: 0,
            losses: 0,
            ties: 0,
            naturals: 0,
            reshuffles: 0,
            starting_balance,
            final_balance: starting_balance,
            ended_early: false,
            balance_history: vec![],
        }
    }

    /// Folds a single round into the summary.
    pub fn record(&mut self, record: &RoundRecord) {
        self.rounds += 1;
        match record.outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
        if record.natural {
            self.naturals += 1;
        }
        if record.reshuffled {
            self.reshuffles += 1;
        }
        self.final_balance = record.balance;
        self.balance_history.push(record.balance);
    }

    fn rate(&self, count: u32) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            f64::from(count) / f64::from(self.rounds)
        }
    }

    pub fn win_pct(&self) -> f64 {
        self.rate(self.wins)
    }

    pub fn loss_pct(&self) -> f64 {
        self.rate(self.losses)
    }

    pub fn tie_pct(&self) -> f64 {
        self.rate(self.ties)
    }

    pub fn net_winnings(&self) -> i64 {
        self.final_balance - self.starting_balance
    }

    pub fn average_winnings_per_round(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.net_winnings() as f64 / f64::from(self.rounds)
        }
    }

    /// Lowest balance reached during the run, the starting balance if no round was played.
    pub fn lowest_balance(&self) -> i64 {
        self.balance_history
            .iter()
            .copied()
            .min()
            .map_or(self.starting_balance, |low| low.min(self.starting_balance))
    }
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "average winnings per round".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let body = format!(
            "{}{}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n",
            "strategy: ",
            self.label,
            "rounds played",
            self.rounds,
            "rounds won",
            self.wins,
            "rounds tied",
            self.ties,
            "rounds lost",
            self.losses,
            "player naturals",
            self.naturals,
            "reshuffles",
            self.reshuffles,
            "final balance",
            self.final_balance,
            "lowest balance",
            self.lowest_balance(),
            "ended early",
            self.ended_early,
            "win percentage",
            self.win_pct(),
            "tie percentage",
            self.tie_pct(),
            "loss percentage",
            self.loss_pct(),
            "average winnings per round",
            self.average_winnings_per_round()
        );
        write!(f, "{}", body)
    }
}

/// A failed simulation within a comparison, kept so the remaining strategies can still be reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSimulation {
    pub strategy: String,
    pub error: String,
}

/// The summaries of several strategies simulated under the same configuration.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyComparison {
    pub config: BlackjackSimulatorConfig,
    pub summaries: Vec<SimulationSummary>,
    pub failures: Vec<FailedSimulation>,
}

impl StrategyComparison {
    pub fn new(config: BlackjackSimulatorConfig) -> StrategyComparison {
        StrategyComparison {
            config,
            summaries: vec![],
            failures: vec![],
        }
    }

    /// The summary that finished with the highest balance, the earliest one wins a tie.
    pub fn leader(&self) -> Option<&SimulationSummary> {
        self.summaries
            .iter()
            .rev()
            .max_by_key(|summary| summary.final_balance)
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
