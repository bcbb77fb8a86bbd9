pub mod game;
pub mod stats;
pub mod write;

pub use game::prelude::*;
use game::strategy::StrategyKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;
use tracing::{error, info};

pub use stats::{FailedSimulation, SimulationSummary, StrategyComparison};

pub mod prelude {
    pub use super::{
        run_game, simulate, strategy::prelude::*, BlackjackSimulator, BlackjackSimulatorConfig,
        BlackjackSimulatorConfigBuilder, MulStrategyBlackjackSimulator,
        MulStrategyBlackjackSimulatorBuilder, SimulationError, SimulationSummary,
        StrategyComparison,
    };
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Game(#[from] BlackjackGameError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to write report")]
    Write(#[from] std::io::Error),
    #[error("failed to convert to or from JSON")]
    Serialize(#[from] serde_json::Error),
}

/// Plays every round of `game`, writing the round by round report to `writer` unless `silent` is set.
/// Returns the summary of the run, or the first error encountered.
pub fn run_game<R: Rng, W: Write>(
    game: &mut BlackjackGameSim<R>,
    silent: bool,
    writer: &mut W,
) -> Result<SimulationSummary, SimulationError> {
    let label = game.label();
    let mut summary = SimulationSummary::new(label.clone(), game.balance());
    info!(strategy = %label, balance = game.balance(), "starting simulation");

    for record in game.by_ref() {
        let record = record?;
        summary.record(&record);
        if !silent {
            write::write_round(writer, &record)?;
            if record.bankrupt() {
                write::write_depletion(writer)?;
            }
        }
    }

    summary.ended_early = game.ended_early;
    if !silent {
        write::write_final_balance(writer, &label, summary.final_balance)?;
    }
    info!(
        strategy = %label,
        rounds = summary.rounds,
        final_balance = summary.final_balance,
        "simulation finished"
    );
    Ok(summary)
}

/// Runs a single simulation for the strategy called `strategy_name` (one of flat, martingale or random).
/// An unknown name fails before any round is played.
pub fn simulate<W: Write>(
    strategy_name: &str,
    config: BlackjackSimulatorConfig,
    writer: &mut W,
) -> Result<SimulationSummary, SimulationError> {
    let kind: StrategyKind = strategy_name.parse()?;
    BlackjackSimulator::new(kind, config).run(writer)
}

/// Struct for running a simulation of a single betting strategy with a given configuration.
/// Every call to `run` plays a fresh game with its own deck, balance and random number generator.
#[derive(Debug, Clone, Copy)]
pub struct BlackjackSimulator {
    strategy: StrategyKind,
    config: BlackjackSimulatorConfig,
}

impl BlackjackSimulator {
    pub fn new(strategy: StrategyKind, config: BlackjackSimulatorConfig) -> Self {
        BlackjackSimulator { strategy, config }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Builds the game described by the configuration, seeding the random number generator from the
    /// configured seed or from the operating system.
    pub fn game(&self) -> Result<BlackjackGameSim<StdRng>, SimulationError> {
        self.config.validate()?;
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let player = PlayerSim::new(
            self.config.starting_balance,
            self.config.base_bet,
            self.strategy.strategy(),
        );
        Ok(BlackjackGameSim::new(
            player,
            self.config.num_rounds,
            self.config.reshuffle_threshold,
            rng,
        ))
    }

    /// Method that will run the simulation, writing the report to `writer` and returning its summary.
    /// With `stats` set the statistics table follows the final balance line.
    pub fn run<W: Write>(&self, writer: &mut W) -> Result<SimulationSummary, SimulationError> {
        let mut game = self.game()?;
        let summary = run_game(&mut game, self.config.silent, writer)?;
        if self.config.stats && !self.config.silent {
            write::write_summary(writer, &summary)?;
        }
        Ok(summary)
    }
}

/// This struct is for comparing multiple strategies under one configuration. Strategies are simulated one after
/// another and share nothing but the configuration.
pub struct MulStrategyBlackjackSimulator {
    strategies: Vec<String>,
    pub config: BlackjackSimulatorConfig,
}

impl MulStrategyBlackjackSimulator {
    /// Method that returns a new `MulStrategyBlackjackSimulatorBuilder` object.
    pub fn new(config: BlackjackSimulatorConfig) -> MulStrategyBlackjackSimulatorBuilder {
        MulStrategyBlackjackSimulatorBuilder {
            strategies: None,
            config,
        }
    }

    /// Runs each configured strategy in order. A strategy whose simulation fails, e.g. because its name is unknown,
    /// is recorded as a failure and the remaining strategies still run. Writing errors and an invalid
    /// configuration abort the whole comparison.
    pub fn run<W: Write>(&mut self, writer: &mut W) -> Result<StrategyComparison, SimulationError> {
        self.config.validate()?;
        let mut comparison = StrategyComparison::new(self.config);
        for name in self.strategies.iter() {
            match simulate(name, self.config, writer) {
                Ok(summary) => comparison.summaries.push(summary),
                Err(SimulationError::Game(e)) => {
                    error!(strategy = %name, error = %e, "simulation failed");
                    comparison.failures.push(FailedSimulation {
                        strategy: name.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(comparison)
    }
}

/// Struct for building a `MulStrategyBlackjackSimulator` object
pub struct MulStrategyBlackjackSimulatorBuilder {
    strategies: Option<Vec<String>>,
    config: BlackjackSimulatorConfig,
}

impl MulStrategyBlackjackSimulatorBuilder {
    /// Method for adding a strategy, by name, to the simulations that will be run.
    pub fn simulation(&mut self, strategy: impl Into<String>) -> &mut Self {
        self.strategies
            .get_or_insert_with(Vec::new)
            .push(strategy.into());
        self
    }

    /// Method that builds a `MulStrategyBlackjackSimulator` object, with no strategies added every strategy is compared.
    pub fn build(&mut self) -> MulStrategyBlackjackSimulator {
        let strategies = self.strategies.take().unwrap_or_else(|| {
            StrategyKind::ALL
                .iter()
                .map(|kind| kind.name().to_string())
                .collect()
        });
        MulStrategyBlackjackSimulator {
            strategies,
            config: self.config,
        }
    }
}

/// Struct for configuring a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackjackSimulatorConfig {
    pub num_rounds: u32,
    pub starting_balance: i64,
    pub base_bet: u32,
    /// The deck is rebuilt before a round whenever fewer cards than this remain.
    pub reshuffle_threshold: usize,
    pub seed: Option<u64>,
    pub silent: bool,
    /// Write a statistics table after each run's report.
    pub stats: bool,
}

impl BlackjackSimulatorConfig {
    /// Associated method for returning a new `BlackjackSimulatorConfigBuilder` object. Allows the user to choose
    /// the parameters of the simulation such as the number of rounds, the starting balance and the base bet.
    pub fn new() -> BlackjackSimulatorConfigBuilder {
        BlackjackSimulatorConfigBuilder {
            num_rounds: None,
            starting_balance: None,
            base_bet: None,
            reshuffle_threshold: None,
            seed: None,
            silent: None,
            stats: None,
        }
    }

    /// Parses a configuration from JSON, fields left out keep their defaults.
    pub fn from_json(raw: &str) -> Result<BlackjackSimulatorConfig, SimulationError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.starting_balance <= 0 {
            return Err(SimulationError::InvalidConfig(format!(
                "starting balance must be positive, got {}",
                self.starting_balance
            )));
        }
        if self.base_bet == 0 {
            return Err(SimulationError::InvalidConfig(
                "base bet must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BlackjackSimulatorConfig {
    fn default() -> Self {
        BlackjackSimulatorConfig::new().build()
    }
}

/// Struct to implement builder pattern for `BlackjackSimulatorConfig`
#[derive(Clone, Copy)]
pub struct BlackjackSimulatorConfigBuilder {
    num_rounds: Option<u32>,
    starting_balance: Option<i64>,
    base_bet: Option<u32>,
    reshuffle_threshold: Option<usize>,
    seed: Option<u64>,
    silent: Option<bool>,
    stats: Option<bool>,
}

impl BlackjackSimulatorConfigBuilder {
    /// Method for setting the maximum number of rounds played in a simulation.
    pub fn num_rounds(&mut self, rounds: u32) -> &mut Self {
        self.num_rounds = Some(rounds);
        self
    }

    /// Method for changing the starting balance of the player.
    pub fn starting_balance(&mut self, balance: i64) -> &mut Self {
        self.starting_balance = Some(balance);
        self
    }

    pub fn base_bet(&mut self, bet: u32) -> &mut Self {
        self.base_bet = Some(bet);
        self
    }

    pub fn reshuffle_threshold(&mut self, cards: usize) -> &mut Self {
        self.reshuffle_threshold = Some(cards);
        self
    }

    /// Method for fixing the seed of the random number generator, making runs reproducible.
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Method for setting a flag, if set to true the round by round report is not written.
    pub fn silent(&mut self, silent: bool) -> &mut Self {
        self.silent = Some(silent);
        self
    }

    /// Method for setting a flag, if set to true a statistics table is written after each run.
    pub fn stats(&mut self, stats: bool) -> &mut Self {
        self.stats = Some(stats);
        self
    }

    /// Method for building a `BlackjackSimulatorConfig` object from the given `BlackjackSimulatorConfigBuilder` object.
    pub fn build(&mut self) -> BlackjackSimulatorConfig {
        self.build_over(BlackjackSimulatorConfig {
            num_rounds: 50,
            starting_balance: 500,
            base_bet: 10,
            reshuffle_threshold: 15,
            seed: None,
            silent: false,
            stats: false,
        })
    }

    /// Builds a configuration where every field set on the builder overrides the one in `base`.
    pub fn build_over(&mut self, base: BlackjackSimulatorConfig) -> BlackjackSimulatorConfig {
        BlackjackSimulatorConfig {
            num_rounds: self.num_rounds.unwrap_or(base.num_rounds),
            starting_balance: self.starting_balance.unwrap_or(base.starting_balance),
            base_bet: self.base_bet.unwrap_or(base.base_bet),
            reshuffle_threshold: self.reshuffle_threshold.unwrap_or(base.reshuffle_threshold),
            seed: self.seed.or(base.seed),
            silent: self.silent.unwrap_or(base.silent),
            stats: self.stats.unwrap_or(base.stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack_lib::Rank::*;

    fn report(buf: Vec<u8>) -> Vec<String> {
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn default_config() {
        let config = BlackjackSimulatorConfig::default();
        assert_eq!(config.num_rounds, 50);
        assert_eq!(config.starting_balance, 500);
        assert_eq!(config.base_bet, 10);
        assert_eq!(config.reshuffle_threshold, 15);
        assert_eq!(config.seed, None);
        assert!(!config.silent);
        assert!(!config.stats);
    }

    #[test]
    fn builder_settings_override_a_json_config() {
        let base = BlackjackSimulatorConfig::from_json(
            r#"{"num_rounds": 80, "base_bet": 25, "seed": 9, "stats": true}"#,
        )
        .unwrap();
        let config = BlackjackSimulatorConfig::new()
            .num_rounds(5)
            .starting_balance(1000)
            .build_over(base);

        assert_eq!(config.num_rounds, 5);
        assert_eq!(config.starting_balance, 1000);
        assert_eq!(config.base_bet, 25);
        assert_eq!(config.seed, Some(9));
        assert!(config.stats);
        assert_eq!(config.reshuffle_threshold, 15);

        assert!(matches!(
            BlackjackSimulatorConfig::from_json("{\"num_rounds\": -1}"),
            Err(SimulationError::Serialize(_))
        ));
    }

    #[test]
    fn io_errors_are_reported_once() {
        use std::error::Error;

        struct BrokenPipe;

        impl Write for BrokenPipe {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let config = BlackjackSimulatorConfig::new().seed(1).build();
        let err = simulate("flat", config, &mut BrokenPipe).unwrap_err();
        assert!(matches!(err, SimulationError::Write(_)));
        assert_eq!(err.to_string(), "failed to write report");
        assert_eq!(err.source().unwrap().to_string(), "pipe closed");
    }

    #[test]
    fn stats_table_follows_each_run() {
        let config = BlackjackSimulatorConfig::new()
            .seed(5)
            .num_rounds(3)
            .starting_balance(1000)
            .stats(true)
            .build();
        let mut buf = Vec::new();
        MulStrategyBlackjackSimulator::new(config)
            .simulation("flat")
            .simulation("random")
            .build()
            .run(&mut buf)
            .unwrap();

        let lines = report(buf);
        let finals: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.starts_with("Final Balance with"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(finals.len(), 2);
        assert_eq!(lines[finals[0] + 3], "strategy: Flat");
        assert_eq!(lines[finals[1] + 3], "strategy: Random");
        assert!(finals[0] + 3 < finals[1]);
    }

    #[test]
    fn config_from_partial_json() {
        let config: BlackjackSimulatorConfig =
            serde_json::from_str(r#"{"num_rounds": 10, "seed": 4}"#).unwrap();
        assert_eq!(
            config,
            BlackjackSimulatorConfig::new().num_rounds(10).seed(4).build()
        );
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let config = BlackjackSimulatorConfig::new().starting_balance(0).build();
        assert!(matches!(
            simulate("flat", config, &mut std::io::sink()),
            Err(SimulationError::InvalidConfig(_))
        ));
        let config = BlackjackSimulatorConfig::new().base_bet(0).build();
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn unknown_strategy_fails_before_playing() {
        let mut buf = Vec::new();
        let result = simulate("kelly", BlackjackSimulatorConfig::default(), &mut buf);
        assert!(matches!(
            result,
            Err(SimulationError::Game(BlackjackGameError::UnknownStrategy(ref name))) if name == "kelly"
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn forced_bust_end_to_end() {
        let config = BlackjackSimulatorConfig::new().num_rounds(1).build();
        let mut cards = vec![Two; 20];
        cards.extend([King, Seven, Six, Ten, Ten]);
        let player = PlayerSim::new(
            config.starting_balance,
            config.base_bet,
            StrategyKind::Flat.strategy(),
        );
        let mut game = BlackjackGameSim::with_deck(
            player,
            Deck::from_cards(cards),
            config.num_rounds,
            config.reshuffle_threshold,
            StdRng::seed_from_u64(0),
        );

        let mut buf = Vec::new();
        let summary = run_game(&mut game, false, &mut buf).unwrap();
        assert_eq!(summary.final_balance, 490);
        assert!(!summary.ended_early);

        let lines = report(buf);
        let non_empty: Vec<&String> = lines.iter().filter(|l| !l.is_empty()).collect();
        assert_eq!(
            non_empty,
            vec![
                "Round 1: LOSS | Bet = 10 | Balance = 490",
                "Final Balance with Flat Strategy: 490",
            ]
        );
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        for name in ["flat", "martingale", "random"] {
            let config = BlackjackSimulatorConfig::new().seed(2024).build();
            let mut first = Vec::new();
            let mut second = Vec::new();
            let a = simulate(name, config, &mut first).unwrap();
            let b = simulate(name, config, &mut second).unwrap();
            assert_eq!(a, b);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn report_matches_summary() {
        let config = BlackjackSimulatorConfig::new().seed(7).build();
        let mut buf = Vec::new();
        let summary = simulate("martingale", config, &mut buf).unwrap();
        let lines = report(buf);

        let rounds: Vec<&String> = lines.iter().filter(|l| l.starts_with("Round ")).collect();
        assert_eq!(rounds.len() as u32, summary.rounds);
        assert_eq!(
            lines.iter().any(|l| l == write::DEPLETION_NOTICE),
            summary.ended_early
        );
        let last = lines.iter().rev().find(|l| !l.is_empty()).unwrap();
        assert_eq!(
            last.as_str(),
            format!("Final Balance with Martingale Strategy: {}", summary.final_balance)
        );
    }

    #[test]
    fn depleted_bankroll_writes_notice() {
        // Two chips against a ten chip flat bet: the first loss at that balance ends the run.
        let config = BlackjackSimulatorConfig::new()
            .starting_balance(2)
            .num_rounds(10_000)
            .seed(1)
            .build();
        let mut buf = Vec::new();
        let summary = simulate("flat", config, &mut buf).unwrap();
        assert!(summary.ended_early);
        assert!(summary.final_balance <= 0);

        let lines = report(buf);
        let notice = lines
            .iter()
            .position(|l| l == write::DEPLETION_NOTICE)
            .unwrap();
        assert!(lines[notice - 1].starts_with(&format!("Round {}:", summary.rounds)));
        assert_eq!(lines[notice + 1], "");
        assert!(lines[notice + 2].starts_with("Final Balance with Flat Strategy: "));
    }

    #[test]
    fn silent_runs_write_nothing() {
        let config = BlackjackSimulatorConfig::new().seed(3).silent(true).build();
        let mut buf = Vec::new();
        let summary = simulate("random", config, &mut buf).unwrap();
        assert!(buf.is_empty());
        assert!(summary.rounds > 0);
    }

    #[test]
    fn comparison_runs_every_strategy_in_order() {
        let config = BlackjackSimulatorConfig::new().seed(11).silent(true).build();
        let comparison = MulStrategyBlackjackSimulator::new(config)
            .build()
            .run(&mut std::io::sink())
            .unwrap();
        let labels: Vec<&str> = comparison
            .summaries
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Flat", "Martingale", "Random"]);
        assert!(comparison.failures.is_empty());
    }

    #[test]
    fn comparison_keeps_going_past_unknown_strategies() {
        let config = BlackjackSimulatorConfig::new().seed(11).build();
        let mut buf = Vec::new();
        let comparison = MulStrategyBlackjackSimulator::new(config)
            .simulation("flat")
            .simulation("kelly")
            .simulation("random")
            .build()
            .run(&mut buf)
            .unwrap();
        assert_eq!(comparison.summaries.len(), 2);
        assert_eq!(comparison.failures.len(), 1);
        assert_eq!(comparison.failures[0].strategy, "kelly");

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Final Balance with Flat Strategy: "));
        assert!(text.contains("Final Balance with Random Strategy: "));
    }
}
