use anyhow::{bail, Context, Result};
use blackjack_sim::write::write_standings;
use blackjack_sim::{BlackjackSimulatorConfig, MulStrategyBlackjackSimulator};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// Compare betting strategies over simulated rounds of blackjack.
#[derive(Parser, Debug)]
#[command(name = "blackjack_sim")]
struct Args {
    /// Betting strategy to simulate (flat, martingale or random). May be repeated, defaults to all three.
    #[arg(short, long = "strategy")]
    strategies: Vec<String>,

    /// Maximum number of rounds per simulation
    #[arg(short = 'n', long)]
    rounds: Option<u32>,

    /// Starting balance of the player
    #[arg(short, long)]
    balance: Option<i64>,

    /// Base bet the strategies scale from
    #[arg(long)]
    base_bet: Option<u32>,

    /// Remaining card count below which the deck is rebuilt
    #[arg(long)]
    reshuffle_threshold: Option<usize>,

    /// Seed for the random number generator, runs are reproducible when set
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file holding a simulator configuration, flags given on the command line take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a statistics table after each simulation, then the standings
    #[arg(long)]
    stats: bool,

    /// Print the comparison as JSON instead of the round by round report
    #[arg(long)]
    json: bool,

    /// Log level for diagnostics written to stderr
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("blackjack_sim failed: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let level = Level::from_str(&args.log_level)
        .with_context(|| format!("invalid log level `{}`", args.log_level))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config = load_config(&args)?;
    let mut builder = MulStrategyBlackjackSimulator::new(config);
    for strategy in args.strategies.iter() {
        builder.simulation(strategy.as_str());
    }
    let mut simulator = builder.build();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let comparison = simulator.run(&mut out)?;

    if args.json {
        writeln!(out, "{}", comparison.to_json()?)?;
    } else if args.stats {
        write_standings(&mut out, &comparison)?;
    }
    out.flush()?;

    if let Some(failure) = comparison.failures.first() {
        bail!(
            "{} of {} simulation(s) failed, first `{}`: {}",
            comparison.failures.len(),
            comparison.failures.len() + comparison.summaries.len(),
            failure.strategy,
            failure.error
        );
    }
    Ok(())
}

/// Starts from the configuration file when one is given, or the defaults, then applies the command line flags.
fn load_config(args: &Args) -> Result<BlackjackSimulatorConfig> {
    let base = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("could not read config file {}", path.display()))?;
            BlackjackSimulatorConfig::from_json(&raw)
                .with_context(|| format!("could not parse config file {}", path.display()))?
        }
        None => BlackjackSimulatorConfig::default(),
    };

    let mut builder = BlackjackSimulatorConfig::new();
    if let Some(rounds) = args.rounds {
        builder.num_rounds(rounds);
    }
    if let Some(balance) = args.balance {
        builder.starting_balance(balance);
    }
    if let Some(base_bet) = args.base_bet {
        builder.base_bet(base_bet);
    }
    if let Some(threshold) = args.reshuffle_threshold {
        builder.reshuffle_threshold(threshold);
    }
    if let Some(seed) = args.seed {
        builder.seed(seed);
    }
    if args.stats {
        builder.stats(true);
    }
    if args.json {
        builder.silent(true);
    }

    let config = builder.build_over(base);
    config.validate()?;
    Ok(config)
}
