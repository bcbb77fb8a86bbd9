use anyhow::{Context, Result};
use blackjack_lib::recommend_move;
use blackjack_sim::strategy::StrategyKind;
use blackjack_sim::write::write_summary;
use blackjack_sim::{BlackjackSimulator, BlackjackSimulatorConfig, Hand, SimulationSummary};
use clap::Parser;
use std::str::FromStr;
use tracing::Level;

/// Play a number of rounds with one betting strategy, showing every hand as it is played.
#[derive(Parser, Debug)]
#[command(name = "play_n_rounds")]
struct Args {
    /// Number of rounds to play
    rounds: u32,

    /// Betting strategy (flat, martingale or random)
    #[arg(short, long, default_value = "flat")]
    strategy: String,

    /// Starting balance of the player
    #[arg(short, long, default_value_t = 500)]
    balance: i64,

    /// Base bet the strategy scales from
    #[arg(long, default_value_t = 10)]
    base_bet: u32,

    /// Seed for the random number generator
    #[arg(long)]
    seed: Option<u64>,

    /// Log level for diagnostics written to stderr
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let level = Level::from_str(&args.log_level)
        .with_context(|| format!("invalid log level `{}`", args.log_level))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let strategy: StrategyKind = args
        .strategy
        .parse()
        .with_context(|| format!("cannot play with strategy `{}`", args.strategy))?;
    let mut builder = BlackjackSimulatorConfig::new();
    builder
        .num_rounds(args.rounds)
        .starting_balance(args.balance)
        .base_bet(args.base_bet);
    if let Some(seed) = args.seed {
        builder.seed(seed);
    }
    let config = builder.build();

    let mut game = BlackjackSimulator::new(strategy, config).game()?;
    let mut summary = SimulationSummary::new(game.label(), config.starting_balance);

    for record in game.by_ref() {
        let record = record?;
        if record.reshuffled {
            println!("-- deck reshuffled --");
        }

        // Advice is given on the two card deal against the dealer's first card.
        let dealt = Hand::from(record.players_hand.cards()[..2].to_vec());
        let up_card = record.dealers_hand.cards()[0];
        println!("round {}: bet {}", record.round, record.bet);
        println!("players_hand: {}", record.players_hand);
        println!("dealers_hand: {}", record.dealers_hand);
        println!(
            "advice on {} against {}: {}",
            dealt,
            up_card,
            recommend_move(&dealt, up_card)
        );
        println!("result: {}, balance: {}", record.outcome, record.balance);
        println!();

        summary.record(&record);
    }
    summary.ended_early = game.ended_early;

    write_summary(&mut std::io::stdout().lock(), &summary)?;
    println!("cards left in deck: {}", game.cards_remaining());
    Ok(())
}
