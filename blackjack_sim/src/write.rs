//! Text reporting for simulations. Every function writes to an arbitrary writer so the report can go to stdout,
//! a file or a buffer.

use crate::game::RoundRecord;
use crate::stats::{StrategyComparison, SimulationSummary};
use std::io::{self, Write};

/// Printed once when a run ends because the player ran out of money.
pub const DEPLETION_NOTICE: &str = "💸 You ran out of money!";

const WIDTH: usize = 80;

/// Writes the progress line for a single round, e.g. `Round 3: WIN | Bet = 10 | Balance = 510`.
pub fn write_round(writer: &mut impl Write, record: &RoundRecord) -> io::Result<()> {
    writeln!(
        writer,
        "Round {}: {} | Bet = {} | Balance = {}",
        record.round, record.outcome, record.bet, record.balance
    )
}

pub fn write_depletion(writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "{}", DEPLETION_NOTICE)
}

/// Writes the closing line of a run, surrounded by blank lines.
pub fn write_final_balance(writer: &mut impl Write, label: &str, balance: i64) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "Final Balance with {} Strategy: {}", label, balance)?;
    writeln!(writer)
}

/// Writes a framed statistics table for `summary`.
pub fn write_summary(writer: &mut impl Write, summary: &SimulationSummary) -> io::Result<()> {
    let header = format!("{:-^WIDTH$}", " stats ");
    writeln!(writer, "{}", header)?;
    write!(writer, "{}", summary)?;
    writeln!(writer, "{}", "-".repeat(WIDTH))
}

/// Writes the statistics of every strategy in `comparison`, followed by the failed simulations and the leader.
pub fn write_comparison(writer: &mut impl Write, comparison: &StrategyComparison) -> io::Result<()> {
    for summary in comparison.summaries.iter() {
        write_summary(writer, summary)?;
    }
    write_standings(writer, comparison)
}

/// Writes the failed simulations of `comparison` and the strategy that finished with the highest balance.
pub fn write_standings(writer: &mut impl Write, comparison: &StrategyComparison) -> io::Result<()> {
    for failure in comparison.failures.iter() {
        writeln!(writer, "strategy `{}` failed: {}", failure.strategy, failure.error)?;
    }
    if let Some(leader) = comparison.leader() {
        writeln!(
            writer,
            "best strategy: {} with a final balance of {}",
            leader.label, leader.final_balance
        )?;
    }
    Ok(())
}
