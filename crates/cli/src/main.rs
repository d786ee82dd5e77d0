// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Riverodds CLI, builds the lookup table and runs equity simulations.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, value_parser};
use std::{path::PathBuf, time::Instant};

use riverodds_cards::Card;
use riverodds_eval::{LookupTable, table};
use riverodds_sim::{Scenario, SimConfig, simulate};

#[derive(Debug, Parser)]
#[clap(version, about)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Builds the five cards lookup table and saves it to disk.
    BuildTable {
        /// The output table path.
        #[clap(long, short, default_value = "lookup.bin")]
        out: PathBuf,
        /// Writes a csv export of all ranked combinations to this path.
        #[clap(long)]
        csv: Option<PathBuf>,
        /// The number of build tasks, 1 builds on the main thread.
        #[clap(long, short, default_value_t = 4, value_parser = value_parser!(u8).range(1..=32))]
        tasks: u8,
    },
    /// Runs a Monte Carlo showdown equity simulation.
    Simulate {
        /// The lookup table path.
        #[clap(long, default_value = "lookup.bin")]
        table: PathBuf,
        /// The hero hole cards, up to two, e.g. "AH,AS".
        #[clap(long)]
        hole: Option<String>,
        /// The known board cards, up to five, e.g. "7D,9C,2H".
        #[clap(long)]
        board: Option<String>,
        /// The number of opposing players.
        #[clap(long, short, default_value_t = 1, value_parser = value_parser!(u8).range(1..=8))]
        opponents: u8,
        /// The number of trials.
        #[clap(long, default_value_t = 15_000)]
        trials: usize,
        /// The number of simulation tasks.
        #[clap(long, short, default_value_t = 4, value_parser = value_parser!(u8).range(1..=32))]
        tasks: u8,
        /// A base seed for reproducible runs.
        #[clap(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .init();

    match Cli::parse().command {
        Command::BuildTable { out, csv, tasks } => build_table(out, csv, tasks as usize),
        Command::Simulate {
            table,
            hole,
            board,
            opponents,
            trials,
            tasks,
            seed,
        } => run_simulate(
            table,
            hole,
            board,
            opponents as usize,
            SimConfig {
                trials,
                num_tasks: tasks as usize,
                seed,
            },
        ),
    }
}

fn build_table(out: PathBuf, csv: Option<PathBuf>, tasks: usize) -> Result<()> {
    let now = Instant::now();

    let table = if tasks > 1 {
        LookupTable::par_build(tasks)
    } else {
        LookupTable::build()
    };

    log::info!(
        "built table with {} keys and {} classes in {:.3}s",
        table.len(),
        table.classes(),
        now.elapsed().as_secs_f64()
    );

    table.save(&out)?;
    println!("Saved lookup table to {}", out.display());

    if let Some(csv) = csv {
        table::export_csv(&csv)?;
        println!("Exported csv to {}", csv.display());
    }

    Ok(())
}

fn run_simulate(
    table: PathBuf,
    hole: Option<String>,
    board: Option<String>,
    opponents: usize,
    config: SimConfig,
) -> Result<()> {
    let hole = parse_cards(hole.as_deref().unwrap_or_default())?;
    let board = parse_cards(board.as_deref().unwrap_or_default())?;
    let scenario = Scenario::new(hole, board, opponents)?;

    let table = LookupTable::load(&table)?;

    let now = Instant::now();
    let result = simulate(&scenario, &table, &config)?;
    let elapsed = now.elapsed().as_secs_f64();

    println!("Hole:      {}", join_cards(scenario.hole()));
    println!("Board:     {}", join_cards(scenario.board()));
    println!("Opponents: {}", scenario.opponents());
    println!("Trials:    {}", result.trials);
    println!("Win:       {:.2}%", result.win_probability() * 100.0);
    println!("Tie:       {:.2}%", result.tie_probability() * 100.0);
    println!("Elapsed:   {elapsed:.3}s");

    Ok(())
}

/// Parses a comma separated list of cards, e.g. "AH,KS".
fn parse_cards(cards: &str) -> Result<Vec<Card>> {
    cards
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<Card>()
                .with_context(|| format!("parsing card {token:?}"))
        })
        .collect()
}

fn join_cards(cards: &[Card]) -> String {
    if cards.is_empty() {
        "none".to_string()
    } else {
        cards
            .iter()
            .map(Card::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cards_lists() {
        let cards = parse_cards("AH, ks").unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].to_string(), "AH");
        assert_eq!(cards[1].to_string(), "KS");

        assert!(parse_cards("").unwrap().is_empty());
        assert!(parse_cards("ZZ").is_err());
        assert!(parse_cards("AH,,KS").unwrap().len() == 2);
    }

    #[test]
    fn join_cards_format() {
        assert_eq!(join_cards(&[]), "none");

        let cards = parse_cards("AH,KS").unwrap();
        assert_eq!(join_cards(&cards), "AH KS");
    }
}
