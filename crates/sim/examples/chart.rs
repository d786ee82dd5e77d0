// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0
//
// Prints a preflop equity chart for every starting hand, needs a lookup
// table built with the riverodds CLI:
//
// ```bash
// $ cargo r --release --example chart -- --table lookup.bin
// ```
use clap::{Parser, value_parser};
use std::{path::PathBuf, time::Instant};

use riverodds_eval::{Card, LookupTable, Rank, Suit};
use riverodds_sim::{Scenario, SimConfig, simulate};

fn run_sim(table: &LookupTable, c1: Card, c2: Card, n_against: usize) -> u8 {
    let scenario = Scenario::new(vec![c1, c2], vec![], n_against).expect("valid scenario");
    let result = simulate(&scenario, table, &SimConfig::default()).expect("simulation runs");
    result.win_percent()
}

fn separator() {
    print!("|");
    for _ in 0..13 {
        print!("-----|");
    }
    println!();
}

#[derive(Debug, Parser)]
struct Cli {
    /// The lookup table path.
    #[clap(long, short)]
    table: PathBuf,
    /// The number of opposing players.
    #[clap(long, short, default_value_t = 1, value_parser = value_parser!(u8).range(1..=8))]
    num_players: u8,
}

fn main() {
    let cli = Cli::parse();
    let table = LookupTable::load(&cli.table).expect("loading lookup table");
    let num_players = cli.num_players as usize;

    separator();

    let now = Instant::now();

    for r1 in Rank::ranks().rev() {
        let mut labels = Vec::with_capacity(13);
        let mut probs = Vec::with_capacity(13);

        for r2 in Rank::ranks().rev() {
            let (c1, c2) = if r1 <= r2 {
                // Offsuit or pair
                (Card::new(r2, Suit::Hearts), Card::new(r1, Suit::Spades))
            } else {
                // Suited cards
                (Card::new(r1, Suit::Hearts), Card::new(r2, Suit::Hearts))
            };

            if c1.rank() == c2.rank() {
                labels.push(format!("{}{} ", c1.rank(), c2.rank()));
            } else if c1.suit() == c2.suit() {
                labels.push(format!("{}{}s", c1.rank(), c2.rank()));
            } else {
                labels.push(format!("{}{}o", c1.rank(), c2.rank()));
            }

            probs.push(run_sim(&table, c1, c2, num_players));
        }

        print!("|");
        for label in labels {
            print!(" {label} |");
        }

        println!();

        print!("|");
        for prob in &probs {
            print!(" {prob:2}% |");
        }
        println!();

        separator();
    }

    println!("Elapsed: {:.3}s", now.elapsed().as_secs_f64());
}
