// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Riverodds Monte Carlo showdown equity simulator.
//!
//! Given a [Scenario] with the hero hole cards, the known board cards, and a
//! number of opponents with unknown hands, [simulate] samples the unseen
//! cards over many independent trials and estimates the probability that the
//! hero wins the showdown:
//!
//! ```no_run
//! # use riverodds_sim::{Scenario, SimConfig, simulate};
//! # use riverodds_eval::LookupTable;
//! let table = LookupTable::load("lookup.bin").unwrap();
//! let scenario = Scenario::new(
//!     vec!["AS".parse().unwrap(), "AH".parse().unwrap()],
//!     vec![],
//!     1,
//! )
//! .unwrap();
//!
//! let result = simulate(&scenario, &table, &SimConfig::default()).unwrap();
//! println!("Estimated win probability: {result}");
//! ```
//!
//! Trials never run the hand classifier, every seven-card set is scored by
//! looking up its 21 five-card subsets in the precomputed [LookupTable] and
//! keeping the best universal rank.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
use anyhow::{Result, bail};
use log::debug;
use parking_lot::Mutex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    thread,
    time::Instant,
};

use riverodds_cards::{Card, Deck};
use riverodds_eval::LookupTable;

/// The number of hole cards dealt to each player.
const HOLE_SIZE: usize = 2;

/// The number of community cards on a full board.
const BOARD_SIZE: usize = 5;

/// A showdown scenario: the hero cards, the known board, and the number of
/// opponents holding unknown cards.
///
/// Constructed per equity query and validated up front, invalid input is
/// rejected before any sampling begins and never silently corrected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    hole: Vec<Card>,
    board: Vec<Card>,
    opponents: usize,
}

impl Scenario {
    /// The maximum number of opponents at the table.
    pub const MAX_OPPONENTS: usize = 8;

    /// Creates a validated scenario.
    ///
    /// Fails on more than 2 hole cards, more than 5 board cards, an opponent
    /// count outside 1..=8, or a duplicate card anywhere.
    pub fn new(hole: Vec<Card>, board: Vec<Card>, opponents: usize) -> Result<Self> {
        if hole.len() > HOLE_SIZE {
            bail!("at most {HOLE_SIZE} hole cards, got {}", hole.len());
        }

        if board.len() > BOARD_SIZE {
            bail!("at most {BOARD_SIZE} board cards, got {}", board.len());
        }

        if opponents == 0 || opponents > Self::MAX_OPPONENTS {
            bail!(
                "opponent count must be 1 to {}, got {opponents}",
                Self::MAX_OPPONENTS
            );
        }

        let known = hole.iter().chain(board.iter()).collect::<Vec<_>>();
        for (i, card) in known.iter().enumerate() {
            if known[i + 1..].contains(card) {
                bail!("duplicate card {card} in scenario");
            }
        }

        Ok(Self {
            hole,
            board,
            opponents,
        })
    }

    /// The hero known hole cards.
    pub fn hole(&self) -> &[Card] {
        &self.hole
    }

    /// The known board cards.
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    /// The number of opponents.
    pub fn opponents(&self) -> usize {
        self.opponents
    }
}

/// Simulation tuning knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of Monte Carlo trials to run.
    pub trials: usize,
    /// Number of worker tasks trials are split over.
    pub num_tasks: usize,
    /// Base seed for deterministic replay, each task uses `seed + task_id`.
    /// When not set every task seeds itself from the operating system.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trials: 15_000,
            num_tasks: 4,
            seed: None,
        }
    }
}

/// Accumulated outcome counts of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Number of trials run.
    pub trials: u64,
    /// Trials where the hero beat every opponent.
    pub wins: u64,
    /// Trials where every opponent tied the hero exactly.
    pub ties: u64,
}

impl SimulationResult {
    /// The estimated win probability, 0.0 to 1.0.
    pub fn win_probability(&self) -> f64 {
        self.wins as f64 / self.trials as f64
    }

    /// The estimated tie probability, 0.0 to 1.0.
    pub fn tie_probability(&self) -> f64 {
        self.ties as f64 / self.trials as f64
    }

    /// The estimated win probability as a rounded integer percentage.
    pub fn win_percent(&self) -> u8 {
        (self.win_probability() * 100.0).round() as u8
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.win_percent())
    }
}

/// Per task outcome counters, kept separate to avoid contention.
#[derive(Default)]
struct Counter {
    wins: AtomicU64,
    ties: AtomicU64,
}

impl Counter {
    fn inc_win(&self) {
        self.wins.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_tie(&self) {
        self.ties.fetch_add(1, Ordering::Relaxed);
    }

    fn wins(&self) -> u64 {
        self.wins.load(Ordering::Relaxed)
    }

    fn ties(&self) -> u64 {
        self.ties.load(Ordering::Relaxed)
    }
}

/// Runs a Monte Carlo equity estimate for the given scenario.
///
/// Each trial samples the missing hero cards, the missing board cards, and
/// two cards per opponent without replacement from the cards not already in
/// play, then scores every player against the completed board. A trial is a
/// win only when the hero strictly beats every opponent, and a tie only when
/// every opponent ties the hero exactly; beating some opponents while losing
/// to others earns no partial credit.
///
/// Trials are split over `num_tasks` scoped worker threads sharing the
/// read-only table, counters are merged by summation at the end. A missing
/// table key aborts the whole run with an error.
pub fn simulate(
    scenario: &Scenario,
    table: &LookupTable,
    config: &SimConfig,
) -> Result<SimulationResult> {
    if config.trials == 0 {
        bail!("trial count must be positive");
    }

    if config.num_tasks == 0 {
        bail!("task count must be positive");
    }

    let now = Instant::now();

    let mut deck = Deck::default();
    deck.remove_all(scenario.hole());
    deck.remove_all(scenario.board());

    let counters = (0..config.num_tasks)
        .map(|_| Counter::default())
        .collect::<Vec<_>>();
    let failure = Mutex::new(None);

    let base = config.trials / config.num_tasks;
    let extra = config.trials % config.num_tasks;

    thread::scope(|s| {
        for task_id in 0..config.num_tasks {
            let trials = base + usize::from(task_id < extra);
            let (deck, counters, failure) = (&deck, &counters, &failure);

            s.spawn(move || {
                let mut rng = match config.seed {
                    Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(task_id as u64)),
                    None => SmallRng::from_os_rng(),
                };

                let mut trial = Trial::new(scenario, deck);
                for _ in 0..trials {
                    match trial.run(&mut rng, table) {
                        Ok(Outcome::Win) => counters[task_id].inc_win(),
                        Ok(Outcome::Tie) => counters[task_id].inc_tie(),
                        Ok(Outcome::Loss) => (),
                        Err(e) => {
                            failure.lock().get_or_insert(e);
                            return;
                        }
                    }
                }
            });
        }
    });

    if let Some(e) = failure.into_inner() {
        return Err(e);
    }

    let result = SimulationResult {
        trials: config.trials as u64,
        wins: counters.iter().map(Counter::wins).sum(),
        ties: counters.iter().map(Counter::ties).sum(),
    };

    debug!(
        "simulated {} trials on {} tasks in {:.3}s",
        config.trials,
        config.num_tasks,
        now.elapsed().as_secs_f64()
    );

    Ok(result)
}

enum Outcome {
    Win,
    Tie,
    Loss,
}

/// Reusable per worker trial state.
///
/// The hero primes array keeps the known hole cards at the front and the
/// known board cards from position 2, only the missing slots are overwritten
/// when a trial samples cards.
struct Trial<'a> {
    scenario: &'a Scenario,
    pool: Vec<Card>,
    hero: [u64; 7],
    missing_hole: usize,
    missing_board: usize,
    sample_size: usize,
}

impl<'a> Trial<'a> {
    fn new(scenario: &'a Scenario, deck: &Deck) -> Self {
        let missing_hole = HOLE_SIZE - scenario.hole().len();
        let missing_board = BOARD_SIZE - scenario.board().len();
        let sample_size = missing_hole + missing_board + HOLE_SIZE * scenario.opponents();

        let mut hero = [0u64; 7];
        for (slot, card) in hero.iter_mut().zip(scenario.hole()) {
            *slot = card.prime();
        }

        for (slot, card) in hero[HOLE_SIZE..].iter_mut().zip(scenario.board()) {
            *slot = card.prime();
        }

        Self {
            scenario,
            pool: deck.cards().to_vec(),
            hero,
            missing_hole,
            missing_board,
            sample_size,
        }
    }

    fn run<R: Rng>(&mut self, rng: &mut R, table: &LookupTable) -> Result<Outcome> {
        let (sample, _) = self.pool.partial_shuffle(rng, self.sample_size);

        // Complete the hero hole cards and the board, the board lives at
        // hero[2..7] and is shared by every opponent.
        let known_hole = HOLE_SIZE - self.missing_hole;
        for (slot, card) in self.hero[known_hole..HOLE_SIZE]
            .iter_mut()
            .zip(&sample[..self.missing_hole])
        {
            *slot = card.prime();
        }

        let known_board = BOARD_SIZE - self.missing_board;
        for (slot, card) in self.hero[HOLE_SIZE + known_board..]
            .iter_mut()
            .zip(&sample[self.missing_hole..self.missing_hole + self.missing_board])
        {
            *slot = card.prime();
        }

        let hero_score = score(&self.hero, table)?;

        let mut opponent = self.hero;
        let mut beaten = 0;
        let mut tied = 0;

        for i in 0..self.scenario.opponents() {
            let offset = self.missing_hole + self.missing_board + HOLE_SIZE * i;
            opponent[0] = sample[offset].prime();
            opponent[1] = sample[offset + 1].prime();

            let opponent_score = score(&opponent, table)?;
            if opponent_score > hero_score {
                beaten += 1;
            } else if opponent_score == hero_score {
                tied += 1;
            }
        }

        let outcome = if beaten == self.scenario.opponents() {
            Outcome::Win
        } else if tied == self.scenario.opponents() {
            Outcome::Tie
        } else {
            Outcome::Loss
        };

        Ok(outcome)
    }
}

/// Scores a seven-card set by its primes: the minimum universal rank over
/// the 21 five-card subsets, lower is stronger.
fn score(primes: &[u64; 7], table: &LookupTable) -> Result<u16> {
    let mut best = u16::MAX;

    for i in 0..6 {
        for j in i + 1..7 {
            let mut key = 1u64;
            for (k, &prime) in primes.iter().enumerate() {
                if k != i && k != j {
                    key *= prime;
                }
            }

            best = best.min(table.rank(key)?);
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn cards(names: &[&str]) -> Vec<Card> {
        names.iter().map(|n| n.parse().unwrap()).collect()
    }

    fn table() -> &'static LookupTable {
        static TABLE: OnceLock<LookupTable> = OnceLock::new();
        TABLE.get_or_init(LookupTable::build)
    }

    #[test]
    fn scenario_validation() {
        assert!(Scenario::new(cards(&["AH", "AD", "AC"]), vec![], 1).is_err());
        assert!(Scenario::new(vec![], cards(&["AH", "KD", "QC", "JS", "TH", "9H"]), 1).is_err());
        assert!(Scenario::new(cards(&["AH", "AD"]), vec![], 0).is_err());
        assert!(Scenario::new(cards(&["AH", "AD"]), vec![], 9).is_err());

        // Duplicates within the hole cards and across hole and board.
        assert!(Scenario::new(cards(&["AH", "AH"]), vec![], 1).is_err());
        assert!(Scenario::new(cards(&["AH", "KD"]), cards(&["KD"]), 1).is_err());

        let scenario = Scenario::new(cards(&["AH", "KD"]), cards(&["7C", "7D", "2S"]), 8).unwrap();
        assert_eq!(scenario.hole().len(), 2);
        assert_eq!(scenario.board().len(), 3);
        assert_eq!(scenario.opponents(), 8);

        // Unknown hole cards are a valid scenario.
        assert!(Scenario::new(vec![], vec![], 1).is_ok());
    }

    #[test]
    fn config_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.trials, 15_000);
        assert_eq!(config.num_tasks, 4);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn result_percentages() {
        let result = SimulationResult {
            trials: 15_000,
            wins: 12_749,
            ties: 70,
        };

        assert_eq!(result.win_percent(), 85);
        assert_eq!(result.to_string(), "85%");
        assert!((result.win_probability() - 0.8499).abs() < 1e-3);
        assert!((result.tie_probability() - 0.0047).abs() < 1e-3);

        let result = SimulationResult {
            trials: 1_000,
            wins: 0,
            ties: 1_000,
        };
        assert_eq!(result.win_percent(), 0);
        assert_eq!(result.to_string(), "0%");
    }

    // The simulation tests build the full lookup table once, they take a
    // while to run in debug mode.

    #[test]
    #[ignore]
    fn config_rejected() {
        let scenario = Scenario::new(cards(&["AS", "AH"]), vec![], 1).unwrap();

        let config = SimConfig {
            trials: 0,
            ..Default::default()
        };
        assert!(simulate(&scenario, table(), &config).is_err());

        let config = SimConfig {
            num_tasks: 0,
            ..Default::default()
        };
        assert!(simulate(&scenario, table(), &config).is_err());
    }

    #[test]
    #[ignore]
    fn quad_aces_always_win() {
        // Four aces with a board precluding any straight flush cannot be
        // beaten or tied, every trial is a win.
        let scenario = Scenario::new(
            cards(&["AS", "AH"]),
            cards(&["AC", "AD", "2H", "7D", "9C"]),
            1,
        )
        .unwrap();

        let config = SimConfig {
            trials: 2_000,
            ..Default::default()
        };
        let result = simulate(&scenario, table(), &config).unwrap();

        assert_eq!(result.trials, 2_000);
        assert_eq!(result.wins, 2_000);
        assert_eq!(result.ties, 0);
        assert_eq!(result.win_percent(), 100);
    }

    #[test]
    #[ignore]
    fn board_royal_flush_always_ties() {
        // Everyone plays the board royal flush, no hole cards improve it.
        let scenario = Scenario::new(
            cards(&["2H", "3D"]),
            cards(&["AS", "KS", "QS", "JS", "TS"]),
            2,
        )
        .unwrap();

        let config = SimConfig {
            trials: 2_000,
            ..Default::default()
        };
        let result = simulate(&scenario, table(), &config).unwrap();

        assert_eq!(result.wins, 0);
        assert_eq!(result.ties, 2_000);
        assert_eq!(result.win_percent(), 0);
    }

    #[test]
    #[ignore]
    fn pocket_aces_heads_up() {
        // Pocket aces against one random hand are around 85% to win.
        let scenario = Scenario::new(cards(&["AS", "AH"]), vec![], 1).unwrap();

        let config = SimConfig {
            seed: Some(42),
            ..Default::default()
        };
        let result = simulate(&scenario, table(), &config).unwrap();

        assert_eq!(result.trials, 15_000);
        assert!(
            (82..=88).contains(&result.win_percent()),
            "win percent {} out of range",
            result.win_percent()
        );
    }

    #[test]
    #[ignore]
    fn full_board_eight_opponents() {
        // Nothing to sample but the opponents hole cards.
        let scenario = Scenario::new(
            cards(&["AH", "KD"]),
            cards(&["7C", "7D", "2S", "9H", "JC"]),
            8,
        )
        .unwrap();

        let config = SimConfig {
            trials: 2_000,
            ..Default::default()
        };
        let result = simulate(&scenario, table(), &config).unwrap();

        assert_eq!(result.trials, 2_000);
        assert!(result.wins + result.ties <= result.trials);
    }

    #[test]
    #[ignore]
    fn seeded_runs_replay() {
        let scenario = Scenario::new(cards(&["TS", "9S"]), vec![], 3).unwrap();

        let config = SimConfig {
            trials: 2_000,
            num_tasks: 2,
            seed: Some(7),
        };

        let first = simulate(&scenario, table(), &config).unwrap();
        let second = simulate(&scenario, table(), &config).unwrap();
        assert_eq!(first, second);
    }
}
