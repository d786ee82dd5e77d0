// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Riverodds Poker hand classifier and lookup table builder.
//!
//! The [classify](hand::classify) function maps any 5 to 7 cards set to its
//! best five-card hand with a category and tie-break subranks:
//!
//! ```
//! # use riverodds_eval::{Card, hand::{HandCategory, classify}};
//! let cards = ["AH", "KH", "QH", "JH", "TH"]
//!     .iter()
//!     .map(|n| n.parse::<Card>().unwrap())
//!     .collect::<Vec<_>>();
//!
//! let hand = classify(&cards).unwrap();
//! assert_eq!(hand.category(), HandCategory::RoyalFlush);
//! ```
//!
//! The [table] module builds a lookup table covering all C(52,5)
//! combinations keyed by the product of the five card primes, so that at
//! simulation time ranking a combination is a constant time lookup and the
//! classifier never runs:
//!
//! ```no_run
//! # use riverodds_eval::table::LookupTable;
//! let table = LookupTable::build();
//! table.save("lookup.bin").unwrap();
//! let table = LookupTable::load("lookup.bin").unwrap();
//! assert_eq!(table.classes(), 7_462);
//! ```
//!
//! The **`parallel`** feature enables building the table with multiple tasks
//! with [LookupTable::par_build](table::LookupTable::par_build).
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
pub mod hand;
pub mod table;

pub use hand::{HandCategory, HandKey, HandResult, classify};
pub use table::LookupTable;

// Reexport cards types.
pub use riverodds_cards::{Card, Deck, Rank, Suit};
