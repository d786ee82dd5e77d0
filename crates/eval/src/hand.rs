// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Poker hand classification.
//!
//! The [classify] function maps any 5 to 7 cards set to the best five-card
//! hand it contains. Hands compare by their [HandKey], the category followed
//! by the five subrank ordinals, lexicographically with lower values being
//! stronger. Suits never break ties.
use anyhow::{Result, bail};
use std::fmt;

use riverodds_cards::{Card, Rank, Suit};

/// The ten poker hand categories, lower discriminant is stronger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    /// Ace high straight flush.
    RoyalFlush = 1,
    /// Five suited cards in a row.
    StraightFlush,
    /// Four cards of the same rank.
    FourOfAKind,
    /// Three of a kind plus a pair.
    FullHouse,
    /// Five suited cards.
    Flush,
    /// Five cards in a row.
    Straight,
    /// Three cards of the same rank.
    ThreeOfAKind,
    /// Two pairs of the same rank.
    TwoPair,
    /// One pair of the same rank.
    OnePair,
    /// None of the above.
    HighCard,
}

/// Total strength order over classified hands.
///
/// The category discriminant followed by the five subrank ordinals, compared
/// lexicographically: the lower key is the stronger hand. Two hands with the
/// same key tie, suits are never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandKey(pub u8, pub [u8; 5]);

/// The best five-card hand found in a set of cards.
#[derive(Debug, Clone, Copy)]
pub struct HandResult {
    category: HandCategory,
    best_five: [Card; 5],
    subranks: [u8; 5],
}

impl HandResult {
    /// The hand category.
    pub fn category(&self) -> HandCategory {
        self.category
    }

    /// The five cards making the hand, in category order (e.g. the quads
    /// before the kicker, the higher pair before the lower pair).
    pub fn best_five(&self) -> [Card; 5] {
        self.best_five
    }

    /// The ordinals of the five cards in category order, always length 5.
    pub fn subranks(&self) -> [u8; 5] {
        self.subranks
    }

    /// The strength ordering key for this hand.
    pub fn key(&self) -> HandKey {
        HandKey(self.category as u8, self.subranks)
    }

    /// Checks if this hand is strictly stronger than the other.
    pub fn beats(&self, other: &HandResult) -> bool {
        self.key() < other.key()
    }

    /// Checks if this hand ties the other exactly.
    pub fn ties(&self, other: &HandResult) -> bool {
        self.key() == other.key()
    }

    /// A human readable hand description.
    pub fn name(&self) -> String {
        let five = &self.best_five;
        match self.category {
            HandCategory::RoyalFlush => format!("Royal Flush of {}", five[0].suit().name()),
            HandCategory::StraightFlush => format!(
                "Straight Flush of {}, {} High",
                five[0].suit().name(),
                five[0].rank().name()
            ),
            HandCategory::FourOfAKind => {
                format!("Four of a Kind, {}", five[0].rank().name_plural())
            }
            HandCategory::FullHouse => format!(
                "Full House, {} Full of {}",
                five[0].rank().name_plural(),
                five[3].rank().name_plural()
            ),
            HandCategory::Flush => format!(
                "Flush of {}, {} High",
                five[0].suit().name(),
                five[0].rank().name()
            ),
            HandCategory::Straight => format!("Straight, {} High", five[0].rank().name()),
            HandCategory::ThreeOfAKind => {
                format!("Three of a Kind, {}", five[0].rank().name_plural())
            }
            HandCategory::TwoPair => format!(
                "Two Pair, {} and {}",
                five[0].rank().name_plural(),
                five[2].rank().name_plural()
            ),
            HandCategory::OnePair => format!("One Pair of {}", five[0].rank().name_plural()),
            HandCategory::HighCard => format!(
                "High Card, {} of {}",
                five[0].rank().name(),
                five[0].suit().name()
            ),
        }
    }
}

impl fmt::Display for HandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The ten straight windows over strength ordinals, strongest first.
///
/// Ordinal 1 is the ace, so the first window is the ace high run and the
/// last is the wheel with the ace counted low.
const STRAIGHT_WINDOWS: [[u8; 5]; 10] = [
    [1, 2, 3, 4, 5],
    [2, 3, 4, 5, 6],
    [3, 4, 5, 6, 7],
    [4, 5, 6, 7, 8],
    [5, 6, 7, 8, 9],
    [6, 7, 8, 9, 10],
    [7, 8, 9, 10, 11],
    [8, 9, 10, 11, 12],
    [9, 10, 11, 12, 13],
    [10, 11, 12, 13, 1],
];

/// Classifies a set of 5 to 7 distinct cards into its best five-card hand.
///
/// Pure and deterministic, the category checks run in fixed strength order
/// and the first match wins. Fewer than 5 cards, more than 7, or duplicate
/// cards are contract violations and return an error.
pub fn classify(cards: &[Card]) -> Result<HandResult> {
    if cards.len() < 5 || cards.len() > 7 {
        bail!("classify requires 5 to 7 cards, got {}", cards.len());
    }

    for (i, card) in cards.iter().enumerate() {
        if cards[i + 1..].contains(card) {
            bail!("classify requires distinct cards, {card} appears twice");
        }
    }

    // Strongest first, picking the first n cards of an ordinal or the first
    // unused cards gives the category cards and kickers directly.
    let mut sorted = cards.to_vec();
    sorted.sort_by_key(|c| c.ordinal());

    let result = straight_flush(&sorted)
        .or_else(|| four_of_a_kind(&sorted))
        .or_else(|| full_house(&sorted))
        .or_else(|| flush(&sorted))
        .or_else(|| straight(&sorted))
        .or_else(|| rank_groups(&sorted))
        .unwrap_or_else(|| high_card(&sorted));

    Ok(result)
}

fn hand_result(category: HandCategory, best_five: [Card; 5]) -> HandResult {
    let mut subranks = [0u8; 5];
    for (subrank, card) in subranks.iter_mut().zip(&best_five) {
        *subrank = card.ordinal();
    }

    HandResult {
        category,
        best_five,
        subranks,
    }
}

/// Number of cards per ordinal, indexed 1..=13.
fn ordinal_counts(cards: &[Card]) -> [u8; 14] {
    let mut counts = [0u8; 14];
    for card in cards {
        counts[card.ordinal() as usize] += 1;
    }

    counts
}

/// The first matching straight window over the given cards, one card per
/// ordinal in window order.
fn find_straight(cards: &[Card]) -> Option<[Card; 5]> {
    let mut first: [Option<Card>; 14] = [None; 14];
    for card in cards {
        first[card.ordinal() as usize].get_or_insert(*card);
    }

    for window in &STRAIGHT_WINDOWS {
        if window.iter().all(|&o| first[o as usize].is_some()) {
            let mut five = [cards[0]; 5];
            for (slot, &o) in five.iter_mut().zip(window) {
                *slot = first[o as usize].unwrap();
            }

            return Some(five);
        }
    }

    None
}

/// The strongest n cards not already used by the category.
fn kickers(sorted: &[Card], used: &[Card], n: usize) -> Vec<Card> {
    sorted
        .iter()
        .filter(|c| !used.contains(c))
        .take(n)
        .copied()
        .collect()
}

fn straight_flush(sorted: &[Card]) -> Option<HandResult> {
    for suit in Suit::suits() {
        let suited = sorted
            .iter()
            .filter(|c| c.suit() == suit)
            .copied()
            .collect::<Vec<_>>();

        if suited.len() >= 5 {
            if let Some(five) = find_straight(&suited) {
                let category = if five[0].rank() == Rank::Ace {
                    HandCategory::RoyalFlush
                } else {
                    HandCategory::StraightFlush
                };

                return Some(hand_result(category, five));
            }
        }
    }

    None
}

fn four_of_a_kind(sorted: &[Card]) -> Option<HandResult> {
    let counts = ordinal_counts(sorted);
    let quad = (1u8..=13).find(|&o| counts[o as usize] == 4)?;

    let mut five = [sorted[0]; 5];
    for (slot, card) in five.iter_mut().zip(sorted.iter().filter(|c| c.ordinal() == quad)) {
        *slot = *card;
    }

    five[4] = kickers(sorted, &five[..4], 1)[0];
    Some(hand_result(HandCategory::FourOfAKind, five))
}

fn full_house(sorted: &[Card]) -> Option<HandResult> {
    let counts = ordinal_counts(sorted);
    let mut trips = (1u8..=13).filter(|&o| counts[o as usize] == 3);

    let three = trips.next()?;
    // A second triplet provides the pair, using its two strongest cards.
    let pair = trips
        .next()
        .or_else(|| (1u8..=13).find(|&o| counts[o as usize] == 2))?;

    let mut five = [sorted[0]; 5];
    let cards = sorted
        .iter()
        .filter(|c| c.ordinal() == three)
        .chain(sorted.iter().filter(|c| c.ordinal() == pair).take(2));
    for (slot, card) in five.iter_mut().zip(cards) {
        *slot = *card;
    }

    Some(hand_result(HandCategory::FullHouse, five))
}

fn flush(sorted: &[Card]) -> Option<HandResult> {
    for suit in Suit::suits() {
        let suited = sorted
            .iter()
            .filter(|c| c.suit() == suit)
            .copied()
            .collect::<Vec<_>>();

        if suited.len() >= 5 {
            let mut five = [suited[0]; 5];
            five.copy_from_slice(&suited[..5]);
            return Some(hand_result(HandCategory::Flush, five));
        }
    }

    None
}

fn straight(sorted: &[Card]) -> Option<HandResult> {
    find_straight(sorted).map(|five| hand_result(HandCategory::Straight, five))
}

/// Three of a kind, two pair, or one pair by count of matching-rank groups.
fn rank_groups(sorted: &[Card]) -> Option<HandResult> {
    let counts = ordinal_counts(sorted);
    let mut five = [sorted[0]; 5];

    if let Some(three) = (1u8..=13).find(|&o| counts[o as usize] == 3) {
        let cards = sorted.iter().filter(|c| c.ordinal() == three);
        for (slot, card) in five.iter_mut().zip(cards) {
            *slot = *card;
        }

        let (used, rest) = five.split_at_mut(3);
        rest.copy_from_slice(&kickers(sorted, used, 2));
        return Some(hand_result(HandCategory::ThreeOfAKind, five));
    }

    let mut pairs = (1u8..=13).filter(|&o| counts[o as usize] == 2);
    let first = pairs.next()?;

    if let Some(second) = pairs.next() {
        let cards = sorted
            .iter()
            .filter(|c| c.ordinal() == first)
            .chain(sorted.iter().filter(|c| c.ordinal() == second));
        for (slot, card) in five.iter_mut().zip(cards) {
            *slot = *card;
        }

        five[4] = kickers(sorted, &five[..4], 1)[0];
        return Some(hand_result(HandCategory::TwoPair, five));
    }

    let cards = sorted.iter().filter(|c| c.ordinal() == first);
    for (slot, card) in five.iter_mut().zip(cards) {
        *slot = *card;
    }

    let (used, rest) = five.split_at_mut(2);
    rest.copy_from_slice(&kickers(sorted, used, 3));
    Some(hand_result(HandCategory::OnePair, five))
}

fn high_card(sorted: &[Card]) -> HandResult {
    let mut five = [sorted[0]; 5];
    five.copy_from_slice(&sorted[..5]);
    hand_result(HandCategory::HighCard, five)
}
