// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0
//
// Run with:
//
// ```bash
// $ cargo r --release --example classify_all5
// ...
// Total hands      2598960
// Elapsed:         1.385s
//
// Royal Flush:     4
// Straight Flush:  36
// Four of a Kind:  624
// Full House:      3744
// Flush:           5108
// Straight:        10200
// Three of a Kind: 54912
// Two Pair:        123552
// One Pair:        1098240
// High Card:       1302540
// ```

use std::time::Instant;

use riverodds_eval::{Deck, HandCategory, classify};

#[rustfmt::skip]
fn main() {
    // Classify all 2.6M five-card hands.
    let now = Instant::now();
    let mut counts = [0usize; 11];

    Deck::default().for_each(5, |hand| {
        let result = classify(hand).expect("deck cards classify");
        counts[result.category() as usize] += 1;
    });

    let elapsed = now.elapsed().as_secs_f64();
    let total = counts.iter().sum::<usize>();
    println!("Total hands      {total}");
    println!("Elapsed:         {:.3}s\n", elapsed);

    println!("Royal Flush:     {}", counts[HandCategory::RoyalFlush as usize]);
    println!("Straight Flush:  {}", counts[HandCategory::StraightFlush as usize]);
    println!("Four of a Kind:  {}", counts[HandCategory::FourOfAKind as usize]);
    println!("Full House:      {}", counts[HandCategory::FullHouse as usize]);
    println!("Flush:           {}", counts[HandCategory::Flush as usize]);
    println!("Straight:        {}", counts[HandCategory::Straight as usize]);
    println!("Three of a Kind: {}", counts[HandCategory::ThreeOfAKind as usize]);
    println!("Two Pair:        {}", counts[HandCategory::TwoPair as usize]);
    println!("One Pair:        {}", counts[HandCategory::OnePair as usize]);
    println!("High Card:       {}", counts[HandCategory::HighCard as usize]);
}
