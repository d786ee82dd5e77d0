// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Poker cards definitions.
use anyhow::{Error, Result, anyhow, bail};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[cfg(feature = "parallel")]
mod parallel;

/// The first 52 primes, one for each card in the deck.
///
/// Each card gets its own prime keyed by its deck index, so by unique
/// factorization the product of five distinct card primes identifies the
/// unordered five-card combination. The largest possible product
/// (239 * 233 * 229 * 227 * 223) is below 2^40 and fits a `u64`.
const PRIMES: [u64; 52] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239,
];

/// A Poker card.
///
/// A card is identified by its rank and suit, its canonical name is the
/// rank letter followed by the suit letter (`"AH"` the ace of hearts, `"TD"`
/// the ten of diamonds) and round-trips through [FromStr] and [fmt::Display].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    /// Create a card given a rank and a suit.
    pub const fn new(rank: Rank, suit: Suit) -> Card {
        Self { rank, suit }
    }

    /// Returns the card rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Returns the card suit.
    pub fn suit(&self) -> Suit {
        self.suit
    }

    /// The fixed deck position of this card, 0..52.
    ///
    /// This is the prime assignment order and must stay stable across table
    /// builds and simulation runs.
    pub fn index(&self) -> usize {
        self.rank as usize * 4 + self.suit as usize
    }

    /// The unique prime identifier of this card.
    pub fn prime(&self) -> u64 {
        PRIMES[self.index()]
    }

    /// The strength ordinal of this card, 1 for the ace down to 13 for the
    /// deuce, lower is stronger.
    pub fn ordinal(&self) -> u8 {
        13 - self.rank as u8
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Card({}{})", self.rank, self.suit)
    }
}

impl FromStr for Card {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let (Some(rank), Some(suit), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("invalid card name {s:?}, expected rank and suit as in \"AH\"");
        };

        let rank = Rank::from_char(rank.to_ascii_uppercase())
            .ok_or_else(|| anyhow!("invalid card rank {rank:?} in {s:?}"))?;
        let suit = Suit::from_char(suit.to_ascii_uppercase())
            .ok_or_else(|| anyhow!("invalid card suit {suit:?} in {s:?}"))?;

        Ok(Card::new(rank, suit))
    }
}

/// Card rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    /// Deuce
    Deuce = 0,
    /// Trey
    Trey,
    /// Four
    Four,
    /// Five
    Five,
    /// Six
    Six,
    /// Seven
    Seven,
    /// Eight
    Eight,
    /// Nine
    Nine,
    /// Ten
    Ten,
    /// Jack
    Jack,
    /// Queen
    Queen,
    /// King
    King,
    /// Ace
    Ace,
}

impl Rank {
    /// Returns all ranks.
    pub fn ranks() -> impl DoubleEndedIterator<Item = Rank> {
        use Rank::*;
        [
            Deuce, Trey, Four, Five, Six, Seven, Eight, Nine, Ten, Jack, Queen, King, Ace,
        ]
        .into_iter()
    }

    /// The rank for a canonical rank letter.
    pub fn from_char(c: char) -> Option<Rank> {
        let rank = match c {
            '2' => Rank::Deuce,
            '3' => Rank::Trey,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            '9' => Rank::Nine,
            'T' => Rank::Ten,
            'J' => Rank::Jack,
            'Q' => Rank::Queen,
            'K' => Rank::King,
            'A' => Rank::Ace,
            _ => return None,
        };

        Some(rank)
    }

    /// The rank name, used to describe hands.
    pub fn name(&self) -> &'static str {
        match self {
            Rank::Deuce => "Deuce",
            Rank::Trey => "Trey",
            Rank::Four => "Four",
            Rank::Five => "Five",
            Rank::Six => "Six",
            Rank::Seven => "Seven",
            Rank::Eight => "Eight",
            Rank::Nine => "Nine",
            Rank::Ten => "Ten",
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
            Rank::Ace => "Ace",
        }
    }

    /// The plural rank name, used to describe paired hands.
    pub fn name_plural(&self) -> &'static str {
        match self {
            Rank::Deuce => "Deuces",
            Rank::Trey => "Treys",
            Rank::Four => "Fours",
            Rank::Five => "Fives",
            Rank::Six => "Sixes",
            Rank::Seven => "Sevens",
            Rank::Eight => "Eights",
            Rank::Nine => "Nines",
            Rank::Ten => "Tens",
            Rank::Jack => "Jacks",
            Rank::Queen => "Queens",
            Rank::King => "Kings",
            Rank::Ace => "Aces",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self {
            Rank::Deuce => '2',
            Rank::Trey => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        };

        write!(f, "{rank}")
    }
}

/// Card suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    /// Clubs suit.
    Clubs = 0,
    /// Diamonds suit.
    Diamonds,
    /// Hearts suit.
    Hearts,
    /// Spades suit.
    Spades,
}

impl Suit {
    /// Returns all suits.
    pub fn suits() -> impl DoubleEndedIterator<Item = Suit> {
        [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades].into_iter()
    }

    /// The suit name, used to describe hands.
    pub fn name(&self) -> &'static str {
        match self {
            Suit::Clubs => "Clubs",
            Suit::Diamonds => "Diamonds",
            Suit::Hearts => "Hearts",
            Suit::Spades => "Spades",
        }
    }

    /// The suit for a canonical suit letter.
    pub fn from_char(c: char) -> Option<Suit> {
        let suit = match c {
            'C' => Suit::Clubs,
            'D' => Suit::Diamonds,
            'H' => Suit::Hearts,
            'S' => Suit::Spades,
            _ => return None,
        };

        Some(suit)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suit = match self {
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        };

        write!(f, "{suit}")
    }
}

/// A cards Deck.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The number of cards in a full deck.
    pub const SIZE: usize = 52;

    /// The cards left in the deck.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of cards in the deck.
    pub fn count(&self) -> usize {
        self.cards.len()
    }

    /// Checks if the deck is empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Removes a card from the deck.
    pub fn remove(&mut self, card: Card) {
        self.cards.retain(|c| c != &card);
    }

    /// Removes all the given cards from the deck.
    pub fn remove_all(&mut self, cards: &[Card]) {
        self.cards.retain(|c| !cards.contains(c));
    }

    /// Samples k distinct cards uniformly without replacement.
    ///
    /// The returned cards are in random order so callers can partition the
    /// sample positionally without bias.
    ///
    /// Panics if k is greater than the number of cards left in the deck.
    pub fn sample<R: Rng>(&self, rng: &mut R, k: usize) -> Vec<Card> {
        assert!(k <= self.cards.len(), "k={k} exceeds deck size");

        let mut pool = self.cards.clone();
        let (chosen, _) = pool.partial_shuffle(rng, k);
        chosen.to_vec()
    }

    /// Calls the `f` closure for each k-cards hand.
    ///
    /// Panics if k is not 2 <= k <= 7.
    pub fn for_each<F>(&self, k: usize, mut f: F)
    where
        F: FnMut(&[Card]),
    {
        assert!(2 <= k && k <= 7, "2 <= k <= 7");

        if k > self.cards.len() {
            return;
        }

        let n = self.cards.len();
        let mut h = vec![self.cards[0]; k];

        for_each_ksubset(n, k, 0, nck(n, k), |p| {
            for (idx, &pos) in p.iter().enumerate() {
                h[idx] = self.cards[pos];
            }

            f(&h);
        });
    }
}

impl Default for Deck {
    fn default() -> Self {
        // Rank major order, this is the prime assignment order.
        let cards = Rank::ranks()
            .flat_map(|r| Suit::suits().map(move |s| Card::new(r, s)))
            .collect::<Vec<_>>();
        Self { cards }
    }
}

impl IntoIterator for Deck {
    type Item = Card;
    type IntoIter = std::vec::IntoIter<Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.into_iter()
    }
}

/// Creates table for nck(n, k) for n <= 52 and k <= 7.
const fn make_nck() -> [[u32; 8]; 52] {
    let mut t = [[0u32; 8]; 52];
    let mut n = 0;

    while n < 52 {
        // base case nck(n, 0) = 1
        t[n][0] = 1;

        let mut k = 1;
        while k <= 7 && k <= n + 1 {
            // nck(n, k) = nck(n-1, k-1) + nck(n-1, k)
            let n_1 = n.saturating_sub(1);
            let k_1 = k.saturating_sub(1);
            t[n][k] = t[n_1][k_1] + t[n_1][k];
            k += 1;
        }

        n += 1;
    }

    t
}

const NCKS: [[u32; 8]; 52] = make_nck();

/// Returns the binomial coefficient for n choose k.
#[inline]
pub(crate) fn nck(n: usize, k: usize) -> usize {
    assert!(n <= 52, "n={n} must be 0 <= n <= 52");
    assert!(k <= 7, "k={k} must be 0 <= k <= 7");

    if n < k || n == 0 {
        0
    } else {
        NCKS[n.saturating_sub(1)][k] as usize
    }
}

/// Uses the combinatorial number system to convert n to a
/// k-combination (see Theorem L pg. 260 Knuth 4a).
pub(crate) fn nth_ksubset(mut n: usize, k: usize) -> [usize; 7] {
    assert!(k <= 7);

    let mut out = [0; 7];
    for k in (0..k).rev() {
        let mut c = k;
        while nck(c, k + 1) <= n {
            c += 1;
        }

        c = c.saturating_sub(1);
        out[k] = c;

        n = n.saturating_sub(nck(c, k + 1));
    }

    out
}

/// Calls the given closure for count k-subsets starting from the nth ksubset.
pub(crate) fn for_each_ksubset<F>(n: usize, k: usize, nth: usize, count: usize, mut f: F)
where
    F: FnMut(&[usize]),
{
    // Algorithm L from TAOCP 4a
    let mut c = vec![0usize; k + 3];

    let ks = nth_ksubset(nth, k);
    for i in 0..k {
        c[i + 1] = ks[i];
    }

    c[k + 1] = n;

    let mut counter = 1;
    loop {
        f(&c[1..=k]);

        counter += 1;
        if counter > count {
            break;
        }

        let mut j = 1;
        while c[j] + 1 == c[j + 1] {
            c[j] = j - 1;
            j += 1;
        }

        if j > k {
            break;
        }

        c[j] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;

    #[test]
    fn prime_bijection() {
        let deck = Deck::default();
        let primes = deck.cards().iter().map(|c| c.prime()).collect::<AHashSet<_>>();

        // No two cards share a prime.
        assert_eq!(primes.len(), Deck::SIZE);
        assert!(primes.iter().all(|p| PRIMES.contains(p)));

        // The assignment is keyed by the fixed deck index.
        for card in deck.cards() {
            assert_eq!(card.prime(), PRIMES[card.index()]);
        }

        let indices = deck.cards().iter().map(|c| c.index()).collect::<AHashSet<_>>();
        assert_eq!(indices.len(), Deck::SIZE);
    }

    #[test]
    fn ordinals() {
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).ordinal(), 1);
        assert_eq!(Card::new(Rank::King, Suit::Hearts).ordinal(), 2);
        assert_eq!(Card::new(Rank::Ten, Suit::Clubs).ordinal(), 5);
        assert_eq!(Card::new(Rank::Trey, Suit::Diamonds).ordinal(), 12);
        assert_eq!(Card::new(Rank::Deuce, Suit::Clubs).ordinal(), 13);
    }

    #[test]
    fn card_to_string() {
        assert_eq!(Card::new(Rank::King, Suit::Diamonds).to_string(), "KD");
        assert_eq!(Card::new(Rank::Five, Suit::Spades).to_string(), "5S");
        assert_eq!(Card::new(Rank::Jack, Suit::Clubs).to_string(), "JC");
        assert_eq!(Card::new(Rank::Ten, Suit::Hearts).to_string(), "TH");
        assert_eq!(Card::new(Rank::Ace, Suit::Hearts).to_string(), "AH");
    }

    #[test]
    fn card_parse_round_trip() {
        for card in Deck::default().cards() {
            let name = card.to_string();
            assert_eq!(name.parse::<Card>().unwrap(), *card);
            assert_eq!(name.to_lowercase().parse::<Card>().unwrap(), *card);
        }
    }

    #[test]
    fn card_parse_errors() {
        for name in ["", "A", "AHH", "1H", "XK", "A♥"] {
            assert!(name.parse::<Card>().is_err(), "parsed {name:?}");
        }
    }

    #[test]
    fn deck_for_each() {
        let deck = Deck::default();
        assert_eq!(deck.count(), Deck::SIZE);

        let mut hands = AHashSet::new();
        deck.for_each(5, |cards| {
            assert_eq!(cards.len(), 5);
            hands.insert(cards.to_owned());
        });
        assert_eq!(hands.len(), 2_598_960);

        hands.clear();
        deck.for_each(2, |cards| {
            assert_eq!(cards.len(), 2);
            hands.insert(cards.to_owned());
        });
        assert_eq!(hands.len(), 1_326);
    }

    #[test]
    fn deck_remove() {
        let mut deck = Deck::default();
        deck.remove(Card::new(Rank::Ace, Suit::Diamonds));
        deck.remove(Card::new(Rank::King, Suit::Diamonds));
        assert_eq!(deck.count(), 50);

        // Removing a card twice is a noop.
        deck.remove(Card::new(Rank::Ace, Suit::Diamonds));
        assert_eq!(deck.count(), 50);

        let mut deck = Deck::default();
        deck.remove_all(&[
            Card::new(Rank::Ace, Suit::Diamonds),
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Seven, Suit::Hearts),
        ]);
        assert_eq!(deck.count(), 49);

        let mut count = 0;
        deck.for_each(5, |_| count += 1);
        assert_eq!(count, nck(49, 5));
    }

    #[test]
    fn deck_sample() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut deck = Deck::default();
        deck.remove(Card::new(Rank::Ace, Suit::Diamonds));

        for k in [1, 2, 7, 21, 51] {
            let sample = deck.sample(&mut rng, k);
            assert_eq!(sample.len(), k);

            let unique = sample.iter().collect::<AHashSet<_>>();
            assert_eq!(unique.len(), k);
            assert!(!sample.contains(&Card::new(Rank::Ace, Suit::Diamonds)));
        }
    }

    #[test]
    fn test_nck() {
        // For n < k = 0
        assert_eq!(nck(2, 3), 0);

        [1, 52, 1326, 22100, 270725, 2598960, 20358520, 133784560]
            .into_iter()
            .enumerate()
            .for_each(|(k, v)| assert_eq!(nck(52, k), v));

        [1, 51, 1275, 20825, 249900, 2349060, 18009460, 115775100]
            .into_iter()
            .enumerate()
            .for_each(|(k, v)| assert_eq!(nck(51, k), v));

        [1, 5, 10, 10, 5, 1, 0, 0]
            .into_iter()
            .enumerate()
            .for_each(|(k, v)| assert_eq!(nck(5, k), v));
    }

    // This takes a while to run in debug mode as it goes through 2.6M subsets.
    #[test]
    #[ignore]
    fn test_nth_ksubset() {
        let mut counter = 0;
        let count = nck(52, 5);
        for_each_ksubset(52, 5, 0, count, |s| {
            let ks = nth_ksubset(counter, 5);
            s.iter().zip(ks).for_each(|(&l, r)| assert_eq!(l, r));
            counter += 1;
        });

        assert_eq!(count, counter);

        // Start from half way.
        counter = 0;
        let nth = nck(52, 5) / 2;
        for_each_ksubset(52, 5, nth, nth, |s| {
            let ks = nth_ksubset(nth + counter, 5);
            s.iter().zip(ks).for_each(|(&l, r)| assert_eq!(l, r));
            counter += 1;
        });

        assert_eq!(nth, counter);
    }
}
