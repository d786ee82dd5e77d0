// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Five-card lookup table construction and persistence.
//!
//! The table maps the perfect hash key of every five-card combination, the
//! product of the five card primes, to its universal rank, a dense integer
//! with 1 for the best possible hand. Building the table is the only place
//! the classifier runs, at simulation time ranking a combination is a single
//! map lookup.
use ahash::AHashMap;
use anyhow::{Context, Result, anyhow, bail};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::info;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
    time::Instant,
};

use riverodds_cards::{Card, Deck};

use crate::hand::{HandKey, classify};

/// Number of five-card combinations covered by the table, C(52,5).
pub const COMBINATIONS: usize = 2_598_960;

/// Number of distinct five-card strength classes.
pub const CLASSES: u16 = 7_462;

const MAGIC: [u8; 4] = *b"RODT";
const VERSION: u16 = 1;

/// The perfect hash key of an unordered five-card combination.
///
/// By unique factorization the product of the five card primes cannot
/// collide with the product of any other combination.
pub fn hash_key(cards: &[Card]) -> u64 {
    cards.iter().map(|c| c.prime()).product()
}

/// Lookup table from five-card hash keys to universal ranks.
///
/// Built once offline, persisted with [LookupTable::save], and loaded
/// read-only at simulation start. Never mutated afterwards, so it can be
/// shared across trial workers without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    map: AHashMap<u64, u16>,
    classes: u16,
}

impl LookupTable {
    /// Builds the table by classifying all C(52,5) combinations.
    ///
    /// Deterministic, building twice yields an identical mapping.
    pub fn build() -> Self {
        let now = Instant::now();

        let mut rows = Vec::with_capacity(COMBINATIONS);
        Deck::default().for_each(5, |hand| {
            let hand_key = classify(hand).expect("five distinct deck cards classify");
            rows.push((hash_key(hand), hand_key.key()));
        });

        info!(
            "classified {} combinations in {:.3}s",
            rows.len(),
            now.elapsed().as_secs_f64()
        );

        Self::from_rows(rows)
    }

    /// Builds the table fanning the classification out to `num_tasks`
    /// parallel tasks, same output as [LookupTable::build].
    ///
    /// The per task buffers are merged before the global sort that assigns
    /// the dense ranks, that sort is the only synchronization point.
    #[cfg(feature = "parallel")]
    pub fn par_build(num_tasks: usize) -> Self {
        use parking_lot::Mutex;

        let now = Instant::now();

        let buffers = (0..num_tasks)
            .map(|_| Mutex::new(Vec::with_capacity(COMBINATIONS / num_tasks + 1)))
            .collect::<Vec<_>>();

        Deck::default().par_for_each(num_tasks, 5, |task_id, hand| {
            let hand_key = classify(hand).expect("five distinct deck cards classify");
            buffers[task_id].lock().push((hash_key(hand), hand_key.key()));
        });

        let mut rows = Vec::with_capacity(COMBINATIONS);
        for buffer in buffers {
            rows.append(&mut buffer.into_inner());
        }

        info!(
            "classified {} combinations on {num_tasks} tasks in {:.3}s",
            rows.len(),
            now.elapsed().as_secs_f64()
        );

        Self::from_rows(rows)
    }

    /// Sorts the classified combinations by strength and assigns dense
    /// universal ranks, equal-strength combinations share a rank.
    fn from_rows(rows: Vec<(u64, HandKey)>) -> Self {
        let rows = dense_ranks(rows);

        let mut map = AHashMap::with_capacity(rows.len());
        let mut classes = 0;
        for (key, _, rank) in rows {
            map.insert(key, rank);
            classes = classes.max(rank);
        }

        info!("lookup table has {} entries in {classes} classes", map.len());
        Self { map, classes }
    }

    /// The universal rank for a five-card hash key, 1 is the best hand.
    ///
    /// A missing key means the table is corrupt or incomplete and is an
    /// error, never a default score.
    pub fn rank(&self, key: u64) -> Result<u16> {
        self.map
            .get(&key)
            .copied()
            .ok_or_else(|| anyhow!("hash key {key} not in lookup table, corrupt or incomplete"))
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Checks if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of distinct strength classes in the table.
    pub fn classes(&self) -> u16 {
        self.classes
    }

    /// Saves the table to the given path.
    ///
    /// The format is versioned and little-endian: a 4 bytes magic, a u16
    /// version, a u32 entry count, then for each entry the u64 key followed
    /// by the u16 rank. Entries are written in key order so equal tables
    /// produce identical files.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("creating lookup table {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        let mut entries = self.map.iter().map(|(&k, &r)| (k, r)).collect::<Vec<_>>();
        entries.sort_unstable();

        writer.write_all(&MAGIC)?;
        writer.write_u16::<LittleEndian>(VERSION)?;
        writer.write_u32::<LittleEndian>(entries.len() as u32)?;

        for (key, rank) in entries {
            writer.write_u64::<LittleEndian>(key)?;
            writer.write_u16::<LittleEndian>(rank)?;
        }

        writer.flush()?;
        info!("saved lookup table to {}", path.display());

        Ok(())
    }

    /// Loads a table saved with [LookupTable::save].
    ///
    /// Fails on a missing file, an unknown magic or version, or an entry
    /// count that does not match the file size.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let now = Instant::now();

        let file = File::open(path)
            .with_context(|| format!("opening lookup table {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .with_context(|| format!("reading lookup table {}", path.display()))?;
        if magic != MAGIC {
            bail!("{} is not a lookup table file", path.display());
        }

        let version = reader.read_u16::<LittleEndian>()?;
        if version != VERSION {
            bail!("unsupported lookup table version {version}");
        }

        let count = reader.read_u32::<LittleEndian>()? as usize;
        let mut map = AHashMap::with_capacity(count);
        let mut classes = 0;

        for _ in 0..count {
            let key = reader.read_u64::<LittleEndian>()?;
            let rank = reader.read_u16::<LittleEndian>()?;
            map.insert(key, rank);
            classes = classes.max(rank);
        }

        if reader.read(&mut [0u8; 1])? != 0 {
            bail!("trailing bytes in lookup table {}", path.display());
        }

        if map.len() != count {
            bail!("duplicate keys in lookup table {}", path.display());
        }

        info!(
            "loaded {count} entries from {} in {:.3}s",
            path.display(),
            now.elapsed().as_secs_f64()
        );

        Ok(Self { map, classes })
    }
}

/// Writes a human readable export of the table for validation, one line per
/// combination with the key, the category, the subranks, and the universal
/// rank, strongest first.
///
/// This reclassifies all combinations, it is meant for debugging at table
/// build time and is not needed at runtime.
pub fn export_csv<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    let mut rows = Vec::with_capacity(COMBINATIONS);
    Deck::default().for_each(5, |hand| {
        let hand_key = classify(hand).expect("five distinct deck cards classify");
        rows.push((hash_key(hand), hand_key.key()));
    });

    let rows = dense_ranks(rows);

    let file =
        File::create(path).with_context(|| format!("creating csv export {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, &rows)?;

    writer.flush()?;
    info!("exported lookup table csv to {}", path.display());

    Ok(())
}

/// Writes the csv header and one line per ranked combination.
fn write_csv<W: Write>(writer: &mut W, rows: &[(u64, HandKey, u16)]) -> Result<()> {
    writeln!(
        writer,
        "hash_key,category,subrank1,subrank2,subrank3,subrank4,subrank5,universal_rank"
    )?;

    for (key, HandKey(category, subranks), rank) in rows {
        write!(writer, "{key},{category}")?;
        for subrank in subranks {
            write!(writer, ",{subrank}")?;
        }
        writeln!(writer, ",{rank}")?;
    }

    Ok(())
}

/// Sorts rows from strongest to weakest and numbers the distinct strength
/// classes densely from 1.
fn dense_ranks(mut rows: Vec<(u64, HandKey)>) -> Vec<(u64, HandKey, u16)> {
    rows.sort_unstable_by_key(|&(_, hand_key)| hand_key);

    let mut rank = 0u16;
    let mut last = None;
    rows.into_iter()
        .map(|(key, hand_key)| {
            if last != Some(hand_key) {
                rank += 1;
                last = Some(hand_key);
            }

            (key, hand_key, rank)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;
    use riverodds_cards::{Rank, Suit};
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("riverodds-{}-{name}", std::process::id()))
    }

    fn small_table() -> LookupTable {
        let mut map = AHashMap::new();
        map.insert(2 * 3 * 5 * 7 * 11, 1);
        map.insert(2 * 3 * 5 * 7 * 13, 2);
        map.insert(2 * 3 * 5 * 7 * 17, 2);
        LookupTable { map, classes: 2 }
    }

    #[test]
    fn hash_key_injective() {
        // No two distinct five-card combinations share a key.
        let mut keys = AHashSet::with_capacity(COMBINATIONS);
        Deck::default().for_each(5, |hand| {
            keys.insert(hash_key(hand));
        });

        assert_eq!(keys.len(), COMBINATIONS);
    }

    #[test]
    fn lookup_miss() {
        let table = small_table();
        assert_eq!(table.rank(2 * 3 * 5 * 7 * 11).unwrap(), 1);
        assert!(table.rank(19 * 23 * 29 * 31 * 37).is_err());
    }

    #[test]
    fn save_load_round_trip() {
        let path = temp_path("round-trip.bin");
        let table = small_table();

        table.save(&path).unwrap();
        let loaded = LookupTable::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(table, loaded);
        assert_eq!(loaded.classes(), 2);
        assert_eq!(loaded.len(), 3);
    }

    #[test]
    fn load_rejects_bad_files() {
        let path = temp_path("bad.bin");

        // Missing file.
        assert!(LookupTable::load(&path).is_err());

        // Bad magic.
        std::fs::write(&path, b"NOPE\x01\x00\x00\x00\x00\x00").unwrap();
        assert!(LookupTable::load(&path).is_err());

        // Unsupported version.
        std::fs::write(&path, b"RODT\xff\x00\x00\x00\x00\x00").unwrap();
        assert!(LookupTable::load(&path).is_err());

        // Truncated entries.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RODT");
        bytes.write_u16::<LittleEndian>(VERSION).unwrap();
        bytes.write_u32::<LittleEndian>(2).unwrap();
        bytes.write_u64::<LittleEndian>(2 * 3 * 5 * 7 * 11).unwrap();
        bytes.write_u16::<LittleEndian>(1).unwrap();
        std::fs::write(&path, &bytes).unwrap();
        assert!(LookupTable::load(&path).is_err());

        // Trailing bytes.
        bytes.write_u64::<LittleEndian>(2 * 3 * 5 * 7 * 13).unwrap();
        bytes.write_u16::<LittleEndian>(2).unwrap();
        bytes.push(0);
        std::fs::write(&path, &bytes).unwrap();
        assert!(LookupTable::load(&path).is_err());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn dense_rank_groups() {
        let a = HandKey(1, [1, 2, 3, 4, 5]);
        let b = HandKey(3, [2, 2, 2, 2, 5]);
        let c = HandKey(10, [1, 3, 5, 7, 9]);

        let mut rows = dense_ranks(vec![(40, c), (10, a), (30, b), (20, a)]);
        rows.sort_unstable_by_key(|&(key, ..)| key);
        assert_eq!(rows, vec![(10, a, 1), (20, a, 1), (30, b, 2), (40, c, 3)]);
    }

    #[test]
    fn csv_export_format() {
        let royal = [
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Queen, Suit::Spades),
            Card::new(Rank::Jack, Suit::Spades),
            Card::new(Rank::Ten, Suit::Spades),
        ];
        let worst = [
            Card::new(Rank::Deuce, Suit::Spades),
            Card::new(Rank::Trey, Suit::Hearts),
            Card::new(Rank::Four, Suit::Diamonds),
            Card::new(Rank::Five, Suit::Clubs),
            Card::new(Rank::Seven, Suit::Spades),
        ];

        // Rows come in unsorted, the export orders them strongest first.
        let rows = dense_ranks(vec![
            (hash_key(&worst), classify(&worst).unwrap().key()),
            (hash_key(&royal), classify(&royal).unwrap().key()),
        ]);

        let path = temp_path("export.csv");
        let mut writer = BufWriter::new(File::create(&path).unwrap());
        write_csv(&mut writer, &rows).unwrap();
        writer.flush().unwrap();

        let csv = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("hash_key,category,subrank1,subrank2,subrank3,subrank4,subrank5,universal_rank")
        );
        assert_eq!(
            lines.next(),
            Some(format!("{},1,1,2,3,4,5,1", hash_key(&royal)).as_str())
        );
        assert_eq!(
            lines.next(),
            Some(format!("{},10,8,10,11,12,13,2", hash_key(&worst)).as_str())
        );
        assert_eq!(lines.next(), None);
    }

    // This takes a while to run in debug mode as it classifies 2.6M hands.
    #[test]
    #[ignore]
    fn build_full_table() {
        let table = LookupTable::build();

        // Every combination is covered and the distinct strength classes
        // match standard five-card poker.
        assert_eq!(table.len(), COMBINATIONS);
        assert_eq!(table.classes(), CLASSES);

        // The royal flush is the best hand.
        let royal = [
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Queen, Suit::Spades),
            Card::new(Rank::Jack, Suit::Spades),
            Card::new(Rank::Ten, Suit::Spades),
        ];
        assert_eq!(table.rank(hash_key(&royal)).unwrap(), 1);

        // The 2-3-4-5-7 offsuit high card is the worst hand.
        let worst = [
            Card::new(Rank::Deuce, Suit::Spades),
            Card::new(Rank::Trey, Suit::Hearts),
            Card::new(Rank::Four, Suit::Diamonds),
            Card::new(Rank::Five, Suit::Clubs),
            Card::new(Rank::Seven, Suit::Spades),
        ];
        assert_eq!(table.rank(hash_key(&worst)).unwrap(), CLASSES);

        // Rebuilding produces an identical mapping.
        assert_eq!(table, LookupTable::build());
    }

    // This takes a while to run in debug mode as it classifies 2.6M hands.
    #[test]
    #[ignore]
    #[cfg(feature = "parallel")]
    fn par_build_matches_build() {
        assert_eq!(LookupTable::par_build(4), LookupTable::build());
    }
}
