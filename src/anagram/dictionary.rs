use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use fst::{Map, MapBuilder};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::utils::serialization;

use super::constraints::ConstraintSet;
use super::profile::LetterProfile;

/// A normalized dictionary word with its frequency rank (lower = more
/// common) and precomputed letter profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    pub rank: u32,
    pub profile: LetterProfile,
}

/// The full word table, built once and shared read-only by every query.
///
/// Entries are sorted ascending by rank with a lexical tie-break, so the
/// top-N view requested per query is a cheap prefix slice. On top of the
/// flat table sits a signature map: each distinct sorted-letter signature
/// points at the bucket of entry ids sharing that letter multiset, which
/// resolves "which words consume exactly these letters" in one lookup.
pub struct DictionaryIndex {
    entries: Vec<DictionaryEntry>,
    /// sorted-letter signature -> index into `buckets`
    signatures: Map<Vec<u8>>,
    /// entry ids per signature, ascending by rank
    buckets: Vec<Vec<u32>>,
}

/// Lowercases and vets a raw dictionary token. Words with any
/// non-ASCII-alphabetic character are dropped rather than repaired.
fn normalize_word(raw: &str) -> Option<String> {
    let word = raw.trim().to_ascii_lowercase();
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_lowercase()) {
        return None;
    }
    Some(word)
}

impl DictionaryIndex {
    /// Builds the index from `(word, score)` pairs where a larger score
    /// means a more common word. Ranks are assigned from the score order.
    pub fn from_scored<I>(scored: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let mut words: Vec<(String, u64)> = scored
            .into_iter()
            .filter_map(|(w, score)| normalize_word(&w).map(|w| (w, score)))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self::from_ordered(words.into_iter().map(|(w, _)| w))
    }

    /// Builds the index from words already in frequency order, most
    /// common first. Line order becomes rank order.
    pub fn from_ordered<I>(words: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for word in words {
            let word = match normalize_word(&word) {
                Some(w) => w,
                None => continue,
            };
            if !seen.insert(word.clone()) {
                continue;
            }
            // a word too long to profile can never fit a seed we accept
            let profile = match LetterProfile::from_text(&word) {
                Ok(p) => p,
                Err(_) => continue,
            };
            entries.push(DictionaryEntry {
                rank: entries.len() as u32,
                word,
                profile,
            });
        }
        Self::from_entries(entries)
    }

    /// Core constructor: sorts the entry table and derives the signature
    /// buckets and their FST.
    pub fn from_entries(mut entries: Vec<DictionaryEntry>) -> Result<Self, EngineError> {
        entries.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.word.cmp(&b.word)));

        let mut by_sig: BTreeMap<Vec<u8>, Vec<u32>> = BTreeMap::new();
        for (id, entry) in entries.iter().enumerate() {
            by_sig
                .entry(entry.profile.signature())
                .or_default()
                .push(id as u32);
        }

        // BTreeMap iterates keys in sorted order, which is what the
        // builder requires
        let mut builder = MapBuilder::memory();
        let mut buckets = Vec::with_capacity(by_sig.len());
        for (sig, ids) in by_sig {
            builder.insert(sig, buckets.len() as u64)?;
            buckets.push(ids);
        }
        let signatures = builder.into_map();

        tracing::info!(
            words = entries.len(),
            signatures = buckets.len(),
            "dictionary index built"
        );

        Ok(Self {
            entries,
            signatures,
            buckets,
        })
    }

    /// Parses `word<TAB>score` lines. Malformed lines are skipped.
    pub fn parse_counts(contents: &str) -> Result<Self, EngineError> {
        let scored = contents.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let (word, score) = line.split_once('\t')?;
            let score = score.trim().parse::<u64>().ok()?;
            Some((word.to_string(), score))
        });
        Self::from_scored(scored)
    }

    /// Parses a plain word list, one word per line, most common first.
    pub fn parse_word_list(contents: &str) -> Result<Self, EngineError> {
        Self::from_ordered(contents.lines().map(str::to_string))
    }

    /// Reads a dictionary file, picking the format by probing for a tab.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        if contents.lines().next().map_or(false, |l| l.contains('\t')) {
            Self::parse_counts(&contents)
        } else {
            Self::parse_word_list(&contents)
        }
    }

    /// Writes the prepared entry table to a compact binary snapshot.
    /// The signature structures are derived data and are rebuilt on load.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        serialization::save_to_disk(&self.entries, path)
    }

    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let entries: Vec<DictionaryEntry> = serialization::load_from_disk(path)?;
        Self::from_entries(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: u32) -> &DictionaryEntry {
        &self.entries[id as usize]
    }

    /// The `min(n, total)` most common entries.
    pub fn top_n(&self, n: usize) -> &[DictionaryEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Entry ids, in rank order, of every word admissible under the
    /// per-word constraints: inside the frequency cutoff, long enough,
    /// and not excluded. Required tokens are a combination-level
    /// constraint and never prune the pool here.
    pub fn candidates(&self, constraints: &ConstraintSet) -> Vec<u32> {
        let limit = constraints.top_n.min(self.entries.len());
        (0..limit as u32)
            .filter(|&id| {
                let entry = &self.entries[id as usize];
                entry.word.len() >= constraints.min_word_length
                    && !constraints.excluded.contains(&entry.word)
            })
            .collect()
    }

    /// Ids of every word whose letters are exactly `profile`.
    pub fn anagrams_of(&self, profile: &LetterProfile) -> &[u32] {
        match self.signatures.get(profile.signature()) {
            Some(bucket) => &self.buckets[bucket as usize],
            None => &[],
        }
    }
}
