use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use super::constraints::{ConstraintSet, PartialPolicy};
use super::dictionary::DictionaryIndex;
use super::profile::LetterProfile;
use super::results::{Combination, SearchOutcome};

/// Depth-bounded backtracking search over the candidate pool.
///
/// Candidates are visited in ascending rank with a non-decreasing index
/// threaded through the recursion: a combination is only ever built in
/// one order, which enumerates word *sets* without a permutation-dedup
/// pass. Letter-count pruning runs before any descent. Because first-word
/// choices are fully independent under that index rule, the top level
/// fans out across the rayon pool; everything below it is synchronous.
pub struct CombinationSearcher<'a> {
    index: &'a DictionaryIndex,
    constraints: &'a ConstraintSet,
    /// Frequency-filtered entry ids, ascending
    pool: Vec<u32>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> CombinationSearcher<'a> {
    pub fn new(index: &'a DictionaryIndex, constraints: &'a ConstraintSet) -> Self {
        let pool = index.candidates(constraints);
        Self {
            index,
            constraints,
            pool,
            cancel: None,
        }
    }

    /// Installs a cooperative cancellation flag, polled once per
    /// candidate-loop iteration.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn run(&self, seed: &LetterProfile) -> SearchOutcome {
        let mut outcome = SearchOutcome {
            complete: true,
            ..Default::default()
        };
        if seed.is_empty() {
            return outcome;
        }
        tracing::debug!(
            pool = self.pool.len(),
            seed_letters = seed.total(),
            max_words = self.constraints.max_words,
            "starting combination search"
        );

        let branches: Vec<SearchOutcome> = (0..self.pool.len())
            .into_par_iter()
            .map(|i| self.run_branch(seed, i))
            .collect();

        for branch in branches {
            outcome.exact.extend(branch.exact);
            outcome.partial.extend(branch.partial);
            outcome.complete &= branch.complete;
        }
        tracing::debug!(
            exact = outcome.exact.len(),
            partial = outcome.partial.len(),
            complete = outcome.complete,
            "combination search finished"
        );
        outcome
    }

    /// One top-level branch: the combination tree rooted at pool position `i`.
    fn run_branch(&self, seed: &LetterProfile, i: usize) -> SearchOutcome {
        let mut acc = SearchOutcome {
            complete: true,
            ..Default::default()
        };
        if self.cancelled() {
            acc.complete = false;
            return acc;
        }
        let id = self.pool[i];
        let entry = self.index.entry(id);
        if let Some(rest) = seed.checked_sub(&entry.profile) {
            let mut chosen = vec![id];
            let start = if self.constraints.allow_repeats { i } else { i + 1 };
            self.explore(&rest, &mut chosen, start, &mut acc);
        }
        acc
    }

    fn cancelled(&self) -> bool {
        self.cancel.map_or(false, |c| c.load(Ordering::Relaxed))
    }

    fn required_ok(&self, chosen: &[u32]) -> bool {
        self.constraints
            .required_satisfied(chosen.iter().map(|&id| self.index.entry(id).word.as_str()))
    }

    /// A dead-ended path is only a maximal combination if nothing in the
    /// pool fits its remainder. The caller's loop already exhausted
    /// positions at or past `start`; extensions by earlier candidates
    /// exist, but they are owned by other branches, so their presence
    /// just means this multiset is not maximal.
    fn is_maximal(&self, remaining: &LetterProfile, chosen: &[u32], start: usize) -> bool {
        for i in 0..start.min(self.pool.len()) {
            let id = self.pool[i];
            if !self.constraints.allow_repeats && chosen.contains(&id) {
                continue;
            }
            if remaining.contains(&self.index.entry(id).profile) {
                return false;
            }
        }
        true
    }

    fn record_partial(
        &self,
        remaining: &LetterProfile,
        chosen: &[u32],
        acc: &mut SearchOutcome,
    ) {
        if chosen.is_empty() || self.constraints.partials != PartialPolicy::MaximalDeadEnds {
            return;
        }
        // a dead end can never pick up a missing required token
        if !self.required_ok(chosen) {
            return;
        }
        acc.partial.push(Combination {
            entries: chosen.to_vec(),
            remaining: *remaining,
        });
    }

    fn explore(
        &self,
        remaining: &LetterProfile,
        chosen: &mut Vec<u32>,
        start: usize,
        acc: &mut SearchOutcome,
    ) {
        if remaining.is_empty() {
            // seed exhausted; an exact match is never extended further
            if self.required_ok(chosen) {
                acc.exact.push(Combination {
                    entries: chosen.clone(),
                    remaining: *remaining,
                });
            }
            return;
        }
        if chosen.len() == self.constraints.max_words {
            self.record_partial(remaining, chosen, acc);
            return;
        }

        // Exact-only queries resolve the final slot by signature lookup:
        // only a word consuming the whole remainder can finish, and those
        // words are exactly the remainder's bucket.
        if self.constraints.partials == PartialPolicy::None
            && chosen.len() + 1 == self.constraints.max_words
        {
            for &id in self.index.anagrams_of(remaining) {
                let pos = match self.pool.binary_search(&id) {
                    Ok(pos) => pos,
                    Err(_) => continue,
                };
                if pos < start {
                    continue;
                }
                chosen.push(id);
                if self.required_ok(chosen) {
                    acc.exact.push(Combination {
                        entries: chosen.clone(),
                        remaining: LetterProfile::empty(),
                    });
                }
                chosen.pop();
            }
            return;
        }

        let mut extended = false;
        for i in start..self.pool.len() {
            if self.cancelled() {
                acc.complete = false;
                return;
            }
            let id = self.pool[i];
            let entry = self.index.entry(id);
            let rest = match remaining.checked_sub(&entry.profile) {
                Some(rest) => rest,
                None => continue,
            };
            // normally filtered out of the pool already
            if self.constraints.excluded.contains(&entry.word) {
                continue;
            }
            // leftovers too short for any word cannot reach an exact match
            if self.constraints.partials == PartialPolicy::None
                && !rest.is_empty()
                && (rest.total() as usize) < self.constraints.min_word_length
            {
                continue;
            }
            extended = true;
            chosen.push(id);
            let next = if self.constraints.allow_repeats { i } else { i + 1 };
            self.explore(&rest, chosen, next, acc);
            chosen.pop();
        }

        if !extended && self.is_maximal(remaining, chosen, start) {
            self.record_partial(remaining, chosen, acc);
        }
    }
}
