use std::collections::HashSet;

use serde::Serialize;

use super::constraints::ConstraintSet;
use super::dictionary::DictionaryIndex;
use super::profile::LetterProfile;

/// One candidate phrase, alive only between discovery and assembly:
/// entry ids in the order the search chose them, plus the seed letters
/// still unused after subtracting every chosen word.
#[derive(Debug, Clone)]
pub struct Combination {
    pub entries: Vec<u32>,
    pub remaining: LetterProfile,
}

/// Raw search output before assembly. `complete` is false when the
/// query was cancelled mid-search and the collections hold whatever had
/// been found up to that point.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub exact: Vec<Combination>,
    pub partial: Vec<Combination>,
    pub complete: bool,
}

/// The two output collections, formatted for the caller. Word order
/// inside a combination is lexical; collection order is engine order,
/// any presentation sort is the caller's business.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub anagrams: Vec<String>,
    pub partials: Vec<String>,
    pub complete: bool,
}

/// Formats and dedupes one collection. Multiset-identical combinations
/// cannot be produced twice under the non-decreasing-index rule, but the
/// gate here does not rely on that. The required-token filter is
/// re-applied for the same reason.
fn assemble_collection(
    index: &DictionaryIndex,
    constraints: &ConstraintSet,
    combinations: &[Combination],
) -> Vec<String> {
    let mut seen: HashSet<Vec<u32>> = HashSet::new();
    let mut formatted = Vec::new();
    for combination in combinations {
        if let Some(cap) = constraints.max_results {
            if formatted.len() >= cap {
                tracing::debug!(cap, "result cap reached, dropping the tail");
                break;
            }
        }
        let mut ids = combination.entries.clone();
        ids.sort_unstable();
        if !seen.insert(ids.clone()) {
            continue;
        }
        let words = ids.iter().map(|&id| index.entry(id).word.as_str());
        if !constraints.required_satisfied(words.clone()) {
            continue;
        }
        let mut words: Vec<&str> = words.collect();
        words.sort_unstable();
        formatted.push(words.join(" "));
    }
    formatted
}

pub fn assemble(
    index: &DictionaryIndex,
    constraints: &ConstraintSet,
    outcome: &SearchOutcome,
) -> SearchResult {
    SearchResult {
        anagrams: assemble_collection(index, constraints, &outcome.exact),
        partials: assemble_collection(index, constraints, &outcome.partial),
        complete: outcome.complete,
    }
}
