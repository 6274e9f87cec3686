pub mod constraints;
pub mod dictionary;
pub mod profile;
pub mod results;
pub mod search;

use std::sync::atomic::AtomicBool;

use crate::error::EngineError;

pub use self::constraints::{ConstraintSet, PartialPolicy, Query, MAX_WORDS_CEILING};
pub use self::dictionary::{DictionaryEntry, DictionaryIndex};
pub use self::profile::LetterProfile;
pub use self::results::SearchResult;
pub use self::search::CombinationSearcher;

/// a-z
pub const ALPHA_SIZE: usize = 26;

/// Runs one query against a shared dictionary index: validates the
/// constraints, explores every buildable combination of the seed's
/// letters, and returns the exact anagrams plus the partial dead ends.
pub fn generate(index: &DictionaryIndex, query: &Query) -> Result<SearchResult, EngineError> {
    let constraints = ConstraintSet::build(query)?;
    run_search(index, query, &constraints, None)
}

/// Like [`generate`], but polls `cancel` during the search. A cancelled
/// query is not an error: it returns whatever was accumulated, with
/// `complete` cleared.
pub fn generate_with_cancel(
    index: &DictionaryIndex,
    query: &Query,
    cancel: &AtomicBool,
) -> Result<SearchResult, EngineError> {
    let constraints = ConstraintSet::build(query)?;
    run_search(index, query, &constraints, Some(cancel))
}

/// Lower-level entry point for callers that tweak the constraint set
/// beyond what the wire query carries (repeat mode, partial policy,
/// result caps).
pub fn run_search(
    index: &DictionaryIndex,
    query: &Query,
    constraints: &ConstraintSet,
    cancel: Option<&AtomicBool>,
) -> Result<SearchResult, EngineError> {
    let seed = LetterProfile::from_text(&query.seed)?;
    let mut searcher = CombinationSearcher::new(index, constraints);
    if let Some(flag) = cancel {
        searcher = searcher.with_cancel(flag);
    }
    let outcome = searcher.run(&seed);
    Ok(results::assemble(index, constraints, &outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_end_to_end() {
        let index = DictionaryIndex::parse_counts(
            "tin\t900\nsilent\t500\nles\t800\nenlist\t100\n",
        )
        .unwrap();
        let mut query = Query::new("Listen!");
        query.min_word_length = 3;
        query.max_words = 2;

        let result = generate(&index, &query).unwrap();
        let mut anagrams = result.anagrams;
        anagrams.sort();
        assert_eq!(anagrams, vec!["enlist", "les tin", "silent"]);
    }

    #[test]
    fn test_generate_rejects_bad_constraints() {
        let index = DictionaryIndex::parse_word_list("tin\n").unwrap();
        let mut query = Query::new("listen");
        query.max_words = 0;
        assert!(matches!(
            generate(&index, &query),
            Err(EngineError::InvalidInput { field: "max_words", .. })
        ));
    }

    #[test]
    fn test_generate_with_cancel_marks_incomplete() {
        let index = DictionaryIndex::parse_word_list("tin\nles\n").unwrap();
        let query = Query::new("listen");
        let cancel = AtomicBool::new(true);
        let result = generate_with_cancel(&index, &query, &cancel).unwrap();
        assert!(!result.complete);
    }
}
