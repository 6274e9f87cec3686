pub mod anagram;
pub mod error;
pub mod utils;

pub use anagram::{
    generate, generate_with_cancel, run_search, CombinationSearcher, ConstraintSet,
    DictionaryEntry, DictionaryIndex, LetterProfile, PartialPolicy, Query, SearchResult,
};
pub use error::EngineError;
