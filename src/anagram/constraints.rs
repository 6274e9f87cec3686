use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Hard ceiling on words per combination. Above this the candidate space
/// explodes past anything a caller can consume.
pub const MAX_WORDS_CEILING: usize = 12;

/// Raw query parameters as the caller hands them over: free-form seed,
/// delimited exclude/include lists, untrusted numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub seed: String,
    pub min_word_length: usize,
    pub max_words: usize,
    /// Words that may never appear, comma/whitespace delimited
    pub excludes: String,
    /// Tokens the combination as a whole must contain, comma/whitespace delimited
    pub includes: String,
    /// Candidate pool size: only the `top_n` most common words are searched
    pub top_n: usize,
}

impl Query {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ..Self::default()
        }
    }
}

impl Default for Query {
    fn default() -> Self {
        // mirrors the defaults of the interactive client
        Self {
            seed: String::new(),
            min_word_length: 3,
            max_words: 5,
            excludes: String::new(),
            includes: String::new(),
            top_n: 200_000,
        }
    }
}

/// What to do with dead-end combinations that leave letters unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialPolicy {
    /// Record maximal dead ends: combinations no candidate can extend
    #[default]
    MaximalDeadEnds,
    /// Exact anagrams only
    None,
}

/// Validated, normalized view of a query. Built once per query before
/// any search work starts; read-only during the search.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    pub min_word_length: usize,
    pub max_words: usize,
    pub top_n: usize,
    /// Case-folded words that may never appear
    pub excluded: HashSet<String>,
    /// Case-folded tokens; each must appear as a substring of some chosen word
    pub required: Vec<String>,
    /// Allow one dictionary word to be used twice in a combination
    pub allow_repeats: bool,
    pub partials: PartialPolicy,
    /// Cap per output collection, unlimited when `None`
    pub max_results: Option<usize>,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self {
            min_word_length: 1,
            max_words: MAX_WORDS_CEILING,
            top_n: usize::MAX,
            excluded: HashSet::new(),
            required: Vec::new(),
            allow_repeats: false,
            partials: PartialPolicy::default(),
            max_results: None,
        }
    }
}

/// Splits a caller-supplied token list on commas and whitespace,
/// case-folds, and drops duplicates while keeping first-seen order.
fn parse_tokens(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    for token in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim().to_ascii_lowercase();
        if token.is_empty() || !seen.insert(token.clone()) {
            continue;
        }
        tokens.push(token);
    }
    tokens
}

impl ConstraintSet {
    /// Validates a raw query. Every violation is reported against the
    /// field that caused it, before any search work begins.
    pub fn build(query: &Query) -> Result<Self, EngineError> {
        if query.min_word_length < 1 {
            return Err(EngineError::invalid_input(
                "min_word_length",
                "must be at least 1",
            ));
        }
        if query.max_words < 1 {
            return Err(EngineError::invalid_input("max_words", "must be at least 1"));
        }
        if query.max_words > MAX_WORDS_CEILING {
            return Err(EngineError::invalid_input(
                "max_words",
                format!("must be at most {}", MAX_WORDS_CEILING),
            ));
        }
        if query.top_n < 1 {
            return Err(EngineError::invalid_input("top_n", "must be at least 1"));
        }

        let excluded: HashSet<String> = parse_tokens(&query.excludes).into_iter().collect();
        let required = parse_tokens(&query.includes);

        if let Some(token) = required.iter().find(|t| excluded.contains(*t)) {
            return Err(EngineError::invalid_input(
                "includes",
                format!("token `{}` is both required and excluded", token),
            ));
        }

        Ok(Self {
            min_word_length: query.min_word_length,
            max_words: query.max_words,
            top_n: query.top_n,
            excluded,
            required,
            ..Self::default()
        })
    }

    pub fn with_allow_repeats(mut self, allow: bool) -> Self {
        self.allow_repeats = allow;
        self
    }

    pub fn with_partial_policy(mut self, policy: PartialPolicy) -> Self {
        self.partials = policy;
        self
    }

    pub fn with_max_results(mut self, cap: usize) -> Self {
        self.max_results = Some(cap);
        self
    }

    /// ALL-of substring semantics: every required token must occur inside
    /// at least one of the combination's words.
    pub fn required_satisfied<'a>(&self, words: impl Iterator<Item = &'a str> + Clone) -> bool {
        self.required
            .iter()
            .all(|token| words.clone().any(|w| w.contains(token.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let constraints = ConstraintSet::build(&Query::new("listen")).unwrap();
        assert_eq!(constraints.min_word_length, 3);
        assert_eq!(constraints.max_words, 5);
        assert!(constraints.excluded.is_empty());
        assert!(constraints.required.is_empty());
        assert!(!constraints.allow_repeats);
    }

    #[test]
    fn test_zero_min_word_length_rejected() {
        let mut query = Query::new("listen");
        query.min_word_length = 0;
        match ConstraintSet::build(&query) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "min_word_length"),
            other => panic!("expected InvalidInput, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_max_words_bounds() {
        let mut query = Query::new("listen");
        query.max_words = 0;
        assert!(ConstraintSet::build(&query).is_err());
        query.max_words = MAX_WORDS_CEILING + 1;
        match ConstraintSet::build(&query) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "max_words"),
            other => panic!("expected InvalidInput, got {:?}", other.map(|_| ())),
        }
        query.max_words = MAX_WORDS_CEILING;
        assert!(ConstraintSet::build(&query).is_ok());
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let mut query = Query::new("listen");
        query.top_n = 0;
        assert!(ConstraintSet::build(&query).is_err());
    }

    #[test]
    fn test_token_parsing() {
        let mut query = Query::new("listen");
        query.excludes = "Cat, dog  cat,BIRD".to_string();
        query.includes = "tin".to_string();
        let constraints = ConstraintSet::build(&query).unwrap();
        assert_eq!(constraints.excluded.len(), 3);
        assert!(constraints.excluded.contains("cat"));
        assert!(constraints.excluded.contains("bird"));
        assert_eq!(constraints.required, vec!["tin"]);
    }

    #[test]
    fn test_contradictory_tokens_rejected() {
        let mut query = Query::new("listen");
        query.excludes = "tin".to_string();
        query.includes = "TIN".to_string();
        match ConstraintSet::build(&query) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "includes"),
            other => panic!("expected InvalidInput, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_required_satisfied_substring() {
        let mut query = Query::new("listen");
        query.includes = "lis, ten".to_string();
        let constraints = ConstraintSet::build(&query).unwrap();

        // both tokens covered across different words
        assert!(constraints.required_satisfied(["list", "tenant"].into_iter()));
        // "lis" missing
        assert!(!constraints.required_satisfied(["tenant"].into_iter()));
        // one word can cover several tokens
        assert!(constraints.required_satisfied(["listens", "glisten"].into_iter()));
    }
}
