use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::ALPHA_SIZE;

/// Histogram of letter counts over a-z, derived from normalized text.
/// Uppercase input is folded, anything non-alphabetic is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LetterProfile {
    /// Count of each letter, indexed 'a' = 0 .. 'z' = 25
    counts: [u8; ALPHA_SIZE],
    /// Total number of letters across all slots
    total: u32,
}

impl LetterProfile {
    pub fn empty() -> Self {
        Self {
            counts: [0; ALPHA_SIZE],
            total: 0,
        }
    }

    /// Builds a profile from raw text. Case-folds and skips every
    /// character outside a-z. Fails only if one letter overflows the
    /// per-slot count (a 255-repeat seed is not a real query).
    pub fn from_text(text: &str) -> Result<Self, EngineError> {
        let mut counts = [0u8; ALPHA_SIZE];
        let mut total = 0u32;
        for c in text.chars() {
            let c = c.to_ascii_lowercase();
            if !c.is_ascii_lowercase() {
                continue;
            }
            let i = c as usize - 'a' as usize;
            counts[i] = counts[i].checked_add(1).ok_or_else(|| {
                EngineError::invalid_input("seed", format!("letter '{}' occurs more than 255 times", c))
            })?;
            total += 1;
        }
        Ok(Self { counts, total })
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn count(&self, letter: char) -> u8 {
        debug_assert!(letter.is_ascii_lowercase());
        self.counts[letter as usize - 'a' as usize]
    }

    /// True iff every count in `other` fits inside `self`
    pub fn contains(&self, other: &Self) -> bool {
        if other.total > self.total {
            return false;
        }
        for i in 0..ALPHA_SIZE {
            if self.counts[i] < other.counts[i] {
                return false;
            }
        }
        true
    }

    /// Subtraction that doubles as the containment test: `None` when
    /// `other` does not fit. This is the searcher's prune-and-descend step.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if !self.contains(other) {
            return None;
        }
        let mut counts = [0u8; ALPHA_SIZE];
        for i in 0..ALPHA_SIZE {
            counts[i] = self.counts[i] - other.counts[i];
        }
        Some(Self {
            counts,
            total: self.total - other.total,
        })
    }

    /// Strict subtraction per the engine contract: subtracting a profile
    /// that is not contained is an invariant violation, not a soft miss.
    pub fn subtract(&self, other: &Self) -> Result<Self, EngineError> {
        self.checked_sub(other).ok_or_else(|| {
            EngineError::InvalidOperation(format!(
                "subtracting profile [{}] not contained in [{}]",
                other, self
            ))
        })
    }

    /// The sorted-letter signature, e.g. "silent" -> "eilnst".
    /// Distinct anagrams of one multiset share a signature, which is what
    /// the dictionary keys its buckets on.
    pub fn signature(&self) -> Vec<u8> {
        let mut sig = Vec::with_capacity(self.total as usize);
        for i in 0..ALPHA_SIZE {
            for _ in 0..self.counts[i] {
                sig.push(b'a' + i as u8);
            }
        }
        sig
    }
}

impl std::fmt::Display for LetterProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for i in 0..ALPHA_SIZE {
            if self.counts[i] > 0 {
                write!(f, "{}{}", (b'a' + i as u8) as char, self.counts[i])?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_normalizes() {
        let p = LetterProfile::from_text("Hello, World!").unwrap();
        assert_eq!(p.total(), 10);
        assert_eq!(p.count('l'), 3);
        assert_eq!(p.count('o'), 2);
        assert_eq!(p.count('z'), 0);
    }

    #[test]
    fn test_non_letters_ignored() {
        let a = LetterProfile::from_text("it's a trap-42").unwrap();
        let b = LetterProfile::from_text("itsatrap").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty() {
        let p = LetterProfile::from_text("123 !?").unwrap();
        assert!(p.is_empty());
        assert_eq!(p, LetterProfile::empty());
    }

    #[test]
    fn test_contains_and_checked_sub() {
        let seed = LetterProfile::from_text("listen").unwrap();
        let word = LetterProfile::from_text("lit").unwrap();
        assert!(seed.contains(&word));
        assert!(!word.contains(&seed));

        let rest = seed.checked_sub(&word).unwrap();
        assert_eq!(rest, LetterProfile::from_text("sen").unwrap());
        assert!(rest.checked_sub(&seed).is_none());
    }

    #[test]
    fn test_subtract_not_contained_is_error() {
        let a = LetterProfile::from_text("abc").unwrap();
        let b = LetterProfile::from_text("abd").unwrap();
        match a.subtract(&b) {
            Err(EngineError::InvalidOperation(_)) => {}
            other => panic!("expected InvalidOperation, got {:?}", other.map(|p| p.total())),
        }
    }

    #[test]
    fn test_subtract_to_empty() {
        let a = LetterProfile::from_text("silent").unwrap();
        let b = LetterProfile::from_text("listen").unwrap();
        let rest = a.subtract(&b).unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn test_anagram_equality() {
        // multiset identity regardless of letter order
        let a = LetterProfile::from_text("dormitory").unwrap();
        let b = LetterProfile::from_text("dirty room").unwrap();
        assert_eq!(a, b);

        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_signature_sorted() {
        let p = LetterProfile::from_text("silent").unwrap();
        assert_eq!(p.signature(), b"eilnst".to_vec());
    }
}
