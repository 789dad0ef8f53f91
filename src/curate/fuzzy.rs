//! Fuzzy correction of truncated or slightly misheard glossary terms.
//!
//! Similarity is the gestalt (Ratcliff/Obershelp) ratio `2·M / (|a| + |b|)`,
//! where `M` counts characters in recursively found longest common blocks.
//! Unlike edit distance this rewards a long shared prefix, which is what a
//! word cut off by the recogniser still has.

use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::glossary::Glossary;
use crate::types::TextEdit;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.82;

/// Shortest normalized term or candidate considered for fuzzy matching
const MIN_FUZZY_CHARS: usize = 4;

/// Everyday words that sit close to common glossary terms.
pub const FUZZY_DENY_LIST: &[&str] = &[
    "about", "actually", "after", "again", "also", "another", "around", "because", "before",
    "being", "better", "between", "could", "data", "date", "dates", "dating", "default", "delta",
    "different", "doing", "during", "every", "everything", "first", "going", "great", "later",
    "little", "maybe", "other", "people", "point", "really", "right", "should", "something",
    "start", "state", "still", "that", "their", "there", "these", "thing", "things", "think",
    "this", "those", "through", "together", "total", "under", "using", "value", "very", "where",
    "which", "while", "would",
];

/// Suffixes that turn a known term into an intentional variant ("datasets").
pub const VARIANT_SUFFIXES: &[&str] = &[
    "s", "es", "ed", "d", "ing", "er", "ers", "tion", "tions", "ly", "al", "ment", "ments", "ness",
    "able",
];

static CANDIDATE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Za-z]{4,}\b").unwrap());

#[derive(Debug, Clone)]
struct KnownTerm {
    canonical: String,
    normalized: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub canonical: String,
    pub ratio: f64,
    /// The candidate is a literal prefix of the matched term.
    pub prefix: bool,
}

/// Stage 3: correct words that are close to, but not exactly, a glossary term.
#[derive(Debug, Clone)]
pub struct FuzzyCorrector {
    threshold: f64,
    terms: Vec<KnownTerm>,
    known: HashSet<String>,
    variants: HashSet<String>,
}

/// Lower-case and keep only alphanumerics.
pub fn normalize(term: &str) -> String {
    term.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

impl FuzzyCorrector {
    pub fn new(glossary: &Glossary, threshold: f64) -> Self {
        let terms: Vec<KnownTerm> = glossary
            .terms()
            .iter()
            .filter(|term| term.is_single_word())
            .map(|term| KnownTerm {
                canonical: term.canonical.clone(),
                normalized: normalize(&term.canonical),
            })
            .filter(|term| term.normalized.chars().count() >= MIN_FUZZY_CHARS)
            .collect();

        let known: HashSet<String> = glossary.terms().iter().map(|t| normalize(&t.canonical)).collect();
        let variants = terms
            .iter()
            .flat_map(|term| VARIANT_SUFFIXES.iter().map(move |suffix| format!("{}{}", term.normalized, suffix)))
            .collect();

        Self {
            threshold,
            terms,
            known,
            variants,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn is_candidate(&self, normalized: &str) -> bool {
        normalized.chars().count() >= MIN_FUZZY_CHARS
            && !self.known.contains(normalized)
            && !FUZZY_DENY_LIST.contains(&normalized)
            && !self.variants.contains(normalized)
    }

    /// Best-scoring term at or above the threshold. Equal ratios prefer a term
    /// the word is a prefix of.
    pub fn best_match(&self, word: &str) -> Option<FuzzyMatch> {
        let candidate = normalize(word);
        if !self.is_candidate(&candidate) {
            return None;
        }

        let mut best: Option<FuzzyMatch> = None;
        for term in &self.terms {
            let ratio = similarity_ratio(&candidate, &term.normalized);
            let prefix = term.normalized.starts_with(&candidate);
            let better = match &best {
                None => true,
                Some(current) => {
                    ratio > current.ratio + f64::EPSILON
                        || ((ratio - current.ratio).abs() <= f64::EPSILON && prefix && !current.prefix)
                }
            };
            if better {
                best = Some(FuzzyMatch {
                    canonical: term.canonical.clone(),
                    ratio,
                    prefix,
                });
            }
        }

        best.filter(|m| m.ratio >= self.threshold)
    }

    pub fn apply(&self, text: &str) -> TextEdit {
        if self.terms.is_empty() {
            return TextEdit::unchanged(text);
        }

        let mut decisions: HashMap<String, Option<FuzzyMatch>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();

        let result = CANDIDATE_WORD.replace_all(text, |caps: &Captures| {
            let word = &caps[0];
            let decision = decisions
                .entry(word.to_string())
                .or_insert_with(|| self.best_match(word));
            match decision {
                Some(found) => {
                    if !counts.contains_key(word) {
                        order.push(word.to_string());
                    }
                    *counts.entry(word.to_string()).or_insert(0) += 1;
                    found.canonical.clone()
                }
                None => word.to_string(),
            }
        });
        let result = result.into_owned();

        let mut changes = 0;
        let mut details = Vec::new();
        for word in order {
            let count = counts.get(&word).copied().unwrap_or(0);
            if let Some(Some(found)) = decisions.get(&word) {
                changes += count;
                details.push(format!(
                    "'{}' → '{}' (ratio {:.2}{}, {}x)",
                    word,
                    found.canonical,
                    found.ratio,
                    if found.prefix { ", prefix match" } else { "" },
                    count
                ));
            }
        }

        TextEdit {
            text: result,
            changes,
            details,
        }
    }
}

/// Gestalt pattern-matching similarity in `[0, 1]`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_common_block(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_characters(&a[..i], &b[..j]) + matching_characters(&a[i + size..], &b[j + size..])
}

/// Earliest longest common substring, as `(start_a, start_b, len)`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev_row = vec![0usize; b.len() + 1];
    let mut curr_row = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        for j in 0..b.len() {
            curr_row[j + 1] = if a[i] == b[j] { prev_row[j] + 1 } else { 0 };
            let len = curr_row[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::GlossaryTerm;

    fn corrector(terms: &[&str]) -> FuzzyCorrector {
        let glossary = Glossary::from_terms(terms.iter().map(|t| GlossaryTerm::new(t, &[], "tools")));
        FuzzyCorrector::new(&glossary, DEFAULT_FUZZY_THRESHOLD)
    }

    #[test]
    fn test_similarity_ratio() {
        assert!((similarity_ratio("abcd", "abcd") - 1.0).abs() < 1e-9);
        assert!((similarity_ratio("abcd", "wxyz")).abs() < 1e-9);
        assert!((similarity_ratio("", "") - 1.0).abs() < 1e-9);
        // "datal" shares its whole length with "datalad": 2 * 5 / 12
        assert!((similarity_ratio("datal", "datalad") - 10.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_truncated_term_is_corrected_with_prefix_preference() {
        let corrector = corrector(&["DataLad", "Docker"]);
        let found = corrector.best_match("datal").unwrap();
        assert_eq!(found.canonical, "DataLad");
        assert!(found.prefix);
        assert!(found.ratio >= DEFAULT_FUZZY_THRESHOLD);

        let edit = corrector.apply("we use datal every day");
        assert_eq!(edit.text, "we use DataLad every day");
        assert_eq!(edit.changes, 1);
        assert!(edit.details[0].contains("prefix match"));
    }

    #[test]
    fn test_ties_prefer_prefix_terms() {
        // "abcd" scores 2*4/10 against both terms; only one starts with it.
        let corrector = FuzzyCorrector::new(
            &Glossary::from_terms(vec![
                GlossaryTerm::new("xabcdx", &[], "tools"),
                GlossaryTerm::new("abcdxy", &[], "tools"),
            ]),
            0.5,
        );
        let found = corrector.best_match("abcd").unwrap();
        assert_eq!(found.canonical, "abcdxy");
        assert!(found.prefix);
    }

    #[test]
    fn test_known_terms_variants_and_common_words_are_left_alone() {
        let corrector = corrector(&["DataLad", "dataset"]);
        assert!(corrector.best_match("datalad").is_none());
        assert!(corrector.best_match("datasets").is_none());
        assert!(corrector.best_match("data").is_none());
        assert!(corrector.best_match("later").is_none());

        let edit = corrector.apply("Datalad datasets later");
        assert_eq!(edit.text, "Datalad datasets later");
        assert_eq!(edit.changes, 0);
    }

    #[test]
    fn test_short_and_multi_word_terms_are_ignored() {
        let corrector = corrector(&["Git", "Open Neuro"]);
        let edit = corrector.apply("gitt and open nuero");
        assert_eq!(edit.text, "gitt and open nuero");
        assert!(edit.details.is_empty());
    }

    #[test]
    fn test_below_threshold_is_not_corrected() {
        let corrector = corrector(&["DataLad"]);
        assert!(corrector.best_match("ballad").is_none());
    }

    #[test]
    fn test_repeated_word_counts_every_occurrence() {
        let corrector = corrector(&["DataLad"]);
        let edit = corrector.apply("datal and datal");
        assert_eq!(edit.text, "DataLad and DataLad");
        assert_eq!(edit.changes, 2);
        assert_eq!(edit.details.len(), 1);
    }
}
