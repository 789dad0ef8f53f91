use regex::{Captures, Regex, RegexBuilder};
use tracing::warn;

use crate::glossary::Glossary;
use crate::types::TextEdit;

/// Patterns that are ordinary English and would rewrite normal speech.
pub const PATTERN_DENY_LIST: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "do", "for", "from", "go",
    "has", "have", "he", "her", "his", "i", "if", "in", "into", "is", "it", "its", "me", "my",
    "no", "not", "of", "on", "one", "or", "our", "out", "so", "some", "that", "the", "then",
    "there", "they", "this", "to", "up", "us", "was", "we", "what", "when", "which", "who",
    "will", "with", "you", "your", "add", "code", "data", "file", "files", "get", "make", "run",
    "save", "set", "use", "work", "data set", "get it", "the data",
];

/// Longest single-word pattern that is skipped when it just lower-cases the term.
const SHORT_PATTERN_CHARS: usize = 4;

#[derive(Debug, Clone)]
struct PatternMatcher {
    canonical: String,
    regex: Regex,
}

/// Stage 1: replace glossary misrecognition patterns with their canonical term.
#[derive(Debug, Clone, Default)]
pub struct PatternCorrector {
    matchers: Vec<PatternMatcher>,
}

impl PatternCorrector {
    pub fn new(glossary: &Glossary) -> Self {
        let mut matchers = Vec::new();
        for term in glossary.terms() {
            for pattern in &term.patterns {
                if Self::should_skip(pattern, &term.canonical) {
                    continue;
                }
                if let Some(regex) = Self::compile(pattern) {
                    matchers.push(PatternMatcher {
                        canonical: term.canonical.clone(),
                        regex,
                    });
                }
            }
        }

        Self { matchers }
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Deny-listed patterns, and short single-word patterns that are only the
    /// lower-cased canonical term, are too risky to auto-replace.
    pub fn should_skip(pattern: &str, canonical: &str) -> bool {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return true;
        }
        let lowered = pattern.to_lowercase();
        if PATTERN_DENY_LIST.contains(&lowered.as_str()) {
            return true;
        }

        let single_word = !pattern.contains(char::is_whitespace);
        single_word
            && pattern.chars().count() <= SHORT_PATTERN_CHARS
            && pattern == lowered
            && lowered == canonical.to_lowercase()
    }

    /// Case-insensitive, whole-word matcher. Invalid regex falls back to a literal.
    fn compile(pattern: &str) -> Option<Regex> {
        let build = |source: &str| {
            RegexBuilder::new(&format!(r"\b(?:{})\b", source))
                .case_insensitive(true)
                .build()
        };

        match build(pattern.trim()) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!("Glossary pattern '{}' is not a valid regex ({}), matching literally", pattern, e);
                build(&regex::escape(pattern.trim())).ok()
            }
        }
    }

    pub fn apply(&self, text: &str) -> TextEdit {
        let mut result = text.to_string();
        let mut changes = 0;
        let mut details = Vec::new();

        for matcher in &self.matchers {
            let mut found: Vec<(String, usize)> = Vec::new();
            let replaced = matcher.regex.replace_all(&result, |caps: &Captures| {
                let matched = &caps[0];
                if matched == matcher.canonical {
                    return matched.to_string();
                }
                match found.iter_mut().find(|(m, _)| m == matched) {
                    Some((_, count)) => *count += 1,
                    None => found.push((matched.to_string(), 1)),
                }
                matcher.canonical.clone()
            });
            let replaced = replaced.into_owned();

            for (matched, count) in found {
                changes += count;
                details.push(format!("'{}' → '{}' ({}x)", matched, matcher.canonical, count));
            }
            result = replaced;
        }

        TextEdit {
            text: result,
            changes,
            details,
        }
    }
}
