use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::warn;

use crate::types::TextEdit;

/// Known recogniser truncations as `(pattern, replacement, label)`, applied in order.
const TRUNCATIONS: &[(&str, &str, &str)] = &[
    (
        r"(?i)\b(?:dat|datal|data-l)\s+(save|get|push|clone|create|run|rerun|status|install|drop|update|siblings|diff)\b",
        "datalad $1",
        "truncated datalad command",
    ),
    (r"(?i)\brepro\s+nim\b", "ReproNim", "'repro nim' → 'ReproNim'"),
    (r"(?i)\brepo\s+nim\b", "ReproNim", "'repo nim' → 'ReproNim'"),
];

/// Command phrases that read better quoted in a caption.
pub const COMMAND_PHRASES: &[&str] = &[
    "datalad save",
    "datalad get",
    "datalad push",
    "datalad clone",
    "datalad create",
    "datalad run",
    "datalad rerun",
    "datalad status",
    "datalad install",
    "datalad drop",
    "datalad update",
    "git annex",
    "git commit",
    "git push",
    "git pull",
    "git status",
    "pip install",
];

static BACKTICK_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

#[derive(Debug, Clone)]
struct Rule {
    regex: Regex,
    replacement: String,
    label: String,
}

static TRUNCATION_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    TRUNCATIONS
        .iter()
        .filter_map(|(pattern, replacement, label)| {
            Regex::new(pattern).ok().map(|regex| Rule {
                regex,
                replacement: replacement.to_string(),
                label: label.to_string(),
            })
        })
        .collect()
});

/// Stage 5: repair truncated command tokens, then quote command phrases.
///
/// Quoting assumes truncations are already repaired, so the two passes always
/// run in that order.
#[derive(Debug, Clone)]
pub struct ArtifactFixer {
    commands: Vec<Rule>,
}

impl Default for ArtifactFixer {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl ArtifactFixer {
    /// `extra_commands` are appended to the built-in phrase table.
    pub fn new(extra_commands: &[String]) -> Self {
        let phrases = COMMAND_PHRASES
            .iter()
            .map(|p| p.to_string())
            .chain(extra_commands.iter().map(|p| p.trim().to_string()))
            .filter(|p| !p.is_empty());

        let mut commands = Vec::new();
        for phrase in phrases {
            match Self::phrase_matcher(&phrase) {
                Ok(regex) => commands.push(Rule {
                    regex,
                    label: format!("quoted '{}'", phrase),
                    replacement: phrase,
                }),
                Err(e) => warn!("Skipping command phrase '{}': {}", phrase, e),
            }
        }

        Self { commands }
    }

    fn phrase_matcher(phrase: &str) -> std::result::Result<Regex, regex::Error> {
        let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
        RegexBuilder::new(&format!(r"\b{}\b", words.join(r"\s+")))
            .case_insensitive(true)
            .build()
    }

    pub fn apply(&self, text: &str) -> TextEdit {
        let mut result = text.to_string();
        let mut changes = 0;
        let mut details = Vec::new();
        let mut record = |label: &str, count: usize| {
            if count > 0 {
                changes += count;
                details.push(format!("{} ({}x)", label, count));
            }
        };

        for rule in TRUNCATION_RULES.iter() {
            let count = rule.regex.find_iter(&result).count();
            if count > 0 {
                result = rule.regex.replace_all(&result, rule.replacement.as_str()).into_owned();
            }
            record(&rule.label, count);
        }

        let count = BACKTICK_SPAN.find_iter(&result).count();
        if count > 0 {
            result = BACKTICK_SPAN.replace_all(&result, "'$1'").into_owned();
        }
        record("backticks → single quotes", count);

        for rule in &self.commands {
            let (quoted, count) = quote_unquoted(&result, &rule.regex, &rule.replacement);
            result = quoted;
            record(&rule.label, count);
        }

        TextEdit {
            text: result,
            changes,
            details,
        }
    }
}

/// Wrap each match in single quotes unless it already touches a quote.
fn quote_unquoted(text: &str, regex: &Regex, replacement: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;

    for m in regex.find_iter(text) {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        if before == Some('\'') || after == Some('\'') {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push('\'');
        out.push_str(replacement);
        out.push('\'');
        last = m.end();
        count += 1;
    }
    out.push_str(&text[last..]);

    (out, count)
}
