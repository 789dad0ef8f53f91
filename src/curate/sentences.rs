use regex::Regex;
use std::sync::LazyLock;

/// Units longer than this many characters are split again at connectives.
pub const LONG_SENTENCE_CHARS: usize = 300;

const SPEAKER_MARKERS: &[&str] = &["&gt;&gt;", ">>"];

/// Literal escapes seen in caption text. `&amp;` goes last so it cannot
/// produce a new entity.
const ESCAPES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", " "),
    ("\\n", " "),
    ("&amp;", "&"),
];

static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+[A-Z]").unwrap());
static CONNECTIVE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[,.]\s+(so|and|but|now|then|because|however|also)\b").unwrap()
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentenceSplit {
    pub sentences: Vec<String>,
    /// Boundaries introduced, counting connective splits.
    pub changes: usize,
    pub details: Vec<String>,
}

/// Replace speaker-change markers and decode escapes, collapsing whitespace.
pub fn normalize_text(text: &str) -> String {
    let mut result = text.to_string();
    for marker in SPEAKER_MARKERS {
        result = result.replace(marker, " ");
    }
    for (escaped, plain) in ESCAPES {
        result = result.replace(escaped, plain);
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stage 6: split flat text into sentence units.
pub fn segment_sentences(text: &str) -> SentenceSplit {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return SentenceSplit::default();
    }

    let mut sentences = Vec::new();
    let mut long_splits = 0;
    for unit in split_at_boundaries(&normalized) {
        if unit.chars().count() > LONG_SENTENCE_CHARS {
            let parts = split_at_connectives(&unit);
            long_splits += parts.len().saturating_sub(1);
            sentences.extend(parts);
        } else {
            sentences.push(unit);
        }
    }

    let mut details = vec![format!("{} sentences", sentences.len())];
    if long_splits > 0 {
        details.push(format!("long sentences split at connectives ({}x)", long_splits));
    }

    SentenceSplit {
        changes: sentences.len().saturating_sub(1),
        sentences,
        details,
    }
}

/// Split after terminal punctuation that is followed by a capitalised word.
fn split_at_boundaries(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BOUNDARY.find_iter(text) {
        // punctuation and capital are both single-byte
        units.push(text[start..m.start() + 1].trim().to_string());
        start = m.end() - 1;
    }
    units.push(text[start..].trim().to_string());
    units.retain(|u| !u.is_empty());
    units
}

fn split_at_connectives(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    for caps in CONNECTIVE_BOUNDARY.captures_iter(text) {
        let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        parts.push(text[start..whole.start() + 1].trim().to_string());
        start = word.start();
    }
    parts.push(text[start..].trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}
