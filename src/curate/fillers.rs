use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::types::TextEdit;

/// Hesitation sounds and the spellings recognisers commonly give them.
pub const FILLER_WORDS: &[&str] = &[
    "um", "umm", "ummm", "uh", "uhh", "uhm", "uhmm", "erm", "er", "hmm", "hm", "mm", "ah", "eh",
];

static FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})\b,?", FILLER_WORDS.join("|"))).unwrap()
});
static SPACE_BEFORE_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+,").unwrap());
static REPEATED_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(?:\s*,)+").unwrap());
static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Stage 4: drop filler tokens as whole words and tidy the spacing they leave.
pub fn remove_fillers(text: &str) -> TextEdit {
    let mut counts: Vec<(String, usize)> = Vec::new();

    let stripped = FILLER.replace_all(text, |caps: &Captures| {
        let filler = caps[0].trim_end_matches(',').to_lowercase();
        match counts.iter_mut().find(|(f, _)| *f == filler) {
            Some((_, count)) => *count += 1,
            None => counts.push((filler, 1)),
        }
        ""
    });

    let cleaned = SPACE_BEFORE_COMMA.replace_all(&stripped, ",");
    let cleaned = REPEATED_COMMA.replace_all(&cleaned, ",");
    let cleaned = MULTI_SPACE.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim().trim_start_matches(',').trim_start();

    TextEdit {
        text: cleaned.to_string(),
        changes: counts.iter().map(|(_, count)| count).sum(),
        details: counts
            .iter()
            .map(|(filler, count)| format!("'{}' removed ({}x)", filler, count))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_fillers_as_whole_words() {
        let edit = remove_fillers("so uh today we um talk about data");
        assert_eq!(edit.text, "so today we talk about data");
        assert_eq!(edit.changes, 2);
        assert_eq!(edit.details.len(), 2);
    }

    #[test]
    fn test_does_not_touch_words_containing_fillers() {
        let edit = remove_fillers("umbrella summer ahead uhura");
        assert_eq!(edit.text, "umbrella summer ahead uhura");
        assert_eq!(edit.changes, 0);
    }

    #[test]
    fn test_tidies_commas_left_behind() {
        let edit = remove_fillers("Uh, so, um, we start");
        assert_eq!(edit.text, "so, we start");
        assert_eq!(edit.changes, 2);

        let edit = remove_fillers("right , hmm , okay");
        assert_eq!(edit.text, "right, okay");
    }

    #[test]
    fn test_counts_repeats_per_filler() {
        let edit = remove_fillers("uh uh UH fine");
        assert_eq!(edit.text, "fine");
        assert_eq!(edit.changes, 3);
        assert_eq!(edit.details, vec!["'uh' removed (3x)".to_string()]);
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let first = remove_fillers("um so, uh, erm we begin hmm now");
        let second = remove_fillers(&first.text);
        assert_eq!(second.changes, 0);
        assert_eq!(second.text, first.text);
    }
}
