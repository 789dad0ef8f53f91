use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tokio::fs;
use tracing::{debug, info};

use super::{parse_vtt_time, unescape_cue_text};
use crate::error::{CurateError, Result};
use crate::types::TimedWord;

/// Cues shorter than this are the "static" repeats emitted between karaoke cues.
pub const STATIC_CUE_EPSILON: f64 = 0.02;

static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*((?:\d+:)?\d{1,2}:\d{2}[.,]\d{3})\s+-->\s+((?:\d+:)?\d{1,2}:\d{2}[.,]\d{3})")
        .unwrap()
});

static WORD_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<((?:\d+:)?\d{1,2}:\d{2}[.,]\d{3})><c>([^<]*)</c>").unwrap()
});

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Read and parse a karaoke-tagged WebVTT file.
pub async fn read_vtt<P: AsRef<Path>>(path: P) -> Result<Vec<TimedWord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CurateError::FileNotFound(path.display().to_string()));
    }

    info!("Reading captions: {}", path.display());
    let content = fs::read_to_string(path).await?;
    let words = parse_vtt(&content);
    info!("Parsed {} words from {}", words.len(), path.display());

    Ok(words)
}

/// Parse a WebVTT document into an ordered, deduplicated word list.
///
/// Word-level timing comes from `<HH:MM:SS.mmm><c> word</c>` runs. The leading
/// word of a tagged line is timed at the cue start. Overlapping cues repeat
/// words, so each word is keyed on its lower-cased text and its start rounded to
/// a tenth of a second, and only the first occurrence of a key is kept.
///
/// Blocks without any tags fall back to spreading their words evenly over the
/// cue, except for lines that only repeat a line of the previous block.
/// Character references (`&amp;`, `&lt;`, `&gt;`, `&nbsp;`) are decoded.
pub fn parse_vtt(content: &str) -> Vec<TimedWord> {
    let content = content.replace("\r\n", "\n");
    let mut words = Vec::new();
    let mut seen: HashSet<(String, i64)> = HashSet::new();
    let mut previous_lines: Vec<String> = Vec::new();

    for lines in split_blocks(&content) {
        let Some(timing_index) = lines.iter().position(|line| TIMING_LINE.is_match(line)) else {
            continue;
        };
        let Some((start, end)) = parse_timing(lines[timing_index]) else {
            debug!("Skipping cue with unreadable timing: {}", lines[timing_index]);
            continue;
        };

        let text_lines: Vec<&str> = lines[timing_index + 1..]
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();
        if text_lines.is_empty() || end - start < STATIC_CUE_EPSILON {
            continue;
        }

        let has_tags = text_lines.iter().any(|line| WORD_TAG.is_match(line));
        let block_words = if has_tags {
            text_lines
                .iter()
                .filter(|line| WORD_TAG.is_match(line))
                .flat_map(|line| parse_tagged_line(line, start, end))
                .collect()
        } else {
            let fresh: Vec<&str> = text_lines
                .iter()
                .filter(|line| !previous_lines.contains(&plain_text(line)))
                .flat_map(|line| line.split_whitespace())
                .collect();
            spread_evenly(&fresh, start, end)
        };

        previous_lines = text_lines.iter().map(|line| plain_text(line)).collect();

        for mut word in block_words {
            word.word = unescape_cue_text(&word.word);
            let key = (word.word.to_lowercase(), (word.start * 10.0).round() as i64);
            if seen.insert(key) {
                words.push(word);
            }
        }
    }

    words
}

/// Group lines into cue blocks. A block ends at an empty line or where a
/// second timing line starts. Whitespace-only lines stay inside a block since
/// rolling captions use them as an empty first row.
fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut has_timing = false;

    for line in content.lines() {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            has_timing = false;
            continue;
        }
        if TIMING_LINE.is_match(line) {
            if has_timing {
                // drop trailing blank rows left over from the previous cue
                while current.last().is_some_and(|l| l.trim().is_empty()) {
                    current.pop();
                }
                blocks.push(std::mem::take(&mut current));
            }
            has_timing = true;
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let caps = TIMING_LINE.captures(line)?;
    let start = parse_vtt_time(caps.get(1)?.as_str())?;
    let end = parse_vtt_time(caps.get(2)?.as_str())?;
    Some((start, end.max(start)))
}

/// Extract the leading word and every tagged word of one karaoke line.
fn parse_tagged_line(line: &str, cue_start: f64, cue_end: f64) -> Vec<TimedWord> {
    let tags: Vec<(f64, &str)> = WORD_TAG
        .captures_iter(line)
        .filter_map(|caps| {
            let time = parse_vtt_time(caps.get(1)?.as_str())?;
            Some((time, caps.get(2)?.as_str()))
        })
        .collect();

    let first_tag = WORD_TAG.find(line).map(|m| m.start()).unwrap_or(line.len());
    let leading_end = tags.first().map(|(time, _)| *time).unwrap_or(cue_end);

    let mut words: Vec<TimedWord> = plain_text(&line[..first_tag])
        .split_whitespace()
        .map(|word| TimedWord::new(word, cue_start, leading_end))
        .collect();

    for (index, (time, text)) in tags.iter().enumerate() {
        let end = tags.get(index + 1).map(|(next, _)| *next).unwrap_or(cue_end);
        for word in text.split_whitespace() {
            words.push(TimedWord::new(word, *time, end));
        }
    }

    words
}

fn spread_evenly(words: &[&str], start: f64, end: f64) -> Vec<TimedWord> {
    if words.is_empty() {
        return Vec::new();
    }
    let step = (end - start) / words.len() as f64;
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let word_end = if i + 1 == words.len() { end } else { start + step * (i + 1) as f64 };
            TimedWord::new(*word, start + step * i as f64, word_end)
        })
        .collect()
}

fn plain_text(line: &str) -> String {
    ANY_TAG
        .replace_all(line, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
