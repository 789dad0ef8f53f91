//! Stage 8: put corrected cues back on the original timeline.
//!
//! Segment timing is a proportional remapping, not an alignment: every cue
//! consumes `words × (anchors / corrected words)` positions of the anchor
//! sequence. A position that falls inside an anchor is interpolated across
//! that anchor's span. Word timing then divides each segment by character
//! weight.

use crate::types::{Segment, SegmentWord, TimedWord};

const INDEX_EPSILON: f64 = 1e-9;

/// Map each cue onto a time range of the anchor words.
pub fn restore_segment_timing(cues: &[String], anchors: &[TimedWord]) -> Vec<Segment> {
    let corrected: usize = cues.iter().map(|c| c.split_whitespace().count()).sum();
    if cues.is_empty() || corrected == 0 {
        return Vec::new();
    }

    if anchors.is_empty() {
        return cues
            .iter()
            .filter(|cue| !cue.trim().is_empty())
            .map(|cue| Segment {
                text: cue.trim().to_string(),
                start: 0.0,
                end: 0.0,
                words: Vec::new(),
            })
            .collect();
    }

    let ratio = anchors.len() as f64 / corrected as f64;
    let mut segments: Vec<Segment> = Vec::with_capacity(cues.len());
    let mut position = 0.0_f64;

    for cue in cues {
        let count = cue.split_whitespace().count();
        if count == 0 {
            continue;
        }

        let begin = position;
        position += count as f64 * ratio;

        let previous_start = segments.last().map_or(0.0, |s| s.start);
        let start = position_time(anchors, begin, false).max(previous_start);
        let end = position_time(anchors, position, true).max(start);

        segments.push(Segment {
            text: cue.trim().to_string(),
            start,
            end,
            words: Vec::new(),
        });
    }

    // Abut rather than overlap.
    for i in 1..segments.len() {
        let next_start = segments[i].start;
        let current = &mut segments[i - 1];
        current.end = current.end.min(next_start).max(current.start);
    }

    segments
}

/// Time at a fractional `position` along the anchor sequence.
///
/// Whole positions sit on word boundaries: an end takes the end of the word
/// before it, a start takes the start of the word after it. Anything between
/// is interpolated linearly within the word it falls in. `anchors` must not
/// be empty.
fn position_time(anchors: &[TimedWord], position: f64, is_end: bool) -> f64 {
    let count = anchors.len();
    let position = position.clamp(0.0, count as f64);
    let nearest = position.round();

    if (position - nearest).abs() < INDEX_EPSILON {
        let boundary = nearest as usize;
        return match (is_end, boundary) {
            (true, 0) => anchors[0].start,
            (true, k) => anchors[k - 1].end,
            (false, k) if k >= count => anchors[count - 1].end,
            (false, k) => anchors[k].start,
        };
    }

    let index = (position.floor() as usize).min(count - 1);
    let anchor = &anchors[index];
    anchor.start + (position - index as f64) * (anchor.end - anchor.start)
}

/// Divide `[start, end)` over the words of `text`, weighting each word by
/// its character count plus one. The last word always ends exactly at `end`.
pub fn word_timing(text: &str, start: f64, end: f64) -> Vec<SegmentWord> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let weights: Vec<f64> = words.iter().map(|w| (w.chars().count() + 1) as f64).collect();
    let total: f64 = weights.iter().sum();
    let duration = (end - start).max(0.0);

    let mut cursor = start;
    let mut timed = Vec::with_capacity(words.len());
    for (i, (word, weight)) in words.iter().zip(&weights).enumerate() {
        let word_end = if i + 1 == words.len() {
            end.max(start)
        } else {
            cursor + duration * weight / total
        };
        timed.push(SegmentWord {
            word: word.to_string(),
            start: cursor,
            end: word_end,
        });
        cursor = word_end;
    }
    timed
}

pub fn assign_word_timing(segment: &mut Segment) {
    segment.words = word_timing(&segment.text, segment.start, segment.end);
}
