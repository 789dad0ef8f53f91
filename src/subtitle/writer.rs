use std::path::Path;
use tokio::fs;
use tracing::info;

use super::{escape_cue_text, format_vtt_time};
use crate::error::Result;
use crate::types::{CurationResult, Segment};

/// Generate a WebVTT file from a curation result
pub async fn write_vtt<P: AsRef<Path>>(
    result: &CurationResult,
    output_path: P,
    word_timing: bool,
    language: &str,
) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Writing curated captions: {}", output_path.display());

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let content = render_vtt(&result.segments, word_timing, language);
    fs::write(output_path, content).await?;

    info!("Wrote {} cues to {}", result.segments.len(), output_path.display());
    Ok(())
}

/// Render curated segments as WebVTT.
///
/// With `word_timing` each cue re-encodes its per-word timing as karaoke tags;
/// otherwise the cue body is the plain segment text. `&`, `<` and `>` are
/// escaped either way.
pub fn render_vtt(segments: &[Segment], word_timing: bool, language: &str) -> String {
    let mut vtt = format!("WEBVTT\nKind: captions\nLanguage: {}\n\n", language);

    for segment in segments {
        let body = if word_timing && !segment.words.is_empty() {
            karaoke_line(segment)
        } else {
            escape_cue_text(segment.text.trim())
        };

        vtt.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_vtt_time(segment.start),
            format_vtt_time(segment.end),
            body
        ));
    }

    vtt
}

fn karaoke_line(segment: &Segment) -> String {
    let mut words = segment.words.iter();
    let mut line = match words.next() {
        Some(first) => escape_cue_text(&first.word),
        None => return String::new(),
    };
    for word in words {
        line.push_str(&format!("<{}><c> {}</c>", format_vtt_time(word.start), escape_cue_text(&word.word)));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SegmentWord;

    fn segment() -> Segment {
        Segment {
            text: "DataLad saves data".to_string(),
            start: 1.0,
            end: 2.5,
            words: vec![
                SegmentWord { word: "DataLad".to_string(), start: 1.0, end: 1.6 },
                SegmentWord { word: "saves".to_string(), start: 1.6, end: 2.0 },
                SegmentWord { word: "data".to_string(), start: 2.0, end: 2.5 },
            ],
        }
    }

    #[test]
    fn test_render_karaoke_cue() {
        let vtt = render_vtt(&[segment()], true, "en");
        assert!(vtt.starts_with("WEBVTT\nKind: captions\nLanguage: en\n\n"));
        assert!(vtt.contains("00:00:01.000 --> 00:00:02.500\n"));
        assert!(vtt.contains("DataLad<00:00:01.600><c> saves</c><00:00:02.000><c> data</c>\n"));
    }

    #[test]
    fn test_render_plain_cue() {
        let vtt = render_vtt(&[segment()], false, "de");
        assert!(vtt.contains("Language: de"));
        assert!(vtt.contains("00:00:01.000 --> 00:00:02.500\nDataLad saves data\n\n"));
        assert!(!vtt.contains("<c>"));
    }

    #[test]
    fn test_markup_characters_are_escaped() {
        let segment = Segment {
            text: "a<b and R&D".to_string(),
            start: 0.0,
            end: 1.5,
            words: vec![
                SegmentWord { word: "a<b".to_string(), start: 0.0, end: 0.5 },
                SegmentWord { word: "and".to_string(), start: 0.5, end: 1.0 },
                SegmentWord { word: "R&D".to_string(), start: 1.0, end: 1.5 },
            ],
        };

        let karaoke = render_vtt(std::slice::from_ref(&segment), true, "en");
        assert!(karaoke.contains("a&lt;b<00:00:00.500><c> and</c><00:00:01.000><c> R&amp;D</c>"));
        assert!(!karaoke.contains("<b"));

        let plain = render_vtt(&[segment], false, "en");
        assert!(plain.contains("\na&lt;b and R&amp;D\n"));
    }

    #[test]
    fn test_render_without_segments_is_header_only() {
        assert_eq!(render_vtt(&[], true, "en"), "WEBVTT\nKind: captions\nLanguage: en\n\n");
    }

    #[tokio::test]
    async fn test_write_vtt_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.vtt");
        let result = CurationResult {
            original_word_count: 3,
            curated_text: "DataLad saves data".to_string(),
            segments: vec![segment()],
            stage_results: Vec::new(),
            curated_at: "2024-01-01T00:00:00Z".to_string(),
        };

        write_vtt(&result, &path, true, "en").await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<c> saves</c>"));
    }
}
