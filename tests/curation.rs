use capcurate::curate::chunker::chunk_sentence;
use capcurate::curate::corrections::CorrectionMap;
use capcurate::curate::fuzzy::{FuzzyCorrector, DEFAULT_FUZZY_THRESHOLD};
use capcurate::curate::Curator;
use capcurate::glossary::{Glossary, GlossaryTerm};
use capcurate::subtitle::parser::STATIC_CUE_EPSILON;
use capcurate::subtitle::{parse_vtt, render_vtt};
use capcurate::types::{StageName, TimedWord};

fn spaced_words(text: &str, step: f64) -> Vec<TimedWord> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, w)| TimedWord::new(w, i as f64 * step, (i + 1) as f64 * step))
        .collect()
}

fn datalad_glossary() -> Glossary {
    Glossary::from_terms(vec![GlossaryTerm::new("DataLad", &["data lad"], "tools")])
}

#[test]
fn test_misheard_term_and_filler_are_corrected() {
    let words = spaced_words("so uh today we talk about data lad", 0.4);
    let result = Curator::default().curate(&words, &datalad_glossary(), &CorrectionMap::new());

    assert_eq!(result.original_word_count, 8);
    assert!(result.curated_text.contains("DataLad"));
    assert!(!result.curated_text.split_whitespace().any(|w| w == "uh"));
}

#[test]
fn test_truncated_term_prefers_prefix_match() {
    let glossary = Glossary::from_terms(vec![GlossaryTerm::new("DataLad", &[], "tools")]);
    let corrector = FuzzyCorrector::new(&glossary, DEFAULT_FUZZY_THRESHOLD);

    let edit = corrector.apply("datal");
    assert_eq!(edit.text, "DataLad");
    assert_eq!(edit.changes, 1);
    assert!(edit.details[0].contains("prefix match"));

    let result = Curator::default().curate(&spaced_words("datal", 0.5), &glossary, &CorrectionMap::new());
    assert_eq!(result.curated_text, "DataLad");
    let fuzzy = result.stage(StageName::FuzzyCorrection).unwrap();
    assert_eq!(fuzzy.changes, 1);
}

#[test]
fn test_long_sentence_splits_into_two_full_chunks() {
    let sentence: Vec<String> = (1..=24).map(|i| format!("word{}", i)).collect();
    let chunks = chunk_sentence(&sentence.join(" "), 12, 3);

    assert_eq!(chunks.len(), 2);
    for chunk in &chunks {
        assert_eq!(chunk.split_whitespace().count(), 12);
    }
}

#[test]
fn test_empty_document_yields_empty_result() {
    let words = parse_vtt("WEBVTT\n\n");
    let result = Curator::default().curate(&words, &Glossary::new(), &CorrectionMap::new());

    assert_eq!(result.original_word_count, 0);
    assert!(result.segments.is_empty());
    assert_eq!(result.stage_results.len(), 8);
}

#[test]
fn test_segment_boundaries_match_original_timing() {
    let words = spaced_words("One two three. Four five six.", 1.0);
    let result = Curator::default().curate(&words, &Glossary::new(), &CorrectionMap::new());

    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.segments[0].start, 0.0);
    assert_eq!(result.segments[1].end, words[5].end);
}

#[test]
fn test_stage_results_are_fixed_and_ordered() {
    let words = spaced_words("hello there", 0.5);
    let result = Curator::default().curate(&words, &Glossary::new(), &CorrectionMap::new());

    let stages: Vec<&str> = result.stage_results.iter().map(|s| s.stage.as_str()).collect();
    assert_eq!(
        stages,
        vec![
            "pattern_correction",
            "correction_map",
            "fuzzy_correction",
            "filler_removal",
            "artifact_fix",
            "sentence_segmentation",
            "cue_chunking",
            "timestamp_restoration",
        ]
    );
}

#[test]
fn test_rendered_captions_parse_back_to_segment_words() {
    let text = "Welcome to the workshop on reproducible neuroimaging today. \
                We will install DataLad and create a first dataset together with everyone here.";
    let words = spaced_words(text, 0.5);
    let result = Curator::default().curate(&words, &datalad_glossary(), &CorrectionMap::new());
    assert_eq!(result.segments.len(), 3);

    let rendered = render_vtt(&result.segments, true, "en");
    let reparsed = parse_vtt(&rendered);
    let expected: usize = result.segments.iter().map(|s| s.words.len()).sum();
    assert_eq!(reparsed.len(), expected);

    let reparsed_text: Vec<&str> = reparsed.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(reparsed_text.join(" "), result.curated_text);
}

#[test]
fn test_segments_never_overlap() {
    let text = "so um we uh start here. And then we keep going for quite a while without stopping at all \
                because the speaker never pauses. Finally we stop.";
    let words = spaced_words(text, 0.3);
    let result = Curator::default().curate(&words, &Glossary::new(), &CorrectionMap::new());

    assert!(result.segments.len() > 2);
    for pair in result.segments.windows(2) {
        assert!(pair[0].start <= pair[0].end);
        assert!(pair[0].end <= pair[1].start);
    }
    for segment in &result.segments {
        assert_eq!(segment.words.last().map(|w| w.end), Some(segment.end));
    }
}

#[test]
fn test_markup_characters_survive_render_and_parse() {
    let words = spaced_words("we compare a<b and R&D output here", 0.5);
    let result = Curator::default().curate(&words, &Glossary::new(), &CorrectionMap::new());

    for word_timing in [true, false] {
        let rendered = render_vtt(&result.segments, word_timing, "en");
        assert!(rendered.contains("a&lt;b"));
        assert!(rendered.contains("R&amp;D"));

        let reparsed = parse_vtt(&rendered);
        let reparsed_text: Vec<&str> = reparsed.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(reparsed_text.join(" "), result.curated_text);
    }
}

#[test]
fn test_expanding_correction_keeps_cues_visible() {
    let words = spaced_words("intro to zebra", 0.5);
    let corrections = CorrectionMap::from_pairs([("zebra", "zebra. Then we go. And we stop. Now more. Final words")]);
    let result = Curator::default().curate(&words, &Glossary::new(), &corrections);

    assert_eq!(result.segments.len(), 5);
    for segment in &result.segments {
        assert!(segment.end - segment.start > STATIC_CUE_EPSILON, "{:?}", segment);
    }
    for pair in result.segments.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }

    let reparsed = parse_vtt(&render_vtt(&result.segments, true, "en"));
    assert_eq!(reparsed.len(), 13);
}

#[test]
fn test_whitespace_only_separator_does_not_merge_cues() {
    let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nhello\n \n00:00:02.000 --> 00:00:03.000\nworld\n";
    let words = parse_vtt(vtt);

    let texts: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(texts, vec!["hello", "world"]);
    assert_eq!(words[1].start, 2.0);
}
