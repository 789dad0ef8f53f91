//! The eight-stage curation pipeline.
//!
//! Stages run in a fixed order, each a pure function of the previous stage's
//! output:
//!
//! 1. glossary pattern correction
//! 2. external correction map
//! 3. fuzzy correction of near-miss terms
//! 4. filler removal
//! 5. artifact and command fixes
//! 6. sentence segmentation
//! 7. cue chunking
//! 8. timestamp restoration (segment timing, then word timing)
//!
//! A `Curator` only holds settings, so one instance can serve any number of
//! concurrent curation calls.

pub mod artifacts;
pub mod chunker;
pub mod corrections;
pub mod fillers;
pub mod fuzzy;
pub mod patterns;
pub mod sentences;
pub mod timing;

use std::path::Path;
use tracing::{debug, info};

use crate::align::WordAligner;
use crate::config::Config;
use crate::error::Result;
use crate::glossary::Glossary;
use crate::types::{CurationResult, Segment, StageName, StageResult, TextEdit, TimedWord};

use artifacts::ArtifactFixer;
use chunker::{DEFAULT_MAX_WORDS, DEFAULT_MIN_WORDS};
use corrections::{apply_corrections, CorrectionMap};
use fuzzy::{FuzzyCorrector, DEFAULT_FUZZY_THRESHOLD};
use patterns::PatternCorrector;

#[derive(Debug, Clone, PartialEq)]
pub struct CuratorSettings {
    pub fuzzy_threshold: f64,
    pub max_words: usize,
    pub min_words: usize,
    pub extra_commands: Vec<String>,
}

impl Default for CuratorSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            max_words: DEFAULT_MAX_WORDS,
            min_words: DEFAULT_MIN_WORDS,
            extra_commands: Vec::new(),
        }
    }
}

impl CuratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fuzzy_threshold: config.curation.fuzzy_threshold,
            max_words: config.curation.max_words,
            min_words: config.curation.min_words,
            extra_commands: config.artifacts.extra_commands.clone(),
        }
    }
}

/// Cues produced by stages 1-7, with the results recorded so far.
struct SegmentedText {
    cues: Vec<String>,
    stage_results: Vec<StageResult>,
}

pub struct Curator {
    settings: CuratorSettings,
    artifact_fixer: ArtifactFixer,
}

impl Default for Curator {
    fn default() -> Self {
        Self::new(CuratorSettings::default())
    }
}

impl Curator {
    pub fn new(settings: CuratorSettings) -> Self {
        let artifact_fixer = ArtifactFixer::new(&settings.extra_commands);
        Self {
            settings,
            artifact_fixer,
        }
    }

    pub fn settings(&self) -> &CuratorSettings {
        &self.settings
    }

    /// Run all eight stages, timing cues proportionally from `words`.
    pub fn curate(
        &self,
        words: &[TimedWord],
        glossary: &Glossary,
        corrections: &CorrectionMap,
    ) -> CurationResult {
        let segmented = self.segment_text(words, glossary, corrections);
        self.finish(words.len(), segmented, words)
    }

    /// Like [`Curator::curate`], but segment timing is anchored on words
    /// measured by `aligner` against the audio. Aligner failure is returned.
    pub async fn curate_aligned(
        &self,
        words: &[TimedWord],
        glossary: &Glossary,
        corrections: &CorrectionMap,
        aligner: &dyn WordAligner,
        audio_path: &Path,
    ) -> Result<CurationResult> {
        let segmented = self.segment_text(words, glossary, corrections);
        if segmented.cues.is_empty() {
            return Ok(self.finish(words.len(), segmented, &[]));
        }

        let text = segmented.cues.join(" ");
        info!("Requesting alignment from {}", aligner.name());
        let anchors = aligner.align(audio_path, &text).await?;
        debug!("Aligned {} words for {} corrected words", anchors.len(), text.split_whitespace().count());

        Ok(self.finish(words.len(), segmented, &anchors))
    }

    /// Stages 1-7.
    fn segment_text(
        &self,
        words: &[TimedWord],
        glossary: &Glossary,
        corrections: &CorrectionMap,
    ) -> SegmentedText {
        let mut stage_results = Vec::with_capacity(StageName::ALL.len());
        let mut record = |stage: StageName, edit: TextEdit| -> String {
            debug!("{}: {} changes", stage, edit.changes);
            stage_results.push(StageResult::new(stage, edit.changes, edit.details));
            edit.text
        };

        let text = words.iter().map(|w| w.word.as_str()).collect::<Vec<_>>().join(" ");

        let text = record(StageName::PatternCorrection, PatternCorrector::new(glossary).apply(&text));
        let text = record(StageName::CorrectionMap, apply_corrections(&text, corrections));
        let fuzzy = FuzzyCorrector::new(glossary, self.settings.fuzzy_threshold);
        let text = record(StageName::FuzzyCorrection, fuzzy.apply(&text));
        let text = record(StageName::FillerRemoval, fillers::remove_fillers(&text));
        let text = record(StageName::ArtifactFix, self.artifact_fixer.apply(&text));

        let split = sentences::segment_sentences(&text);
        debug!("{}: {} sentences", StageName::SentenceSegmentation, split.sentences.len());
        stage_results.push(StageResult::new(StageName::SentenceSegmentation, split.changes, split.details));

        let chunked = chunker::chunk_sentences(&split.sentences, self.settings.max_words, self.settings.min_words);
        debug!("{}: {} cues", StageName::CueChunking, chunked.cues.len());
        stage_results.push(StageResult::new(StageName::CueChunking, chunked.changes, chunked.details));

        SegmentedText {
            cues: chunked.cues,
            stage_results,
        }
    }

    /// Stage 8 and the final snapshot.
    fn finish(&self, original_word_count: usize, segmented: SegmentedText, anchors: &[TimedWord]) -> CurationResult {
        let SegmentedText { cues, mut stage_results } = segmented;

        let mut segments: Vec<Segment> = timing::restore_segment_timing(&cues, anchors);
        for segment in &mut segments {
            timing::assign_word_timing(segment);
        }

        let mut details = Vec::new();
        if !segments.is_empty() {
            details.push(format!("{} segments timed from {} anchor words", segments.len(), anchors.len()));
        }
        debug!("{}: {} segments", StageName::TimestampRestoration, segments.len());
        stage_results.push(StageResult::new(StageName::TimestampRestoration, segments.len(), details));

        let curated_text = segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ");
        info!(
            "Curated {} words into {} segments",
            original_word_count,
            segments.len()
        );

        CurationResult {
            original_word_count,
            curated_text,
            segments,
            stage_results,
            curated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
