use serde::{Deserialize, Serialize};

/// A single recognised word with its timing, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl TimedWord {
    /// Build a word, pulling `end` up to `start` if the source had them reversed.
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        let start = start.max(0.0);
        Self {
            word: word.into(),
            start,
            end: end.max(start),
        }
    }
}

/// Per-word timing inside a curated cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// One curated cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub words: Vec<SegmentWord>,
}

impl Segment {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// The eight curation stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    PatternCorrection,
    CorrectionMap,
    FuzzyCorrection,
    FillerRemoval,
    ArtifactFix,
    SentenceSegmentation,
    CueChunking,
    TimestampRestoration,
}

impl StageName {
    pub const ALL: [StageName; 8] = [
        StageName::PatternCorrection,
        StageName::CorrectionMap,
        StageName::FuzzyCorrection,
        StageName::FillerRemoval,
        StageName::ArtifactFix,
        StageName::SentenceSegmentation,
        StageName::CueChunking,
        StageName::TimestampRestoration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatternCorrection => "pattern_correction",
            Self::CorrectionMap => "correction_map",
            Self::FuzzyCorrection => "fuzzy_correction",
            Self::FillerRemoval => "filler_removal",
            Self::ArtifactFix => "artifact_fix",
            Self::SentenceSegmentation => "sentence_segmentation",
            Self::CueChunking => "cue_chunking",
            Self::TimestampRestoration => "timestamp_restoration",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change statistics reported by one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: String,
    pub changes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl StageResult {
    pub fn new(stage: StageName, changes: usize, details: Vec<String>) -> Self {
        Self {
            stage: stage.as_str().to_string(),
            changes,
            details: if details.is_empty() { None } else { Some(details) },
        }
    }
}

/// Output of a stage that rewrites text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextEdit {
    pub text: String,
    pub changes: usize,
    pub details: Vec<String>,
}

impl TextEdit {
    pub fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }
}

/// Snapshot produced by one curation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurationResult {
    pub original_word_count: usize,
    pub curated_text: String,
    pub segments: Vec<Segment>,
    pub stage_results: Vec<StageResult>,
    pub curated_at: String,
}

impl CurationResult {
    pub fn total_changes(&self) -> usize {
        self.stage_results.iter().map(|s| s.changes).sum()
    }

    pub fn stage(&self, stage: StageName) -> Option<&StageResult> {
        self.stage_results.iter().find(|s| s.stage == stage.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_word_clamps_reversed_range() {
        let word = TimedWord::new("hello", 2.0, 1.5);
        assert_eq!(word.start, 2.0);
        assert_eq!(word.end, 2.0);
    }

    #[test]
    fn test_stage_result_omits_empty_details() {
        let result = StageResult::new(StageName::FillerRemoval, 0, Vec::new());
        assert_eq!(result.stage, "filler_removal");
        assert!(result.details.is_none());

        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_stage_order_is_fixed() {
        let names: Vec<&str> = StageName::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(names.first(), Some(&"pattern_correction"));
        assert_eq!(names.last(), Some(&"timestamp_restoration"));
        assert_eq!(names.len(), 8);
    }
}
