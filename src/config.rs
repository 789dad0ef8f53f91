use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::curate::chunker::{DEFAULT_MAX_WORDS, DEFAULT_MIN_WORDS};
use crate::curate::corrections::DEFAULT_CORRECTIONS_FILE;
use crate::curate::fuzzy::DEFAULT_FUZZY_THRESHOLD;
use crate::error::{CurateError, Result};
use crate::glossary::DEFAULT_GLOSSARY_FILE;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "capcurate.toml";

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

fn default_suffix() -> String {
    "curated".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub curation: CurationConfig,
    #[serde(default)]
    pub glossary: GlossaryConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    /// Audio aligner used instead of proportional segment timing, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aligner: Option<AlignerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    /// Minimum similarity ratio for a fuzzy correction
    pub fuzzy_threshold: f64,
    /// Longest cue, in words
    pub max_words: usize,
    /// Shortest trailing cue chunk before it is merged
    pub min_words: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlossaryConfig {
    pub file_name: String,
    /// Also collect glossaries from ancestor directories
    pub walk_parents: bool,
    /// Correction map looked for next to each input file
    pub corrections_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Emit karaoke word timing tags instead of plain cue text
    pub word_timing: bool,
    pub language: String,
    /// Inserted before the extension: `talk.vtt` becomes `talk.curated.vtt`
    pub suffix: String,
    /// Write the JSON curation report next to the captions
    pub write_report: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Command phrases quoted in addition to the built-in table
    pub extra_commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignerConfig {
    /// Aligner executable; receives `args`, the audio path and a text file path
    pub binary_path: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            max_words: DEFAULT_MAX_WORDS,
            min_words: DEFAULT_MIN_WORDS,
        }
    }
}

impl Default for GlossaryConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_GLOSSARY_FILE.to_string(),
            walk_parents: default_true(),
            corrections_file: DEFAULT_CORRECTIONS_FILE.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            word_timing: default_true(),
            language: default_language(),
            suffix: default_suffix(),
            write_report: default_true(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CurateError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CurateError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CurateError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CurateError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Explicit path, else `capcurate.toml` in the working directory, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CurateError::FileNotFound(path.display().to_string()));
            }
            return Self::from_file(path);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            debug!("Using config from {}", local.display());
            return Self::from_file(local);
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        let curation = &self.curation;
        if !(0.0..=1.0).contains(&curation.fuzzy_threshold) {
            return Err(CurateError::Config(format!(
                "fuzzy_threshold must be within 0..=1, got {}",
                curation.fuzzy_threshold
            )));
        }
        if curation.max_words == 0 {
            return Err(CurateError::Config("max_words must be at least 1".to_string()));
        }
        if curation.min_words > curation.max_words {
            return Err(CurateError::Config(format!(
                "min_words ({}) cannot exceed max_words ({})",
                curation.min_words, curation.max_words
            )));
        }
        if self.output.suffix.trim().is_empty() {
            return Err(CurateError::Config("output suffix cannot be empty".to_string()));
        }
        if let Some(aligner) = &self.aligner {
            if aligner.binary_path.trim().is_empty() {
                return Err(CurateError::Config("aligner binary_path cannot be empty".to_string()));
            }
        }
        Ok(())
    }
}
