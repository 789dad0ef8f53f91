use async_trait::async_trait;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use super::WordAligner;
use crate::config::AlignerConfig;
use crate::error::{CurateError, Result};
use crate::types::TimedWord;

/// One entry of the aligner's JSON output.
#[derive(Debug, Deserialize)]
struct AlignedWord {
    word: String,
    start: f64,
    end: f64,
}

/// Runs an external alignment command.
///
/// The command is invoked as `binary_path [args...] <audio> <text-file>` and
/// must print a JSON array of `{"word", "start", "end"}` objects on stdout.
pub struct ExternalAligner {
    config: AlignerConfig,
}

impl ExternalAligner {
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl WordAligner for ExternalAligner {
    async fn align(&self, audio_path: &Path, text: &str) -> Result<Vec<TimedWord>> {
        if !audio_path.exists() {
            return Err(CurateError::FileNotFound(audio_path.display().to_string()));
        }

        let mut text_file = tempfile::NamedTempFile::new()?;
        text_file.write_all(text.as_bytes())?;
        text_file.flush()?;

        info!("Aligning {} with {}", audio_path.display(), self.config.binary_path);

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.args(&self.config.args).arg(audio_path).arg(text_file.path());

        debug!("Executing aligner command: {:?}", cmd);

        let output = cmd
            .output()
            .await
            .map_err(|e| CurateError::Alignment(format!("Failed to execute aligner: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CurateError::Alignment(format!("Aligner failed: {}", stderr.trim())));
        }

        let words = parse_alignment_output(&output.stdout)?;
        info!("Aligner returned {} words", words.len());
        Ok(words)
    }

    fn name(&self) -> String {
        self.config.binary_path.clone()
    }
}

/// Parse aligner stdout into ordered timed words.
pub fn parse_alignment_output(stdout: &[u8]) -> Result<Vec<TimedWord>> {
    let text = String::from_utf8_lossy(stdout);
    if text.trim().is_empty() {
        return Err(CurateError::Alignment("Aligner produced no output".to_string()));
    }

    let aligned: Vec<AlignedWord> = serde_json::from_str(text.trim())
        .map_err(|e| CurateError::Alignment(format!("Invalid aligner output: {}", e)))?;

    Ok(aligned
        .into_iter()
        .filter(|w| !w.word.trim().is_empty())
        .map(|w| TimedWord::new(w.word.trim(), w.start, w.end))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_alignment_output() {
        let stdout = br#"[{"word": "DataLad", "start": 0.0, "end": 0.6}, {"word": " ", "start": 0.6, "end": 0.6}, {"word": "saves", "start": 0.7, "end": 0.5}]"#;
        let words = parse_alignment_output(stdout).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "DataLad");
        // reversed range is clamped
        assert_eq!(words[1].end, 0.7);
    }

    #[test]
    fn test_parse_rejects_empty_and_invalid_output() {
        assert!(matches!(parse_alignment_output(b"  \n"), Err(CurateError::Alignment(_))));
        assert!(matches!(parse_alignment_output(b"{\"word\": 1}"), Err(CurateError::Alignment(_))));
    }

    #[tokio::test]
    async fn test_missing_audio_is_reported() {
        let aligner = ExternalAligner::new(AlignerConfig {
            binary_path: "aligner".to_string(),
            args: Vec::new(),
        });
        let result = aligner.align(Path::new("/no/such/talk.wav"), "text").await;
        assert!(matches!(result, Err(CurateError::FileNotFound(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_command_and_reads_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("talk.wav");
        std::fs::write(&audio, b"RIFF").unwrap();

        // `sh -c script argv0 audio textfile`: echo the JSON, ignore the inputs
        let aligner = ExternalAligner::new(AlignerConfig {
            binary_path: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                r#"echo '[{"word":"hello","start":0.0,"end":0.4}]'"#.to_string(),
                "aligner".to_string(),
            ],
        });

        let words = aligner.align(&audio, "hello").await.unwrap();
        assert_eq!(words, vec![TimedWord::new("hello", 0.0, 0.4)]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_is_an_alignment_error() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("talk.wav");
        std::fs::write(&audio, b"RIFF").unwrap();

        let aligner = ExternalAligner::new(AlignerConfig {
            binary_path: "sh".to_string(),
            args: vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()],
        });

        let result = aligner.align(&audio, "hello").await;
        assert!(matches!(result, Err(CurateError::Alignment(msg)) if msg.contains("boom")));
    }
}
