// Audio alignment backends.
//
// An aligner takes the audio a caption file was made from plus the curated
// text and returns measured word timing. The curator uses that timing as the
// anchor sequence for segment timing instead of the recogniser's words.
//
// To add a backend, implement `WordAligner` and extend `AlignerFactory`.

pub mod external;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::path::Path;

pub use external::{parse_alignment_output, ExternalAligner};

use crate::config::AlignerConfig;
use crate::error::Result;
use crate::types::TimedWord;

/// Produces word timing for `text` spoken in `audio_path`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WordAligner: Send + Sync {
    async fn align(&self, audio_path: &Path, text: &str) -> Result<Vec<TimedWord>>;

    /// Human-readable backend name for logs
    fn name(&self) -> String;
}

/// Factory for creating aligner instances
pub struct AlignerFactory;

impl AlignerFactory {
    pub fn create(config: &AlignerConfig) -> Box<dyn WordAligner> {
        Box::new(ExternalAligner::new(config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_external_aligner() {
        let aligner = AlignerFactory::create(&AlignerConfig {
            binary_path: "my-aligner".to_string(),
            args: vec!["--json".to_string()],
        });
        assert_eq!(aligner.name(), "my-aligner");
    }

    #[test]
    fn test_mock_aligner_is_usable_as_trait_object() {
        let mut mock = MockWordAligner::new();
        mock.expect_align()
            .returning(|_, _| Ok(vec![TimedWord::new("hello", 0.0, 0.5)]));
        mock.expect_name().return_const("mock".to_string());

        let aligner: Box<dyn WordAligner> = Box::new(mock);
        let words = tokio_test::block_on(aligner.align(Path::new("talk.wav"), "hello")).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(aligner.name(), "mock");
    }
}
