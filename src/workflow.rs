use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::align::{AlignerFactory, WordAligner};
use crate::config::Config;
use crate::curate::corrections::CorrectionMap;
use crate::curate::{Curator, CuratorSettings};
use crate::error::{CurateError, Result};
use crate::glossary::Glossary;
use crate::subtitle::{read_vtt, write_vtt};
use crate::types::CurationResult;

/// Audio looked for next to a caption file when an aligner is configured.
const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "flac", "opus", "webm"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

pub struct Workflow {
    config: Config,
    curator: Curator,
    aligner: Option<Box<dyn WordAligner>>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let curator = Curator::new(CuratorSettings::from_config(&config));
        let aligner = config.aligner.as_ref().map(AlignerFactory::create);

        Ok(Self {
            config,
            curator,
            aligner,
        })
    }

    /// Replace the configured aligner.
    pub fn with_aligner(mut self, aligner: Box<dyn WordAligner>) -> Self {
        self.aligner = Some(aligner);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `<output_dir>/<stem>.<suffix>.<extension>`
    fn derived_path(&self, input_path: &Path, output_dir: &Path, extension: &str) -> PathBuf {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "captions".to_string());
        output_dir.join(format!("{}.{}.{}", stem, self.config.output.suffix, extension))
    }

    pub fn output_path(&self, input_path: &Path, output_dir: &Path) -> PathBuf {
        self.derived_path(input_path, output_dir, "vtt")
    }

    pub fn report_path(&self, input_path: &Path, output_dir: &Path) -> PathBuf {
        self.derived_path(input_path, output_dir, "json")
    }

    /// Files this tool wrote itself are not inputs.
    fn is_curated_output(&self, path: &Path) -> bool {
        let marker = format!(".{}.vtt", self.config.output.suffix);
        path.file_name()
            .map(|name| name.to_string_lossy().ends_with(&marker))
            .unwrap_or(false)
    }

    fn find_audio(input_path: &Path) -> Option<PathBuf> {
        AUDIO_EXTENSIONS
            .iter()
            .map(|ext| input_path.with_extension(ext))
            .find(|candidate| candidate.is_file())
    }

    /// Glossary discovered from the input's directory upwards.
    pub fn load_glossary(&self, dir: &Path) -> Result<Glossary> {
        Glossary::discover(
            dir,
            &self.config.glossary.file_name,
            self.config.glossary.walk_parents,
        )
    }

    /// Curate one caption file and write the curated captions (and report).
    pub async fn curate_file(&self, input_path: &Path, output_dir: Option<&Path>) -> Result<CurationResult> {
        info!("Curating: {}", input_path.display());

        if !input_path.is_file() {
            return Err(CurateError::FileNotFound(input_path.display().to_string()));
        }

        let input_dir = input_path.parent().unwrap_or_else(|| Path::new("."));
        let output_dir = output_dir.unwrap_or(input_dir);
        fs::create_dir_all(output_dir).await?;

        let words = read_vtt(input_path).await?;
        let glossary = self.load_glossary(input_dir)?;
        let corrections = CorrectionMap::load(input_dir.join(&self.config.glossary.corrections_file))?;
        info!(
            "Using {} glossary terms and {} corrections",
            glossary.len(),
            corrections.len()
        );

        let result = match (&self.aligner, Self::find_audio(input_path)) {
            (Some(aligner), Some(audio)) => {
                info!("Aligning against {}", audio.display());
                self.curator
                    .curate_aligned(&words, &glossary, &corrections, aligner.as_ref(), &audio)
                    .await?
            }
            (Some(_), None) => {
                warn!(
                    "No audio found next to {}, using proportional timing",
                    input_path.display()
                );
                self.curator.curate(&words, &glossary, &corrections)
            }
            (None, _) => self.curator.curate(&words, &glossary, &corrections),
        };

        let output_path = self.output_path(input_path, output_dir);
        write_vtt(
            &result,
            &output_path,
            self.config.output.word_timing,
            &self.config.output.language,
        )
        .await?;

        if self.config.output.write_report {
            let report_path = self.report_path(input_path, output_dir);
            let report = serde_json::to_string_pretty(&result)?;
            fs::write(&report_path, report).await?;
            info!("Wrote curation report: {}", report_path.display());
        }

        info!(
            "Curated {} with {} changes",
            input_path.display(),
            result.total_changes()
        );
        Ok(result)
    }

    /// Curate every `.vtt` file under `input_dir`. Per-file failures are logged
    /// and counted, not returned.
    pub async fn curate_directory(&self, input_dir: &Path, output_dir: Option<&Path>) -> Result<BatchSummary> {
        info!("Curating directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(CurateError::Config("Input path is not a directory".to_string()));
        }

        let mut caption_files: Vec<PathBuf> = WalkDir::new(input_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("vtt"))
            })
            .filter(|path| !self.is_curated_output(path))
            .collect();
        caption_files.sort();

        info!("Found {} caption files to curate", caption_files.len());

        let pb = ProgressBar::new(caption_files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let mut summary = BatchSummary::default();
        for caption_path in caption_files {
            let target_dir = output_dir.map(|root| {
                let parent = caption_path.parent().unwrap_or(input_dir);
                match pathdiff::diff_paths(parent, input_dir) {
                    Some(relative) => root.join(relative),
                    None => root.to_path_buf(),
                }
            });

            pb.set_message(
                caption_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
            match self.curate_file(&caption_path, target_dir.as_deref()).await {
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    warn!("Failed to curate {}: {}", caption_path.display(), e);
                    summary.failed += 1;
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("done");

        info!(
            "Batch complete: {} curated, {} failed",
            summary.processed, summary.failed
        );
        Ok(summary)
    }
}
