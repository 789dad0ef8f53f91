//! capcurate - Caption Curation for Speech Recognition Output
//!
//! Entry point for the capcurate command line tool, which turns raw
//! karaoke-style ASR captions into corrected, re-segmented subtitles.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use capcurate::cli::{Args, Commands};
use capcurate::config::Config;
use capcurate::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting capcurate");

    let mut config = Config::load(args.config.as_deref())?;

    match args.command {
        Commands::Curate {
            input,
            output_dir,
            plain,
        } => {
            if plain {
                config.output.word_timing = false;
            }
            let workflow = Workflow::new(config)?;
            let result = workflow.curate_file(&input, output_dir.as_deref()).await?;

            println!("\nCuration summary for {}:", input.display());
            println!("{:<25} {:>8}", "Stage", "Changes");
            println!("{}", "-".repeat(34));
            for stage in &result.stage_results {
                println!("{:<25} {:>8}", stage.stage, stage.changes);
            }
            println!(
                "\n{} words in, {} cues out",
                result.original_word_count,
                result.segments.len()
            );
        }
        Commands::Batch {
            input_dir,
            output_dir,
        } => {
            let workflow = Workflow::new(config)?;
            let summary = workflow.curate_directory(&input_dir, output_dir.as_deref()).await?;
            println!(
                "Curated {} files ({} failed)",
                summary.processed, summary.failed
            );
        }
        Commands::Glossary { dir } => {
            let workflow = Workflow::new(config)?;
            let glossary = workflow.load_glossary(&dir)?;
            if glossary.is_empty() {
                println!("No glossary terms found from {}", dir.display());
            } else {
                println!("{:<25} {:<15} {}", "Term", "Category", "Patterns");
                println!("{}", "-".repeat(70));
                for term in glossary.terms() {
                    println!(
                        "{:<25} {:<15} {}",
                        term.canonical,
                        term.category,
                        term.patterns.join(", ")
                    );
                }
            }
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".capcurate").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "capcurate.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("capcurate.log").display()
    );

    Ok(())
}
