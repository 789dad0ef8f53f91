use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Curate a single caption file
    Curate {
        /// Input WebVTT file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Write plain cue text instead of word timing tags
        #[arg(long)]
        plain: bool,
    },

    /// Curate every caption file under a directory
    Batch {
        /// Input directory containing WebVTT files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory; sub-directories are mirrored
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show the glossary that applies to a directory
    Glossary {
        /// Directory to start discovery from
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Write a configuration file with default settings
    InitConfig {
        /// Where to write the configuration
        #[arg(short, long, default_value = "capcurate.toml")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_curate_command() {
        let args = Args::parse_from(["capcurate", "curate", "-i", "talk.vtt", "--plain", "-v"]);
        assert!(args.verbose);
        match args.command {
            Commands::Curate { input, output_dir, plain } => {
                assert_eq!(input, PathBuf::from("talk.vtt"));
                assert!(output_dir.is_none());
                assert!(plain);
            }
            _ => panic!("expected curate command"),
        }
    }

    #[test]
    fn test_parse_batch_with_config() {
        let args = Args::parse_from([
            "capcurate", "--config", "my.toml", "batch", "-i", "talks", "-o", "out",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("my.toml")));
        assert!(matches!(args.command, Commands::Batch { .. }));
    }

    #[test]
    fn test_init_config_default_path() {
        let args = Args::parse_from(["capcurate", "init-config"]);
        match args.command {
            Commands::InitConfig { output } => assert_eq!(output, PathBuf::from("capcurate.toml")),
            _ => panic!("expected init-config command"),
        }
    }
}
