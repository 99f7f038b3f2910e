use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split long dialogue lines of a subtitle file and retime them
    Normalize {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file (defaults to rewriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum readable symbols per line
        #[arg(short, long)]
        symbols: Option<usize>,

        /// Print the processing report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Normalize all .ass/.ssa files in a directory
    Batch {
        /// Input directory containing subtitle files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for normalized files (defaults to the input directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Maximum readable symbols per line
        #[arg(short, long)]
        symbols: Option<usize>,
    },

    /// Show how a single dialogue text would be split
    Preview {
        /// Dialogue text, screen lines separated by \N
        #[arg(short, long)]
        text: String,

        /// Maximum readable symbols per line
        #[arg(short, long)]
        symbols: Option<usize>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

impl Commands {
    /// Symbol budget override given on the command line
    pub fn symbols(&self) -> Option<usize> {
        match self {
            Commands::Normalize { symbols, .. }
            | Commands::Batch { symbols, .. }
            | Commands::Preview { symbols, .. } => *symbols,
            Commands::InitConfig { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalize() {
        let args = Args::try_parse_from([
            "subnorm", "normalize", "--input", "in.ass", "--output", "out.ass", "--symbols", "36",
        ])
        .unwrap();
        assert_eq!(args.command.symbols(), Some(36));
        match args.command {
            Commands::Normalize { input, output, json, .. } => {
                assert_eq!(input, PathBuf::from("in.ass"));
                assert_eq!(output, Some(PathBuf::from("out.ass")));
                assert!(!json);
            }
            _ => panic!("expected normalize command"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let args = Args::try_parse_from([
            "subnorm", "--verbose", "--config", "my.toml", "preview", "--text", "Hi",
        ])
        .unwrap();
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("my.toml")));
        assert_eq!(args.command.symbols(), None);
    }

    #[test]
    fn test_input_is_required() {
        assert!(Args::try_parse_from(["subnorm", "normalize"]).is_err());
    }
}
