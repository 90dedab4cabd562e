//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "resumatch",
    version,
    about = "Semantic resume retrieval and evaluation engine",
    long_about = "Resumatch ranks a corpus of candidate documents against free-text job \
                  descriptions by embedding similarity, maintains a persisted vector index \
                  with an explicit refresh lifecycle, and scores retrieval quality against \
                  labeled expectations."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/resumatch/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank resumes against a job description
    Search {
        /// Job description text (omit to read from --file)
        jd: Option<String>,

        /// Read the job description from a file
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Maximum number of results to return (defaults to the
        /// configured search limit)
        #[arg(short = 'k', long)]
        limit: Option<usize>,

        /// Corpus directory (overrides config)
        #[arg(long, value_name = "DIR")]
        corpus: Option<PathBuf>,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Rebuild and persist the vector index from the current corpus
    Refresh {
        /// Corpus directory (overrides config)
        #[arg(long, value_name = "DIR")]
        corpus: Option<PathBuf>,
    },

    /// Score retrieval quality against a labeled fixture
    Evaluate {
        /// JSON fixture: [{"query": "...", "expected": ["a.txt", ...]}, ...]
        fixture: PathBuf,

        /// Results retrieved per query (defaults to the configured
        /// search limit)
        #[arg(short = 'k', long)]
        limit: Option<usize>,

        /// Corpus directory (overrides config)
        #[arg(long, value_name = "DIR")]
        corpus: Option<PathBuf>,

        /// Show metrics in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
