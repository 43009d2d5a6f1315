//! Command line argument parsing for the boxoffice CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::features::{Feature, QueryInputs};

/// Boxoffice - film outcome classification
#[derive(Parser, Debug, Clone)]
#[command(name = "boxoffice")]
#[command(about = "Classify films as Flop, Average or Hit with a random forest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct BoxOfficeArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Pipeline configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl BoxOfficeArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show record and per-label counts
    Summary(SummaryArgs),

    /// Predict the outcome of a film
    Predict(PredictArgs),

    /// Rank features by importance
    Importance(ImportanceArgs),

    /// Evaluate the forest on a held-out split
    Evaluate(EvaluateArgs),

    /// Write a tabular export of the dataset
    Export(ExportArgs),
}

/// Arguments for the summary command
#[derive(Parser, Debug, Clone)]
pub struct SummaryArgs {
    /// Path to the dataset file
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,
}

/// Arguments for a prediction.
///
/// Values are taken as text so malformed numbers are reported as validation
/// errors on the named field.
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Path to the dataset file
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Running time in minutes
    #[arg(long)]
    pub duration: Option<String>,

    /// Budget in millions
    #[arg(long)]
    pub budget: Option<String>,

    /// Expected gross in millions
    #[arg(long)]
    pub gross: Option<String>,

    /// Number of user votes
    #[arg(long = "voted-users")]
    pub voted_users: Option<String>,

    /// Social-media likes of the film
    #[arg(long = "movie-likes")]
    pub movie_likes: Option<String>,

    /// Social-media likes of the director
    #[arg(long = "director-likes")]
    pub director_likes: Option<String>,

    /// Override the forest seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl PredictArgs {
    /// Parse the supplied values into query inputs. Absent flags stay absent
    /// and are reported by query validation.
    pub fn query_inputs(&self) -> Result<QueryInputs> {
        let pairs = [
            (Feature::Duration, &self.duration),
            (Feature::Budget, &self.budget),
            (Feature::Gross, &self.gross),
            (Feature::VotedUserCount, &self.voted_users),
            (Feature::MovieSocialCount, &self.movie_likes),
            (Feature::DirectorSocialCount, &self.director_likes),
        ];
        QueryInputs::parse(
            pairs
                .iter()
                .filter_map(|(feature, text)| text.as_deref().map(|t| (feature.name(), t))),
        )
    }
}

/// Arguments for the importance command
#[derive(Parser, Debug, Clone)]
pub struct ImportanceArgs {
    /// Path to the dataset file
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Override the forest seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the evaluate command
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Path to the dataset file
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Fraction of records held out for testing
    #[arg(long, default_value = "0.2")]
    pub test_ratio: f64,

    /// Override the forest and split seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the export command
#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Path to the dataset file
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Output file path
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// What to export
    #[arg(short, long, default_value = "training")]
    pub kind: ExportKind,

    /// Number of records in a sample export
    #[arg(short, long, default_value = "100")]
    pub limit: usize,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Export kinds
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportKind {
    /// Imputed feature columns plus the label
    Training,
    /// BI-dashboard columns with profit and roi
    Dashboard,
    /// The first records in the canonical layout
    Sample,
    /// Per-feature medians used for imputation
    Imputation,
}
