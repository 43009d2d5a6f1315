//! # Boxoffice
//!
//! Film outcome classification: label films Flop / Average / Hit from their
//! quality score and predict the outcome of a new film with a random forest.
//!
//! ## Features
//!
//! - Delimited-text dataset loading with column aliases
//! - Median imputation of missing attributes
//! - Range-checked query validation
//! - Seeded, reproducible random forest training
//! - Feature importance ranking and held-out evaluation
//! - Training, dashboard and sample exports

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod forest;
pub mod pipeline;

pub mod prelude {
    pub use crate::config::{ForestConfig, PipelineConfig};
    pub use crate::dataset::{Dataset, Label, Record};
    pub use crate::error::{BoxOfficeError, Result};
    pub use crate::features::{FeatureVector, QueryInputs, TrainingSet};
    pub use crate::forest::{FittedModel, RankedFeature};
    pub use crate::pipeline::{
        PredictionResult, SummaryStats, load_and_label, predict_one, predict_with_model, retrain,
        summary_stats,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
