//! Random forest classifier.
//!
//! Covers training ([`ForestTrainer`]), inference ([`predict`]), feature
//! importance ranking ([`rank`]) and held-out evaluation ([`evaluate`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use boxoffice::dataset::Dataset;
//! use boxoffice::features::{QueryInputs, prepare_query, prepare_training};
//! use boxoffice::forest::{self, rank};
//!
//! # fn main() -> boxoffice::error::Result<()> {
//! let dataset = Dataset::load("movie_metadata.csv")?;
//! let training_set = prepare_training(dataset.records());
//! let model = forest::fit(&training_set, 42)?;
//!
//! let query = prepare_query(&QueryInputs::new(120.0, 50.0, 100.0, 50_000.0, 5_000.0, 1_000.0))?;
//! let prediction = forest::predict(&model, &query)?;
//! println!("{} ({:.1}%)", prediction.label, prediction.probabilities.confidence() * 100.0);
//! for ranked in rank(&model) {
//!     println!("{:<24} {:.4}", ranked.name(), ranked.importance);
//! }
//! # Ok(())
//! # }
//! ```

pub mod evaluate;
pub mod importance;
pub mod model;
pub mod predict;
pub mod trainer;
pub mod tree;

pub use evaluate::{Evaluation, evaluate, split_records, train_test_split};
pub use importance::{RankedFeature, rank};
pub use model::{FittedModel, ModelMetadata};
pub use predict::{ClassProbabilities, Prediction, predict};
pub use trainer::{ForestTrainer, fit};
pub use tree::DecisionTree;
