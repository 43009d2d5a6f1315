//! Feature preparation.
//!
//! Turns records into the training matrix (with median imputation) and user
//! inputs into a validated query vector. Both share the fixed six-attribute
//! [`FeatureSchema::MOVIE`].

pub mod impute;
pub mod query;
pub mod schema;
pub mod training;

pub use impute::{ImputationStats, median};
pub use query::{CURRENCY_SCALE, INPUT_RANGES, InputRange, QueryInputs, prepare_query};
pub use schema::{Feature, FeatureSchema, FeatureVector};
pub use training::{TrainingExample, TrainingSet, prepare_training, prepare_training_with};
