//! The fitted random forest.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Voting;
use crate::features::FeatureSchema;
use crate::forest::tree::DecisionTree;

/// Model metadata for tracking one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Random identifier of this fitted model.
    pub model_id: Uuid,
    /// Training timestamp.
    pub trained_at: DateTime<Utc>,
    /// Number of training examples used.
    pub training_examples: usize,
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Seed of the master random number generator.
    pub seed: u64,
    /// Training time in milliseconds.
    pub training_time_ms: u64,
    /// Model hyperparameters.
    pub hyperparameters: HashMap<String, f64>,
}

/// An ensemble of decision trees plus derived importance weights.
///
/// Produced by [`crate::forest::ForestTrainer::fit`]. It is immutable and
/// `Send + Sync`, so one model may serve many predictions.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) schema: FeatureSchema,
    pub(crate) importances: Vec<f64>,
    pub(crate) voting: Voting,
    pub(crate) metadata: ModelMetadata,
}

impl FittedModel {
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Schema the model was fitted against.
    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    /// Normalized mean decrease in impurity, in schema order.
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn voting(&self) -> Voting {
        self.voting
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
