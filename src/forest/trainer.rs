//! Random forest training.

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::config::ForestConfig;
use crate::error::{BoxOfficeError, Result};
use crate::features::{FeatureSchema, TrainingSet};
use crate::forest::model::{FittedModel, ModelMetadata};
use crate::forest::tree::{DecisionTree, TreeParams};

/// Fits bootstrap-aggregated decision tree ensembles.
#[derive(Debug, Clone, Default)]
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Fit a forest on the whole training set.
    ///
    /// # Errors
    ///
    /// - [`BoxOfficeError::InsufficientData`] if the set is empty or holds
    ///   fewer than two distinct labels
    /// - [`BoxOfficeError::FeatureMismatch`] if any vector disagrees with the
    ///   movie schema
    /// - [`BoxOfficeError::InvalidConfig`] for unusable forest settings
    pub fn fit(&self, training_set: &TrainingSet) -> Result<FittedModel> {
        self.config.validate()?;

        if training_set.is_empty() {
            return Err(BoxOfficeError::insufficient_data("training set is empty"));
        }

        let schema = FeatureSchema::MOVIE;
        if training_set.schema() != schema {
            return Err(BoxOfficeError::feature_mismatch(format!(
                "training set schema {} does not match {}",
                training_set.schema(),
                schema
            )));
        }
        for (i, example) in training_set.examples().iter().enumerate() {
            if let Some(reason) = example.features.mismatch(&schema) {
                return Err(BoxOfficeError::feature_mismatch(format!(
                    "training example {i}: {reason}"
                )));
            }
        }

        let distinct = training_set.distinct_labels();
        if distinct < 2 {
            return Err(BoxOfficeError::insufficient_data(format!(
                "need at least 2 distinct labels to fit a classifier, found {distinct}"
            )));
        }

        let start_time = Instant::now();
        let rows: Vec<&[f64]> = training_set
            .examples()
            .iter()
            .map(|e| e.features.values())
            .collect();
        let labels: Vec<usize> = training_set.labels().map(|l| l.index()).collect();
        let n = rows.len();
        let params = TreeParams {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: self.config.max_features.resolve(schema.len()),
        };

        let mut master = StdRng::seed_from_u64(self.config.seed);
        let mut trees = Vec::with_capacity(self.config.n_trees);
        let mut totals = vec![0.0; schema.len()];

        for _ in 0..self.config.n_trees {
            let mut rng = StdRng::seed_from_u64(master.random::<u64>());
            let samples: Vec<usize> = if self.config.bootstrap {
                (0..n).map(|_| rng.random_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            let (tree, importances) = DecisionTree::fit(&rows, &labels, samples, &params, &mut rng);
            accumulate_normalized(&mut totals, &importances);
            trees.push(tree);
        }

        let mut importances: Vec<f64> = totals
            .iter()
            .map(|t| t / self.config.n_trees as f64)
            .collect();
        normalize(&mut importances);

        let elapsed = start_time.elapsed();
        debug!(
            "mean tree depth {:.1}",
            trees.iter().map(|t| t.depth() as f64).sum::<f64>() / trees.len() as f64
        );
        info!(
            "fitted {} trees on {} examples in {} ms",
            trees.len(),
            n,
            elapsed.as_millis()
        );

        Ok(FittedModel {
            trees,
            schema,
            importances,
            voting: self.config.voting,
            metadata: ModelMetadata {
                model_id: Uuid::new_v4(),
                trained_at: chrono::Utc::now(),
                training_examples: n,
                n_trees: self.config.n_trees,
                seed: self.config.seed,
                training_time_ms: elapsed.as_millis() as u64,
                hyperparameters: self.hyperparameters(),
            },
        })
    }

    fn hyperparameters(&self) -> HashMap<String, f64> {
        let mut params = HashMap::new();
        params.insert("n_trees".to_string(), self.config.n_trees as f64);
        params.insert(
            "min_samples_split".to_string(),
            self.config.min_samples_split as f64,
        );
        params.insert(
            "min_samples_leaf".to_string(),
            self.config.min_samples_leaf as f64,
        );
        if let Some(depth) = self.config.max_depth {
            params.insert("max_depth".to_string(), depth as f64);
        }
        params
    }
}

/// Fit the default 100-tree forest with the given seed.
pub fn fit(training_set: &TrainingSet, seed: u64) -> Result<FittedModel> {
    ForestTrainer::new(ForestConfig::with_seed(seed)).fit(training_set)
}

/// Add a tree's importances to `totals` after scaling them to sum 1.
/// A tree that never split contributes nothing.
fn accumulate_normalized(totals: &mut [f64], importances: &[f64]) {
    let sum: f64 = importances.iter().sum();
    if sum > 0.0 {
        for (total, value) in totals.iter_mut().zip(importances) {
            *total += value / sum;
        }
    }
}

fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        for value in values.iter_mut() {
            *value /= sum;
        }
    }
}
