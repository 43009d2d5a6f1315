//! Entry points of the classification pipeline.
//!
//! [`load_and_label`] runs once per dataset load. [`predict_one`] refits the
//! forest on the full training set and then predicts; callers that want to
//! reuse a model can [`retrain`] explicitly and call [`predict_with_model`].
//!
//! Every call owns its training set and model; only the read-only
//! [`Dataset`] may be shared between concurrent requests.

use std::path::Path;

use log::info;
use serde::Serialize;

use crate::config::{ForestConfig, PipelineConfig};
use crate::dataset::label::{Label, N_CLASSES};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::features::{FeatureVector, QueryInputs, TrainingSet, prepare_query, prepare_training};
use crate::forest::{
    ClassProbabilities, FittedModel, ForestTrainer, ModelMetadata, RankedFeature, predict, rank,
};

/// Everything a prediction request returns.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    /// Predicted label (argmax of `probabilities`).
    pub label: Label,
    /// Probability per label.
    pub probabilities: ClassProbabilities,
    /// Probability of the predicted label.
    pub confidence: f64,
    /// Features ranked by importance, highest first.
    pub importances: Vec<RankedFeature>,
    /// Metadata of the model that produced the prediction.
    pub model: ModelMetadata,
}

/// Dataset metrics for dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub feature_count: usize,
    pub label_counts: LabelCounts,
}

/// Number of records per label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    pub flop: usize,
    pub average: usize,
    pub hit: usize,
}

impl LabelCounts {
    pub fn get(&self, label: Label) -> usize {
        match label {
            Label::Flop => self.flop,
            Label::Average => self.average,
            Label::Hit => self.hit,
        }
    }
}

impl From<[usize; N_CLASSES]> for LabelCounts {
    fn from(counts: [usize; N_CLASSES]) -> Self {
        Self {
            flop: counts[Label::Flop.index()],
            average: counts[Label::Average.index()],
            hit: counts[Label::Hit.index()],
        }
    }
}

/// Read the comma-delimited dataset at `source` and build its labeled
/// training set.
pub fn load_and_label<P: AsRef<Path>>(source: P) -> Result<TrainingSet> {
    load_and_label_with(source, &PipelineConfig::default())
}

/// [`load_and_label`] with the delimiter taken from `config`. The whole
/// configuration is validated before the source is opened.
pub fn load_and_label_with<P: AsRef<Path>>(
    source: P,
    config: &PipelineConfig,
) -> Result<TrainingSet> {
    config.validate()?;
    let dataset = Dataset::load_with_delimiter(source, config.delimiter_byte()?)?;
    Ok(label_dataset(&dataset))
}

/// Build the labeled training set of an already loaded dataset.
pub fn label_dataset(dataset: &Dataset) -> TrainingSet {
    let training_set = prepare_training(dataset.records());
    let counts = training_set.label_counts();
    info!(
        "labeled {} records: {} flop, {} average, {} hit",
        training_set.len(),
        counts[0],
        counts[1],
        counts[2]
    );
    training_set
}

/// Validate the query, refit the forest on `training_set` and predict.
pub fn predict_one(
    training_set: &TrainingSet,
    inputs: &QueryInputs,
    config: &ForestConfig,
) -> Result<PredictionResult> {
    // Reject bad input before paying for a fit.
    let vector = prepare_query(inputs)?;
    let model = retrain(training_set, config)?;
    predict_vector(&model, &vector)
}

/// Fit a fresh model on the full training set.
pub fn retrain(training_set: &TrainingSet, config: &ForestConfig) -> Result<FittedModel> {
    ForestTrainer::new(config.clone()).fit(training_set)
}

/// Validate the query and predict with an already fitted model.
pub fn predict_with_model(model: &FittedModel, inputs: &QueryInputs) -> Result<PredictionResult> {
    let vector = prepare_query(inputs)?;
    predict_vector(model, &vector)
}

fn predict_vector(model: &FittedModel, vector: &FeatureVector) -> Result<PredictionResult> {
    let prediction = predict(model, vector)?;

    Ok(PredictionResult {
        label: prediction.label,
        probabilities: prediction.probabilities,
        confidence: prediction.probabilities.confidence(),
        importances: rank(model),
        model: model.metadata().clone(),
    })
}

/// Record and per-label counts of a training set.
pub fn summary_stats(training_set: &TrainingSet) -> SummaryStats {
    SummaryStats {
        total_records: training_set.len(),
        feature_count: training_set.schema().len(),
        label_counts: training_set.label_counts().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;
    use crate::error::BoxOfficeError;

    fn training_set() -> TrainingSet {
        let records: Vec<Record> = (0..18)
            .map(|i| {
                let score = [1.5, 4.0, 7.0][i % 3];
                Record::new(score)
                    .with_duration(80.0 + 50.0 * (i % 3) as f64)
                    .with_budget(1.0e6 * (10 + i) as f64)
                    .with_gross(3.0e6 * (10 + i) as f64)
                    .with_voted_user_count(2_000 + 1_000 * i as u64)
                    .with_movie_social_count(50)
                    .with_director_social_count(5)
            })
            .collect();
        prepare_training(&records)
    }

    fn config() -> ForestConfig {
        ForestConfig {
            n_trees: 12,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_predict_one() {
        let inputs = QueryInputs::new(130.0, 20.0, 60.0, 10_000.0, 50.0, 5.0);
        let result = predict_one(&training_set(), &inputs, &config()).unwrap();

        assert_eq!(result.probabilities.iter().count(), 3);
        let sum: f64 = result.probabilities.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(result.label, result.probabilities.argmax());
        assert_eq!(result.confidence, result.probabilities.get(result.label));
        assert_eq!(result.importances.len(), 6);
        assert_eq!(result.model.n_trees, 12);
    }

    #[test]
    fn test_predict_one_rejects_invalid_input() {
        let inputs = QueryInputs::new(10.0, 20.0, 60.0, 10_000.0, 50.0, 5.0);
        let err = predict_one(&training_set(), &inputs, &config()).unwrap_err();
        assert_eq!(err.field(), Some("duration"));
    }

    #[test]
    fn test_reused_model_matches_refit() {
        let set = training_set();
        let inputs = QueryInputs::new(180.0, 20.0, 60.0, 10_000.0, 50.0, 5.0);

        let model = retrain(&set, &config()).unwrap();
        let reused = predict_with_model(&model, &inputs).unwrap();
        let refit = predict_one(&set, &inputs, &config()).unwrap();

        assert_eq!(reused.label, refit.label);
        assert_eq!(reused.probabilities, refit.probabilities);
        assert_eq!(reused.importances, refit.importances);
    }

    #[test]
    fn test_summary_stats() {
        let stats = summary_stats(&training_set());
        assert_eq!(stats.total_records, 18);
        assert_eq!(stats.feature_count, 6);
        assert_eq!(stats.label_counts.get(Label::Hit), 6);
        assert_eq!(
            stats.label_counts,
            LabelCounts {
                flop: 6,
                average: 6,
                hit: 6
            }
        );
    }

    #[test]
    fn test_degenerate_dataset() {
        let records: Vec<Record> = (0..4).map(|i| Record::new(4.0 + i as f64 * 0.5)).collect();
        let set = prepare_training(&records);
        let inputs = QueryInputs::new(120.0, 20.0, 60.0, 10_000.0, 50.0, 5.0);

        let err = predict_one(&set, &inputs, &config()).unwrap_err();
        assert!(matches!(err, BoxOfficeError::InsufficientData(_)));
    }

    #[test]
    fn test_invalid_query_wins_over_unfittable_set() {
        let records: Vec<Record> = (0..4).map(|i| Record::new(4.0 + i as f64 * 0.5)).collect();
        let set = prepare_training(&records);
        let inputs = QueryInputs::new(120.0, 20.0, 60.0, 10_000.0, 50.0, -5.0);

        let err = predict_one(&set, &inputs, &config()).unwrap_err();
        assert!(matches!(err, BoxOfficeError::Validation { .. }));
        assert_eq!(err.field(), Some("director_social_count"));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected_before_load() {
        let config = PipelineConfig {
            delimiter: 'é',
            ..PipelineConfig::default()
        };
        let err = load_and_label_with("does-not-exist.csv", &config).unwrap_err();
        assert!(matches!(err, BoxOfficeError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_forest_config_rejected_before_load() {
        let config = PipelineConfig {
            forest: ForestConfig {
                n_trees: 0,
                ..ForestConfig::default()
            },
            ..PipelineConfig::default()
        };
        let err = load_and_label_with("does-not-exist.csv", &config).unwrap_err();
        assert!(matches!(err, BoxOfficeError::InvalidConfig(_)));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_shared_types_are_send_sync() {
        assert_send_sync::<Dataset>();
        assert_send_sync::<TrainingSet>();
        assert_send_sync::<FittedModel>();
    }
}
