//! Held-out evaluation: seeded train/test partition, accuracy and confusion
//! matrix.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::dataset::Record;
use crate::dataset::label::{Label, N_CLASSES};
use crate::error::{BoxOfficeError, Result};
use crate::features::{FeatureSchema, ImputationStats, TrainingSet, prepare_training_with};
use crate::forest::model::FittedModel;
use crate::forest::predict::predict;

/// Partition `training_set` into `(train, test)` after a seeded shuffle.
///
/// The test part receives `round(len * test_ratio)` examples. Both parts keep
/// the vectors as already imputed, so medians computed over the whole set
/// (test rows included) carry into the train part. Use [`split_records`] for
/// a split whose imputation sees the train rows only.
pub fn train_test_split(
    training_set: &TrainingSet,
    test_ratio: f64,
    seed: u64,
) -> Result<(TrainingSet, TrainingSet)> {
    let (train, test) = split_indices(training_set.len(), test_ratio, seed)?;
    Ok((training_set.subset(&train), training_set.subset(&test)))
}

/// Partition raw records into `(train, test)` training sets.
///
/// Medians are computed over the train records alone and fill missing values
/// in both parts, so no test value reaches the fitted model. The partition is
/// the same as [`train_test_split`] with equal arguments.
pub fn split_records(
    records: &[Record],
    test_ratio: f64,
    seed: u64,
) -> Result<(TrainingSet, TrainingSet)> {
    let (train, test) = split_indices(records.len(), test_ratio, seed)?;
    let pick = |indices: &[usize]| -> Vec<Record> {
        indices.iter().map(|&i| records[i].clone()).collect()
    };
    let train_records = pick(&train);
    let test_records = pick(&test);

    let imputation = ImputationStats::compute(FeatureSchema::MOVIE, &train_records);
    Ok((
        prepare_training_with(&train_records, imputation.clone()),
        prepare_training_with(&test_records, imputation),
    ))
}

/// Shuffled `(train, test)` index lists for `n` rows.
fn split_indices(n: usize, test_ratio: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(BoxOfficeError::validation(
            "test_ratio",
            format!("must be strictly between 0 and 1, got {test_ratio}"),
        ));
    }

    let n_test = (n as f64 * test_ratio).round() as usize;
    if n_test == 0 || n_test == n {
        return Err(BoxOfficeError::insufficient_data(format!(
            "cannot split {n} examples into non-empty train and test parts"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = indices.split_off(n_test);

    Ok((train, indices))
}

/// Classification quality on a held-out set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Fraction of correctly classified examples.
    pub accuracy: f64,
    /// `confusion[actual][predicted]`, in class order.
    pub confusion: [[usize; N_CLASSES]; N_CLASSES],
    /// Recall per class; `None` when the class has no actual examples.
    pub recall: [Option<f64>; N_CLASSES],
    pub train_size: usize,
    pub test_size: usize,
}

impl Evaluation {
    pub fn recall_of(&self, label: Label) -> Option<f64> {
        self.recall[label.index()]
    }
}

/// Score `model` against `test_set`.
pub fn evaluate(model: &FittedModel, test_set: &TrainingSet) -> Result<Evaluation> {
    if test_set.is_empty() {
        return Err(BoxOfficeError::insufficient_data("test set is empty"));
    }

    let mut confusion = [[0usize; N_CLASSES]; N_CLASSES];
    for example in test_set.examples() {
        let prediction = predict(model, &example.features)?;
        confusion[example.label.index()][prediction.label.index()] += 1;
    }

    let correct: usize = (0..N_CLASSES).map(|i| confusion[i][i]).sum();
    let recall = std::array::from_fn(|i| {
        let actual: usize = confusion[i].iter().sum();
        (actual > 0).then(|| confusion[i][i] as f64 / actual as f64)
    });

    Ok(Evaluation {
        accuracy: correct as f64 / test_set.len() as f64,
        confusion,
        recall,
        train_size: model.metadata().training_examples,
        test_size: test_set.len(),
    })
}
