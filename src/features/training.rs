//! Training set assembly.

use crate::dataset::label::{Label, N_CLASSES};
use crate::dataset::{Dataset, Record};
use crate::features::impute::ImputationStats;
use crate::features::schema::{FeatureSchema, FeatureVector};

/// One labeled row of the training set.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    /// Imputed feature values.
    pub features: FeatureVector,
    /// Label derived from the quality score at load time.
    pub label: Label,
    /// Quality score the label was derived from.
    pub quality_score: f64,
}

/// Paired feature vectors and labels for a whole dataset.
///
/// The imputation statistics are fixed when the set is built; a new set has
/// to be prepared to pick up a different dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    schema: FeatureSchema,
    examples: Vec<TrainingExample>,
    imputation: Option<ImputationStats>,
}

impl TrainingSet {
    /// Assemble a training set from prepared examples.
    pub fn from_examples(schema: FeatureSchema, examples: Vec<TrainingExample>) -> Self {
        Self {
            schema,
            examples,
            imputation: None,
        }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    /// Statistics used to fill missing values, when built from records.
    pub fn imputation(&self) -> Option<&ImputationStats> {
        self.imputation.as_ref()
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.examples.iter().map(|e| e.label)
    }

    /// Number of examples per label, in class order.
    pub fn label_counts(&self) -> [usize; N_CLASSES] {
        let mut counts = [0; N_CLASSES];
        for label in self.labels() {
            counts[label.index()] += 1;
        }
        counts
    }

    /// Number of labels with at least one example.
    pub fn distinct_labels(&self) -> usize {
        self.label_counts().iter().filter(|&&c| c > 0).count()
    }

    /// A new set holding the examples at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            schema: self.schema,
            examples: indices.iter().map(|&i| self.examples[i].clone()).collect(),
            imputation: self.imputation.clone(),
        }
    }
}

/// Build the training set of `records` over the movie schema.
///
/// Missing values are replaced by the column median over all of `records`;
/// labels are derived from each record's quality score.
pub fn prepare_training(records: &[Record]) -> TrainingSet {
    let imputation = ImputationStats::compute(FeatureSchema::MOVIE, records);
    prepare_training_with(records, imputation)
}

/// Build the training set of `records`, filling missing values from
/// `imputation` instead of medians over `records` themselves.
pub fn prepare_training_with(records: &[Record], imputation: ImputationStats) -> TrainingSet {
    let schema = imputation.schema();
    let examples = records
        .iter()
        .map(|record| TrainingExample {
            features: FeatureVector::new(schema, imputation.fill(record)),
            label: record.label(),
            quality_score: record.quality_score,
        })
        .collect();

    TrainingSet {
        schema,
        examples,
        imputation: Some(imputation),
    }
}

impl From<&Dataset> for TrainingSet {
    fn from(dataset: &Dataset) -> Self {
        prepare_training(dataset.records())
    }
}
