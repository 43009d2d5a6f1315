//! Inference with a fitted forest.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::config::Voting;
use crate::dataset::label::{Label, N_CLASSES, argmax};
use crate::error::{BoxOfficeError, Result};
use crate::features::FeatureVector;
use crate::forest::model::FittedModel;

/// Probability per label, in class order. Values lie in `[0, 1]` and sum
/// to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities([f64; N_CLASSES]);

impl ClassProbabilities {
    /// Wrap raw class probabilities.
    pub fn new(values: [f64; N_CLASSES]) -> Self {
        Self(values)
    }

    pub fn get(&self, label: Label) -> f64 {
        self.0[label.index()]
    }

    pub fn as_array(&self) -> &[f64; N_CLASSES] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, f64)> + '_ {
        Label::ALL.into_iter().zip(self.0.iter().copied())
    }

    /// Most probable label; the lowest class wins an exact tie.
    pub fn argmax(&self) -> Label {
        Label::ALL[argmax(&self.0)]
    }

    /// Probability of the most probable label.
    pub fn confidence(&self) -> f64 {
        self.get(self.argmax())
    }
}

impl Serialize for ClassProbabilities {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(N_CLASSES))?;
        for (label, p) in self.iter() {
            map.serialize_entry(label.as_str(), &p)?;
        }
        map.end()
    }
}

/// Predicted label and class distribution for one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    pub probabilities: ClassProbabilities,
}

/// Run `vector` through every tree of `model`.
///
/// With [`Voting::Majority`] the probability of a class is the fraction of
/// trees voting for it; with [`Voting::Average`] it is the mean of the trees'
/// leaf distributions. The label is the argmax, lowest class first on ties.
///
/// # Errors
///
/// [`BoxOfficeError::SchemaMismatch`] if the vector was not built against the
/// model's schema.
pub fn predict(model: &FittedModel, vector: &FeatureVector) -> Result<Prediction> {
    if let Some(reason) = vector.mismatch(&model.schema) {
        return Err(BoxOfficeError::schema_mismatch(format!(
            "query vector: {reason}"
        )));
    }

    let row = vector.values();
    let mut totals = [0.0; N_CLASSES];
    for tree in &model.trees {
        match model.voting {
            Voting::Majority => totals[tree.vote(row)] += 1.0,
            Voting::Average => {
                for (total, p) in totals.iter_mut().zip(tree.distribution(row)) {
                    *total += p;
                }
            }
        }
    }

    let n_trees = model.trees.len().max(1) as f64;
    let probabilities = ClassProbabilities::new(totals.map(|t| t / n_trees));

    Ok(Prediction {
        label: probabilities.argmax(),
        probabilities,
    })
}

impl FittedModel {
    /// See [`predict`].
    pub fn predict(&self, vector: &FeatureVector) -> Result<Prediction> {
        predict(self, vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::dataset::Record;
    use crate::features::{Feature, FeatureSchema, prepare_training};
    use crate::forest::trainer::ForestTrainer;

    fn model(voting: Voting) -> FittedModel {
        let records: Vec<Record> = (0..24)
            .map(|i| {
                let (score, duration) = match i % 3 {
                    0 => (2.0, 70.0),
                    1 => (5.0, 120.0),
                    _ => (8.5, 190.0),
                };
                Record::new(score)
                    .with_duration(duration + (i / 3) as f64)
                    .with_budget(1.0e7)
                    .with_gross(2.0e7)
                    .with_voted_user_count(5_000)
                    .with_movie_social_count(100)
                    .with_director_social_count(10)
            })
            .collect();
        let config = ForestConfig {
            n_trees: 15,
            voting,
            ..ForestConfig::default()
        };
        ForestTrainer::new(config)
            .fit(&prepare_training(&records))
            .unwrap()
    }

    fn query(duration: f64) -> FeatureVector {
        FeatureVector::new(
            FeatureSchema::MOVIE,
            vec![duration, 1.0e7, 2.0e7, 5_000.0, 100.0, 10.0],
        )
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        for voting in [Voting::Majority, Voting::Average] {
            let model = model(voting);
            for duration in [60.0, 100.0, 150.0, 240.0] {
                let prediction = model.predict(&query(duration)).unwrap();
                let sum: f64 = prediction.probabilities.iter().map(|(_, p)| p).sum();
                assert!((sum - 1.0).abs() < 1e-6);
                assert!(prediction.probabilities.iter().all(|(_, p)| (0.0..=1.0).contains(&p)));
                assert_eq!(prediction.label, prediction.probabilities.argmax());
            }
        }
    }

    #[test]
    fn test_majority_votes_are_tree_fractions() {
        let model = model(Voting::Majority);
        let prediction = predict(&model, &query(185.0)).unwrap();

        assert_eq!(prediction.label, Label::Hit);
        for (_, p) in prediction.probabilities.iter() {
            let votes = p * model.n_trees() as f64;
            assert!((votes - votes.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_schema_mismatch() {
        let model = model(Voting::Majority);

        let short = FeatureVector::new(FeatureSchema::MOVIE, vec![100.0; 5]);
        let err = predict(&model, &short).unwrap_err();
        assert!(matches!(err, BoxOfficeError::SchemaMismatch(_)));

        const REORDERED: [Feature; 6] = [
            Feature::Gross,
            Feature::Budget,
            Feature::Duration,
            Feature::VotedUserCount,
            Feature::MovieSocialCount,
            Feature::DirectorSocialCount,
        ];
        let reordered = FeatureVector::new(FeatureSchema::new(&REORDERED), vec![100.0; 6]);
        assert!(matches!(
            predict(&model, &reordered),
            Err(BoxOfficeError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_tie_prefers_lowest_class() {
        let probabilities = ClassProbabilities::new([0.0, 0.5, 0.5]);
        assert_eq!(probabilities.argmax(), Label::Average);
        assert_eq!(probabilities.confidence(), 0.5);
    }

    #[test]
    fn test_serializes_as_label_map() {
        let probabilities = ClassProbabilities::new([0.25, 0.25, 0.5]);
        let json = serde_json::to_value(probabilities).unwrap();
        assert_eq!(json["Flop"], 0.25);
        assert_eq!(json["Hit"], 0.5);
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
