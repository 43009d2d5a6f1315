//! Feature identities, ordered schemas and feature vectors.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::dataset::Record;

/// One modeling attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Duration,
    Budget,
    Gross,
    VotedUserCount,
    MovieSocialCount,
    DirectorSocialCount,
}

impl Feature {
    /// The six modeling attributes in declaration order.
    pub const ALL: [Feature; 6] = [
        Feature::Duration,
        Feature::Budget,
        Feature::Gross,
        Feature::VotedUserCount,
        Feature::MovieSocialCount,
        Feature::DirectorSocialCount,
    ];

    /// Column name of this feature.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Duration => "duration",
            Feature::Budget => "budget",
            Feature::Gross => "gross",
            Feature::VotedUserCount => "voted_user_count",
            Feature::MovieSocialCount => "movie_social_count",
            Feature::DirectorSocialCount => "director_social_count",
        }
    }

    /// Whether this feature holds whole-number counts.
    pub fn is_count(self) -> bool {
        matches!(
            self,
            Feature::VotedUserCount | Feature::MovieSocialCount | Feature::DirectorSocialCount
        )
    }

    /// The raw (possibly missing) value of this feature in a record.
    pub fn value_of(self, record: &Record) -> Option<f64> {
        match self {
            Feature::Duration => record.duration,
            Feature::Budget => record.budget,
            Feature::Gross => record.gross,
            Feature::VotedUserCount => record.voted_user_count.map(|c| c as f64),
            Feature::MovieSocialCount => record.movie_social_count.map(|c| c as f64),
            Feature::DirectorSocialCount => record.director_social_count.map(|c| c as f64),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered list of features.
///
/// Vectors and models both carry their schema, which is how arity and field
/// order are checked between training and prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    features: &'static [Feature],
}

impl FeatureSchema {
    /// The six-attribute movie schema.
    pub const MOVIE: FeatureSchema = FeatureSchema::new(&Feature::ALL);

    pub const fn new(features: &'static [Feature]) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &'static [Feature] {
        self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Position of `feature` in this schema.
    pub fn position(&self, feature: Feature) -> Option<usize> {
        self.features.iter().position(|f| *f == feature)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.features.iter().map(|f| f.name())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::MOVIE
    }
}

impl Serialize for FeatureSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.features)
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// A numeric feature vector tagged with the schema it was built against.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Pair values with a schema. No shape check happens here; the trainer
    /// and predictor reject vectors that disagree with their schema.
    pub fn new(schema: FeatureSchema, values: Vec<f64>) -> Self {
        Self { schema, values }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of `feature`, if the schema contains it.
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.schema
            .position(feature)
            .and_then(|i| self.values.get(i).copied())
    }

    /// Describe how this vector disagrees with `expected`, if it does.
    pub fn mismatch(&self, expected: &FeatureSchema) -> Option<String> {
        if self.schema != *expected {
            return Some(format!("schema {} does not match {}", self.schema, expected));
        }
        if self.values.len() != expected.len() {
            return Some(format!(
                "{} values for a schema of {} features",
                self.values.len(),
                expected.len()
            ));
        }
        None
    }
}
