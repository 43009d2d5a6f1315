//! Pipeline configuration.
//!
//! Every setting has a default matching the reference behaviour: 100 trees,
//! seed 42, fully grown trees, `sqrt` feature sampling and majority voting.
//! A configuration can be loaded from a JSON file; any omitted key falls back
//! to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BoxOfficeError, Result};

/// Top-level configuration for the classification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Random forest settings.
    pub forest: ForestConfig,
    /// Field delimiter of the tabular source.
    pub delimiter: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            delimiter: ',',
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        self.forest.validate()
    }

    /// The delimiter as a single byte, as the csv reader expects it. Only
    /// ASCII delimiters fit in one byte.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                BoxOfficeError::invalid_config(format!(
                    "delimiter must be an ASCII character, got {:?}",
                    self.delimiter
                ))
            })
    }
}

/// Configuration for the random forest classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Seed of the master random number generator.
    pub seed: u64,
    /// Maximum tree depth (`None` grows trees until leaves are pure).
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples required in each child of a split.
    pub min_samples_leaf: usize,
    /// Number of features examined per split.
    pub max_features: MaxFeatures,
    /// Draw a bootstrap sample per tree instead of using the full set.
    pub bootstrap: bool,
    /// How tree outputs are aggregated into class probabilities.
    pub voting: Voting,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            voting: Voting::Majority,
        }
    }
}

impl ForestConfig {
    /// Default settings with a different seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(BoxOfficeError::invalid_config("n_trees must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(BoxOfficeError::invalid_config(
                "min_samples_split must be at least 2",
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(BoxOfficeError::invalid_config(
                "min_samples_leaf must be at least 1",
            ));
        }
        if self.max_depth == Some(0) {
            return Err(BoxOfficeError::invalid_config("max_depth must be at least 1"));
        }
        match self.max_features {
            MaxFeatures::Count(0) => Err(BoxOfficeError::invalid_config(
                "max_features count must be at least 1",
            )),
            MaxFeatures::Fraction(f) if !(f > 0.0 && f <= 1.0) => Err(
                BoxOfficeError::invalid_config("max_features fraction must be in (0, 1]"),
            ),
            _ => Ok(()),
        }
    }
}

/// Strategy for choosing how many features each split examines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n))`, at least 1.
    Sqrt,
    /// `floor(log2(n))`, at least 1.
    Log2,
    /// Every feature.
    All,
    /// A fixed number of features (capped at `n`).
    Count(usize),
    /// A fraction of the features, at least 1.
    Fraction(f64),
}

impl MaxFeatures {
    /// Resolve the strategy against a feature count.
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match *self {
            MaxFeatures::Sqrt => n.sqrt().floor() as usize,
            MaxFeatures::Log2 => n.log2().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(c) => c,
            MaxFeatures::Fraction(f) => (f * n).floor() as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Aggregation of per-tree outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voting {
    /// Each tree casts one vote for its leaf's majority class; probabilities
    /// are vote fractions.
    Majority,
    /// Probabilities are the mean of the trees' leaf class distributions.
    Average,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forest_config_default() {
        let config = ForestConfig::default();
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.seed, 42);
        assert!(config.bootstrap);
        assert_eq!(config.voting, Voting::Majority);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(6), 2);
        assert_eq!(MaxFeatures::Log2.resolve(6), 2);
        assert_eq!(MaxFeatures::All.resolve(6), 6);
        assert_eq!(MaxFeatures::Count(10).resolve(6), 6);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(6), 3);
        assert_eq!(MaxFeatures::Fraction(0.01).resolve(6), 1);
    }

    #[test]
    fn test_invalid_forest_config() {
        let config = ForestConfig {
            n_trees: 0,
            ..ForestConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ForestConfig {
            max_features: MaxFeatures::Fraction(1.5),
            ..ForestConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_delimiter_byte() {
        let config = PipelineConfig {
            delimiter: '\t',
            ..PipelineConfig::default()
        };
        assert_eq!(config.delimiter_byte().unwrap(), b'\t');

        let config = PipelineConfig {
            delimiter: 'é',
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.delimiter_byte(),
            Err(BoxOfficeError::InvalidConfig(_))
        ));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "forest": { "n_trees": 10, "voting": "average" } }"#)
                .unwrap();
        assert_eq!(config.forest.n_trees, 10);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.forest.voting, Voting::Average);
        assert_eq!(config.delimiter, ',');
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "delimiter": ";", "forest": { "seed": 7 } }"#).unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.delimiter_byte().unwrap(), b';');
        assert_eq!(config.forest.seed, 7);
    }
}
