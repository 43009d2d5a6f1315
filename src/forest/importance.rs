//! Feature importance ranking.

use serde::Serialize;

use crate::features::Feature;
use crate::forest::model::FittedModel;

/// A feature paired with its importance score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedFeature {
    pub feature: Feature,
    pub importance: f64,
}

impl RankedFeature {
    pub fn name(&self) -> &'static str {
        self.feature.name()
    }
}

/// Rank the model's features by importance, highest first.
///
/// Scores are the normalized mean decrease in Gini impurity (they sum to 1
/// unless no tree ever split, in which case all are 0). Equal scores keep
/// the schema's declaration order.
pub fn rank(model: &FittedModel) -> Vec<RankedFeature> {
    let mut ranked: Vec<RankedFeature> = model
        .schema()
        .features()
        .iter()
        .zip(model.feature_importances())
        .map(|(&feature, &importance)| RankedFeature {
            feature,
            importance,
        })
        .collect();

    // Stable sort: ties stay in declaration order.
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}
