//! Median imputation of missing feature values.

use serde::Serialize;

use crate::dataset::Record;
use crate::features::schema::{Feature, FeatureSchema};

/// Per-column medians computed over a record collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputationStats {
    schema: FeatureSchema,
    medians: Vec<f64>,
}

impl ImputationStats {
    /// Compute medians of every schema column over `records`, skipping
    /// missing values. A column without any value imputes 0.0.
    pub fn compute(schema: FeatureSchema, records: &[Record]) -> Self {
        let medians = schema
            .features()
            .iter()
            .map(|&feature| {
                let mut present: Vec<f64> =
                    records.iter().filter_map(|r| feature.value_of(r)).collect();
                median(&mut present).unwrap_or(0.0)
            })
            .collect();

        Self { schema, medians }
    }

    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    /// Median used for `feature`.
    pub fn median_of(&self, feature: Feature) -> Option<f64> {
        self.schema
            .position(feature)
            .and_then(|i| self.medians.get(i).copied())
    }

    /// Fill a schema row: present values pass through, missing ones take the
    /// column median.
    pub fn fill(&self, record: &Record) -> Vec<f64> {
        self.schema
            .features()
            .iter()
            .zip(&self.medians)
            .map(|(feature, median)| feature.value_of(record).unwrap_or(*median))
            .collect()
    }
}

/// Median of `values`, sorting them in place. The mean of the two middle
/// values is used for even lengths.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0]), Some(3.0));
        assert_eq!(median(&mut [9.0, 1.0, 5.0]), Some(5.0));
        assert_eq!(median(&mut [40.0, 10.0, 60.0, 90.0]), Some(50.0));
    }

    #[test]
    fn test_budget_imputed_with_median_of_others() {
        let records = vec![
            Record::new(5.0).with_budget(10.0),
            Record::new(5.0).with_budget(40.0),
            Record::new(5.0),
            Record::new(5.0).with_budget(60.0),
            Record::new(5.0).with_budget(90.0),
        ];
        let stats = ImputationStats::compute(FeatureSchema::MOVIE, &records);

        assert_eq!(stats.median_of(Feature::Budget), Some(50.0));
        let row = stats.fill(&records[2]);
        assert_eq!(row[1], 50.0);
        let row = stats.fill(&records[0]);
        assert_eq!(row[1], 10.0);
    }

    #[test]
    fn test_count_median_is_exact() {
        let records = vec![
            Record::new(5.0)
                .with_voted_user_count(10)
                .with_movie_social_count(1)
                .with_director_social_count(3),
            Record::new(5.0)
                .with_voted_user_count(15)
                .with_movie_social_count(2)
                .with_director_social_count(4),
            Record::new(5.0),
        ];
        let stats = ImputationStats::compute(FeatureSchema::MOVIE, &records);
        assert_eq!(stats.median_of(Feature::VotedUserCount), Some(12.5));

        let row = stats.fill(&records[2]);
        assert_eq!(&row[3..], &[12.5, 1.5, 3.5]);
    }

    #[test]
    fn test_empty_column_imputes_zero() {
        let records = vec![Record::new(5.0), Record::new(2.0)];
        let stats = ImputationStats::compute(FeatureSchema::MOVIE, &records);
        assert_eq!(stats.fill(&records[0]), vec![0.0; 6]);
    }
}
