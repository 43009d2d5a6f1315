//! A single film record.

use serde::{Deserialize, Serialize};

use crate::dataset::label::Label;

/// One film's attributes as read from the source dataset.
///
/// The six modeling attributes are optional because the source leaves cells
/// empty; missing values are imputed when the training set is prepared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Continuous quality score, nominally in `(0, 10]`.
    pub quality_score: f64,
    /// Running time in minutes.
    pub duration: Option<f64>,
    /// Production budget in currency units.
    pub budget: Option<f64>,
    /// Gross earnings in currency units.
    pub gross: Option<f64>,
    /// Number of users who voted on the quality score.
    pub voted_user_count: Option<u64>,
    /// Social-engagement count of the film itself.
    pub movie_social_count: Option<u64>,
    /// Social-engagement count of the director.
    pub director_social_count: Option<u64>,
    /// Descriptive columns, carried through but never modeled.
    pub details: RecordDetails,
}

/// Pass-through descriptive columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDetails {
    pub title: Option<String>,
    pub title_year: Option<u32>,
    pub genres: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub content_rating: Option<String>,
    /// Screen width over height, e.g. 2.35.
    pub aspect_ratio: Option<f64>,
    /// "Color" or "Black and White".
    pub color: Option<String>,
}

impl Record {
    /// Create a record with only a quality score.
    pub fn new(quality_score: f64) -> Self {
        Self {
            quality_score,
            duration: None,
            budget: None,
            gross: None,
            voted_user_count: None,
            movie_social_count: None,
            director_social_count: None,
            details: RecordDetails::default(),
        }
    }

    pub fn with_duration(mut self, minutes: f64) -> Self {
        self.duration = Some(minutes);
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_gross(mut self, gross: f64) -> Self {
        self.gross = Some(gross);
        self
    }

    pub fn with_voted_user_count(mut self, count: u64) -> Self {
        self.voted_user_count = Some(count);
        self
    }

    pub fn with_movie_social_count(mut self, count: u64) -> Self {
        self.movie_social_count = Some(count);
        self
    }

    pub fn with_director_social_count(mut self, count: u64) -> Self {
        self.director_social_count = Some(count);
        self
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.details.title = Some(title.into());
        self
    }

    /// Label of this record's quality score.
    pub fn label(&self) -> Label {
        Label::from_score(self.quality_score)
    }

    /// Gross minus budget, treating missing amounts as zero.
    pub fn profit(&self) -> f64 {
        self.gross.unwrap_or(0.0) - self.budget.unwrap_or(0.0)
    }

    /// Profit as a percentage of budget; zero when there is no budget.
    pub fn roi(&self) -> f64 {
        let budget = self.budget.unwrap_or(0.0);
        if budget > 0.0 {
            self.profit() / budget * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let record = Record::new(7.2)
            .with_duration(120.0)
            .with_budget(50_000_000.0)
            .with_voted_user_count(10_000)
            .with_title("Heat");

        assert_eq!(record.duration, Some(120.0));
        assert_eq!(record.gross, None);
        assert_eq!(record.details.title.as_deref(), Some("Heat"));
        assert_eq!(record.label(), Label::Hit);
    }

    #[test]
    fn test_profit_and_roi() {
        let record = Record::new(5.0).with_budget(100.0).with_gross(250.0);
        assert_eq!(record.profit(), 150.0);
        assert_eq!(record.roi(), 150.0);

        let no_budget = Record::new(5.0).with_gross(250.0);
        assert_eq!(no_budget.profit(), 250.0);
        assert_eq!(no_budget.roi(), 0.0);
    }
}
