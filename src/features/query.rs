//! Validation of user-supplied query inputs.
//!
//! Query inputs come from direct user entry, so unlike historical records
//! they are never imputed or clamped: a missing, non-numeric or out-of-range
//! value is a [`BoxOfficeError::Validation`] naming the field.

use serde::{Deserialize, Serialize};

use crate::error::{BoxOfficeError, Result};
use crate::features::schema::{Feature, FeatureSchema, FeatureVector};

/// Budget and gross are entered in millions of currency units.
pub const CURRENCY_SCALE: f64 = 1_000_000.0;

/// Accepted range of one query input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputRange {
    pub feature: Feature,
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

impl InputRange {
    fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Documented input ranges, in schema order.
pub const INPUT_RANGES: [InputRange; 6] = [
    InputRange {
        feature: Feature::Duration,
        min: 60.0,
        max: 240.0,
        unit: "minutes",
    },
    InputRange {
        feature: Feature::Budget,
        min: 1.0,
        max: 500.0,
        unit: "millions",
    },
    InputRange {
        feature: Feature::Gross,
        min: 1.0,
        max: 1000.0,
        unit: "millions",
    },
    InputRange {
        feature: Feature::VotedUserCount,
        min: 1_000.0,
        max: 1_000_000.0,
        unit: "users",
    },
    InputRange {
        feature: Feature::MovieSocialCount,
        min: 0.0,
        max: 200_000.0,
        unit: "likes",
    },
    InputRange {
        feature: Feature::DirectorSocialCount,
        min: 0.0,
        max: 10_000.0,
        unit: "likes",
    },
];

/// Raw query inputs, one optional value per modeling attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryInputs {
    /// Running time in minutes.
    pub duration: Option<f64>,
    /// Budget in millions.
    pub budget_millions: Option<f64>,
    /// Expected gross in millions.
    pub gross_millions: Option<f64>,
    pub voted_user_count: Option<f64>,
    pub movie_social_count: Option<f64>,
    pub director_social_count: Option<f64>,
}

impl QueryInputs {
    /// Inputs with every field present.
    pub fn new(
        duration: f64,
        budget_millions: f64,
        gross_millions: f64,
        voted_user_count: f64,
        movie_social_count: f64,
        director_social_count: f64,
    ) -> Self {
        Self {
            duration: Some(duration),
            budget_millions: Some(budget_millions),
            gross_millions: Some(gross_millions),
            voted_user_count: Some(voted_user_count),
            movie_social_count: Some(movie_social_count),
            director_social_count: Some(director_social_count),
        }
    }

    /// Parse inputs from `(field, text)` pairs as entered by a user.
    ///
    /// Field names are the feature column names. Unknown fields and text
    /// that is not a number are validation errors.
    pub fn parse<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut inputs = Self::default();
        for (field, text) in pairs {
            let feature = Feature::ALL
                .into_iter()
                .find(|f| f.name() == field)
                .ok_or_else(|| BoxOfficeError::validation(field, "is not a recognised input"))?;
            let value = text.trim().parse::<f64>().map_err(|_| {
                BoxOfficeError::validation(field, format!("must be a number, got {text:?}"))
            })?;
            *inputs.slot(feature) = Some(value);
        }
        Ok(inputs)
    }

    fn slot(&mut self, feature: Feature) -> &mut Option<f64> {
        match feature {
            Feature::Duration => &mut self.duration,
            Feature::Budget => &mut self.budget_millions,
            Feature::Gross => &mut self.gross_millions,
            Feature::VotedUserCount => &mut self.voted_user_count,
            Feature::MovieSocialCount => &mut self.movie_social_count,
            Feature::DirectorSocialCount => &mut self.director_social_count,
        }
    }

    fn value(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Duration => self.duration,
            Feature::Budget => self.budget_millions,
            Feature::Gross => self.gross_millions,
            Feature::VotedUserCount => self.voted_user_count,
            Feature::MovieSocialCount => self.movie_social_count,
            Feature::DirectorSocialCount => self.director_social_count,
        }
    }
}

/// Validate `inputs` and build the query vector over the movie schema.
///
/// Fields are checked in schema order and the first failure is returned.
/// Budget and gross are expanded from millions to currency units.
pub fn prepare_query(inputs: &QueryInputs) -> Result<FeatureVector> {
    let mut values = Vec::with_capacity(INPUT_RANGES.len());

    for range in &INPUT_RANGES {
        let field = range.feature.name();
        let value = inputs
            .value(range.feature)
            .ok_or_else(|| BoxOfficeError::validation(field, "is required"))?;

        if !value.is_finite() {
            return Err(BoxOfficeError::validation(
                field,
                format!("must be a finite number, got {value}"),
            ));
        }
        if !range.contains(value) {
            return Err(BoxOfficeError::validation(
                field,
                format!(
                    "must be between {} and {} {}, got {value}",
                    range.min, range.max, range.unit
                ),
            ));
        }
        if range.feature.is_count() && value.fract() != 0.0 {
            return Err(BoxOfficeError::validation(
                field,
                format!("must be a whole number, got {value}"),
            ));
        }

        let value = match range.feature {
            Feature::Budget | Feature::Gross => value * CURRENCY_SCALE,
            _ => value,
        };
        values.push(value);
    }

    Ok(FeatureVector::new(FeatureSchema::MOVIE, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> QueryInputs {
        QueryInputs::new(120.0, 50.0, 100.0, 50_000.0, 5_000.0, 1_000.0)
    }

    fn field_of(err: BoxOfficeError) -> String {
        match err {
            BoxOfficeError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_prepare_query_scales_currency() {
        let vector = prepare_query(&valid()).unwrap();

        assert_eq!(vector.schema(), FeatureSchema::MOVIE);
        assert_eq!(
            vector.values(),
            &[120.0, 50_000_000.0, 100_000_000.0, 50_000.0, 5_000.0, 1_000.0]
        );
    }

    #[test]
    fn test_duration_below_floor() {
        let inputs = QueryInputs {
            duration: Some(10.0),
            ..valid()
        };
        let err = prepare_query(&inputs).unwrap_err();
        assert!(err.to_string().contains("between 60 and 240"));
        assert_eq!(field_of(err), "duration");
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let low = QueryInputs::new(60.0, 1.0, 1.0, 1_000.0, 0.0, 0.0);
        assert!(prepare_query(&low).is_ok());

        let high = QueryInputs::new(240.0, 500.0, 1000.0, 1_000_000.0, 200_000.0, 10_000.0);
        assert!(prepare_query(&high).is_ok());
    }

    #[test]
    fn test_each_field_out_of_range() {
        let cases = [
            (
                QueryInputs {
                    budget_millions: Some(0.5),
                    ..valid()
                },
                "budget",
            ),
            (
                QueryInputs {
                    gross_millions: Some(1000.5),
                    ..valid()
                },
                "gross",
            ),
            (
                QueryInputs {
                    voted_user_count: Some(999.0),
                    ..valid()
                },
                "voted_user_count",
            ),
            (
                QueryInputs {
                    movie_social_count: Some(-1.0),
                    ..valid()
                },
                "movie_social_count",
            ),
            (
                QueryInputs {
                    director_social_count: Some(10_001.0),
                    ..valid()
                },
                "director_social_count",
            ),
        ];
        for (inputs, field) in cases {
            assert_eq!(field_of(prepare_query(&inputs).unwrap_err()), field);
        }
    }

    #[test]
    fn test_missing_and_fractional() {
        let missing = QueryInputs {
            gross_millions: None,
            ..valid()
        };
        let err = prepare_query(&missing).unwrap_err();
        assert!(err.to_string().contains("is required"));
        assert_eq!(field_of(err), "gross");

        let fractional = QueryInputs {
            voted_user_count: Some(1500.5),
            ..valid()
        };
        assert_eq!(field_of(prepare_query(&fractional).unwrap_err()), "voted_user_count");

        let nan = QueryInputs {
            duration: Some(f64::NAN),
            ..valid()
        };
        assert_eq!(field_of(prepare_query(&nan).unwrap_err()), "duration");
    }

    #[test]
    fn test_parse() {
        let inputs = QueryInputs::parse([
            ("duration", "120"),
            ("budget", " 50 "),
            ("gross", "100"),
            ("voted_user_count", "50000"),
            ("movie_social_count", "5000"),
            ("director_social_count", "1000"),
        ])
        .unwrap();
        assert_eq!(inputs, valid());

        let err = QueryInputs::parse([("duration", "two hours")]).unwrap_err();
        assert!(err.to_string().contains("must be a number"));
        assert_eq!(field_of(err), "duration");

        let err = QueryInputs::parse([("rating", "5")]).unwrap_err();
        assert_eq!(field_of(err), "rating");
    }
}
