//! Error types for the boxoffice library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`BoxOfficeError`] enum. The variants map onto the failure classes of the
//! classification pipeline:
//!
//! - [`BoxOfficeError::DataLoad`]: the dataset could not be read or is malformed
//! - [`BoxOfficeError::InsufficientData`]: too little data to fit a classifier
//! - [`BoxOfficeError::Validation`]: user-supplied query input was rejected
//! - [`BoxOfficeError::FeatureMismatch`] / [`BoxOfficeError::SchemaMismatch`]:
//!   feature shape disagreement between components (a programming error)
//!
//! # Examples
//!
//! ```
//! use boxoffice::error::{BoxOfficeError, Result};
//!
//! fn check_duration(minutes: f64) -> Result<f64> {
//!     if minutes < 60.0 {
//!         return Err(BoxOfficeError::validation("duration", "must be at least 60"));
//!     }
//!     Ok(minutes)
//! }
//!
//! match check_duration(10.0) {
//!     Ok(_) => println!("accepted"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for boxoffice operations.
#[derive(Error, Debug)]
pub enum BoxOfficeError {
    /// The source is unreadable, malformed, or lacks a required column.
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// The dataset is empty or does not contain at least two label classes.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// User input failed validation. Carries the offending field and the
    /// constraint it violated.
    #[error("Validation error: field `{field}` {constraint}")]
    Validation { field: String, constraint: String },

    /// A training vector does not match the feature schema.
    #[error("Feature mismatch: {0}")]
    FeatureMismatch(String),

    /// A query vector does not match the schema the model was fitted with.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Configuration could not be loaded or holds invalid values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Delimited-text reader/writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with BoxOfficeError.
pub type Result<T> = std::result::Result<T, BoxOfficeError>;

impl BoxOfficeError {
    /// Create a new data load error.
    pub fn data_load<S: Into<String>>(msg: S) -> Self {
        BoxOfficeError::DataLoad(msg.into())
    }

    /// Create a new insufficient data error.
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        BoxOfficeError::InsufficientData(msg.into())
    }

    /// Create a new validation error for `field`.
    pub fn validation<F: Into<String>, C: Into<String>>(field: F, constraint: C) -> Self {
        BoxOfficeError::Validation {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    /// Create a new feature mismatch error.
    pub fn feature_mismatch<S: Into<String>>(msg: S) -> Self {
        BoxOfficeError::FeatureMismatch(msg.into())
    }

    /// Create a new schema mismatch error.
    pub fn schema_mismatch<S: Into<String>>(msg: S) -> Self {
        BoxOfficeError::SchemaMismatch(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        BoxOfficeError::InvalidConfig(msg.into())
    }

    /// The field named by a validation error, if this is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            BoxOfficeError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Whether this error signals a contract violation between components.
    ///
    /// Such errors are fatal: repeating the call with the same inputs cannot
    /// succeed.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            BoxOfficeError::FeatureMismatch(_) | BoxOfficeError::SchemaMismatch(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = BoxOfficeError::data_load("missing column `budget`");
        assert_eq!(error.to_string(), "Data load error: missing column `budget`");

        let error = BoxOfficeError::insufficient_data("dataset is empty");
        assert_eq!(error.to_string(), "Insufficient data: dataset is empty");

        let error = BoxOfficeError::validation("duration", "must be between 60 and 240");
        assert_eq!(
            error.to_string(),
            "Validation error: field `duration` must be between 60 and 240"
        );
        assert_eq!(error.field(), Some("duration"));
    }

    #[test]
    fn test_contract_violation() {
        assert!(BoxOfficeError::schema_mismatch("arity 5 != 6").is_contract_violation());
        assert!(BoxOfficeError::feature_mismatch("order").is_contract_violation());
        assert!(!BoxOfficeError::insufficient_data("empty").is_contract_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = BoxOfficeError::from(io_error);

        match error {
            BoxOfficeError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
