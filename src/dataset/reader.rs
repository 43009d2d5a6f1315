//! Delimited-text reader for film records.
//!
//! The first row is the header. Columns are matched by name, so their order
//! is free and unknown columns are ignored:
//! ```csv
//! movie_title,duration,budget,gross,imdb_score,num_voted_users,movie_facebook_likes,director_facebook_likes
//! Avatar,178,237000000,760505847,7.9,886204,33000,0
//! ```

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use log::debug;

use crate::dataset::label::Label;
use crate::dataset::record::{Record, RecordDetails};
use crate::dataset::writer::LABEL_COLUMN;
use crate::error::{BoxOfficeError, Result};
use crate::features::{FeatureSchema, FeatureVector, TrainingExample, TrainingSet};

/// Canonical column names.
pub mod columns {
    pub const QUALITY_SCORE: &str = "quality_score";
    pub const DURATION: &str = "duration";
    pub const BUDGET: &str = "budget";
    pub const GROSS: &str = "gross";
    pub const VOTED_USER_COUNT: &str = "voted_user_count";
    pub const MOVIE_SOCIAL_COUNT: &str = "movie_social_count";
    pub const DIRECTOR_SOCIAL_COUNT: &str = "director_social_count";
    pub const TITLE: &str = "title";
    pub const TITLE_YEAR: &str = "title_year";
    pub const GENRES: &str = "genres";
    pub const COUNTRY: &str = "country";
    pub const LANGUAGE: &str = "language";
    pub const CONTENT_RATING: &str = "content_rating";
    pub const ASPECT_RATIO: &str = "aspect_ratio";
    pub const COLOR: &str = "color";
}

/// Column names accepted in place of the canonical ones.
const ALIASES: &[(&str, &str)] = &[
    ("imdb_score", columns::QUALITY_SCORE),
    ("num_voted_users", columns::VOTED_USER_COUNT),
    ("movie_facebook_likes", columns::MOVIE_SOCIAL_COUNT),
    ("director_facebook_likes", columns::DIRECTOR_SOCIAL_COUNT),
    ("movie_title", columns::TITLE),
];

const REQUIRED: [&str; 7] = [
    columns::QUALITY_SCORE,
    columns::DURATION,
    columns::BUDGET,
    columns::GROSS,
    columns::VOTED_USER_COUNT,
    columns::MOVIE_SOCIAL_COUNT,
    columns::DIRECTOR_SOCIAL_COUNT,
];

/// Positions of the known columns within a header.
#[derive(Debug)]
struct ColumnMap {
    quality_score: usize,
    duration: usize,
    budget: usize,
    gross: usize,
    voted_user_count: usize,
    movie_social_count: usize,
    director_social_count: usize,
    title: Option<usize>,
    title_year: Option<usize>,
    genres: Option<usize>,
    country: Option<usize>,
    language: Option<usize>,
    content_rating: Option<usize>,
    aspect_ratio: Option<usize>,
    color: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let canonical: Vec<String> = headers
            .iter()
            .map(|h| {
                let h = h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase();
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == h)
                    .map(|(_, name)| name.to_string())
                    .unwrap_or(h)
            })
            .collect();
        let find = |name: &str| canonical.iter().position(|h| h == name);

        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|name| find(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(BoxOfficeError::data_load(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        // Presence of every required column was checked above.
        let required = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            quality_score: required(columns::QUALITY_SCORE),
            duration: required(columns::DURATION),
            budget: required(columns::BUDGET),
            gross: required(columns::GROSS),
            voted_user_count: required(columns::VOTED_USER_COUNT),
            movie_social_count: required(columns::MOVIE_SOCIAL_COUNT),
            director_social_count: required(columns::DIRECTOR_SOCIAL_COUNT),
            title: find(columns::TITLE),
            title_year: find(columns::TITLE_YEAR),
            genres: find(columns::GENRES),
            country: find(columns::COUNTRY),
            language: find(columns::LANGUAGE),
            content_rating: find(columns::CONTENT_RATING),
            aspect_ratio: find(columns::ASPECT_RATIO),
            color: find(columns::COLOR),
        })
    }
}

/// Reader turning delimited text into [`Record`]s.
#[derive(Debug, Clone)]
pub struct RecordReader {
    /// Field delimiter (default: ',').
    delimiter: u8,
}

impl Default for RecordReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordReader {
    /// Create a reader for comma-delimited input.
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Set a custom delimiter byte.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read every record from `input`.
    pub fn read<R: Read>(&self, input: R) -> Result<Vec<Record>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(input);

        let headers = reader
            .headers()
            .map_err(|e| BoxOfficeError::data_load(format!("failed to read header row: {e}")))?
            .clone();
        let map = ColumnMap::from_headers(&headers)?;
        debug!("resolved dataset columns: {map:?}");

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            // Header is line 1.
            let line = row + 2;
            let row = result.map_err(|e| {
                BoxOfficeError::data_load(format!("malformed row at line {line}: {e}"))
            })?;
            records.push(parse_row(&row, &map, line)?);
        }

        Ok(records)
    }
}

/// Read a training export (see [`crate::dataset::export_training_set`]) back
/// into a [`TrainingSet`].
///
/// Feature columns are read as reals, so imputed values such as a count
/// median of 12.5 come back exactly. Every feature cell must be present. The
/// label is derived from the quality score; a `success` column, when present,
/// must agree with it.
pub fn read_training_set<R: Read>(input: R, delimiter: u8) -> Result<TrainingSet> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| BoxOfficeError::data_load(format!("failed to read header row: {e}")))?
        .clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let schema = FeatureSchema::MOVIE;
    let mut missing = Vec::new();
    let score_idx = position(columns::QUALITY_SCORE);
    if score_idx.is_none() {
        missing.push(columns::QUALITY_SCORE);
    }
    let mut feature_idx = Vec::with_capacity(schema.len());
    for name in schema.names() {
        match position(name) {
            Some(idx) => feature_idx.push(idx),
            None => missing.push(name),
        }
    }
    if !missing.is_empty() {
        return Err(BoxOfficeError::data_load(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }
    let score_idx = score_idx.unwrap_or_default();
    let label_idx = position(LABEL_COLUMN);

    let mut examples = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let line = row + 2;
        let row = result.map_err(|e| {
            BoxOfficeError::data_load(format!("malformed row at line {line}: {e}"))
        })?;
        let cell = |idx: usize| row.get(idx).map(str::trim).unwrap_or("");

        let quality_score = parse_real(cell(score_idx), columns::QUALITY_SCORE, line)?
            .ok_or_else(|| required_cell(columns::QUALITY_SCORE, line))?;

        let mut values = Vec::with_capacity(feature_idx.len());
        for (&idx, name) in feature_idx.iter().zip(schema.names()) {
            let value = parse_real(cell(idx), name, line)?
                .ok_or_else(|| required_cell(name, line))?;
            values.push(value);
        }

        let label = Label::from_score(quality_score);
        if let Some(idx) = label_idx {
            let written: Label = cell(idx).parse()?;
            if written != label {
                return Err(BoxOfficeError::data_load(format!(
                    "line {line}: label {written} does not match quality score {quality_score}"
                )));
            }
        }

        examples.push(TrainingExample {
            features: FeatureVector::new(schema, values),
            label,
            quality_score,
        });
    }

    Ok(TrainingSet::from_examples(schema, examples))
}

fn required_cell(column: &str, line: usize) -> BoxOfficeError {
    BoxOfficeError::data_load(format!("line {line}: column `{column}` is required"))
}

fn parse_row(row: &StringRecord, map: &ColumnMap, line: usize) -> Result<Record> {
    let cell = |idx: usize| row.get(idx).map(str::trim).unwrap_or("");
    let text = |idx: Option<usize>| {
        idx.map(|i| cell(i))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let quality_score = parse_real(cell(map.quality_score), columns::QUALITY_SCORE, line)?
        .ok_or_else(|| required_cell(columns::QUALITY_SCORE, line))?;

    let duration = parse_real(cell(map.duration), columns::DURATION, line)?;
    if let Some(minutes) = duration.filter(|m| *m <= 0.0) {
        return Err(BoxOfficeError::data_load(format!(
            "line {line}: column `{}` must be positive, got {minutes}",
            columns::DURATION
        )));
    }

    Ok(Record {
        quality_score,
        duration,
        budget: parse_amount(cell(map.budget), columns::BUDGET, line)?,
        gross: parse_amount(cell(map.gross), columns::GROSS, line)?,
        voted_user_count: parse_count(cell(map.voted_user_count), columns::VOTED_USER_COUNT, line)?,
        movie_social_count: parse_count(
            cell(map.movie_social_count),
            columns::MOVIE_SOCIAL_COUNT,
            line,
        )?,
        director_social_count: parse_count(
            cell(map.director_social_count),
            columns::DIRECTOR_SOCIAL_COUNT,
            line,
        )?,
        details: RecordDetails {
            title: text(map.title),
            title_year: map.title_year.and_then(|i| parse_year(cell(i))),
            genres: text(map.genres),
            country: text(map.country),
            language: text(map.language),
            content_rating: text(map.content_rating),
            aspect_ratio: map.aspect_ratio.and_then(|i| parse_ratio(cell(i))),
            color: text(map.color),
        },
    })
}

/// Parse a finite real; an empty cell is a missing value.
fn parse_real(value: &str, column: &str, line: usize) -> Result<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(BoxOfficeError::data_load(format!(
            "line {line}: column `{column}` is not a finite number: {value:?}"
        ))),
    }
}

fn parse_amount(value: &str, column: &str, line: usize) -> Result<Option<f64>> {
    match parse_real(value, column, line)? {
        Some(v) if v < 0.0 => Err(BoxOfficeError::data_load(format!(
            "line {line}: column `{column}` must be non-negative, got {v}"
        ))),
        other => Ok(other),
    }
}

/// Parse a non-negative whole number. `"1200.0"` is accepted as 1200.
fn parse_count(value: &str, column: &str, line: usize) -> Result<Option<u64>> {
    match parse_amount(value, column, line)? {
        Some(v) if v.fract() != 0.0 => Err(BoxOfficeError::data_load(format!(
            "line {line}: column `{column}` must be a whole number, got {v}"
        ))),
        Some(v) => Ok(Some(v as u64)),
        None => Ok(None),
    }
}

fn parse_year(value: &str) -> Option<u32> {
    let year = value.parse::<f64>().ok()?;
    (year.is_finite() && year >= 0.0 && year.fract() == 0.0).then_some(year as u32)
}

fn parse_ratio(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|r| r.is_finite() && *r > 0.0)
}
