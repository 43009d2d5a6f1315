//! Delimited-text exports.
//!
//! Numbers are written with Rust's shortest round-trip formatting, so reading
//! an export back yields bit-identical values.

use std::io::Write;

use csv::WriterBuilder;

use crate::dataset::Dataset;
use crate::dataset::reader::columns;
use crate::dataset::record::Record;
use crate::error::Result;
use crate::features::{Feature, ImputationStats, TrainingSet, median};

/// Column holding the derived label in training exports.
pub const LABEL_COLUMN: &str = "success";

/// Column holding the derived label in the dashboard export.
pub const CATEGORY_COLUMN: &str = "success_category";

const DETAIL_COLUMNS: [&str; 8] = [
    columns::TITLE,
    columns::TITLE_YEAR,
    columns::GENRES,
    columns::COUNTRY,
    columns::LANGUAGE,
    columns::CONTENT_RATING,
    columns::ASPECT_RATIO,
    columns::COLOR,
];

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write the training set: quality score, the imputed feature columns and
/// the label. Reloading the output reproduces the feature vectors.
pub fn export_training_set<W: Write>(
    training_set: &TrainingSet,
    writer: W,
    delimiter: u8,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    let mut header = vec![columns::QUALITY_SCORE];
    header.extend(training_set.schema().names());
    header.push(LABEL_COLUMN);
    wtr.write_record(&header)?;

    for example in training_set.examples() {
        let mut row = vec![example.quality_score.to_string()];
        row.extend(example.features.values().iter().map(|v| v.to_string()));
        row.push(example.label.to_string());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write records in the canonical column layout; missing values become
/// empty cells.
pub fn export_records<'a, W, I>(records: I, writer: W, delimiter: u8) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    let mut header = vec![columns::QUALITY_SCORE];
    header.extend(Feature::ALL.iter().map(|f| f.name()));
    header.extend(DETAIL_COLUMNS);
    wtr.write_record(&header)?;

    for record in records {
        let details = &record.details;
        wtr.write_record([
            record.quality_score.to_string(),
            opt(record.duration),
            opt(record.budget),
            opt(record.gross),
            opt(record.voted_user_count),
            opt(record.movie_social_count),
            opt(record.director_social_count),
            opt(details.title.as_deref()),
            opt(details.title_year),
            opt(details.genres.as_deref()),
            opt(details.country.as_deref()),
            opt(details.language.as_deref()),
            opt(details.content_rating.as_deref()),
            opt(details.aspect_ratio),
            opt(details.color.as_deref()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the BI-dashboard export.
///
/// Missing budget and gross count as 0 and missing duration takes the median
/// duration. Derived columns: `profit`, `roi`, `budget_millions` and
/// `gross_millions`.
///
/// `roi` is a percentage of budget. A film without a budget gets `roi` 0
/// rather than an undefined value, so the column is always numeric; such
/// rows can be told apart by their `budget` of 0.
pub fn export_dashboard<W: Write>(dataset: &Dataset, writer: W, delimiter: u8) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    let mut durations: Vec<f64> = dataset.iter().filter_map(|r| r.duration).collect();
    let median_duration = median(&mut durations).unwrap_or(0.0);

    wtr.write_record([
        columns::TITLE,
        columns::DURATION,
        columns::BUDGET,
        columns::GROSS,
        columns::QUALITY_SCORE,
        CATEGORY_COLUMN,
        columns::VOTED_USER_COUNT,
        columns::MOVIE_SOCIAL_COUNT,
        columns::DIRECTOR_SOCIAL_COUNT,
        columns::TITLE_YEAR,
        columns::GENRES,
        columns::COUNTRY,
        columns::LANGUAGE,
        columns::CONTENT_RATING,
        columns::ASPECT_RATIO,
        columns::COLOR,
        "profit",
        "roi",
        "budget_millions",
        "gross_millions",
    ])?;

    for record in dataset {
        let details = &record.details;
        let budget = record.budget.unwrap_or(0.0);
        let gross = record.gross.unwrap_or(0.0);
        wtr.write_record([
            opt(details.title.as_deref()),
            record.duration.unwrap_or(median_duration).to_string(),
            budget.to_string(),
            gross.to_string(),
            record.quality_score.to_string(),
            record.label().to_string(),
            opt(record.voted_user_count),
            opt(record.movie_social_count),
            opt(record.director_social_count),
            opt(details.title_year),
            opt(details.genres.as_deref()),
            opt(details.country.as_deref()),
            opt(details.language.as_deref()),
            opt(details.content_rating.as_deref()),
            opt(details.aspect_ratio),
            opt(details.color.as_deref()),
            record.profit().to_string(),
            record.roi().to_string(),
            (budget / 1e6).to_string(),
            (gross / 1e6).to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Medians as a two-column table, for inspecting what was imputed.
pub fn export_imputation<W: Write>(
    stats: &ImputationStats,
    writer: W,
    delimiter: u8,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    wtr.write_record(["feature", "median"])?;
    for &feature in stats.schema().features() {
        wtr.write_record([feature.name().to_string(), opt(stats.median_of(feature))])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RecordReader;
    use crate::dataset::reader::read_training_set;
    use crate::features::prepare_training;

    fn records() -> Vec<Record> {
        vec![
            Record::new(7.9)
                .with_duration(178.0)
                .with_budget(237_000_000.0)
                .with_gross(760_505_847.0)
                .with_voted_user_count(886_204)
                .with_movie_social_count(33_000)
                .with_director_social_count(0)
                .with_title("Avatar"),
            Record::new(3.0).with_duration(0.1 + 0.2).with_budget(1.5),
            Record::new(6.0).with_title("Comma, Inc."),
        ]
    }

    #[test]
    fn test_records_round_trip() {
        let records = records();
        let mut out = Vec::new();
        export_records(&records, &mut out, b',').unwrap();

        let reloaded = RecordReader::new().read(out.as_slice()).unwrap();
        assert_eq!(reloaded, records);
    }

    #[test]
    fn test_training_set_round_trip() {
        let set = prepare_training(&records());
        let mut out = Vec::new();
        export_training_set(&set, &mut out, b';').unwrap();

        let reloaded = RecordReader::new()
            .with_delimiter(b';')
            .read(out.as_slice())
            .unwrap();
        let again = prepare_training(&reloaded);

        assert_eq!(again.examples(), set.examples());
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().next().unwrap().ends_with(";success"));
    }

    #[test]
    fn test_training_set_round_trip_keeps_fractional_median() {
        let records = vec![
            Record::new(2.0).with_duration(90.0).with_voted_user_count(10),
            Record::new(5.0).with_duration(95.0).with_voted_user_count(15),
            Record::new(8.0).with_duration(100.0),
        ];
        let set = prepare_training(&records);
        assert_eq!(set.examples()[2].features.get(Feature::VotedUserCount), Some(12.5));

        let mut out = Vec::new();
        export_training_set(&set, &mut out, b',').unwrap();

        // The record reader only accepts whole counts.
        assert!(RecordReader::new().read(out.as_slice()).is_err());
        let reloaded = read_training_set(out.as_slice(), b',').unwrap();
        assert_eq!(reloaded.examples(), set.examples());
    }

    #[test]
    fn test_dashboard_export() {
        let dataset = Dataset::from_records(records());
        let mut out = Vec::new();
        export_dashboard(&dataset, &mut out, b',').unwrap();

        let mut rdr = csv::Reader::from_reader(out.as_slice());
        let headers = rdr.headers().unwrap().clone();
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][col("success_category")], "Hit");
        assert_eq!(&rows[0][col("budget_millions")], "237");
        assert_eq!(&rows[0][col("profit")], "523505847");
        // Missing gross counts as zero; missing budget gives zero roi.
        assert_eq!(&rows[1][col("gross")], "0");
        assert_eq!(&rows[2][col("roi")], "0");
        // Missing duration takes the median of the present ones.
        let median = (178.0 + (0.1 + 0.2)) / 2.0;
        assert_eq!(&rows[2][col("duration")], median.to_string());
        assert_eq!(&rows[2][col("title")], "Comma, Inc.");
    }

    #[test]
    fn test_exports_carry_aspect_ratio_and_color() {
        let mut avatar = records().remove(0);
        avatar.details.aspect_ratio = Some(1.78);
        avatar.details.color = Some("Color".to_string());
        let records = vec![avatar, Record::new(4.0).with_duration(90.0)];

        let mut out = Vec::new();
        export_dashboard(&Dataset::from_records(records.clone()), &mut out, b',').unwrap();
        let mut rdr = csv::Reader::from_reader(out.as_slice());
        let headers = rdr.headers().unwrap().clone();
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][col("aspect_ratio")], "1.78");
        assert_eq!(&rows[0][col("color")], "Color");
        assert_eq!(&rows[1][col("aspect_ratio")], "");

        let mut out = Vec::new();
        export_records(&records, &mut out, b',').unwrap();
        let reloaded = RecordReader::new().read(out.as_slice()).unwrap();
        assert_eq!(reloaded[0].details.aspect_ratio, Some(1.78));
        assert_eq!(reloaded[0].details.color.as_deref(), Some("Color"));
        assert_eq!(reloaded, records);
    }

    #[test]
    fn test_export_imputation() {
        let set = prepare_training(&records());
        let mut out = Vec::new();
        export_imputation(set.imputation().unwrap(), &mut out, b',').unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("feature,median\nduration,"));
        assert_eq!(text.lines().count(), 7);
    }
}
