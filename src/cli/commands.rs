//! Command implementations for the boxoffice CLI.

use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::PipelineConfig;
use crate::dataset::{
    Dataset, export_dashboard, export_imputation, export_records, export_training_set,
};
use crate::error::BoxOfficeError;
use crate::forest::{ForestTrainer, evaluate, rank, split_records};
use crate::pipeline::{label_dataset, predict_one, summary_stats};

/// Execute a CLI command.
pub fn execute_command(args: BoxOfficeArgs) -> Result<()> {
    let config = load_config(&args)?;
    match &args.command {
        Command::Summary(summary_args) => show_summary(summary_args, &config, &args),
        Command::Predict(predict_args) => run_prediction(predict_args, config, &args),
        Command::Importance(importance_args) => show_importance(importance_args, config, &args),
        Command::Evaluate(evaluate_args) => run_evaluation(evaluate_args, config, &args),
        Command::Export(export_args) => run_export(export_args, &config, &args),
    }
}

fn load_config(args: &BoxOfficeArgs) -> Result<PipelineConfig> {
    match &args.config {
        Some(path) => {
            debug!("loading configuration from {}", path.display());
            PipelineConfig::from_file(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn load_dataset(path: &std::path::Path, config: &PipelineConfig) -> Result<Dataset> {
    Dataset::load_with_delimiter(path, config.delimiter_byte()?)
        .with_context(|| format!("failed to load dataset {}", path.display()))
}

/// Show record and per-label counts.
fn show_summary(
    args: &SummaryArgs,
    config: &PipelineConfig,
    cli_args: &BoxOfficeArgs,
) -> Result<()> {
    let dataset = load_dataset(&args.dataset, config)?;
    let stats = summary_stats(&label_dataset(&dataset));
    output_result("Dataset summary", &stats, cli_args)?;
    Ok(())
}

/// Refit on the full dataset and predict one film.
fn run_prediction(
    args: &PredictArgs,
    mut config: PipelineConfig,
    cli_args: &BoxOfficeArgs,
) -> Result<()> {
    if let Some(seed) = args.seed {
        config.forest.seed = seed;
    }
    let inputs = args.query_inputs().context("invalid prediction input")?;
    let dataset = load_dataset(&args.dataset, &config)?;
    let training_set = label_dataset(&dataset);

    let result =
        predict_one(&training_set, &inputs, &config.forest).context("prediction failed")?;
    output_result("Prediction", &result, cli_args)?;
    Ok(())
}

/// Fit on the full dataset and rank features.
fn show_importance(
    args: &ImportanceArgs,
    mut config: PipelineConfig,
    cli_args: &BoxOfficeArgs,
) -> Result<()> {
    if let Some(seed) = args.seed {
        config.forest.seed = seed;
    }
    let dataset = load_dataset(&args.dataset, &config)?;
    let training_set = label_dataset(&dataset);

    let model = ForestTrainer::new(config.forest)
        .fit(&training_set)
        .context("training failed")?;
    let report = ImportanceReport {
        importances: rank(&model),
        model: model.metadata().clone(),
    };
    output_result("Feature importance", &report, cli_args)?;
    Ok(())
}

/// Fit on a seeded train split and score the held-out part.
fn run_evaluation(
    args: &EvaluateArgs,
    mut config: PipelineConfig,
    cli_args: &BoxOfficeArgs,
) -> Result<()> {
    if let Some(seed) = args.seed {
        config.forest.seed = seed;
    }
    let dataset = load_dataset(&args.dataset, &config)?;

    let (train, test) = split_records(dataset.records(), args.test_ratio, config.forest.seed)
        .context("cannot split dataset")?;
    info!("evaluating on {} held-out records", test.len());

    let model = ForestTrainer::new(config.forest)
        .fit(&train)
        .context("training failed")?;
    let report = EvaluationReport {
        test_ratio: args.test_ratio,
        evaluation: evaluate(&model, &test)?,
    };
    output_result("Evaluation", &report, cli_args)?;
    Ok(())
}

/// Write one of the tabular exports.
fn run_export(args: &ExportArgs, config: &PipelineConfig, cli_args: &BoxOfficeArgs) -> Result<()> {
    let start_time = Instant::now();
    let dataset = load_dataset(&args.dataset, config)?;

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let writer = BufWriter::new(file);
    let delimiter = config.delimiter_byte()?;

    let rows_written = match args.kind {
        ExportKind::Training => {
            let training_set = label_dataset(&dataset);
            export_training_set(&training_set, writer, delimiter)?;
            training_set.len()
        }
        ExportKind::Dashboard => {
            export_dashboard(&dataset, writer, delimiter)?;
            dataset.len()
        }
        ExportKind::Sample => {
            let sample = &dataset.records()[..args.limit.min(dataset.len())];
            export_records(sample, writer, delimiter)?;
            sample.len()
        }
        ExportKind::Imputation => {
            let training_set = label_dataset(&dataset);
            let stats = training_set.imputation().ok_or_else(|| {
                BoxOfficeError::insufficient_data("training set carries no imputation statistics")
            })?;
            export_imputation(stats, writer, delimiter)?;
            stats.schema().len()
        }
    };

    let result = ExportResult {
        path: args.output.to_string_lossy().to_string(),
        kind: args.kind,
        rows_written,
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    output_result("Export complete", &result, cli_args)?;
    Ok(())
}
