//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{BoxOfficeArgs, ExportKind, OutputFormat};
use crate::dataset::label::Label;
use crate::error::Result;
use crate::forest::{Evaluation, ModelMetadata, RankedFeature};
use crate::pipeline::{PredictionResult, SummaryStats};

/// Result structure for the importance command.
#[derive(Debug, Serialize)]
pub struct ImportanceReport {
    pub importances: Vec<RankedFeature>,
    pub model: ModelMetadata,
}

/// Result structure for the evaluate command.
#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub test_ratio: f64,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

/// Result structure for the export command.
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub path: String,
    pub kind: ExportKind,
    pub rows_written: usize,
    pub duration_ms: u64,
}

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn print_human(&self);
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &BoxOfficeArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            result.print_human();
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &BoxOfficeArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

impl HumanOutput for SummaryStats {
    fn print_human(&self) {
        println!("Dataset Summary:");
        println!("════════════════");
        println!("Total records: {}", self.total_records);
        println!("Features: {}", self.feature_count);
        println!();
        for label in Label::ALL {
            let count = self.label_counts.get(label);
            println!(
                "{:<8} {:>7}  ({})",
                label,
                count,
                format_percent(count as f64 / self.total_records.max(1) as f64)
            );
        }
    }
}

impl HumanOutput for PredictionResult {
    fn print_human(&self) {
        println!("Prediction: {}", self.label);
        println!("Confidence: {}", format_percent(self.confidence));
        println!();
        println!("Probabilities:");
        println!("─────────────");
        for (label, probability) in self.probabilities.iter() {
            println!("  {:<8} {}", label, format_percent(probability));
        }
        println!();
        print_importances(&self.importances);
        println!();
        print_model(&self.model);
    }
}

impl HumanOutput for ImportanceReport {
    fn print_human(&self) {
        print_importances(&self.importances);
        println!();
        print_model(&self.model);
    }
}

impl HumanOutput for EvaluationReport {
    fn print_human(&self) {
        let evaluation = &self.evaluation;
        println!("Evaluation:");
        println!("═══════════");
        println!(
            "Train / test: {} / {} (test ratio {})",
            evaluation.train_size, evaluation.test_size, self.test_ratio
        );
        println!("Accuracy: {}", format_percent(evaluation.accuracy));
        println!();
        println!("Confusion matrix (rows actual, columns predicted):");
        print!("{:<8}", "");
        for label in Label::ALL {
            print!(" {label:>8}");
        }
        println!();
        for actual in Label::ALL {
            print!("{actual:<8}");
            for count in evaluation.confusion[actual.index()] {
                print!(" {count:>8}");
            }
            println!();
        }
        println!();
        println!("Recall:");
        for label in Label::ALL {
            let recall = evaluation
                .recall_of(label)
                .map(format_percent)
                .unwrap_or_else(|| "n/a".to_string());
            println!("  {label:<8} {recall}");
        }
    }
}

impl HumanOutput for ExportResult {
    fn print_human(&self) {
        println!(
            "Wrote {} rows to {} in {}ms",
            self.rows_written, self.path, self.duration_ms
        );
    }
}

fn print_importances(importances: &[RankedFeature]) {
    println!("Feature importance:");
    println!("──────────────────");
    for (i, ranked) in importances.iter().enumerate() {
        println!("{:>2}. {:<24} {:.4}", i + 1, ranked.name(), ranked.importance);
    }
}

fn print_model(model: &ModelMetadata) {
    println!(
        "Model {} ({} trees, seed {}, {} examples, {}ms)",
        model.model_id,
        model.n_trees,
        model.seed,
        model.training_examples,
        model.training_time_ms
    );
}

fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(0.4567), "45.7%");
        assert_eq!(format_percent(1.0), "100.0%");
    }

    #[test]
    fn test_evaluation_report_flattens() {
        let report = EvaluationReport {
            test_ratio: 0.2,
            evaluation: Evaluation {
                accuracy: 0.5,
                confusion: [[1, 0, 0], [1, 0, 0], [0, 0, 0]],
                recall: [Some(1.0), Some(0.0), None],
                train_size: 8,
                test_size: 2,
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["accuracy"], 0.5);
        assert_eq!(value["test_size"], 2);
        assert!(value["recall"][2].is_null());
    }
}
