use crate::{
    config::Config,
    dataset::{dataset_file_name, load_dataset, merge_datasets, write_dataset},
    report::{
        AggregationReport, AggregationSummary, AggregationSummaryFile, DatasetOutcome, FileError,
        FileRecordCount, SourceDirectories,
    },
    util::{ensure_dir, now_rfc3339, write_json_pretty},
};
use anyhow::Result;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Merges each configured dataset from an original and an offset directory.
pub struct Aggregator {
    cfg: Config,
}

impl Aggregator {
    pub fn new(cfg: &Config) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Runs the batch. Per-dataset failures are recorded in the report;
    /// only output-directory and summary-file failures are returned as errors.
    pub fn run(
        &self,
        original_dir: &Path,
        offset_dir: &Path,
        output_dir: &Path,
    ) -> Result<AggregationReport> {
        ensure_dir(output_dir)?;

        info!(
            "aggregating {} datasets original={} offset={} out={}",
            self.cfg.aggregate.datasets.len(),
            original_dir.display(),
            offset_dir.display(),
            output_dir.display()
        );

        let mut outcomes = Vec::with_capacity(self.cfg.aggregate.datasets.len());
        for name in &self.cfg.aggregate.datasets {
            let filename = dataset_file_name(name, &self.cfg.aggregate.file_extension);
            let outcome = self.aggregate_one(&filename, original_dir, offset_dir, output_dir);
            log_outcome(&outcome);
            outcomes.push(outcome);
        }

        let summary = self.write_summary(original_dir, offset_dir, output_dir, &outcomes)?;

        Ok(AggregationReport { outcomes, summary })
    }

    fn aggregate_one(
        &self,
        filename: &str,
        original_dir: &Path,
        offset_dir: &Path,
        output_dir: &Path,
    ) -> DatasetOutcome {
        let original_path = original_dir.join(filename);
        let offset_path = offset_dir.join(filename);

        if !original_path.exists() {
            return DatasetOutcome::Skipped {
                filename: filename.to_string(),
                reason: format!("original file not found: {}", original_path.display()),
            };
        }
        if !offset_path.exists() {
            return DatasetOutcome::Skipped {
                filename: filename.to_string(),
                reason: format!("offset file not found: {}", offset_path.display()),
            };
        }

        let merge = || -> Result<DatasetOutcome> {
            let original = load_dataset(&original_path)?;
            let offset = load_dataset(&offset_path)?;
            let original_records = original.len();
            let offset_records = offset.len();

            let merged = merge_datasets(original, offset);
            let total_records = merged.len();
            debug!(
                "{filename}: {} overlapping keys",
                original_records + offset_records - total_records
            );

            write_dataset(&output_dir.join(filename), &merged)?;

            Ok(DatasetOutcome::Merged {
                filename: filename.to_string(),
                original_records,
                offset_records,
                total_records,
            })
        };

        merge().unwrap_or_else(|err| DatasetOutcome::Error {
            filename: filename.to_string(),
            error: format!("{err:#}"),
        })
    }

    /// Counts come from re-reading the output directory, so files left by
    /// an earlier run are listed too.
    fn write_summary(
        &self,
        original_dir: &Path,
        offset_dir: &Path,
        output_dir: &Path,
        outcomes: &[DatasetOutcome],
    ) -> Result<AggregationSummary> {
        let mut files_processed = Vec::new();
        for name in &self.cfg.aggregate.datasets {
            let filename = dataset_file_name(name, &self.cfg.aggregate.file_extension);
            let path = output_dir.join(&filename);
            if !path.exists() {
                continue;
            }
            match load_dataset(&path) {
                Ok(data) => files_processed.push(FileRecordCount {
                    filename,
                    total_records: data.len(),
                }),
                Err(err) => warn!("cannot re-read {}: {err:#}", path.display()),
            }
        }

        let errors = outcomes
            .iter()
            .filter_map(|o| match o {
                DatasetOutcome::Error { error, .. } => Some(FileError {
                    filename: o.filename().to_string(),
                    error: error.clone(),
                }),
                _ => None,
            })
            .collect();

        let summary = AggregationSummary {
            source_directories: SourceDirectories {
                original: original_dir.display().to_string(),
                offset: offset_dir.display().to_string(),
            },
            output_directory: output_dir.display().to_string(),
            generated_at: now_rfc3339(),
            files_processed,
            errors,
        };

        let summary_path = output_dir.join(&self.cfg.aggregate.summary_filename);
        let file = AggregationSummaryFile {
            aggregation_summary: summary,
        };
        write_json_pretty(&summary_path, &file)?;
        info!("summary report saved: {}", summary_path.display());

        Ok(file.aggregation_summary)
    }
}

fn log_outcome(outcome: &DatasetOutcome) {
    match outcome {
        DatasetOutcome::Merged {
            filename,
            original_records,
            offset_records,
            total_records,
        } => info!(
            "{filename}: original={original_records} offset={offset_records} total={total_records}"
        ),
        DatasetOutcome::Skipped { reason, .. } => warn!("{reason}"),
        DatasetOutcome::Error { filename, error } => {
            error!("error processing {filename}: {error}")
        }
    }
}
