use serde::{Deserialize, Serialize};

/// What happened to one dataset during an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatasetOutcome {
    Merged {
        filename: String,
        original_records: usize,
        offset_records: usize,
        total_records: usize,
    },
    Skipped {
        filename: String,
        reason: String,
    },
    Error {
        filename: String,
        error: String,
    },
}

impl DatasetOutcome {
    pub fn filename(&self) -> &str {
        match self {
            DatasetOutcome::Merged { filename, .. }
            | DatasetOutcome::Skipped { filename, .. }
            | DatasetOutcome::Error { filename, .. } => filename,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationTotals {
    pub merged: usize,
    pub skipped: usize,
    pub errored: usize,
    pub total_records: usize,
}

/// In-memory result of `Aggregator::run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationReport {
    pub outcomes: Vec<DatasetOutcome>,
    pub summary: AggregationSummary,
}

impl AggregationReport {
    pub fn totals(&self) -> AggregationTotals {
        let mut totals = AggregationTotals {
            merged: 0,
            skipped: 0,
            errored: 0,
            total_records: 0,
        };
        for o in &self.outcomes {
            match o {
                DatasetOutcome::Merged { total_records, .. } => {
                    totals.merged += 1;
                    totals.total_records += total_records;
                }
                DatasetOutcome::Skipped { .. } => totals.skipped += 1,
                DatasetOutcome::Error { .. } => totals.errored += 1,
            }
        }
        totals
    }
}

/// Body of `_aggregation_summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSummaryFile {
    pub aggregation_summary: AggregationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSummary {
    pub source_directories: SourceDirectories,
    pub output_directory: String,
    pub generated_at: String,
    pub files_processed: Vec<FileRecordCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FileError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDirectories {
    pub original: String,
    pub offset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecordCount {
    pub filename: String,
    pub total_records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResolution {
    pub filename: String,
    pub total_entries: usize,
    pub adjustments_made: usize,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResolution {
    pub fn success(filename: &str, total_entries: usize, adjustments_made: usize) -> Self {
        Self {
            filename: filename.to_string(),
            total_entries,
            adjustments_made,
            status: FileStatus::Success,
            error: None,
        }
    }

    pub fn failed(filename: &str, error: String) -> Self {
        Self {
            filename: filename.to_string(),
            total_entries: 0,
            adjustments_made: 0,
            status: FileStatus::Error,
            error: Some(error),
        }
    }
}

/// Body of `_category_resolution_summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionSummaryFile {
    pub processing_summary: ResolutionSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionSummary {
    pub source_directory: String,
    pub target_directory: String,
    pub generated_at: String,
    pub adjustment_rules: AdjustmentRules,
    pub results: Vec<FileResolution>,
    pub totals: ResolutionTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRules {
    pub category_id_11_12_13: String,
    pub category_id_greater_than_13: String,
    pub category_id_other: String,
}

impl Default for AdjustmentRules {
    fn default() -> Self {
        Self {
            category_id_11_12_13: "decrease by 10".into(),
            category_id_greater_than_13: "decrease by 3".into(),
            category_id_other: "no change".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTotals {
    pub files_processed: usize,
    pub files_with_errors: usize,
    pub total_adjustments: usize,
}

impl ResolutionTotals {
    pub fn from_results(results: &[FileResolution]) -> Self {
        Self {
            files_processed: results
                .iter()
                .filter(|r| r.status == FileStatus::Success)
                .count(),
            files_with_errors: results
                .iter()
                .filter(|r| r.status == FileStatus::Error)
                .count(),
            total_adjustments: results.iter().map(|r| r.adjustments_made).sum(),
        }
    }
}
