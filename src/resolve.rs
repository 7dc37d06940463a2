//! Category id remapping over every JSON file of a directory.
//!
//! The rule is not idempotent: ids above 13 shift down by 3 on every pass,
//! so running the resolver on its own output moves them again.

use crate::{
    config::Config,
    dataset::{load_dataset, write_dataset},
    report::{
        AdjustmentRules, FileResolution, ResolutionSummary, ResolutionSummaryFile,
        ResolutionTotals,
    },
    util::{ensure_dir, now_rfc3339, write_json_pretty},
};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const CATEGORY_FIELD: &str = "category_id";

/// Maps a numeric category id onto its resolved value.
pub fn remap_category(id: i64) -> i64 {
    match id {
        11..=13 => id - 10,
        id if id > 13 => id - 3,
        id => id,
    }
}

/// Applies [`remap_category`] to a string-encoded id. Empty or non-numeric
/// input comes back unchanged.
pub fn adjust_category_id(raw: &str) -> String {
    if raw.is_empty() {
        return raw.to_string();
    }
    match raw.trim().parse::<i64>() {
        Ok(id) => remap_category(id).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Same as [`adjust_category_id`] for an arbitrary JSON value. Numbers and
/// booleans are coerced to integers and come back as strings; empty values
/// and values with no integer reading are returned as-is.
pub fn adjust_category_value(value: &Value) -> Value {
    if is_empty_value(value) {
        return value.clone();
    }
    let id = match value {
        Value::String(s) => return Value::String(adjust_category_id(s)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate_in_range)),
        _ => None,
    };
    match id {
        Some(id) => Value::String(remap_category(id).to_string()),
        None => value.clone(),
    }
}

/// Floats outside the i64 range have no exact integer reading here and are
/// left unchanged rather than clamped.
fn truncate_in_range(f: f64) -> Option<i64> {
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f.trunc() as i64)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Rewrites `category_id` on every object record; returns how many changed.
pub fn resolve_records(data: &mut serde_json::Map<String, Value>) -> usize {
    let mut adjustments = 0;
    for record in data.values_mut() {
        let Value::Object(fields) = record else {
            continue;
        };
        let Some(current) = fields.get_mut(CATEGORY_FIELD) else {
            continue;
        };
        let adjusted = adjust_category_value(current);
        if adjusted != *current {
            *current = adjusted;
            adjustments += 1;
        }
    }
    adjustments
}

pub struct Resolver {
    cfg: Config,
}

impl Resolver {
    pub fn new(cfg: &Config) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Returns `Ok(None)` without touching `target_dir` when `source_dir`
    /// holds no matching files.
    pub fn run(&self, source_dir: &Path, target_dir: &Path) -> Result<Option<ResolutionSummary>> {
        let files = self.list_source_files(source_dir)?;
        if files.is_empty() {
            info!("no JSON files found in {}", source_dir.display());
            return Ok(None);
        }

        ensure_dir(target_dir)?;
        info!(
            "resolving category ids in {} files source={} target={}",
            files.len(),
            source_dir.display(),
            target_dir.display()
        );

        let mut results = Vec::with_capacity(files.len());
        for (filename, path) in &files {
            let result = match resolve_file(path, &target_dir.join(filename)) {
                Ok((total, adjustments)) => {
                    if adjustments > 0 {
                        info!(
                            "{filename}: {total} entries, {adjustments} category_id adjustments"
                        );
                    } else {
                        info!("{filename}: {total} entries, no category_id adjustments needed");
                    }
                    FileResolution::success(filename, total, adjustments)
                }
                Err(err) => {
                    let msg = format!("{err:#}");
                    error!("{filename}: {msg}");
                    FileResolution::failed(filename, msg)
                }
            };
            results.push(result);
        }

        let summary = ResolutionSummary {
            source_directory: source_dir.display().to_string(),
            target_directory: target_dir.display().to_string(),
            generated_at: now_rfc3339(),
            adjustment_rules: AdjustmentRules::default(),
            totals: ResolutionTotals::from_results(&results),
            results,
        };

        let summary_path = target_dir.join(&self.cfg.resolve.summary_filename);
        let file = ResolutionSummaryFile {
            processing_summary: summary,
        };
        write_json_pretty(&summary_path, &file)?;
        info!("summary report saved: {}", summary_path.display());

        Ok(Some(file.processing_summary))
    }

    /// Matching regular files of `dir`, sorted by file name.
    fn list_source_files(&self, dir: &Path) -> Result<Vec<(String, PathBuf)>> {
        let entries =
            std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;

        let suffix = format!(".{}", self.cfg.resolve.file_extension);
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                if name.ends_with(&suffix) {
                    files.push((name.to_string(), path));
                }
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

fn resolve_file(source: &Path, target: &Path) -> Result<(usize, usize)> {
    let mut data = load_dataset(source)?;
    let adjustments = resolve_records(&mut data);
    write_dataset(target, &data)?;
    Ok((data.len(), adjustments))
}
