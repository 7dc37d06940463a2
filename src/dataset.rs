use crate::util::write_json_pretty;
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// One table: record id -> record.
pub type Dataset = Map<String, Value>;

pub fn dataset_file_name(name: &str, extension: &str) -> String {
    format!("{name}.{extension}")
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let json: Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    match json {
        Value::Object(map) => Ok(map),
        other => bail!(
            "{} is not a JSON object (found {})",
            path.display(),
            value_kind(&other)
        ),
    }
}

pub fn write_dataset(path: &Path, data: &Dataset) -> Result<()> {
    write_json_pretty(path, data)
}

/// Key-wise union; on collision the offset record replaces the original one.
pub fn merge_datasets(original: Dataset, offset: Dataset) -> Dataset {
    let mut merged = original;
    for (key, value) in offset {
        merged.insert(key, value);
    }
    merged
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
