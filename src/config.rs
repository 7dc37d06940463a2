use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub aggregate: Aggregate,
    #[serde(default)]
    pub resolve: Resolve,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing TOML: {}", path.display()))?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Global {
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
        }
    }
}

/// Default directory layout. The aggregator's output is the resolver's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paths {
    pub original_dir: String,
    pub offset_dir: String,
    pub aggregated_dir: String,
    pub resolved_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            original_dir: "data".into(),
            offset_dir: "new_data_offset".into(),
            aggregated_dir: "data_aggregated".into(),
            resolved_dir: "resolve_duplicates".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Logical dataset names, processed in this order.
    pub datasets: Vec<String>,
    pub file_extension: String,
    pub summary_filename: String,
}
impl Default for Aggregate {
    fn default() -> Self {
        Self {
            datasets: DEFAULT_DATASETS.iter().map(|s| s.to_string()).collect(),
            file_extension: "json".into(),
            summary_filename: "_aggregation_summary.json".into(),
        }
    }
}

pub const DEFAULT_DATASETS: &[&str] = &[
    "categories",
    "change_requests",
    "companies",
    "departments",
    "incident_attachments",
    "incident_comments",
    "incident_history",
    "incident_knowledge",
    "incident_sla",
    "incidents",
    "knowledge_base",
    "sla",
    "subcategories",
    "surveys",
    "tasks",
    "users",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolve {
    pub file_extension: String,
    pub summary_filename: String,
}
impl Default for Resolve {
    fn default() -> Self {
        Self {
            file_extension: "json".into(),
            summary_filename: "_category_resolution_summary.json".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "helpdesk-merge.log".into(),
        }
    }
}
