use crate::{
    aggregate::Aggregator,
    config::Config,
    report::{AggregationReport, ResolutionSummary},
    resolve::{adjust_category_id, Resolver},
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_CONFIG: &str = "helpdesk-merge.toml";
const ADJUSTMENT_EXAMPLES: &[&str] = &["11", "12", "13", "14", "20", "5"];

#[derive(Parser, Debug)]
#[command(name = "helpdesk-merge")]
#[command(about = "Merge helpdesk JSON datasets and remap duplicated category ids")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./helpdesk-merge.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Union original and offset datasets; offset records win on id collisions.
    Aggregate {
        #[arg(long)]
        original_dir: Option<PathBuf>,
        #[arg(long)]
        offset_dir: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Rewrite category_id on every record of every JSON file in a directory.
    Resolve {
        #[arg(long)]
        source_dir: Option<PathBuf>,
        #[arg(long)]
        target_dir: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Aggregate {
            original_dir,
            offset_dir,
            out_dir,
        } => {
            let original_dir = dir_or(original_dir, &cfg.paths.original_dir);
            let offset_dir = dir_or(offset_dir, &cfg.paths.offset_dir);
            let out_dir = dir_or(out_dir, &cfg.paths.aggregated_dir);
            aggregate(&cfg, &original_dir, &offset_dir, &out_dir)
        }
        Command::Resolve {
            source_dir,
            target_dir,
        } => {
            let source_dir = dir_or(source_dir, &cfg.paths.aggregated_dir);
            let target_dir = dir_or(target_dir, &cfg.paths.resolved_dir);
            resolve(&cfg, &source_dir, &target_dir)
        }
    }
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    let default = PathBuf::from(DEFAULT_CONFIG);
    if default.exists() {
        Config::load(&default)
    } else {
        Ok(Config::default())
    }
}

fn dir_or(user: &Option<PathBuf>, fallback: &str) -> PathBuf {
    user.clone().unwrap_or_else(|| PathBuf::from(fallback))
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file && !cfg.logging.file_path.is_empty() {
        let path = Path::new(&cfg.logging.file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn aggregate(cfg: &Config, original_dir: &Path, offset_dir: &Path, out_dir: &Path) -> Result<()> {
    let report = Aggregator::new(cfg).run(original_dir, offset_dir, out_dir)?;
    info!("aggregated files saved in: {}", out_dir.display());

    if cfg.global.print_summary {
        print_aggregation(&report)?;
    }
    Ok(())
}

fn print_aggregation(report: &AggregationReport) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "output_directory": report.summary.output_directory,
            "outcomes": report.outcomes,
            "totals": report.totals(),
        }))?
    );
    Ok(())
}

fn resolve(cfg: &Config, source_dir: &Path, target_dir: &Path) -> Result<()> {
    let Some(summary) = Resolver::new(cfg).run(source_dir, target_dir)? else {
        return Ok(());
    };
    info!(
        "total category_id adjustments made: {}",
        summary.totals.total_adjustments
    );

    if cfg.global.print_summary {
        print_resolution(&summary)?;
    }
    Ok(())
}

fn print_resolution(summary: &ResolutionSummary) -> Result<()> {
    let examples: Vec<String> = ADJUSTMENT_EXAMPLES
        .iter()
        .map(|id| format!("{id} -> {}", adjust_category_id(id)))
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "target_directory": summary.target_directory,
            "totals": summary.totals,
            "adjustment_examples": examples,
        }))?
    );
    Ok(())
}
