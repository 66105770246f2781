// =============================================================================
// ta-engine — Main Entry Point
// =============================================================================
//
// Usage: ta-engine <bars.json>...
//
// Each file holds one instrument's bars as a JSON array.  Files are analysed
// concurrently on the blocking pool and the reports are printed to stdout as
// one JSON object keyed by file path.  Logs go to stderr.
// =============================================================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use futures_util::future::join_all;
use serde::{Serialize, Serializer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ta_engine::{analyze_bars, Bar, EngineConfig, IndicatorReport};

const DEFAULT_CONFIG_PATH: &str = "engine_config.json";

/// Result of one input file.
#[derive(Serialize)]
#[serde(untagged)]
enum Outcome {
    Report(IndicatorReport),
    Failed { error: String },
}

/// File path -> outcome, serialised in input order.
struct Outcomes(Vec<(String, Outcome)>);

impl Serialize for Outcomes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(path, outcome)| (path, outcome)))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        bail!("usage: ta-engine <bars.json>...");
    }

    let config_path =
        std::env::var("TA_ENGINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %e, "Failed to load engine config, using defaults");
        EngineConfig::default()
    });
    let config = Arc::new(config);

    info!(files = paths.len(), "Analysing price series");

    // ── 2. One blocking task per file ────────────────────────────────────
    let tasks = paths.into_iter().map(|path| {
        let config = Arc::clone(&config);
        tokio::task::spawn_blocking(move || {
            let outcome = analyze_file(&path, &config);
            (path, outcome)
        })
    });

    let mut outcomes = Vec::new();
    for joined in join_all(tasks).await {
        let (path, result) = joined.context("analysis task panicked")?;
        let outcome = match result {
            Ok(report) => {
                let unavailable = report.iter().filter(|(_, v)| !v.is_available()).count();
                info!(
                    path = %path.display(),
                    entries = report.len(),
                    unavailable,
                    "Analysis complete"
                );
                Outcome::Report(report)
            }
            Err(e) => {
                error!(path = %path.display(), error = %format!("{e:#}"), "Analysis failed");
                Outcome::Failed {
                    error: format!("{e:#}"),
                }
            }
        };
        outcomes.push((path.display().to_string(), outcome));
    }

    // ── 3. Emit ──────────────────────────────────────────────────────────
    let rendered = serde_json::to_string_pretty(&Outcomes(outcomes))
        .context("failed to serialise reports to JSON")?;
    println!("{rendered}");

    Ok(())
}

fn analyze_file(path: &Path, config: &EngineConfig) -> anyhow::Result<IndicatorReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bars from {}", path.display()))?;

    let bars: Vec<Bar> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse bars from {}", path.display()))?;

    analyze_bars(bars, config).with_context(|| format!("failed to analyse {}", path.display()))
}
