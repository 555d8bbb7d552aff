//! Run artifacts in the output directory (default `.petcheck/`)
//!
//! Every `petcheck run` writes its artifacts regardless of `--output` mode:
//! `config.toml`, `report.json`, `summary.json`, and `reproductions.http`
//! when something failed. Each run overwrites the previous one.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use petcheck_core::{Config, Failure, SuiteReport, Verdict};

/// Everything needed to persist one run.
pub struct RunArtifacts<'a> {
    pub config: &'a Config,
    pub report: &'a SuiteReport,
    pub failures: &'a [Failure],
    pub verdict: &'a Verdict,
    pub duration_secs: f64,
}

/// Write run artifacts into `dir`; returns the path of the
/// reproductions file if one was written.
pub fn save_run(dir: &Path, data: &RunArtifacts) -> Result<Option<PathBuf>, std::io::Error> {
    std::fs::create_dir_all(dir)?;

    let config_toml =
        toml::to_string_pretty(data.config).map_err(|e| std::io::Error::other(e.to_string()))?;
    std::fs::write(dir.join("config.toml"), config_toml)?;

    std::fs::write(dir.join("report.json"), to_pretty(data.report)?)?;

    let summary = serde_json::json!({
        "verdict": {
            "status": data.verdict.status.to_string(),
            "exit_code": data.verdict.exit_code,
            "reason": data.verdict.reason,
        },
        "stats": {
            "total": data.report.total,
            "passed": data.report.passed,
            "failed": data.report.failed,
            "errored": data.report.errored,
            "stopped_early": data.report.stopped_early,
        },
        "meta": {
            "finished_at_unix": unix_now(),
            "duration_secs": data.duration_secs,
            "base_url": data.report.base_url,
        },
    });
    std::fs::write(dir.join("summary.json"), to_pretty(&summary)?)?;

    let repro_path = dir.join("reproductions.http");
    if data.failures.iter().any(|f| f.request.is_some()) {
        std::fs::write(&repro_path, petcheck_core::to_http_file(data.failures))?;
        Ok(Some(repro_path))
    } else {
        // drop reproductions left by an earlier run
        if repro_path.exists() {
            std::fs::remove_file(&repro_path)?;
        }
        Ok(None)
    }
}

fn to_pretty<T: serde::Serialize>(value: &T) -> Result<String, std::io::Error> {
    serde_json::to_string_pretty(value).map_err(|e| std::io::Error::other(e.to_string()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
