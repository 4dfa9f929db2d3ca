use std::path::{Path, PathBuf};

use lintrate_core::MonthBucket;
use serde::{Deserialize, Serialize};

use crate::RunError;

pub const DEFAULT_STORE: &str = "lint_results.db";
pub const DEFAULT_OUTPUT: &str = "lint_report.json";
pub const CONFIG_FILE: &str = "lintrate.toml";

/// Contents of `lintrate.toml`. Every key is optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub months: MonthsConfig,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub counts: Option<String>,
    #[serde(default)]
    pub error_summary: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MonthsConfig {
    /// First month, `YYYY-MM`.
    #[serde(default)]
    pub from: Option<String>,
    /// Last month, `YYYY-MM`, included.
    #[serde(default)]
    pub to: Option<String>,
}

/// Values given on the command line; they win over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub store: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub counts: Option<PathBuf>,
    pub error_summary: Option<PathBuf>,
    pub from: Option<MonthBucket>,
    pub to: Option<MonthBucket>,
}

/// Fully resolved settings for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub store: PathBuf,
    pub output: PathBuf,
    pub counts: Option<PathBuf>,
    pub error_summary: Option<PathBuf>,
    pub from: Option<MonthBucket>,
    pub to: Option<MonthBucket>,
}

/// Tilde-expand a path from the config file. Relative paths are taken from
/// the directory holding that file.
fn expand(p: &str, base: Option<&Path>) -> PathBuf {
    let path = PathBuf::from(shellexpand::tilde(p).into_owned());
    match base {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self, RunError> {
        let err = |reason: String| RunError::Config { path: path.to_path_buf(), reason };
        let s = std::fs::read_to_string(path).map_err(|e| err(e.to_string()))?;
        toml::from_str(&s).map_err(|e| err(e.to_string()))
    }

    /// Explicit path if given, else `lintrate.toml` in `dir` when it exists,
    /// else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>), RunError> {
        if let Some(p) = explicit {
            return Ok((Self::load_from(p)?, Some(p.to_path_buf())));
        }
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using config file");
            return Ok((Self::load_from(&candidate)?, Some(candidate)));
        }
        Ok((Self::default(), None))
    }

    /// Merge with command-line overrides. `origin` is the config file: paths
    /// it gives are relative to its directory, and errors name it.
    pub fn resolve(&self, overrides: Overrides, origin: Option<&Path>) -> Result<Settings, RunError> {
        let base = origin.and_then(Path::parent).filter(|d| !d.as_os_str().is_empty());
        let from_file = |p: &str| expand(p, base);
        let month = |label: &Option<String>| -> Result<Option<MonthBucket>, RunError> {
            label
                .as_deref()
                .map(|l| {
                    l.parse::<MonthBucket>().map_err(|e| RunError::Config {
                        path: origin.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(CONFIG_FILE)),
                        reason: e.to_string(),
                    })
                })
                .transpose()
        };

        Ok(Settings {
            store: overrides
                .store
                .or_else(|| self.store.path.as_deref().map(from_file))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE)),
            output: overrides
                .output
                .or_else(|| self.report.output.as_deref().map(from_file))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            counts: overrides.counts.or_else(|| self.report.counts.as_deref().map(from_file)),
            error_summary: overrides
                .error_summary
                .or_else(|| self.report.error_summary.as_deref().map(from_file)),
            from: match overrides.from {
                Some(m) => Some(m),
                None => month(&self.months.from)?,
            },
            to: match overrides.to {
                Some(m) => Some(m),
                None => month(&self.months.to)?,
            },
        })
    }
}
