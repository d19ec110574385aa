//! Configuration system (SPEC_FULL.md §2.3): hierarchical loading from
//! `config.toml` defaults, `config.local.toml` (git-ignored overrides), and
//! `RUNTIME_`-prefixed environment variables — mirrors the teacher's
//! `figment`-based `Config`.
//!
//! ```toml
//! # config.toml
//! [scheduler]
//! step_budget = 32
//! quality_threshold = 0.9
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! RUNTIME_SCHEDULER__STEP_BUDGET=64
//! RUNTIME_VM__SIGN_SNAPSHOTS=true
//! ```

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub vm: VmConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            scheduler: SchedulerConfig::default(),
            vm: VmConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_step_budget")]
    pub step_budget: u32,
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    #[serde(default)]
    pub enable_contradictions: bool,
}

fn default_step_budget() -> u32 {
    32
}

fn default_quality_threshold() -> f64 {
    0.9
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            step_budget: default_step_budget(),
            quality_threshold: default_quality_threshold(),
            enable_contradictions: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotDigestAlgo {
    Blake2b256,
    Blake3,
}

impl Default for SnapshotDigestAlgo {
    fn default() -> Self {
        SnapshotDigestAlgo::Blake2b256
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmConfig {
    #[serde(default)]
    pub snapshot_digest: SnapshotDigestAlgo,
    #[serde(default)]
    pub sign_snapshots: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            snapshot_digest: SnapshotDigestAlgo::default(),
            sign_snapshots: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Both,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Text
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_true")]
    pub include_meta: bool,
    #[serde(default)]
    pub include_stats: bool,
    #[serde(default)]
    pub include_explanation: bool,
    #[serde(default)]
    pub include_report: bool,
    #[serde(default)]
    pub include_lc_meta: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: OutputFormat::default(),
            include_meta: true,
            include_stats: false,
            include_explanation: false,
            include_report: false,
            include_lc_meta: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            json: false,
        }
    }
}

impl RuntimeConfig {
    /// Loads configuration from `config.toml`, `config.local.toml`, and
    /// `RUNTIME_`-prefixed environment variables, in that priority order,
    /// falling back to built-in defaults when no file is present.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Toml::file("config.local.toml"))
            .merge(Env::prefixed("RUNTIME_").split("__"))
            .extract()
    }

    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("RUNTIME_").split("__"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.scheduler.step_budget, 32);
        assert!((cfg.scheduler.quality_threshold - 0.9).abs() < f64::EPSILON);
        assert!(!cfg.scheduler.enable_contradictions);
        assert!(cfg.output.include_meta);
    }
}
