//! Configuration schema: what an extraction run needs to know before
//! the orchestrator starts (spec §9 ambient configuration).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Whether extractors read from a live source system or offline
/// fixtures (mirrors `erp_coverage::ExtractionMode`; kept separate so
/// this crate does not depend on `erp-coverage` just for one enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Live,
    Offline,
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Offline
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointSection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "erp-forensics".to_string()
}

impl Default for CheckpointSection {
    fn default() -> Self {
        Self {
            enabled: false,
            namespace: default_namespace(),
        }
    }
}

/// Top-level configuration for one extraction + process-mining +
/// gap-analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErpConfig {
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Allow-list of extractor ids for phase 3; empty means "all
    /// registered extractors".
    #[serde(default)]
    pub modules: BTreeSet<String>,
    #[serde(default)]
    pub checkpoint: CheckpointSection,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_concurrency() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            concurrency: default_concurrency(),
            modules: BTreeSet::new(),
            checkpoint: CheckpointSection::default(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("validation error: {0}")]
    Validation(String),
}
