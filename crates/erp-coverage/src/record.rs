//! Coverage records — the outcome of a single (extractor, table) read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single table-read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageStatus {
    Extracted,
    Failed,
    Skipped,
    Partial,
}

impl CoverageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageStatus::Extracted => "extracted",
            CoverageStatus::Failed => "failed",
            CoverageStatus::Skipped => "skipped",
            CoverageStatus::Partial => "partial",
        }
    }
}

/// Free-form detail attached to a coverage record. Exactly one of these
/// fields is normally populated, depending on `status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageDetail {
    pub row_count: Option<u64>,
    pub error: Option<String>,
    pub reason: Option<String>,
}

impl CoverageDetail {
    pub fn rows(row_count: u64) -> Self {
        Self {
            row_count: Some(row_count),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Default::default()
        }
    }
}

/// A single tracked read outcome, keyed uniquely by `(extractor_id, table)`.
/// The latest `track()` call for a given key replaces the previous record.
///
/// `PartialEq` is implemented by hand in [`crate::tracker`] to compare
/// on content only, ignoring `timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageRecord {
    pub extractor_id: String,
    pub table: String,
    pub status: CoverageStatus,
    pub detail: CoverageDetail,
    pub timestamp: DateTime<Utc>,
}
