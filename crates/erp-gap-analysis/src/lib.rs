//! Gap analysis and confidence scoring (spec §4.3): cross-references
//! coverage telemetry, extraction results, and the data dictionary to
//! surface what was not covered and how much that should be trusted.

pub mod confidence;
pub mod gap;

pub use confidence::{CategoryCoverage, CategoryScore, ConfidenceReport, ConfidenceScorer, Grade, ScoreCategory};
pub use gap::{Gap, GapAnalysisError, GapAnalysisInput, GapAnalyzer, GapCategory, GapReport, Severity};
