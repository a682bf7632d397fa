//! Process mining core (spec §4.2): conversion of tabular evidence
//! into an event log, heuristic process discovery, token-based
//! conformance replay against a reference model, performance,
//! variant, and social-network analyses, and a statistical KPI
//! engine, all composed by [`engine::ProcessIntelligenceEngine`].

pub mod conformance;
pub mod engine;
pub mod event_log;
pub mod heuristic_miner;
pub mod kpi;
pub mod performance;
pub mod reference_model;
pub mod social_network;
pub mod stats;
pub mod variants;

pub use conformance::{CaseConformance, ConformanceChecker, ConformanceResult, Deviation, DeviationType};
pub use engine::{ProcessIntelligenceEngine, ProcessIntelligenceReport};
pub use event_log::{build_event_log, Event, EventLog, EventLogBuilder, ProcessEventConfig, TableClass, TableMapping, Trace};
pub use heuristic_miner::{DiscoveredEdge, HeuristicMiner, HeuristicModel};
pub use kpi::{Kpi, KPIEngine, KPIReport, KpiCategory, ProcessKpiDef};
pub use performance::{Bottleneck, PerformanceAnalyzer, PerformanceResult, TransitionTiming};
pub use reference_model::{Edge, EdgeType, ReferenceModel, ReferenceModelCatalog, SlaSeverity, SlaTarget};
pub use social_network::{
    default_sod_rules, ActivityResourceCell, Handover, ResourceCentrality, ResourceUtilization,
    SocialNetworkMiner, SocialNetworkResult, SodRule, SodViolation, WorkingTogether,
};
pub use stats::{compute as compute_stats, confidence_interval, ConfidenceInterval, ConfidenceLevel, Stats};
pub use variants::{Variant, VariantAnalysisResult, VariantAnalyzer};

use thiserror::Error;

/// Errors surfaced synchronously to the caller (spec §7
/// `validation_error`); everything else in this crate is pure,
/// in-memory, and infallible.
#[derive(Error, Debug)]
pub enum ProcessMiningError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProcessMiningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_model_catalog_lists_seven_builtins() {
        let catalog = ReferenceModelCatalog::with_builtins();
        assert_eq!(catalog.list_ids().len(), 7);
    }
}
