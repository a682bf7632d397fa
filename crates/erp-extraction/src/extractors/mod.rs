//! Concrete, domain-specific extractors. Each declares its fixed list
//! of expected tables and, in offline mode, a small self-contained
//! fixture so the crate's test suite and CI can exercise the whole
//! orchestration pipeline without a live source system.

pub mod batch_jobs;
pub mod change_documents;
pub mod data_dictionary;
pub mod financials;
pub mod interfaces;
pub mod master_data;
pub mod security;
pub mod system_info;
pub mod usage_statistics;
pub mod workflows;

pub use batch_jobs::BatchJobsExtractor;
pub use change_documents::ChangeDocumentsExtractor;
pub use data_dictionary::DataDictionaryExtractor;
pub use financials::FinancialsExtractor;
pub use interfaces::InterfacesExtractor;
pub use master_data::MasterDataExtractor;
pub use security::SecurityExtractor;
pub use system_info::SystemInfoExtractor;
pub use usage_statistics::UsageStatisticsExtractor;
pub use workflows::WorkflowsExtractor;

/// Extractor ids for the two single-run phase-1/phase-2 extractors,
/// used by the orchestrator to exclude them from phase-3 fan-out.
pub const SYSTEM_INFO_ID: &str = "SYSTEM_INFO";
pub const DATA_DICTIONARY_ID: &str = "DATA_DICTIONARY";

/// Extractor ids whose results process mining reads directly (spec §4.1.3 phase 4).
pub const CHANGE_DOCUMENTS_ID: &str = "CHANGE_DOCUMENTS";
pub const USAGE_STATISTICS_ID: &str = "USAGE_STATISTICS";
pub const BATCH_JOBS_ID: &str = "BATCH_JOBS";
pub const WORKFLOWS_ID: &str = "WORKFLOWS";

/// Registers every extractor this workspace ships. Call once at
/// orchestrator-construction time; this is the "central bootstrap"
/// spec.md §9 asks for in place of module-load side effects.
pub fn bootstrap(registry: &mut crate::registry::ExtractorRegistry) {
    use std::sync::Arc;
    registry.register(SYSTEM_INFO_ID, || Arc::new(SystemInfoExtractor));
    registry.register(DATA_DICTIONARY_ID, || Arc::new(DataDictionaryExtractor));
    registry.register("FINANCIALS", || Arc::new(FinancialsExtractor));
    registry.register("SECURITY", || Arc::new(SecurityExtractor));
    registry.register("INTERFACES", || Arc::new(InterfacesExtractor));
    registry.register("MASTER_DATA", || Arc::new(MasterDataExtractor));
    registry.register(CHANGE_DOCUMENTS_ID, || Arc::new(ChangeDocumentsExtractor));
    registry.register(USAGE_STATISTICS_ID, || Arc::new(UsageStatisticsExtractor));
    registry.register(BATCH_JOBS_ID, || Arc::new(BatchJobsExtractor));
    registry.register(WORKFLOWS_ID, || Arc::new(WorkflowsExtractor));
}
