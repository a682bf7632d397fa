//! Forensic reconstruction of tabular ERP systems (spec §2): wires
//! together extraction orchestration, process mining, and gap
//! analysis/confidence scoring into a single end-to-end run.
//!
//! The individual subsystems live in their own workspace crates
//! (`erp-config`, `erp-coverage`, `erp-extraction`, `erp-process-mining`,
//! `erp-gap-analysis`, `erp-report`); this crate only adds the
//! [`orchestrator::Orchestrator`] that drives them through the
//! seven-phase pipeline and the [`observer`] channel callers subscribe
//! to for progress.

pub mod observer;
pub mod orchestrator;

pub use observer::{CancellationToken, Observer, OrchestratorEvent};
pub use orchestrator::Orchestrator;

pub use erp_config::{load_config, ErpConfig, RunMode};
pub use erp_extraction::{CheckpointStore, InMemoryCheckpointStore, NullCheckpointStore, OfflineTransport, Transport};
pub use erp_report::ForensicReport;
