//! Structured aggregation of an entire extraction + process-mining +
//! gap-analysis run (spec component 12): the process catalog and the
//! final forensic report, with every serialisation the CLI/HTTP
//! layers (outside this workspace's scope) consume.

pub mod catalog;
pub mod report;

pub use catalog::{ProcessCatalog, ProcessCatalogEntry, ProcessEvidence, ProcessVariant};
pub use report::{ForensicReport, ModuleSummary, SystemSummary};
