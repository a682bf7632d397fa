//! Extraction orchestration building blocks: the transport and
//! checkpoint interfaces this crate consumes, the base-extractor
//! contract every concrete extractor implements, the extractor
//! registry, and the concrete ERP extractors themselves.
//!
//! The orchestrator that drives these (the multi-phase pipeline) lives
//! in `erp_forensics::orchestrator`, one level up, since it also needs
//! to depend on `erp-process-mining` and `erp-gap-analysis`.

pub mod checkpoint;
pub mod extractor;
pub mod extractors;
pub mod registry;
pub mod transport;

pub use checkpoint::{CheckpointProgress, CheckpointStore, InMemoryCheckpointStore, NullCheckpointStore};
pub use extractor::{
    BaseExtractor, ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput, ExtractorResult,
};
pub use registry::{ExtractorFactory, ExtractorRegistry};
pub use transport::{OfflineTransport, ReadOptions, Row, StreamOptions, TableChunk, Transport, TransportError};
