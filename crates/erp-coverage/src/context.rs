//! The process-wide container threaded through a single extraction run.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::data_dictionary::DataDictionary;
use crate::tracker::CoverageTracker;

/// Whether extractors read from the live source system or from
/// offline fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMode {
    Live,
    Offline,
}

/// Process-wide container for a single extraction run: the mode,
/// optional transport handle (opaque to this crate — see
/// `erp-extraction::Transport`), the data dictionary populated during
/// phase 2, and the shared coverage tracker.
///
/// `Transport` is generic so that this crate does not need to depend
/// on the transport trait itself; callers instantiate
/// `ExtractionContext<T>` with their concrete transport handle type.
///
/// Callers MUST NOT share a context between concurrent runs — the
/// data dictionary slot is written exactly once, during phase 2 of a
/// single orchestration pass.
#[derive(Debug)]
pub struct ExtractionContext<Transport: ?Sized> {
    pub mode: ExtractionMode,
    transport: Option<Arc<Transport>>,
    data_dictionary: RwLock<Option<DataDictionary>>,
    tracker: Arc<CoverageTracker>,
}

impl<Transport: ?Sized> ExtractionContext<Transport> {
    pub fn new(mode: ExtractionMode, transport: Option<Arc<Transport>>) -> Self {
        Self {
            mode,
            transport,
            data_dictionary: RwLock::new(None),
            tracker: Arc::new(CoverageTracker::new()),
        }
    }

    pub fn transport(&self) -> Option<&Arc<Transport>> {
        self.transport.as_ref()
    }

    pub fn tracker(&self) -> Arc<CoverageTracker> {
        self.tracker.clone()
    }

    /// Populated exactly once, by the data-dictionary extractor during
    /// phase 2 of orchestration.
    pub fn set_data_dictionary(&self, dictionary: DataDictionary) {
        *self.data_dictionary.write() = Some(dictionary);
    }

    /// `None` before phase 2 has completed; `Some` for the remainder
    /// of the run.
    pub fn data_dictionary(&self) -> Option<DataDictionary> {
        self.data_dictionary.read().clone()
    }

    pub fn is_live(&self) -> bool {
        self.mode == ExtractionMode::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dictionary_absent_until_set() {
        let ctx: ExtractionContext<()> = ExtractionContext::new(ExtractionMode::Offline, None);
        assert!(ctx.data_dictionary().is_none());
        ctx.set_data_dictionary(DataDictionary::default());
        assert!(ctx.data_dictionary().is_some());
    }

    #[test]
    fn tracker_is_shared_across_clones_of_arc() {
        let ctx: ExtractionContext<()> = ExtractionContext::new(ExtractionMode::Offline, None);
        let t1 = ctx.tracker();
        let t2 = ctx.tracker();
        t1.track(
            "X",
            "Y",
            crate::record::CoverageStatus::Extracted,
            crate::record::CoverageDetail::rows(1),
        );
        assert_eq!(t2.system_report().total, 1);
    }
}
