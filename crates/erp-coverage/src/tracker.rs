//! The CoverageTracker — a thread-safe ledger of every table read
//! attempted during an extraction run, used later for gap analysis.

use std::collections::BTreeMap;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::record::{CoverageDetail, CoverageRecord, CoverageStatus};

/// Per-extractor rollup, as returned by [`CoverageTracker::report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorCoverageReport {
    pub extractor_id: String,
    pub extracted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub partial: usize,
    pub total: usize,
    pub coverage_pct: f64,
    /// Keyed by table name, sorted for deterministic serialisation.
    pub tables: BTreeMap<String, CoverageRecord>,
}

/// System-wide rollup across every extractor, as returned by
/// [`CoverageTracker::system_report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemCoverageReport {
    pub extractor_count: usize,
    pub extracted: usize,
    pub failed: usize,
    pub skipped: usize,
    pub partial: usize,
    pub total: usize,
    pub coverage_pct: f64,
}

fn coverage_pct(extracted: usize, partial: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (((extracted + partial) as f64 / total as f64) * 100.0).round()
}

/// Records every `(extractor_id, table)` read outcome. Internal writes
/// are serialised behind a `parking_lot::Mutex`; reads produce a
/// consistent snapshot taken under the same lock.
#[derive(Debug, Default)]
pub struct CoverageTracker {
    records: Mutex<BTreeMap<(String, String), CoverageRecord>>,
}

impl CoverageTracker {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
        }
    }

    /// Idempotent write; the latest call for a given
    /// `(extractor_id, table)` pair wins.
    pub fn track(
        &self,
        extractor_id: impl Into<String>,
        table: impl Into<String>,
        status: CoverageStatus,
        detail: CoverageDetail,
    ) {
        let extractor_id = extractor_id.into();
        let table = table.into();
        tracing::debug!(
            extractor_id = %extractor_id,
            table = %table,
            status = status.as_str(),
            "coverage tracked"
        );
        let record = CoverageRecord {
            extractor_id: extractor_id.clone(),
            table: table.clone(),
            status,
            detail,
            timestamp: Utc::now(),
        };
        self.records.lock().insert((extractor_id, table), record);
    }

    /// Aggregate coverage for a single extractor.
    pub fn report(&self, extractor_id: &str) -> ExtractorCoverageReport {
        let records = self.records.lock();
        let mut tables = BTreeMap::new();
        let (mut extracted, mut failed, mut skipped, mut partial) = (0, 0, 0, 0);

        for ((eid, table), record) in records.iter() {
            if eid != extractor_id {
                continue;
            }
            match record.status {
                CoverageStatus::Extracted => extracted += 1,
                CoverageStatus::Failed => failed += 1,
                CoverageStatus::Skipped => skipped += 1,
                CoverageStatus::Partial => partial += 1,
            }
            tables.insert(table.clone(), record.clone());
        }

        let total = extracted + failed + skipped + partial;
        ExtractorCoverageReport {
            extractor_id: extractor_id.to_string(),
            extracted,
            failed,
            skipped,
            partial,
            total,
            coverage_pct: coverage_pct(extracted, partial, total),
            tables,
        }
    }

    /// Aggregate coverage across every extractor that has written at
    /// least one record.
    pub fn system_report(&self) -> SystemCoverageReport {
        let records = self.records.lock();
        let mut extractor_ids = std::collections::BTreeSet::new();
        let (mut extracted, mut failed, mut skipped, mut partial) = (0, 0, 0, 0);

        for ((eid, _table), record) in records.iter() {
            extractor_ids.insert(eid.clone());
            match record.status {
                CoverageStatus::Extracted => extracted += 1,
                CoverageStatus::Failed => failed += 1,
                CoverageStatus::Skipped => skipped += 1,
                CoverageStatus::Partial => partial += 1,
            }
        }

        let total = extracted + failed + skipped + partial;
        SystemCoverageReport {
            extractor_count: extractor_ids.len(),
            extracted,
            failed,
            skipped,
            partial,
            total,
            coverage_pct: coverage_pct(extracted, partial, total),
        }
    }

    /// Every record whose status is not `Extracted`, sorted by
    /// `(extractor_id, table)` for deterministic output.
    pub fn gaps(&self) -> Vec<CoverageRecord> {
        self.records
            .lock()
            .values()
            .filter(|r| r.status != CoverageStatus::Extracted)
            .cloned()
            .collect()
    }

    /// All records, sorted by `(extractor_id, table)`.
    pub fn all_records(&self) -> Vec<CoverageRecord> {
        self.records.lock().values().cloned().collect()
    }
}

impl PartialEq for CoverageRecord {
    fn eq(&self, other: &Self) -> bool {
        self.extractor_id == other.extractor_id
            && self.table == other.table
            && self.status == other.status
            && self.detail == other.detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_and_report_single_extractor() {
        let tracker = CoverageTracker::new();
        tracker.track("FIN001", "BKPF", CoverageStatus::Extracted, CoverageDetail::rows(100));
        tracker.track("FIN001", "BSEG", CoverageStatus::Failed, CoverageDetail::error("timeout"));
        tracker.track("FIN001", "T001", CoverageStatus::Skipped, CoverageDetail::reason("not live mode"));

        let report = tracker.report("FIN001");
        assert_eq!(report.total, 3);
        assert_eq!(report.extracted, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        // coverage% = round((1 + 0) / 3 * 100) = 33
        assert_eq!(report.coverage_pct, 33.0);
    }

    #[test]
    fn last_write_wins() {
        let tracker = CoverageTracker::new();
        tracker.track("FIN001", "BKPF", CoverageStatus::Failed, CoverageDetail::error("x"));
        tracker.track("FIN001", "BKPF", CoverageStatus::Extracted, CoverageDetail::rows(5));

        let report = tracker.report("FIN001");
        assert_eq!(report.total, 1);
        assert_eq!(report.extracted, 1);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn coverage_pct_zero_when_no_tables() {
        let tracker = CoverageTracker::new();
        let report = tracker.report("NOPE");
        assert_eq!(report.total, 0);
        assert_eq!(report.coverage_pct, 0.0);
    }

    #[test]
    fn partial_counts_toward_coverage() {
        let tracker = CoverageTracker::new();
        tracker.track("FIN001", "A", CoverageStatus::Extracted, CoverageDetail::rows(1));
        tracker.track("FIN001", "B", CoverageStatus::Partial, CoverageDetail::rows(1));
        tracker.track("FIN001", "C", CoverageStatus::Failed, CoverageDetail::error("e"));
        tracker.track("FIN001", "D", CoverageStatus::Skipped, CoverageDetail::reason("r"));

        let report = tracker.report("FIN001");
        // (1 extracted + 1 partial) / 4 * 100 = 50
        assert_eq!(report.coverage_pct, 50.0);
    }

    #[test]
    fn system_report_aggregates_across_extractors() {
        let tracker = CoverageTracker::new();
        tracker.track("A", "T1", CoverageStatus::Extracted, CoverageDetail::rows(1));
        tracker.track("B", "T1", CoverageStatus::Extracted, CoverageDetail::rows(1));
        tracker.track("B", "T2", CoverageStatus::Failed, CoverageDetail::error("e"));

        let report = tracker.system_report();
        assert_eq!(report.extractor_count, 2);
        assert_eq!(report.total, 3);
        assert_eq!(report.extracted, 2);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn gaps_excludes_extracted() {
        let tracker = CoverageTracker::new();
        tracker.track("A", "T1", CoverageStatus::Extracted, CoverageDetail::rows(1));
        tracker.track("A", "T2", CoverageStatus::Failed, CoverageDetail::error("e"));
        tracker.track("A", "T3", CoverageStatus::Skipped, CoverageDetail::reason("r"));
        tracker.track("A", "T4", CoverageStatus::Partial, CoverageDetail::rows(1));

        let gaps = tracker.gaps();
        assert_eq!(gaps.len(), 3);
        assert!(gaps.iter().all(|g| g.status != CoverageStatus::Extracted));
    }

    #[test]
    fn concurrent_writes_are_serialized() {
        use std::sync::Arc;
        use std::thread;

        let tracker = Arc::new(CoverageTracker::new());
        let mut handles = Vec::new();
        for i in 0..20 {
            let tracker = tracker.clone();
            handles.push(thread::spawn(move || {
                tracker.track(
                    format!("EXT{i}"),
                    "TABLE",
                    CoverageStatus::Extracted,
                    CoverageDetail::rows(1),
                );
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let report = tracker.system_report();
        assert_eq!(report.extractor_count, 20);
        assert_eq!(report.total, 20);
    }
}
