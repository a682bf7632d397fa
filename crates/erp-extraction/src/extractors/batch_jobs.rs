//! Background batch job runs (TBTCO-style) — `status`-class rows
//! consumed by the event log builder.

use async_trait::async_trait;
use erp_coverage::TableExpectation;
use serde_json::json;

use crate::extractor::{BaseExtractor, ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput};
use crate::transport::ReadOptions;

pub struct BatchJobsExtractor;

#[async_trait]
impl BaseExtractor for BatchJobsExtractor {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity {
            extractor_id: super::BATCH_JOBS_ID.into(),
            name: "Batch Jobs".into(),
            module: "BC".into(),
            category: "process_evidence".into(),
        }
    }

    fn expected_tables(&self) -> Vec<TableExpectation> {
        vec![TableExpectation::new("TBTCO", "batch job control table")]
    }

    async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new(super::BATCH_JOBS_ID);
        out.tables.insert("TBTCO".into(), helper.read_table("TBTCO", ReadOptions::default()).await?);
        Ok(out)
    }

    async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new(super::BATCH_JOBS_ID);
        let rows = vec![json!({
            "case_id": "SO-1001", "job_name": "Z_INVOICE_RUN", "status": "Clear Invoice",
            "start_time": "2024-01-12T09:00:00Z", "end_time": "2024-01-12T09:05:00Z", "user": "SYSTEM"
        })];
        out.tables.insert("TBTCO".into(), helper.offline_rows("TBTCO", rows));
        Ok(out)
    }
}
