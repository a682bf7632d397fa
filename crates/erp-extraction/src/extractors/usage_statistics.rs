//! Transaction-code usage statistics (ST03N-style) — `transaction`-class
//! rows consumed by the event log builder.

use async_trait::async_trait;
use erp_coverage::TableExpectation;
use serde_json::json;

use crate::extractor::{BaseExtractor, ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput};
use crate::transport::ReadOptions;

pub struct UsageStatisticsExtractor;

#[async_trait]
impl BaseExtractor for UsageStatisticsExtractor {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity {
            extractor_id: super::USAGE_STATISTICS_ID.into(),
            name: "Usage Statistics".into(),
            module: "BC".into(),
            category: "process_evidence".into(),
        }
    }

    fn expected_tables(&self) -> Vec<TableExpectation> {
        vec![TableExpectation::new("STAT", "transaction usage statistics")]
    }

    async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new(super::USAGE_STATISTICS_ID);
        out.tables.insert("STAT".into(), helper.read_table("STAT", ReadOptions::default()).await?);
        Ok(out)
    }

    async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new(super::USAGE_STATISTICS_ID);
        let rows = vec![
            json!({"case_id": "SO-1001", "tcode": "VA01", "user": "JDOE", "timestamp": "2024-01-10T08:00:00Z", "count": 1}),
            json!({"case_id": "SO-1001", "tcode": "VL01N", "user": "ASMITH", "timestamp": "2024-01-10T11:00:00Z", "count": 1}),
        ];
        out.tables.insert("STAT".into(), helper.offline_rows("STAT", rows));
        Ok(out)
    }
}
