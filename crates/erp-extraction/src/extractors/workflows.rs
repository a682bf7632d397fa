//! SAP Business Workflow instances (SWWWIHEAD-style) — `flow`-class
//! rows consumed by the event log builder.

use async_trait::async_trait;
use erp_coverage::TableExpectation;
use serde_json::json;

use crate::extractor::{BaseExtractor, ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput};
use crate::transport::ReadOptions;

pub struct WorkflowsExtractor;

#[async_trait]
impl BaseExtractor for WorkflowsExtractor {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity {
            extractor_id: super::WORKFLOWS_ID.into(),
            name: "Workflows".into(),
            module: "BC-BMT-WFM".into(),
            category: "process_evidence".into(),
        }
    }

    fn expected_tables(&self) -> Vec<TableExpectation> {
        vec![TableExpectation::new("SWWWIHEAD", "workflow work item header")]
    }

    async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new(super::WORKFLOWS_ID);
        out.tables.insert("SWWWIHEAD".into(), helper.read_table("SWWWIHEAD", ReadOptions::default()).await?);
        Ok(out)
    }

    async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new(super::WORKFLOWS_ID);
        let rows = vec![json!({
            "case_id": "SO-1001", "workflow_id": "WF-5001", "status": "Credit Check",
            "timestamp": "2024-01-10T09:00:00Z", "agent": "CREDIT_MGR"
        })];
        out.tables.insert("SWWWIHEAD".into(), helper.offline_rows("SWWWIHEAD", rows));
        Ok(out)
    }
}
