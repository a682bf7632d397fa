//! Change document headers/items (CDHDR/CDPOS) — the primary source
//! of `change`-class rows consumed by process mining's event log
//! builder (spec §4.2.1).

use async_trait::async_trait;
use erp_coverage::TableExpectation;
use serde_json::json;

use crate::extractor::{BaseExtractor, ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput};
use crate::transport::ReadOptions;

pub struct ChangeDocumentsExtractor;

#[async_trait]
impl BaseExtractor for ChangeDocumentsExtractor {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity {
            extractor_id: super::CHANGE_DOCUMENTS_ID.into(),
            name: "Change Documents".into(),
            module: "BC".into(),
            category: "process_evidence".into(),
        }
    }

    fn expected_tables(&self) -> Vec<TableExpectation> {
        vec![
            TableExpectation::new("CDHDR", "change document header").critical(),
            TableExpectation::new("CDPOS", "change document item").critical(),
        ]
    }

    async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new(super::CHANGE_DOCUMENTS_ID);
        out.tables.insert("CDHDR".into(), helper.read_table("CDHDR", ReadOptions::default()).await?);
        out.tables.insert("CDPOS".into(), helper.read_table("CDPOS", ReadOptions::default()).await?);
        Ok(out)
    }

    async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new(super::CHANGE_DOCUMENTS_ID);
        let rows = vec![
            json!({
                "case_id": "SO-1001", "table": "VBAK", "field": "STATUS",
                "old_value": "OPEN", "new_value": "CREATED",
                "changed_by": "JDOE", "changed_at": "2024-01-10T08:00:00Z", "tcode": "VA01"
            }),
            json!({
                "case_id": "SO-1001", "table": "VBAK", "field": "STATUS",
                "old_value": "CREATED", "new_value": "DELIVERED",
                "changed_by": "ASMITH", "changed_at": "2024-01-10T11:00:00Z", "tcode": "VL01N"
            }),
        ];
        out.tables.insert("CDHDR".into(), helper.offline_rows("CDHDR", rows));
        out.tables.insert("CDPOS".into(), helper.offline_rows("CDPOS", vec![]));
        Ok(out)
    }
}
