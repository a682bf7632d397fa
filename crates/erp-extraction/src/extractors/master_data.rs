//! Core master data: customers, vendors, materials.

use async_trait::async_trait;
use erp_coverage::TableExpectation;
use serde_json::json;

use crate::extractor::{BaseExtractor, ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput};
use crate::transport::ReadOptions;

pub struct MasterDataExtractor;

#[async_trait]
impl BaseExtractor for MasterDataExtractor {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity {
            extractor_id: "MASTER_DATA".into(),
            name: "Master Data".into(),
            module: "MM/SD".into(),
            category: "masterdata".into(),
        }
    }

    fn expected_tables(&self) -> Vec<TableExpectation> {
        vec![
            TableExpectation::new("KNA1", "customer master").critical(),
            TableExpectation::new("LFA1", "vendor master").critical(),
            TableExpectation::new("MARA", "material master").critical(),
        ]
    }

    async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new("MASTER_DATA");
        out.tables.insert("KNA1".into(), helper.read_table("KNA1", ReadOptions::default()).await?);
        out.tables.insert("LFA1".into(), helper.read_table("LFA1", ReadOptions::default()).await?);
        out.tables.insert("MARA".into(), helper.read_table("MARA", ReadOptions::default()).await?);
        Ok(out)
    }

    async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new("MASTER_DATA");
        out.tables.insert("KNA1".into(), helper.offline_rows("KNA1", vec![json!({"kunnr": "0000100001"})]));
        out.tables.insert("LFA1".into(), helper.offline_rows("LFA1", vec![json!({"lifnr": "0000200001"})]));
        out.tables.insert("MARA".into(), helper.offline_rows("MARA", vec![json!({"matnr": "MAT-001"})]));
        Ok(out)
    }
}
