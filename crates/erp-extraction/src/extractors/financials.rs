//! Financial accounting master/transaction tables (FI module).

use async_trait::async_trait;
use erp_coverage::TableExpectation;
use serde_json::json;

use crate::extractor::{BaseExtractor, ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput};
use crate::transport::ReadOptions;

pub struct FinancialsExtractor;

#[async_trait]
impl BaseExtractor for FinancialsExtractor {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity {
            extractor_id: "FINANCIALS".into(),
            name: "Financial Accounting".into(),
            module: "FI".into(),
            category: "financials".into(),
        }
    }

    fn expected_tables(&self) -> Vec<TableExpectation> {
        vec![
            TableExpectation::new("BKPF", "accounting document header").critical(),
            TableExpectation::new("BSEG", "accounting document line items").critical(),
            TableExpectation::new("SKA1", "G/L account master"),
        ]
    }

    async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new("FINANCIALS");
        out.tables.insert("BKPF".into(), helper.read_table("BKPF", ReadOptions::default()).await?);
        out.tables.insert("BSEG".into(), helper.read_table("BSEG", ReadOptions::default()).await?);
        out.tables.insert("SKA1".into(), helper.try_read_table("SKA1", ReadOptions::default()).await);
        Ok(out)
    }

    async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new("FINANCIALS");
        out.tables.insert(
            "BKPF".into(),
            helper.offline_rows("BKPF", vec![json!({"belnr": "1000000001", "bukrs": "1000"})]),
        );
        out.tables.insert(
            "BSEG".into(),
            helper.offline_rows("BSEG", vec![json!({"belnr": "1000000001", "hkont": "400000"})]),
        );
        out.tables.insert(
            "SKA1".into(),
            helper.offline_rows("SKA1", vec![json!({"saknr": "400000"})]),
        );
        Ok(out)
    }
}
