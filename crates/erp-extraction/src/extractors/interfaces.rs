//! Outbound/inbound interface definitions (RFC destinations, IDoc
//! partner profiles, batch interfaces).

use async_trait::async_trait;
use erp_coverage::TableExpectation;
use serde_json::json;

use crate::extractor::{BaseExtractor, ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput};
use crate::transport::ReadOptions;

pub struct InterfacesExtractor;

#[async_trait]
impl BaseExtractor for InterfacesExtractor {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity {
            extractor_id: "INTERFACES".into(),
            name: "Interfaces".into(),
            module: "BC".into(),
            category: "interface".into(),
        }
    }

    fn expected_tables(&self) -> Vec<TableExpectation> {
        vec![
            TableExpectation::new("RFCDES", "RFC destinations"),
            TableExpectation::new("EDP13", "IDoc partner profiles"),
        ]
    }

    async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new("INTERFACES");
        out.tables.insert("RFCDES".into(), helper.read_table("RFCDES", ReadOptions::default()).await?);
        out.tables.insert("EDP13".into(), helper.try_read_table("EDP13", ReadOptions::default()).await);
        Ok(out)
    }

    async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new("INTERFACES");
        out.tables.insert(
            "RFCDES".into(),
            helper.offline_rows("RFCDES", vec![json!({"rfcdest": "PRD_CLNT100", "reachable": true})]),
        );
        out.tables.insert(
            "EDP13".into(),
            helper.offline_rows("EDP13", vec![json!({"partner": "EDI_PARTNER_01"})]),
        );
        Ok(out)
    }
}
