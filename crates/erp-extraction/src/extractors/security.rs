//! Security/authorization tables: users, roles, authorization profiles.

use async_trait::async_trait;
use erp_coverage::TableExpectation;
use serde_json::json;

use crate::extractor::{BaseExtractor, ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput};
use crate::transport::ReadOptions;

pub struct SecurityExtractor;

#[async_trait]
impl BaseExtractor for SecurityExtractor {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity {
            extractor_id: "SECURITY".into(),
            name: "Security & Authorizations".into(),
            module: "BC".into(),
            category: "security".into(),
        }
    }

    fn expected_tables(&self) -> Vec<TableExpectation> {
        vec![
            TableExpectation::new("USR02", "user master").critical(),
            TableExpectation::new("AGR_USERS", "role assignments").critical(),
            TableExpectation::new("USOBT_C", "authorization defaults"),
        ]
    }

    async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new("SECURITY");
        out.tables.insert("USR02".into(), helper.read_table("USR02", ReadOptions::default()).await?);
        out.tables.insert("AGR_USERS".into(), helper.read_table("AGR_USERS", ReadOptions::default()).await?);
        out.tables.insert("USOBT_C".into(), helper.try_read_table("USOBT_C", ReadOptions::default()).await);
        Ok(out)
    }

    async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new("SECURITY");
        out.tables.insert(
            "USR02".into(),
            helper.offline_rows("USR02", vec![json!({"bname": "JDOE"}), json!({"bname": "ASMITH"})]),
        );
        out.tables.insert(
            "AGR_USERS".into(),
            helper.offline_rows("AGR_USERS", vec![json!({"uname": "JDOE", "agr_name": "Z_FI_CLERK"})]),
        );
        helper.skip_table("USOBT_C", "requires RFC; not available in this fixture");
        Ok(out)
    }
}
