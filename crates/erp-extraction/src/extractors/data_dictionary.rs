//! Phase 2: populates the data dictionary consumed by every later
//! phase. Runs exactly once, after `SystemInfoExtractor`, before phase
//! 3 begins. The orchestrator is responsible for taking this
//! extractor's output and calling `ExtractionContext::set_data_dictionary`.

use async_trait::async_trait;
use erp_coverage::{DataDictionary, DataDictionaryStats, FieldDescriptor, TableExpectation, TableSchema};
use serde_json::json;

use crate::extractor::{BaseExtractor, ExtractHelper, ExtractorError, ExtractorIdentity, ExtractorOutput};
use crate::transport::ReadOptions;

pub struct DataDictionaryExtractor;

#[async_trait]
impl BaseExtractor for DataDictionaryExtractor {
    fn identity(&self) -> ExtractorIdentity {
        ExtractorIdentity {
            extractor_id: super::DATA_DICTIONARY_ID.into(),
            name: "Data Dictionary".into(),
            module: "core".into(),
            category: "system".into(),
        }
    }

    fn expected_tables(&self) -> Vec<TableExpectation> {
        vec![
            TableExpectation::new("DD02L", "table catalogue").critical(),
            TableExpectation::new("DD03L", "field catalogue").critical(),
        ]
    }

    async fn extract_live(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new(super::DATA_DICTIONARY_ID);
        let dd02l = helper.read_table("DD02L", ReadOptions::default()).await?;
        let dd03l = helper.read_table("DD03L", ReadOptions::default()).await?;
        out.tables.insert("DD02L".into(), dd02l);
        out.tables.insert("DD03L".into(), dd03l);
        Ok(out)
    }

    async fn extract_offline(&self, helper: &ExtractHelper) -> Result<ExtractorOutput, ExtractorError> {
        let mut out = ExtractorOutput::new(super::DATA_DICTIONARY_ID);
        let dd02l = helper.offline_rows(
            "DD02L",
            vec![json!({"tabname": "VBAK"}), json!({"tabname": "BKPF"}), json!({"tabname": "CDHDR"})],
        );
        let dd03l = helper.offline_rows(
            "DD03L",
            vec![
                json!({"tabname": "VBAK", "fieldname": "VBELN"}),
                json!({"tabname": "BKPF", "fieldname": "BELNR"}),
            ],
        );
        out.tables.insert("DD02L".into(), dd02l);
        out.tables.insert("DD03L".into(), dd03l);
        out.metadata = json!({ "known_tables": 20 });
        Ok(out)
    }
}

/// Builds a `DataDictionary` from this extractor's output. Called by
/// the orchestrator between phase 2 and phase 3.
pub fn build_data_dictionary(output: &ExtractorOutput) -> DataDictionary {
    let mut dictionary = DataDictionary::default();
    for row in output.rows("DD02L") {
        if let Some(name) = row.get("tabname").and_then(|v| v.as_str()) {
            dictionary.tables.entry(name.to_string()).or_insert_with(TableSchema::default);
        }
    }
    for row in output.rows("DD03L") {
        if let (Some(table), Some(field)) = (
            row.get("tabname").and_then(|v| v.as_str()),
            row.get("fieldname").and_then(|v| v.as_str()),
        ) {
            let schema = dictionary.tables.entry(table.to_string()).or_insert_with(TableSchema::default);
            schema.fields.push(FieldDescriptor {
                name: field.to_string(),
                data_type: "CHAR".into(),
                length: None,
                nullable: true,
            });
        }
    }
    dictionary.stats = DataDictionaryStats {
        table_count: dictionary.tables.len(),
        field_count: dictionary.tables.values().map(|t| t.fields.len()).sum(),
        relationship_count: dictionary.relationships.len(),
    };
    dictionary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_data_dictionary_from_fixture_output() {
        let mut output = ExtractorOutput::new(super::super::DATA_DICTIONARY_ID);
        output.tables.insert("DD02L".into(), vec![json!({"tabname": "VBAK"})]);
        output.tables.insert("DD03L".into(), vec![json!({"tabname": "VBAK", "fieldname": "VBELN"})]);

        let dictionary = build_data_dictionary(&output);
        assert!(dictionary.tables.contains_key("VBAK"));
        assert_eq!(dictionary.tables["VBAK"].fields.len(), 1);
        assert_eq!(dictionary.stats.table_count, 1);
    }
}
