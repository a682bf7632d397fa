//! The process catalog (spec §3 "process instance"): one entry per
//! business process, aggregating discovered variants, interfaces,
//! custom code, configuration, and supporting evidence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessVariant {
    pub id: String,
    pub description: String,
    pub steps: Vec<String>,
    pub volume: u64,
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessEvidence {
    pub change_documents: u64,
    pub usage_statistics: u64,
    pub batch_jobs: u64,
    pub workflows: u64,
}

impl ProcessEvidence {
    pub fn has_any(&self) -> bool {
        self.change_documents > 0 || self.usage_statistics > 0 || self.batch_jobs > 0 || self.workflows > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessCatalogEntry {
    pub process_id: String,
    pub name: String,
    pub category: String,
    pub variants: Vec<ProcessVariant>,
    pub interfaces: Vec<String>,
    pub custom_code: Vec<String>,
    pub configuration: BTreeMap<String, String>,
    pub evidence: ProcessEvidence,
    pub gaps: Vec<String>,
}

impl ProcessCatalogEntry {
    pub fn new(process_id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            name: name.into(),
            category: category.into(),
            variants: Vec::new(),
            interfaces: Vec::new(),
            custom_code: Vec::new(),
            configuration: BTreeMap::new(),
            evidence: ProcessEvidence::default(),
            gaps: Vec::new(),
        }
    }

    pub fn total_volume(&self) -> u64 {
        self.variants.iter().map(|v| v.volume).sum()
    }
}

/// All discovered processes, keyed by process id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessCatalog {
    pub processes: BTreeMap<String, ProcessCatalogEntry>,
}

impl ProcessCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: ProcessCatalogEntry) {
        self.processes.insert(entry.process_id.clone(), entry);
    }

    pub fn get(&self, process_id: &str) -> Option<&ProcessCatalogEntry> {
        self.processes.get(process_id)
    }

    pub fn sorted_entries(&self) -> Vec<&ProcessCatalogEntry> {
        self.processes.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_volume_sums_variant_volumes() {
        let mut entry = ProcessCatalogEntry::new("O2C", "Order to Cash", "sales");
        entry.variants.push(ProcessVariant {
            id: "v1".into(),
            description: "standard".into(),
            steps: vec!["a".into()],
            volume: 10,
            users: vec![],
        });
        entry.variants.push(ProcessVariant {
            id: "v2".into(),
            description: "rush".into(),
            steps: vec!["a".into()],
            volume: 5,
            users: vec![],
        });
        assert_eq!(entry.total_volume(), 15);
    }
}
