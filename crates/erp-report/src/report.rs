//! The forensic report (spec §6 "Report surface"): the final
//! structured aggregation of everything the orchestrator produced,
//! with every serialisation the external CLI/HTTP layers need.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use erp_coverage::SystemCoverageReport;
use erp_gap_analysis::{ConfidenceReport, GapReport};
use erp_process_mining::ProcessIntelligenceReport;
use serde::{Deserialize, Serialize};

use crate::catalog::ProcessCatalog;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub extractor_id: String,
    pub module: String,
    pub category: String,
    pub succeeded: bool,
    pub error: Option<String>,
    pub tables_read: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSummary {
    pub release: String,
    pub database: String,
    pub components: Vec<String>,
}

/// Everything the orchestrator assembled over one run (spec component 12).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForensicReport {
    pub generated_at: DateTime<Utc>,
    pub system: SystemSummary,
    pub coverage: SystemCoverageReport,
    pub modules: Vec<ModuleSummary>,
    pub process_mining: BTreeMap<String, ProcessIntelligenceReport>,
    pub catalog: ProcessCatalog,
    pub gaps: GapReport,
    pub confidence: ConfidenceReport,
}

impl ForensicReport {
    pub fn to_serializable(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_executive_summary(&self) -> String {
        format!(
            "# Executive Summary\n\n\
             System: {} on {}\n\
             Overall confidence: {:.1} (grade {})\n\
             Coverage: {:.0}% ({} of {} table reads extracted or partial)\n\
             Processes analysed: {}\n\
             Open gaps: {}\n",
            self.system.release,
            self.system.database,
            self.confidence.overall,
            self.confidence.grade.as_str(),
            self.coverage.coverage_pct,
            self.coverage.extracted + self.coverage.partial,
            self.coverage.total,
            self.process_mining.len(),
            self.gaps.gaps.len(),
        )
    }

    pub fn to_markdown(&self) -> String {
        let mut md = self.to_executive_summary();
        md.push_str("\n## Modules\n\n");
        for module in &self.modules {
            let status = if module.succeeded { "ok" } else { "failed" };
            md.push_str(&format!(
                "- **{}** ({}): {} — {} tables read{}\n",
                module.extractor_id,
                module.module,
                status,
                module.tables_read,
                module
                    .error
                    .as_ref()
                    .map(|e| format!(" ({e})"))
                    .unwrap_or_default(),
            ));
        }

        md.push_str("\n## Processes\n\n");
        for entry in self.catalog.sorted_entries() {
            md.push_str(&format!(
                "- **{}** ({}): {} variant(s), volume {}\n",
                entry.name,
                entry.category,
                entry.variants.len(),
                entry.total_volume(),
            ));
        }

        md.push_str("\n## Gaps\n\n");
        for gap in &self.gaps.gaps {
            md.push_str(&format!("- [{}] {}\n", gap.category.as_str(), gap.description));
        }

        md
    }

    pub fn to_module_report(&self, module: &str) -> Option<String> {
        let matching: Vec<&ModuleSummary> = self.modules.iter().filter(|m| m.module == module).collect();
        if matching.is_empty() {
            return None;
        }
        let mut out = format!("# Module report: {module}\n\n");
        for m in matching {
            out.push_str(&format!(
                "- {} — succeeded={} tables_read={}{}\n",
                m.extractor_id,
                m.succeeded,
                m.tables_read,
                m.error.as_ref().map(|e| format!(" error={e}")).unwrap_or_default(),
            ));
        }
        Some(out)
    }

    /// A process-level map: activities and discovered edges per
    /// process, suitable for rendering as a graph by the caller.
    pub fn to_process_map(&self) -> serde_json::Value {
        let map: BTreeMap<&str, serde_json::Value> = self
            .process_mining
            .iter()
            .map(|(process_id, report)| {
                (
                    process_id.as_str(),
                    serde_json::json!({
                        "activities": report.discovered.activities,
                        "edges": report.discovered.edges,
                        "start_activities": report.discovered.start_activities,
                        "end_activities": report.discovered.end_activities,
                    }),
                )
            })
            .collect();
        serde_json::to_value(map).unwrap_or(serde_json::Value::Null)
    }

    /// Module-to-module dependency graph inferred from interface
    /// catalog entries.
    pub fn to_dependency_graph(&self) -> serde_json::Value {
        let edges: Vec<serde_json::Value> = self
            .catalog
            .sorted_entries()
            .iter()
            .flat_map(|entry| {
                entry
                    .interfaces
                    .iter()
                    .map(|iface| serde_json::json!({"from": entry.process_id, "to": iface}))
            })
            .collect();
        serde_json::json!({ "edges": edges })
    }

    pub fn to_gap_report(&self) -> serde_json::Value {
        serde_json::to_value(&self.gaps).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erp_coverage::SystemCoverageReport;
    use erp_gap_analysis::{ConfidenceReport, Grade};

    fn empty_report() -> ForensicReport {
        ForensicReport {
            generated_at: Utc::now(),
            system: SystemSummary {
                release: "ECC 6.0".into(),
                database: "HANA".into(),
                components: vec![],
            },
            coverage: SystemCoverageReport {
                extractor_count: 0,
                extracted: 0,
                failed: 0,
                skipped: 0,
                partial: 0,
                total: 0,
                coverage_pct: 0.0,
            },
            modules: vec![],
            process_mining: BTreeMap::new(),
            catalog: ProcessCatalog::new(),
            gaps: GapReport::default(),
            confidence: ConfidenceReport {
                category_scores: vec![],
                overall: 0.0,
                grade: Grade::F,
            },
        }
    }

    #[test]
    fn empty_report_serialises_without_panicking() {
        let report = empty_report();
        assert!(report.to_serializable().is_object());
        assert!(report.to_markdown().contains("Executive Summary"));
        assert!(report.to_module_report("NOPE").is_none());
    }

    #[test]
    fn gap_report_round_trips_through_serialisation() {
        let report = empty_report();
        let value = report.to_gap_report();
        assert!(value.get("gaps").is_some());
    }
}
