//! Gap detection (spec §4.3.1): pure, side-effect-free reconciliation
//! of coverage telemetry, the data dictionary, and extraction results
//! into a list of typed gaps.

use std::collections::{BTreeMap, BTreeSet};

use erp_coverage::{CoverageRecord, CoverageStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GapCategory {
    Extraction,
    Authorization,
    SystemType,
    DataVolume,
    Process,
    Interface,
    Temporal,
    Interpretation,
}

impl GapCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapCategory::Extraction => "extraction",
            GapCategory::Authorization => "authorization",
            GapCategory::SystemType => "system_type",
            GapCategory::DataVolume => "data_volume",
            GapCategory::Process => "process",
            GapCategory::Interface => "interface",
            GapCategory::Temporal => "temporal",
            GapCategory::Interpretation => "interpretation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Advisory,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gap {
    pub category: GapCategory,
    pub severity: Severity,
    pub code: String,
    pub description: String,
}

/// Everything [`GapAnalyzer::analyse`] needs, assembled by the caller
/// (the orchestrator) from the data dictionary, the coverage tracker,
/// and the extraction results map. This crate never touches a
/// transport or re-reads extractor output itself.
#[derive(Debug, Clone, Default)]
pub struct GapAnalysisInput {
    pub coverage_records: Vec<CoverageRecord>,
    /// Every table name the data dictionary knows about.
    pub known_tables: BTreeSet<String>,
    /// Tables declared critical by at least one extractor.
    pub critical_tables: BTreeSet<String>,
    /// Extractor ids declared RFC-only that were skipped this run.
    pub rfc_only_extractors_skipped: Vec<String>,
    /// `(table, version_flag)` pairs for domain-indicator tables that
    /// are absent from `known_tables`, e.g. `("BSEG_ADD", "S4HANA")`.
    pub missing_domain_indicators: Vec<(String, String)>,
    /// Whether each foundational process-evidence extractor produced
    /// at least one successful read.
    pub change_documents_present: bool,
    pub usage_statistics_present: bool,
    pub workflows_present: bool,
    /// Whether the interfaces extractor is registered/ran at all.
    pub interface_extractor_present: bool,
    pub unreachable_destinations: Vec<String>,
    /// Modules whose extracted results have no matching interpretation rule.
    pub modules_without_interpretation: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GapAnalysisError {
    #[error("precondition not met: gap report requested before analyse() was invoked")]
    PreconditionNotMet,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GapReport {
    pub gaps: Vec<Gap>,
}

impl GapReport {
    pub fn by_category(&self, category: GapCategory) -> Vec<&Gap> {
        self.gaps.iter().filter(|g| g.category == category).collect()
    }
}

/// Detects gaps once, on demand; querying the report before `analyse`
/// has run is a `precondition_not_met` error (spec §4.3.3).
#[derive(Debug, Default)]
pub struct GapAnalyzer {
    report: Option<GapReport>,
}

impl GapAnalyzer {
    pub fn new() -> Self {
        Self { report: None }
    }

    pub fn analyse(&mut self, input: &GapAnalysisInput) -> &GapReport {
        let mut gaps = Vec::new();

        gaps.extend(extraction_gaps(input));
        gaps.extend(authorization_gaps(input));
        gaps.extend(system_type_gaps(input));
        gaps.extend(data_volume_gaps(input));
        gaps.extend(process_gaps(input));
        gaps.extend(interface_gaps(input));
        gaps.push(temporal_advisory());
        gaps.extend(interpretation_gaps(input));

        gaps.sort_by(|a, b| (a.category.as_str(), &a.code).cmp(&(b.category.as_str(), &b.code)));

        self.report = Some(GapReport { gaps });
        self.report.as_ref().unwrap()
    }

    pub fn report(&self) -> Result<&GapReport, GapAnalysisError> {
        self.report.as_ref().ok_or(GapAnalysisError::PreconditionNotMet)
    }
}

fn tracked_tables(input: &GapAnalysisInput) -> BTreeSet<String> {
    input.coverage_records.iter().map(|r| r.table.clone()).collect()
}

fn extraction_gaps(input: &GapAnalysisInput) -> Vec<Gap> {
    let tracked = tracked_tables(input);
    let mut gaps = Vec::new();

    for table in input.known_tables.difference(&tracked) {
        let severity = if input.critical_tables.contains(table) {
            Severity::High
        } else {
            Severity::Low
        };
        gaps.push(Gap {
            category: GapCategory::Extraction,
            severity,
            code: format!("NOT_ATTEMPTED:{table}"),
            description: format!("table {table} is known to the data dictionary but was never attempted"),
        });
    }

    gaps
}

fn authorization_gaps(input: &GapAnalysisInput) -> Vec<Gap> {
    const AUTH_INDICATORS: &[&str] = &["authorization", "auth", "permission", "access denied", "forbidden"];
    input
        .coverage_records
        .iter()
        .filter(|r| r.status == CoverageStatus::Failed)
        .filter_map(|r| {
            let error = r.detail.error.as_deref()?;
            let lower = error.to_lowercase();
            if AUTH_INDICATORS.iter().any(|i| lower.contains(i)) {
                Some(Gap {
                    category: GapCategory::Authorization,
                    severity: Severity::Medium,
                    code: format!("AUTH:{}:{}", r.extractor_id, r.table),
                    description: format!("{} failed to read {} due to an authorization error: {error}", r.extractor_id, r.table),
                })
            } else {
                None
            }
        })
        .collect()
}

fn system_type_gaps(input: &GapAnalysisInput) -> Vec<Gap> {
    let mut gaps: Vec<Gap> = input
        .rfc_only_extractors_skipped
        .iter()
        .map(|id| Gap {
            category: GapCategory::SystemType,
            severity: Severity::Medium,
            code: format!("NO_RFC:{id}"),
            description: format!("{id} is RFC-only and was skipped (no RFC transport available)"),
        })
        .collect();

    gaps.extend(input.missing_domain_indicators.iter().map(|(table, flag)| Gap {
        category: GapCategory::SystemType,
        severity: Severity::Low,
        code: format!("MISSING_INDICATOR:{flag}"),
        description: format!("domain-indicator table {table} for {flag} is absent from the data dictionary"),
    }));

    gaps
}

fn data_volume_gaps(input: &GapAnalysisInput) -> Vec<Gap> {
    input
        .coverage_records
        .iter()
        .filter(|r| r.status == CoverageStatus::Partial)
        .map(|r| Gap {
            category: GapCategory::DataVolume,
            severity: Severity::Low,
            code: format!("PARTIAL:{}:{}", r.extractor_id, r.table),
            description: format!("{} returned a partial read of {}", r.extractor_id, r.table),
        })
        .collect()
}

fn process_gaps(input: &GapAnalysisInput) -> Vec<Gap> {
    let mut gaps = Vec::new();
    if !input.change_documents_present {
        gaps.push(Gap {
            category: GapCategory::Process,
            severity: Severity::High,
            code: "NO_CHANGE_DOCUMENTS".into(),
            description: "no change-document evidence was extracted; process mining cannot observe modifications".into(),
        });
    }
    if !input.usage_statistics_present {
        gaps.push(Gap {
            category: GapCategory::Process,
            severity: Severity::Medium,
            code: "NO_USAGE_STATISTICS".into(),
            description: "no transaction-usage evidence was extracted".into(),
        });
    }
    if !input.workflows_present {
        gaps.push(Gap {
            category: GapCategory::Process,
            severity: Severity::Medium,
            code: "NO_WORKFLOWS".into(),
            description: "no workflow evidence was extracted".into(),
        });
    }
    gaps
}

fn interface_gaps(input: &GapAnalysisInput) -> Vec<Gap> {
    let mut gaps = Vec::new();
    if !input.interface_extractor_present {
        gaps.push(Gap {
            category: GapCategory::Interface,
            severity: Severity::Medium,
            code: "NO_INTERFACE_EXTRACTOR".into(),
            description: "the interfaces extractor did not run at all this pass".into(),
        });
    }
    gaps.extend(input.unreachable_destinations.iter().map(|dest| Gap {
        category: GapCategory::Interface,
        severity: Severity::Low,
        code: format!("UNREACHABLE:{dest}"),
        description: format!("remote destination {dest} was unreachable"),
    }));
    gaps
}

fn temporal_advisory() -> Gap {
    Gap {
        category: GapCategory::Temporal,
        severity: Severity::Advisory,
        code: "RETENTION_POLICY".into(),
        description: "historical coverage depends on the source system's change-document and log retention policy".into(),
    }
}

fn interpretation_gaps(input: &GapAnalysisInput) -> Vec<Gap> {
    input
        .modules_without_interpretation
        .iter()
        .map(|module| Gap {
            category: GapCategory::Interpretation,
            severity: Severity::Low,
            code: format!("NO_RULE:{module}"),
            description: format!("module {module} has extracted results with no matching interpretation rule"),
        })
        .collect()
}

impl GapReport {
    pub fn rollup(&self) -> BTreeMap<&'static str, usize> {
        let mut counts: BTreeMap<GapCategory, usize> = BTreeMap::new();
        for gap in &self.gaps {
            *counts.entry(gap.category).or_insert(0) += 1;
        }
        counts.into_iter().map(|(c, n)| (c.as_str(), n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erp_coverage::{CoverageDetail, CoverageRecord, CoverageStatus};
    use chrono::Utc;

    fn rec(extractor: &str, table: &str, status: CoverageStatus, detail: CoverageDetail) -> CoverageRecord {
        CoverageRecord {
            extractor_id: extractor.to_string(),
            table: table.to_string(),
            status,
            detail,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn report_before_analyse_is_precondition_not_met() {
        let analyzer = GapAnalyzer::new();
        assert_eq!(analyzer.report(), Err(GapAnalysisError::PreconditionNotMet));
    }

    #[test]
    fn analyse_then_report_succeeds() {
        let mut analyzer = GapAnalyzer::new();
        let input = GapAnalysisInput {
            change_documents_present: true,
            usage_statistics_present: true,
            workflows_present: true,
            interface_extractor_present: true,
            ..Default::default()
        };
        analyzer.analyse(&input);
        assert!(analyzer.report().is_ok());
    }

    #[test]
    fn missing_critical_table_is_high_severity() {
        let mut analyzer = GapAnalyzer::new();
        let mut input = GapAnalysisInput {
            change_documents_present: true,
            usage_statistics_present: true,
            workflows_present: true,
            interface_extractor_present: true,
            ..Default::default()
        };
        input.known_tables.insert("BSEG".to_string());
        input.critical_tables.insert("BSEG".to_string());

        let report = analyzer.analyse(&input);
        let extraction_gaps = report.by_category(GapCategory::Extraction);
        assert_eq!(extraction_gaps.len(), 1);
        assert_eq!(extraction_gaps[0].severity, Severity::High);
    }

    #[test]
    fn authorization_failure_detected_from_error_text() {
        let mut analyzer = GapAnalyzer::new();
        let mut input = GapAnalysisInput {
            change_documents_present: true,
            usage_statistics_present: true,
            workflows_present: true,
            interface_extractor_present: true,
            ..Default::default()
        };
        input.coverage_records.push(rec(
            "SECURITY",
            "USR02",
            CoverageStatus::Failed,
            CoverageDetail::error("Authorization check failed for user"),
        ));

        let report = analyzer.analyse(&input);
        assert_eq!(report.by_category(GapCategory::Authorization).len(), 1);
    }

    #[test]
    fn foundational_process_evidence_absent_flags_gap() {
        let mut analyzer = GapAnalyzer::new();
        let input = GapAnalysisInput {
            interface_extractor_present: true,
            ..Default::default()
        };
        let report = analyzer.analyse(&input);
        assert_eq!(report.by_category(GapCategory::Process).len(), 3);
    }
}
