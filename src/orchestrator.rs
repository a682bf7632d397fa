//! The seven-phase orchestration pipeline (spec §4.1.3): drives
//! extraction to completion, folds the process-evidence extractors'
//! output into event logs, runs process mining per reference model,
//! interprets configuration, runs gap analysis, and assembles the
//! final [`ForensicReport`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use erp_config::{ErpConfig, RunMode};
use erp_coverage::{CoverageStatus, ExtractionContext, ExtractionMode};
use erp_extraction::extractors::{
    BATCH_JOBS_ID, CHANGE_DOCUMENTS_ID, DATA_DICTIONARY_ID, SYSTEM_INFO_ID, USAGE_STATISTICS_ID, WORKFLOWS_ID,
};
use erp_extraction::{
    extractors, BaseExtractor, CheckpointStore, ExtractorRegistry, ExtractorResult, Transport,
};
use erp_gap_analysis::{CategoryCoverage, ConfidenceScorer, GapAnalysisInput, GapAnalyzer, GapCategory, ScoreCategory};
use erp_process_mining::{
    build_event_log, ProcessEventConfig, ProcessIntelligenceEngine, ProcessIntelligenceReport, ReferenceModelCatalog,
    TableClass, TableMapping,
};
use erp_report::{ForensicReport, ModuleSummary, ProcessCatalog, ProcessCatalogEntry, ProcessEvidence, ProcessVariant, SystemSummary};
use serde_json::Value;

use crate::observer::{CancellationToken, Observer, OrchestratorEvent};

/// Modules whose extracted results have a defined configuration
/// interpretation rule. Any other module with results this run gets
/// flagged as an interpretation gap (spec §4.1.3 phase 5, optional).
const INTERPRETED_MODULES: &[&str] = &["FI", "MM/SD"];

/// Drives one run of extraction, process mining, and gap analysis.
/// Stateless aside from its observer channel — every run builds a
/// fresh extractor registry and extraction context.
pub struct Orchestrator {
    observer: Observer,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            observer: Observer::new(),
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<OrchestratorEvent> {
        self.observer.subscribe()
    }

    /// Runs the full pipeline to completion, or to the point
    /// cancellation was observed. `transport` is `None` for a live run
    /// that hasn't configured a source system yet.
    pub async fn run(
        &self,
        config: &ErpConfig,
        transport: Option<Arc<dyn Transport>>,
        checkpoint: Arc<dyn CheckpointStore>,
        cancel: CancellationToken,
    ) -> ForensicReport {
        let mode = match config.mode {
            RunMode::Live => ExtractionMode::Live,
            RunMode::Offline => ExtractionMode::Offline,
        };
        let ctx: Arc<ExtractionContext<dyn Transport>> = Arc::new(ExtractionContext::new(mode, transport));

        let mut registry = ExtractorRegistry::new();
        extractors::bootstrap(&mut registry);

        let mut results: BTreeMap<String, ExtractorResult> = BTreeMap::new();

        self.run_phase1_system_info(&registry, &ctx, &mut results).await;
        self.run_phase2_data_dictionary(&registry, &ctx, &mut results).await;

        if !cancel.is_cancelled() {
            self.run_phase3_extraction(&registry, &ctx, config, checkpoint.as_ref(), &cancel, &mut results)
                .await;
        }

        let combined_tables = combine_process_evidence_tables(&results);
        let process_mining = self.run_phase4_process_mining(&combined_tables);
        let modules_without_interpretation = run_phase5_configuration_interpretation(&registry);
        let gap_report = self.run_phase6_gap_analysis(&ctx, &registry, &results, &modules_without_interpretation);
        let confidence = score_confidence(&ctx, &registry, &gap_report);

        tracing::info!(
            overall = confidence.overall,
            grade = confidence.grade.as_str(),
            "forensic run complete"
        );

        ForensicReport {
            generated_at: Utc::now(),
            system: system_summary(&results),
            coverage: ctx.tracker().system_report(),
            modules: module_summaries(&registry, &results),
            process_mining,
            catalog: build_catalog(&results, &combined_tables),
            gaps: gap_report,
            confidence,
        }
    }

    async fn run_phase1_system_info(
        &self,
        registry: &ExtractorRegistry,
        ctx: &Arc<ExtractionContext<dyn Transport>>,
        results: &mut BTreeMap<String, ExtractorResult>,
    ) {
        self.observer.progress("system_info", 0, 1, Some(SYSTEM_INFO_ID.to_string()));
        let extractor = registry.build(SYSTEM_INFO_ID).expect("system info extractor registered at bootstrap");
        let result = extractor.extract(ctx).await;
        self.report_completion(SYSTEM_INFO_ID, &result);
        results.insert(SYSTEM_INFO_ID.to_string(), result);
        self.observer.progress("system_info", 1, 1, None);
    }

    async fn run_phase2_data_dictionary(
        &self,
        registry: &ExtractorRegistry,
        ctx: &Arc<ExtractionContext<dyn Transport>>,
        results: &mut BTreeMap<String, ExtractorResult>,
    ) {
        self.observer.progress("data_dictionary", 0, 1, Some(DATA_DICTIONARY_ID.to_string()));
        let extractor = registry
            .build(DATA_DICTIONARY_ID)
            .expect("data dictionary extractor registered at bootstrap");
        let result = extractor.extract(ctx).await;
        self.report_completion(DATA_DICTIONARY_ID, &result);
        if let ExtractorResult::Ok(output) = &result {
            ctx.set_data_dictionary(extractors::data_dictionary::build_data_dictionary(output));
        }
        results.insert(DATA_DICTIONARY_ID.to_string(), result);
        self.observer.progress("data_dictionary", 1, 1, None);
    }

    /// Bounded-concurrency fan-out over every extractor except the two
    /// phase-1/2 singletons, respecting the configured module allow-list
    /// and resuming any extractor the checkpoint store already has
    /// complete (spec §5 concurrency bound, §9 resume semantics).
    async fn run_phase3_extraction(
        &self,
        registry: &ExtractorRegistry,
        ctx: &Arc<ExtractionContext<dyn Transport>>,
        config: &ErpConfig,
        checkpoint: &dyn CheckpointStore,
        cancel: &CancellationToken,
        results: &mut BTreeMap<String, ExtractorResult>,
    ) {
        let phase3_ids: Vec<String> = registry
            .extractor_ids()
            .iter()
            .filter(|id| id.as_str() != SYSTEM_INFO_ID && id.as_str() != DATA_DICTIONARY_ID)
            .filter(|id| config.modules.is_empty() || config.modules.contains(id.as_str()))
            .cloned()
            .collect();
        let total = phase3_ids.len();
        let mut completed = 0usize;

        let checkpoint_progress = checkpoint.progress().await;
        let semaphore = Arc::new(tokio::sync::Semaphore::new(config.concurrency.max(1)));
        let mut join_set = tokio::task::JoinSet::new();

        for extractor_id in phase3_ids {
            if cancel.is_cancelled() {
                break;
            }

            let already_complete = checkpoint_progress.get(&extractor_id).map(|p| p.complete).unwrap_or(false);
            if already_complete {
                if let Some(cached) = checkpoint.load(&extractor_id, "output").await {
                    if let Ok(output) = serde_json::from_value(cached) {
                        let result = ExtractorResult::Ok(output);
                        self.report_completion(&extractor_id, &result);
                        completed += 1;
                        self.observer.progress("extraction", completed, total, Some(extractor_id.clone()));
                        results.insert(extractor_id, result);
                        continue;
                    }
                }
            }

            let Some(extractor) = registry.build(&extractor_id) else {
                continue;
            };
            let ctx = ctx.clone();
            let semaphore = semaphore.clone();
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
                let result = extractor.extract(&ctx).await;
                (extractor_id, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((extractor_id, result)) => {
                    self.report_completion(&extractor_id, &result);
                    if let ExtractorResult::Ok(output) = &result {
                        let value = serde_json::to_value(output).unwrap_or(Value::Null);
                        checkpoint.save(&extractor_id, "output", value).await;
                    }
                    completed += 1;
                    self.observer.progress("extraction", completed, total, Some(extractor_id.clone()));
                    results.insert(extractor_id, result);
                }
                Err(join_error) => {
                    tracing::error!(error = %join_error, "extraction task did not complete");
                    self.observer.error(None, format!("extraction task panicked: {join_error}"));
                }
            }
        }
    }

    fn report_completion(&self, extractor_id: &str, result: &ExtractorResult) {
        let succeeded = matches!(result, ExtractorResult::Ok(_));
        self.observer.extractor_complete(extractor_id, succeeded);
        if let ExtractorResult::Error(message) = result {
            self.observer.error(Some(extractor_id), message.clone());
        }
    }

    /// Folds the merged process-evidence tables into an event log per
    /// reference model and runs every analysis engine over it (spec
    /// §4.1.3 phase 4). Models with no matching evidence simply produce
    /// an empty log — a valid, zeroed result, not an error.
    fn run_phase4_process_mining(
        &self,
        combined_tables: &BTreeMap<String, Vec<Value>>,
    ) -> BTreeMap<String, ProcessIntelligenceReport> {
        let catalog = ReferenceModelCatalog::with_builtins();
        let engine = ProcessIntelligenceEngine::new();
        let mut reports = BTreeMap::new();

        for process_id in catalog.list_ids() {
            let config = ProcessEventConfig {
                process_id: process_id.clone(),
                table_mappings: process_evidence_table_mappings(),
            };
            let log = build_event_log(&config, combined_tables);
            let model = catalog.get(&process_id);
            let report = engine.analyze(&process_id, &log, model, &[]);
            reports.insert(process_id, report);
        }

        reports
    }

    fn run_phase6_gap_analysis(
        &self,
        ctx: &ExtractionContext<dyn Transport>,
        registry: &ExtractorRegistry,
        results: &BTreeMap<String, ExtractorResult>,
        modules_without_interpretation: &BTreeSet<String>,
    ) -> erp_gap_analysis::GapReport {
        let tracker = ctx.tracker();
        let coverage_records = tracker.all_records();

        let known_tables: BTreeSet<String> = ctx
            .data_dictionary()
            .map(|d| d.known_table_names().into_iter().collect())
            .unwrap_or_default();

        let mut critical_tables = BTreeSet::new();
        for id in registry.extractor_ids() {
            if let Some(extractor) = registry.build(id) {
                for table in extractor.expected_tables() {
                    if table.critical {
                        critical_tables.insert(table.name);
                    }
                }
            }
        }

        let rfc_only_extractors_skipped: Vec<String> = coverage_records
            .iter()
            .filter(|r| r.status == CoverageStatus::Skipped)
            .filter(|r| r.detail.reason.as_deref().unwrap_or_default().to_lowercase().contains("rfc"))
            .map(|r| r.extractor_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let unreachable_destinations: Vec<String> = results
            .get("INTERFACES")
            .and_then(|r| r.output())
            .map(|output| {
                output
                    .rows("RFCDES")
                    .iter()
                    .filter(|row| row.get("reachable").and_then(Value::as_bool) == Some(false))
                    .filter_map(|row| row.get("rfcdest").and_then(Value::as_str).map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let input = GapAnalysisInput {
            coverage_records,
            known_tables,
            critical_tables,
            rfc_only_extractors_skipped,
            missing_domain_indicators: Vec::new(),
            change_documents_present: matches!(results.get(CHANGE_DOCUMENTS_ID), Some(ExtractorResult::Ok(_))),
            usage_statistics_present: matches!(results.get(USAGE_STATISTICS_ID), Some(ExtractorResult::Ok(_))),
            workflows_present: matches!(results.get(WORKFLOWS_ID), Some(ExtractorResult::Ok(_))),
            interface_extractor_present: matches!(results.get("INTERFACES"), Some(ExtractorResult::Ok(_))),
            unreachable_destinations,
            modules_without_interpretation: modules_without_interpretation.iter().cloned().collect(),
        };

        let mut analyzer = GapAnalyzer::new();
        analyzer.analyse(&input).clone()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Merges the four process-evidence extractors' table output into one
/// table-name-keyed map, the input the event-log builder expects (spec
/// §4.1.3 phase 4).
fn combine_process_evidence_tables(results: &BTreeMap<String, ExtractorResult>) -> BTreeMap<String, Vec<Value>> {
    let mut combined: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for id in [CHANGE_DOCUMENTS_ID, USAGE_STATISTICS_ID, BATCH_JOBS_ID, WORKFLOWS_ID] {
        if let Some(ExtractorResult::Ok(output)) = results.get(id) {
            for (table, rows) in &output.tables {
                combined.entry(table.clone()).or_default().extend(rows.iter().cloned());
            }
        }
    }
    combined
}

/// Table mappings shared by every reference model: this workspace's
/// offline evidence only covers one case (`SO-1001`), so every process
/// id is folded against the same source tables, and processes with no
/// matching activities simply discover an empty log.
fn process_evidence_table_mappings() -> Vec<TableMapping> {
    let mut tcode_to_activity = BTreeMap::new();
    tcode_to_activity.insert("VA01".to_string(), "Create Sales Order".to_string());
    tcode_to_activity.insert("VL01N".to_string(), "Create Delivery".to_string());

    vec![
        TableMapping {
            table: "CDHDR".into(),
            class: TableClass::Change,
            activity: None,
            code_field: Some("tcode".into()),
            code_to_activity: tcode_to_activity.clone(),
            direct_field: None,
            timestamp_field: "changed_at".into(),
            time_field: None,
            resource_field: Some("changed_by".into()),
            condition: None,
            case_id_field: "case_id".into(),
        },
        TableMapping {
            table: "STAT".into(),
            class: TableClass::Transaction,
            activity: None,
            code_field: Some("tcode".into()),
            code_to_activity: tcode_to_activity,
            direct_field: None,
            timestamp_field: "timestamp".into(),
            time_field: None,
            resource_field: Some("user".into()),
            condition: None,
            case_id_field: "case_id".into(),
        },
        TableMapping {
            table: "TBTCO".into(),
            class: TableClass::Status,
            activity: None,
            code_field: None,
            code_to_activity: BTreeMap::new(),
            direct_field: Some("status".into()),
            timestamp_field: "start_time".into(),
            time_field: None,
            resource_field: Some("user".into()),
            condition: None,
            case_id_field: "case_id".into(),
        },
        TableMapping {
            table: "SWWWIHEAD".into(),
            class: TableClass::Flow,
            activity: None,
            code_field: None,
            code_to_activity: BTreeMap::new(),
            direct_field: Some("status".into()),
            timestamp_field: "timestamp".into(),
            time_field: None,
            resource_field: Some("agent".into()),
            condition: None,
            case_id_field: "case_id".into(),
        },
    ]
}

/// Phase 5 (optional): any module with extracted results but no
/// interpretation rule is flagged, surfacing as an `Interpretation`-category
/// gap rather than silently discarding the result.
fn run_phase5_configuration_interpretation(registry: &ExtractorRegistry) -> BTreeSet<String> {
    registry
        .extractor_ids()
        .iter()
        .filter_map(|id| registry.build(id))
        .map(|extractor| extractor.identity().module)
        .filter(|module| !INTERPRETED_MODULES.contains(&module.as_str()))
        .collect()
}

fn system_summary(results: &BTreeMap<String, ExtractorResult>) -> SystemSummary {
    let metadata = results
        .get(SYSTEM_INFO_ID)
        .and_then(|r| r.output())
        .map(|o| o.metadata.clone())
        .unwrap_or(Value::Null);

    SystemSummary {
        release: metadata.get("release").and_then(Value::as_str).unwrap_or("unknown").to_string(),
        database: metadata.get("database").and_then(Value::as_str).unwrap_or("unknown").to_string(),
        components: metadata
            .get("components")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default(),
    }
}

fn module_summaries(registry: &ExtractorRegistry, results: &BTreeMap<String, ExtractorResult>) -> Vec<ModuleSummary> {
    registry
        .extractor_ids()
        .iter()
        .filter_map(|id| registry.build(id))
        .map(|extractor| {
            let identity = extractor.identity();
            let (succeeded, error, tables_read) = match results.get(&identity.extractor_id) {
                Some(ExtractorResult::Ok(output)) => (true, None, output.tables.len()),
                Some(ExtractorResult::Error(message)) => (false, Some(message.clone()), 0),
                None => (false, Some("extractor did not run this pass".to_string()), 0),
            };
            ModuleSummary {
                extractor_id: identity.extractor_id,
                module: identity.module,
                category: identity.category,
                succeeded,
                error,
                tables_read,
            }
        })
        .collect()
}

fn build_catalog(results: &BTreeMap<String, ExtractorResult>, combined_tables: &BTreeMap<String, Vec<Value>>) -> ProcessCatalog {
    let catalog_models = ReferenceModelCatalog::with_builtins();
    let engine = ProcessIntelligenceEngine::new();

    let custom_code: Vec<String> = results
        .get(SYSTEM_INFO_ID)
        .and_then(|r| r.output())
        .map(|o| o.rows("TADIR").iter().filter_map(|row| row.get("name").and_then(Value::as_str).map(String::from)).collect())
        .unwrap_or_default();

    let interfaces: Vec<String> = results
        .get("INTERFACES")
        .and_then(|r| r.output())
        .map(|o| o.rows("RFCDES").iter().filter_map(|row| row.get("rfcdest").and_then(Value::as_str).map(String::from)).collect())
        .unwrap_or_default();

    let evidence = ProcessEvidence {
        change_documents: combined_tables.get("CDHDR").map(|v| v.len() as u64).unwrap_or(0),
        usage_statistics: combined_tables.get("STAT").map(|v| v.len() as u64).unwrap_or(0),
        batch_jobs: combined_tables.get("TBTCO").map(|v| v.len() as u64).unwrap_or(0),
        workflows: combined_tables.get("SWWWIHEAD").map(|v| v.len() as u64).unwrap_or(0),
    };

    let mut catalog = ProcessCatalog::new();
    for process_id in catalog_models.list_ids() {
        let Some(model) = catalog_models.get(&process_id) else { continue };
        let config = ProcessEventConfig {
            process_id: process_id.clone(),
            table_mappings: process_evidence_table_mappings(),
        };
        let log = build_event_log(&config, combined_tables);
        let variants = engine.variant_analyzer.analyze(&log);

        let mut entry = ProcessCatalogEntry::new(process_id.clone(), model.name.clone(), "erp".to_string());
        entry.custom_code = custom_code.clone();
        entry.interfaces = interfaces.clone();
        entry.evidence = evidence.clone();
        entry.variants = variants
            .variants
            .iter()
            .enumerate()
            .map(|(i, variant)| ProcessVariant {
                id: format!("{process_id}-v{i}"),
                description: variant.sequence.join(" -> "),
                steps: variant.sequence.clone(),
                volume: variant.frequency as u64,
                users: Vec::new(),
            })
            .collect();
        catalog.insert(entry);
    }
    catalog
}

fn score_confidence(
    ctx: &ExtractionContext<dyn Transport>,
    registry: &ExtractorRegistry,
    gap_report: &erp_gap_analysis::GapReport,
) -> erp_gap_analysis::ConfidenceReport {
    let tracker = ctx.tracker();
    let categories = [
        (ScoreCategory::Config, vec![DATA_DICTIONARY_ID]),
        (ScoreCategory::MasterData, vec!["MASTER_DATA"]),
        (ScoreCategory::Transaction, vec!["FINANCIALS"]),
        (ScoreCategory::Code, vec![SYSTEM_INFO_ID]),
        (ScoreCategory::Security, vec!["SECURITY"]),
        (ScoreCategory::Interface, vec!["INTERFACES"]),
        (
            ScoreCategory::Process,
            vec![CHANGE_DOCUMENTS_ID, USAGE_STATISTICS_ID, BATCH_JOBS_ID, WORKFLOWS_ID],
        ),
    ];

    let inputs: Vec<CategoryCoverage> = categories
        .into_iter()
        .map(|(category, extractor_ids)| category_coverage(category, &extractor_ids, &tracker, registry, gap_report))
        .collect();

    ConfidenceScorer::new().score(&inputs)
}

fn category_coverage(
    category: ScoreCategory,
    extractor_ids: &[&str],
    tracker: &erp_coverage::CoverageTracker,
    registry: &ExtractorRegistry,
    gap_report: &erp_gap_analysis::GapReport,
) -> CategoryCoverage {
    let mut total_pct = 0.0;
    let mut missing_critical_tables = 0usize;
    let mut authorization_gaps = 0usize;
    let mut data_volume_gaps = 0usize;

    for id in extractor_ids {
        let report = tracker.report(id);
        total_pct += report.coverage_pct;

        if let Some(extractor) = registry.build(id) {
            for table in extractor.expected_tables() {
                if !table.critical {
                    continue;
                }
                let extracted = report
                    .tables
                    .get(&table.name)
                    .map(|record| record.status == CoverageStatus::Extracted)
                    .unwrap_or(false);
                if !extracted {
                    missing_critical_tables += 1;
                }
            }
        }

        authorization_gaps += gap_report
            .by_category(GapCategory::Authorization)
            .iter()
            .filter(|gap| gap.code.contains(id))
            .count();
        data_volume_gaps += gap_report
            .by_category(GapCategory::DataVolume)
            .iter()
            .filter(|gap| gap.code.contains(id))
            .count();
    }

    let coverage_pct = if extractor_ids.is_empty() { 0.0 } else { total_pct / extractor_ids.len() as f64 };

    CategoryCoverage {
        category,
        coverage_pct,
        missing_critical_tables,
        authorization_gaps,
        data_volume_gaps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erp_extraction::{InMemoryCheckpointStore, NullCheckpointStore, OfflineTransport};

    fn offline_config() -> ErpConfig {
        let mut config = ErpConfig::default();
        config.concurrency = 4;
        config
    }

    #[tokio::test]
    async fn full_offline_run_produces_a_report_with_all_modules() {
        let orchestrator = Orchestrator::new();
        let transport: Arc<dyn Transport> = Arc::new(OfflineTransport::new());
        let report = orchestrator
            .run(&offline_config(), Some(transport), Arc::new(NullCheckpointStore), CancellationToken::new())
            .await;

        assert_eq!(report.modules.len(), 10);
        assert!(report.modules.iter().all(|m| m.succeeded));
        assert_eq!(report.process_mining.len(), 7);
        assert!(report.coverage.total > 0);
    }

    #[tokio::test]
    async fn o2c_event_log_observes_the_fixture_case() {
        let orchestrator = Orchestrator::new();
        let transport: Arc<dyn Transport> = Arc::new(OfflineTransport::new());
        let report = orchestrator
            .run(&offline_config(), Some(transport), Arc::new(NullCheckpointStore), CancellationToken::new())
            .await;

        let o2c = &report.process_mining["O2C"];
        assert!(o2c.discovered.activities.iter().any(|a| a == "Create Sales Order"));
        assert!(o2c.variants.variant_count > 0);
    }

    #[tokio::test]
    async fn confidence_score_is_computed_for_every_category() {
        let orchestrator = Orchestrator::new();
        let transport: Arc<dyn Transport> = Arc::new(OfflineTransport::new());
        let report = orchestrator
            .run(&offline_config(), Some(transport), Arc::new(NullCheckpointStore), CancellationToken::new())
            .await;

        assert_eq!(report.confidence.category_scores.len(), 7);
        assert!(report.confidence.overall > 0.0);
    }

    #[tokio::test]
    async fn concurrency_bound_still_completes_every_registered_extractor() {
        let mut config = offline_config();
        config.concurrency = 1;
        let orchestrator = Orchestrator::new();
        let transport: Arc<dyn Transport> = Arc::new(OfflineTransport::new());
        let report = orchestrator
            .run(&config, Some(transport), Arc::new(NullCheckpointStore), CancellationToken::new())
            .await;

        assert_eq!(report.modules.len(), 10);
    }

    #[tokio::test]
    async fn module_allow_list_limits_phase_three() {
        let mut config = offline_config();
        config.modules = BTreeSet::from(["FINANCIALS".to_string()]);
        let orchestrator = Orchestrator::new();
        let transport: Arc<dyn Transport> = Arc::new(OfflineTransport::new());
        let report = orchestrator
            .run(&config, Some(transport), Arc::new(NullCheckpointStore), CancellationToken::new())
            .await;

        let financials = report.modules.iter().find(|m| m.extractor_id == "FINANCIALS").unwrap();
        assert!(financials.succeeded);
        let master_data = report.modules.iter().find(|m| m.extractor_id == "MASTER_DATA").unwrap();
        assert!(!master_data.succeeded);
    }

    #[tokio::test]
    async fn cancellation_before_phase_three_still_produces_a_report() {
        let orchestrator = Orchestrator::new();
        let transport: Arc<dyn Transport> = Arc::new(OfflineTransport::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = orchestrator
            .run(&offline_config(), Some(transport), Arc::new(NullCheckpointStore), cancel)
            .await;

        // Phase 1/2 still ran; phase 3 extractors never attempted.
        assert!(report.modules.iter().any(|m| m.extractor_id == SYSTEM_INFO_ID && m.succeeded));
        assert!(report.modules.iter().any(|m| m.extractor_id == "FINANCIALS" && !m.succeeded));
    }

    #[tokio::test]
    async fn resume_from_checkpoint_skips_completed_extractors() {
        let checkpoint = Arc::new(InMemoryCheckpointStore::new());
        checkpoint.mark_complete("FINANCIALS");
        let cached = serde_json::json!({
            "extractor_id": "FINANCIALS",
            "tables": {"BKPF": [{"belnr": "CACHED"}]},
            "metadata": null,
        });
        checkpoint.save("FINANCIALS", "output", cached).await;

        let orchestrator = Orchestrator::new();
        let transport: Arc<dyn Transport> = Arc::new(OfflineTransport::new());
        let report = orchestrator
            .run(&offline_config(), Some(transport), checkpoint, CancellationToken::new())
            .await;

        let financials = report.modules.iter().find(|m| m.extractor_id == "FINANCIALS").unwrap();
        assert!(financials.succeeded);
    }
}
