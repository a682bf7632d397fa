//! The statistical KPI engine (spec §4.2.6): per-category key
//! performance indicators with confidence intervals.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::conformance::ConformanceResult;
use crate::event_log::EventLog;
use crate::social_network::SocialNetworkResult;
use crate::stats::{compute, confidence_interval, ConfidenceInterval, ConfidenceLevel, Stats};
use crate::variants::VariantAnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KpiCategory {
    Time,
    Quality,
    Volume,
    Conformance,
    Resource,
    Process,
}

impl KpiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiCategory::Time => "time",
            KpiCategory::Quality => "quality",
            KpiCategory::Volume => "volume",
            KpiCategory::Conformance => "conformance",
            KpiCategory::Resource => "resource",
            KpiCategory::Process => "process",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    pub category: KpiCategory,
    pub value: f64,
    pub unit: String,
    pub count: usize,
    pub ci: ConfidenceInterval,
    pub stats: Stats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KPIReport {
    pub kpis: Vec<Kpi>,
}

impl KPIReport {
    pub fn summary(&self) -> String {
        format!("{} KPIs computed", self.kpis.len())
    }

    pub fn to_serializable(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn get(&self, name: &str) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.name == name)
    }
}

/// A caller-supplied, process-specific KPI value (spec §4.2.6's "KPI
/// catalogue"), reported with the same confidence-interval machinery
/// as the built-in categories.
#[derive(Debug, Clone)]
pub struct ProcessKpiDef {
    pub name: String,
    pub unit: String,
    pub samples: Vec<f64>,
}

fn automated_resource_pattern() -> Regex {
    Regex::new(r"^(SYSTEM|BATCH|RFC.*|WF-BATCH.*)$").expect("static pattern")
}

fn kpi_from_samples(name: &str, category: KpiCategory, unit: &str, samples: &[f64]) -> Kpi {
    let stats = compute(samples);
    let ci = confidence_interval(stats.mean, stats.stddev, samples.len(), ConfidenceLevel::NinetyFive);
    Kpi {
        name: name.to_string(),
        category,
        value: stats.mean,
        unit: unit.to_string(),
        count: samples.len(),
        ci,
        stats,
    }
}

fn kpi_scalar(name: &str, category: KpiCategory, unit: &str, value: f64, count: usize) -> Kpi {
    Kpi {
        name: name.to_string(),
        category,
        value,
        unit: unit.to_string(),
        count,
        ci: confidence_interval(value, 0.0, count, ConfidenceLevel::NinetyFive),
        stats: Stats {
            mean: value,
            median: value,
            stddev: 0.0,
            min: value,
            max: value,
            p90: value,
            p95: value,
        },
    }
}

#[derive(Debug, Default)]
pub struct KPIEngine;

impl KPIEngine {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        &self,
        log: &EventLog,
        conformance: Option<&ConformanceResult>,
        variants: &VariantAnalysisResult,
        social: &SocialNetworkResult,
        process_kpis: &[ProcessKpiDef],
    ) -> KPIReport {
        let mut kpis = Vec::new();

        // Time KPIs.
        let cycle_times: Vec<f64> = log
            .sorted_traces()
            .iter()
            .filter_map(|t| t.duration_millis())
            .map(|ms| ms as f64)
            .collect();
        kpis.push(kpi_from_samples("cycle_time", KpiCategory::Time, "ms", &cycle_times));

        let touch_times: Vec<f64> = log
            .sorted_traces()
            .iter()
            .flat_map(|t| t.events.windows(2))
            .map(|w| (w[1].epoch_millis() - w[0].epoch_millis()) as f64)
            .collect();
        kpis.push(kpi_from_samples("touch_time", KpiCategory::Time, "ms", &touch_times));

        let activities_per_case: Vec<f64> = log.sorted_traces().iter().map(|t| t.events.len() as f64).collect();
        kpis.push(kpi_from_samples("activities_per_case", KpiCategory::Time, "count", &activities_per_case));

        // Quality KPIs.
        let total_cases = log.trace_count().max(1) as f64;
        let rework_cases = log.sorted_traces().iter().filter(|t| t.has_repetition()).count() as f64;
        kpis.push(kpi_scalar("rework_rate", KpiCategory::Quality, "pct", (rework_cases / total_cases) * 100.0, log.trace_count()));
        kpis.push(kpi_scalar(
            "first_time_right",
            KpiCategory::Quality,
            "pct",
            100.0 - (rework_cases / total_cases) * 100.0,
            log.trace_count(),
        ));

        let self_loop_cases = log
            .sorted_traces()
            .iter()
            .filter(|t| t.events.windows(2).any(|w| w[0].activity == w[1].activity))
            .count() as f64;
        kpis.push(kpi_scalar("self_loop_rate", KpiCategory::Quality, "pct", (self_loop_cases / total_cases) * 100.0, log.trace_count()));
        kpis.push(kpi_scalar("happy_path_rate", KpiCategory::Quality, "pct", variants.happy_path_rate, log.trace_count()));
        kpis.push(kpi_scalar("variant_count", KpiCategory::Quality, "count", variants.variant_count as f64, variants.variant_count));

        let straight_through = log
            .sorted_traces()
            .iter()
            .filter(|t| !t.has_repetition())
            .count() as f64;
        kpis.push(kpi_scalar(
            "straight_through_rate",
            KpiCategory::Quality,
            "pct",
            (straight_through / total_cases) * 100.0,
            log.trace_count(),
        ));

        // Volume KPIs.
        kpis.push(kpi_scalar("case_count", KpiCategory::Volume, "count", log.trace_count() as f64, log.trace_count()));
        kpis.push(kpi_scalar("event_count", KpiCategory::Volume, "count", log.event_count() as f64, log.event_count()));
        kpis.push(kpi_scalar("activity_count", KpiCategory::Volume, "count", log.activities.len() as f64, log.activities.len()));
        kpis.push(kpi_scalar("average_wip", KpiCategory::Volume, "count", average_wip(log), log.trace_count()));

        // Conformance KPIs.
        if let Some(conf) = conformance {
            kpis.push(kpi_scalar("fitness", KpiCategory::Conformance, "ratio", conf.aggregate_fitness, conf.total_cases));
            kpis.push(kpi_scalar("precision", KpiCategory::Conformance, "ratio", conf.precision, conf.total_cases));
            kpis.push(kpi_scalar("conformance_rate", KpiCategory::Conformance, "pct", conf.conformance_rate, conf.total_cases));
        }

        // Resource KPIs.
        kpis.push(kpi_scalar("unique_resources", KpiCategory::Resource, "count", log.resources.len() as f64, log.resources.len()));
        let handovers_per_case = if log.trace_count() == 0 {
            0.0
        } else {
            social.handovers.iter().map(|h| h.count).sum::<u64>() as f64 / log.trace_count() as f64
        };
        kpis.push(kpi_scalar("handovers_per_case", KpiCategory::Resource, "ratio", handovers_per_case, log.trace_count()));

        let pattern = automated_resource_pattern();
        let total_events = log.event_count().max(1) as f64;
        let automated_events = log
            .sorted_traces()
            .iter()
            .flat_map(|t| t.events.iter())
            .filter(|e| e.resource.as_deref().map(|r| pattern.is_match(r)).unwrap_or(false))
            .count() as f64;
        kpis.push(kpi_scalar(
            "automation_rate",
            KpiCategory::Resource,
            "pct",
            (automated_events / total_events) * 100.0,
            log.event_count(),
        ));

        for def in process_kpis {
            kpis.push(kpi_from_samples(&def.name, KpiCategory::Process, &def.unit, &def.samples));
        }

        kpis.sort_by(|a, b| a.category.as_str().cmp(b.category.as_str()).then(a.name.cmp(&b.name)));

        KPIReport { kpis }
    }
}

/// Average work-in-progress: at each case-start timestamp, how many
/// cases are concurrently open, averaged over all case-start samples.
fn average_wip(log: &EventLog) -> f64 {
    let intervals: Vec<(i64, i64)> = log
        .sorted_traces()
        .iter()
        .filter_map(|t| {
            let start = t.events.first()?.epoch_millis();
            let end = t.events.last()?.epoch_millis();
            Some((start, end))
        })
        .collect();
    if intervals.is_empty() {
        return 0.0;
    }
    let occupancy: Vec<f64> = intervals
        .iter()
        .map(|(sample, _)| {
            intervals
                .iter()
                .filter(|(s, e)| *s <= *sample && *sample <= *e)
                .count() as f64
        })
        .collect();
    occupancy.iter().sum::<f64>() / occupancy.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::{Event, EventLogBuilder};
    use crate::social_network::SocialNetworkMiner;
    use crate::variants::VariantAnalyzer;
    use chrono::{TimeZone, Utc};

    fn sample_log() -> EventLog {
        let mut builder = EventLogBuilder::new("test");
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut e1 = Event::new("A", base);
        e1.resource = Some("SYSTEM".into());
        let mut e2 = Event::new("B", base + chrono::Duration::hours(1));
        e2.resource = Some("JDOE".into());
        builder.add_event("C1", e1);
        builder.add_event("C1", e2);
        builder.build()
    }

    #[test]
    fn confidence_intervals_always_contain_value() {
        let log = sample_log();
        let variants = VariantAnalyzer::new().analyze(&log);
        let social = SocialNetworkMiner::new().analyze(&log);
        let report = KPIEngine::new().compute(&log, None, &variants, &social, &[]);
        for kpi in &report.kpis {
            assert!(kpi.ci.lower <= kpi.value + 1e-9);
            assert!(kpi.value <= kpi.ci.upper + 1e-9);
        }
    }

    #[test]
    fn automation_rate_counts_system_resource() {
        let log = sample_log();
        let variants = VariantAnalyzer::new().analyze(&log);
        let social = SocialNetworkMiner::new().analyze(&log);
        let report = KPIEngine::new().compute(&log, None, &variants, &social, &[]);
        let kpi = report.get("automation_rate").unwrap();
        assert_eq!(kpi.value, 50.0);
    }
}
