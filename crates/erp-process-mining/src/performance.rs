//! Performance analysis (spec §4.2.5): per-transition waiting-time
//! distributions, bottleneck identification, and per-case cycle-time
//! percentiles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event_log::EventLog;
use crate::stats::{compute, Stats};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionTiming {
    pub transition: String,
    pub frequency: u64,
    pub waiting_time_ms: Stats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bottleneck {
    pub transition: String,
    pub median_latency_ms: f64,
    pub frequency: u64,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceResult {
    pub transitions: Vec<TransitionTiming>,
    pub bottlenecks: Vec<Bottleneck>,
    pub cycle_time_ms: Stats,
    pub case_count: usize,
}

impl PerformanceResult {
    pub fn summary(&self) -> String {
        format!(
            "{} cases, median cycle time {:.0}ms, top bottleneck: {}",
            self.case_count,
            self.cycle_time_ms.median,
            self.bottlenecks
                .first()
                .map(|b| b.transition.as_str())
                .unwrap_or("none")
        )
    }

    pub fn to_serializable(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Default)]
pub struct PerformanceAnalyzer {
    pub top_n_bottlenecks: usize,
}

impl PerformanceAnalyzer {
    pub fn new() -> Self {
        Self { top_n_bottlenecks: 5 }
    }

    pub fn analyze(&self, log: &EventLog) -> PerformanceResult {
        let mut waits: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut cycle_times = Vec::new();

        for trace in log.sorted_traces() {
            for window in trace.events.windows(2) {
                let key = format!("{} → {}", window[0].activity, window[1].activity);
                let delta = (window[1].epoch_millis() - window[0].epoch_millis()) as f64;
                waits.entry(key).or_default().push(delta.max(0.0));
            }
            if let Some(duration) = trace.duration_millis() {
                cycle_times.push(duration as f64);
            }
        }

        let mut transitions: Vec<TransitionTiming> = waits
            .iter()
            .map(|(transition, samples)| TransitionTiming {
                transition: transition.clone(),
                frequency: samples.len() as u64,
                waiting_time_ms: compute(samples),
            })
            .collect();
        transitions.sort_by(|a, b| a.transition.cmp(&b.transition));

        let mut bottlenecks: Vec<Bottleneck> = transitions
            .iter()
            .map(|t| Bottleneck {
                transition: t.transition.clone(),
                median_latency_ms: t.waiting_time_ms.median,
                frequency: t.frequency,
                score: t.waiting_time_ms.median * t.frequency as f64,
            })
            .collect();
        bottlenecks.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap().then(a.transition.cmp(&b.transition)));
        bottlenecks.truncate(self.top_n_bottlenecks.max(1));

        PerformanceResult {
            transitions,
            bottlenecks,
            cycle_time_ms: compute(&cycle_times),
            case_count: log.trace_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::{Event, EventLogBuilder};
    use chrono::{TimeZone, Utc};

    #[test]
    fn bottleneck_ranks_slowest_high_frequency_transition_first() {
        let mut builder = EventLogBuilder::new("test");
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for i in 0..10 {
            let case = format!("C{i}");
            builder.add_event(&case, Event::new("A", base));
            builder.add_event(&case, Event::new("B", base + chrono::Duration::hours(5)));
            builder.add_event(&case, Event::new("C", base + chrono::Duration::hours(5) + chrono::Duration::minutes(1)));
        }
        let log = builder.build();
        let result = PerformanceAnalyzer::new().analyze(&log);
        assert_eq!(result.bottlenecks[0].transition, "A → B");
    }

    #[test]
    fn empty_log_yields_zeroed_stats() {
        let log = EventLog::new("empty");
        let result = PerformanceAnalyzer::new().analyze(&log);
        assert_eq!(result.case_count, 0);
        assert_eq!(result.cycle_time_ms.mean, 0.0);
    }
}
