//! Token-based conformance replay (spec §4.2.3): replays each trace of
//! an event log against a reference model, accumulating the four
//! token counters and a typed deviation list.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::event_log::EventLog;
use crate::reference_model::ReferenceModel;

const BFS_MAX_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviationType {
    UnexpectedStart,
    Insert,
    Skip,
    InvalidTransition,
    PrematureEnd,
}

impl DeviationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviationType::UnexpectedStart => "unexpected_start",
            DeviationType::Insert => "insert",
            DeviationType::Skip => "skip",
            DeviationType::InvalidTransition => "invalid_transition",
            DeviationType::PrematureEnd => "premature_end",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deviation {
    pub case_id: String,
    pub deviation_type: DeviationType,
    pub activity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TokenCounters {
    produced: u64,
    consumed: u64,
    missing: u64,
    remaining: u64,
}

impl TokenCounters {
    fn fitness(&self) -> f64 {
        let missing_ratio = if self.consumed == 0 {
            0.0
        } else {
            self.missing as f64 / self.consumed as f64
        };
        let remaining_ratio = if self.produced == 0 {
            0.0
        } else {
            self.remaining as f64 / self.produced as f64
        };
        0.5 * (1.0 - missing_ratio) + 0.5 * (1.0 - remaining_ratio)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConformance {
    pub case_id: String,
    pub fitness: f64,
    pub deviations: Vec<Deviation>,
}

/// Immutable result of a conformance-checking run (spec §3 "each
/// algorithm emits a typed immutable result struct").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceResult {
    pub model_id: String,
    pub total_cases: usize,
    pub fully_conformant_cases: usize,
    pub conformance_rate: f64,
    pub aggregate_fitness: f64,
    pub precision: f64,
    pub cases: Vec<CaseConformance>,
    pub deviations_by_type: BTreeMap<String, u64>,
    pub deviations_by_activity: BTreeMap<String, u64>,
    pub average_deviations_per_case: f64,
}

impl ConformanceResult {
    pub fn summary(&self) -> String {
        format!(
            "{}: fitness={:.3} precision={:.3} conformance_rate={:.1}% ({}/{} cases)",
            self.model_id,
            self.aggregate_fitness,
            self.precision,
            self.conformance_rate,
            self.fully_conformant_cases,
            self.total_cases
        )
    }

    pub fn to_serializable(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Default)]
pub struct ConformanceChecker;

impl ConformanceChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, log: &EventLog, model: &ReferenceModel) -> ConformanceResult {
        let mut cases = Vec::new();
        let mut global = TokenCounters::default();
        let mut observed_edges: std::collections::BTreeSet<(String, String)> = std::collections::BTreeSet::new();
        let mut deviations_by_type: BTreeMap<String, u64> = BTreeMap::new();
        let mut deviations_by_activity: BTreeMap<String, u64> = BTreeMap::new();
        let mut total_deviations = 0u64;

        for trace in log.sorted_traces() {
            let mut counters = TokenCounters::default();
            let mut deviations = Vec::new();

            for (i, event) in trace.events.iter().enumerate() {
                let activity = &event.activity;
                if i == 0 {
                    if model.start_activities.contains(activity) {
                        counters.produced += 1;
                        counters.consumed += 1;
                    } else if model.activities.contains(activity) {
                        counters.missing += 1;
                        counters.consumed += 1;
                        counters.produced += 1;
                        deviations.push(Deviation {
                            case_id: trace.case_id.clone(),
                            deviation_type: DeviationType::UnexpectedStart,
                            activity: activity.clone(),
                        });
                    } else {
                        counters.missing += 1;
                        counters.consumed += 1;
                        counters.produced += 1;
                        deviations.push(Deviation {
                            case_id: trace.case_id.clone(),
                            deviation_type: DeviationType::Insert,
                            activity: activity.clone(),
                        });
                    }
                    continue;
                }

                let prev = &trace.events[i - 1].activity;
                observed_edges.insert((prev.clone(), activity.clone()));

                if model.has_edge(prev, activity) {
                    counters.produced += 1;
                    counters.consumed += 1;
                } else if model.activities.contains(activity) {
                    match bfs_path(model, prev, activity, BFS_MAX_DEPTH) {
                        Some(intermediates) => {
                            for skipped in &intermediates {
                                deviations.push(Deviation {
                                    case_id: trace.case_id.clone(),
                                    deviation_type: DeviationType::Skip,
                                    activity: skipped.clone(),
                                });
                            }
                            counters.produced += intermediates.len() as u64;
                            counters.remaining += intermediates.len() as u64;
                            counters.produced += 1;
                            counters.consumed += 1;
                        }
                        None => {
                            counters.missing += 1;
                            counters.consumed += 1;
                            counters.produced += 1;
                            deviations.push(Deviation {
                                case_id: trace.case_id.clone(),
                                deviation_type: DeviationType::InvalidTransition,
                                activity: activity.clone(),
                            });
                        }
                    }
                } else {
                    counters.missing += 1;
                    counters.consumed += 1;
                    counters.produced += 1;
                    deviations.push(Deviation {
                        case_id: trace.case_id.clone(),
                        deviation_type: DeviationType::Insert,
                        activity: activity.clone(),
                    });
                }
            }

            if let Some(last) = trace.events.last() {
                if !model.end_activities.contains(&last.activity) && model.activities.contains(&last.activity) {
                    let shortest_to_end = model
                        .end_activities
                        .iter()
                        .filter_map(|end| bfs_path(model, &last.activity, end, BFS_MAX_DEPTH))
                        .min_by_key(|path| path.len());
                    let intermediate = shortest_to_end.map(|path| path.len()).unwrap_or(0);
                    counters.remaining += intermediate as u64 + 1;
                    deviations.push(Deviation {
                        case_id: trace.case_id.clone(),
                        deviation_type: DeviationType::PrematureEnd,
                        activity: last.activity.clone(),
                    });
                }
            }

            for d in &deviations {
                *deviations_by_type.entry(d.deviation_type.as_str().to_string()).or_insert(0) += 1;
                *deviations_by_activity.entry(d.activity.clone()).or_insert(0) += 1;
            }
            total_deviations += deviations.len() as u64;

            let fitness = counters.fitness();
            global.produced += counters.produced;
            global.consumed += counters.consumed;
            global.missing += counters.missing;
            global.remaining += counters.remaining;

            cases.push(CaseConformance {
                case_id: trace.case_id.clone(),
                fitness,
                deviations,
            });
        }

        let total_cases = cases.len();
        let fully_conformant_cases = cases.iter().filter(|c| c.fitness == 1.0).count();
        let conformance_rate = if total_cases == 0 {
            100.0
        } else {
            (fully_conformant_cases as f64 / total_cases as f64) * 100.0
        };

        let escaping = model
            .edges
            .iter()
            .filter(|e| !observed_edges.contains(&(e.from.clone(), e.to.clone())))
            .count();
        let precision = if model.edge_count() == 0 {
            1.0
        } else {
            1.0 - (escaping as f64 / model.edge_count() as f64)
        };

        let aggregate_fitness = if total_cases == 0 { 1.0 } else { global.fitness() };

        let average_deviations_per_case = if total_cases == 0 {
            0.0
        } else {
            total_deviations as f64 / total_cases as f64
        };

        ConformanceResult {
            model_id: model.id.clone(),
            total_cases,
            fully_conformant_cases,
            conformance_rate,
            aggregate_fitness,
            precision,
            cases,
            deviations_by_type,
            deviations_by_activity,
            average_deviations_per_case,
        }
    }
}

/// BFS over model successors bounded to `max_depth`; returns the
/// ordered names of the intermediate (skipped) activities on the
/// shortest path from `from` to `to`, excluding both endpoints.
/// `None` if no path exists within the bound.
fn bfs_path(model: &ReferenceModel, from: &str, to: &str, max_depth: usize) -> Option<Vec<String>> {
    if from == to {
        return Some(Vec::new());
    }
    let mut visited = std::collections::BTreeSet::new();
    let mut queue: VecDeque<(String, Vec<String>)> = VecDeque::new();
    queue.push_back((from.to_string(), Vec::new()));
    visited.insert(from.to_string());

    while let Some((activity, path)) = queue.pop_front() {
        if path.len() >= max_depth {
            continue;
        }
        for succ in model.successors(&activity) {
            if succ == to {
                return Some(path);
            }
            if visited.insert(succ.clone()) {
                let mut next_path = path.clone();
                next_path.push(succ.clone());
                queue.push_back((succ.clone(), next_path));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::{Event, EventLogBuilder};
    use crate::reference_model::EdgeType;
    use chrono::{TimeZone, Utc};

    fn linear_model() -> ReferenceModel {
        ReferenceModel::new(
            "LINEAR",
            "Linear",
            vec!["A", "B", "C", "D", "E"],
            vec![
                ("A", "B", EdgeType::Sequence),
                ("B", "C", EdgeType::Sequence),
                ("C", "D", EdgeType::Sequence),
                ("D", "E", EdgeType::Sequence),
            ],
            vec!["A"],
            vec!["E"],
        )
    }

    fn log_with_sequence(case_id: &str, activities: &[&str]) -> EventLog {
        let mut builder = EventLogBuilder::new("test");
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for (i, activity) in activities.iter().enumerate() {
            builder.add_event(case_id, Event::new(*activity, base + chrono::Duration::hours(i as i64)));
        }
        builder.build()
    }

    #[test]
    fn perfect_trace_has_fitness_one_and_no_deviations() {
        let log = log_with_sequence("C1", &["A", "B", "C", "D", "E"]);
        let result = ConformanceChecker::new().check(&log, &linear_model());
        assert_eq!(result.aggregate_fitness, 1.0);
        assert_eq!(result.conformance_rate, 100.0);
        assert_eq!(result.cases[0].deviations.len(), 0);
    }

    #[test]
    fn skip_deviation_records_two_skips() {
        let log = log_with_sequence("C2", &["A", "D", "E"]);
        let result = ConformanceChecker::new().check(&log, &linear_model());
        let case = &result.cases[0];
        let skipped_activities: Vec<&str> = case
            .deviations
            .iter()
            .filter(|d| d.deviation_type == DeviationType::Skip)
            .map(|d| d.activity.as_str())
            .collect();
        assert_eq!(skipped_activities, vec!["B", "C"]);
        assert!(result.deviations_by_activity.contains_key("B"));
        assert!(result.deviations_by_activity.contains_key("C"));
        assert!(!result.deviations_by_activity.contains_key("D"));
        assert!(case.fitness < 1.0);
    }

    #[test]
    fn insert_deviation_recorded_on_unknown_activity() {
        let log = log_with_sequence("C3", &["A", "B", "X", "C", "D", "E"]);
        let result = ConformanceChecker::new().check(&log, &linear_model());
        let case = &result.cases[0];
        let inserts: Vec<_> = case
            .deviations
            .iter()
            .filter(|d| d.deviation_type == DeviationType::Insert)
            .collect();
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].activity, "X");
        assert!(case.fitness < 1.0);
        assert!(result.deviations_by_activity.contains_key("X"));
    }

    #[test]
    fn fitness_and_precision_bounded_zero_to_one() {
        let log = log_with_sequence("C4", &["A", "Z"]);
        let result = ConformanceChecker::new().check(&log, &linear_model());
        assert!(result.aggregate_fitness >= 0.0 && result.aggregate_fitness <= 1.0);
        assert!(result.precision >= 0.0 && result.precision <= 1.0);
    }

    #[test]
    fn empty_log_yields_sentinel_values_without_panicking() {
        let log = EventLog::new("empty");
        let result = ConformanceChecker::new().check(&log, &linear_model());
        assert_eq!(result.total_cases, 0);
        assert_eq!(result.conformance_rate, 100.0);
        assert_eq!(result.aggregate_fitness, 1.0);
    }
}
