//! The heuristic process-discovery miner (spec §4.2.2): derives a
//! directed activity graph from observed traces, comparable to a
//! [`crate::reference_model::ReferenceModel`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event_log::EventLog;
use crate::reference_model::{Edge, EdgeType, ReferenceModel};

const DEFAULT_THRESHOLD: f64 = 0.9;
const LOOP_THRESHOLD: f64 = 0.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredEdge {
    pub from: String,
    pub to: String,
    pub dependency: f64,
    pub frequency_forward: u64,
    pub frequency_backward: u64,
}

/// The discovered process model: a main-flow graph plus any loop
/// edges retained under the separate, looser loop threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicModel {
    pub activities: Vec<String>,
    pub edges: Vec<DiscoveredEdge>,
    pub loop_edges: Vec<DiscoveredEdge>,
    pub start_activities: Vec<String>,
    pub end_activities: Vec<String>,
}

impl HeuristicModel {
    /// Converts the discovered graph to a [`ReferenceModel`] so it can
    /// be compared against, or substituted for, a built-in one.
    pub fn to_reference_model(&self, id: &str, name: &str) -> ReferenceModel {
        let edges: Vec<(&str, &str, EdgeType)> = self
            .edges
            .iter()
            .chain(self.loop_edges.iter())
            .map(|e| (e.from.as_str(), e.to.as_str(), EdgeType::Sequence))
            .collect();
        ReferenceModel::new(
            id,
            name,
            self.activities.iter().map(String::as_str).collect(),
            edges,
            self.start_activities.iter().map(String::as_str).collect(),
            self.end_activities.iter().map(String::as_str).collect(),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HeuristicMiner {
    pub main_flow_threshold: f64,
    pub loop_threshold: f64,
}

impl Default for HeuristicMiner {
    fn default() -> Self {
        Self {
            main_flow_threshold: DEFAULT_THRESHOLD,
            loop_threshold: LOOP_THRESHOLD,
        }
    }
}

impl HeuristicMiner {
    pub fn with_thresholds(main_flow_threshold: f64, loop_threshold: f64) -> Self {
        Self {
            main_flow_threshold,
            loop_threshold,
        }
    }

    pub fn discover(&self, log: &EventLog) -> HeuristicModel {
        let mut directly_follows: BTreeMap<(String, String), u64> = BTreeMap::new();

        for trace in log.sorted_traces() {
            for window in trace.events.windows(2) {
                let key = (window[0].activity.clone(), window[1].activity.clone());
                *directly_follows.entry(key).or_insert(0) += 1;
            }
        }

        let mut edges = Vec::new();
        let mut loop_edges = Vec::new();
        let mut seen_pairs: std::collections::BTreeSet<(String, String)> = std::collections::BTreeSet::new();

        for (a, b) in directly_follows.keys() {
            if !seen_pairs.insert((a.clone(), b.clone())) {
                continue;
            }
            let forward = *directly_follows.get(&(a.clone(), b.clone())).unwrap_or(&0);
            let backward = *directly_follows.get(&(b.clone(), a.clone())).unwrap_or(&0);
            let dependency = (forward as f64 - backward as f64) / (forward as f64 + backward as f64 + 1.0);

            let is_loop = a == b;
            let discovered = DiscoveredEdge {
                from: a.clone(),
                to: b.clone(),
                dependency,
                frequency_forward: forward,
                frequency_backward: backward,
            };

            if is_loop {
                if dependency >= self.loop_threshold {
                    loop_edges.push(discovered);
                }
            } else if dependency >= self.main_flow_threshold {
                edges.push(discovered);
            } else if dependency >= self.loop_threshold && a != b && directly_follows.contains_key(&(b.clone(), a.clone())) {
                // a<->b both directions observed at lower dependency: treat as a loop-back edge.
                loop_edges.push(discovered);
            }
        }

        edges.sort_by(|x, y| (x.from.clone(), x.to.clone()).cmp(&(y.from.clone(), y.to.clone())));
        loop_edges.sort_by(|x, y| (x.from.clone(), x.to.clone()).cmp(&(y.from.clone(), y.to.clone())));

        let activities: Vec<String> = log.activities.iter().cloned().collect();

        let mut has_incoming: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
        let mut has_outgoing: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
        for e in &edges {
            has_incoming.insert(e.to.as_str());
            has_outgoing.insert(e.from.as_str());
        }

        let start_activities: Vec<String> = activities
            .iter()
            .filter(|a| !has_incoming.contains(a.as_str()))
            .cloned()
            .collect();
        let end_activities: Vec<String> = activities
            .iter()
            .filter(|a| !has_outgoing.contains(a.as_str()))
            .cloned()
            .collect();

        HeuristicModel {
            activities,
            edges,
            loop_edges,
            start_activities,
            end_activities,
        }
    }
}

impl From<&DiscoveredEdge> for Edge {
    fn from(e: &DiscoveredEdge) -> Self {
        Edge {
            from: e.from.clone(),
            to: e.to.clone(),
            edge_type: EdgeType::Sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::{Event, EventLogBuilder};
    use chrono::{TimeZone, Utc};

    fn log_with_linear_cases(n: i64) -> EventLog {
        let mut builder = EventLogBuilder::new("test");
        for i in 0..n {
            let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(i);
            builder.add_event(format!("C{i}"), Event::new("A", base));
            builder.add_event(format!("C{i}"), Event::new("B", base + chrono::Duration::minutes(10)));
            builder.add_event(format!("C{i}"), Event::new("C", base + chrono::Duration::minutes(20)));
        }
        builder.build()
    }

    #[test]
    fn discovers_linear_flow_as_start_and_end() {
        let log = log_with_linear_cases(5);
        let miner = HeuristicMiner::default();
        let model = miner.discover(&log);
        assert_eq!(model.start_activities, vec!["A".to_string()]);
        assert_eq!(model.end_activities, vec!["C".to_string()]);
        assert!(model.edges.iter().any(|e| e.from == "A" && e.to == "B"));
        assert!(model.edges.iter().any(|e| e.from == "B" && e.to == "C"));
    }

    #[test]
    fn dependency_measure_is_one_for_unidirectional_flow() {
        let log = log_with_linear_cases(3);
        let miner = HeuristicMiner::default();
        let model = miner.discover(&log);
        let ab = model.edges.iter().find(|e| e.from == "A" && e.to == "B").unwrap();
        assert_eq!(ab.dependency, 1.0);
    }
}
