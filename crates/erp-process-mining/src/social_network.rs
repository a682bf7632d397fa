//! Social-network mining (spec §4.2.5): handover and working-together
//! matrices, resource utilisation, activity-resource matrix,
//! segregation-of-duties checks, and a centrality proxy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event_log::EventLog;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handover {
    pub from_resource: String,
    pub to_resource: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingTogether {
    pub resource_a: String,
    pub resource_b: String,
    pub shared_cases: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUtilization {
    pub resource: String,
    pub event_count: u64,
    pub primary_activities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityResourceCell {
    pub activity: String,
    pub resource: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SodRule {
    pub activity_a: String,
    pub activity_b: String,
}

impl SodRule {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            activity_a: a.into(),
            activity_b: b.into(),
        }
    }
}

/// Default conflict pairs shipped with the engine; callers may add more.
pub fn default_sod_rules() -> Vec<SodRule> {
    vec![
        SodRule::new("Create Purchase Order", "Post Payment"),
        SodRule::new("Create Vendor Master", "Post Payment"),
        SodRule::new("Approve Requisition", "Create Purchase Order"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SodViolation {
    pub case_id: String,
    pub resource: String,
    pub activity_a: String,
    pub activity_b: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCentrality {
    pub resource: String,
    pub centrality: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialNetworkResult {
    pub handovers: Vec<Handover>,
    pub working_together: Vec<WorkingTogether>,
    pub utilization: Vec<ResourceUtilization>,
    pub activity_resource_matrix: Vec<ActivityResourceCell>,
    pub sod_violations: Vec<SodViolation>,
    pub centrality: Vec<ResourceCentrality>,
    /// `true` if the coefficient of variation of event counts across
    /// resources is below 0.5.
    pub balanced_workload: bool,
}

impl SocialNetworkResult {
    pub fn summary(&self) -> String {
        format!(
            "{} resources, {} handovers, {} SoD violations, balanced={}",
            self.utilization.len(),
            self.handovers.len(),
            self.sod_violations.len(),
            self.balanced_workload
        )
    }

    pub fn to_serializable(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Default)]
pub struct SocialNetworkMiner {
    pub sod_rules: Vec<SodRule>,
}

impl SocialNetworkMiner {
    pub fn new() -> Self {
        Self {
            sod_rules: default_sod_rules(),
        }
    }

    pub fn with_rules(mut self, extra: Vec<SodRule>) -> Self {
        self.sod_rules.extend(extra);
        self
    }

    pub fn analyze(&self, log: &EventLog) -> SocialNetworkResult {
        let mut handover_counts: BTreeMap<(String, String), u64> = BTreeMap::new();
        let mut together_counts: BTreeMap<(String, String), u64> = BTreeMap::new();
        let mut event_counts: BTreeMap<String, u64> = BTreeMap::new();
        let mut activities_by_resource: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        let mut ar_matrix: BTreeMap<(String, String), u64> = BTreeMap::new();
        let mut sod_violations = Vec::new();
        let mut in_volume: BTreeMap<String, u64> = BTreeMap::new();
        let mut out_volume: BTreeMap<String, u64> = BTreeMap::new();

        for trace in log.sorted_traces() {
            let resources_in_case: std::collections::BTreeSet<&str> =
                trace.events.iter().filter_map(|e| e.resource.as_deref()).collect();
            for a in &resources_in_case {
                for b in &resources_in_case {
                    if a < b {
                        *together_counts.entry((a.to_string(), b.to_string())).or_insert(0) += 1;
                    }
                }
            }

            for event in &trace.events {
                if let Some(resource) = &event.resource {
                    *event_counts.entry(resource.clone()).or_insert(0) += 1;
                    *activities_by_resource
                        .entry(resource.clone())
                        .or_default()
                        .entry(event.activity.clone())
                        .or_insert(0) += 1;
                    *ar_matrix
                        .entry((event.activity.clone(), resource.clone()))
                        .or_insert(0) += 1;
                }
            }

            for window in trace.events.windows(2) {
                if let (Some(from), Some(to)) = (&window[0].resource, &window[1].resource) {
                    if from != to {
                        *handover_counts.entry((from.clone(), to.clone())).or_insert(0) += 1;
                        *out_volume.entry(from.clone()).or_insert(0) += 1;
                        *in_volume.entry(to.clone()).or_insert(0) += 1;
                    }
                }
            }

            for rule in &self.sod_rules {
                if let (Some(ra), Some(rb)) = (
                    trace.events.iter().find(|e| e.activity == rule.activity_a).and_then(|e| e.resource.as_deref()),
                    trace.events.iter().find(|e| e.activity == rule.activity_b).and_then(|e| e.resource.as_deref()),
                ) {
                    if ra == rb {
                        sod_violations.push(SodViolation {
                            case_id: trace.case_id.clone(),
                            resource: ra.to_string(),
                            activity_a: rule.activity_a.clone(),
                            activity_b: rule.activity_b.clone(),
                        });
                    }
                }
            }
        }

        let mut handovers: Vec<Handover> = handover_counts
            .into_iter()
            .map(|((from_resource, to_resource), count)| Handover {
                from_resource,
                to_resource,
                count,
            })
            .collect();
        handovers.sort_by(|a, b| (a.from_resource.clone(), a.to_resource.clone()).cmp(&(b.from_resource.clone(), b.to_resource.clone())));

        let mut working_together: Vec<WorkingTogether> = together_counts
            .into_iter()
            .map(|((resource_a, resource_b), shared_cases)| WorkingTogether {
                resource_a,
                resource_b,
                shared_cases,
            })
            .collect();
        working_together.sort_by(|a, b| (a.resource_a.clone(), a.resource_b.clone()).cmp(&(b.resource_a.clone(), b.resource_b.clone())));

        let mut utilization: Vec<ResourceUtilization> = event_counts
            .iter()
            .map(|(resource, count)| {
                let mut activities: Vec<(String, u64)> = activities_by_resource
                    .get(resource)
                    .map(|m| m.iter().map(|(a, c)| (a.clone(), *c)).collect())
                    .unwrap_or_default();
                activities.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
                ResourceUtilization {
                    resource: resource.clone(),
                    event_count: *count,
                    primary_activities: activities.into_iter().map(|(a, _)| a).collect(),
                }
            })
            .collect();
        utilization.sort_by(|a, b| a.resource.cmp(&b.resource));

        let mut activity_resource_matrix: Vec<ActivityResourceCell> = ar_matrix
            .into_iter()
            .map(|((activity, resource), count)| ActivityResourceCell {
                activity,
                resource,
                count,
            })
            .collect();
        activity_resource_matrix.sort_by(|a, b| (a.activity.clone(), a.resource.clone()).cmp(&(b.activity.clone(), b.resource.clone())));

        let counts: Vec<f64> = event_counts.values().map(|v| *v as f64).collect();
        let balanced_workload = {
            let st = crate::stats::compute(&counts);
            st.mean == 0.0 || (st.stddev / st.mean) < 0.5
        };

        let resources: std::collections::BTreeSet<String> = event_counts.keys().cloned().collect();
        let mut centrality: Vec<ResourceCentrality> = resources
            .iter()
            .map(|r| {
                let inv = *in_volume.get(r).unwrap_or(&0) as f64;
                let outv = *out_volume.get(r).unwrap_or(&0) as f64;
                ResourceCentrality {
                    resource: r.clone(),
                    centrality: (inv * outv).sqrt(),
                }
            })
            .collect();
        centrality.sort_by(|a, b| a.resource.cmp(&b.resource));

        sod_violations.sort_by(|a, b| a.case_id.cmp(&b.case_id));

        SocialNetworkResult {
            handovers,
            working_together,
            utilization,
            activity_resource_matrix,
            sod_violations,
            centrality,
            balanced_workload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::{Event, EventLogBuilder};
    use chrono::{TimeZone, Utc};

    #[test]
    fn same_resource_handover_excluded_but_counted_in_utilization() {
        let mut builder = EventLogBuilder::new("test");
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut a = Event::new("A", base);
        a.resource = Some("U1".into());
        let mut b = Event::new("B", base + chrono::Duration::hours(1));
        b.resource = Some("U1".into());
        builder.add_event("C1", a);
        builder.add_event("C1", b);
        let log = builder.build();

        let result = SocialNetworkMiner::new().analyze(&log);
        assert!(result.handovers.is_empty());
        assert_eq!(result.utilization[0].event_count, 2);
    }

    #[test]
    fn sod_violation_detected_when_same_resource_performs_conflict_pair() {
        let mut builder = EventLogBuilder::new("test");
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut po = Event::new("Create Purchase Order", base);
        po.resource = Some("U1".into());
        let mut pay = Event::new("Post Payment", base + chrono::Duration::hours(1));
        pay.resource = Some("U1".into());
        builder.add_event("C1", po);
        builder.add_event("C1", pay);
        let log = builder.build();

        let result = SocialNetworkMiner::new().analyze(&log);
        assert_eq!(result.sod_violations.len(), 1);
    }
}
