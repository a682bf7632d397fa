//! Reference models (spec §3, §4.2.4): canonical directed-graph
//! descriptions of the seven built-in ERP processes, plus the
//! cycle-safe critical-path computation spec §9 calls for.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeType {
    Sequence,
    Parallel,
    Choice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlaSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaTarget {
    pub target: f64,
    pub unit: String,
    pub severity: SlaSeverity,
}

/// A directed-graph description of an expected business process flow,
/// with derived successor/predecessor indices maintained as O(1)
/// lookups (spec §3).
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceModel {
    pub id: String,
    pub name: String,
    pub activities: BTreeSet<String>,
    pub edges: Vec<Edge>,
    pub start_activities: BTreeSet<String>,
    pub end_activities: BTreeSet<String>,
    /// Keyed by `"A → B"`.
    pub sla_targets: BTreeMap<String, SlaTarget>,
    pub critical_transitions: Vec<String>,

    #[serde(skip)]
    successors: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    predecessors: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    edge_set: BTreeSet<(String, String)>,
}

/// Deserialize the public fields, then rebuild the derived indices —
/// a derived `Deserialize` would leave `successors`/`predecessors`/
/// `edge_set` empty, silently breaking `has_edge`/`successors` on any
/// round-tripped or user-supplied custom model.
impl<'de> serde::Deserialize<'de> for ReferenceModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            id: String,
            name: String,
            activities: BTreeSet<String>,
            edges: Vec<Edge>,
            start_activities: BTreeSet<String>,
            end_activities: BTreeSet<String>,
            sla_targets: BTreeMap<String, SlaTarget>,
            critical_transitions: Vec<String>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let mut model = ReferenceModel {
            id: raw.id,
            name: raw.name,
            activities: raw.activities,
            edges: raw.edges,
            start_activities: raw.start_activities,
            end_activities: raw.end_activities,
            sla_targets: raw.sla_targets,
            critical_transitions: raw.critical_transitions,
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
            edge_set: BTreeSet::new(),
        };
        model.reindex();
        Ok(model)
    }
}

impl ReferenceModel {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        activities: Vec<&str>,
        edges: Vec<(&str, &str, EdgeType)>,
        start_activities: Vec<&str>,
        end_activities: Vec<&str>,
    ) -> Self {
        let edges: Vec<Edge> = edges
            .into_iter()
            .map(|(from, to, edge_type)| Edge {
                from: from.to_string(),
                to: to.to_string(),
                edge_type,
            })
            .collect();
        let mut model = Self {
            id: id.into(),
            name: name.into(),
            activities: activities.into_iter().map(String::from).collect(),
            edges,
            start_activities: start_activities.into_iter().map(String::from).collect(),
            end_activities: end_activities.into_iter().map(String::from).collect(),
            sla_targets: BTreeMap::new(),
            critical_transitions: Vec::new(),
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
            edge_set: BTreeSet::new(),
        };
        model.reindex();
        model
    }

    pub fn with_sla(mut self, transition: &str, target: f64, unit: &str, severity: SlaSeverity) -> Self {
        self.sla_targets.insert(
            transition.to_string(),
            SlaTarget {
                target,
                unit: unit.to_string(),
                severity,
            },
        );
        self
    }

    pub fn with_critical_transitions(mut self, transitions: Vec<&str>) -> Self {
        self.critical_transitions = transitions.into_iter().map(String::from).collect();
        self
    }

    fn reindex(&mut self) {
        self.successors.clear();
        self.predecessors.clear();
        self.edge_set.clear();
        for edge in &self.edges {
            self.successors
                .entry(edge.from.clone())
                .or_default()
                .push(edge.to.clone());
            self.predecessors
                .entry(edge.to.clone())
                .or_default()
                .push(edge.from.clone());
            self.edge_set.insert((edge.from.clone(), edge.to.clone()));
        }
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edge_set.contains(&(from.to_string(), to.to_string()))
    }

    pub fn successors(&self, activity: &str) -> &[String] {
        self.successors.get(activity).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn predecessors(&self, activity: &str) -> &[String] {
        self.predecessors.get(activity).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// `true` when the activity graph contains a cycle (topological
    /// order shorter than the activity count).
    pub fn is_cyclic(&self) -> bool {
        self.topological_order().len() < self.activities.len()
    }

    fn topological_order(&self) -> Vec<String> {
        let mut in_degree: BTreeMap<&str, usize> = self.activities.iter().map(|a| (a.as_str(), 0)).collect();
        for edge in &self.edges {
            *in_degree.entry(edge.to.as_str()).or_insert(0) += 1;
        }
        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(a, _)| *a)
            .collect();
        let mut order = Vec::new();
        while let Some(activity) = queue.pop_front() {
            order.push(activity.to_string());
            for succ in self.successors(activity) {
                if let Some(deg) = in_degree.get_mut(succ.as_str()) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(succ.as_str());
                    }
                }
            }
        }
        order
    }

    /// Critical path: on an acyclic graph, longest path via
    /// topological DP; on a cyclic graph, falls back to bounded-depth
    /// DFS with a per-path visited set (spec §4.2.4, §9). Returns a
    /// non-empty path whenever both start and end activities exist.
    pub fn critical_path(&self) -> Vec<String> {
        if self.start_activities.is_empty() || self.end_activities.is_empty() {
            return Vec::new();
        }
        if self.is_cyclic() {
            self.critical_path_dfs(16)
        } else {
            self.critical_path_topological()
        }
    }

    fn critical_path_topological(&self) -> Vec<String> {
        let order = self.topological_order();
        let mut best_len: BTreeMap<&str, usize> = BTreeMap::new();
        let mut best_pred: BTreeMap<&str, &str> = BTreeMap::new();
        for activity in &order {
            best_len.entry(activity.as_str()).or_insert(1);
        }
        for activity in &order {
            let cur_len = *best_len.get(activity.as_str()).unwrap_or(&1);
            for succ in self.successors(activity) {
                let candidate = cur_len + 1;
                if candidate > *best_len.get(succ.as_str()).unwrap_or(&0) {
                    best_len.insert(succ.as_str(), candidate);
                    best_pred.insert(succ.as_str(), activity.as_str());
                }
            }
        }
        let Some(end) = self
            .end_activities
            .iter()
            .max_by_key(|e| best_len.get(e.as_str()).copied().unwrap_or(0))
        else {
            return Vec::new();
        };
        let mut path = vec![end.clone()];
        let mut cur = end.as_str();
        while let Some(pred) = best_pred.get(cur) {
            path.push(pred.to_string());
            cur = pred;
        }
        path.reverse();
        path
    }

    fn critical_path_dfs(&self, max_depth: usize) -> Vec<String> {
        let mut best: Vec<String> = Vec::new();
        for start in &self.start_activities {
            let mut visited = BTreeSet::new();
            let mut path = vec![start.clone()];
            visited.insert(start.clone());
            self.dfs_longest(start, &mut visited, &mut path, max_depth, &mut best);
        }
        if best.is_empty() {
            // No reachable end activity within bound; degrade to a
            // single-node path so the "non-empty whenever start/end
            // exist" invariant still holds.
            if let Some(start) = self.start_activities.iter().next() {
                return vec![start.clone()];
            }
        }
        best
    }

    fn dfs_longest(
        &self,
        current: &str,
        visited: &mut BTreeSet<String>,
        path: &mut Vec<String>,
        remaining_depth: usize,
        best: &mut Vec<String>,
    ) {
        if self.end_activities.contains(current) && path.len() > best.len() {
            *best = path.clone();
        }
        if remaining_depth == 0 {
            return;
        }
        for succ in self.successors(current).to_vec() {
            if visited.contains(&succ) {
                continue;
            }
            visited.insert(succ.clone());
            path.push(succ.clone());
            self.dfs_longest(&succ, visited, path, remaining_depth - 1, best);
            path.pop();
            visited.remove(&succ);
        }
    }
}

/// All seven built-in reference models, plus lookup helpers (spec §6
/// `get_reference_model` / `list_reference_models`).
pub struct ReferenceModelCatalog {
    models: BTreeMap<String, ReferenceModel>,
}

impl Default for ReferenceModelCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ReferenceModelCatalog {
    pub fn with_builtins() -> Self {
        let mut models = BTreeMap::new();
        for model in builtin_models() {
            models.insert(model.id.clone(), model);
        }
        Self { models }
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceModel> {
        self.models.get(id)
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    pub fn register(&mut self, model: ReferenceModel) {
        self.models.insert(model.id.clone(), model);
    }
}

fn builtin_models() -> Vec<ReferenceModel> {
    use EdgeType::Sequence;

    vec![
        ReferenceModel::new(
            "O2C",
            "Order to Cash",
            vec![
                "Create Sales Order", "Credit Check", "Create Delivery", "Pick", "Pack",
                "Goods Issue", "Create Invoice", "Send Invoice", "Payment Received", "Clear Invoice",
            ],
            vec![
                ("Create Sales Order", "Credit Check", Sequence),
                ("Credit Check", "Create Delivery", Sequence),
                ("Create Delivery", "Pick", Sequence),
                ("Pick", "Pack", Sequence),
                ("Pack", "Goods Issue", Sequence),
                ("Goods Issue", "Create Invoice", Sequence),
                ("Create Invoice", "Send Invoice", Sequence),
                ("Send Invoice", "Payment Received", Sequence),
                ("Payment Received", "Clear Invoice", Sequence),
            ],
            vec!["Create Sales Order"],
            vec!["Clear Invoice"],
        )
        .with_sla("Create Sales Order → Credit Check", 4.0, "hours", SlaSeverity::Medium)
        .with_sla("Send Invoice → Payment Received", 30.0, "days", SlaSeverity::High)
        .with_critical_transitions(vec!["Credit Check → Create Delivery", "Goods Issue → Create Invoice"]),
        ReferenceModel::new(
            "P2P",
            "Procure to Pay",
            vec![
                "Create Purchase Requisition", "Approve Requisition", "Create Purchase Order",
                "Goods Receipt", "Invoice Receipt", "Three-Way Match", "Post Payment",
            ],
            vec![
                ("Create Purchase Requisition", "Approve Requisition", Sequence),
                ("Approve Requisition", "Create Purchase Order", Sequence),
                ("Create Purchase Order", "Goods Receipt", Sequence),
                ("Goods Receipt", "Invoice Receipt", Sequence),
                ("Invoice Receipt", "Three-Way Match", Sequence),
                ("Three-Way Match", "Post Payment", Sequence),
            ],
            vec!["Create Purchase Requisition"],
            vec!["Post Payment"],
        )
        .with_sla("Approve Requisition → Create Purchase Order", 24.0, "hours", SlaSeverity::Medium)
        .with_critical_transitions(vec!["Three-Way Match → Post Payment"]),
        ReferenceModel::new(
            "R2R",
            "Record to Report",
            vec![
                "Post Journal Entry", "Reconcile Account", "Run Allocation", "Close Period",
                "Generate Financial Statement", "Review Statement",
            ],
            vec![
                ("Post Journal Entry", "Reconcile Account", Sequence),
                ("Reconcile Account", "Run Allocation", Sequence),
                ("Run Allocation", "Close Period", Sequence),
                ("Close Period", "Generate Financial Statement", Sequence),
                ("Generate Financial Statement", "Review Statement", Sequence),
                // Recurring monthly posting cycle.
                ("Review Statement", "Post Journal Entry", Sequence),
            ],
            vec!["Post Journal Entry"],
            vec!["Review Statement"],
        )
        .with_critical_transitions(vec!["Close Period → Generate Financial Statement"]),
        ReferenceModel::new(
            "A2R",
            "Acquire to Retire",
            vec![
                "Create Asset Master", "Capitalize Asset", "Run Depreciation", "Transfer Asset", "Retire Asset",
            ],
            vec![
                ("Create Asset Master", "Capitalize Asset", Sequence),
                ("Capitalize Asset", "Run Depreciation", Sequence),
                // Recurring monthly depreciation.
                ("Run Depreciation", "Run Depreciation", Sequence),
                ("Run Depreciation", "Transfer Asset", Sequence),
                ("Transfer Asset", "Run Depreciation", Sequence),
                ("Run Depreciation", "Retire Asset", Sequence),
            ],
            vec!["Create Asset Master"],
            vec!["Retire Asset"],
        )
        .with_critical_transitions(vec!["Capitalize Asset → Run Depreciation"]),
        ReferenceModel::new(
            "H2R",
            "Hire to Retire",
            vec![
                "Create Requisition", "Hire Employee", "Onboard Employee", "Run Payroll",
                "Performance Review", "Promote/Transfer", "Terminate Employee",
            ],
            vec![
                ("Create Requisition", "Hire Employee", Sequence),
                ("Hire Employee", "Onboard Employee", Sequence),
                ("Onboard Employee", "Run Payroll", Sequence),
                // Recurring payroll.
                ("Run Payroll", "Run Payroll", Sequence),
                ("Run Payroll", "Performance Review", Sequence),
                ("Performance Review", "Promote/Transfer", Sequence),
                ("Promote/Transfer", "Run Payroll", Sequence),
                ("Performance Review", "Terminate Employee", Sequence),
            ],
            vec!["Create Requisition"],
            vec!["Terminate Employee"],
        )
        .with_critical_transitions(vec!["Onboard Employee → Run Payroll"]),
        ReferenceModel::new(
            "P2M",
            "Plan to Manufacture",
            vec![
                "Demand Planning", "Create Production Order", "Material Staging", "Production Confirmation",
                "Quality Inspection", "Goods Receipt to Stock",
            ],
            vec![
                ("Demand Planning", "Create Production Order", Sequence),
                ("Create Production Order", "Material Staging", Sequence),
                ("Material Staging", "Production Confirmation", Sequence),
                ("Production Confirmation", "Quality Inspection", Sequence),
                ("Quality Inspection", "Goods Receipt to Stock", Sequence),
            ],
            vec!["Demand Planning"],
            vec!["Goods Receipt to Stock"],
        )
        .with_critical_transitions(vec!["Quality Inspection → Goods Receipt to Stock"]),
        ReferenceModel::new(
            "M2S",
            "Maintain to Settle",
            vec![
                "Create Maintenance Notification", "Create Maintenance Order", "Plan Resources",
                "Execute Maintenance", "Technical Completion", "Settle Order",
            ],
            vec![
                ("Create Maintenance Notification", "Create Maintenance Order", Sequence),
                ("Create Maintenance Order", "Plan Resources", Sequence),
                ("Plan Resources", "Execute Maintenance", Sequence),
                ("Execute Maintenance", "Technical Completion", Sequence),
                ("Technical Completion", "Settle Order", Sequence),
            ],
            vec!["Create Maintenance Notification"],
            vec!["Settle Order"],
        )
        .with_critical_transitions(vec!["Technical Completion → Settle Order"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_path_on_acyclic_model_is_nonempty() {
        let catalog = ReferenceModelCatalog::with_builtins();
        let o2c = catalog.get("O2C").unwrap();
        let path = o2c.critical_path();
        assert_eq!(path.first().unwrap(), "Create Sales Order");
        assert_eq!(path.last().unwrap(), "Clear Invoice");
    }

    #[test]
    fn critical_path_on_cyclic_model_terminates_and_is_nonempty() {
        let catalog = ReferenceModelCatalog::with_builtins();
        let r2r = catalog.get("R2R").unwrap();
        assert!(r2r.is_cyclic());
        let path = r2r.critical_path();
        assert!(!path.is_empty());
    }

    #[test]
    fn list_ids_has_all_seven() {
        let catalog = ReferenceModelCatalog::with_builtins();
        let ids = catalog.list_ids();
        assert_eq!(ids.len(), 7);
        assert!(ids.contains(&"O2C".to_string()));
        assert!(ids.contains(&"M2S".to_string()));
    }

    #[test]
    fn has_edge_and_successors() {
        let catalog = ReferenceModelCatalog::with_builtins();
        let p2p = catalog.get("P2P").unwrap();
        assert!(p2p.has_edge("Create Purchase Requisition", "Approve Requisition"));
        assert!(!p2p.has_edge("Create Purchase Requisition", "Post Payment"));
        assert_eq!(p2p.successors("Approve Requisition"), &["Create Purchase Order".to_string()]);
    }

    #[test]
    fn deserialize_rebuilds_derived_indices() {
        let model = ReferenceModel::new(
            "CUSTOM",
            "Custom Process",
            vec!["A", "B", "C"],
            vec![("A", "B", EdgeType::Sequence), ("B", "C", EdgeType::Sequence)],
            vec!["A"],
            vec!["C"],
        );

        let json = serde_json::to_string(&model).unwrap();
        let round_tripped: ReferenceModel = serde_json::from_str(&json).unwrap();

        assert!(round_tripped.has_edge("A", "B"));
        assert!(round_tripped.has_edge("B", "C"));
        assert!(!round_tripped.has_edge("A", "C"));
        assert_eq!(round_tripped.successors("A"), &["B".to_string()]);
        assert_eq!(round_tripped.predecessors("C"), &["B".to_string()]);
        assert_eq!(round_tripped.critical_path(), vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    }
}
