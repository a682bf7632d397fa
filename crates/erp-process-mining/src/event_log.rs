//! The event log model (spec §3) and the builder that folds tabular
//! change/flow/status records into it (spec §4.2.1).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single occurrence of an activity in a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub activity: String,
    pub timestamp: DateTime<Utc>,
    pub resource: Option<String>,
    pub attributes: BTreeMap<String, Value>,
}

impl Event {
    pub fn new(activity: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            activity: activity.into(),
            timestamp,
            resource: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn epoch_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// An ordered sequence of events belonging to one case.
///
/// Events are ordered by timestamp ascending, ties broken by
/// insertion order: `add_event` appends and then performs a stable
/// sort, which preserves relative insertion order among equal keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    pub case_id: String,
    pub events: Vec<Event>,
}

impl Trace {
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            events: Vec::new(),
        }
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
        self.events.sort_by_key(|e| e.epoch_millis());
    }

    pub fn activities(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.activity.as_str()).collect()
    }

    pub fn resources(&self) -> BTreeSet<&str> {
        self.events
            .iter()
            .filter_map(|e| e.resource.as_deref())
            .collect()
    }

    /// `true` if some activity occurs more than once (rework / self-loop).
    pub fn has_repetition(&self) -> bool {
        let mut seen = BTreeSet::new();
        for a in self.activities() {
            if !seen.insert(a) {
                return true;
            }
        }
        false
    }

    pub fn duration_millis(&self) -> Option<i64> {
        let first = self.events.first()?.epoch_millis();
        let last = self.events.last()?.epoch_millis();
        Some(last - first)
    }
}

/// Cases keyed by case id, plus the derived activity/resource indices
/// (spec §3 invariant: every event's activity and resource contribute
/// to the respective index).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub name: String,
    pub traces: BTreeMap<String, Trace>,
    pub activities: BTreeSet<String>,
    pub resources: BTreeSet<String>,
}

impl EventLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            traces: BTreeMap::new(),
            activities: BTreeSet::new(),
            resources: BTreeSet::new(),
        }
    }

    pub fn trace_count(&self) -> usize {
        self.traces.len()
    }

    pub fn event_count(&self) -> usize {
        self.traces.values().map(|t| t.events.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn sorted_traces(&self) -> Vec<&Trace> {
        self.traces.values().collect()
    }
}

/// Builds an [`EventLog`] incrementally; case-id uniqueness is total
/// (the builder owns the one insertion path).
#[derive(Debug, Default)]
pub struct EventLogBuilder {
    log: EventLog,
}

impl EventLogBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            log: EventLog::new(name),
        }
    }

    pub fn add_event(&mut self, case_id: impl Into<String>, event: Event) -> &mut Self {
        let case_id = case_id.into();
        self.log.activities.insert(event.activity.clone());
        if let Some(resource) = &event.resource {
            self.log.resources.insert(resource.clone());
        }
        self.log
            .traces
            .entry(case_id.clone())
            .or_insert_with(|| Trace::new(case_id))
            .add_event(event);
        self
    }

    pub fn build(self) -> EventLog {
        self.log
    }
}

/// Table classes from spec §4.2.1: which ones actually emit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableClass {
    /// One event on row creation.
    Record,
    /// Activity derived from a transaction code.
    Transaction,
    /// Document-type transition yields an activity.
    Flow,
    /// Old/new-value pair records an observed modification.
    Change,
    /// Status-code transition.
    Status,
    /// Enrichment only; no event.
    Detail,
    /// Enrichment only; no event.
    Master,
}

impl TableClass {
    pub fn emits_events(self) -> bool {
        !matches!(self, TableClass::Detail | TableClass::Master)
    }
}

/// Per-table mapping configuration (spec §4.2.1): how a table's rows
/// become events for one process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMapping {
    pub table: String,
    pub class: TableClass,
    /// Static activity name, used directly by `record`/`change`/`status` tables.
    pub activity: Option<String>,
    /// Field holding a code (tcode for `transaction`, doc type for `flow`)
    /// to resolve through `code_to_activity`.
    pub code_field: Option<String>,
    pub code_to_activity: BTreeMap<String, String>,
    /// Field whose raw string value *is* the activity name, used by
    /// `status`/`flow` tables whose status text already reads like a
    /// process step (e.g. TBTCO's `status` column).
    pub direct_field: Option<String>,
    pub timestamp_field: String,
    /// Separate time-of-day field combined with `timestamp_field` when set.
    pub time_field: Option<String>,
    pub resource_field: Option<String>,
    /// Row is skipped unless `row[condition_field] == condition_value`.
    pub condition: Option<(String, String)>,
    pub case_id_field: String,
}

impl TableMapping {
    pub fn resolve_activity(&self, row: &Value) -> Option<String> {
        if let Some(activity) = &self.activity {
            return Some(activity.clone());
        }
        if let Some(direct_field) = &self.direct_field {
            return row.get(direct_field)?.as_str().map(|s| s.to_string());
        }
        let code_field = self.code_field.as_ref()?;
        let code = row.get(code_field)?.as_str()?;
        self.code_to_activity.get(code).cloned()
    }

    fn condition_holds(&self, row: &Value) -> bool {
        match &self.condition {
            None => true,
            Some((field, expected)) => row
                .get(field)
                .and_then(|v| v.as_str())
                .map(|actual| actual == expected)
                .unwrap_or(false),
        }
    }

    fn resolve_timestamp(&self, row: &Value) -> Option<DateTime<Utc>> {
        let date_str = row.get(&self.timestamp_field)?.as_str()?;
        if let Some(time_field) = &self.time_field {
            let time_str = row.get(time_field).and_then(|v| v.as_str()).unwrap_or("00:00:00");
            let combined = format!("{date_str}T{time_str}");
            if let Ok(naive) = NaiveDateTime::parse_from_str(&combined, "%Y-%m-%dT%H:%M:%S") {
                return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
            }
            return None;
        }
        DateTime::parse_from_rfc3339(date_str)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    fn resolve_resource(&self, row: &Value) -> Option<String> {
        let field = self.resource_field.as_ref()?;
        row.get(field).and_then(|v| v.as_str()).map(|s| s.to_string())
    }
}

/// The case-id resolution plus per-table mappings for one process
/// (spec §4.2.1): the primary table/field, and table mappings across
/// every event-producing source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessEventConfig {
    pub process_id: String,
    pub table_mappings: Vec<TableMapping>,
}

/// Folds tabular rows (keyed by source table name, as returned by
/// extractors) into an [`EventLog`] per a process's table mapping
/// configuration. Rows whose timestamp cannot be parsed are dropped —
/// spec §3 excludes them from time-sensitive analyses, but since this
/// builder produces the canonical log consumed by all analyses, an
/// unparsable timestamp means the row contributes no event at all.
pub fn build_event_log(
    config: &ProcessEventConfig,
    tables: &BTreeMap<String, Vec<Value>>,
) -> EventLog {
    let mut builder = EventLogBuilder::new(config.process_id.clone());

    for mapping in &config.table_mappings {
        if !mapping.class.emits_events() {
            continue;
        }
        let Some(rows) = tables.get(&mapping.table) else {
            continue;
        };
        for row in rows {
            if !mapping.condition_holds(row) {
                continue;
            }
            let Some(activity) = mapping.resolve_activity(row) else {
                continue;
            };
            let Some(timestamp) = mapping.resolve_timestamp(row) else {
                continue;
            };
            let Some(case_id) = row.get(&mapping.case_id_field).and_then(|v| v.as_str()) else {
                continue;
            };
            let mut event = Event::new(activity, timestamp);
            event.resource = mapping.resolve_resource(row);
            if let Value::Object(map) = row {
                event.attributes = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            }
            builder.add_event(case_id.to_string(), event);
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_mapping() -> TableMapping {
        TableMapping {
            table: "CDHDR".into(),
            class: TableClass::Change,
            activity: None,
            code_field: Some("tcode".into()),
            code_to_activity: BTreeMap::from([
                ("VA01".to_string(), "Create Sales Order".to_string()),
                ("VL01N".to_string(), "Create Delivery".to_string()),
            ]),
            direct_field: None,
            timestamp_field: "changed_at".into(),
            time_field: None,
            resource_field: Some("changed_by".into()),
            condition: None,
            case_id_field: "case_id".into(),
        }
    }

    #[test]
    fn trace_orders_events_by_timestamp() {
        let mut trace = Trace::new("C1");
        trace.add_event(Event::new("B", DateTime::parse_from_rfc3339("2024-01-01T02:00:00Z").unwrap().into()));
        trace.add_event(Event::new("A", DateTime::parse_from_rfc3339("2024-01-01T01:00:00Z").unwrap().into()));
        assert_eq!(trace.activities(), vec!["A", "B"]);
    }

    #[test]
    fn build_event_log_emits_events_from_change_rows() {
        let config = ProcessEventConfig {
            process_id: "O2C".into(),
            table_mappings: vec![sample_mapping()],
        };
        let mut tables = BTreeMap::new();
        tables.insert(
            "CDHDR".to_string(),
            vec![
                json!({"case_id": "SO-1", "tcode": "VA01", "changed_at": "2024-01-10T08:00:00Z", "changed_by": "JDOE"}),
                json!({"case_id": "SO-1", "tcode": "VL01N", "changed_at": "2024-01-10T11:00:00Z", "changed_by": "ASMITH"}),
            ],
        );

        let log = build_event_log(&config, &tables);
        assert_eq!(log.trace_count(), 1);
        let trace = &log.traces["SO-1"];
        assert_eq!(trace.activities(), vec!["Create Sales Order", "Create Delivery"]);
        assert_eq!(log.activities.len(), 2);
        assert_eq!(log.resources.len(), 2);
    }

    #[test]
    fn unmapped_code_produces_no_event() {
        let config = ProcessEventConfig {
            process_id: "O2C".into(),
            table_mappings: vec![sample_mapping()],
        };
        let mut tables = BTreeMap::new();
        tables.insert(
            "CDHDR".to_string(),
            vec![json!({"case_id": "SO-1", "tcode": "UNKNOWN", "changed_at": "2024-01-10T08:00:00Z"})],
        );
        let log = build_event_log(&config, &tables);
        assert!(log.is_empty());
    }

    #[test]
    fn event_count_equals_sum_of_trace_events() {
        let mut log = EventLog::new("x");
        log.traces.insert("A".into(), {
            let mut t = Trace::new("A");
            t.add_event(Event::new("x", Utc::now()));
            t.add_event(Event::new("y", Utc::now()));
            t
        });
        log.traces.insert("B".into(), {
            let mut t = Trace::new("B");
            t.add_event(Event::new("z", Utc::now()));
            t
        });
        assert_eq!(log.event_count(), 3);
    }
}
