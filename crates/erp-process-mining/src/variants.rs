//! Variant analysis (spec §4.2.5, glossary "happy path"): groups
//! traces by activity sequence, ranks by frequency, and designates the
//! most-frequent non-rework path as the happy path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event_log::EventLog;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub sequence: Vec<String>,
    pub case_ids: Vec<String>,
    pub frequency: usize,
    pub has_repetition: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantAnalysisResult {
    pub variants: Vec<Variant>,
    pub variant_count: usize,
    pub happy_path: Option<Vec<String>>,
    pub happy_path_rate: f64,
}

impl VariantAnalysisResult {
    pub fn summary(&self) -> String {
        format!(
            "{} variants, happy path rate {:.1}%",
            self.variant_count, self.happy_path_rate
        )
    }

    pub fn to_serializable(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Default)]
pub struct VariantAnalyzer;

impl VariantAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, log: &EventLog) -> VariantAnalysisResult {
        let mut grouped: BTreeMap<Vec<String>, Vec<String>> = BTreeMap::new();

        for trace in log.sorted_traces() {
            let sequence: Vec<String> = trace.activities().into_iter().map(String::from).collect();
            grouped.entry(sequence).or_default().push(trace.case_id.clone());
        }

        let mut variants: Vec<Variant> = grouped
            .into_iter()
            .map(|(sequence, case_ids)| {
                let has_repetition = {
                    let mut seen = std::collections::BTreeSet::new();
                    sequence.iter().any(|a| !seen.insert(a.clone()))
                };
                Variant {
                    frequency: case_ids.len(),
                    case_ids,
                    has_repetition,
                    sequence,
                }
            })
            .collect();
        variants.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.sequence.cmp(&b.sequence)));

        let happy_path = variants
            .iter()
            .find(|v| !v.has_repetition)
            .map(|v| v.sequence.clone());

        let total_cases: usize = variants.iter().map(|v| v.frequency).sum();
        let happy_path_cases = happy_path
            .as_ref()
            .map(|seq| {
                variants
                    .iter()
                    .find(|v| &v.sequence == seq)
                    .map(|v| v.frequency)
                    .unwrap_or(0)
            })
            .unwrap_or(0);
        let happy_path_rate = if total_cases == 0 {
            0.0
        } else {
            (happy_path_cases as f64 / total_cases as f64) * 100.0
        };

        VariantAnalysisResult {
            variant_count: variants.len(),
            happy_path,
            happy_path_rate,
            variants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::{Event, EventLogBuilder};
    use chrono::{TimeZone, Utc};

    #[test]
    fn most_frequent_path_without_repetition_is_happy_path() {
        let mut builder = EventLogBuilder::new("test");
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for i in 0..7 {
            let case = format!("C{i}");
            builder.add_event(&case, Event::new("A", base));
            builder.add_event(&case, Event::new("B", base + chrono::Duration::hours(1)));
        }
        for i in 7..10 {
            let case = format!("C{i}");
            builder.add_event(&case, Event::new("A", base));
            builder.add_event(&case, Event::new("A", base + chrono::Duration::hours(1)));
            builder.add_event(&case, Event::new("B", base + chrono::Duration::hours(2)));
        }
        let log = builder.build();
        let result = VariantAnalyzer::new().analyze(&log);
        assert_eq!(result.variant_count, 2);
        assert_eq!(result.happy_path, Some(vec!["A".to_string(), "B".to_string()]));
        assert_eq!(result.happy_path_rate, 70.0);
    }

    #[test]
    fn empty_log_has_zero_variants() {
        let log = EventLog::new("empty");
        let result = VariantAnalyzer::new().analyze(&log);
        assert_eq!(result.variant_count, 0);
        assert_eq!(result.happy_path_rate, 0.0);
    }
}
