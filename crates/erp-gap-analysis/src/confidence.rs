//! The confidence scorer (spec §4.3.2): weighted per-category
//! coverage, penalised for gaps, rolled up into an overall score and
//! letter grade.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreCategory {
    Config,
    MasterData,
    Transaction,
    Code,
    Security,
    Interface,
    Process,
}

impl ScoreCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreCategory::Config => "config",
            ScoreCategory::MasterData => "masterdata",
            ScoreCategory::Transaction => "transaction",
            ScoreCategory::Code => "code",
            ScoreCategory::Security => "security",
            ScoreCategory::Interface => "interface",
            ScoreCategory::Process => "process",
        }
    }

    /// Weight in the overall weighted mean (spec §4.3.2); sums to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            ScoreCategory::Config => 0.25,
            ScoreCategory::MasterData => 0.15,
            ScoreCategory::Transaction => 0.10,
            ScoreCategory::Code => 0.20,
            ScoreCategory::Security => 0.10,
            ScoreCategory::Interface => 0.10,
            ScoreCategory::Process => 0.10,
        }
    }
}

/// Per-category input the caller assembles from coverage and gap data.
#[derive(Debug, Clone, Copy)]
pub struct CategoryCoverage {
    pub category: ScoreCategory,
    pub coverage_pct: f64,
    pub missing_critical_tables: usize,
    pub authorization_gaps: usize,
    pub data_volume_gaps: usize,
}

impl CategoryCoverage {
    pub fn new(category: ScoreCategory, coverage_pct: f64) -> Self {
        Self {
            category,
            coverage_pct,
            missing_critical_tables: 0,
            authorization_gaps: 0,
            data_volume_gaps: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: ScoreCategory,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    fn from_overall(overall: f64) -> Self {
        if overall >= 90.0 {
            Grade::A
        } else if overall >= 80.0 {
            Grade::B
        } else if overall >= 70.0 {
            Grade::C
        } else if overall >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceReport {
    pub category_scores: Vec<CategoryScore>,
    pub overall: f64,
    pub grade: Grade,
}

impl ConfidenceReport {
    pub fn category_score(&self, category: ScoreCategory) -> Option<f64> {
        self.category_scores
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.score)
    }
}

/// Serde impls for `ScoreCategory`/`Grade` derive `Serialize` already;
/// `Ord` lets `BTreeMap`-keyed rollups stay deterministic downstream.
#[derive(Debug, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, inputs: &[CategoryCoverage]) -> ConfidenceReport {
        let mut category_scores: Vec<CategoryScore> = inputs
            .iter()
            .map(|input| {
                let penalty = (input.missing_critical_tables as f64 * 5.0)
                    + (input.authorization_gaps as f64 * 3.0)
                    + (input.data_volume_gaps as f64 * 2.0);
                let score = (input.coverage_pct - penalty).clamp(0.0, 100.0);
                CategoryScore {
                    category: input.category,
                    score,
                }
            })
            .collect();
        category_scores.sort_by_key(|c| c.category);

        let total_weight: f64 = category_scores.iter().map(|c| c.category.weight()).sum();
        let overall = if total_weight == 0.0 {
            0.0
        } else {
            category_scores
                .iter()
                .map(|c| c.score * c.category.weight())
                .sum::<f64>()
                / total_weight
        };

        ConfidenceReport {
            category_scores,
            overall,
            grade: Grade::from_overall(overall),
        }
    }

    /// All seven categories at 100% coverage with no gaps: overall
    /// must be exactly 100 and grade A (spec §8 universal invariant).
    pub fn all_categories_full_coverage() -> Vec<CategoryCoverage> {
        [
            ScoreCategory::Config,
            ScoreCategory::MasterData,
            ScoreCategory::Transaction,
            ScoreCategory::Code,
            ScoreCategory::Security,
            ScoreCategory::Interface,
            ScoreCategory::Process,
        ]
        .into_iter()
        .map(|c| CategoryCoverage::new(c, 100.0))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_coverage_no_gaps_is_grade_a() {
        let inputs = ConfidenceScorer::all_categories_full_coverage();
        let report = ConfidenceScorer::new().score(&inputs);
        assert_eq!(report.overall, 100.0);
        assert_eq!(report.grade, Grade::A);
    }

    #[test]
    fn zero_coverage_is_grade_f() {
        let inputs: Vec<CategoryCoverage> = [
            ScoreCategory::Config,
            ScoreCategory::MasterData,
            ScoreCategory::Transaction,
            ScoreCategory::Code,
            ScoreCategory::Security,
            ScoreCategory::Interface,
            ScoreCategory::Process,
        ]
        .into_iter()
        .map(|c| CategoryCoverage::new(c, 0.0))
        .collect();
        let report = ConfidenceScorer::new().score(&inputs);
        assert_eq!(report.overall, 0.0);
        assert_eq!(report.grade, Grade::F);
    }

    #[test]
    fn penalties_clamp_and_compose_per_spec_example() {
        // Coverage 50%, 3 missing critical (-15), 1 auth gap (-3) = 32, clamped [0,100].
        let mut input = CategoryCoverage::new(ScoreCategory::Code, 50.0);
        input.missing_critical_tables = 3;
        input.authorization_gaps = 1;
        let report = ConfidenceScorer::new().score(&[input]);
        assert_eq!(report.category_score(ScoreCategory::Code), Some(32.0));
        assert_eq!(report.grade, Grade::F);
    }
}
