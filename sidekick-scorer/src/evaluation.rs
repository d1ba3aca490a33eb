//! Offline evaluation of recommendations against held-out items.
//!
//! Each query may name the item that was removed from the original order.
//! Recall@k is `1` when that item appears among the first `k`
//! recommendations and `0` otherwise, averaged over queries that carry a
//! ground truth. Ground-truth items outside the catalog can never be
//! recommended and so always score `0`.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use camino::Utf8Path;
use log::info;
use serde::{Deserialize, Serialize};
use sidekick_core::{PartialOrderQuery, Recommendation};
use sidekick_fs::write_file;

use crate::{Catalog, EvaluationError};

/// Number of entries kept in [`EvaluationReport::most_recommended`].
pub const TOP_RECOMMENDED: usize = 10;

const RECALL_DEPTHS: [usize; 3] = [1, 2, 3];

/// How often an item was recommended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFrequency {
    /// Item name.
    pub item: String,
    /// Number of recommendation lists containing it.
    pub count: usize,
}

/// Summary of a batch run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Mean Recall@1 over queries with ground truth.
    pub recall_at_1: f64,
    /// Mean Recall@2 over queries with ground truth.
    pub recall_at_2: f64,
    /// Mean Recall@3 over queries with ground truth.
    pub recall_at_3: f64,
    /// Number of queries evaluated.
    pub queries: usize,
    /// Number of queries naming a missing item.
    pub queries_with_ground_truth: usize,
    /// Ground-truth items absent from the catalog.
    pub ground_truth_outside_catalog: usize,
    /// Distinct recommended items divided by all recommendations.
    pub diversity: f64,
    /// Number of distinct items recommended.
    pub coverage: usize,
    /// Most frequently recommended items, most frequent first.
    pub most_recommended: Vec<ItemFrequency>,
    /// Queries answered from the popularity fallback.
    pub flagged: Vec<String>,
}

/// Accumulates per-query outcomes into an [`EvaluationReport`].
///
/// # Examples
/// ```
/// use sidekick_core::{
///     CategoryRules, ItemName, OrderId, PartialOrderQuery, Recommendation, RecommendationKind,
///     RecommendedItem,
/// };
/// use sidekick_scorer::{Catalog, Evaluator};
///
/// let name = |raw: &str| ItemName::new(raw).unwrap();
/// let catalog = Catalog::from_counts([(name("cola"), 3)], &CategoryRules::default());
/// let query = PartialOrderQuery::new(OrderId::new("q-1"), vec![name("wings")])
///     .with_expected_missing(name("Cola"));
/// let recommendation = Recommendation::new(
///     OrderId::new("q-1"),
///     vec![RecommendedItem::new(name("cola"), 0.8, RecommendationKind::Personalised)],
/// );
///
/// let mut evaluator = Evaluator::new(&catalog);
/// evaluator.record(&query, &recommendation);
/// assert_eq!(evaluator.finish().recall_at_3, 1.0);
/// ```
#[derive(Debug)]
pub struct Evaluator<'a> {
    catalog: &'a Catalog,
    hits: [usize; 3],
    queries: usize,
    with_truth: usize,
    outside_catalog: usize,
    recommended: usize,
    frequencies: BTreeMap<String, (String, usize)>,
    flagged: Vec<String>,
}

impl<'a> Evaluator<'a> {
    /// Start an evaluation against `catalog`.
    #[must_use]
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            hits: [0; 3],
            queries: 0,
            with_truth: 0,
            outside_catalog: 0,
            recommended: 0,
            frequencies: BTreeMap::new(),
            flagged: Vec::new(),
        }
    }

    /// Add one query and the recommendation produced for it.
    pub fn record(&mut self, query: &PartialOrderQuery, recommendation: &Recommendation) {
        self.queries = self.queries.saturating_add(1);
        if recommendation.flagged {
            self.flagged.push(query.id.to_string());
        }
        for name in recommendation.names() {
            self.recommended = self.recommended.saturating_add(1);
            let entry = self
                .frequencies
                .entry(name.folded())
                .or_insert_with(|| (name.to_string(), 0));
            entry.1 = entry.1.saturating_add(1);
        }

        let Some(truth) = query.expected_missing.as_ref() else {
            return;
        };
        self.with_truth = self.with_truth.saturating_add(1);
        if !self.catalog.contains(truth) {
            self.outside_catalog = self.outside_catalog.saturating_add(1);
            return;
        }
        for (hits, depth) in self.hits.iter_mut().zip(RECALL_DEPTHS) {
            if recommendation.hits(truth, depth) {
                *hits = hits.saturating_add(1);
            }
        }
    }

    /// Summarise everything recorded so far.
    #[must_use]
    pub fn finish(self) -> EvaluationReport {
        let [at_1, at_2, at_3] = self.hits.map(|hits| ratio(hits, self.with_truth));
        let coverage = self.frequencies.len();
        let mut most_recommended: Vec<ItemFrequency> = self
            .frequencies
            .into_values()
            .map(|(item, count)| ItemFrequency { item, count })
            .collect();
        most_recommended.sort_by(|left, right| {
            right
                .count
                .cmp(&left.count)
                .then_with(|| left.item.cmp(&right.item))
        });
        most_recommended.truncate(TOP_RECOMMENDED);

        let report = EvaluationReport {
            recall_at_1: at_1,
            recall_at_2: at_2,
            recall_at_3: at_3,
            queries: self.queries,
            queries_with_ground_truth: self.with_truth,
            ground_truth_outside_catalog: self.outside_catalog,
            diversity: ratio(coverage, self.recommended),
            coverage,
            most_recommended,
            flagged: self.flagged,
        };
        info!(
            "evaluated {} queries: recall@3 {:.3} over {} with ground truth, {} flagged",
            report.queries,
            report.recall_at_3,
            report.queries_with_ground_truth,
            report.flagged.len()
        );
        report
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "recall and diversity are ratios of counts"
)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0_f64;
    }
    numerator as f64 / denominator as f64
}

/// Write `report` to `path` as pretty-printed JSON.
///
/// # Errors
/// Returns [`EvaluationError::Serialise`] when encoding fails and
/// [`EvaluationError::WriteFile`] when the file cannot be written.
pub fn write_report(path: &Utf8Path, report: &EvaluationReport) -> Result<(), EvaluationError> {
    let bytes = serde_json::to_vec_pretty(report).map_err(|source| EvaluationError::Serialise {
        path: path.to_path_buf(),
        source,
    })?;
    write_file(path, &bytes).map_err(|source| EvaluationError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use sidekick_core::test_support::{item, query};
    use sidekick_core::{CategoryRules, OrderId, RecommendationKind, RecommendedItem};
    use tempfile::TempDir;

    #[fixture]
    fn catalog() -> Catalog {
        Catalog::from_counts(
            [
                (item("wings"), 9),
                (item("cola"), 7),
                (item("fries"), 5),
                (item("ranch dip"), 2),
            ],
            &CategoryRules::default(),
        )
    }

    fn answer(id: &str, items: &[&str]) -> Recommendation {
        let items = items
            .iter()
            .map(|raw| RecommendedItem::new(item(raw), 0.5, RecommendationKind::Personalised))
            .collect();
        Recommendation::new(OrderId::new(id), items)
    }

    #[rstest]
    #[case("cola", [1.0, 1.0, 1.0])]
    #[case("FRIES", [0.0, 1.0, 1.0])]
    #[case("ranch dip", [0.0, 0.0, 1.0])]
    #[case("wings", [0.0, 0.0, 0.0])]
    fn recall_depends_on_rank(catalog: Catalog, #[case] truth: &str, #[case] expected: [f64; 3]) {
        let mut evaluator = Evaluator::new(&catalog);
        let question = query("q-1", &["burger"]).with_expected_missing(item(truth));
        evaluator.record(&question, &answer("q-1", &["cola", "fries", "ranch dip"]));
        let report = evaluator.finish();
        assert_eq!(
            [report.recall_at_1, report.recall_at_2, report.recall_at_3],
            expected
        );
    }

    #[rstest]
    fn unknown_ground_truth_scores_zero(catalog: Catalog) {
        let mut evaluator = Evaluator::new(&catalog);
        let question = query("q-1", &["wings"]).with_expected_missing(item("pumpkin pie"));
        evaluator.record(&question, &answer("q-1", &["cola", "fries", "ranch dip"]));
        evaluator.record(&query("q-2", &["wings"]), &answer("q-2", &["cola"]));
        let report = evaluator.finish();
        assert_eq!(report.queries, 2);
        assert_eq!(report.queries_with_ground_truth, 1);
        assert_eq!(report.ground_truth_outside_catalog, 1);
        assert_eq!(report.recall_at_3, 0.0);
    }

    #[rstest]
    fn summarises_diversity_and_flags(catalog: Catalog) {
        let mut evaluator = Evaluator::new(&catalog);
        evaluator.record(&query("q-1", &["wings"]), &answer("q-1", &["cola", "fries"]));
        evaluator.record(
            &query("q-2", &["mystery"]),
            &answer("q-2", &["Cola", "wings"]).flagged(),
        );
        let report = evaluator.finish();
        assert_eq!(report.coverage, 3);
        assert_eq!(report.diversity, 0.75);
        assert_eq!(report.flagged, vec!["q-2".to_owned()]);
        assert_eq!(
            report.most_recommended.first(),
            Some(&ItemFrequency {
                item: "cola".to_owned(),
                count: 2
            })
        );
    }

    #[rstest]
    fn empty_runs_report_zeroes(catalog: Catalog) {
        let report = Evaluator::new(&catalog).finish();
        assert_eq!(report, EvaluationReport::default());
    }

    #[rstest]
    fn reports_are_written_as_json(catalog: Catalog) {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("reports/evaluation.json"))
            .expect("utf-8 temp path");
        let mut evaluator = Evaluator::new(&catalog);
        let question = query("q-1", &["wings"]).with_expected_missing(item("cola"));
        evaluator.record(&question, &answer("q-1", &["cola"]));
        write_report(&path, &evaluator.finish()).expect("write report");
        let written = std::fs::read_to_string(path.as_std_path()).expect("read report");
        let parsed: serde_json::Value = serde_json::from_str(&written).expect("valid json");
        assert_eq!(parsed["recall_at_3"], 1.0);
        assert_eq!(parsed["queries_with_ground_truth"], 1);
    }
}
