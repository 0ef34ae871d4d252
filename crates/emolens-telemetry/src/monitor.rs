//! Count-by-category summaries for the monitor view

use crate::store::{PageVisit, PredictionRecord, Store};
use emolens_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// One row of a frequency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

/// Group equal items and count them.
///
/// Output is sorted by descending count. Items with equal counts keep the
/// order in which they first appeared in `items`.
pub fn count_first_seen<T, I>(items: I) -> Vec<(T, u64)>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut slots: HashMap<T, usize> = HashMap::new();
    let mut counts: Vec<(T, u64)> = Vec::new();

    for item in items {
        match slots.get(&item) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }

    // sort_by is stable, so first-seen order survives among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Recomputes summaries from a full scan of the store on every call
#[derive(Clone)]
pub struct MonitoringAggregator {
    store: Arc<dyn Store>,
}

impl MonitoringAggregator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Visits per page name
    pub fn aggregate_visits(&self) -> Result<Vec<CategoryCount>> {
        let visits = self.store.list_visits()?;
        debug!(rows = visits.len(), "Aggregating page visits");
        Ok(visit_counts(&visits))
    }

    /// Predictions per emotion label
    pub fn aggregate_predictions(&self) -> Result<Vec<CategoryCount>> {
        let predictions = self.store.list_predictions()?;
        debug!(rows = predictions.len(), "Aggregating predictions");
        Ok(prediction_counts(&predictions))
    }

    /// Raw visit log, insertion order
    pub fn visits(&self) -> Result<Vec<PageVisit>> {
        self.store.list_visits()
    }

    /// Raw prediction log, insertion order
    pub fn predictions(&self) -> Result<Vec<PredictionRecord>> {
        self.store.list_predictions()
    }
}

/// Visits per page name over an already-scanned log
pub fn visit_counts(visits: &[PageVisit]) -> Vec<CategoryCount> {
    to_rows(count_first_seen(visits.iter().map(|v| v.page_name.clone())))
}

/// Predictions per emotion label over an already-scanned log
pub fn prediction_counts(predictions: &[PredictionRecord]) -> Vec<CategoryCount> {
    to_rows(count_first_seen(
        predictions
            .iter()
            .map(|p| p.predicted_label.as_str().to_string()),
    ))
}

fn to_rows(counts: Vec<(String, u64)>) -> Vec<CategoryCount> {
    counts
        .into_iter()
        .map(|(name, count)| CategoryCount { name, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteStore;
    use emolens_core::{now_ist, EmotionCategory};
    use proptest::prelude::*;

    fn store() -> Arc<SqliteStore> {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        Arc::new(store)
    }

    #[test]
    fn test_count_first_seen_orders_by_count_then_first_seen() {
        let counts = count_first_seen(vec!["b", "a", "c", "a", "c", "d"]);
        assert_eq!(counts, vec![("a", 2), ("c", 2), ("b", 1), ("d", 1)]);
    }

    #[test]
    fn test_count_first_seen_empty() {
        let counts: Vec<(u8, u64)> = count_first_seen(Vec::new());
        assert!(counts.is_empty());
    }

    #[test]
    fn test_aggregate_predictions() {
        let store = store();
        for label in [EmotionCategory::Joy, EmotionCategory::Joy, EmotionCategory::Anger] {
            store.record_prediction("text", label, 0.7, now_ist()).unwrap();
        }

        let aggregator = MonitoringAggregator::new(store);
        assert_eq!(
            aggregator.aggregate_predictions().unwrap(),
            vec![
                CategoryCount {
                    name: "joy".to_string(),
                    count: 2
                },
                CategoryCount {
                    name: "anger".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_counts_over_scanned_records() {
        let visits: Vec<PageVisit> = ["Home", "Monitor", "Home"]
            .into_iter()
            .map(|page| PageVisit {
                page_name: page.to_string(),
                visited_at: now_ist(),
            })
            .collect();
        assert_eq!(
            visit_counts(&visits),
            vec![
                CategoryCount {
                    name: "Home".to_string(),
                    count: 2
                },
                CategoryCount {
                    name: "Monitor".to_string(),
                    count: 1
                },
            ]
        );

        let predictions = vec![PredictionRecord {
            raw_text: "ugh".to_string(),
            predicted_label: EmotionCategory::Disgust,
            confidence: 0.4,
            predicted_at: now_ist(),
        }];
        assert_eq!(prediction_counts(&predictions)[0].name, "disgust");
        assert!(visit_counts(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_visits_tie_keeps_scan_order() {
        let store = store();
        for page in ["Monitor", "Home", "Home", "Monitor", "About"] {
            store.record_visit(page, now_ist()).unwrap();
        }

        let names: Vec<(String, u64)> = MonitoringAggregator::new(store)
            .aggregate_visits()
            .unwrap()
            .into_iter()
            .map(|row| (row.name, row.count))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Monitor".to_string(), 2),
                ("Home".to_string(), 2),
                ("About".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_aggregates_are_recomputed() {
        let store = store();
        let aggregator = MonitoringAggregator::new(store.clone());
        assert!(aggregator.aggregate_visits().unwrap().is_empty());

        store.record_visit("Home", now_ist()).unwrap();
        assert_eq!(aggregator.aggregate_visits().unwrap()[0].count, 1);
    }

    proptest! {
        #[test]
        fn prop_counts_sum_to_input_len(items in prop::collection::vec(0u8..6, 0..64)) {
            let counts = count_first_seen(items.clone());
            let total: u64 = counts.iter().map(|(_, c)| *c).sum();
            prop_assert_eq!(total, items.len() as u64);
        }

        #[test]
        fn prop_counts_are_sorted_and_ties_first_seen(items in prop::collection::vec(0u8..6, 0..64)) {
            let counts = count_first_seen(items.clone());
            let first_seen = |value: u8| items.iter().position(|x| *x == value).unwrap();

            for pair in counts.windows(2) {
                let (a, ca) = pair[0];
                let (b, cb) = pair[1];
                prop_assert!(ca >= cb);
                if ca == cb {
                    prop_assert!(first_seen(a) < first_seen(b));
                }
            }
        }

        #[test]
        fn prop_each_value_counted_once(items in prop::collection::vec(0u8..6, 0..64)) {
            let counts = count_first_seen(items.clone());
            for (value, count) in &counts {
                let expected = items.iter().filter(|x| *x == value).count() as u64;
                prop_assert_eq!(*count, expected);
            }
            let mut distinct = items.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(counts.len(), distinct.len());
        }
    }
}
