//! Append-only log contract

use emolens_core::{EmotionCategory, Result, Timestamp};
use serde::{Deserialize, Serialize};

/// One page render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageVisit {
    pub page_name: String,
    pub visited_at: Timestamp,
}

/// One successful classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub raw_text: String,
    pub predicted_label: EmotionCategory,
    /// Maximum class probability, in [0, 1]
    pub confidence: f64,
    pub predicted_at: Timestamp,
}

/// Durable visit and prediction logs.
///
/// Create and read only: there is no update or delete. Implementations must
/// serialise writers and make every `record_*` call its own atomic
/// transaction.
pub trait Store: Send + Sync {
    /// Create the underlying tables if absent. Safe to call on every start.
    fn ensure_schema(&self) -> Result<()>;

    fn record_visit(&self, page_name: &str, visited_at: Timestamp) -> Result<()>;

    fn record_prediction(
        &self,
        raw_text: &str,
        label: EmotionCategory,
        confidence: f64,
        predicted_at: Timestamp,
    ) -> Result<()>;

    /// Every visit, in insertion order
    fn list_visits(&self) -> Result<Vec<PageVisit>>;

    /// Every prediction, in insertion order
    fn list_predictions(&self) -> Result<Vec<PredictionRecord>>;
}
