//! Request and response bodies for the HTTP API

use crate::charts::{ProbabilityRow, ShareRow};
use crate::handler::PredictionResult;
use emolens_core::EmotionCategory;
use emolens_telemetry::{CategoryCount, MetricsSnapshot, PageVisit, PredictionRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub result: PredictionResult,
    pub probabilities_chart: Vec<ProbabilityRow>,
    pub storage_warning: Option<String>,
}

/// One selectable category and its glyph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionInfo {
    pub name: EmotionCategory,
    pub glyph: String,
}

impl From<EmotionCategory> for EmotionInfo {
    fn from(category: EmotionCategory) -> Self {
        Self {
            name: category,
            glyph: category.glyph().to_string(),
        }
    }
}

/// The model behind the classifier, as reported by the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub label_table: String,
}

/// Monitor view of the visit log
#[derive(Debug, Clone, Serialize)]
pub struct VisitsReport {
    pub counts: Vec<CategoryCount>,
    pub chart: Vec<ShareRow>,
    pub records: Vec<PageVisit>,
}

/// Monitor view of the prediction log
#[derive(Debug, Clone, Serialize)]
pub struct PredictionsReport {
    pub counts: Vec<CategoryCount>,
    pub chart: Vec<ShareRow>,
    pub records: Vec<PredictionRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counters: MetricsSnapshot,
    pub avg_classification_latency_us: u64,
    pub success_rate: f64,
}

impl From<MetricsSnapshot> for StatsResponse {
    fn from(counters: MetricsSnapshot) -> Self {
        Self {
            avg_classification_latency_us: counters.avg_classification_latency_us(),
            success_rate: counters.success_rate(),
            counters,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: ModelInfo,
}
