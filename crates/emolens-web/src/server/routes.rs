use crate::charts::{probability_rows, share_rows};
use crate::models::{
    EmotionInfo, HealthResponse, PredictRequest, PredictResponse, PredictionsReport,
    StatsResponse, VisitsReport,
};
use crate::server::static_files;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use emolens_core::{now_ist, EmotionCategory, Error};
use emolens_telemetry::{prediction_counts, visit_counts};
use serde_json::json;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

// ============================================================================
// Pages
// ============================================================================

pub const HOME_PAGE: &str = "Home";
pub const MONITOR_PAGE: &str = "Monitor";

pub async fn home_page(State(state): State<AppState>) -> Response {
    record_page_visit(&state, HOME_PAGE).await;
    static_files::serve_page()
}

pub async fn monitor_page(State(state): State<AppState>) -> Response {
    record_page_visit(&state, MONITOR_PAGE).await;
    static_files::serve_page()
}

/// A visit that fails to log must not stop the page from rendering
async fn record_page_visit(state: &AppState, page: &str) {
    if let Err(e) = state.handler.record_visit(page, now_ist()).await {
        warn!("Failed to record visit to {}: {}", page, e);
    }
}

// ============================================================================
// Classification
// ============================================================================

pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let span = info_span!("submission", request_id = %Uuid::new_v4());
    let submission = state
        .handler
        .handle_submission(&req.text, now_ist())
        .instrument(span)
        .await?;

    Ok(Json(PredictResponse {
        probabilities_chart: probability_rows(&submission.result.probabilities),
        result: submission.result,
        storage_warning: submission.storage_warning,
    }))
}

pub async fn list_emotions() -> Json<Vec<EmotionInfo>> {
    Json(
        EmotionCategory::ALL
            .iter()
            .copied()
            .map(EmotionInfo::from)
            .collect(),
    )
}

// ============================================================================
// Monitor
// ============================================================================

pub async fn monitor_visits(State(state): State<AppState>) -> Result<Json<VisitsReport>, AppError> {
    let aggregator = state.aggregator.clone();
    let report = tokio::task::spawn_blocking(move || {
        let records = aggregator.visits()?;
        let counts = visit_counts(&records);
        Ok::<_, Error>(VisitsReport {
            chart: share_rows(&counts),
            counts,
            records,
        })
    })
    .await
    .map_err(|e| Error::internal(format!("monitor task failed: {e}")))??;

    Ok(Json(report))
}

pub async fn monitor_predictions(
    State(state): State<AppState>,
) -> Result<Json<PredictionsReport>, AppError> {
    let aggregator = state.aggregator.clone();
    let report = tokio::task::spawn_blocking(move || {
        let records = aggregator.predictions()?;
        let counts = prediction_counts(&records);
        Ok::<_, Error>(PredictionsReport {
            chart: share_rows(&counts),
            counts,
            records,
        })
    })
    .await
    .map_err(|e| Error::internal(format!("monitor task failed: {e}")))??;

    Ok(Json(report))
}

// ============================================================================
// Health and statistics
// ============================================================================

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.model.as_ref().clone(),
    })
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.metrics.snapshot().into())
}

pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

// ============================================================================
// Errors
// ============================================================================

/// Error response: `{"error": {"message", "type"}}`
#[derive(Debug)]
pub struct AppError(Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Classifier(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }

        let body = json!({
            "error": {
                "message": self.0.to_string(),
                "type": format!("{}_error", self.0.kind()),
            }
        });

        (status, Json(body)).into_response()
    }
}
