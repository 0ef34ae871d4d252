//! Emotion classifier adapter
//!
//! Wraps a frozen [`TextModel`] and translates its raw output into the fixed
//! [`EmotionCategory`] set. The model is injected, so tests can substitute
//! their own.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier};
use crate::labels::LabelTable;
use crate::model::{ModelClass, TextModel};
use async_trait::async_trait;
use emolens_core::{EmotionCategory, EmotionScores, Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Slack for f32 rounding in the model's own normalisation
const DISTRIBUTION_TOLERANCE: f64 = 1e-3;

pub struct EmotionClassifier {
    model: Arc<dyn TextModel>,
    table: LabelTable,
    /// Category of each `predict_proba` column
    columns: Vec<EmotionCategory>,
}

impl EmotionClassifier {
    /// Bind a model to a label table, failing fast if its classes do not
    /// cover the nine categories exactly once
    pub fn new(model: Arc<dyn TextModel>, table: LabelTable) -> Result<Self> {
        let columns = table.column_mapping(model.classes())?;
        debug!(
            "Model '{}' bound to label table '{}'",
            model.name(),
            table.version()
        );
        Ok(Self {
            model,
            table,
            columns,
        })
    }

    pub fn label_table(&self) -> &LabelTable {
        &self.table
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    fn scores_from_row(&self, row: &[f32]) -> Result<EmotionScores> {
        if row.len() != self.columns.len() {
            return Err(Error::classifier(format!(
                "model returned {} probabilities, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        if let Some(bad) = row.iter().find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0) {
            return Err(Error::classifier(format!(
                "model returned invalid probability {bad}"
            )));
        }

        let scores = EmotionScores::from_pairs(
            self.columns
                .iter()
                .copied()
                .zip(row.iter().map(|p| f64::from(*p))),
        )
        .map_err(|e| Error::classifier(e.to_string()))?;

        if !scores.is_distribution(DISTRIBUTION_TOLERANCE) {
            return Err(Error::classifier(format!(
                "model probabilities sum to {}, expected 1",
                scores.sum()
            )));
        }
        Ok(scores)
    }
}

/// Run the frozen model on a single document
fn infer(model: &dyn TextModel, doc: &str) -> Result<(ModelClass, Vec<f32>)> {
    let docs = [doc];

    let predicted = model
        .predict(&docs)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::classifier("model returned no prediction"))?;
    let row = model
        .predict_proba(&docs)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::classifier("model returned no probabilities"))?;

    Ok((predicted, row))
}

#[async_trait]
impl Classifier for EmotionClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        // Inference is CPU-bound, so it runs on the blocking pool
        let model = self.model.clone();
        let doc = text.to_string();
        let (predicted, row) = tokio::task::spawn_blocking(move || infer(model.as_ref(), &doc))
            .await
            .map_err(|e| Error::classifier(format!("inference task failed: {e}")))??;

        let scores = self.scores_from_row(&row)?;
        let label = self.table.resolve(&predicted)?;

        if scores.get(label) < scores.confidence() {
            return Err(Error::classifier(format!(
                "model predicted '{label}' but '{}' has the highest probability",
                scores.argmax()
            )));
        }

        Ok(ClassificationResult {
            label,
            scores,
            metadata: ClassificationMetadata {
                model: Some(self.model.name().to_string()),
                predicted_class: Some(predicted),
                label_table: Some(self.table.version().to_string()),
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        "emotion"
    }
}
