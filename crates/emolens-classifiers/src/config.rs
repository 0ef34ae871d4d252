//! Model settings and classifier construction

use crate::emotion::EmotionClassifier;
use crate::labels::LabelTable;
use crate::lexicon::LexiconModel;
use crate::linear::{DeviceType, LinearTextModel};
use crate::model::TextModel;
use emolens_core::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Where the frozen model comes from and how to read its classes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// JSON artifact; when absent the built-in lexicon model is used
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Device to run inference on
    #[serde(default)]
    pub device: DeviceType,

    /// Label table version the model was trained with
    #[serde(default = "default_label_table")]
    pub label_table: String,
}

fn default_label_table() -> String {
    LabelTable::V1.to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: None,
            device: DeviceType::Cpu,
            label_table: default_label_table(),
        }
    }
}

/// Load the frozen model described by `settings`
pub fn load_text_model(settings: &ModelSettings) -> Result<Arc<dyn TextModel>> {
    match &settings.path {
        Some(path) => Ok(Arc::new(LinearTextModel::load(path, settings.device)?)),
        None => {
            warn!("No model artifact configured, falling back to the emotion lexicon");
            Ok(Arc::new(LexiconModel::new()?))
        }
    }
}

/// Load the model and bind it to its label table
pub fn build_classifier(settings: &ModelSettings) -> Result<EmotionClassifier> {
    let table = LabelTable::by_version(&settings.label_table)?;
    let model = load_text_model(settings)?;
    let classifier = EmotionClassifier::new(model, table)?;
    info!(
        "Emotion classifier ready (model '{}', labels '{}')",
        classifier.model_name(),
        classifier.label_table().version()
    );
    Ok(classifier)
}
