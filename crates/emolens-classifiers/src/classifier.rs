//! Classifier trait and common types

use async_trait::async_trait;
use emolens_core::{EmotionCategory, EmotionScores, Result};

use crate::model::ModelClass;

/// Trait for all emotion classifiers
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Best category, always an argmax of `scores`
    pub label: EmotionCategory,

    /// Probability for each of the nine categories
    pub scores: EmotionScores,

    /// Additional metadata
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: EmotionCategory, scores: EmotionScores) -> Self {
        Self {
            label,
            scores,
            metadata: ClassificationMetadata::default(),
            latency_us: 0,
        }
    }

    /// Maximum probability across categories
    pub fn confidence(&self) -> f64 {
        self.scores.get(self.label)
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationMetadata {
    /// Model name or version
    pub model: Option<String>,

    /// Raw class value the model predicted, before label mapping
    pub predicted_class: Option<ModelClass>,

    /// Label table version used for the mapping
    pub label_table: Option<String>,
}
