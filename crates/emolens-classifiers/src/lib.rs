//! EmoLens Classifiers
//!
//! Turns a frozen, pre-trained text model into an emotion classifier.
//!
//! The pieces, leaves first:
//! - [`TextModel`]: the opaque model contract (`classes`, `predict`, `predict_proba`)
//! - [`LinearTextModel`]: bag-of-words / TF-IDF + logistic regression artifact, evaluated with Candle
//! - [`LexiconModel`]: keyword fallback used when no artifact is configured
//! - [`LabelTable`]: explicit, versioned mapping from model classes to emotion categories
//! - [`EmotionClassifier`]: the adapter implementing [`Classifier`]

pub mod classifier;
pub mod config;
pub mod emotion;
pub mod labels;
pub mod lexicon;
pub mod linear;
pub mod model;
pub mod vectorizer;

pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier};
pub use config::{build_classifier, load_text_model, ModelSettings};
pub use emotion::EmotionClassifier;
pub use labels::LabelTable;
pub use lexicon::LexiconModel;
pub use linear::{DeviceType, LinearTextModel, ModelArtifact, MultiClass};
pub use model::{ModelClass, TextModel};
pub use vectorizer::{Norm, TextVectorizer, VectorizerSpec};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::emotion::EmotionClassifier;
    pub use crate::labels::LabelTable;
    pub use crate::model::{ModelClass, TextModel};
}
