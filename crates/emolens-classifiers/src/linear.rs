//! Linear text model evaluated with Candle
//!
//! The artifact is a JSON dump of a fitted vectorizer + logistic regression:
//!
//! ```json
//! {
//!   "format": "emolens-linear-v1",
//!   "name": "emotion-lr",
//!   "classes": [0, 1, 2, 3, 4, 5, 6, 7, 8],
//!   "multi_class": "multinomial",
//!   "vectorizer": { "vocabulary": { "happy": 0 }, "norm": "l2" },
//!   "coef": [[0.1], ...],
//!   "intercept": [0.0, ...]
//! }
//! ```

use crate::model::{ModelClass, TextModel};
use crate::vectorizer::{TextVectorizer, VectorizerSpec};
use candle_core::{Device, Tensor, D};
use emolens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Artifact format tag this loader understands
pub const ARTIFACT_FORMAT: &str = "emolens-linear-v1";

/// How class scores become probabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// softmax over logits
    #[default]
    Multinomial,
    /// one-vs-rest sigmoids, normalised per row
    Ovr,
}

/// Device type for inference.
///
/// Deserialises from `cpu`, `cuda`, `metal` (device 0), `cuda:1`, or the
/// indexed map form `{cuda: 1}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "DeviceRepr")]
pub enum DeviceType {
    /// CPU inference (always available)
    #[default]
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize),
    /// Metal (Apple Silicon)
    Metal(usize),
}

impl FromStr for DeviceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        let (kind, index) = match s.split_once(':') {
            Some((kind, index)) => {
                let index = index
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Error::config(format!("invalid device index in '{s}'")))?;
                (kind.trim(), index)
            }
            None => (s.as_str(), 0),
        };

        match kind {
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda(index)),
            "metal" => Ok(Self::Metal(index)),
            other => Err(Error::config(format!(
                "unknown device '{other}', expected cpu, cuda or metal"
            ))),
        }
    }
}

/// Accepted spellings of a device in config files
#[derive(Deserialize)]
#[serde(untagged)]
enum DeviceRepr {
    Name(String),
    Indexed(IndexedDevice),
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum IndexedDevice {
    Cuda(usize),
    Metal(usize),
}

impl TryFrom<DeviceRepr> for DeviceType {
    type Error = Error;

    fn try_from(repr: DeviceRepr) -> Result<Self> {
        match repr {
            DeviceRepr::Name(name) => name.parse(),
            DeviceRepr::Indexed(IndexedDevice::Cuda(index)) => Ok(Self::Cuda(index)),
            DeviceRepr::Indexed(IndexedDevice::Metal(index)) => Ok(Self::Metal(index)),
        }
    }
}

impl DeviceType {
    fn create_device(self) -> Result<Device> {
        match self {
            Self::Cpu => Ok(Device::Cpu),
            Self::Cuda(idx) => Device::new_cuda(idx)
                .map_err(|e| Error::classifier(format!("Failed to create CUDA device {idx}: {e}"))),
            Self::Metal(idx) => Device::new_metal(idx)
                .map_err(|e| Error::classifier(format!("Failed to create Metal device {idx}: {e}"))),
        }
    }
}

/// Serialized model, as read from disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_format")]
    pub format: String,

    pub name: String,

    /// Column ordering of probabilities
    pub classes: Vec<ModelClass>,

    #[serde(default)]
    pub multi_class: MultiClass,

    pub vectorizer: VectorizerSpec,

    /// One row of feature weights per class
    pub coef: Vec<Vec<f32>>,

    /// One bias per class
    pub intercept: Vec<f32>,
}

fn default_format() -> String {
    ARTIFACT_FORMAT.to_string()
}

impl ModelArtifact {
    /// Read an artifact from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::classifier(format!("Failed to read model artifact {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::classifier(format!("Failed to parse model artifact: {e}")))
    }
}

/// Loaded linear model with weights resident on a Candle device
pub struct LinearTextModel {
    name: String,
    classes: Vec<ModelClass>,
    multi_class: MultiClass,
    vectorizer: TextVectorizer,
    /// (n_features, n_classes)
    weights: Tensor,
    /// (n_classes,)
    bias: Tensor,
    device: Device,
}

impl LinearTextModel {
    /// Load from a JSON artifact on disk
    pub fn load(path: impl AsRef<Path>, device: DeviceType) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading linear text model from {}", path.display());
        let artifact = ModelArtifact::from_file(path)?;
        Self::from_artifact(artifact, device)
    }

    /// Validate an artifact and move its weights onto the device
    pub fn from_artifact(artifact: ModelArtifact, device: DeviceType) -> Result<Self> {
        if artifact.format != ARTIFACT_FORMAT {
            return Err(Error::classifier(format!(
                "unsupported model format '{}', expected '{ARTIFACT_FORMAT}'",
                artifact.format
            )));
        }

        let n_classes = artifact.classes.len();
        if n_classes == 0 {
            return Err(Error::classifier("model has no classes"));
        }
        if artifact.coef.len() != n_classes || artifact.intercept.len() != n_classes {
            return Err(Error::classifier(format!(
                "model '{}' has {} classes but {} coef rows and {} intercepts",
                artifact.name,
                n_classes,
                artifact.coef.len(),
                artifact.intercept.len()
            )));
        }

        let vectorizer = TextVectorizer::new(artifact.vectorizer)?;
        let n_features = vectorizer.n_features();
        if let Some(row) = artifact.coef.iter().find(|row| row.len() != n_features) {
            return Err(Error::classifier(format!(
                "coef row has {} weights, vocabulary has {} features",
                row.len(),
                n_features
            )));
        }

        // Store transposed so inference is a plain (docs x features) . (features x classes).
        let mut transposed = vec![0.0f32; n_features * n_classes];
        for (class_idx, row) in artifact.coef.iter().enumerate() {
            for (feature_idx, weight) in row.iter().enumerate() {
                transposed[feature_idx * n_classes + class_idx] = *weight;
            }
        }

        let device = device.create_device()?;
        let weights = Tensor::from_vec(transposed, (n_features, n_classes), &device)
            .map_err(candle_err)?;
        let bias = Tensor::from_vec(artifact.intercept, n_classes, &device).map_err(candle_err)?;

        debug!(
            "Model '{}' ready: {} features, {} classes, {:?}",
            artifact.name, n_features, n_classes, artifact.multi_class
        );

        Ok(Self {
            name: artifact.name,
            classes: artifact.classes,
            multi_class: artifact.multi_class,
            vectorizer,
            weights,
            bias,
            device,
        })
    }

    pub fn n_features(&self) -> usize {
        self.vectorizer.n_features()
    }

    fn features(&self, docs: &[&str]) -> Result<Tensor> {
        let n_features = self.vectorizer.n_features();
        let mut flat = Vec::with_capacity(docs.len() * n_features);
        for doc in docs {
            flat.extend(self.vectorizer.transform(doc));
        }
        Tensor::from_vec(flat, (docs.len(), n_features), &self.device).map_err(candle_err)
    }
}

impl TextModel for LinearTextModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn classes(&self) -> &[ModelClass] {
        &self.classes
    }

    fn predict_proba(&self, docs: &[&str]) -> Result<Vec<Vec<f32>>> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let x = self.features(docs)?;
        let logits = x
            .matmul(&self.weights)
            .and_then(|l| l.broadcast_add(&self.bias))
            .map_err(candle_err)?;

        let probs = match self.multi_class {
            MultiClass::Multinomial => candle_nn::ops::softmax(&logits, D::Minus1),
            MultiClass::Ovr => candle_nn::ops::sigmoid(&logits).and_then(|s| {
                let total = s.sum_keepdim(D::Minus1)?;
                s.broadcast_div(&total)
            }),
        }
        .map_err(candle_err)?;

        probs.to_vec2::<f32>().map_err(candle_err)
    }
}

fn candle_err(e: candle_core::Error) -> Error {
    Error::classifier(format!("inference failed: {e}"))
}
