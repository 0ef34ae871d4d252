//! Frozen text model contract
//!
//! A model is loaded once at process start and then only queried. Columns of
//! `predict_proba` are ordered like [`TextModel::classes`].

use emolens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A class value as the model knows it: a numeric index into the training
/// label list, or the label text itself
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelClass {
    Index(usize),
    Label(String),
}

impl fmt::Display for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(idx) => write!(f, "{idx}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Opaque pre-trained text model
pub trait TextModel: Send + Sync {
    /// Model name or version
    fn name(&self) -> &str;

    /// Class ordering of `predict_proba` columns
    fn classes(&self) -> &[ModelClass];

    /// Per-class probabilities for each document
    fn predict_proba(&self, docs: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Single best class for each document
    fn predict(&self, docs: &[&str]) -> Result<Vec<ModelClass>> {
        let classes = self.classes();
        self.predict_proba(docs)?
            .iter()
            .map(|row| {
                argmax(row)
                    .and_then(|idx| classes.get(idx).cloned())
                    .ok_or_else(|| {
                        Error::classifier(format!(
                            "model '{}' returned {} probabilities for {} classes",
                            self.name(),
                            row.len(),
                            classes.len()
                        ))
                    })
            })
            .collect()
    }
}

/// Index of the largest value; ties go to the earliest index
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, value) in values.iter().enumerate() {
        match best {
            Some(b) if *value <= values[b] => {}
            _ if value.is_nan() => {}
            _ => best = Some(idx),
        }
    }
    best
}
