//! Bag-of-words feature extraction for linear text models
//!
//! Mirrors the usual count/TF-IDF vectorizer behaviour: tokens are runs of two
//! or more word characters, optional lowercasing, space-joined word n-grams,
//! then optional binary/sublinear term frequency, IDF weighting and row
//! normalisation.

use emolens_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Row normalisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Serialized vectorizer state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerSpec {
    /// Term -> feature column
    pub vocabulary: HashMap<String, usize>,

    #[serde(default = "default_true")]
    pub lowercase: bool,

    /// Inclusive (min_n, max_n)
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Clip counts to 1
    #[serde(default)]
    pub binary: bool,

    /// Replace tf with 1 + ln(tf)
    #[serde(default)]
    pub sublinear_tf: bool,

    /// Per-feature inverse document frequency; absent means raw counts
    #[serde(default)]
    pub idf: Option<Vec<f32>>,

    #[serde(default)]
    pub norm: Option<Norm>,
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Validated vectorizer ready to transform text
#[derive(Debug, Clone)]
pub struct TextVectorizer {
    spec: VectorizerSpec,
    token_pattern: Regex,
    n_features: usize,
}

impl TextVectorizer {
    pub fn new(spec: VectorizerSpec) -> Result<Self> {
        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::classifier(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }

        let n_features = spec.vocabulary.len();
        if n_features == 0 {
            return Err(Error::classifier("vectorizer vocabulary is empty"));
        }

        let mut seen = vec![false; n_features];
        for (term, &column) in &spec.vocabulary {
            if column >= n_features || std::mem::replace(&mut seen[column], true) {
                return Err(Error::classifier(format!(
                    "vocabulary column {column} for '{term}' is out of range or duplicated"
                )));
            }
        }

        if let Some(idf) = &spec.idf {
            if idf.len() != n_features {
                return Err(Error::classifier(format!(
                    "idf has {} entries for {} features",
                    idf.len(),
                    n_features
                )));
            }
        }

        let token_pattern = Regex::new(TOKEN_PATTERN)
            .map_err(|e| Error::classifier(format!("Failed to build token pattern: {e}")))?;

        Ok(Self {
            spec,
            token_pattern,
            n_features,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Split text into tokens
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.spec.lowercase {
            std::borrow::Cow::Owned(text.to_lowercase())
        } else {
            std::borrow::Cow::Borrowed(text)
        };

        self.token_pattern
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Tokens followed by their n-grams, in the vectorizer's order
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenize(text);
        let (min_n, max_n) = self.spec.ngram_range;

        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Dense feature row for one document
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut row = vec![0.0f32; self.n_features];
        for term in self.analyze(text) {
            if let Some(&column) = self.spec.vocabulary.get(&term) {
                row[column] += 1.0;
            }
        }

        for value in row.iter_mut().filter(|v| **v > 0.0) {
            if self.spec.binary {
                *value = 1.0;
            } else if self.spec.sublinear_tf {
                *value = 1.0 + value.ln();
            }
        }

        if let Some(idf) = &self.spec.idf {
            for (value, weight) in row.iter_mut().zip(idf) {
                *value *= weight;
            }
        }

        let norm = match self.spec.norm {
            Some(Norm::L2) => row.iter().map(|v| v * v).sum::<f32>().sqrt(),
            Some(Norm::L1) => row.iter().map(|v| v.abs()).sum::<f32>(),
            None => 0.0,
        };
        if norm > 0.0 {
            for value in &mut row {
                *value /= norm;
            }
        }

        row
    }
}
