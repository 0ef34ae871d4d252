//! Emotion categories and per-category probability vectors

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The closed set of emotions the classifier can output.
///
/// Declaration order is the canonical label order; [`EmotionCategory::index`]
/// is the position in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionCategory {
    Anger,
    Disgust,
    Fear,
    Guilt,
    Joy,
    Love,
    Sadness,
    Shame,
    Surprise,
}

impl EmotionCategory {
    /// Number of categories
    pub const COUNT: usize = 9;

    /// All categories in canonical order
    pub const ALL: [EmotionCategory; Self::COUNT] = [
        Self::Anger,
        Self::Disgust,
        Self::Fear,
        Self::Guilt,
        Self::Joy,
        Self::Love,
        Self::Sadness,
        Self::Shame,
        Self::Surprise,
    ];

    /// Lowercase label as stored and displayed
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anger => "anger",
            Self::Disgust => "disgust",
            Self::Fear => "fear",
            Self::Guilt => "guilt",
            Self::Joy => "joy",
            Self::Love => "love",
            Self::Sadness => "sadness",
            Self::Shame => "shame",
            Self::Surprise => "surprise",
        }
    }

    /// Display glyph shown next to the label
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Anger => "😠",
            Self::Disgust => "🤮",
            Self::Fear => "😨😱",
            Self::Guilt => "😔",
            Self::Joy => "😂",
            Self::Love => "❤️",
            Self::Sadness => "😔",
            Self::Shame => "😳",
            Self::Surprise => "😮",
        }
    }

    /// Position in canonical order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Category at a canonical position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for EmotionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::validation(format!("unknown emotion label '{s}'")))
    }
}

/// Probability for every emotion category.
///
/// Always holds exactly one value per category. Serializes as a
/// `{"anger": 0.1, ...}` object in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<EmotionCategory, f64>",
    into = "BTreeMap<EmotionCategory, f64>"
)]
pub struct EmotionScores {
    values: [f64; EmotionCategory::COUNT],
}

impl EmotionScores {
    /// Build from values in canonical category order
    pub fn new(values: [f64; EmotionCategory::COUNT]) -> Self {
        Self { values }
    }

    /// Equal probability for every category
    pub fn uniform() -> Self {
        Self::new([1.0 / EmotionCategory::COUNT as f64; EmotionCategory::COUNT])
    }

    /// Build from (category, probability) pairs; every category must appear exactly once
    pub fn from_pairs(pairs: impl IntoIterator<Item = (EmotionCategory, f64)>) -> Result<Self> {
        let mut values = [0.0; EmotionCategory::COUNT];
        let mut seen = [false; EmotionCategory::COUNT];

        for (category, value) in pairs {
            let idx = category.index();
            if seen[idx] {
                return Err(Error::validation(format!(
                    "duplicate probability for '{category}'"
                )));
            }
            seen[idx] = true;
            values[idx] = value;
        }

        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(Error::validation(format!(
                "missing probability for '{}'",
                EmotionCategory::ALL[missing]
            )));
        }

        Ok(Self { values })
    }

    /// Probability of one category
    pub fn get(&self, category: EmotionCategory) -> f64 {
        self.values[category.index()]
    }

    /// (category, probability) in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (EmotionCategory, f64)> + '_ {
        EmotionCategory::ALL
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Category with the highest probability; ties go to the earliest category
    pub fn argmax(&self) -> EmotionCategory {
        let mut best = 0;
        for (idx, value) in self.values.iter().enumerate().skip(1) {
            if *value > self.values[best] {
                best = idx;
            }
        }
        EmotionCategory::ALL[best]
    }

    /// Maximum probability across categories
    pub fn confidence(&self) -> f64 {
        self.get(self.argmax())
    }

    /// Sum of all probabilities
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// True when every value is finite, within [0, 1], and the total is 1 within `tolerance`
    pub fn is_distribution(&self, tolerance: f64) -> bool {
        self.values
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
            && (self.sum() - 1.0).abs() <= tolerance
    }
}

impl TryFrom<BTreeMap<EmotionCategory, f64>> for EmotionScores {
    type Error = Error;

    fn try_from(map: BTreeMap<EmotionCategory, f64>) -> Result<Self> {
        Self::from_pairs(map)
    }
}

impl From<EmotionScores> for BTreeMap<EmotionCategory, f64> {
    fn from(scores: EmotionScores) -> Self {
        scores.iter().collect()
    }
}
