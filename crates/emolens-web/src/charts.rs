//! Chart-ready rows
//!
//! Pure reshaping of classifier output and monitor counts into the flat row
//! lists the page feeds to its bar and pie charts.

use emolens_core::{EmotionCategory, EmotionScores};
use emolens_telemetry::CategoryCount;
use serde::{Deserialize, Serialize};

/// One bar of the probability chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRow {
    pub emotion: EmotionCategory,
    pub glyph: String,
    pub probability: f64,
}

/// One slice of a pie chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRow {
    pub name: String,
    pub count: u64,
    /// Fraction of the total, in [0, 1]
    pub share: f64,
}

/// Probability of every category, in category order
pub fn probability_rows(scores: &EmotionScores) -> Vec<ProbabilityRow> {
    scores
        .iter()
        .map(|(emotion, probability)| ProbabilityRow {
            emotion,
            glyph: emotion.glyph().to_string(),
            probability,
        })
        .collect()
}

/// Attach each row's share of the total count.
///
/// Row order is preserved. An empty or all-zero input yields no rows.
pub fn share_rows(counts: &[CategoryCount]) -> Vec<ShareRow> {
    let total: u64 = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        return Vec::new();
    }

    counts
        .iter()
        .map(|c| ShareRow {
            name: c.name.clone(),
            count: c.count,
            share: c.count as f64 / total as f64,
        })
        .collect()
}
