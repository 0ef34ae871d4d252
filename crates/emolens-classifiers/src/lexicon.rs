//! Lightweight emotion lexicon model
//!
//! This is a keyword-based model used when no trained artifact is loaded.

use crate::model::{ModelClass, TextModel};
use aho_corasick::{AhoCorasick, MatchKind};
use emolens_core::{EmotionCategory, Error, Result};

/// Additive smoothing per category
const SMOOTHING: f32 = 0.5;

fn keywords(category: EmotionCategory) -> &'static [&'static str] {
    match category {
        EmotionCategory::Anger => &[
            "angry", "anger", "furious", "rage", "mad", "annoyed", "irritated", "hate", "outraged",
        ],
        EmotionCategory::Disgust => &[
            "disgust", "disgusted", "disgusting", "gross", "revolting", "nasty", "sickening",
            "repulsive",
        ],
        EmotionCategory::Fear => &[
            "afraid", "scared", "fear", "terrified", "frightened", "anxious", "nervous", "panic",
            "worried",
        ],
        EmotionCategory::Guilt => &[
            "guilty", "guilt", "regret", "sorry", "apologize", "blame", "fault", "remorse",
        ],
        EmotionCategory::Joy => &[
            "happy", "joy", "glad", "delighted", "excited", "cheerful", "great", "wonderful",
            "fun", "laugh",
        ],
        EmotionCategory::Love => &[
            "love", "adore", "darling", "sweetheart", "affection", "cherish", "romantic",
            "beloved",
        ],
        EmotionCategory::Sadness => &[
            "sad", "unhappy", "depressed", "cry", "crying", "lonely", "miserable", "grief",
            "heartbroken", "tears",
        ],
        EmotionCategory::Shame => &[
            "ashamed", "shame", "embarrassed", "humiliated", "mortified", "disgrace",
        ],
        EmotionCategory::Surprise => &[
            "surprised", "surprise", "amazed", "astonished", "shocked", "unexpected", "wow",
            "stunned",
        ],
    }
}

pub struct LexiconModel {
    name: String,
    classes: Vec<ModelClass>,
    matcher: AhoCorasick,
    /// Pattern id -> column
    pattern_columns: Vec<usize>,
}

impl LexiconModel {
    pub fn new() -> Result<Self> {
        Self::with_name("emotion-lexicon")
    }

    pub fn with_name(name: impl Into<String>) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut pattern_columns = Vec::new();
        for (column, category) in EmotionCategory::ALL.iter().enumerate() {
            for word in keywords(*category) {
                patterns.push(*word);
                pattern_columns.push(column);
            }
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(patterns)
            .map_err(|e| Error::classifier(format!("Failed to build emotion lexicon: {e}")))?;

        Ok(Self {
            name: name.into(),
            classes: EmotionCategory::ALL
                .iter()
                .map(|c| ModelClass::Label(c.to_string()))
                .collect(),
            matcher,
            pattern_columns,
        })
    }

    fn hits(&self, text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();
        let mut hits = vec![0.0f32; self.classes.len()];

        for m in self.matcher.find_iter(text) {
            let before = m.start().checked_sub(1).map(|i| bytes[i]);
            let after = bytes.get(m.end()).copied();
            let is_word_char = |b: Option<u8>| b.is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_');
            if is_word_char(before) || is_word_char(after) {
                continue;
            }
            hits[self.pattern_columns[m.pattern().as_usize()]] += 1.0;
        }

        hits
    }
}

impl TextModel for LexiconModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn classes(&self) -> &[ModelClass] {
        &self.classes
    }

    fn predict_proba(&self, docs: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(docs
            .iter()
            .map(|doc| {
                let hits = self.hits(doc);
                let total: f32 = hits.iter().sum::<f32>() + SMOOTHING * hits.len() as f32;
                hits.iter().map(|h| (h + SMOOTHING) / total).collect()
            })
            .collect())
    }
}
