//! EmoLens Core
//!
//! Core types and utilities shared across EmoLens components.
//!
//! This crate provides:
//! - The closed set of emotion categories and their display glyphs
//! - Per-category probability vectors
//! - Fixed-timezone timestamps used by every log record
//! - Error types and result handling

pub mod error;
pub mod time;
pub mod types;

pub use error::{Error, Result};
pub use time::{ist, now_ist, Timestamp};
pub use types::{EmotionCategory, EmotionScores};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::time::{now_ist, Timestamp};
    pub use crate::types::{EmotionCategory, EmotionScores};
}
