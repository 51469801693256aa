//! modguard Core
//!
//! Core types and error handling shared across the modguard moderation
//! pipeline.
//!
//! This crate provides:
//! - The analysis output model (`AnalysisResult`, `CategoryScore`, `PolicyMatch`)
//! - Training data types (`TrainingExample`, `TrainingProgress`)
//! - The moderation queue item model (`ModerationItem`, `ItemStatus`)
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    sort_categories, AnalysisPath, AnalysisResult, CategoryScore, ContextData, Decision,
    ExampleSource, ItemStatus, ModerationItem, PolicyMatch, SourceMetadata, TrainingExample,
    TrainingProgress,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        AnalysisResult, CategoryScore, Decision, ItemStatus, PolicyMatch, TrainingExample,
    };
}
