//! Core types for modguard
//!
//! Field names and enum strings on the serialized forms are consumed by the
//! dashboard and must stay stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Terminal moderation verdict for one analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Flagged,
    Rejected,
}

impl Decision {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Flagged => "flagged",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approved" => Ok(Self::Approved),
            "flagged" => Ok(Self::Flagged),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown decision '{other}'")),
        }
    }
}

/// A [0,1] confidence that content matches one harm category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    pub score: f32,
    pub explanation: String,
}

impl CategoryScore {
    pub fn new(name: impl Into<String>, score: f32, explanation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: score.clamp(0.0, 1.0),
            explanation: explanation.into(),
        }
    }
}

/// Sort category scores descending by score.
///
/// The sort is stable: equal scores keep their construction order.
pub fn sort_categories(categories: &mut [CategoryScore]) {
    categories.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// A knowledge-base entry deemed relevant to an input text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyMatch {
    pub policy_name: String,
    pub relevance: f32,
    pub description: String,
}

/// Result of analysing one piece of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub decision: Decision,

    /// Human-readable justification
    pub reasoning: String,

    /// Sorted descending by score, never empty
    pub categories: Vec<CategoryScore>,

    pub detected_topics: Vec<String>,

    /// At most three entries, descending relevance
    pub policy_references: Vec<PolicyMatch>,

    /// Present only when the decision is not `approved`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<String>>,
}

impl AnalysisResult {
    /// Highest-scoring category, if any
    pub fn highest_category(&self) -> Option<&CategoryScore> {
        self.categories.first()
    }

    /// Score for a category by case-insensitive name
    pub fn score_of(&self, name: &str) -> Option<f32> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.score)
    }
}

/// Which classification path produced an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisPath {
    Model,
    Heuristic,
}

impl AnalysisPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Heuristic => "heuristic",
        }
    }
}

/// Where a piece of content or a training example came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExampleSource {
    #[default]
    Manual,
    Twitter,
    Csv,
}

/// Twitter context captured alongside a training example.
///
/// Stored for reference only; nothing in the scoring path reads it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextData {
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

/// A labeled content sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingExample {
    pub content: String,
    pub label: Decision,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    #[serde(default)]
    pub source: ExampleSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_data: Option<ContextData>,
}

impl TrainingExample {
    /// Create a manually entered example
    pub fn new(content: impl Into<String>, label: Decision) -> Self {
        Self {
            content: content.into(),
            label,
            categories: None,
            source: ExampleSource::Manual,
            context_data: None,
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn with_source(mut self, source: ExampleSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_context(mut self, context: ContextData) -> Self {
        self.context_data = Some(context);
        self
    }
}

/// Observable state of the training session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingProgress {
    pub in_progress: bool,
    pub progress_percent: u8,
    pub trained: bool,
}

/// Review status of a moderation item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Approved,
    Flagged,
    Rejected,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Flagged => "flagged",
            Self::Rejected => "rejected",
        }
    }
}

impl From<Decision> for ItemStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => Self::Approved,
            Decision::Flagged => Self::Flagged,
            Decision::Rejected => Self::Rejected,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            other => other.parse::<Decision>().map(Self::from),
        }
    }
}

/// Origin details supplied by the ingestion collaborator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetadata {
    #[serde(default)]
    pub origin: ExampleSource,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub handle: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,
}

impl SourceMetadata {
    /// Metadata for content typed in by a moderator
    pub fn manual() -> Self {
        Self {
            origin: ExampleSource::Manual,
            author: "Test User".to_string(),
            handle: "testuser".to_string(),
            ..Default::default()
        }
    }
}

/// The reviewed content unit held by the moderation queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationItem {
    pub id: String,
    pub content: String,
    pub status: ItemStatus,
    pub analysis: AnalysisResult,
    pub source: SourceMetadata,
    pub timestamp: DateTime<Utc>,
}
