//! Inference capability traits and common types
//!
//! The ML runtime is opaque to the pipeline: anything that can produce a
//! sentiment judgement and independent per-label zero-shot scores can back
//! the ML adapter.

use async_trait::async_trait;
use modguard_core::Result;
use std::sync::Arc;

/// An external classification capability
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Sentiment label and confidence for the text
    async fn sentiment(&self, text: &str) -> Result<SentimentOutput>;

    /// Independent per-label scores in [0,1] for each candidate label.
    ///
    /// Scores are not a distribution and need not sum to 1.
    async fn zero_shot(&self, text: &str, labels: &[String]) -> Result<Vec<LabelScore>>;

    /// Get the backend name
    fn name(&self) -> &str;
}

/// Produces a ready-to-use backend, possibly after expensive initialisation
#[async_trait]
pub trait BackendLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn InferenceBackend>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Sentiment polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl SentimentLabel {
    /// Parse a model label such as `NEGATIVE`, `positive` or `LABEL_0`
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" | "label_1" => Some(Self::Positive),
            "negative" | "neg" | "label_0" => Some(Self::Negative),
            _ => None,
        }
    }
}

/// Result of sentiment inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentOutput {
    pub label: SentimentLabel,

    /// Confidence in `label` (0.0-1.0)
    pub score: f32,
}

impl SentimentOutput {
    pub fn new(label: SentimentLabel, score: f32) -> Self {
        Self {
            label,
            score: score.clamp(0.0, 1.0),
        }
    }

    /// Probability-like measure that the text is negative
    pub fn negativity(&self) -> f32 {
        match self.label {
            SentimentLabel::Negative => self.score,
            SentimentLabel::Positive => 1.0 - self.score,
        }
    }
}

/// One zero-shot label score
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Loader handing out an already constructed backend
pub struct StaticLoader {
    backend: Arc<dyn InferenceBackend>,
}

impl StaticLoader {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl BackendLoader for StaticLoader {
    async fn load(&self) -> Result<Arc<dyn InferenceBackend>> {
        Ok(Arc::clone(&self.backend))
    }

    fn describe(&self) -> String {
        format!("static:{}", self.backend.name())
    }
}

/// Loader that never produces a backend; every analysis takes the heuristic path
pub struct UnavailableLoader {
    reason: String,
}

impl UnavailableLoader {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl BackendLoader for UnavailableLoader {
    async fn load(&self) -> Result<Arc<dyn InferenceBackend>> {
        Err(modguard_core::Error::model_unavailable(self.reason.clone()))
    }

    fn describe(&self) -> String {
        "unavailable".to_string()
    }
}
