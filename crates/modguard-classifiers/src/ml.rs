//! ML classification adapter
//!
//! Wraps an [`InferenceBackend`] and converts its raw sentiment and
//! zero-shot output into the category-score schema used by the pipeline.
//! The backend is loaded lazily, once; concurrent first callers wait on the
//! same in-flight load. A failed load leaves the adapter unloaded so that a
//! later call can retry.

use crate::classifier::{BackendLoader, InferenceBackend};
use modguard_core::{sort_categories, CategoryScore, Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Default zero-shot candidate labels
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "harassment",
    "hate speech",
    "threats",
    "profanity",
    "misinformation",
    "self-harm",
    "privacy violation",
    "spam",
];

/// Above this a category is described as present
const PRESENT_THRESHOLD: f32 = 0.5;

/// Category scores produced by the ML path
#[derive(Debug, Clone, PartialEq)]
pub struct MlClassification {
    /// Sorted descending by score
    pub categories: Vec<CategoryScore>,

    /// How negative the overall sentiment is (0.0-1.0)
    pub sentiment_negativity: f32,

    /// Name of the backend that produced the scores
    pub backend: String,

    pub latency_us: u64,
}

/// Lazily loaded, memoised ML classifier
pub struct MlAdapter {
    loader: Arc<dyn BackendLoader>,
    backend: OnceCell<Arc<dyn InferenceBackend>>,
    categories: Vec<String>,
    load_attempts: AtomicU32,
}

impl MlAdapter {
    /// Create an adapter using the default category set
    pub fn new(loader: Arc<dyn BackendLoader>) -> Self {
        Self {
            loader,
            backend: OnceCell::new(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            load_attempts: AtomicU32::new(0),
        }
    }

    /// Override the candidate category set
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Whether a backend has been loaded successfully
    pub fn is_loaded(&self) -> bool {
        self.backend.initialized()
    }

    /// Number of times the loader has been invoked
    pub fn load_attempts(&self) -> u32 {
        self.load_attempts.load(Ordering::Relaxed)
    }

    /// Load the backend if needed and return it
    pub async fn ensure_loaded(&self) -> Result<Arc<dyn InferenceBackend>> {
        let backend = self
            .backend
            .get_or_try_init(|| async {
                let attempt = self.load_attempts.fetch_add(1, Ordering::Relaxed) + 1;
                let start = Instant::now();
                info!(loader = %self.loader.describe(), attempt, "Loading inference backend");

                match self.loader.load().await {
                    Ok(backend) => {
                        info!(
                            backend = backend.name(),
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "Inference backend ready"
                        );
                        Ok(backend)
                    }
                    Err(e) => {
                        warn!(loader = %self.loader.describe(), error = %e, "Inference backend failed to load");
                        Err(unavailable(e))
                    }
                }
            })
            .await?;

        Ok(Arc::clone(backend))
    }

    /// Classify text against the configured categories
    pub async fn classify(&self, text: &str) -> Result<MlClassification> {
        self.classify_with(text, &self.categories).await
    }

    /// Classify text against an explicit category set.
    ///
    /// Any failure is reported as [`Error::ModelUnavailable`].
    pub async fn classify_with(&self, text: &str, categories: &[String]) -> Result<MlClassification> {
        if categories.is_empty() {
            return Err(Error::model_unavailable("no candidate categories configured"));
        }

        let backend = self.ensure_loaded().await?;
        let start = Instant::now();

        let (sentiment, scores) = tokio::try_join!(
            backend.sentiment(text),
            backend.zero_shot(text, categories)
        )
        .map_err(unavailable)?;

        let mut result = Vec::with_capacity(categories.len());
        for label in categories {
            let score = scores
                .iter()
                .find(|s| s.label.eq_ignore_ascii_case(label))
                .map(|s| s.score)
                .unwrap_or(0.0);

            if !score.is_finite() {
                return Err(Error::model_unavailable(format!(
                    "backend '{}' returned a non-finite score for '{label}'",
                    backend.name()
                )));
            }

            result.push(CategoryScore::new(
                display_name(label),
                score,
                explain(label, score),
            ));
        }
        sort_categories(&mut result);

        let classification = MlClassification {
            categories: result,
            sentiment_negativity: sentiment.negativity(),
            backend: backend.name().to_string(),
            latency_us: start.elapsed().as_micros() as u64,
        };

        debug!(
            backend = %classification.backend,
            top = %classification.categories[0].name,
            top_score = classification.categories[0].score,
            negativity = classification.sentiment_negativity,
            "ML classification complete"
        );

        Ok(classification)
    }
}

fn unavailable(err: Error) -> Error {
    match err {
        Error::ModelUnavailable(_) => err,
        other => Error::model_unavailable(other.to_string()),
    }
}

fn explain(label: &str, score: f32) -> String {
    if score > PRESENT_THRESHOLD {
        format!("Content may contain {label}")
    } else {
        format!("No significant {label} detected")
    }
}

/// Title-case a label: `hate speech` -> `Hate Speech`, `self-harm` -> `Self-Harm`
pub fn display_name(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut capitalize = true;
    for ch in label.trim().chars() {
        if capitalize {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        capitalize = ch == ' ' || ch == '-';
    }
    out
}
