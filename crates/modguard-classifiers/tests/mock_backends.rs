//! Mock inference backends for testing
//!
//! Provides configurable mock implementations of the InferenceBackend and
//! BackendLoader traits for testing the ML adapter's loading, mapping and
//! error handling.

use async_trait::async_trait;
use modguard_classifiers::{
    BackendLoader, InferenceBackend, LabelScore, MlAdapter, SentimentLabel, SentimentOutput,
    StaticLoader,
};
use modguard_core::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A configurable mock backend
pub struct MockBackend {
    scores: HashMap<String, f32>,
    sentiment: SentimentOutput,
    simulated_latency: Option<Duration>,
    call_count: AtomicU32,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            scores: HashMap::new(),
            sentiment: SentimentOutput::new(SentimentLabel::Positive, 0.9),
            simulated_latency: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the zero-shot score returned for a label
    pub fn with_score(mut self, label: &str, score: f32) -> Self {
        self.scores.insert(label.to_string(), score);
        self
    }

    pub fn with_sentiment(mut self, label: SentimentLabel, score: f32) -> Self {
        self.sentiment = SentimentOutput::new(label, score);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Number of zero-shot calls
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn sentiment(&self, _text: &str) -> Result<SentimentOutput> {
        Ok(self.sentiment)
    }

    async fn zero_shot(&self, _text: &str, labels: &[String]) -> Result<Vec<LabelScore>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }

        // Labels without a configured score are omitted from the response
        Ok(labels
            .iter()
            .filter_map(|l| self.scores.get(l).map(|s| LabelScore::new(l.clone(), *s)))
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A backend whose inference always fails
pub struct FailingBackend {
    error_message: String,
}

impl FailingBackend {
    pub fn new(message: &str) -> Self {
        Self {
            error_message: message.to_string(),
        }
    }
}

#[async_trait]
impl InferenceBackend for FailingBackend {
    async fn sentiment(&self, _text: &str) -> Result<SentimentOutput> {
        Err(Error::internal(&self.error_message))
    }

    async fn zero_shot(&self, _text: &str, _labels: &[String]) -> Result<Vec<LabelScore>> {
        Err(Error::internal(&self.error_message))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// A loader counting invocations, with simulated load time and failures
pub struct CountingLoader {
    backend: Arc<dyn InferenceBackend>,
    load_time: Duration,
    failures_remaining: AtomicU32,
    loads: AtomicU32,
}

impl CountingLoader {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            backend,
            load_time: Duration::ZERO,
            failures_remaining: AtomicU32::new(0),
            loads: AtomicU32::new(0),
        }
    }

    pub fn with_load_time(mut self, load_time: Duration) -> Self {
        self.load_time = load_time;
        self
    }

    /// Fail the first `n` loads
    pub fn failing_first(self, n: u32) -> Self {
        self.failures_remaining.store(n, Ordering::Relaxed);
        self
    }

    pub fn loads(&self) -> u32 {
        self.loads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BackendLoader for CountingLoader {
    async fn load(&self) -> Result<Arc<dyn InferenceBackend>> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        if !self.load_time.is_zero() {
            tokio::time::sleep(self.load_time).await;
        }

        let failing = self
            .failures_remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::internal("weights download failed"));
        }

        Ok(Arc::clone(&self.backend))
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_scores_are_mapped_and_sorted() {
        let backend = MockBackend::new()
            .with_score("hate speech", 0.3)
            .with_score("threats", 0.82)
            .with_score("spam", 0.6);
        let adapter = MlAdapter::new(Arc::new(StaticLoader::new(Arc::new(backend))))
            .with_categories(labels(&["hate speech", "threats", "spam"]));

        let result = adapter.classify("text").await.unwrap();
        let names: Vec<&str> = result.categories.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, ["Threats", "Spam", "Hate Speech"]);
        assert_eq!(result.categories[0].explanation, "Content may contain threats");
        assert_eq!(
            result.categories[2].explanation,
            "No significant hate speech detected"
        );
        assert_eq!(result.backend, "mock");
    }

    #[tokio::test]
    async fn test_missing_labels_default_to_zero() {
        let backend = MockBackend::new().with_score("spam", 0.4);
        let adapter = MlAdapter::new(Arc::new(StaticLoader::new(Arc::new(backend))))
            .with_categories(labels(&["spam", "self-harm"]));

        let result = adapter.classify("text").await.unwrap();
        assert_eq!(result.categories.len(), 2);
        assert_eq!(result.categories[1].name, "Self-Harm");
        assert_eq!(result.categories[1].score, 0.0);
    }

    #[tokio::test]
    async fn test_sentiment_negativity() {
        let backend = MockBackend::new().with_sentiment(SentimentLabel::Negative, 0.8);
        let adapter = MlAdapter::new(Arc::new(StaticLoader::new(Arc::new(backend))));

        let result = adapter.classify("text").await.unwrap();
        assert!((result.sentiment_negativity - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_non_finite_score_is_unavailable() {
        let backend = MockBackend::new().with_score("spam", f32::NAN);
        let adapter = MlAdapter::new(Arc::new(StaticLoader::new(Arc::new(backend))))
            .with_categories(labels(&["spam"]));

        let err = adapter.classify("text").await.unwrap_err();
        assert!(err.is_model_unavailable());
    }

    #[tokio::test]
    async fn test_inference_failure_is_unavailable() {
        let adapter = MlAdapter::new(Arc::new(StaticLoader::new(Arc::new(
            FailingBackend::new("CUDA out of memory"),
        ))));

        let err = adapter.classify("text").await.unwrap_err();
        assert!(err.is_model_unavailable());
        assert!(err.to_string().contains("CUDA out of memory"));
        // the backend loaded fine; only inference failed
        assert!(adapter.is_loaded());
    }

    #[tokio::test]
    async fn test_empty_category_set_is_unavailable() {
        let adapter = MlAdapter::new(Arc::new(StaticLoader::new(Arc::new(MockBackend::new()))))
            .with_categories(Vec::new());
        assert!(adapter.classify("text").await.unwrap_err().is_model_unavailable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_first_calls_share_one_load() {
        let backend = Arc::new(MockBackend::new().with_score("spam", 0.1));
        let loader = Arc::new(
            CountingLoader::new(backend.clone()).with_load_time(Duration::from_millis(500)),
        );
        let adapter = Arc::new(MlAdapter::new(loader.clone()));

        let calls = (0..8).map(|_| {
            let adapter = Arc::clone(&adapter);
            tokio::spawn(async move { adapter.classify("text").await })
        });
        for result in futures::future::join_all(calls).await {
            assert!(result.unwrap().is_ok());
        }

        assert_eq!(loader.loads(), 1);
        assert_eq!(adapter.load_attempts(), 1);
        assert_eq!(backend.call_count(), 8);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let loader = Arc::new(CountingLoader::new(Arc::new(MockBackend::new())).failing_first(1));
        let adapter = MlAdapter::new(loader.clone());

        let err = adapter.classify("text").await.unwrap_err();
        assert!(err.is_model_unavailable());
        assert!(!adapter.is_loaded());

        assert!(adapter.classify("text").await.is_ok());
        assert!(adapter.is_loaded());
        assert_eq!(loader.loads(), 2);

        // loaded once; no further loads
        adapter.classify("text").await.unwrap();
        assert_eq!(loader.loads(), 2);
    }
}
