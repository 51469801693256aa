//! Hosted inference backend speaking the Hugging Face Inference API shape
//!
//! Sentiment: `POST {endpoint}/models/{sentiment_model}` with `{"inputs": text}`.
//! Zero-shot: `POST {endpoint}/models/{zero_shot_model}` with
//! `{"inputs": text, "parameters": {"candidate_labels": [...], "multi_label": true}}`.

use crate::classifier::{
    BackendLoader, InferenceBackend, LabelScore, SentimentLabel, SentimentOutput,
};
use crate::config::HttpBackendConfig;
use async_trait::async_trait;
use modguard_core::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// [`InferenceBackend`] calling a hosted model endpoint
pub struct HttpInferenceBackend {
    http: reqwest::Client,
    config: HttpBackendConfig,
    token: Option<String>,
}

impl HttpInferenceBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(Error::config("inference endpoint must not be empty"));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("modguard/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::model_unavailable(format!("failed to build HTTP client: {e}")))?;

        let token = config
            .api_token
            .clone()
            .or_else(|| std::env::var("HF_API_TOKEN").ok())
            .filter(|t| !t.is_empty());

        Ok(Self {
            http,
            config,
            token,
        })
    }

    async fn post(&self, model: &str, body: &Value) -> Result<Value> {
        let url = self.config.model_url(model);
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::model_unavailable(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::model_unavailable(format!(
                "{url} returned HTTP {status}"
            )));
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| Error::model_unavailable(format!("invalid response from {url}: {e}")))?;
        debug!(%url, "Inference request complete");
        Ok(value)
    }
}

#[async_trait]
impl InferenceBackend for HttpInferenceBackend {
    async fn sentiment(&self, text: &str) -> Result<SentimentOutput> {
        let value = self
            .post(&self.config.sentiment_model, &json!({ "inputs": text }))
            .await?;
        parse_sentiment(&value)
    }

    async fn zero_shot(&self, text: &str, labels: &[String]) -> Result<Vec<LabelScore>> {
        let body = json!({
            "inputs": text,
            "parameters": { "candidate_labels": labels, "multi_label": true }
        });
        let value = self.post(&self.config.zero_shot_model, &body).await?;
        parse_zero_shot(&value)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Loader constructing an [`HttpInferenceBackend`]
pub struct HttpLoader {
    config: HttpBackendConfig,
}

impl HttpLoader {
    pub fn new(config: HttpBackendConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BackendLoader for HttpLoader {
    async fn load(&self) -> Result<Arc<dyn InferenceBackend>> {
        Ok(Arc::new(HttpInferenceBackend::new(self.config.clone())?))
    }

    fn describe(&self) -> String {
        format!("http:{}", self.config.endpoint)
    }
}

#[derive(Deserialize)]
struct RawLabel {
    label: String,
    score: f32,
}

#[derive(Deserialize)]
struct RawZeroShot {
    labels: Vec<String>,
    scores: Vec<f32>,
}

/// Parse a text-classification response.
///
/// Accepts `[{label, score}, ...]` or the nested `[[{label, score}, ...]]`
/// form; the highest-scoring recognised label wins.
pub fn parse_sentiment(value: &Value) -> Result<SentimentOutput> {
    let flat = match value {
        Value::Array(outer) if matches!(outer.first(), Some(Value::Array(_))) => outer[0].clone(),
        other => other.clone(),
    };

    let labels: Vec<RawLabel> = serde_json::from_value(flat)
        .map_err(|e| Error::model_unavailable(format!("unexpected sentiment response: {e}")))?;

    labels
        .iter()
        .filter_map(|l| SentimentLabel::parse(&l.label).map(|label| (label, l.score)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, score)| SentimentOutput::new(label, score))
        .ok_or_else(|| Error::model_unavailable("sentiment response has no recognised label"))
}

/// Parse a zero-shot response.
///
/// Accepts `{labels: [...], scores: [...]}` or `[{label, score}, ...]`.
pub fn parse_zero_shot(value: &Value) -> Result<Vec<LabelScore>> {
    if value.is_array() {
        let labels: Vec<RawLabel> = serde_json::from_value(value.clone())
            .map_err(|e| Error::model_unavailable(format!("unexpected zero-shot response: {e}")))?;
        return Ok(labels
            .into_iter()
            .map(|l| LabelScore::new(l.label, l.score))
            .collect());
    }

    let raw: RawZeroShot = serde_json::from_value(value.clone())
        .map_err(|e| Error::model_unavailable(format!("unexpected zero-shot response: {e}")))?;
    if raw.labels.len() != raw.scores.len() {
        return Err(Error::model_unavailable(format!(
            "zero-shot response has {} labels but {} scores",
            raw.labels.len(),
            raw.scores.len()
        )));
    }

    Ok(raw
        .labels
        .into_iter()
        .zip(raw.scores)
        .map(|(label, score)| LabelScore::new(label, score))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_sentiment() {
        let value = json!([[
            { "label": "NEGATIVE", "score": 0.98 },
            { "label": "POSITIVE", "score": 0.02 }
        ]]);
        let output = parse_sentiment(&value).unwrap();
        assert_eq!(output.label, SentimentLabel::Negative);
        assert!((output.negativity() - 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_parse_flat_sentiment() {
        let value = json!([{ "label": "LABEL_1", "score": 0.8 }]);
        assert_eq!(parse_sentiment(&value).unwrap().label, SentimentLabel::Positive);
    }

    #[test]
    fn test_parse_sentiment_rejects_unknown_labels() {
        let value = json!([{ "label": "neutral", "score": 0.9 }]);
        assert!(parse_sentiment(&value).unwrap_err().is_model_unavailable());
    }

    #[test]
    fn test_parse_zero_shot_object() {
        let value = json!({
            "sequence": "I will find you",
            "labels": ["threats", "spam"],
            "scores": [0.91, 0.03]
        });
        let scores = parse_zero_shot(&value).unwrap();
        assert_eq!(scores[0], LabelScore::new("threats", 0.91));
        assert_eq!(scores[1], LabelScore::new("spam", 0.03));
    }

    #[test]
    fn test_parse_zero_shot_list() {
        let value = json!([{ "label": "spam", "score": 0.4 }]);
        assert_eq!(parse_zero_shot(&value).unwrap(), [LabelScore::new("spam", 0.4)]);
    }

    #[test]
    fn test_parse_zero_shot_length_mismatch() {
        let value = json!({ "labels": ["a", "b"], "scores": [0.1] });
        assert!(parse_zero_shot(&value).is_err());
    }

    #[test]
    fn test_model_url() {
        let config = HttpBackendConfig {
            endpoint: "http://localhost:8080/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.model_url("facebook/bart-large-mnli"),
            "http://localhost:8080/models/facebook/bart-large-mnli"
        );
    }

    #[test]
    fn test_empty_endpoint_is_rejected() {
        let config = HttpBackendConfig {
            endpoint: "  ".to_string(),
            ..Default::default()
        };
        assert!(HttpInferenceBackend::new(config).is_err());
    }
}
