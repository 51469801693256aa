//! Configuration for classifiers and backend loading

use crate::backends::LexiconBackend;
use crate::classifier::{BackendLoader, StaticLoader, UnavailableLoader};
use crate::decision::DecisionThresholds;
use crate::heuristic::{HeuristicClassifier, HeuristicLexicons};
use crate::ml::{MlAdapter, DEFAULT_CATEGORIES};
use modguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_ZERO_SHOT_MODEL: &str = "facebook/bart-large-mnli";

/// Which inference backend backs the ML path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// No ML capability; every analysis uses the heuristic classifier
    #[default]
    None,
    /// In-process keyword stand-in for a model, opt-in only
    Lexicon,
    /// Hosted inference endpoint
    Http,
}

/// Connection settings for the hosted inference backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpBackendConfig {
    pub endpoint: String,

    /// Bearer token; falls back to `HF_API_TOKEN` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    pub sentiment_model: String,
    pub zero_shot_model: String,
    pub timeout_ms: u64,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            sentiment_model: DEFAULT_SENTIMENT_MODEL.to_string(),
            zero_shot_model: DEFAULT_ZERO_SHOT_MODEL.to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl HttpBackendConfig {
    /// Full URL for a model
    pub fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.endpoint.trim_end_matches('/'), model)
    }
}

/// Configuration for both classification paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub http: HttpBackendConfig,

    /// Zero-shot candidate labels
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Heuristic term lists; unset lists keep their built-in terms
    #[serde(default)]
    pub lexicons: HeuristicLexicons,

    /// Thresholds for ML scores
    #[serde(default = "default_model_thresholds")]
    pub model_thresholds: DecisionThresholds,

    /// Thresholds for heuristic scores
    #[serde(default = "default_heuristic_thresholds")]
    pub heuristic_thresholds: DecisionThresholds,
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

fn default_model_thresholds() -> DecisionThresholds {
    DecisionThresholds::MODEL
}

fn default_heuristic_thresholds() -> DecisionThresholds {
    DecisionThresholds::HEURISTIC
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            http: HttpBackendConfig::default(),
            categories: default_categories(),
            lexicons: HeuristicLexicons::default(),
            model_thresholds: DecisionThresholds::MODEL,
            heuristic_thresholds: DecisionThresholds::HEURISTIC,
        }
    }
}

impl ClassifierConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse classifier config: {e}")))
    }

    /// Build the loader selected by `backend`
    pub fn loader(&self) -> Result<Arc<dyn BackendLoader>> {
        let loader: Arc<dyn BackendLoader> = match self.backend {
            BackendKind::None => {
                Arc::new(UnavailableLoader::new("ML backend disabled by configuration"))
            }
            BackendKind::Lexicon => Arc::new(StaticLoader::new(Arc::new(LexiconBackend::new()?))),
            #[cfg(feature = "http-backend")]
            BackendKind::Http => Arc::new(crate::backends::HttpLoader::new(self.http.clone())),
            #[cfg(not(feature = "http-backend"))]
            BackendKind::Http => {
                return Err(Error::config(
                    "http backend requested but modguard-classifiers was built without the http-backend feature",
                ))
            }
        };
        Ok(loader)
    }

    /// Build the ML adapter for this configuration
    pub fn ml_adapter(&self) -> Result<MlAdapter> {
        Ok(MlAdapter::new(self.loader()?).with_categories(self.categories.clone()))
    }

    /// Build the heuristic classifier for this configuration
    pub fn heuristic(&self) -> Result<HeuristicClassifier> {
        HeuristicClassifier::with_lexicons(self.lexicons.clone(), self.heuristic_thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_config_defaults() {
        let config = ClassifierConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ClassifierConfig::default());
        assert_eq!(config.backend, BackendKind::None);
        assert_eq!(config.categories.len(), 8);
    }

    #[test]
    fn test_classifier_config_yaml() {
        let yaml = r#"
backend: http
http:
  endpoint: http://localhost:8080
  timeout_ms: 2500
categories: [spam, threats]
lexicons:
  profanity: [frak]
heuristic_thresholds:
  reject_above: 0.9
  flag_above: 0.5
"#;
        let config = ClassifierConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.backend, BackendKind::Http);
        assert_eq!(config.http.endpoint, "http://localhost:8080");
        assert_eq!(config.http.zero_shot_model, DEFAULT_ZERO_SHOT_MODEL);
        assert_eq!(config.categories, ["spam", "threats"]);
        assert_eq!(config.lexicons.profanity, ["frak"]);
        // other lists keep their built-in terms
        assert!(config.lexicons.threats.contains(&"kill".to_string()));
        assert_eq!(config.model_thresholds, DecisionThresholds::MODEL);
        assert_eq!(config.heuristic_thresholds.reject_above, 0.9);
    }

    #[test]
    fn test_invalid_backend_is_rejected() {
        assert!(ClassifierConfig::from_yaml("backend: candle").is_err());
    }

    #[tokio::test]
    async fn test_none_backend_is_unavailable() {
        let config = ClassifierConfig {
            backend: BackendKind::None,
            ..Default::default()
        };
        let adapter = config.ml_adapter().unwrap();
        let err = adapter.classify("hello").await.unwrap_err();
        assert!(err.is_model_unavailable());
        assert!(!adapter.is_loaded());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifiers.yaml");
        std::fs::write(&path, "backend: none\n").unwrap();

        let config = ClassifierConfig::from_file(&path).unwrap();
        assert_eq!(config.backend, BackendKind::None);
    }
}
