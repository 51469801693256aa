//! Application configuration
//!
//! One YAML file with a section per component. Every section is optional;
//! command-line flags override file values.

use crate::{BackendArg, Cli, Command};
use modguard_classifiers::{BackendKind, ClassifierConfig};
use modguard_engine::{EngineConfig, FeedConfig};
use modguard_training::TrainingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub classifier: ClassifierConfig,
    pub training: TrainingConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,
}

/// Log output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // A missing file means defaults
        let mut config: Self = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {config_path}: {e}"))?
        } else {
            Self::default()
        };

        if let Some(backend) = cli.backend {
            config.classifier.backend = backend.into();
        }
        if let Some(policies) = &cli.policies {
            config.engine.policies = Some(policies.into());
        }

        match &cli.command {
            Command::Train { step_ms, .. } => {
                if let Some(step_ms) = step_ms {
                    config.training.step_delay_ms = *step_ms;
                }
            }
            Command::Feed {
                limit,
                keywords,
                region,
                interval_ms,
                context_training,
                ..
            } => {
                if limit.is_some() {
                    config.feed.limit = *limit;
                }
                if !keywords.is_empty() {
                    config.feed.keywords = keywords.clone();
                }
                if let Some(region) = region {
                    config.feed.region = region.clone();
                }
                if let Some(interval_ms) = interval_ms {
                    config.feed.interval_ms = *interval_ms;
                }
                if *context_training {
                    config.feed.context_training = true;
                }
            }
            Command::Analyze { .. } | Command::Policies { .. } => {}
        }

        Ok(config)
    }
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::None => BackendKind::None,
            BackendArg::Lexicon => BackendKind::Lexicon,
            BackendArg::Http => BackendKind::Http,
        }
    }
}
