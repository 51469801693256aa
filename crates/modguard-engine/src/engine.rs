//! Decision engine
//!
//! Orchestrates one analysis: classification (ML path with heuristic
//! fallback) joined with policy retrieval and topic detection. Analyses
//! never fail; the worst case is a heuristic result.

use crate::metrics::MetricsCollector;
use futures::future::join_all;
use modguard_classifiers::{
    BackendKind, ClassifierConfig, DecisionThresholds, HeuristicClassifier, MlAdapter,
    MlClassification,
};
use modguard_core::{AnalysisPath, AnalysisResult, CategoryScore, Decision, Result};
use modguard_policy::{KnowledgeBase, PolicyRetriever, TopicDetector, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

const FLAGGED_REASONING: &str =
    "The content contains potentially concerning language that requires human review.";
const APPROVED_REASONING: &str =
    "The content appears to comply with our platform policies and has been approved.";

const FLAGGED_ACTIONS: [&str; 3] = [
    "Review content for potentially harmful language",
    "Consider rephrasing in a more constructive way",
    "Ensure the content adheres to community guidelines",
];

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Policy knowledge base file; the built-in catalogue when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<PathBuf>,

    /// Maximum policy references per analysis, capped at 3
    pub policy_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policies: None,
            policy_limit: DEFAULT_LIMIT,
        }
    }
}

/// An analysis together with how it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub path: AnalysisPath,
    pub correlation_id: String,
    pub latency_us: u64,

    /// Why the ML path was abandoned, when it was
    pub fallback_reason: Option<String>,
}

struct Classified {
    categories: Vec<CategoryScore>,
    decision: Decision,
    reasoning: String,
    suggested_actions: Option<Vec<String>>,
    path: AnalysisPath,
    fallback_reason: Option<String>,
}

/// Produces moderation decisions for text
pub struct DecisionEngine {
    ml: Option<MlAdapter>,
    model_thresholds: DecisionThresholds,
    heuristic: HeuristicClassifier,
    retriever: PolicyRetriever,
    topics: TopicDetector,
    policy_limit: usize,
    metrics: MetricsCollector,
}

impl DecisionEngine {
    /// Heuristic-only engine over the given retrieval components
    pub fn new(
        heuristic: HeuristicClassifier,
        retriever: PolicyRetriever,
        topics: TopicDetector,
    ) -> Self {
        Self {
            ml: None,
            model_thresholds: DecisionThresholds::MODEL,
            heuristic,
            retriever,
            topics,
            policy_limit: DEFAULT_LIMIT,
            metrics: MetricsCollector::new(),
        }
    }

    /// Heuristic-only engine with the built-in lexicons and policies
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(
            HeuristicClassifier::new()?,
            PolicyRetriever::builtin()?,
            TopicDetector::default(),
        ))
    }

    /// Build an engine from configuration
    pub fn from_config(engine: &EngineConfig, classifier: &ClassifierConfig) -> Result<Self> {
        let knowledge_base = match &engine.policies {
            Some(path) => KnowledgeBase::from_file(path)?,
            None => KnowledgeBase::builtin(),
        };
        info!(policies = knowledge_base.len(), "Policy knowledge base loaded");
        if engine.policy_limit > DEFAULT_LIMIT {
            warn!(
                configured = engine.policy_limit,
                max = DEFAULT_LIMIT,
                "Policy limit above maximum, capping"
            );
        }

        let mut built = Self::new(
            classifier.heuristic()?,
            PolicyRetriever::new(knowledge_base)?,
            TopicDetector::default(),
        )
        .with_policy_limit(engine.policy_limit);

        if classifier.backend != BackendKind::None {
            built = built.with_ml(classifier.ml_adapter()?, classifier.model_thresholds);
        }

        info!(
            backend = ?classifier.backend,
            policy_limit = built.policy_limit,
            "Decision engine configured"
        );
        Ok(built)
    }

    /// Enable the ML path
    pub fn with_ml(mut self, adapter: MlAdapter, thresholds: DecisionThresholds) -> Self {
        self.ml = Some(adapter);
        self.model_thresholds = thresholds;
        self
    }

    /// Results never carry more than [`DEFAULT_LIMIT`] policy references
    pub fn with_policy_limit(mut self, limit: usize) -> Self {
        self.policy_limit = limit.min(DEFAULT_LIMIT);
        self
    }

    /// Share a metrics collector with other components
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn ml_adapter(&self) -> Option<&MlAdapter> {
        self.ml.as_ref()
    }

    pub fn retriever(&self) -> &PolicyRetriever {
        &self.retriever
    }

    /// Analyse text
    pub async fn analyze(&self, text: &str) -> AnalysisResult {
        self.evaluate(text, None).await.result
    }

    /// Analyse text under a caller-supplied correlation id
    pub async fn analyze_with_id(&self, text: &str, correlation_id: Option<&str>) -> AnalysisResult {
        self.evaluate(text, correlation_id).await.result
    }

    /// Analyse several texts concurrently; results keep input order
    pub async fn analyze_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<AnalysisResult> {
        join_all(texts.iter().map(|text| self.analyze(text.as_ref()))).await
    }

    /// Analyse text and report the path taken and latency
    pub async fn evaluate(&self, text: &str, correlation_id: Option<&str>) -> Analysis {
        let correlation_id = correlation_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let span = info_span!("analyze", correlation_id = %correlation_id, chars = text.len());

        async move {
            let start = Instant::now();

            let retrieval = async {
                (
                    self.retriever.retrieve(text, self.policy_limit),
                    self.topics.detect(text),
                )
            };
            let (classified, (policy_references, detected_topics)) =
                tokio::join!(self.classify(text), retrieval);

            let latency_us = start.elapsed().as_micros() as u64;
            self.metrics
                .record_analysis(classified.decision, classified.path, latency_us);

            debug!(
                decision = %classified.decision,
                path = classified.path.as_str(),
                policies = policy_references.len(),
                topics = ?detected_topics,
                latency_us,
                "Analysis complete"
            );

            Analysis {
                result: AnalysisResult {
                    decision: classified.decision,
                    reasoning: classified.reasoning,
                    categories: classified.categories,
                    detected_topics,
                    policy_references,
                    suggested_actions: classified.suggested_actions,
                },
                path: classified.path,
                correlation_id,
                latency_us,
                fallback_reason: classified.fallback_reason,
            }
        }
        .instrument(span)
        .await
    }

    async fn classify(&self, text: &str) -> Classified {
        let Some(ml) = &self.ml else {
            return self.heuristic_path(text, None);
        };

        match ml.classify(text).await {
            Ok(classification) => self.model_path(classification),
            Err(e) => {
                warn!(error = %e, "ML classification unavailable, falling back to heuristics");
                self.metrics.record_fallback();
                self.heuristic_path(text, Some(e.to_string()))
            }
        }
    }

    fn model_path(&self, classification: MlClassification) -> Classified {
        let MlClassification {
            categories,
            sentiment_negativity,
            ..
        } = classification;

        let decision = self
            .model_thresholds
            .decide_categories(&categories, Some(sentiment_negativity));

        let (reasoning, suggested_actions) = match decision {
            Decision::Rejected => {
                let top = categories
                    .first()
                    .map(|c| c.name.to_lowercase())
                    .unwrap_or_else(|| "harmful".to_string());
                (
                    format!("The content was classified as containing {top}, which violates platform policies."),
                    Some(vec![
                        format!("Remove {top} content"),
                        "Rephrase respectfully".to_string(),
                        "Focus on constructive communication".to_string(),
                    ]),
                )
            }
            Decision::Flagged => (
                FLAGGED_REASONING.to_string(),
                Some(FLAGGED_ACTIONS.iter().map(|a| a.to_string()).collect()),
            ),
            Decision::Approved => (APPROVED_REASONING.to_string(), None),
        };

        Classified {
            categories,
            decision,
            reasoning,
            suggested_actions,
            path: AnalysisPath::Model,
            fallback_reason: None,
        }
    }

    fn heuristic_path(&self, text: &str, fallback_reason: Option<String>) -> Classified {
        let outcome = self.heuristic.classify(text);
        Classified {
            categories: outcome.categories,
            decision: outcome.decision,
            reasoning: outcome.reasoning,
            suggested_actions: outcome.suggested_actions,
            path: AnalysisPath::Heuristic,
            fallback_reason,
        }
    }
}
