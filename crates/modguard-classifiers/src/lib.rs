//! modguard classifiers
//!
//! Two classification paths feed the decision engine:
//! - ML path: an [`MlAdapter`] over a lazily loaded [`InferenceBackend`]
//!   producing sentiment plus per-category zero-shot scores
//! - Heuristic path: a deterministic keyword [`HeuristicClassifier`] used
//!   whenever the ML capability is unavailable
//!
//! Both paths share one [`DecisionThresholds`] rule.

pub mod backends;
pub mod classifier;
pub mod config;
pub mod decision;
pub mod heuristic;
pub mod lexicon;
pub mod ml;

pub use backends::LexiconBackend;
#[cfg(feature = "http-backend")]
pub use backends::{HttpInferenceBackend, HttpLoader};
pub use classifier::{
    BackendLoader, InferenceBackend, LabelScore, SentimentLabel, SentimentOutput, StaticLoader,
    UnavailableLoader,
};
pub use config::{BackendKind, ClassifierConfig, HttpBackendConfig};
pub use decision::DecisionThresholds;
pub use heuristic::{HeuristicClassifier, HeuristicLexicons, HeuristicMatches, HeuristicOutcome};
pub use lexicon::{Lexicon, MatchMode};
pub use ml::{MlAdapter, MlClassification, DEFAULT_CATEGORIES};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{BackendLoader, InferenceBackend};
    pub use crate::decision::DecisionThresholds;
    pub use crate::heuristic::HeuristicClassifier;
    pub use crate::ml::{MlAdapter, MlClassification};
}
