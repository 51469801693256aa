//! Error types for modguard

/// Result type alias using modguard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for modguard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The ML capability failed to load or raised during inference
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// A training session is already running
    #[error("training already in progress")]
    AlreadyInProgress,

    /// Not enough examples to start a training session
    #[error("insufficient training data: {available} examples, at least {required} required")]
    InsufficientData { required: usize, available: usize },

    /// Import produced no usable rows
    #[error("malformed import: {0}")]
    MalformedImport(String),

    /// Status update requested for an unknown moderation item
    #[error("tweet not found: {0}")]
    TweetNotFound(String),

    /// Classifier construction errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model-unavailable error
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a new malformed-import error
    pub fn malformed_import(msg: impl Into<String>) -> Self {
        Self::MalformedImport(msg.into())
    }

    /// Create a new not-found error for a moderation item
    pub fn tweet_not_found(id: impl Into<String>) -> Self {
        Self::TweetNotFound(id.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller should fall back to the heuristic classifier
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientData {
            required: 5,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "insufficient training data: 4 examples, at least 5 required"
        );
        assert_eq!(
            Error::tweet_not_found("tweet-9").to_string(),
            "tweet not found: tweet-9"
        );
    }

    #[test]
    fn test_model_unavailable_predicate() {
        assert!(Error::model_unavailable("no weights").is_model_unavailable());
        assert!(!Error::AlreadyInProgress.is_model_unavailable());
    }
}
