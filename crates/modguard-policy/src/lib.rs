//! modguard Policy
//!
//! Retrieval side of the moderation pipeline:
//! - A static knowledge base of moderation policies (built in or YAML)
//! - Keyword-overlap policy retrieval producing ranked `PolicyMatch`es
//! - Keyword-bucket topic detection
//!
//! Everything here is pure and deterministic; the same text always yields
//! the same matches in the same order.

pub mod catalogue;
pub mod retriever;
pub mod topics;

pub use catalogue::{KnowledgeBase, Policy};
pub use retriever::{render_context, PolicyRetriever, DEFAULT_LIMIT, RELEVANCE_PER_KEYWORD};
pub use topics::TopicDetector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::catalogue::{KnowledgeBase, Policy};
    pub use crate::retriever::PolicyRetriever;
    pub use crate::topics::TopicDetector;
}
