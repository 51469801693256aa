//! Concrete [`InferenceBackend`](crate::InferenceBackend) implementations

#[cfg(feature = "http-backend")]
pub mod http;
pub mod lexicon;

#[cfg(feature = "http-backend")]
pub use http::{HttpInferenceBackend, HttpLoader};
pub use lexicon::LexiconBackend;
