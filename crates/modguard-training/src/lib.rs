//! modguard Training
//!
//! Labeled example collection for the moderation pipeline:
//! - [`TrainingStore`]: in-memory examples plus the single simulated
//!   training session, observable through a watch channel
//! - CSV and tuple import with label synonym normalisation
//!
//! Training has no effect on classification; the only observable result of
//! a completed session is the `trained` flag.

pub mod config;
pub mod import;
pub mod samples;
pub mod store;

pub use config::{TrainingConfig, MIN_EXAMPLES, STEPS, STEP_PERCENT};
pub use import::{has_header, import_records, load_csv_file, normalize_label, parse_csv};
pub use samples::sample_examples;
pub use store::{LabelCounts, TrainingHandle, TrainingOutcome, TrainingStore};
