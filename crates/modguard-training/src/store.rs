//! In-memory training store and the simulated training session
//!
//! The store owns the example list, a context cache for Twitter-sourced
//! examples and the single training session. A session runs on a spawned
//! task and advances progress in ten 10% steps; observers either poll
//! [`TrainingStore::progress`] or watch [`TrainingStore::subscribe`].

use crate::config::{TrainingConfig, MIN_EXAMPLES, STEPS, STEP_PERCENT};
use crate::samples::sample_examples;
use modguard_core::{ContextData, Decision, Error, Result, TrainingExample, TrainingProgress};
use parking_lot::{Mutex, RwLock};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a training session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingOutcome {
    /// All steps ran; `trained` is now set
    Completed { examples: usize },
    /// Stopped early; progress was reset to 0
    Cancelled { reached_percent: u8 },
}

/// Number of examples per label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub approved: usize,
    pub flagged: usize,
    pub rejected: usize,
}

impl LabelCounts {
    pub fn total(&self) -> usize {
        self.approved + self.flagged + self.rejected
    }
}

struct Inner {
    config: TrainingConfig,
    examples: RwLock<Vec<TrainingExample>>,
    contexts: RwLock<HashMap<String, ContextData>>,
    /// Cancellation token of the running session, if any
    session: Mutex<Option<CancellationToken>>,
    progress: watch::Sender<TrainingProgress>,
}

/// Shared handle to the training store.
///
/// Cloning is cheap; all clones see the same examples and session.
#[derive(Clone)]
pub struct TrainingStore {
    inner: Arc<Inner>,
}

impl TrainingStore {
    pub fn new(config: TrainingConfig) -> Self {
        let (progress, _) = watch::channel(TrainingProgress::default());
        Self {
            inner: Arc::new(Inner {
                config,
                examples: RwLock::new(Vec::new()),
                contexts: RwLock::new(HashMap::new()),
                session: Mutex::new(None),
                progress,
            }),
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.inner.config
    }

    /// Append an example and return the new example count.
    ///
    /// Content is not validated here; manual-entry validation is a caller concern.
    pub fn add_example(&self, example: TrainingExample) -> usize {
        if let Some(context) = &example.context_data {
            self.inner
                .contexts
                .write()
                .insert(content_key(&example.content), context.clone());
        }

        let mut examples = self.inner.examples.write();
        examples.push(example);
        debug!(count = examples.len(), "Training example added");
        examples.len()
    }

    /// Append examples in order and return the new example count
    pub fn add_examples(&self, batch: impl IntoIterator<Item = TrainingExample>) -> usize {
        let batch: Vec<TrainingExample> = batch.into_iter().collect();

        {
            let mut contexts = self.inner.contexts.write();
            for example in &batch {
                if let Some(context) = &example.context_data {
                    contexts.insert(content_key(&example.content), context.clone());
                }
            }
        }

        let added = batch.len();
        let mut examples = self.inner.examples.write();
        examples.extend(batch);
        info!(added, count = examples.len(), "Training examples added");
        examples.len()
    }

    /// Add the built-in sample set and return the new example count
    pub fn load_samples(&self) -> usize {
        self.add_examples(sample_examples())
    }

    /// Remove all examples and cached context
    pub fn clear(&self) {
        self.inner.examples.write().clear();
        self.inner.contexts.write().clear();
        info!("Training examples cleared");
    }

    /// Snapshot of the current examples in insertion order
    pub fn examples(&self) -> Vec<TrainingExample> {
        self.inner.examples.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.examples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.examples.read().is_empty()
    }

    pub fn label_counts(&self) -> LabelCounts {
        let mut counts = LabelCounts::default();
        for example in self.inner.examples.read().iter() {
            match example.label {
                Decision::Approved => counts.approved += 1,
                Decision::Flagged => counts.flagged += 1,
                Decision::Rejected => counts.rejected += 1,
            }
        }
        counts
    }

    /// Context captured for an example with exactly this content
    pub fn context_for(&self, content: &str) -> Option<ContextData> {
        self.inner.contexts.read().get(&content_key(content)).cloned()
    }

    /// Current session state
    pub fn progress(&self) -> TrainingProgress {
        *self.inner.progress.borrow()
    }

    /// Watch session state changes
    pub fn subscribe(&self) -> watch::Receiver<TrainingProgress> {
        self.inner.progress.subscribe()
    }

    pub fn is_trained(&self) -> bool {
        self.progress().trained
    }

    /// Start a training session on a background task.
    ///
    /// Fails with [`Error::AlreadyInProgress`] while a session runs, then with
    /// [`Error::InsufficientData`] below the example minimum. Must be called
    /// from within a Tokio runtime.
    pub fn train(&self) -> Result<TrainingHandle> {
        let mut session = self.inner.session.lock();
        if session.is_some() {
            warn!("Training requested while a session is in progress");
            return Err(Error::AlreadyInProgress);
        }

        let available = self.len();
        if available < MIN_EXAMPLES {
            return Err(Error::InsufficientData {
                required: MIN_EXAMPLES,
                available,
            });
        }

        let token = CancellationToken::new();
        *session = Some(token.clone());
        self.inner.progress.send_modify(|p| {
            p.in_progress = true;
            p.progress_percent = 0;
        });
        drop(session);

        info!(examples = available, "Training session started");

        let inner = Arc::clone(&self.inner);
        let task_token = token.clone();
        let task = tokio::spawn(async move { inner.run_session(task_token, available).await });

        Ok(TrainingHandle {
            task,
            token,
            progress: self.subscribe(),
        })
    }

    /// Cancel the running session, if any. Returns whether one was running.
    pub fn cancel_training(&self) -> bool {
        match self.inner.session.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

impl Default for TrainingStore {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

impl Inner {
    async fn run_session(&self, token: CancellationToken, examples: usize) -> TrainingOutcome {
        let delay = self.config.step_delay();

        for step in 1..=STEPS {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    let reached_percent = self.progress.borrow().progress_percent;
                    self.finish(false);
                    info!(reached_percent, "Training session cancelled");
                    metrics::counter!("modguard_training_sessions_total", "outcome" => "cancelled")
                        .increment(1);
                    return TrainingOutcome::Cancelled { reached_percent };
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let percent = step * STEP_PERCENT;
            self.progress.send_modify(|p| p.progress_percent = percent);
            debug!(percent, "Training progress");
        }

        self.finish(true);
        info!(examples, "Training session completed");
        metrics::counter!("modguard_training_sessions_total", "outcome" => "completed").increment(1);
        TrainingOutcome::Completed { examples }
    }

    fn finish(&self, completed: bool) {
        let mut session = self.session.lock();
        *session = None;
        self.progress.send_modify(|p| {
            p.in_progress = false;
            p.progress_percent = 0;
            if completed {
                p.trained = true;
            }
        });
    }
}

/// Handle to a running training session
pub struct TrainingHandle {
    task: JoinHandle<TrainingOutcome>,
    token: CancellationToken,
    progress: watch::Receiver<TrainingProgress>,
}

impl TrainingHandle {
    /// Request cancellation; the session stops before its next step
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Receiver for progress updates of this session
    pub fn progress(&self) -> watch::Receiver<TrainingProgress> {
        self.progress.clone()
    }

    /// Wait for the session to end
    pub async fn wait(self) -> Result<TrainingOutcome> {
        self.task
            .await
            .map_err(|e| Error::internal(format!("training task failed: {e}")))
    }
}

fn content_key(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}
