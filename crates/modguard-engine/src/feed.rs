//! Content ingestion
//!
//! A [`ContentSource`] produces `(content, SourceMetadata)` pairs; the
//! [`FeedRunner`] drives one into the moderation queue on a background task
//! until the source is exhausted, an item limit is reached or it is told to
//! stop.

use crate::queue::ModerationQueue;
use async_trait::async_trait;
use chrono::Utc;
use modguard_core::{
    ContextData, Decision, Error, ExampleSource, Result, SourceMetadata, TrainingExample,
};
use modguard_training::TrainingStore;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Produces content for moderation
#[async_trait]
pub trait ContentSource: Send {
    /// Next item, or `None` when the source is exhausted
    async fn next_item(&mut self) -> Option<(String, SourceMetadata)>;

    fn name(&self) -> &str;
}

/// Feed configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Only replay items mentioning one of these (all items when empty)
    pub keywords: Vec<String>,

    pub region: String,

    /// Pause between items, in milliseconds
    pub interval_ms: u64,

    /// Stop after this many items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Add every analysed item to the training store
    pub context_training: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            region: "us".to_string(),
            interval_ms: 1000,
            limit: None,
            context_training: false,
        }
    }
}

/// (author, handle, content)
const MOCK_TWEETS: [(&str, &str, &str); 10] = [
    ("Alex Johnson", "alexj", "Just had the worst customer service experience ever at @TechStore. The staff was rude and unhelpful. Never shopping there again!"),
    ("Sarah Miller", "sarahmil", "Excited to announce that my new photography book is now available! Check it out at the link below. #Photography #NewRelease"),
    ("Mike Wilson", "mikewilson", "Can someone please tell @InternetProvider to fix their terrible service? I've been without internet for 3 days now! #BadService #Frustrated"),
    ("Jessica Lee", "jesslee", "Anyone know how to get rid of these stupid ads? They're ruining my experience on this platform. Might have to quit soon if this keeps up."),
    ("David Brown", "dbrown", "Fake news alert! @NewsChannel is spreading lies again. Don't believe anything they say. They're all corrupt!"),
    ("Emma Taylor", "emma_t", "Happy birthday to the most amazing friend ever! @LucySmith You make every day brighter. #BirthdayLove"),
    ("Ryan Cooper", "rcooper", "I'm going to destroy everyone who voted for @Politician! You'll all regret it. Watch your backs."),
    ("Olivia Parker", "oparker", "Just finished this amazing new sci-fi novel! Highly recommend it to anyone who loves the genre. What are you reading right now?"),
    ("Nicholas Grant", "ngrant", "Why is no one talking about the side effects of this vaccine? My cousin got it and now has serious health issues. Be careful people! #VaccineAlert"),
    ("Sophie Allen", "sallen", "Just launched my new website! It's been months of hard work, but I'm so proud of the result. Check it out: website.com #WebDesign #Launch"),
];

/// Replays a built-in sample of tweets
pub struct MockFeed {
    items: VecDeque<(String, SourceMetadata)>,
    interval: Duration,
    started: bool,
}

impl MockFeed {
    pub fn new(config: &FeedConfig) -> Self {
        let keywords: Vec<String> = config
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let items = MOCK_TWEETS
            .iter()
            .filter_map(|(author, handle, content)| {
                let lower = content.to_lowercase();
                let matched: Vec<String> = keywords
                    .iter()
                    .filter(|k| lower.contains(k.as_str()))
                    .cloned()
                    .collect();
                if !keywords.is_empty() && matched.is_empty() {
                    return None;
                }

                let source = SourceMetadata {
                    origin: ExampleSource::Twitter,
                    author: author.to_string(),
                    handle: handle.to_string(),
                    region: Some(config.region.clone()),
                    keywords: matched,
                };
                Some((content.to_string(), source))
            })
            .collect();

        Self {
            items,
            interval: Duration::from_millis(config.interval_ms),
            started: false,
        }
    }

    /// Items left to replay
    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

#[async_trait]
impl ContentSource for MockFeed {
    async fn next_item(&mut self) -> Option<(String, SourceMetadata)> {
        if self.items.is_empty() {
            return None;
        }
        if self.started && !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
        self.started = true;
        self.items.pop_front()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// What a feed run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub processed: usize,
    pub approved: usize,
    pub flagged: usize,
    pub rejected: usize,
    /// Examples added to the training store
    pub trained: usize,
    /// Ended by a stop request rather than exhaustion or the limit
    pub stopped: bool,
}

/// Drives a [`ContentSource`] into a [`ModerationQueue`]
pub struct FeedRunner {
    queue: Arc<ModerationQueue>,
    training: Option<TrainingStore>,
    limit: Option<usize>,
}

impl FeedRunner {
    pub fn new(queue: Arc<ModerationQueue>) -> Self {
        Self {
            queue,
            training: None,
            limit: None,
        }
    }

    /// Apply limit and context-training settings
    pub fn with_config(mut self, config: &FeedConfig, training: Option<TrainingStore>) -> Self {
        self.limit = config.limit;
        if config.context_training {
            self.training = training;
        }
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add each analysed item to `store` as a Twitter-sourced example
    pub fn with_context_training(mut self, store: TrainingStore) -> Self {
        self.training = Some(store);
        self
    }

    /// Run the source to completion on the current task
    pub async fn run<S: ContentSource>(&self, mut source: S) -> FeedSummary {
        // sender kept alive for the whole run
        let (_stop_tx, stop_rx) = oneshot::channel();
        self.drive(&mut source, stop_rx).await
    }

    /// Run the source on a background task
    pub fn spawn<S: ContentSource + 'static>(self, mut source: S) -> FeedHandle {
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(async move { self.drive(&mut source, stop_rx).await });
        FeedHandle {
            stop: Some(stop_tx),
            task,
        }
    }

    async fn drive<S: ContentSource>(
        &self,
        source: &mut S,
        mut stop_rx: oneshot::Receiver<()>,
    ) -> FeedSummary {
        let mut summary = FeedSummary::default();
        info!(source = source.name(), limit = ?self.limit, "Feed started");

        loop {
            if self.limit.is_some_and(|limit| summary.processed >= limit) {
                break;
            }

            let next = tokio::select! {
                biased;
                _ = &mut stop_rx => {
                    summary.stopped = true;
                    break;
                }
                next = source.next_item() => next,
            };
            let Some((content, metadata)) = next else {
                break;
            };

            let item = self.queue.submit(content, metadata).await;
            summary.processed += 1;
            match item.analysis.decision {
                Decision::Approved => summary.approved += 1,
                Decision::Flagged => summary.flagged += 1,
                Decision::Rejected => summary.rejected += 1,
            }

            if let Some(store) = &self.training {
                let context = ContextData {
                    keywords: item.source.keywords.clone(),
                    region: item.source.region.clone(),
                    captured_at: Some(Utc::now()),
                };
                let example = TrainingExample::new(item.content.clone(), item.analysis.decision)
                    .with_source(ExampleSource::Twitter)
                    .with_context(context);
                store.add_example(example);
                summary.trained += 1;
            }

            debug!(id = %item.id, decision = %item.analysis.decision, "Feed item processed");
        }

        info!(
            processed = summary.processed,
            stopped = summary.stopped,
            "Feed finished"
        );
        summary
    }
}

/// Handle to a feed running in the background.
///
/// Dropping the handle stops the feed before its next item.
pub struct FeedHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<FeedSummary>,
}

impl FeedHandle {
    /// Ask the feed to stop and wait for it
    pub async fn stop(mut self) -> Result<FeedSummary> {
        if let Some(stop) = self.stop.take() {
            // the feed may already have finished
            let _ = stop.send(());
        }
        self.join().await
    }

    /// Wait for the feed to finish on its own
    pub async fn wait(self) -> Result<FeedSummary> {
        self.join().await
    }

    /// Wait for the feed, stopping it early if `shutdown` completes first
    pub async fn stop_on<F>(mut self, shutdown: F) -> Result<FeedSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            joined = &mut self.task => return joined.map_err(task_failed),
            _ = shutdown => {}
        }
        self.stop().await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    async fn join(self) -> Result<FeedSummary> {
        let Self { stop, task } = self;
        let summary = task.await.map_err(task_failed);
        drop(stop);
        summary
    }
}

fn task_failed(err: tokio::task::JoinError) -> Error {
    Error::internal(format!("feed task failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(keywords: &[&str]) -> FeedConfig {
        FeedConfig {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            region: "uk".to_string(),
            interval_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_mock_feed_unfiltered() {
        let feed = MockFeed::new(&config(&[]));
        assert_eq!(feed.remaining(), 10);
    }

    #[tokio::test]
    async fn test_mock_feed_keyword_filter() {
        let mut feed = MockFeed::new(&config(&["Service", "vaccine"]));
        assert_eq!(feed.remaining(), 3);

        let (content, source) = feed.next_item().await.unwrap();
        assert!(content.contains("customer service"));
        assert_eq!(source.origin, ExampleSource::Twitter);
        assert_eq!(source.handle, "alexj");
        assert_eq!(source.region.as_deref(), Some("uk"));
        assert_eq!(source.keywords, ["service"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_on_shutdown_signal() {
        let queue = Arc::new(ModerationQueue::new(Arc::new(
            crate::DecisionEngine::builtin().unwrap(),
        )));
        let feed = MockFeed::new(&FeedConfig {
            interval_ms: 1000,
            ..Default::default()
        });

        let handle = FeedRunner::new(Arc::clone(&queue)).spawn(feed);
        let summary = handle
            .stop_on(tokio::time::sleep(Duration::from_millis(2500)))
            .await
            .unwrap();

        // items at 0ms, 1000ms and 2000ms
        assert!(summary.stopped);
        assert_eq!(summary.processed, 3);
        assert_eq!(queue.len(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_feed() {
        let mut feed = MockFeed::new(&config(&["no tweet mentions this"]));
        assert!(feed.next_item().await.is_none());
    }
}
