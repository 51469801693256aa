//! Moderation queue
//!
//! Holds analysed items newest first and lets moderators override their
//! status. Changes are published on a broadcast channel; slow subscribers
//! lose old events rather than block the queue.

use crate::engine::DecisionEngine;
use chrono::Utc;
use modguard_core::{Error, ItemStatus, ModerationItem, Result, SourceMetadata};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

const EVENT_CAPACITY: usize = 256;

/// A change to the queue
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    /// A new item was analysed and inserted
    Added(ModerationItem),

    /// A moderator changed an item's status
    StatusChanged {
        id: String,
        from: ItemStatus,
        to: ItemStatus,
    },

    Cleared,
}

/// Item counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub flagged: usize,
    pub rejected: usize,
}

/// In-memory moderation queue
pub struct ModerationQueue {
    engine: Arc<DecisionEngine>,
    items: RwLock<Vec<ModerationItem>>,
    events: broadcast::Sender<QueueEvent>,
}

impl ModerationQueue {
    pub fn new(engine: Arc<DecisionEngine>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            engine,
            items: RwLock::new(Vec::new()),
            events,
        }
    }

    pub fn engine(&self) -> &Arc<DecisionEngine> {
        &self.engine
    }

    /// Receive queue events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Analyse content and insert it at the head of the queue.
    ///
    /// The item's status mirrors the analysis decision.
    pub async fn submit(&self, content: impl Into<String>, source: SourceMetadata) -> ModerationItem {
        let content = content.into();
        let id = format!("tweet-{}", Uuid::new_v4().simple());
        let analysis = self.engine.analyze_with_id(&content, Some(&id)).await;

        let item = ModerationItem {
            id,
            status: ItemStatus::from(analysis.decision),
            content,
            analysis,
            source,
            timestamp: Utc::now(),
        };

        self.items.write().insert(0, item.clone());
        debug!(id = %item.id, status = %item.status, "Item queued");
        // no subscribers is fine
        let _ = self.events.send(QueueEvent::Added(item.clone()));
        item
    }

    /// Analyse and insert several items in order; the last ends up newest
    pub async fn seed<I, S>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = (S, SourceMetadata)>,
        S: Into<String>,
    {
        let mut count = 0;
        for (content, source) in items {
            self.submit(content, source).await;
            count += 1;
        }
        info!(count, "Moderation queue seeded");
        count
    }

    /// Override an item's status
    pub fn update_status(&self, id: &str, status: ItemStatus) -> Result<ModerationItem> {
        let mut items = self.items.write();
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| Error::tweet_not_found(id))?;

        let from = item.status;
        item.status = status;
        let updated = item.clone();
        drop(items);

        info!(id, %from, to = %status, "Item status updated");
        let _ = self.events.send(QueueEvent::StatusChanged {
            id: id.to_string(),
            from,
            to: status,
        });
        Ok(updated)
    }

    /// All items, newest first
    pub fn all(&self) -> Vec<ModerationItem> {
        self.items.read().clone()
    }

    pub fn by_status(&self, status: ItemStatus) -> Vec<ModerationItem> {
        self.items
            .read()
            .iter()
            .filter(|item| item.status == status)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<ModerationItem> {
        self.items.read().iter().find(|item| item.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn stats(&self) -> QueueStats {
        let items = self.items.read();
        let mut stats = QueueStats {
            total: items.len(),
            ..Default::default()
        };
        for item in items.iter() {
            match item.status {
                ItemStatus::Pending => stats.pending += 1,
                ItemStatus::Approved => stats.approved += 1,
                ItemStatus::Flagged => stats.flagged += 1,
                ItemStatus::Rejected => stats.rejected += 1,
            }
        }
        stats
    }

    pub fn clear(&self) {
        self.items.write().clear();
        let _ = self.events.send(QueueEvent::Cleared);
    }
}
