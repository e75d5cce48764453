//! Event types for the catalog event system
//!
//! Provides the shared event definitions and EventBus used by the stores and
//! their live observers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Catalog change events
///
/// Emitted by the stores after every successful write. Observers re-query
/// their source on receipt, so an event is a change notification, not a
/// payload carrier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// One or more course rows were inserted, updated, or deleted
    CoursesChanged {
        /// When the write completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The category cache was rewritten (bulk upsert) or cleared
    CategoriesChanged {
        /// When the write completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Central event distribution bus for catalog change events
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block writers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// A lagged subscriber only misses notifications, never data: observers
/// re-query on the next receipt, so the latest snapshot is always recovered.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CatalogEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if none are listening. Writers treat the no-subscriber case as
    /// normal and ignore it.
    pub fn emit(
        &self,
        event: CatalogEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<CatalogEvent>> {
        self.tx.send(event)
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
