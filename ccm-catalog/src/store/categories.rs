//! Category cache store
//!
//! Holds the locally cached copy of the remote category list. Rows are only
//! ever replaced in bulk after a successful remote fetch; there is no
//! per-row mutation surface. The whole cache can be cleared as a maintenance
//! operation.

use ccm_common::db::models::CategoryRow;
use ccm_common::events::{CatalogEvent, EventBus};
use ccm_common::Result;
use futures::Stream;
use sqlx::SqlitePool;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct CategoryCache {
    db: SqlitePool,
    events: EventBus,
}

impl CategoryCache {
    pub fn new(db: SqlitePool, events: EventBus) -> Self {
        Self { db, events }
    }

    /// Replace-on-id-conflict bulk write, atomic as a batch
    ///
    /// Re-fetching overwrites a stale name/fetched_at for the same id.
    /// Observers see either the pre-batch or post-batch state, never a
    /// partial write.
    pub async fn upsert_all(&self, categories: &[CategoryRow]) -> Result<()> {
        if categories.is_empty() {
            return Ok(());
        }

        let mut tx = self.db.begin().await?;
        for row in categories {
            sqlx::query("INSERT OR REPLACE INTO categories (id, name, fetched_at) VALUES (?, ?, ?)")
                .bind(&row.id)
                .bind(&row.name)
                .bind(row.fetched_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        debug!(count = categories.len(), "category cache updated");
        self.notify_changed();
        Ok(())
    }

    /// Point-in-time snapshot of the cache, sorted by name
    pub async fn get_all(&self) -> Result<Vec<CategoryRow>> {
        Self::fetch_all(&self.db).await
    }

    /// Live stream of cache snapshots
    ///
    /// Same protocol as the course store: initial snapshot, then a fresh
    /// snapshot after every cache write. Drop the stream to cancel.
    pub fn observe_all(&self) -> impl Stream<Item = Vec<CategoryRow>> + Send + 'static {
        let db = self.db.clone();
        let mut rx = self.events.subscribe();

        async_stream::stream! {
            match Self::fetch_all(&db).await {
                Ok(snapshot) => yield snapshot,
                Err(e) => warn!("initial category cache query failed: {}", e),
            }

            loop {
                match rx.recv().await {
                    Ok(CatalogEvent::CategoriesChanged { .. }) | Err(RecvError::Lagged(_)) => {
                        match Self::fetch_all(&db).await {
                            Ok(snapshot) => yield snapshot,
                            Err(e) => warn!("category cache query failed: {}", e),
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    /// Wipe the cache (maintenance operation, never auto-invoked)
    pub async fn clear(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories")
            .execute(&self.db)
            .await?;

        if result.rows_affected() > 0 {
            self.notify_changed();
        }
        Ok(())
    }

    async fn fetch_all(db: &SqlitePool) -> Result<Vec<CategoryRow>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, fetched_at FROM categories ORDER BY name ASC",
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    fn notify_changed(&self) {
        self.events
            .emit(CatalogEvent::CategoriesChanged {
                timestamp: chrono::Utc::now(),
            })
            .ok();
    }
}
