//! Course store
//!
//! Owns the persisted course records: CRUD, a live snapshot stream, and the
//! derived set of category ids currently referenced by courses. Every write
//! emits `CatalogEvent::CoursesChanged`; live observers re-query on receipt,
//! so each subscriber sees a monotonic sequence of latest snapshots.

use ccm_common::db::models::Course;
use ccm_common::events::{CatalogEvent, EventBus};
use ccm_common::Result;
use futures::Stream;
use sqlx::SqlitePool;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct CourseStore {
    db: SqlitePool,
    events: EventBus,
}

impl CourseStore {
    pub fn new(db: SqlitePool, events: EventBus) -> Self {
        Self { db, events }
    }

    /// Point-in-time snapshot of all courses, newest first
    pub async fn get_all(&self) -> Result<Vec<Course>> {
        Self::fetch_all(&self.db).await
    }

    /// Look up a single course; absence is a normal outcome, not an error
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, title, description, category_id, lessons, score, created_at, updated_at \
             FROM courses WHERE id = ? LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(course)
    }

    /// Persist a new course record
    pub async fn insert(&self, course: &Course) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO courses \
             (id, title, description, category_id, lessons, score, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&course.id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.category_id)
        .bind(course.lessons)
        .bind(course.score)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(&self.db)
        .await?;

        self.notify_changed();
        Ok(())
    }

    /// Persist changes to an existing course record
    ///
    /// `created_at` is immutable and deliberately absent from the SET list.
    /// Updating an id with no matching row affects zero rows and is a no-op.
    pub async fn update(&self, course: &Course) -> Result<()> {
        let result = sqlx::query(
            "UPDATE courses SET title = ?, description = ?, category_id = ?, \
             lessons = ?, score = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.category_id)
        .bind(course.lessons)
        .bind(course.score)
        .bind(course.updated_at)
        .bind(&course.id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            debug!(id = %course.id, "update matched no course row");
        } else {
            self.notify_changed();
        }
        Ok(())
    }

    /// Delete a course by id; deleting a non-existent id is not an error
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() > 0 {
            self.notify_changed();
        }
        Ok(())
    }

    /// Distinct `category_id` values across all current courses
    ///
    /// Case-sensitive at this layer; case-insensitive deduplication is the
    /// reconciliation service's concern.
    pub async fn distinct_category_ids(&self) -> Result<Vec<String>> {
        Self::fetch_distinct_category_ids(&self.db).await
    }

    /// Live stream of course snapshots, newest first
    ///
    /// Emits an initial snapshot immediately, then a fresh snapshot after
    /// every course write. Never terminates on its own; drop the stream to
    /// cancel. A lagged receiver re-queries, so only notifications are lost,
    /// never data.
    pub fn observe_all(&self) -> impl Stream<Item = Vec<Course>> + Send + 'static {
        let db = self.db.clone();
        let mut rx = self.events.subscribe();

        async_stream::stream! {
            match Self::fetch_all(&db).await {
                Ok(snapshot) => yield snapshot,
                Err(e) => warn!("initial course snapshot query failed: {}", e),
            }

            loop {
                match rx.recv().await {
                    Ok(CatalogEvent::CoursesChanged { .. }) | Err(RecvError::Lagged(_)) => {
                        match Self::fetch_all(&db).await {
                            Ok(snapshot) => yield snapshot,
                            Err(e) => warn!("course snapshot query failed: {}", e),
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    /// Live stream of the derived category-id set
    pub fn observe_distinct_category_ids(
        &self,
    ) -> impl Stream<Item = Vec<String>> + Send + 'static {
        let db = self.db.clone();
        let mut rx = self.events.subscribe();

        async_stream::stream! {
            match Self::fetch_distinct_category_ids(&db).await {
                Ok(ids) => yield ids,
                Err(e) => warn!("initial category-id query failed: {}", e),
            }

            loop {
                match rx.recv().await {
                    Ok(CatalogEvent::CoursesChanged { .. }) | Err(RecvError::Lagged(_)) => {
                        match Self::fetch_distinct_category_ids(&db).await {
                            Ok(ids) => yield ids,
                            Err(e) => warn!("category-id query failed: {}", e),
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    async fn fetch_all(db: &SqlitePool) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT id, title, description, category_id, lessons, score, created_at, updated_at \
             FROM courses ORDER BY created_at DESC",
        )
        .fetch_all(db)
        .await?;
        Ok(courses)
    }

    async fn fetch_distinct_category_ids(db: &SqlitePool) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT DISTINCT category_id FROM courses")
            .fetch_all(db)
            .await?;
        Ok(ids)
    }

    fn notify_changed(&self) {
        self.events
            .emit(CatalogEvent::CoursesChanged {
                timestamp: chrono::Utc::now(),
            })
            .ok();
    }
}
