//! Category reconciliation service
//!
//! Produces one canonical category list from three sources: the remote
//! service (best-effort), the local cache, and the categories implicitly
//! referenced by existing courses. Courses are themselves a source of truth
//! for categories, so every referenced category appears in the merged view
//! even if the remote service was never reachable.

use ccm_common::db::models::{Category, CategoryRow};
use ccm_common::Result;
use futures::{Stream, StreamExt};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::remote::CategorySource;
use crate::store::{CategoryCache, CourseStore};

pub struct CategoryService<S: CategorySource> {
    remote: S,
    cache: CategoryCache,
    courses: CourseStore,
}

impl<S: CategorySource> CategoryService<S> {
    pub fn new(remote: S, cache: CategoryCache, courses: CourseStore) -> Self {
        Self {
            remote,
            cache,
            courses,
        }
    }

    /// One-shot, eager fetch of the merged category list
    ///
    /// Tries the remote service first and caches the result on success. Any
    /// fetch failure is absorbed here by falling back to whatever is cached
    /// (possibly nothing); it never reaches the caller. Storage errors do
    /// propagate. There is no retry inside the service; callers retry by
    /// calling again.
    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        let remote_result = match self.remote.fetch_categories().await {
            Ok(dtos) => {
                let now = chrono::Utc::now().timestamp_millis();
                // Category identity collapses to its display name: the name
                // becomes the cache row id, so a re-fetch replaces the row
                // for the same name rather than accumulating duplicates.
                let fetched: Vec<CategoryRow> = dtos
                    .into_iter()
                    .map(|dto| CategoryRow {
                        id: dto.name.clone(),
                        name: dto.name,
                        fetched_at: now,
                    })
                    .collect();

                self.cache.upsert_all(&fetched).await?;
                info!(count = fetched.len(), "categories fetched and cached");
                fetched.into_iter().map(Category::from).collect()
            }
            Err(e) => {
                let cached = self.cache.get_all().await?;
                warn!(
                    "category fetch failed ({}), using {} cached categories",
                    e,
                    cached.len()
                );
                cached.into_iter().map(Category::from).collect()
            }
        };

        let derived = self.courses.distinct_category_ids().await?;
        Ok(merge_categories(remote_result, derived))
    }

    /// Live merged category view
    ///
    /// Combine-latest over the cache and the course-derived category set:
    /// the first emission happens once both upstreams have produced their
    /// initial snapshots, and the full merge is recomputed whenever either
    /// emits. This path never touches the network; only `get_categories`
    /// does, so local writes surface immediately without a refetch.
    pub fn observe_categories(&self) -> impl Stream<Item = Vec<Category>> + Send + 'static {
        let cached_stream = self.cache.observe_all();
        let derived_stream = self.courses.observe_distinct_category_ids();

        async_stream::stream! {
            futures::pin_mut!(cached_stream, derived_stream);

            let mut latest_cached: Option<Vec<Category>> = None;
            let mut latest_derived: Option<Vec<String>> = None;

            loop {
                tokio::select! {
                    rows = cached_stream.next() => match rows {
                        Some(rows) => {
                            latest_cached =
                                Some(rows.into_iter().map(Category::from).collect());
                        }
                        None => break,
                    },
                    ids = derived_stream.next() => match ids {
                        Some(ids) => latest_derived = Some(ids),
                        None => break,
                    },
                }

                if let (Some(cached), Some(derived)) =
                    (latest_cached.clone(), latest_derived.clone())
                {
                    yield merge_categories(cached, derived);
                }
            }
        }
    }
}

/// Merge remote/cached categories with course-derived ones
///
/// Remote entries come first, so on a case-insensitive name collision the
/// remote/cached spelling wins over a course-derived duplicate. The result
/// is sorted ascending by name with a stable, case-sensitive ordinal sort.
pub fn merge_categories(remote: Vec<Category>, derived: Vec<String>) -> Vec<Category> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Category> = remote
        .into_iter()
        .chain(derived.into_iter().map(Category::derived))
        .filter(|category| seen.insert(category.name.to_lowercase()))
        .collect();

    merged.sort_by(|a, b| a.name.cmp(&b.name));
    merged
}
