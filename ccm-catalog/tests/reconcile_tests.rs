//! Integration tests for the category reconciliation service
//!
//! The remote source is scripted per test, so success and failure paths run
//! without a network.

use async_trait::async_trait;
use ccm_catalog::remote::{CategoryDto, CategorySource, FetchError};
use ccm_catalog::store::{CategoryCache, CourseStore};
use ccm_catalog::CategoryService;
use ccm_common::db::models::{CategoryRow, Course};
use ccm_common::db::init_database;
use ccm_common::events::EventBus;
use futures::StreamExt;
use tempfile::TempDir;

/// Remote source that always returns the same list
struct FixedSource(Vec<CategoryDto>);

#[async_trait]
impl CategorySource for FixedSource {
    async fn fetch_categories(&self) -> Result<Vec<CategoryDto>, FetchError> {
        Ok(self.0.clone())
    }
}

/// Remote source that always fails
struct FailingSource;

#[async_trait]
impl CategorySource for FailingSource {
    async fn fetch_categories(&self) -> Result<Vec<CategoryDto>, FetchError> {
        Err(FetchError::Network("connection refused".to_string()))
    }
}

fn dto(name: &str) -> CategoryDto {
    CategoryDto {
        id: name.to_string(),
        name: name.to_string(),
    }
}

fn row(name: &str) -> CategoryRow {
    CategoryRow {
        id: name.to_string(),
        name: name.to_string(),
        fetched_at: 1_000,
    }
}

fn course(id: &str, category: &str) -> Course {
    Course {
        id: id.to_string(),
        title: "Title".to_string(),
        description: "desc".to_string(),
        category_id: category.to_string(),
        lessons: 1,
        score: 5,
        created_at: 1_000,
        updated_at: None,
    }
}

async fn fixtures() -> (TempDir, CourseStore, CategoryCache) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("ccm.db")).await.unwrap();
    let events = EventBus::new(16);
    let courses = CourseStore::new(pool.clone(), events.clone());
    let cache = CategoryCache::new(pool, events);
    (dir, courses, cache)
}

fn names(categories: &[ccm_common::db::models::Category]) -> Vec<&str> {
    categories.iter().map(|c| c.name.as_str()).collect()
}

#[tokio::test]
async fn successful_fetch_caches_and_merges() {
    let (_dir, courses, cache) = fixtures().await;
    let service = CategoryService::new(
        FixedSource(vec![dto("Math"), dto("Art")]),
        cache.clone(),
        courses,
    );

    let merged = service.get_categories().await.unwrap();
    assert_eq!(names(&merged), vec!["Art", "Math"]);

    // The fetch also landed in the cache
    let cached = cache.get_all().await.unwrap();
    assert_eq!(cached.len(), 2);
    assert!(cached.iter().all(|r| r.id == r.name));
}

#[tokio::test]
async fn fetch_failure_falls_back_to_cache_and_courses() {
    let (_dir, courses, cache) = fixtures().await;
    cache.upsert_all(&[row("Art"), row("Math")]).await.unwrap();
    courses.insert(&course("c1", "Science")).await.unwrap();

    let service = CategoryService::new(FailingSource, cache, courses);

    // Failure is absorbed, never surfaced
    let merged = service.get_categories().await.unwrap();
    assert_eq!(names(&merged), vec!["Art", "Math", "Science"]);
}

#[tokio::test]
async fn fetch_failure_with_empty_cache_and_no_courses_is_empty_not_error() {
    let (_dir, courses, cache) = fixtures().await;
    let service = CategoryService::new(FailingSource, cache, courses);

    let merged = service.get_categories().await.unwrap();
    assert!(merged.is_empty());
}

#[tokio::test]
async fn refetch_replaces_cache_row_for_same_name() {
    let (_dir, courses, cache) = fixtures().await;
    cache.upsert_all(&[row("History")]).await.unwrap();

    let service = CategoryService::new(
        FixedSource(vec![dto("History")]),
        cache.clone(),
        courses,
    );

    let merged = service.get_categories().await.unwrap();
    assert_eq!(names(&merged), vec!["History"]);
    assert_eq!(cache.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn remote_spelling_wins_over_course_derived_duplicate() {
    let (_dir, courses, cache) = fixtures().await;
    courses.insert(&course("c1", "design")).await.unwrap();

    let service = CategoryService::new(FixedSource(vec![dto("Design")]), cache, courses);

    let merged = service.get_categories().await.unwrap();
    assert_eq!(names(&merged), vec!["Design"]);
}

#[tokio::test]
async fn observe_categories_merges_both_live_sources() {
    let (_dir, courses, cache) = fixtures().await;
    cache.upsert_all(&[row("Art")]).await.unwrap();
    courses.insert(&course("c1", "Science")).await.unwrap();

    let service = CategoryService::new(FailingSource, cache, courses.clone());
    let stream = service.observe_categories();
    futures::pin_mut!(stream);

    let initial = stream.next().await.unwrap();
    assert_eq!(names(&initial), vec!["Art", "Science"]);

    // Deleting the only course referencing Science must drop it from the view
    courses.delete("c1").await.unwrap();
    let after_delete = stream.next().await.unwrap();
    assert_eq!(names(&after_delete), vec!["Art"]);
}

#[tokio::test]
async fn observe_categories_reacts_to_cache_writes_without_network() {
    let (_dir, courses, cache) = fixtures().await;

    // A failing remote never matters on the observe path
    let service = CategoryService::new(FailingSource, cache.clone(), courses);
    let stream = service.observe_categories();
    futures::pin_mut!(stream);

    assert!(stream.next().await.unwrap().is_empty());

    cache.upsert_all(&[row("Math")]).await.unwrap();
    let after_upsert = stream.next().await.unwrap();
    assert_eq!(names(&after_upsert), vec!["Math"]);
}
