//! Course editing workflow
//!
//! Validates form input, computes the derived score, assigns identity and
//! timestamps, and persists through the course store. Validation messages
//! are exact user-facing strings; their order is fixed (title, description,
//! category, lessons) and the first failing field wins.

use ccm_common::db::models::Course;
use ccm_common::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use uuid::Uuid;

use crate::store::CourseStore;

/// Editable form state for a course
#[derive(Debug, Clone)]
pub struct CourseForm {
    pub title: String,
    pub description: String,
    pub category_id: Option<String>,
    /// Raw text field; must parse to an integer > 0
    pub lessons: String,
}

impl Default for CourseForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category_id: None,
            lessons: "1".to_string(),
        }
    }
}

pub struct CourseEditor {
    courses: CourseStore,
    saving: AtomicBool,
}

impl CourseEditor {
    pub fn new(courses: CourseStore) -> Self {
        Self {
            courses,
            saving: AtomicBool::new(false),
        }
    }

    /// Whether a save is currently in flight
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// Prefill a form from an existing course, if it exists
    pub async fn load(&self, id: &str) -> Result<Option<CourseForm>> {
        let Some(course) = self.courses.get_by_id(id).await? else {
            return Ok(None);
        };

        Ok(Some(CourseForm {
            title: course.title,
            description: course.description,
            category_id: Some(course.category_id),
            lessons: course.lessons.to_string(),
        }))
    }

    /// Validate and persist a course
    ///
    /// Without `existing_id` this creates a new course (fresh UUID, both
    /// timestamps set to now). With it, the original `created_at` is kept by
    /// loading the stored record first; if the id no longer matches a row
    /// the update is a store-level no-op. Persistence faults propagate to
    /// the caller without retry; the saving flag is cleared on every exit
    /// path.
    pub async fn save(&self, existing_id: Option<&str>, form: &CourseForm) -> Result<Course> {
        let title = form.title.trim();
        let description = form.description.trim();

        if title.is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }
        if description.is_empty() {
            return Err(Error::Validation("Description is required".to_string()));
        }
        let category_id = match form.category_id.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => return Err(Error::Validation("Category required".to_string())),
        };
        let lessons = form.lessons.trim().parse::<i64>().unwrap_or(0);
        if lessons <= 0 {
            return Err(Error::Validation("Lessons must be > 0".to_string()));
        }

        // Code-point count, not bytes: "日本語" is three characters
        let score = title.chars().count() as i64 * lessons;
        let now = chrono::Utc::now().timestamp_millis();

        self.saving.store(true, Ordering::SeqCst);
        let result = self
            .persist(existing_id, title, description, category_id, lessons, score, now)
            .await;
        self.saving.store(false, Ordering::SeqCst);
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn persist(
        &self,
        existing_id: Option<&str>,
        title: &str,
        description: &str,
        category_id: &str,
        lessons: i64,
        score: i64,
        now: i64,
    ) -> Result<Course> {
        match existing_id {
            None => {
                let course = Course {
                    id: Uuid::new_v4().to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    category_id: category_id.to_string(),
                    lessons,
                    score,
                    created_at: now,
                    updated_at: Some(now),
                };
                self.courses.insert(&course).await?;
                debug!(id = %course.id, "course created");
                Ok(course)
            }
            Some(id) => {
                // created_at survives edits; if the record vanished the
                // update below matches no row anyway
                let created_at = self
                    .courses
                    .get_by_id(id)
                    .await?
                    .map(|c| c.created_at)
                    .unwrap_or(now);

                let course = Course {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    category_id: category_id.to_string(),
                    lessons,
                    score,
                    created_at,
                    updated_at: Some(now),
                };
                self.courses.update(&course).await?;
                debug!(id = %course.id, "course updated");
                Ok(course)
            }
        }
    }
}
