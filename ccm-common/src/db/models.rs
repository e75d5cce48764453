//! Database models

use serde::{Deserialize, Serialize};

/// A user-owned catalog entry
///
/// `score` is derived at save time (title length in code points × lessons)
/// and stored denormalized so list views never recompute it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Category display name; doubles as the category identity
    pub category_id: String,
    pub lessons: i64,
    pub score: i64,
    /// Epoch milliseconds, immutable after creation
    pub created_at: i64,
    /// Epoch milliseconds of the last edit, NULL until first update
    pub updated_at: Option<i64>,
}

/// A cached category row, written in bulk after a successful remote fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    /// Epoch milliseconds of the cache write
    pub fetched_at: i64,
}

/// A category as presented to consumers (merged-view item)
///
/// In the deployed policy the id *is* the display name, for both cached and
/// course-derived categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    /// Materialize a category from a course's `category_id` string
    pub fn derived(name: String) -> Self {
        Self {
            id: name.clone(),
            name,
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}
