//! Persisted stores for courses and cached categories

pub mod categories;
pub mod courses;

pub use categories::CategoryCache;
pub use courses::CourseStore;
