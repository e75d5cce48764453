//! ccm-catalog library - course catalog service
//!
//! Owns the persisted course and category-cache stores, the remote category
//! client, the category reconciliation service, and the course editing
//! workflow. The binary in `main.rs` wires these together; UI layers consume
//! the same types in-process.

pub mod editor;
pub mod reconcile;
pub mod remote;
pub mod store;

pub use editor::{CourseEditor, CourseForm};
pub use reconcile::CategoryService;
pub use remote::{CategoryApiClient, CategorySource};
pub use store::{CategoryCache, CourseStore};
