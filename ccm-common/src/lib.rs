//! # CCM Common Library
//!
//! Shared code for the course catalog manager (ccm) including:
//! - Database initialization, models and queries
//! - Event types (CatalogEvent enum) and the EventBus
//! - Configuration resolution (root folder, remote API base URL)
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use error::{Error, Result};
