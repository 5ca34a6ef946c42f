//! Core utilities and types shared across all Sitios crates

pub mod error;
pub mod error_builder;
pub mod pagination;
pub mod plugin;
pub mod problemdetails;
pub mod types;

pub use error::*;
pub use error_builder::*;
pub use pagination::*;
pub use problemdetails::Problem;
pub use types::*;

// Re-export external dependencies for plugin implementations
pub use anyhow;
pub use chrono;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tracing;
