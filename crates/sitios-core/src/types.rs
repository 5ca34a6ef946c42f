//! Common type aliases shared across all Sitios crates

use chrono::{DateTime as ChronoDateTime, Utc};

/// Canonical datetime type for database TIMESTAMPTZ columns and API
/// responses (serializes as ISO 8601 with 'Z' suffix).
///
/// # OpenAPI Schema
/// When using with utoipa, add the schema attribute:
/// ```rust,ignore
/// #[schema(value_type = String, format = DateTime)]
/// pub field: UtcDateTime,
/// ```
pub type UtcDateTime = ChronoDateTime<Utc>;

/// Alias kept for entity code that reads closer to the column type.
pub type DBDateTime = ChronoDateTime<Utc>;
