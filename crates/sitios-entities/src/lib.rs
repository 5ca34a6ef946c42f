//! Database entities for the Sitios microsite platform
//!
//! Three related tables form the content tree: microsites (tenant roots),
//! pages, and content_blocks. Typed JSON payloads (theme, SEO, contact info,
//! block content) live in `types`.

pub mod content_blocks;
pub mod microsites;
pub mod pages;
pub mod types;
