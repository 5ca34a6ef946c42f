//! Public microsite renderer
//!
//! Serves the tenant-facing side of the platform: page selection by slug,
//! content-block assembly with visibility and feature gating, navigation,
//! generated theme CSS, and HTML/JSON serialization negotiated per request.

pub mod plugin;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

pub use plugin::RendererPlugin;
pub use routes::site_router;
pub use services::{RendererError, RendererService};
