//! Microsite content tree and builder API
//!
//! Owns the microsite → pages → content-blocks hierarchy: transactional CRUD
//! with the tree invariants (per-tenant slug uniqueness, single home page,
//! last-page protection), the publish gate, and the authenticated builder
//! endpoints that compose them.

pub mod handlers;
pub mod plugin;
pub mod services;

#[cfg(test)]
mod tests;

pub use plugin::MicrositesPlugin;
pub use services::{
    BlockService, MicrositeError, MicrositeService, PageService, PublishCheck,
};
