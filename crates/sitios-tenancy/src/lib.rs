//! Subdomain-to-tenant resolution
//!
//! The tenant directory maps a subdomain label to its microsite record; the
//! resolver middleware inspects the inbound Host header once per request,
//! before route dispatch, and attaches the resolved tenant to the request.

pub mod directory;
pub mod plugin;
pub mod resolver;
pub mod subdomain;

#[cfg(test)]
mod tests;

pub use directory::TenantDirectory;
pub use plugin::TenancyPlugin;
pub use resolver::{tenant_resolver_middleware, ResolvedTenant};
pub use subdomain::{candidate_label, validate_subdomain, SubdomainError, TenancyConfig};
