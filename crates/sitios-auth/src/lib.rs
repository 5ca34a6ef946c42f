//! Seam to the external identity provider
//!
//! Identity lives outside this system: tokens are issued and validated by the
//! federation's auth provider. This crate carries the provider trait, the
//! bearer-token middleware that attaches the resolved `Principal` to the
//! request, and the `RequireAuth` extractor used by authenticated handlers.

pub mod extractor;
pub mod middleware;
pub mod plugin;
pub mod provider;
pub mod types;

pub use extractor::RequireAuth;
pub use middleware::{auth_middleware, AuthState};
pub use plugin::AuthPlugin;
pub use provider::{AuthProvider, StaticTokenProvider};
pub use types::{Principal, Role};
