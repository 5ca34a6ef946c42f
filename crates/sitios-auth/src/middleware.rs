use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::provider::AuthProvider;

/// Shared state for the auth middleware.
pub struct AuthState {
    pub provider: Arc<dyn AuthProvider>,
}

/// Validates the Authorization header if present and attaches the resolved
/// `Principal` as a request extension. Requests without (or with invalid)
/// credentials continue without a principal; the `RequireAuth` extractor
/// rejects them later on routes that need one.
pub async fn auth_middleware(state: Arc<AuthState>, mut req: Request, next: Next) -> Response {
    // The token is copied out before awaiting the provider; holding a borrow
    // of the request across that await would make the future non-Send.
    if let Some(token) = bearer_token(&req) {
        if let Some(principal) = state.provider.validate_token(&token).await {
            debug!(user_id = principal.user_id, "authenticated request");
            req.extensions_mut().insert(principal);
        }
    }

    next.run(req).await
}

fn bearer_token(req: &Request) -> Option<String> {
    let auth_header = req.headers().get("authorization")?.to_str().ok()?;
    auth_header.strip_prefix("Bearer ").map(str::to_string)
}
