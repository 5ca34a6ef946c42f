use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::IntoResponse;
use sitios_core::error_builder::unauthorized;

use crate::types::Principal;

/// Extractor that rejects requests without an authenticated principal.
pub struct RequireAuth(pub Principal);

impl RequireAuth {
    pub fn user_id(&self) -> i32 {
        self.0.user_id
    }

    pub fn principal(&self) -> Principal {
        self.0
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .map(RequireAuth)
            .ok_or_else(|| {
                unauthorized()
                    .detail("This operation requires authentication")
                    .build()
                    .into_response()
            })
    }
}
