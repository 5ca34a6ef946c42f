//! Tenant-facing routes, mounted on the host-steered side of the server.
//!
//! Every handler requires a resolved tenant on the request; a request that
//! reaches these routes without one gets a 404, never an error page.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use sitios_core::error_builder::{internal_server_error, not_found};
use sitios_entities::microsites;
use sitios_entities::types::MicrositeStatus;
use sitios_tenancy::ResolvedTenant;
use std::sync::Arc;

use crate::services::{render_html_document, RendererError, RendererService};

pub fn site_router(service: Arc<RendererService>) -> Router {
    Router::new()
        .route("/", get(serve_home))
        .route("/navigation", get(serve_navigation))
        .route("/theme.css", get(serve_theme))
        .route("/{slug}", get(serve_page))
        .with_state(service)
}

async fn serve_home(
    State(service): State<Arc<RendererService>>,
    tenant: Option<Extension<ResolvedTenant>>,
    headers: HeaderMap,
) -> Response {
    serve(service, tenant, headers, String::new()).await
}

async fn serve_page(
    State(service): State<Arc<RendererService>>,
    tenant: Option<Extension<ResolvedTenant>>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Response {
    serve(service, tenant, headers, slug).await
}

async fn serve(
    service: Arc<RendererService>,
    tenant: Option<Extension<ResolvedTenant>>,
    headers: HeaderMap,
    slug: String,
) -> Response {
    let Some(microsite) = live_tenant(&tenant) else {
        return no_tenant();
    };

    let document = match service.render_page(microsite, &slug).await {
        Ok(document) => document,
        Err(err) => return map_error(err),
    };

    if prefers_json(&headers) {
        return Json(document).into_response();
    }

    let navigation = match service.navigation(microsite).await {
        Ok(navigation) => navigation,
        Err(err) => return map_error(err),
    };

    Html(render_html_document(&document, &navigation)).into_response()
}

async fn serve_navigation(
    State(service): State<Arc<RendererService>>,
    tenant: Option<Extension<ResolvedTenant>>,
) -> Response {
    let Some(microsite) = live_tenant(&tenant) else {
        return no_tenant();
    };

    match service.navigation(microsite).await {
        Ok(navigation) => Json(navigation).into_response(),
        Err(err) => map_error(err),
    }
}

async fn serve_theme(
    State(service): State<Arc<RendererService>>,
    tenant: Option<Extension<ResolvedTenant>>,
) -> Response {
    let Some(microsite) = live_tenant(&tenant) else {
        return no_tenant();
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        service.stylesheet(microsite),
    )
        .into_response()
}

/// Only live sites render; a draft tenant behaves as if it did not exist.
fn live_tenant(tenant: &Option<Extension<ResolvedTenant>>) -> Option<&microsites::Model> {
    let Extension(tenant) = tenant.as_ref()?;
    let microsite = tenant.microsite();
    (microsite.status == MicrositeStatus::Published && microsite.is_public).then_some(microsite)
}

/// Structured data wins when the client explicitly asks for JSON.
fn prefers_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("application/json"))
        .unwrap_or(false)
}

fn no_tenant() -> Response {
    not_found()
        .detail("No microsite is served under this host")
        .build()
        .into_response()
}

fn map_error(error: RendererError) -> Response {
    match error {
        RendererError::NotFound => not_found()
            .detail("Page not found")
            .build()
            .into_response(),
        RendererError::Database(err) => {
            tracing::error!("Database error while rendering: {}", err);
            internal_server_error()
                .detail("Error rendering the page")
                .build()
                .into_response()
        }
    }
}
