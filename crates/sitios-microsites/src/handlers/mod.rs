//! Builder API: authenticated HTTP surface over the microsite services.

mod blocks;
mod microsites;
mod pages;

pub use blocks::*;
pub use microsites::*;
pub use pages::*;

use axum::{
    routing::{get, post, put},
    Router,
};
use sitios_core::error_builder::{bad_request, conflict, internal_server_error, not_found};
use sitios_core::problemdetails::Problem;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::services::{BlockService, MicrositeError, MicrositeService, PageService};

/// Application state trait for the builder routes.
pub trait MicrositesAppState: Send + Sync + 'static {
    fn microsite_service(&self) -> &MicrositeService;
    fn page_service(&self) -> &PageService;
    fn block_service(&self) -> &BlockService;
}

/// OpenAPI documentation for the builder endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        microsites::list_microsites,
        microsites::create_microsite,
        microsites::check_availability,
        microsites::get_public_microsite,
        microsites::get_microsite,
        microsites::update_microsite,
        microsites::delete_microsite,
        microsites::publish_microsite,
        microsites::unpublish_microsite,
        microsites::publish_check,
        pages::list_pages,
        pages::create_page,
        pages::reorder_pages,
        pages::update_page,
        pages::delete_page,
        pages::duplicate_page,
        blocks::list_blocks,
        blocks::create_block,
        blocks::reorder_blocks,
        blocks::update_block,
        blocks::delete_block,
        blocks::duplicate_block,
        blocks::toggle_block_visibility,
    ),
    components(
        schemas(
            crate::services::MicrositeResponse,
            crate::services::PageResponse,
            crate::services::BlockResponse,
            crate::services::AvailabilityResponse,
            crate::services::CreateMicrositeRequest,
            crate::services::UpdateMicrositeRequest,
            crate::services::CreatePageRequest,
            crate::services::UpdatePageRequest,
            crate::services::CreateBlockRequest,
            crate::services::UpdateBlockRequest,
            crate::services::ReorderEntry,
            crate::services::ReorderRequest,
            crate::services::PublishCheck,
            microsites::PublicMicrositeResponse,
            sitios_core::Paginated<crate::services::MicrositeResponse>,
        )
    ),
    tags(
        (name = "Microsites", description = "Microsite builder endpoints"),
    )
)]
pub struct MicrositesApiDoc;

pub fn create_router<T: MicrositesAppState>() -> Router<Arc<T>> {
    Router::new()
        .route(
            "/microsites",
            get(list_microsites::<T>).post(create_microsite::<T>),
        )
        .route(
            "/microsites/check-availability",
            get(check_availability::<T>),
        )
        .route(
            "/microsites/public/{subdomain}",
            get(get_public_microsite::<T>),
        )
        .route(
            "/microsites/{id}",
            get(get_microsite::<T>)
                .put(update_microsite::<T>)
                .delete(delete_microsite::<T>),
        )
        .route("/microsites/{id}/publish", post(publish_microsite::<T>))
        .route("/microsites/{id}/unpublish", post(unpublish_microsite::<T>))
        .route("/microsites/{id}/publish-check", get(publish_check::<T>))
        .route(
            "/microsites/{id}/pages",
            get(list_pages::<T>).post(create_page::<T>),
        )
        .route("/microsites/{id}/pages/reorder", put(reorder_pages::<T>))
        .route(
            "/microsites/{id}/pages/{page_id}",
            put(update_page::<T>).delete(delete_page::<T>),
        )
        .route(
            "/microsites/{id}/pages/{page_id}/duplicate",
            post(duplicate_page::<T>),
        )
        .route(
            "/microsites/{id}/pages/{page_id}/blocks",
            get(list_blocks::<T>).post(create_block::<T>),
        )
        .route(
            "/microsites/{id}/pages/{page_id}/blocks/reorder",
            put(reorder_blocks::<T>),
        )
        .route(
            "/microsites/{id}/pages/{page_id}/blocks/{block_id}",
            put(update_block::<T>).delete(delete_block::<T>),
        )
        .route(
            "/microsites/{id}/pages/{page_id}/blocks/{block_id}/duplicate",
            post(duplicate_block::<T>),
        )
        .route(
            "/microsites/{id}/pages/{page_id}/blocks/{block_id}/toggle-visibility",
            post(toggle_block_visibility::<T>),
        )
}

/// Map domain errors to problem responses at the HTTP boundary.
pub(crate) fn map_error(error: MicrositeError) -> Problem {
    match error {
        MicrositeError::NotFound => not_found().detail("Resource not found").build(),
        MicrositeError::Conflict(msg) => {
            tracing::debug!("uniqueness conflict: {}", msg);
            conflict()
                .detail("The requested slug, subdomain or domain is already taken")
                .build()
        }
        MicrositeError::Validation(msg) => bad_request().detail(&msg).build(),
        MicrositeError::PublishGate(errors) => bad_request()
            .type_("https://sitios.dev/probs/publish-requirements")
            .title("Publish Requirements Not Met")
            .detail("The microsite does not meet the publish requirements")
            .value("errors", errors)
            .build(),
        MicrositeError::LastResource(msg) => bad_request().detail(&msg).build(),
        MicrositeError::Database(err) => {
            tracing::error!("Database error: {}", err);
            internal_server_error()
                .detail("Database error while processing microsite request")
                .build()
        }
    }
}
