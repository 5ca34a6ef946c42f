use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sitios_auth::RequireAuth;
use sitios_core::problemdetails::Problem;
use std::sync::Arc;

use super::{map_error, MicrositesAppState};
use crate::services::{CreatePageRequest, PageResponse, ReorderRequest, UpdatePageRequest};

/// List the pages of a microsite in navigation order
#[utoipa::path(
    get,
    path = "/microsites/{id}/pages",
    params(("id" = i32, Path, description = "Microsite ID")),
    responses(
        (status = 200, description = "Pages of the microsite", body = Vec<PageResponse>),
        (status = 404, description = "Microsite not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn list_pages<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .page_service()
        .list(&principal, id)
        .await
        .map(|pages| Json(pages.into_iter().map(PageResponse::from).collect::<Vec<_>>()))
        .map_err(map_error)
}

/// Create a page
#[utoipa::path(
    post,
    path = "/microsites/{id}/pages",
    request_body = CreatePageRequest,
    params(("id" = i32, Path, description = "Microsite ID")),
    responses(
        (status = 201, description = "Page created", body = PageResponse),
        (status = 400, description = "Invalid title or slug"),
        (status = 404, description = "Microsite not found"),
        (status = 409, description = "Slug already used within the microsite"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn create_page<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i32>,
    Json(request): Json<CreatePageRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .page_service()
        .create(&principal, id, request)
        .await
        .map(|p| (StatusCode::CREATED, Json(PageResponse::from(p))))
        .map_err(map_error)
}

/// Reorder the pages of a microsite in one batch
#[utoipa::path(
    put,
    path = "/microsites/{id}/pages/reorder",
    request_body = ReorderRequest,
    params(("id" = i32, Path, description = "Microsite ID")),
    responses(
        (status = 200, description = "Pages in their new order", body = Vec<PageResponse>),
        (status = 400, description = "An id does not belong to the microsite"),
        (status = 404, description = "Microsite not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn reorder_pages<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i32>,
    Json(request): Json<ReorderRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .page_service()
        .reorder(&principal, id, request)
        .await
        .map(|pages| Json(pages.into_iter().map(PageResponse::from).collect::<Vec<_>>()))
        .map_err(map_error)
}

/// Update a page
#[utoipa::path(
    put,
    path = "/microsites/{id}/pages/{page_id}",
    request_body = UpdatePageRequest,
    params(
        ("id" = i32, Path, description = "Microsite ID"),
        ("page_id" = i32, Path, description = "Page ID"),
    ),
    responses(
        (status = 200, description = "Updated page", body = PageResponse),
        (status = 400, description = "Invalid change or protected page"),
        (status = 404, description = "Page not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn update_page<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path((id, page_id)): Path<(i32, i32)>,
    Json(request): Json<UpdatePageRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .page_service()
        .update(&principal, id, page_id, request)
        .await
        .map(|p| Json(PageResponse::from(p)))
        .map_err(map_error)
}

/// Delete a page; the last page of a microsite cannot be deleted
#[utoipa::path(
    delete,
    path = "/microsites/{id}/pages/{page_id}",
    params(
        ("id" = i32, Path, description = "Microsite ID"),
        ("page_id" = i32, Path, description = "Page ID"),
    ),
    responses(
        (status = 200, description = "Page deleted"),
        (status = 400, description = "Last page of the microsite"),
        (status = 404, description = "Page not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn delete_page<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path((id, page_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .page_service()
        .delete(&principal, id, page_id)
        .await
        .map(|_| StatusCode::OK)
        .map_err(map_error)
}

/// Duplicate a page with all its content blocks
#[utoipa::path(
    post,
    path = "/microsites/{id}/pages/{page_id}/duplicate",
    params(
        ("id" = i32, Path, description = "Microsite ID"),
        ("page_id" = i32, Path, description = "Page ID"),
    ),
    responses(
        (status = 201, description = "The duplicate, unpublished and never home", body = PageResponse),
        (status = 404, description = "Page not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn duplicate_page<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path((id, page_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .page_service()
        .duplicate(&principal, id, page_id)
        .await
        .map(|p| (StatusCode::CREATED, Json(PageResponse::from(p))))
        .map_err(map_error)
}
