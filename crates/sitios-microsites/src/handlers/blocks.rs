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
use crate::services::{BlockResponse, CreateBlockRequest, ReorderRequest, UpdateBlockRequest};

/// List the blocks of a page in render order, hidden ones included
#[utoipa::path(
    get,
    path = "/microsites/{id}/pages/{page_id}/blocks",
    params(
        ("id" = i32, Path, description = "Microsite ID"),
        ("page_id" = i32, Path, description = "Page ID"),
    ),
    responses(
        (status = 200, description = "Blocks of the page", body = Vec<BlockResponse>),
        (status = 404, description = "Page not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn list_blocks<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path((id, page_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .block_service()
        .list(&principal, id, page_id)
        .await
        .map(|blocks| {
            Json(
                blocks
                    .into_iter()
                    .map(BlockResponse::from)
                    .collect::<Vec<_>>(),
            )
        })
        .map_err(map_error)
}

/// Create a content block; the payload is validated against the block type
#[utoipa::path(
    post,
    path = "/microsites/{id}/pages/{page_id}/blocks",
    request_body = CreateBlockRequest,
    params(
        ("id" = i32, Path, description = "Microsite ID"),
        ("page_id" = i32, Path, description = "Page ID"),
    ),
    responses(
        (status = 201, description = "Block created", body = BlockResponse),
        (status = 400, description = "Payload does not match the block type"),
        (status = 404, description = "Page not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn create_block<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path((id, page_id)): Path<(i32, i32)>,
    Json(request): Json<CreateBlockRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .block_service()
        .create(&principal, id, page_id, request)
        .await
        .map(|b| (StatusCode::CREATED, Json(BlockResponse::from(b))))
        .map_err(map_error)
}

/// Reorder the blocks of a page in one batch
#[utoipa::path(
    put,
    path = "/microsites/{id}/pages/{page_id}/blocks/reorder",
    request_body = ReorderRequest,
    params(
        ("id" = i32, Path, description = "Microsite ID"),
        ("page_id" = i32, Path, description = "Page ID"),
    ),
    responses(
        (status = 200, description = "Blocks in their new order", body = Vec<BlockResponse>),
        (status = 400, description = "An id does not belong to the page"),
        (status = 404, description = "Page not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn reorder_blocks<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path((id, page_id)): Path<(i32, i32)>,
    Json(request): Json<ReorderRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .block_service()
        .reorder(&principal, id, page_id, request)
        .await
        .map(|blocks| {
            Json(
                blocks
                    .into_iter()
                    .map(BlockResponse::from)
                    .collect::<Vec<_>>(),
            )
        })
        .map_err(map_error)
}

/// Update a block's payload, order or visibility; its type never changes
#[utoipa::path(
    put,
    path = "/microsites/{id}/pages/{page_id}/blocks/{block_id}",
    request_body = UpdateBlockRequest,
    params(
        ("id" = i32, Path, description = "Microsite ID"),
        ("page_id" = i32, Path, description = "Page ID"),
        ("block_id" = i32, Path, description = "Block ID"),
    ),
    responses(
        (status = 200, description = "Updated block", body = BlockResponse),
        (status = 400, description = "Payload does not match the block type"),
        (status = 404, description = "Block not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn update_block<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path((id, page_id, block_id)): Path<(i32, i32, i32)>,
    Json(request): Json<UpdateBlockRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .block_service()
        .update(&principal, id, page_id, block_id, request)
        .await
        .map(|b| Json(BlockResponse::from(b)))
        .map_err(map_error)
}

/// Delete a block
#[utoipa::path(
    delete,
    path = "/microsites/{id}/pages/{page_id}/blocks/{block_id}",
    params(
        ("id" = i32, Path, description = "Microsite ID"),
        ("page_id" = i32, Path, description = "Page ID"),
        ("block_id" = i32, Path, description = "Block ID"),
    ),
    responses(
        (status = 200, description = "Block deleted"),
        (status = 404, description = "Block not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn delete_block<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path((id, page_id, block_id)): Path<(i32, i32, i32)>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .block_service()
        .delete(&principal, id, page_id, block_id)
        .await
        .map(|_| StatusCode::OK)
        .map_err(map_error)
}

/// Duplicate a block; the copy lands at the end of the page
#[utoipa::path(
    post,
    path = "/microsites/{id}/pages/{page_id}/blocks/{block_id}/duplicate",
    params(
        ("id" = i32, Path, description = "Microsite ID"),
        ("page_id" = i32, Path, description = "Page ID"),
        ("block_id" = i32, Path, description = "Block ID"),
    ),
    responses(
        (status = 201, description = "The duplicate", body = BlockResponse),
        (status = 404, description = "Block not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn duplicate_block<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path((id, page_id, block_id)): Path<(i32, i32, i32)>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .block_service()
        .duplicate(&principal, id, page_id, block_id)
        .await
        .map(|b| (StatusCode::CREATED, Json(BlockResponse::from(b))))
        .map_err(map_error)
}

/// Flip a block's visibility
#[utoipa::path(
    post,
    path = "/microsites/{id}/pages/{page_id}/blocks/{block_id}/toggle-visibility",
    params(
        ("id" = i32, Path, description = "Microsite ID"),
        ("page_id" = i32, Path, description = "Page ID"),
        ("block_id" = i32, Path, description = "Block ID"),
    ),
    responses(
        (status = 200, description = "Block with its new visibility", body = BlockResponse),
        (status = 404, description = "Block not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn toggle_block_visibility<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path((id, page_id, block_id)): Path<(i32, i32, i32)>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .block_service()
        .toggle_visibility(&principal, id, page_id, block_id)
        .await
        .map(|b| Json(BlockResponse::from(b)))
        .map_err(map_error)
}
