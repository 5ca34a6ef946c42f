use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use sitios_auth::RequireAuth;
use sitios_core::problemdetails::Problem;
use sitios_core::{PageQuery, Paginated};
use sitios_entities::types::{MicrositeStatus, OwnerType};
use std::sync::Arc;
use utoipa::ToSchema;

use super::{map_error, MicrositesAppState};
use crate::services::{
    AvailabilityResponse, CreateMicrositeRequest, MicrositeListFilter, MicrositeResponse,
    PageResponse, PublishCheck, UpdateMicrositeRequest,
};

#[derive(Deserialize)]
pub struct MicrositeListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub owner_type: Option<OwnerType>,
    pub status: Option<MicrositeStatus>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub subdomain: Option<String>,
    pub slug: Option<String>,
}

/// A live microsite as served to anonymous visitors.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicMicrositeResponse {
    pub microsite: MicrositeResponse,
    pub pages: Vec<PageResponse>,
}

/// List microsites visible to the caller
#[utoipa::path(
    get,
    path = "/microsites",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<u64>, Query, description = "Page size, at most 100"),
        ("owner_type" = Option<OwnerType>, Query, description = "Filter by owner type"),
        ("status" = Option<MicrositeStatus>, Query, description = "Filter by lifecycle status"),
    ),
    responses(
        (status = 200, description = "Paginated microsite list", body = Paginated<MicrositeResponse>),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn list_microsites<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Query(query): Query<MicrositeListQuery>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    let page_query = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let filter = MicrositeListFilter {
        owner_type: query.owner_type,
        status: query.status,
    };

    state
        .microsite_service()
        .list(&principal, &filter, &page_query)
        .await
        .map(|page| {
            Json(Paginated {
                items: page
                    .items
                    .into_iter()
                    .map(MicrositeResponse::from)
                    .collect::<Vec<_>>(),
                current_page: page.current_page,
                total_pages: page.total_pages,
                total_items: page.total_items,
            })
        })
        .map_err(map_error)
}

/// Create a microsite
#[utoipa::path(
    post,
    path = "/microsites",
    request_body = CreateMicrositeRequest,
    responses(
        (status = 201, description = "Microsite created", body = MicrositeResponse),
        (status = 400, description = "Invalid name, slug or subdomain"),
        (status = 409, description = "Slug or subdomain already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn create_microsite<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Json(request): Json<CreateMicrositeRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .microsite_service()
        .create(&principal, request)
        .await
        .map(|m| (StatusCode::CREATED, Json(MicrositeResponse::from(m))))
        .map_err(map_error)
}

/// Check whether a subdomain and/or slug is still free
#[utoipa::path(
    get,
    path = "/microsites/check-availability",
    params(
        ("subdomain" = Option<String>, Query, description = "Subdomain to check"),
        ("slug" = Option<String>, Query, description = "Slug to check"),
    ),
    responses(
        (status = 200, description = "Availability per requested field", body = AvailabilityResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn check_availability<T>(
    State(state): State<Arc<T>>,
    RequireAuth(_principal): RequireAuth,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .microsite_service()
        .check_availability(query.subdomain.as_deref(), query.slug.as_deref())
        .await
        .map(Json)
        .map_err(map_error)
}

/// Fetch a live microsite by subdomain; anonymous
#[utoipa::path(
    get,
    path = "/microsites/public/{subdomain}",
    params(
        ("subdomain" = String, Path, description = "Tenant subdomain"),
    ),
    responses(
        (status = 200, description = "Published microsite with its published pages", body = PublicMicrositeResponse),
        (status = 404, description = "No live microsite under that subdomain"),
    ),
    tag = "Microsites"
)]
pub async fn get_public_microsite<T>(
    State(state): State<Arc<T>>,
    Path(subdomain): Path<String>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .microsite_service()
        .get_public(&subdomain)
        .await
        .map(|(microsite, pages)| {
            Json(PublicMicrositeResponse {
                microsite: microsite.into(),
                pages: pages.into_iter().map(PageResponse::from).collect(),
            })
        })
        .map_err(map_error)
}

/// Fetch one of the caller's microsites
#[utoipa::path(
    get,
    path = "/microsites/{id}",
    params(("id" = i32, Path, description = "Microsite ID")),
    responses(
        (status = 200, description = "Microsite", body = MicrositeResponse),
        (status = 404, description = "Microsite not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn get_microsite<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .microsite_service()
        .get(&principal, id)
        .await
        .map(|m| Json(MicrositeResponse::from(m)))
        .map_err(map_error)
}

/// Update a microsite
#[utoipa::path(
    put,
    path = "/microsites/{id}",
    request_body = UpdateMicrositeRequest,
    params(("id" = i32, Path, description = "Microsite ID")),
    responses(
        (status = 200, description = "Updated microsite", body = MicrositeResponse),
        (status = 404, description = "Microsite not found"),
        (status = 409, description = "Slug, subdomain or domain already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn update_microsite<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i32>,
    Json(request): Json<UpdateMicrositeRequest>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .microsite_service()
        .update(&principal, id, request)
        .await
        .map(|m| Json(MicrositeResponse::from(m)))
        .map_err(map_error)
}

/// Delete a microsite and its whole content tree
#[utoipa::path(
    delete,
    path = "/microsites/{id}",
    params(("id" = i32, Path, description = "Microsite ID")),
    responses(
        (status = 200, description = "Microsite deleted"),
        (status = 404, description = "Microsite not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn delete_microsite<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .microsite_service()
        .delete(&principal, id)
        .await
        .map(|_| StatusCode::OK)
        .map_err(map_error)
}

/// Publish a microsite after the publish rules pass
#[utoipa::path(
    post,
    path = "/microsites/{id}/publish",
    params(("id" = i32, Path, description = "Microsite ID")),
    responses(
        (status = 200, description = "Microsite published", body = MicrositeResponse),
        (status = 400, description = "Publish requirements not met; body carries all violations"),
        (status = 404, description = "Microsite not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn publish_microsite<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .microsite_service()
        .publish(&principal, id)
        .await
        .map(|m| Json(MicrositeResponse::from(m)))
        .map_err(map_error)
}

/// Take a microsite offline; always succeeds for the owner
#[utoipa::path(
    post,
    path = "/microsites/{id}/unpublish",
    params(("id" = i32, Path, description = "Microsite ID")),
    responses(
        (status = 200, description = "Microsite unpublished", body = MicrositeResponse),
        (status = 404, description = "Microsite not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn unpublish_microsite<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .microsite_service()
        .unpublish(&principal, id)
        .await
        .map(|m| Json(MicrositeResponse::from(m)))
        .map_err(map_error)
}

/// Dry-run the publish rules
#[utoipa::path(
    get,
    path = "/microsites/{id}/publish-check",
    params(("id" = i32, Path, description = "Microsite ID")),
    responses(
        (status = 200, description = "Rule evaluation result", body = PublishCheck),
        (status = 404, description = "Microsite not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Microsites"
)]
pub async fn publish_check<T>(
    State(state): State<Arc<T>>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, Problem>
where
    T: MicrositesAppState,
{
    state
        .microsite_service()
        .publish_check(&principal, id)
        .await
        .map(Json)
        .map_err(map_error)
}
