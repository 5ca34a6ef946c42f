use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use sitios_core::UtcDateTime;
use sitios_entities::types::{
    ColorScheme, ContactInfo, ContentBlockType, FeatureToggles, MicrositeStatus, OwnerType,
    SeoMetadata,
};
use sitios_entities::{content_blocks, microsites, pages};
use thiserror::Error;
use utoipa::ToSchema;

/// Domain errors for the microsite content tree.
///
/// `NotFound` covers both a missing record and a record owned by someone
/// else; the two cases are intentionally indistinguishable to the caller.
#[derive(Error, Debug)]
pub enum MicrositeError {
    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Publish requirements not met")]
    PublishGate(Vec<String>),

    #[error("{0}")]
    LastResource(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DbErr> for MicrositeError {
    fn from(err: DbErr) -> Self {
        // Unique-index violations are the authoritative conflict signal; two
        // concurrent creates racing on one subdomain both pass the pre-check
        // but only one insert survives the constraint.
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return MicrositeError::Conflict(detail);
        }
        MicrositeError::Database(err.to_string())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMicrositeRequest {
    pub name: String,
    pub slug: String,
    pub subdomain: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_type: OwnerType,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMicrositeRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub subdomain: Option<String>,
    /// `Some(None)` clears the custom domain
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub custom_domain: Option<Option<String>>,
    pub description: Option<String>,
    pub color_scheme: Option<ColorScheme>,
    pub seo: Option<SeoMetadata>,
    pub contact_info: Option<ContactInfo>,
    pub features: Option<FeatureToggles>,
}

/// Deserializes a nullable, omittable JSON field into `Option<Option<T>>`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MicrositeListFilter {
    pub owner_type: Option<OwnerType>,
    pub status: Option<MicrositeStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub is_home_page: bool,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_home_page: Option<bool>,
    pub is_published: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlockRequest {
    pub block_type: ContentBlockType,
    pub content: serde_json::Value,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlockRequest {
    pub content: Option<serde_json::Value>,
    pub sort_order: Option<i32>,
    pub is_visible: Option<bool>,
}

/// One (id, sortOrder) pair of a reorder batch. The batch is all-or-nothing:
/// an id outside the claimed parent fails the whole batch.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderEntry {
    pub id: i32,
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub orderings: Vec<ReorderEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MicrositeResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub subdomain: String,
    pub custom_domain: Option<String>,
    pub description: Option<String>,
    pub owner_id: i32,
    pub owner_type: OwnerType,
    pub status: MicrositeStatus,
    pub is_public: bool,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub published_at: Option<UtcDateTime>,
    pub color_scheme: Option<ColorScheme>,
    pub seo: Option<SeoMetadata>,
    pub contact_info: Option<ContactInfo>,
    pub features: Option<FeatureToggles>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: UtcDateTime,
}

impl From<microsites::Model> for MicrositeResponse {
    fn from(model: microsites::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            subdomain: model.subdomain,
            custom_domain: model.custom_domain,
            description: model.description,
            owner_id: model.owner_id,
            owner_type: model.owner_type,
            status: model.status,
            is_public: model.is_public,
            published_at: model.published_at,
            color_scheme: model.color_scheme,
            seo: model.seo,
            contact_info: model.contact_info,
            features: model.features,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub id: i32,
    pub microsite_id: i32,
    pub slug: String,
    pub title: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_home_page: bool,
    pub is_published: bool,
    pub sort_order: i32,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: UtcDateTime,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: UtcDateTime,
}

impl From<pages::Model> for PageResponse {
    fn from(model: pages::Model) -> Self {
        Self {
            id: model.id,
            microsite_id: model.microsite_id,
            slug: model.slug,
            title: model.title,
            meta_title: model.meta_title,
            meta_description: model.meta_description,
            is_home_page: model.is_home_page,
            is_published: model.is_published,
            sort_order: model.sort_order,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    pub id: i32,
    pub page_id: i32,
    pub block_type: ContentBlockType,
    pub content: serde_json::Value,
    pub sort_order: i32,
    pub is_visible: bool,
}

impl From<content_blocks::Model> for BlockResponse {
    fn from(model: content_blocks::Model) -> Self {
        Self {
            id: model.id,
            page_id: model.page_id,
            block_type: model.block_type,
            content: model.content,
            sort_order: model.sort_order,
            is_visible: model.is_visible,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub subdomain_available: Option<bool>,
    pub slug_available: Option<bool>,
}
