use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use sitios_database::DbConnection;
use sitios_entities::types::{
    BlockContent, ColorScheme, ContactInfo, ContentBlockType, FeatureToggles, SeoMetadata,
};
use sitios_entities::{content_blocks, microsites, pages};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;

use super::theme::theme_css;

#[derive(Error, Debug)]
pub enum RendererError {
    #[error("Page not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DbErr> for RendererError {
    fn from(err: DbErr) -> Self {
        RendererError::Database(err.to_string())
    }
}

/// The subset of a microsite exposed to anonymous visitors.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    pub name: String,
    pub slug: String,
    pub subdomain: String,
    pub description: Option<String>,
    pub color_scheme: Option<ColorScheme>,
    pub seo: Option<SeoMetadata>,
    pub contact_info: Option<ContactInfo>,
}

impl From<&microsites::Model> for SiteSummary {
    fn from(model: &microsites::Model) -> Self {
        Self {
            name: model.name.clone(),
            slug: model.slug.clone(),
            subdomain: model.subdomain.clone(),
            description: model.description.clone(),
            color_scheme: model.color_scheme.clone(),
            seo: model.seo.clone(),
            contact_info: model.contact_info.clone(),
        }
    }
}

/// A block ready for rendering: payload parsed and feature-gated.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderedBlock {
    pub id: i32,
    pub block_type: ContentBlockType,
    #[serde(flatten)]
    pub content: BlockContent,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub blocks: Vec<RenderedBlock>,
}

/// The structured render result; also the JSON response shape.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub microsite: SiteSummary,
    pub page: RenderedPage,
    #[serde(rename = "themeCSS")]
    pub theme_css: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    pub slug: String,
    pub title: String,
    pub path: String,
    pub is_home_page: bool,
}

/// Service that turns a resolved tenant and a path into renderable content.
/// Only published pages and visible blocks are reachable through it.
pub struct RendererService {
    db: Arc<DbConnection>,
}

impl RendererService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    /// Resolve a page of the tenant by slug and assemble its blocks. The
    /// empty slug selects the home page.
    pub async fn render_page(
        &self,
        microsite: &microsites::Model,
        slug: &str,
    ) -> Result<PageDocument, RendererError> {
        let page = pages::Entity::find()
            .filter(pages::Column::MicrositeId.eq(microsite.id))
            .filter(pages::Column::Slug.eq(slug))
            .filter(pages::Column::IsPublished.eq(true))
            .one(self.db.as_ref())
            .await?
            .ok_or(RendererError::NotFound)?;

        let blocks = self.assemble_blocks(microsite, page.id).await?;

        Ok(PageDocument {
            microsite: microsite.into(),
            page: RenderedPage {
                id: page.id,
                slug: page.slug,
                title: page.title,
                meta_title: page.meta_title,
                meta_description: page.meta_description,
                blocks,
            },
            theme_css: theme_css(
                microsite
                    .color_scheme
                    .as_ref()
                    .unwrap_or(&ColorScheme::default()),
            ),
        })
    }

    /// Published pages of the tenant, home first, then navigation order.
    pub async fn navigation(
        &self,
        microsite: &microsites::Model,
    ) -> Result<Vec<NavigationItem>, RendererError> {
        let mut site_pages = pages::Entity::find()
            .filter(pages::Column::MicrositeId.eq(microsite.id))
            .filter(pages::Column::IsPublished.eq(true))
            .order_by_asc(pages::Column::SortOrder)
            .order_by_asc(pages::Column::Id)
            .all(self.db.as_ref())
            .await?;

        site_pages.sort_by_key(|p| !p.is_home_page);

        Ok(site_pages
            .into_iter()
            .map(|p| NavigationItem {
                path: if p.is_home_page {
                    "/".to_string()
                } else {
                    format!("/{}", p.slug)
                },
                slug: p.slug,
                title: p.title,
                is_home_page: p.is_home_page,
            })
            .collect())
    }

    /// The tenant's generated stylesheet.
    pub fn stylesheet(&self, microsite: &microsites::Model) -> String {
        theme_css(
            microsite
                .color_scheme
                .as_ref()
                .unwrap_or(&ColorScheme::default()),
        )
    }

    /// Visible blocks of a page in render order, with payloads parsed and
    /// disabled features dropped. A payload that fails to parse is skipped
    /// rather than failing the whole page.
    async fn assemble_blocks(
        &self,
        microsite: &microsites::Model,
        page_id: i32,
    ) -> Result<Vec<RenderedBlock>, RendererError> {
        let features = microsite
            .features
            .clone()
            .unwrap_or_else(FeatureToggles::default);

        let rows = content_blocks::Entity::find()
            .filter(content_blocks::Column::PageId.eq(page_id))
            .filter(content_blocks::Column::IsVisible.eq(true))
            .order_by_asc(content_blocks::Column::SortOrder)
            .order_by_asc(content_blocks::Column::Id)
            .all(self.db.as_ref())
            .await?;

        let mut blocks = Vec::with_capacity(rows.len());
        for row in rows {
            if !features.allows(row.block_type) {
                continue;
            }
            match BlockContent::from_parts(row.block_type, &row.content) {
                Ok(content) => blocks.push(RenderedBlock {
                    id: row.id,
                    block_type: row.block_type,
                    content,
                    sort_order: row.sort_order,
                }),
                Err(err) => {
                    warn!(block_id = row.id, page_id, "skipping malformed block payload: {err}");
                }
            }
        }

        Ok(blocks)
    }
}
