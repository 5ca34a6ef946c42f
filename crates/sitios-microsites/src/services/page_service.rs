use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use sitios_auth::Principal;
use sitios_database::DbConnection;
use sitios_entities::types::MicrositeStatus;
use sitios_entities::{content_blocks, microsites, pages};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use super::types::{
    CreatePageRequest, MicrositeError, ReorderRequest, UpdatePageRequest,
};

/// Service for the pages of a microsite. Every operation checks transitive
/// ownership first; a page under someone else's microsite reads as not found.
pub struct PageService {
    db: Arc<DbConnection>,
}

impl PageService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    /// Pages of a microsite in navigation order.
    pub async fn list(
        &self,
        principal: &Principal,
        microsite_id: i32,
    ) -> Result<Vec<pages::Model>, MicrositeError> {
        self.owned_microsite(principal, microsite_id).await?;
        Ok(pages::Entity::find()
            .filter(pages::Column::MicrositeId.eq(microsite_id))
            .order_by_asc(pages::Column::SortOrder)
            .order_by_asc(pages::Column::Id)
            .all(self.db.as_ref())
            .await?)
    }

    /// Create a page. When the new page is the home page the previous home is
    /// demoted in the same transaction, so no reader ever sees two.
    pub async fn create(
        &self,
        principal: &Principal,
        microsite_id: i32,
        request: CreatePageRequest,
    ) -> Result<pages::Model, MicrositeError> {
        let microsite = self.owned_microsite(principal, microsite_id).await?;

        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(MicrositeError::Validation("title must not be empty".into()));
        }

        // A live site always serves a published home; swapping in an
        // unpublished one would 404 the root path.
        if request.is_home_page
            && !request.is_published
            && microsite.status == MicrositeStatus::Published
        {
            return Err(MicrositeError::Validation(
                "the home page of a published microsite must be published".into(),
            ));
        }

        let txn = self.db.begin().await?;

        let slug = if request.is_home_page {
            self.demote_current_home(&txn, microsite_id).await?;
            String::new()
        } else {
            let raw = match request.slug {
                Some(slug) => slug,
                None => slugify(&title),
            };
            validate_page_slug(&raw)?
        };

        let sort_order = match request.sort_order {
            Some(order) => order,
            None => next_sort_order(&txn, microsite_id).await?,
        };

        let page = pages::ActiveModel {
            microsite_id: Set(microsite_id),
            slug: Set(slug),
            title: Set(title),
            meta_title: Set(request.meta_title),
            meta_description: Set(request.meta_description),
            is_home_page: Set(request.is_home_page),
            is_published: Set(request.is_published),
            sort_order: Set(sort_order),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(microsite_id, page_id = page.id, "page created");
        Ok(page)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
        request: UpdatePageRequest,
    ) -> Result<pages::Model, MicrositeError> {
        let microsite = self.owned_microsite(principal, microsite_id).await?;
        let page = self.page_of(microsite_id, page_id).await?;

        if request.is_home_page == Some(false) && page.is_home_page {
            return Err(MicrositeError::Validation(
                "the home page cannot be demoted directly; promote another page instead".into(),
            ));
        }

        // Visitors of a live site reach it through the home page; it stays
        // published until the microsite itself is unpublished.
        if request.is_published == Some(false)
            && page.is_home_page
            && page.is_published
            && microsite.status == MicrositeStatus::Published
        {
            return Err(MicrositeError::LastResource(
                "the home page of a published microsite cannot be unpublished".into(),
            ));
        }

        let promoting = request.is_home_page == Some(true) && !page.is_home_page;
        if promoting
            && microsite.status == MicrositeStatus::Published
            && !request.is_published.unwrap_or(page.is_published)
        {
            return Err(MicrositeError::Validation(
                "the home page of a published microsite must be published".into(),
            ));
        }

        let txn = self.db.begin().await?;

        if promoting {
            self.demote_current_home(&txn, microsite_id).await?;
        }

        let mut model: pages::ActiveModel = page.clone().into();

        if let Some(title) = request.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(MicrositeError::Validation("title must not be empty".into()));
            }
            model.title = Set(title);
        }
        if promoting {
            model.is_home_page = Set(true);
            model.slug = Set(String::new());
        } else if let Some(slug) = request.slug {
            if page.is_home_page {
                if !slug.is_empty() {
                    return Err(MicrositeError::Validation(
                        "the home page keeps the empty slug".into(),
                    ));
                }
            } else {
                model.slug = Set(validate_page_slug(&slug)?);
            }
        }
        if let Some(meta_title) = request.meta_title {
            model.meta_title = Set(Some(meta_title));
        }
        if let Some(meta_description) = request.meta_description {
            model.meta_description = Set(Some(meta_description));
        }
        if let Some(is_published) = request.is_published {
            model.is_published = Set(is_published);
        }
        if let Some(sort_order) = request.sort_order {
            model.sort_order = Set(sort_order);
        }

        let updated = model.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Delete a page and its blocks. The last page of a microsite stays.
    pub async fn delete(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
    ) -> Result<(), MicrositeError> {
        self.owned_microsite(principal, microsite_id).await?;
        self.page_of(microsite_id, page_id).await?;

        let total = pages::Entity::find()
            .filter(pages::Column::MicrositeId.eq(microsite_id))
            .count(self.db.as_ref())
            .await?;
        if total <= 1 {
            return Err(MicrositeError::LastResource(
                "the last page of a microsite cannot be deleted".into(),
            ));
        }

        pages::Entity::delete_by_id(page_id)
            .exec(self.db.as_ref())
            .await?;
        info!(microsite_id, page_id, "page deleted");
        Ok(())
    }

    /// Apply a batch of (id, sortOrder) pairs in one transaction. An id that
    /// does not belong to the microsite fails the whole batch.
    pub async fn reorder(
        &self,
        principal: &Principal,
        microsite_id: i32,
        request: ReorderRequest,
    ) -> Result<Vec<pages::Model>, MicrositeError> {
        self.owned_microsite(principal, microsite_id).await?;

        let txn = self.db.begin().await?;

        for entry in &request.orderings {
            let page = pages::Entity::find_by_id(entry.id)
                .filter(pages::Column::MicrositeId.eq(microsite_id))
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    MicrositeError::Validation(format!(
                        "page {} does not belong to microsite {microsite_id}",
                        entry.id
                    ))
                })?;

            let mut model: pages::ActiveModel = page.into();
            model.sort_order = Set(entry.sort_order);
            model.update(&txn).await?;
        }

        txn.commit().await?;

        self.list(principal, microsite_id).await
    }

    /// Deep-copy a page with all its content blocks. The duplicate is never
    /// the home page and always starts unpublished.
    pub async fn duplicate(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
    ) -> Result<pages::Model, MicrositeError> {
        self.owned_microsite(principal, microsite_id).await?;
        let source = self.page_of(microsite_id, page_id).await?;

        let txn = self.db.begin().await?;

        let taken: HashSet<String> = pages::Entity::find()
            .filter(pages::Column::MicrositeId.eq(microsite_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| p.slug)
            .collect();

        let base = if source.slug.is_empty() {
            slugify(&source.title)
        } else {
            source.slug.clone()
        };
        let slug = copy_slug(&base, &taken);
        let sort_order = next_sort_order(&txn, microsite_id).await?;

        let copy = pages::ActiveModel {
            microsite_id: Set(microsite_id),
            slug: Set(slug),
            title: Set(format!("{} (copia)", source.title)),
            meta_title: Set(source.meta_title.clone()),
            meta_description: Set(source.meta_description.clone()),
            is_home_page: Set(false),
            is_published: Set(false),
            sort_order: Set(sort_order),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let blocks = content_blocks::Entity::find()
            .filter(content_blocks::Column::PageId.eq(page_id))
            .order_by_asc(content_blocks::Column::SortOrder)
            .order_by_asc(content_blocks::Column::Id)
            .all(&txn)
            .await?;

        for block in blocks {
            content_blocks::ActiveModel {
                page_id: Set(copy.id),
                block_type: Set(block.block_type),
                content: Set(block.content.clone()),
                sort_order: Set(block.sort_order),
                is_visible: Set(block.is_visible),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(microsite_id, source_page_id = page_id, copy_page_id = copy.id, "page duplicated");
        Ok(copy)
    }

    /// Demote the current home page inside `txn`, freeing the empty slug. The
    /// demoted page gets a slug derived from its title, suffixed until free.
    async fn demote_current_home<C: ConnectionTrait>(
        &self,
        txn: &C,
        microsite_id: i32,
    ) -> Result<(), MicrositeError> {
        let Some(home) = pages::Entity::find()
            .filter(pages::Column::MicrositeId.eq(microsite_id))
            .filter(pages::Column::IsHomePage.eq(true))
            .one(txn)
            .await?
        else {
            return Ok(());
        };

        let taken: HashSet<String> = pages::Entity::find()
            .filter(pages::Column::MicrositeId.eq(microsite_id))
            .all(txn)
            .await?
            .into_iter()
            .map(|p| p.slug)
            .collect();

        let slug = numbered_slug(&slugify(&home.title), &taken);

        let mut model: pages::ActiveModel = home.into();
        model.is_home_page = Set(false);
        model.slug = Set(slug);
        model.update(txn).await?;

        Ok(())
    }

    async fn page_of(&self, microsite_id: i32, page_id: i32) -> Result<pages::Model, MicrositeError> {
        pages::Entity::find_by_id(page_id)
            .filter(pages::Column::MicrositeId.eq(microsite_id))
            .one(self.db.as_ref())
            .await?
            .ok_or(MicrositeError::NotFound)
    }

    async fn owned_microsite(
        &self,
        principal: &Principal,
        microsite_id: i32,
    ) -> Result<microsites::Model, MicrositeError> {
        let mut select = microsites::Entity::find_by_id(microsite_id);
        if let Some(owner_id) = principal.owner_filter() {
            select = select.filter(microsites::Column::OwnerId.eq(owner_id));
        }
        select
            .one(self.db.as_ref())
            .await?
            .ok_or(MicrositeError::NotFound)
    }
}

async fn next_sort_order<C: ConnectionTrait>(
    txn: &C,
    microsite_id: i32,
) -> Result<i32, MicrositeError> {
    let max = pages::Entity::find()
        .filter(pages::Column::MicrositeId.eq(microsite_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|p| p.sort_order)
        .max();
    Ok(max.map_or(0, |m| m + 1))
}

/// Derive a URL slug from a page title.
pub(crate) fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "pagina".to_string()
    } else {
        slug
    }
}

/// First of `base`, `base-2`, `base-3`, ... not already taken.
fn numbered_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// First of `base-copy`, `base-copy-2`, ... not already taken.
fn copy_slug(base: &str, taken: &HashSet<String>) -> String {
    let candidate = format!("{base}-copy");
    if !taken.contains(&candidate) {
        return candidate;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-copy-{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn validate_page_slug(raw: &str) -> Result<String, MicrositeError> {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(MicrositeError::Validation(
            "the empty slug is reserved for the home page".into(),
        ));
    }
    if !normalized
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(MicrositeError::Validation(
            "page slug may only contain lowercase letters, digits and hyphens".into(),
        ));
    }
    Ok(normalized)
}
