use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use sitios_auth::Principal;
use sitios_database::DbConnection;
use sitios_entities::types::BlockContent;
use sitios_entities::{content_blocks, microsites, pages};
use std::sync::Arc;
use tracing::info;

use super::types::{CreateBlockRequest, MicrositeError, ReorderRequest, UpdateBlockRequest};

/// Service for the content blocks of a page. A block's type is fixed at
/// creation; payloads are validated against it on every write.
pub struct BlockService {
    db: Arc<DbConnection>,
}

impl BlockService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    /// Blocks of a page in render order, hidden ones included.
    pub async fn list(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
    ) -> Result<Vec<content_blocks::Model>, MicrositeError> {
        self.owned_page(principal, microsite_id, page_id).await?;
        Ok(content_blocks::Entity::find()
            .filter(content_blocks::Column::PageId.eq(page_id))
            .order_by_asc(content_blocks::Column::SortOrder)
            .order_by_asc(content_blocks::Column::Id)
            .all(self.db.as_ref())
            .await?)
    }

    pub async fn create(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
        request: CreateBlockRequest,
    ) -> Result<content_blocks::Model, MicrositeError> {
        self.owned_page(principal, microsite_id, page_id).await?;

        BlockContent::from_parts(request.block_type, &request.content)
            .map_err(|e| MicrositeError::Validation(format!("invalid block payload: {e}")))?;

        let sort_order = match request.sort_order {
            Some(order) => order,
            None => self.next_sort_order(page_id).await?,
        };

        let block = content_blocks::ActiveModel {
            page_id: Set(page_id),
            block_type: Set(request.block_type),
            content: Set(request.content),
            sort_order: Set(sort_order),
            is_visible: Set(request.is_visible),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(page_id, block_id = block.id, "content block created");
        Ok(block)
    }

    /// Update payload, order or visibility. The type never changes; a new
    /// presentation means delete and create.
    pub async fn update(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
        block_id: i32,
        request: UpdateBlockRequest,
    ) -> Result<content_blocks::Model, MicrositeError> {
        self.owned_page(principal, microsite_id, page_id).await?;
        let block = self.block_of(page_id, block_id).await?;

        let mut model: content_blocks::ActiveModel = block.clone().into();

        if let Some(content) = request.content {
            BlockContent::from_parts(block.block_type, &content)
                .map_err(|e| MicrositeError::Validation(format!("invalid block payload: {e}")))?;
            model.content = Set(content);
        }
        if let Some(sort_order) = request.sort_order {
            model.sort_order = Set(sort_order);
        }
        if let Some(is_visible) = request.is_visible {
            model.is_visible = Set(is_visible);
        }

        Ok(model.update(self.db.as_ref()).await?)
    }

    pub async fn delete(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
        block_id: i32,
    ) -> Result<(), MicrositeError> {
        self.owned_page(principal, microsite_id, page_id).await?;
        self.block_of(page_id, block_id).await?;

        content_blocks::Entity::delete_by_id(block_id)
            .exec(self.db.as_ref())
            .await?;
        info!(page_id, block_id, "content block deleted");
        Ok(())
    }

    /// Shallow copy; the duplicate lands at the end of the page.
    pub async fn duplicate(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
        block_id: i32,
    ) -> Result<content_blocks::Model, MicrositeError> {
        self.owned_page(principal, microsite_id, page_id).await?;
        let source = self.block_of(page_id, block_id).await?;

        let sort_order = self.next_sort_order(page_id).await?;
        let copy = content_blocks::ActiveModel {
            page_id: Set(page_id),
            block_type: Set(source.block_type),
            content: Set(source.content.clone()),
            sort_order: Set(sort_order),
            is_visible: Set(source.is_visible),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        Ok(copy)
    }

    pub async fn toggle_visibility(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
        block_id: i32,
    ) -> Result<content_blocks::Model, MicrositeError> {
        self.owned_page(principal, microsite_id, page_id).await?;
        let block = self.block_of(page_id, block_id).await?;

        let next = !block.is_visible;
        let mut model: content_blocks::ActiveModel = block.into();
        model.is_visible = Set(next);

        Ok(model.update(self.db.as_ref()).await?)
    }

    /// Apply a batch of (id, sortOrder) pairs in one transaction. An id that
    /// does not belong to the page fails the whole batch.
    pub async fn reorder(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
        request: ReorderRequest,
    ) -> Result<Vec<content_blocks::Model>, MicrositeError> {
        self.owned_page(principal, microsite_id, page_id).await?;

        let txn = self.db.begin().await?;

        for entry in &request.orderings {
            let block = content_blocks::Entity::find_by_id(entry.id)
                .filter(content_blocks::Column::PageId.eq(page_id))
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    MicrositeError::Validation(format!(
                        "block {} does not belong to page {page_id}",
                        entry.id
                    ))
                })?;

            let mut model: content_blocks::ActiveModel = block.into();
            model.sort_order = Set(entry.sort_order);
            model.update(&txn).await?;
        }

        txn.commit().await?;

        self.list(principal, microsite_id, page_id).await
    }

    async fn next_sort_order(&self, page_id: i32) -> Result<i32, MicrositeError> {
        let max = content_blocks::Entity::find()
            .filter(content_blocks::Column::PageId.eq(page_id))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|b| b.sort_order)
            .max();
        Ok(max.map_or(0, |m| m + 1))
    }

    async fn block_of(
        &self,
        page_id: i32,
        block_id: i32,
    ) -> Result<content_blocks::Model, MicrositeError> {
        content_blocks::Entity::find_by_id(block_id)
            .filter(content_blocks::Column::PageId.eq(page_id))
            .one(self.db.as_ref())
            .await?
            .ok_or(MicrositeError::NotFound)
    }

    /// Resolve a page through its microsite under the principal's ownership.
    async fn owned_page(
        &self,
        principal: &Principal,
        microsite_id: i32,
        page_id: i32,
    ) -> Result<pages::Model, MicrositeError> {
        let mut select = microsites::Entity::find_by_id(microsite_id);
        if let Some(owner_id) = principal.owner_filter() {
            select = select.filter(microsites::Column::OwnerId.eq(owner_id));
        }
        select
            .one(self.db.as_ref())
            .await?
            .ok_or(MicrositeError::NotFound)?;

        pages::Entity::find_by_id(page_id)
            .filter(pages::Column::MicrositeId.eq(microsite_id))
            .one(self.db.as_ref())
            .await?
            .ok_or(MicrositeError::NotFound)
    }
}
