use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use sitios_core::{PageQuery, Paginated};
use sitios_database::DbConnection;
use sitios_entities::types::{ColorScheme, FeatureToggles, MicrositeStatus};
use sitios_entities::{microsites, pages};
use sitios_tenancy::{validate_subdomain, TenancyConfig};
use std::sync::Arc;
use tracing::info;

use super::publish_gate::{evaluate_publish_readiness, PublishCheck};
use super::types::{
    AvailabilityResponse, CreateMicrositeRequest, MicrositeError, MicrositeListFilter,
    UpdateMicrositeRequest,
};
use sitios_auth::Principal;

/// Service for managing microsites: the tenant directory plus the publish
/// lifecycle. Page and block operations live in their own services.
pub struct MicrositeService {
    db: Arc<DbConnection>,
    tenancy: TenancyConfig,
}

/// Title of the home page every new microsite starts with.
const DEFAULT_HOME_TITLE: &str = "Inicio";

impl MicrositeService {
    pub fn new(db: Arc<DbConnection>, tenancy: TenancyConfig) -> Self {
        Self { db, tenancy }
    }

    /// List microsites visible to the principal, newest first. Members only
    /// see their own sites; admins see all of them.
    pub async fn list(
        &self,
        principal: &Principal,
        filter: &MicrositeListFilter,
        query: &PageQuery,
    ) -> Result<Paginated<microsites::Model>, MicrositeError> {
        let (page, limit) = query.normalize();

        let mut select = microsites::Entity::find();
        if let Some(owner_id) = principal.owner_filter() {
            select = select.filter(microsites::Column::OwnerId.eq(owner_id));
        }
        if let Some(owner_type) = filter.owner_type {
            select = select.filter(microsites::Column::OwnerType.eq(owner_type));
        }
        if let Some(status) = filter.status {
            select = select.filter(microsites::Column::Status.eq(status));
        }

        let paginator = select
            .order_by_desc(microsites::Column::CreatedAt)
            .paginate(self.db.as_ref(), limit);
        let totals = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(page).await?;

        Ok(Paginated::new(
            items,
            page,
            totals.number_of_pages,
            totals.number_of_items,
        ))
    }

    /// Create a microsite in `draft` with its default home page. The site and
    /// the home page land in one transaction so no site ever exists without a
    /// home.
    pub async fn create(
        &self,
        principal: &Principal,
        request: CreateMicrositeRequest,
    ) -> Result<microsites::Model, MicrositeError> {
        let subdomain = validate_subdomain(&request.subdomain, &self.tenancy)
            .map_err(|e| MicrositeError::Validation(e.to_string()))?;
        let slug = validate_slug(&request.slug)?;
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(MicrositeError::Validation("name must not be empty".into()));
        }

        let txn = self.db.begin().await?;

        let microsite = microsites::ActiveModel {
            name: Set(name),
            slug: Set(slug),
            subdomain: Set(subdomain),
            custom_domain: Set(None),
            description: Set(request.description),
            owner_id: Set(principal.user_id),
            owner_type: Set(request.owner_type),
            status: Set(MicrositeStatus::Draft),
            is_public: Set(false),
            published_at: Set(None),
            color_scheme: Set(Some(ColorScheme::default())),
            seo: Set(None),
            contact_info: Set(None),
            features: Set(Some(FeatureToggles::default())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // Home page: the empty slug is reserved for it.
        pages::ActiveModel {
            microsite_id: Set(microsite.id),
            slug: Set(String::new()),
            title: Set(DEFAULT_HOME_TITLE.to_string()),
            is_home_page: Set(true),
            is_published: Set(false),
            sort_order: Set(0),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            microsite_id = microsite.id,
            subdomain = %microsite.subdomain,
            "microsite created"
        );
        Ok(microsite)
    }

    /// Fetch a microsite the principal is allowed to see. A site owned by
    /// someone else reads as not found.
    pub async fn get(
        &self,
        principal: &Principal,
        id: i32,
    ) -> Result<microsites::Model, MicrositeError> {
        let mut select = microsites::Entity::find_by_id(id);
        if let Some(owner_id) = principal.owner_filter() {
            select = select.filter(microsites::Column::OwnerId.eq(owner_id));
        }
        select
            .one(self.db.as_ref())
            .await?
            .ok_or(MicrositeError::NotFound)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: i32,
        request: UpdateMicrositeRequest,
    ) -> Result<microsites::Model, MicrositeError> {
        let existing = self.get(principal, id).await?;
        let mut model: microsites::ActiveModel = existing.into();

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(MicrositeError::Validation("name must not be empty".into()));
            }
            model.name = Set(name);
        }
        if let Some(slug) = request.slug {
            model.slug = Set(validate_slug(&slug)?);
        }
        if let Some(subdomain) = request.subdomain {
            let subdomain = validate_subdomain(&subdomain, &self.tenancy)
                .map_err(|e| MicrositeError::Validation(e.to_string()))?;
            model.subdomain = Set(subdomain);
        }
        if let Some(custom_domain) = request.custom_domain {
            let normalized = custom_domain
                .map(|d| d.trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty());
            model.custom_domain = Set(normalized);
        }
        if let Some(description) = request.description {
            model.description = Set(Some(description));
        }
        if let Some(color_scheme) = request.color_scheme {
            model.color_scheme = Set(Some(color_scheme));
        }
        if let Some(seo) = request.seo {
            model.seo = Set(Some(seo));
        }
        if let Some(contact_info) = request.contact_info {
            model.contact_info = Set(Some(contact_info));
        }
        if let Some(features) = request.features {
            model.features = Set(Some(features));
        }

        Ok(model.update(self.db.as_ref()).await?)
    }

    /// Delete a microsite and, through the storage cascade, its entire
    /// content tree.
    pub async fn delete(&self, principal: &Principal, id: i32) -> Result<(), MicrositeError> {
        let existing = self.get(principal, id).await?;
        let microsite_id = existing.id;
        microsites::Entity::delete_by_id(existing.id)
            .exec(self.db.as_ref())
            .await?;
        info!(microsite_id, "microsite deleted");
        Ok(())
    }

    /// Run the publish rules without changing anything.
    pub async fn publish_check(
        &self,
        principal: &Principal,
        id: i32,
    ) -> Result<PublishCheck, MicrositeError> {
        let microsite = self.get(principal, id).await?;
        let site_pages = self.pages_of(microsite.id).await?;
        Ok(evaluate_publish_readiness(&microsite, &site_pages))
    }

    /// Transition a microsite into `published`. The gate is evaluated first
    /// and the transition is rejected with the full violation list when any
    /// rule fails. `published_at` is only set the first time.
    pub async fn publish(
        &self,
        principal: &Principal,
        id: i32,
    ) -> Result<microsites::Model, MicrositeError> {
        let microsite = self.get(principal, id).await?;
        let site_pages = self.pages_of(microsite.id).await?;

        let check = evaluate_publish_readiness(&microsite, &site_pages);
        if !check.valid {
            return Err(MicrositeError::PublishGate(check.errors));
        }

        let first_publish = microsite.published_at.is_none();
        let mut model: microsites::ActiveModel = microsite.into();
        model.status = Set(MicrositeStatus::Published);
        model.is_public = Set(true);
        if first_publish {
            model.published_at = Set(Some(chrono::Utc::now()));
        }

        let updated = model.update(self.db.as_ref()).await?;
        info!(microsite_id = updated.id, "microsite published");
        Ok(updated)
    }

    /// Take a microsite offline. `published_at` keeps its original value so
    /// the first publish date survives the round trip.
    pub async fn unpublish(
        &self,
        principal: &Principal,
        id: i32,
    ) -> Result<microsites::Model, MicrositeError> {
        let microsite = self.get(principal, id).await?;

        let mut model: microsites::ActiveModel = microsite.into();
        model.status = Set(MicrositeStatus::Draft);
        model.is_public = Set(false);

        let updated = model.update(self.db.as_ref()).await?;
        info!(microsite_id = updated.id, "microsite unpublished");
        Ok(updated)
    }

    /// Anonymous lookup by subdomain. Only live sites are visible; a draft or
    /// non-public site reads as not found.
    pub async fn get_public(
        &self,
        subdomain: &str,
    ) -> Result<(microsites::Model, Vec<pages::Model>), MicrositeError> {
        let microsite = microsites::Entity::find()
            .filter(microsites::Column::Subdomain.eq(subdomain.trim().to_ascii_lowercase()))
            .filter(microsites::Column::Status.eq(MicrositeStatus::Published))
            .filter(microsites::Column::IsPublic.eq(true))
            .one(self.db.as_ref())
            .await?
            .ok_or(MicrositeError::NotFound)?;

        let site_pages = pages::Entity::find()
            .filter(pages::Column::MicrositeId.eq(microsite.id))
            .filter(pages::Column::IsPublished.eq(true))
            .order_by_asc(pages::Column::SortOrder)
            .order_by_asc(pages::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok((microsite, site_pages))
    }

    /// Check whether a subdomain and/or slug is still free. Advisory only;
    /// the unique indexes remain the authority at insert time.
    pub async fn check_availability(
        &self,
        subdomain: Option<&str>,
        slug: Option<&str>,
    ) -> Result<AvailabilityResponse, MicrositeError> {
        let subdomain_available = match subdomain {
            Some(raw) => match validate_subdomain(raw, &self.tenancy) {
                Ok(normalized) => {
                    let taken = microsites::Entity::find()
                        .filter(microsites::Column::Subdomain.eq(normalized))
                        .count(self.db.as_ref())
                        .await?
                        > 0;
                    Some(!taken)
                }
                Err(_) => Some(false),
            },
            None => None,
        };

        let slug_available = match slug {
            Some(raw) => match validate_slug(raw) {
                Ok(normalized) => {
                    let taken = microsites::Entity::find()
                        .filter(microsites::Column::Slug.eq(normalized))
                        .count(self.db.as_ref())
                        .await?
                        > 0;
                    Some(!taken)
                }
                Err(_) => Some(false),
            },
            None => None,
        };

        Ok(AvailabilityResponse {
            subdomain_available,
            slug_available,
        })
    }

    async fn pages_of(&self, microsite_id: i32) -> Result<Vec<pages::Model>, MicrositeError> {
        Ok(pages::Entity::find()
            .filter(pages::Column::MicrositeId.eq(microsite_id))
            .all(self.db.as_ref())
            .await?)
    }
}

const MAX_SLUG_LEN: usize = 100;

/// Validate a microsite slug: same charset as a DNS label, just longer.
pub(crate) fn validate_slug(raw: &str) -> Result<String, MicrositeError> {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(MicrositeError::Validation("slug must not be empty".into()));
    }
    if normalized.len() > MAX_SLUG_LEN {
        return Err(MicrositeError::Validation(format!(
            "slug must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    if !normalized
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(MicrositeError::Validation(
            "slug may only contain lowercase letters, digits and hyphens".into(),
        ));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_charset() {
        assert_eq!(validate_slug(" Club-1 ").unwrap(), "club-1");
        assert!(validate_slug("").is_err());
        assert!(validate_slug("club jalisco").is_err());
        assert!(validate_slug(&"a".repeat(101)).is_err());
    }
}
