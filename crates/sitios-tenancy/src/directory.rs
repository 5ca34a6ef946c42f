use std::sync::Arc;

use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter};
use sitios_database::DbConnection;
use sitios_entities::microsites;

/// Leaf lookup from a subdomain label (or custom domain) to its microsite
/// record. Exact, case-normalized matches only; the storage layer backs both
/// columns with unique indexes.
pub struct TenantDirectory {
    db: Arc<DbConnection>,
}

impl TenantDirectory {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    /// Resolve a subdomain label to its microsite, if one exists.
    pub async fn resolve(&self, subdomain: &str) -> Result<Option<microsites::Model>, DbErr> {
        let normalized = subdomain.to_ascii_lowercase();
        microsites::Entity::find()
            .filter(microsites::Column::Subdomain.eq(normalized))
            .one(self.db.as_ref())
            .await
    }

    /// Resolve a full custom domain (e.g. `clubjalisco.mx`) to its microsite.
    pub async fn resolve_custom_domain(
        &self,
        host: &str,
    ) -> Result<Option<microsites::Model>, DbErr> {
        let normalized = host.to_ascii_lowercase();
        microsites::Entity::find()
            .filter(microsites::Column::CustomDomain.eq(normalized))
            .one(self.db.as_ref())
            .await
    }
}
