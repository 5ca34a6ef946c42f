use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use sitios_core::DBDateTime;

use super::types::{
    ColorScheme, ContactInfo, FeatureToggles, MicrositeStatus, OwnerType, SeoMetadata,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "microsites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Globally unique, URL-safe identifier (unique index at the storage layer)
    pub slug: String,
    /// Globally unique DNS label the tenant is served under
    pub subdomain: String,
    /// Optional fully-qualified custom domain, unique where not null
    pub custom_domain: Option<String>,
    pub description: Option<String>,
    /// Account id in the external identity provider
    pub owner_id: i32,
    pub owner_type: OwnerType,
    pub status: MicrositeStatus,
    pub is_public: bool,
    /// Set on the first transition into `published`; survives unpublish
    pub published_at: Option<DBDateTime>,
    pub color_scheme: Option<ColorScheme>,
    pub seo: Option<SeoMetadata>,
    pub contact_info: Option<ContactInfo>,
    pub features: Option<FeatureToggles>,
    pub created_at: DBDateTime,
    pub updated_at: DBDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pages::Entity")]
    Pages,
}

impl Related<super::pages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pages.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();

        if insert {
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.updated_at.is_not_set() {
                self.updated_at = Set(now);
            }
        } else {
            self.updated_at = Set(now);
        }

        Ok(self)
    }
}
