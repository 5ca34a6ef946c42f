use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use sitios_core::DBDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub microsite_id: i32,
    /// Unique within the parent microsite; the empty string is reserved for
    /// the home page
    pub slug: String,
    pub title: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_home_page: bool,
    pub is_published: bool,
    /// Navigation/listing order; ties break by id ascending
    pub sort_order: i32,
    pub created_at: DBDateTime,
    pub updated_at: DBDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::microsites::Entity",
        from = "Column::MicrositeId",
        to = "super::microsites::Column::Id",
        on_delete = "Cascade"
    )]
    Microsite,
    #[sea_orm(has_many = "super::content_blocks::Entity")]
    ContentBlocks,
}

impl Related<super::microsites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Microsite.def()
    }
}

impl Related<super::content_blocks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentBlocks.def()
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
