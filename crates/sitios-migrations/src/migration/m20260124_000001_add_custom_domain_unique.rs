use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Custom domains must be unique where set; NULLs do not collide
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_microsites_custom_domain_unique")
                    .table(Alias::new("microsites"))
                    .col(Alias::new("custom_domain"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_microsites_custom_domain_unique")
                    .table(Alias::new("microsites"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
