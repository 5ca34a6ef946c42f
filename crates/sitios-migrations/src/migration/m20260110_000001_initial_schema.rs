use sea_orm_migration::prelude::*;

/// Initial schema: microsites, pages, content_blocks.
///
/// Uniqueness of subdomains/slugs is enforced here with unique indexes, not
/// in application code. Concurrent creates racing on the same subdomain must
/// end with exactly one success.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create microsites table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("microsites"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("slug"))
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("subdomain"))
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Alias::new("custom_domain")).string().null())
                    .col(ColumnDef::new(Alias::new("description")).text().null())
                    .col(ColumnDef::new(Alias::new("owner_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("owner_type")).text().not_null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .text()
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Alias::new("is_public"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("published_at"))
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Alias::new("color_scheme")).json_binary().null())
                    .col(ColumnDef::new(Alias::new("seo")).json_binary().null())
                    .col(ColumnDef::new(Alias::new("contact_info")).json_binary().null())
                    .col(ColumnDef::new(Alias::new("features")).json_binary().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create pages table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("pages"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("microsite_id"))
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("slug")).string().not_null())
                    .col(ColumnDef::new(Alias::new("title")).string().not_null())
                    .col(ColumnDef::new(Alias::new("meta_title")).string().null())
                    .col(
                        ColumnDef::new(Alias::new("meta_description"))
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("is_home_page"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("is_published"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("sort_order"))
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pages_microsite_id")
                            .from(Alias::new("pages"), Alias::new("microsite_id"))
                            .to(Alias::new("microsites"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Page slugs are unique per microsite, not globally
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pages_microsite_slug_unique")
                    .table(Alias::new("pages"))
                    .col(Alias::new("microsite_id"))
                    .col(Alias::new("slug"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create content_blocks table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("content_blocks"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("page_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("block_type")).text().not_null())
                    .col(
                        ColumnDef::new(Alias::new("content"))
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("sort_order"))
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Alias::new("is_visible"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_blocks_page_id")
                            .from(Alias::new("content_blocks"), Alias::new("page_id"))
                            .to(Alias::new("pages"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Blocks are fetched per page on every render
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_content_blocks_page_id")
                    .table(Alias::new("content_blocks"))
                    .col(Alias::new("page_id"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("content_blocks")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("pages")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("microsites")).to_owned())
            .await?;

        Ok(())
    }
}
