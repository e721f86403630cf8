//! 链接追踪表迁移
//!
//! 创建 link_trackers 与 hits 表：
//! - link_trackers: 短码到购买意图目标的映射
//! - hits: 每次落地页访问一条追加式记录

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LinkTrackers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkTrackers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LinkTrackers::Code)
                            .string_len(16)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(LinkTrackers::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LinkTrackers::VariantId).big_integer().null())
                    .col(
                        ColumnDef::new(LinkTrackers::Target)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LinkTrackers::RedirectTo)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(LinkTrackers::Label).string_len(255).not_null())
                    .col(ColumnDef::new(LinkTrackers::Medium).string_len(64).null())
                    .col(ColumnDef::new(LinkTrackers::Url).text().not_null())
                    .col(
                        ColumnDef::new(LinkTrackers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_link_trackers_product_id")
                    .table(LinkTrackers::Table)
                    .col(LinkTrackers::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Hits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hits::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Hits::TrackerId).big_integer().not_null())
                    .col(ColumnDef::new(Hits::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(Hits::UserAgent).text().null())
                    .col(ColumnDef::new(Hits::Referer).text().null())
                    .col(
                        ColumnDef::new(Hits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // tracker_id 索引用于单链接命中统计
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_hits_tracker_id")
                    .table(Hits::Table)
                    .col(Hits::TrackerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_hits_created_at")
                    .table(Hits::Table)
                    .col(Hits::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_hits_created_at").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_hits_tracker_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hits::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_link_trackers_product_id")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(LinkTrackers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LinkTrackers {
    #[sea_orm(iden = "link_trackers")]
    Table,
    Id,
    Code,
    ProductId,
    VariantId,
    Target,
    RedirectTo,
    Label,
    Medium,
    Url,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Hits {
    #[sea_orm(iden = "hits")]
    Table,
    Id,
    TrackerId,
    IpAddress,
    UserAgent,
    Referer,
    CreatedAt,
}
