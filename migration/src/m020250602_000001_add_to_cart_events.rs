use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AddToCartEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AddToCartEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AddToCartEvents::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AddToCartEvents::VariantId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AddToCartEvents::TrackerId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AddToCartEvents::CreatedAt)
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
                    .name("idx_atc_events_product_id")
                    .table(AddToCartEvents::Table)
                    .col(AddToCartEvents::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_atc_events_tracker_id")
                    .table(AddToCartEvents::Table)
                    .col(AddToCartEvents::TrackerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_atc_events_tracker_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_atc_events_product_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AddToCartEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AddToCartEvents {
    #[sea_orm(iden = "add_to_cart_events")]
    Table,
    Id,
    ProductId,
    VariantId,
    TrackerId,
    CreatedAt,
}
