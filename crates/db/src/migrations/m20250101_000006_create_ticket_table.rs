//! Create ticket table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ticket::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ticket::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Ticket::Description).text())
                    .col(ColumnDef::new(Ticket::WidgetUrl).string_len(1024).not_null())
                    .col(ColumnDef::new(Ticket::ImageKey).string_len(512))
                    .col(ColumnDef::new(Ticket::ImageUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Ticket::EventDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Ticket::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Ticket::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Ticket::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Ticket::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_event_date")
                    .table(Ticket::Table)
                    .col(Ticket::EventDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Ticket {
    Table,
    Id,
    Title,
    Description,
    WidgetUrl,
    ImageKey,
    ImageUrl,
    EventDate,
    IsActive,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
