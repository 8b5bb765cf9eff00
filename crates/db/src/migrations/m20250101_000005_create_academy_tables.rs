//! Create academy, field, group and `request_to_group` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create academy table
        manager
            .create_table(
                Table::create()
                    .table(Academy::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Academy::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Academy::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Academy::Description).text())
                    .col(ColumnDef::new(Academy::Address).string_len(512).not_null())
                    .col(ColumnDef::new(Academy::Phone).string_len(32))
                    .col(ColumnDef::new(Academy::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Academy::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Academy::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Academy::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Create field table
        manager
            .create_table(
                Table::create()
                    .table(Field::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Field::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Field::AcademyId).integer().not_null())
                    .col(ColumnDef::new(Field::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Field::Surface).string_len(64).not_null())
                    .col(ColumnDef::new(Field::PricePerHour).big_integer().not_null())
                    .col(ColumnDef::new(Field::IsCovered).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Field::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Field::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Field::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_field_academy")
                            .from(Field::Table, Field::AcademyId)
                            .to(Academy::Table, Academy::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_field_academy_id")
                    .table(Field::Table)
                    .col(Field::AcademyId)
                    .to_owned(),
            )
            .await?;

        // Create group table
        manager
            .create_table(
                Table::create()
                    .table(Group::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Group::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Group::AcademyId).integer().not_null())
                    .col(ColumnDef::new(Group::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Group::CoachName).string_len(256))
                    .col(ColumnDef::new(Group::MinAge).integer().not_null())
                    .col(ColumnDef::new(Group::MaxAge).integer().not_null())
                    .col(ColumnDef::new(Group::Capacity).integer().not_null())
                    .col(
                        ColumnDef::new(Group::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Group::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Group::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_academy")
                            .from(Group::Table, Group::AcademyId)
                            .to(Academy::Table, Academy::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_group_academy_id")
                    .table(Group::Table)
                    .col(Group::AcademyId)
                    .to_owned(),
            )
            .await?;

        // Create request_to_group table
        manager
            .create_table(
                Table::create()
                    .table(RequestToGroup::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RequestToGroup::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RequestToGroup::GroupId).integer().not_null())
                    .col(
                        ColumnDef::new(RequestToGroup::FullName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RequestToGroup::Phone).string_len(32).not_null())
                    .col(
                        ColumnDef::new(RequestToGroup::Status)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(RequestToGroup::CheckedBy).integer())
                    .col(ColumnDef::new(RequestToGroup::Comment).text())
                    .col(
                        ColumnDef::new(RequestToGroup::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(RequestToGroup::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(RequestToGroup::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_to_group_group")
                            .from(RequestToGroup::Table, RequestToGroup::GroupId)
                            .to(Group::Table, Group::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_to_group_checker")
                            .from(RequestToGroup::Table, RequestToGroup::CheckedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_request_to_group_group_id")
                    .table(RequestToGroup::Table)
                    .col(RequestToGroup::GroupId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RequestToGroup::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Group::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Field::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Academy::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Academy {
    Table,
    Id,
    Title,
    Description,
    Address,
    Phone,
    IsActive,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Field {
    Table,
    Id,
    AcademyId,
    Title,
    Surface,
    PricePerHour,
    IsCovered,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Group {
    Table,
    Id,
    AcademyId,
    Title,
    CoachName,
    MinAge,
    MaxAge,
    Capacity,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum RequestToGroup {
    Table,
    Id,
    GroupId,
    FullName,
    Phone,
    Status,
    CheckedBy,
    Comment,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
