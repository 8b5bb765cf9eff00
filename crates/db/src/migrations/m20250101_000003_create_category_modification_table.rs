//! Create `category_modification` table.
//!
//! Uniqueness of `(category_id, modification_type_id)` among non-deleted rows,
//! NULL modification type included, is checked by the application.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CategoryModification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategoryModification::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CategoryModification::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CategoryModification::ModificationTypeId).integer())
                    .col(
                        ColumnDef::new(CategoryModification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CategoryModification::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CategoryModification::DeletedAt).timestamp_with_time_zone(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_modification_category")
                            .from(CategoryModification::Table, CategoryModification::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_modification_type")
                            .from(
                                CategoryModification::Table,
                                CategoryModification::ModificationTypeId,
                            )
                            .to(ModificationType::Table, ModificationType::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_category_modification_pair")
                    .table(CategoryModification::Table)
                    .col(CategoryModification::CategoryId)
                    .col(CategoryModification::ModificationTypeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CategoryModification::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CategoryModification {
    Table,
    Id,
    CategoryId,
    ModificationTypeId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}

#[derive(Iden)]
enum ModificationType {
    Table,
    Id,
}
