//! Binding of a category to an optional modification type.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{Schema, load_by_ids};

/// At most one non-deleted row exists per `(category_id, modification_type_id)`
/// pair, including the pair with no modification type.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category_modification")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub category_id: i32,

    #[sea_orm(nullable, indexed)]
    pub modification_type_id: Option<i32>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::modification_type::Entity",
        from = "Column::ModificationTypeId",
        to = "super::modification_type::Column::Id",
        on_delete = "Restrict"
    )]
    ModificationType,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::modification_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModificationType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Eager-loadable relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    Category,
    ModificationType,
}

/// Loaded relations of one row.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub category: Option<super::category::Model>,
    pub modification_type: Option<super::modification_type::Model>,
}

#[async_trait::async_trait]
impl Schema for Entity {
    type Load = Load;
    type Related = Loaded;

    fn id_column() -> Column {
        Column::Id
    }

    fn created_at_column() -> Column {
        Column::CreatedAt
    }

    fn updated_at_column() -> Column {
        Column::UpdatedAt
    }

    fn deleted_at_column() -> Column {
        Column::DeletedAt
    }

    fn id_of(model: &Model) -> i32 {
        model.id
    }

    fn default_load() -> &'static [Load] {
        &[Load::Category, Load::ModificationType]
    }

    async fn hydrate(
        db: &DatabaseConnection,
        rows: &[Model],
        load: &[Load],
    ) -> Result<Vec<Loaded>, DbErr> {
        let mut loaded = vec![Loaded::default(); rows.len()];

        if load.contains(&Load::Category) {
            let categories =
                load_by_ids::<super::category::Entity>(db, rows.iter().map(|r| r.category_id))
                    .await?;
            for (slot, row) in loaded.iter_mut().zip(rows) {
                slot.category = categories.get(&row.category_id).cloned();
            }
        }

        if load.contains(&Load::ModificationType) {
            let types = load_by_ids::<super::modification_type::Entity>(
                db,
                rows.iter().filter_map(|r| r.modification_type_id),
            )
            .await?;
            for (slot, row) in loaded.iter_mut().zip(rows) {
                slot.modification_type = row
                    .modification_type_id
                    .and_then(|id| types.get(&id).cloned());
            }
        }

        Ok(loaded)
    }
}
