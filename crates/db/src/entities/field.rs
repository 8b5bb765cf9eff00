//! Playing field (pitch) entity belonging to an academy.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{Schema, load_by_ids};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "field")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub academy_id: i32,

    /// Unique per academy among non-deleted fields.
    pub title: String,

    /// Surface kind, e.g. grass or parquet.
    pub surface: String,

    pub price_per_hour: i64,

    #[sea_orm(default_value = false)]
    pub is_covered: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::academy::Entity",
        from = "Column::AcademyId",
        to = "super::academy::Column::Id",
        on_delete = "Cascade"
    )]
    Academy,
}

impl Related<super::academy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Academy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Eager-loadable relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    Academy,
}

/// Loaded relations of one row.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub academy: Option<super::academy::Model>,
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
        &[Load::Academy]
    }

    async fn hydrate(
        db: &DatabaseConnection,
        rows: &[Model],
        load: &[Load],
    ) -> Result<Vec<Loaded>, DbErr> {
        let mut loaded = vec![Loaded::default(); rows.len()];

        if load.contains(&Load::Academy) {
            let academies =
                load_by_ids::<super::academy::Entity>(db, rows.iter().map(|r| r.academy_id))
                    .await?;
            for (slot, row) in loaded.iter_mut().zip(rows) {
                slot.academy = academies.get(&row.academy_id).cloned();
            }
        }

        Ok(loaded)
    }
}
