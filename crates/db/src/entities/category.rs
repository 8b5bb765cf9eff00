//! Product category entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{NoLoad, Schema};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Russian title, unique among non-deleted categories.
    pub title_ru: String,

    #[sea_orm(nullable)]
    pub title_en: Option<String>,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
    #[sea_orm(has_many = "super::category_modification::Entity")]
    Modifications,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::category_modification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Modifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Schema for Entity {
    type Load = NoLoad;
    type Related = ();

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
}
