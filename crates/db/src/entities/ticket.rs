//! Event ticket published through the Yandex ticket widget.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{NoLoad, Schema};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Widget link the ticket is sold through.
    pub widget_url: String,

    /// Storage key of the uploaded poster.
    #[sea_orm(nullable)]
    pub image_key: Option<String>,

    /// Public URL of the uploaded poster.
    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    pub event_date: DateTimeWithTimeZone,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

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
