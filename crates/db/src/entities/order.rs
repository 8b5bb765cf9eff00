//! Order entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{Schema, load_by_ids};

/// Order lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub user_id: i32,

    #[sea_orm(indexed)]
    pub product_id: i32,

    pub quantity: i32,

    /// Product price times quantity at the time of the last quantity change.
    pub total_price: i64,

    pub status: OrderStatus,

    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Restrict"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Restrict"
    )]
    Product,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Eager-loadable relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    User,
    Product,
}

/// Loaded relations of one row.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub user: Option<super::user::Model>,
    pub product: Option<super::product::Model>,
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
        &[Load::User, Load::Product]
    }

    async fn hydrate(
        db: &DatabaseConnection,
        rows: &[Model],
        load: &[Load],
    ) -> Result<Vec<Loaded>, DbErr> {
        let mut loaded = vec![Loaded::default(); rows.len()];

        if load.contains(&Load::User) {
            let users =
                load_by_ids::<super::user::Entity>(db, rows.iter().map(|r| r.user_id)).await?;
            for (slot, row) in loaded.iter_mut().zip(rows) {
                slot.user = users.get(&row.user_id).cloned();
            }
        }

        if load.contains(&Load::Product) {
            let products =
                load_by_ids::<super::product::Entity>(db, rows.iter().map(|r| r.product_id))
                    .await?;
            for (slot, row) in loaded.iter_mut().zip(rows) {
                slot.product = products.get(&row.product_id).cloned();
            }
        }

        Ok(loaded)
    }
}
