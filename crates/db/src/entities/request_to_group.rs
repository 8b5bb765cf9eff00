//! Request to join a training group.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{Schema, load_by_ids};

/// Review status of a request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(try_from = "i32", into = "i32")]
pub enum RequestStatus {
    #[sea_orm(num_value = -1)]
    Rejected,
    #[default]
    #[sea_orm(num_value = 0)]
    Unreviewed,
    #[sea_orm(num_value = 1)]
    Accepted,
}

impl RequestStatus {
    /// Whether a reviewer has decided on the request.
    #[must_use]
    pub const fn is_reviewed(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

impl From<RequestStatus> for i32 {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Rejected => -1,
            RequestStatus::Unreviewed => 0,
            RequestStatus::Accepted => 1,
        }
    }
}

impl TryFrom<i32> for RequestStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Rejected),
            0 => Ok(Self::Unreviewed),
            1 => Ok(Self::Accepted),
            other => Err(format!("invalid request status: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "request_to_group")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub group_id: i32,

    pub full_name: String,

    pub phone: String,

    pub status: RequestStatus,

    /// Reviewing user; present whenever the request is reviewed.
    #[sea_orm(nullable, indexed)]
    pub checked_by: Option<i32>,

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
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_delete = "Cascade"
    )]
    Group,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CheckedBy",
        to = "super::user::Column::Id",
        on_delete = "Restrict"
    )]
    Checker,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Checker.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Eager-loadable relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    Group,
    Checker,
}

/// Loaded relations of one row.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub group: Option<super::group::Model>,
    pub checker: Option<super::user::Model>,
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
        &[Load::Group, Load::Checker]
    }

    async fn hydrate(
        db: &DatabaseConnection,
        rows: &[Model],
        load: &[Load],
    ) -> Result<Vec<Loaded>, DbErr> {
        let mut loaded = vec![Loaded::default(); rows.len()];

        if load.contains(&Load::Group) {
            let groups =
                load_by_ids::<super::group::Entity>(db, rows.iter().map(|r| r.group_id)).await?;
            for (slot, row) in loaded.iter_mut().zip(rows) {
                slot.group = groups.get(&row.group_id).cloned();
            }
        }

        if load.contains(&Load::Checker) {
            let checkers =
                load_by_ids::<super::user::Entity>(db, rows.iter().filter_map(|r| r.checked_by))
                    .await?;
            for (slot, row) in loaded.iter_mut().zip(rows) {
                slot.checker = row.checked_by.and_then(|id| checkers.get(&id).cloned());
            }
        }

        Ok(loaded)
    }
}
