//! Per-entity schema descriptions used by the generic repository.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

/// Relation selector for entities without eager-loadable relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoLoad {}

/// Describes the columns and relations the repository needs for one entity.
#[async_trait::async_trait]
pub trait Schema: EntityTrait<Model: Sync> {
    /// Relation selector passed as eager-load options.
    type Load: Copy + Eq + Debug + Send + Sync + 'static;

    /// Related rows loaded alongside one model.
    type Related: Default + Clone + Debug + Send + Sync;

    /// Primary key column.
    fn id_column() -> Self::Column;

    /// Creation timestamp column.
    fn created_at_column() -> Self::Column;

    /// Last-modification timestamp column.
    fn updated_at_column() -> Self::Column;

    /// Soft-delete timestamp column.
    fn deleted_at_column() -> Self::Column;

    /// Primary key of a model.
    fn id_of(model: &Self::Model) -> i32;

    /// Relations loaded when a use case re-fetches a row for its response.
    fn default_load() -> &'static [Self::Load] {
        &[]
    }

    /// Load the requested relations for `rows`, one entry per row in order.
    ///
    /// Only called with a non-empty `load` and non-empty `rows`.
    async fn hydrate(
        _db: &DatabaseConnection,
        rows: &[Self::Model],
        _load: &[Self::Load],
    ) -> Result<Vec<Self::Related>, DbErr> {
        Ok(vec![Self::Related::default(); rows.len()])
    }
}

/// A model together with its eager-loaded relations.
#[derive(Debug, Clone)]
pub struct Hydrated<E: Schema> {
    /// The row itself.
    pub model: E::Model,
    /// Loaded relations.
    pub related: E::Related,
}

/// Partial update applied onto an active model.
///
/// Implementations only set the fields they carry.
pub trait Patch<E: EntityTrait> {
    /// Write the carried fields into `active`.
    fn apply_to(self, active: &mut E::ActiveModel);
}

/// Load rows of `E` by primary key into a map, with one `IN` query.
///
/// No query is issued when `ids` is empty.
pub async fn load_by_ids<E: Schema>(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = i32> + Send,
) -> Result<HashMap<i32, E::Model>, DbErr> {
    let ids: HashSet<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();

    let rows = E::find()
        .filter(E::id_column().is_in(ids))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|row| (E::id_of(&row), row)).collect())
}
