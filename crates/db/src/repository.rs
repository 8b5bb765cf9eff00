//! Generic repository over one entity.
//!
//! [`Repository`] applies predicate lists, eager-load options, ordering,
//! soft-delete visibility and pagination for any entity implementing
//! [`Schema`]. Soft-deleted rows are excluded unless a call opts in.

use std::marker::PhantomData;
use std::sync::Arc;

use arena_common::AppResult;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityName, EntityTrait,
    IdenStatic, IntoActiveModel, Iterable, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use tracing::{debug, info, warn};

use crate::filter::{OrderDirection, Predicate, escape_like};
use crate::pagination::{Page, PageRequest};
use crate::schema::{Hydrated, Patch, Schema};

/// Repository bound to one entity.
pub struct Repository<E> {
    db: Arc<DatabaseConnection>,
    entity: PhantomData<E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            entity: PhantomData,
        }
    }
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

fn table_name<E: EntityTrait>() -> String {
    E::default().table_name().to_string()
}

/// Resolve a column by its database name.
fn find_column<E: EntityTrait>(name: &str) -> Option<E::Column> {
    E::Column::iter().find(|column| column.as_str() == name)
}

/// Translate one predicate, or `None` when it names no column of `E`.
fn predicate_condition<E: EntityTrait>(predicate: &Predicate) -> Option<Condition> {
    let resolve = |field: &str| {
        let column = find_column::<E>(field);
        if column.is_none() {
            warn!(
                entity = %table_name::<E>(),
                field = field,
                "Dropping predicate on unknown field"
            );
        }
        column
    };

    match predicate {
        Predicate::Eq { field, value } => {
            resolve(*field).map(|column| Condition::all().add(column.eq(value.clone())))
        }
        Predicate::In { field, values } => {
            resolve(*field).map(|column| Condition::all().add(column.is_in(values.clone())))
        }
        Predicate::Range { field, min, max } => resolve(*field).map(|column| {
            let mut condition = Condition::all();
            if let Some(min) = min {
                condition = condition.add(column.gte(min.clone()));
            }
            if let Some(max) = max {
                condition = condition.add(column.lte(max.clone()));
            }
            condition
        }),
        Predicate::IsNull { field, is_null } => resolve(*field).map(|column| {
            Condition::all().add(if *is_null {
                column.is_null()
            } else {
                column.is_not_null()
            })
        }),
        Predicate::Search { fields, term } => {
            let columns: Vec<E::Column> = fields
                .iter()
                .filter_map(|field| {
                    let column = find_column::<E>(field);
                    if column.is_none() {
                        debug!(entity = %table_name::<E>(), field = field, "Skipping search field");
                    }
                    column
                })
                .collect();
            if columns.is_empty() {
                warn!(entity = %table_name::<E>(), "No searchable fields, dropping search");
                return None;
            }

            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            Some(columns.into_iter().fold(Condition::any(), |condition, column| {
                condition.add(
                    Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
            }))
        }
    }
}

impl<E: Schema> Repository<E> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            entity: PhantomData,
        }
    }

    /// Get reference to the database connection.
    pub fn db(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }

    /// Select over `filters` AND-ed, plus the soft-delete exclusion.
    pub(crate) fn select(filters: &[Predicate], include_deleted: bool) -> Select<E> {
        let mut condition = filters
            .iter()
            .filter_map(predicate_condition::<E>)
            .fold(Condition::all(), |all, condition| all.add(condition));
        if !include_deleted {
            condition = condition.add(E::deleted_at_column().is_null());
        }
        E::find().filter(condition)
    }

    /// Apply the requested order followed by an `id ASC` tie-break.
    ///
    /// Missing or unknown sort fields order by primary key ascending.
    pub(crate) fn ordered(
        select: Select<E>,
        order_by: Option<&str>,
        direction: OrderDirection,
    ) -> Select<E> {
        let id = E::id_column();
        let column = order_by.and_then(|name| {
            let column = find_column::<E>(name);
            if column.is_none() {
                debug!(entity = %table_name::<E>(), order_by = name, "Ignoring unknown sort field");
            }
            column
        });

        match column {
            Some(column) if column.as_str() == id.as_str() => {
                select.order_by(id, direction.into())
            }
            Some(column) => select
                .order_by(column, direction.into())
                .order_by(id, Order::Asc),
            None => select.order_by(id, Order::Asc),
        }
    }

    async fn hydrate(
        &self,
        rows: Vec<E::Model>,
        options: &[E::Load],
    ) -> AppResult<Vec<Hydrated<E>>> {
        let related = if options.is_empty() || rows.is_empty() {
            vec![E::Related::default(); rows.len()]
        } else {
            E::hydrate(self.db.as_ref(), &rows, options).await?
        };

        Ok(rows
            .into_iter()
            .zip(related)
            .map(|(model, related)| Hydrated { model, related })
            .collect())
    }

    /// Fetch one row by primary key.
    ///
    /// Soft-deleted rows are absent unless `include_deleted` is set.
    pub async fn get(
        &self,
        id: i32,
        options: &[E::Load],
        include_deleted: bool,
    ) -> AppResult<Option<Hydrated<E>>> {
        let mut query = E::find().filter(E::id_column().eq(id));
        if !include_deleted {
            query = query.filter(E::deleted_at_column().is_null());
        }

        let Some(model) = query.one(self.db.as_ref()).await? else {
            return Ok(None);
        };

        Ok(self.hydrate(vec![model], options).await?.pop())
    }

    /// Fetch every row matching `filters`.
    pub async fn get_with_filters(
        &self,
        filters: &[Predicate],
        options: &[E::Load],
        order_by: Option<&str>,
        direction: OrderDirection,
        include_deleted: bool,
    ) -> AppResult<Vec<Hydrated<E>>> {
        let rows = Self::ordered(Self::select(filters, include_deleted), order_by, direction)
            .all(self.db.as_ref())
            .await?;

        self.hydrate(rows, options).await
    }

    /// Fetch the first non-deleted row matching `filters`.
    pub async fn get_first_with_filters(
        &self,
        filters: &[Predicate],
        options: &[E::Load],
    ) -> AppResult<Option<Hydrated<E>>> {
        let row = Self::ordered(Self::select(filters, false), None, OrderDirection::Asc)
            .one(self.db.as_ref())
            .await?;

        match row {
            Some(model) => Ok(self.hydrate(vec![model], options).await?.pop()),
            None => Ok(None),
        }
    }

    /// Whether a non-deleted row with this primary key exists.
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let count = E::find()
            .filter(E::id_column().eq(id))
            .filter(E::deleted_at_column().is_null())
            .count(self.db.as_ref())
            .await?;

        Ok(count > 0)
    }

    /// Whether any row matches `filters`.
    pub async fn exists_with_filters(
        &self,
        filters: &[Predicate],
        include_deleted: bool,
    ) -> AppResult<bool> {
        let count = Self::select(filters, include_deleted)
            .count(self.db.as_ref())
            .await?;

        Ok(count > 0)
    }

    /// Delete a row.
    ///
    /// Soft delete stamps `deleted_at` on a non-deleted row; hard delete
    /// removes the row. Returns `false` when there was nothing to delete.
    pub async fn delete(&self, id: i32, force_delete: bool) -> AppResult<bool> {
        let result = if force_delete {
            E::delete_many()
                .filter(E::id_column().eq(id))
                .exec(self.db.as_ref())
                .await?
                .rows_affected
        } else {
            let now = now();
            E::update_many()
                .col_expr(E::deleted_at_column(), Expr::value(now))
                .col_expr(E::updated_at_column(), Expr::value(now))
                .filter(E::id_column().eq(id))
                .filter(E::deleted_at_column().is_null())
                .exec(self.db.as_ref())
                .await?
                .rows_affected
        };

        let deleted = result > 0;
        if deleted {
            info!(entity = %table_name::<E>(), id = id, force_delete = force_delete, "Deleted row");
        }
        Ok(deleted)
    }

    /// Fetch one page of rows matching `filters`, mapped through `dto`.
    ///
    /// `total` counts every matching row; a page past the end is empty.
    pub async fn paginate<T, F>(
        &self,
        dto: F,
        request: PageRequest,
        filters: &[Predicate],
        options: &[E::Load],
        order_by: Option<&str>,
        direction: OrderDirection,
        include_deleted: bool,
    ) -> AppResult<Page<T>>
    where
        F: Fn(Hydrated<E>) -> T + Send,
        T: Send,
    {
        let select = Self::select(filters, include_deleted);
        let total = select.clone().count(self.db.as_ref()).await?;

        let rows = Self::ordered(select, order_by, direction)
            .offset(request.offset())
            .limit(request.limit())
            .all(self.db.as_ref())
            .await?;
        let rows = self.hydrate(rows, options).await?;

        Ok(Page::new(rows.into_iter().map(dto).collect(), total, request))
    }
}

impl<E> Repository<E>
where
    E: Schema,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: Send,
{
    /// Insert a row, stamping its timestamps.
    pub async fn create(&self, mut active: E::ActiveModel) -> AppResult<E::Model> {
        let now = now();
        active.set(E::created_at_column(), now.into());
        active.set(E::updated_at_column(), now.into());

        let model = active.insert(self.db.as_ref()).await?;

        info!(entity = %table_name::<E>(), id = E::id_of(&model), "Created row");
        Ok(model)
    }

    /// Apply `patch` onto `model` and persist the changed fields.
    pub async fn update(
        &self,
        model: E::Model,
        patch: impl Patch<E> + Send,
    ) -> AppResult<E::Model> {
        let mut active = model.into_active_model();
        patch.apply_to(&mut active);
        active.set(E::updated_at_column(), now().into());

        let model = active.update(self.db.as_ref()).await?;

        info!(entity = %table_name::<E>(), id = E::id_of(&model), "Updated row");
        Ok(model)
    }
}
