//! Declarative query filters.
//!
//! A [`Filter`] turns request parameters into an ordered list of
//! [`Predicate`]s. Predicates name columns by string; the repository resolves
//! them against the target entity and drops any that do not exist there, so a
//! stale field list can never produce SQL against an unknown column.

use sea_orm::Value;
use serde::{Deserialize, Serialize};

use crate::pagination::PageRequest;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl From<OrderDirection> for sea_orm::Order {
    fn from(direction: OrderDirection) -> Self {
        match direction {
            OrderDirection::Asc => Self::Asc,
            OrderDirection::Desc => Self::Desc,
        }
    }
}

/// A single field-level condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field = value`.
    Eq {
        /// Column name.
        field: &'static str,
        /// Compared value.
        value: Value,
    },
    /// `field IN (values)`.
    In {
        /// Column name.
        field: &'static str,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// `min <= field <= max`, either bound optional.
    Range {
        /// Column name.
        field: &'static str,
        /// Inclusive lower bound.
        min: Option<Value>,
        /// Inclusive upper bound.
        max: Option<Value>,
    },
    /// `field IS NULL` or `field IS NOT NULL`.
    IsNull {
        /// Column name.
        field: &'static str,
        /// Whether the column must be null.
        is_null: bool,
    },
    /// Case-insensitive partial match OR-ed over `fields`.
    Search {
        /// Candidate column names.
        fields: &'static [&'static str],
        /// Raw search term.
        term: String,
    },
}

/// Builder that only records predicates for inputs that are present.
///
/// Absent options, empty lists and blank search strings add nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet(Vec<Predicate>);

impl PredicateSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Add `field = value` when `value` is present.
    #[must_use]
    pub fn eq<V: Into<Value>>(mut self, field: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.0.push(Predicate::Eq {
                field,
                value: value.into(),
            });
        }
        self
    }

    /// Add `field IN (values)` when `values` is non-empty.
    #[must_use]
    pub fn any_of<V, I>(mut self, field: &'static str, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.0.push(Predicate::In { field, values });
        }
        self
    }

    /// Add an inclusive range when at least one bound is present.
    #[must_use]
    pub fn range<V: Into<Value>>(
        mut self,
        field: &'static str,
        min: Option<V>,
        max: Option<V>,
    ) -> Self {
        if min.is_some() || max.is_some() {
            self.0.push(Predicate::Range {
                field,
                min: min.map(Into::into),
                max: max.map(Into::into),
            });
        }
        self
    }

    /// Add a null check when `is_null` is present.
    #[must_use]
    pub fn null(mut self, field: &'static str, is_null: Option<bool>) -> Self {
        if let Some(is_null) = is_null {
            self.0.push(Predicate::IsNull { field, is_null });
        }
        self
    }

    /// Add a text search when the term is non-blank and fields are declared.
    #[must_use]
    pub fn search(mut self, fields: &'static [&'static str], term: Option<&str>) -> Self {
        let term = term.map(str::trim).filter(|t| !t.is_empty());
        if let (Some(term), false) = (term, fields.is_empty()) {
            self.0.push(Predicate::Search {
                fields,
                term: term.to_string(),
            });
        }
        self
    }

    /// Append a predicate unconditionally.
    #[must_use]
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.0.push(predicate);
        self
    }

    /// Consume the builder.
    #[must_use]
    pub fn into_vec(self) -> Vec<Predicate> {
        self.0
    }
}

/// Parameters shared by every list query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BaseFilter {
    /// Free-text search term.
    pub search: Option<String>,
    /// Column to sort by.
    pub order_by: Option<String>,
    /// Sort direction.
    pub order_direction: OrderDirection,
    /// Include soft-deleted rows.
    pub is_show_deleted: bool,
}

/// Request filter for one entity.
///
/// Implementors hold a [`BaseFilter`] plus their entity-specific inputs and
/// describe the latter in [`Filter::fields`]. [`Filter::apply`] is pure.
pub trait Filter {
    /// Shared list parameters.
    fn base(&self) -> &BaseFilter;

    /// Mutable access to the shared list parameters.
    fn base_mut(&mut self) -> &mut BaseFilter;

    /// Columns searched by the free-text term.
    fn get_search_filters(&self) -> &'static [&'static str] {
        &[]
    }

    /// Entity-specific predicates.
    fn fields(&self, set: PredicateSet) -> PredicateSet {
        set
    }

    /// Build the full predicate list.
    fn apply(&self) -> Vec<Predicate> {
        self.fields(PredicateSet::new())
            .search(self.get_search_filters(), self.search())
            .into_vec()
    }

    /// Free-text search term.
    fn search(&self) -> Option<&str> {
        self.base().search.as_deref()
    }

    /// Requested sort column.
    fn order_by(&self) -> Option<&str> {
        self.base().order_by.as_deref()
    }

    /// Requested sort direction.
    fn order_direction(&self) -> OrderDirection {
        self.base().order_direction
    }

    /// Whether soft-deleted rows are included.
    fn is_show_deleted(&self) -> bool {
        self.base().is_show_deleted
    }

    /// Replace the shared list parameters.
    #[must_use]
    fn with_base(mut self, base: BaseFilter) -> Self
    where
        Self: Sized,
    {
        *self.base_mut() = base;
        self
    }
}

/// A filter together with the page it is sliced to.
#[derive(Debug, Clone)]
pub struct PaginationFilter<F> {
    /// Underlying filter.
    pub filter: F,
    /// Requested page.
    pub page: PageRequest,
}

impl<F: Filter> PaginationFilter<F> {
    /// Pair a filter with a page request.
    #[must_use]
    pub const fn new(filter: F, page: PageRequest) -> Self {
        Self { filter, page }
    }
}

impl<F: Filter> Filter for PaginationFilter<F> {
    fn base(&self) -> &BaseFilter {
        self.filter.base()
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        self.filter.base_mut()
    }

    fn get_search_filters(&self) -> &'static [&'static str] {
        self.filter.get_search_filters()
    }

    fn fields(&self, set: PredicateSet) -> PredicateSet {
        self.filter.fields(set)
    }

    fn apply(&self) -> Vec<Predicate> {
        self.filter.apply()
    }
}

/// Escape `LIKE` wildcards so the term matches literally.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
