//! Mutable relational query shape rewritten by the include planner.

use crate::{
    model::Property,
    query::{
        IncludeError, QuerySource,
        expr::{AliasExpression, ColumnExpression, SqlExpression},
    },
};
use derive_more::Display;

///
/// JoinKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum JoinKind {
    #[display("INNER JOIN")]
    Inner,

    #[display("LEFT JOIN")]
    LeftOuter,
}

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum OrderDirection {
    #[default]
    #[display("ASC")]
    Ascending,

    #[display("DESC")]
    Descending,
}

///
/// TableExpression
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableExpression {
    pub name: String,
    pub schema: Option<String>,
    pub alias: String,
    pub query_source: Option<QuerySource>,
}

///
/// JoinExpression
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinExpression {
    pub kind: JoinKind,
    pub table: Box<TableSource>,
    pub predicate: SqlExpression,
}

///
/// TableSource
/// Anything that can appear in a FROM clause.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TableSource {
    Table(TableExpression),
    Select(Box<SelectExpression>),
    Join(JoinExpression),
}

impl TableSource {
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Table(table) => Some(&table.alias),
            Self::Select(select) => select.alias(),
            Self::Join(join) => join.table.alias(),
        }
    }

    #[must_use]
    pub fn query_source(&self) -> Option<&QuerySource> {
        match self {
            Self::Table(table) => table.query_source.as_ref(),
            Self::Select(_) => None,
            Self::Join(join) => join.table.query_source(),
        }
    }

    /// Column for `property` in this scope.
    ///
    /// A subquery exposes only what it projects, under the projection's
    /// alias, so its aliased entry is used instead of the raw column name.
    /// An order-key subquery projects ancestor keys before the keys of the
    /// table it was cut at, so when a property is projected more than once
    /// the last entry is the innermost table's column.
    pub fn column_for(&self, property: &Property) -> Result<ColumnExpression, IncludeError> {
        match self {
            Self::Table(table) => Ok(ColumnExpression::new(
                property.column_name(),
                table.alias.clone(),
                Some(property.reference()),
                property.ty(),
            )),
            Self::Select(select) => {
                let alias = select.alias().ok_or(IncludeError::UnaliasedTable)?;
                let projected = select
                    .projection()
                    .iter()
                    .rev()
                    .find(|entry| {
                        entry
                            .expression
                            .as_column()
                            .and_then(|column| column.property.as_ref())
                            .is_some_and(|reference| property.is(reference))
                    })
                    .ok_or_else(|| IncludeError::ColumnNotProjected {
                        property: property.name().to_string(),
                        alias: alias.to_string(),
                    })?;

                Ok(ColumnExpression::new(
                    projected.alias.clone(),
                    alias,
                    Some(property.reference()),
                    projected.expression.ty(),
                ))
            }
            Self::Join(join) => join.table.column_for(property),
        }
    }
}

///
/// Ordering
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ordering {
    pub column: ColumnExpression,
    pub direction: OrderDirection,
}

///
/// SelectExpression
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectExpression {
    alias: Option<String>,
    tables: Vec<TableSource>,
    projection: Vec<AliasExpression>,
    order_by: Vec<Ordering>,
    distinct: bool,
    reader_offsets: Vec<usize>,
}

impl SelectExpression {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn set_alias(&mut self, alias: impl Into<String>) {
        self.alias = Some(alias.into());
    }

    #[must_use]
    pub fn tables(&self) -> &[TableSource] {
        &self.tables
    }

    #[must_use]
    pub fn projection(&self) -> &[AliasExpression] {
        &self.projection
    }

    #[must_use]
    pub fn order_by(&self) -> &[Ordering] {
        &self.order_by
    }

    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub const fn set_distinct(&mut self, distinct: bool) {
        self.distinct = distinct;
    }

    /// Projection offsets registered by include steps, in registration order.
    #[must_use]
    pub fn reader_offsets(&self) -> &[usize] {
        &self.reader_offsets
    }

    pub fn register_reader_offset(&mut self, offset: usize) {
        self.reader_offsets.push(offset);
    }

    //
    // tables
    //

    /// `base`, or `base` suffixed with the first free counter (`c`, `c0`, `c1`).
    #[must_use]
    pub fn unique_table_alias(&self, base: &str) -> String {
        let taken = |candidate: &str| {
            self.tables
                .iter()
                .any(|table| table.alias() == Some(candidate))
        };
        if !taken(base) {
            return base.to_string();
        }

        (0..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn add_table(&mut self, table: TableSource) {
        self.tables.push(table);
    }

    pub fn add_inner_join(&mut self, table: TableSource, predicate: SqlExpression) {
        self.add_join(JoinKind::Inner, table, predicate);
    }

    pub fn add_left_outer_join(&mut self, table: TableSource, predicate: SqlExpression) {
        self.add_join(JoinKind::LeftOuter, table, predicate);
    }

    pub fn add_join(&mut self, kind: JoinKind, table: TableSource, predicate: SqlExpression) {
        self.tables.push(TableSource::Join(JoinExpression {
            kind,
            table: Box::new(table),
            predicate,
        }));
    }

    /// Last table bound to `source`.
    #[must_use]
    pub fn table_for_query_source(&self, source: &QuerySource) -> Option<&TableSource> {
        self.tables
            .iter()
            .rev()
            .find(|table| table.query_source() == Some(source))
    }

    //
    // projection
    //

    /// Append `expression` and return its position. An identical expression
    /// already projected keeps its position; a new one gets a unique output
    /// name derived from `alias` (`Id`, `Id0`, `Id1`).
    pub fn add_to_projection(&mut self, expression: SqlExpression, alias: &str) -> usize {
        if let Some(index) = self
            .projection
            .iter()
            .position(|entry| entry.expression == expression)
        {
            return index;
        }

        let taken = |candidate: &str| self.projection.iter().any(|entry| entry.alias == candidate);
        let alias = if taken(alias) {
            (0..)
                .map(|n| format!("{alias}{n}"))
                .find(|candidate| !taken(candidate))
                .unwrap_or_else(|| alias.to_string())
        } else {
            alias.to_string()
        };

        self.projection.push(AliasExpression { expression, alias });

        self.projection.len() - 1
    }

    pub fn add_column_to_projection(&mut self, column: ColumnExpression) -> usize {
        let alias = column.name.clone();

        self.add_to_projection(SqlExpression::Column(column), &alias)
    }

    pub fn clear_projection(&mut self) {
        self.projection.clear();
    }

    //
    // ordering
    //

    /// Append an ordering unless the same column is already ordered on.
    pub fn add_to_order_by(&mut self, column: ColumnExpression, direction: OrderDirection) {
        if self.order_by.iter().any(|ordering| ordering.column == column) {
            return;
        }

        self.order_by.push(Ordering { column, direction });
    }

    pub fn clear_order_by(&mut self) {
        self.order_by.clear();
    }

    /// Clone whose orderings stop after the last one on table `alias`.
    #[must_use]
    pub fn clone_with_order_by_through(&self, alias: &str) -> Self {
        let mut clone = self.clone();
        let keep = self
            .order_by
            .iter()
            .rposition(|ordering| ordering.column.table_alias == alias)
            .map_or(0, |last| last + 1);
        clone.order_by.truncate(keep);

        clone
    }

    /// Turn this select into a `DISTINCT` subquery named `alias` that projects
    /// only its order keys. Returns the subquery and its orderings re-pointed
    /// at the subquery's output columns.
    #[must_use]
    pub fn into_order_key_subquery(mut self, alias: &str) -> (Self, Vec<Ordering>) {
        self.set_distinct(true);
        self.clear_projection();

        let orderings = std::mem::take(&mut self.order_by);
        let mut outer = Vec::with_capacity(orderings.len());
        for ordering in orderings {
            let index = self.add_column_to_projection(ordering.column.clone());
            let name = self.projection[index].alias.clone();

            outer.push(Ordering {
                column: ColumnExpression::new(name, alias, ordering.column.property, ordering.column.ty),
                direction: ordering.direction,
            });
        }
        self.set_alias(alias);

        (self, outer)
    }
}
