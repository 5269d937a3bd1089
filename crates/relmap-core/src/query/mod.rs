//! Relational query shape and include planning over the metadata model.

mod error;
pub mod explain;
pub mod expr;
pub mod include;
pub mod join;
pub mod materialize;
pub mod related;
pub mod select;
mod source;
#[cfg(test)]
mod tests;

pub use error::IncludeError;
pub use expr::{AliasExpression, ColumnExpression, SqlExpression};
pub use include::{
    CollectionStrategy, EntityQuery, IncludePlanner, IncludeQuery, ReferenceStrategy,
    RelatedValuesStrategy,
};
pub use join::build_join_predicate;
pub use materialize::{
    EntityMaterializerFactory, EntityValues, Materializer, MaterializerFactory, ProjectColumn,
    ValueBufferFactory,
};
pub use related::{CollectionRelatedValues, ReferenceRelatedValues, RelatedValuesError};
pub use select::{
    JoinExpression, JoinKind, OrderDirection, Ordering, SelectExpression, TableExpression,
    TableSource,
};
pub use source::QuerySource;
