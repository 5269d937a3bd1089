//! Core runtime for relmap: the entity metadata model, the relational query
//! shape, the include planner, and the ergonomics exported via the `prelude`.
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Default upper bound on include path length.
///
/// Every collection step adds a nested query, so unbounded paths turn into
/// unbounded cursor fan-out at execution time.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, planners, or readers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{
            EntityTypeId, EntityTypeMut, EntityTypeRef, ForeignKeyRef, KeyRef, Model,
            NavigationRef, NavigationRole, PropertyRef,
        },
        query::QuerySource,
        types::{ScalarKind, StructuralType, ValueType},
        value::Value,
    };
}
