use crate::{error::ErrorClass, model::ModelError, query::QuerySource};
use thiserror::Error as ThisError;

///
/// IncludeError
/// Failures raised while planning an include path.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IncludeError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("include path has {depth} navigations but at most {max} are allowed")]
    PathTooDeep { depth: usize, max: usize },

    #[error("query source '{0}' has no table in the select expression")]
    QuerySourceNotFound(QuerySource),

    #[error("navigation '{navigation}' cannot be reached from entity type '{entity}'")]
    DisconnectedPath { navigation: String, entity: String },

    #[error(
        "navigation '{navigation}' pairs foreign key {foreign_key} with principal key {principal_key} of a different length"
    )]
    JoinArityMismatch {
        navigation: String,
        foreign_key: String,
        principal_key: String,
    },

    #[error("property '{property}' is not projected by subquery '{alias}'")]
    ColumnNotProjected { property: String, alias: String },

    #[error("a nested select used as a table source must have an alias")]
    UnaliasedTable,
}

impl IncludeError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Model(err) => err.class(),
            Self::JoinArityMismatch { .. } => ErrorClass::MetadataConsistency,
            Self::PathTooDeep { .. } | Self::DisconnectedPath { .. } => ErrorClass::InvalidState,
            Self::QuerySourceNotFound(_) => ErrorClass::NotFound,
            Self::ColumnNotProjected { .. } | Self::UnaliasedTable => ErrorClass::Internal,
        }
    }
}
