use derive_more::Display;
use relmap_core::{
    config::ConfigError,
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
    model::ModelError,
    query::{IncludeError, RelatedValuesError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(ErrorKind::Internal, err.origin.into(), err.message)
    }
}

impl From<ModelError> for Error {
    fn from(err: ModelError) -> Self {
        let kind = match err.class() {
            ErrorClass::MetadataConsistency => ErrorKind::Model(ModelErrorKind::Inconsistent),
            ErrorClass::InvalidState => ErrorKind::Model(ModelErrorKind::InvalidState),
            ErrorClass::InUse => ErrorKind::Model(ModelErrorKind::InUse),
            ErrorClass::NotFound => ErrorKind::Model(ModelErrorKind::NotFound),
            ErrorClass::Internal => ErrorKind::Internal,
        };

        Self::new(kind, ErrorOrigin::Model, err.to_string())
    }
}

impl From<IncludeError> for Error {
    fn from(err: IncludeError) -> Self {
        let kind = match &err {
            IncludeError::Model(inner) => return inner.clone().into(),
            IncludeError::PathTooDeep { .. } | IncludeError::DisconnectedPath { .. } => {
                ErrorKind::Query(QueryErrorKind::Invalid)
            }
            IncludeError::QuerySourceNotFound(_) => ErrorKind::Query(QueryErrorKind::NotFound),
            IncludeError::JoinArityMismatch { .. } => {
                ErrorKind::Query(QueryErrorKind::Inconsistent)
            }
            IncludeError::ColumnNotProjected { .. } | IncludeError::UnaliasedTable => {
                ErrorKind::Internal
            }
        };

        Self::new(kind, ErrorOrigin::Query, err.to_string())
    }
}

impl From<RelatedValuesError> for Error {
    fn from(err: RelatedValuesError) -> Self {
        Self::new(
            ErrorKind::Query(QueryErrorKind::MalformedRow),
            ErrorOrigin::Query,
            err.to_string(),
        )
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Model(ModelErrorKind),
    Query(QueryErrorKind),

    /// Configuration could not be read or failed validation.
    Config,

    /// The caller cannot remediate this.
    Internal,
}

///
/// ModelErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ModelErrorKind {
    /// Elements wired to the wrong entity type or with mismatched shapes.
    Inconsistent,

    /// Duplicates, rule violations, or a mutation the current state forbids.
    InvalidState,

    /// Removal refused while something still references the target.
    InUse,

    NotFound,
}

///
/// QueryErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    /// Include path is too deep or does not connect.
    Invalid,

    /// The query source is not bound in the select.
    NotFound,

    /// Foreign key and principal key disagree in length.
    Inconsistent,

    /// A result row is shorter than the plan expects.
    MalformedRow,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Model,
    Query,
    Config,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Model => Self::Model,
            CoreErrorOrigin::Query => Self::Query,
            CoreErrorOrigin::Config => Self::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_core::query::QuerySource;

    #[test]
    fn model_errors_keep_their_class() {
        let err: Error = ModelError::EntityTypeNotFound("Invoice".to_string()).into();

        assert_eq!(err.kind, ErrorKind::Model(ModelErrorKind::NotFound));
        assert_eq!(err.origin, ErrorOrigin::Model);
        assert_eq!(err.to_string(), "entity type 'Invoice' not found");
    }

    #[test]
    fn include_errors_unwrap_model_failures() {
        let wrapped = IncludeError::Model(ModelError::DuplicateEntityType("Order".to_string()));
        let err: Error = wrapped.into();
        assert_eq!(err.kind, ErrorKind::Model(ModelErrorKind::InvalidState));
        assert_eq!(err.origin, ErrorOrigin::Model);

        let err: Error = IncludeError::QuerySourceNotFound(QuerySource::new("o")).into();
        assert_eq!(err.kind, ErrorKind::Query(QueryErrorKind::NotFound));
        assert_eq!(err.origin, ErrorOrigin::Query);

        let err: Error = IncludeError::UnaliasedTable.into();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn internal_errors_keep_their_origin() {
        let internal = InternalError::new(ErrorClass::Internal, CoreErrorOrigin::Config, "bad");
        let err: Error = internal.into();

        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.origin, ErrorOrigin::Config);
        assert_eq!(err.message, "bad");
    }
}
