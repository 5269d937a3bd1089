use crate::{
    config::ConfigError,
    model::ModelError,
    query::{IncludeError, RelatedValuesError},
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<ModelError> for InternalError {
    fn from(err: ModelError) -> Self {
        Self::new(err.class(), ErrorOrigin::Model, err.to_string())
    }
}

impl From<IncludeError> for InternalError {
    fn from(err: IncludeError) -> Self {
        let origin = match &err {
            IncludeError::Model(_) => ErrorOrigin::Model,
            _ => ErrorOrigin::Query,
        };

        Self::new(err.class(), origin, err.to_string())
    }
}

impl From<RelatedValuesError> for InternalError {
    fn from(err: RelatedValuesError) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Query, err.to_string())
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::InvalidState, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Elements wired to the wrong entity type, or key arity mismatches.
    /// Programming errors; never recovered.
    MetadataConsistency,

    /// Caller-correctable misuse: duplicates, rule violations, bad state.
    InvalidState,

    /// Removal refused because another element still references the target.
    InUse,

    NotFound,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::MetadataConsistency => "metadata_consistency",
            Self::InvalidState => "invalid_state",
            Self::InUse => "in_use",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Model,
    Query,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Model => "model",
            Self::Query => "query",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
