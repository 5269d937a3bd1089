use crate::{error::ErrorClass, model::EntityTypeId, types::ValueType};
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// NavigationRule
/// The navigation rule a rejected `add_navigation` call violated.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum NavigationRule {
    #[display("shadow entity types cannot declare navigations")]
    ShadowEntity,

    #[display("the backing type has no navigation member with this name")]
    MissingMember,

    #[display("the navigation target is a shadow entity type")]
    ShadowTarget,

    #[display("the member type is not assignable from the navigation target")]
    TypeMismatch,

    #[display("the foreign key already has a navigation in this direction")]
    DirectionCollision,

    #[display("the name is already used by a property")]
    PropertyNameCollision,
}

///
/// ModelError
///
/// Every failure a metadata mutation or lookup can produce.
/// `class()` sorts variants into the consistency / invalid-state / in-use /
/// not-found taxonomy.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ModelError {
    //
    // metadata consistency
    //
    #[error("property '{property}' does not belong to entity type '{entity}'")]
    PropertyWrongEntityType { property: String, entity: String },

    #[error("foreign key {foreign_key} does not belong to entity type '{entity}'")]
    ForeignKeyWrongEntityType { foreign_key: String, entity: String },

    #[error("entity type '{principal}' cannot be the principal of a key declared on '{key_owner}'")]
    PrincipalEntityTypeMismatch {
        principal: String,
        key_owner: String,
    },

    #[error(
        "foreign key {foreign_key} has {found} properties but principal key {principal_key} has {expected}"
    )]
    ForeignKeyArityMismatch {
        foreign_key: String,
        principal_key: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "foreign key property '{property}' ({property_type}) is not compatible with principal key property '{principal_property}' ({principal_type})"
    )]
    ForeignKeyTypeMismatch {
        property: String,
        property_type: ValueType,
        principal_property: String,
        principal_type: ValueType,
    },

    #[error("entity type handle {0} is not registered in this model")]
    UnknownEntityType(EntityTypeId),

    //
    // invalid state
    //
    #[error("entity type '{entity}' derives from '{base}' and cannot declare keys")]
    DerivedEntityTypeKey { entity: String, base: String },

    #[error(
        "entity type '{entity}' must use eager snapshots because its type does not raise change notifications"
    )]
    EagerSnapshotsRequired { entity: String },

    #[error("entity type '{0}' is already registered")]
    DuplicateEntityType(String),

    #[error("property '{property}' is already declared on '{declared_on}' in the hierarchy of '{entity}'")]
    DuplicateProperty {
        property: String,
        entity: String,
        declared_on: String,
    },

    #[error("key {key} already exists on entity type '{entity}'")]
    DuplicateKey { key: String, entity: String },

    #[error("foreign key {foreign_key} already exists on entity type '{entity}'")]
    DuplicateForeignKey { foreign_key: String, entity: String },

    #[error(
        "navigation '{navigation}' is already declared on '{declared_on}' in the hierarchy of '{entity}'"
    )]
    DuplicateNavigation {
        navigation: String,
        entity: String,
        declared_on: String,
    },

    #[error("index {index} already exists on entity type '{entity}'")]
    DuplicateIndex { index: String, entity: String },

    #[error("a property list on entity type '{entity}' must not be empty")]
    EmptyPropertyList { entity: String },

    #[error("property '{property}' appears more than once in a property list on entity type '{entity}'")]
    RepeatedProperty { property: String, entity: String },

    #[error("property '{property}' has no scalar member of type {ty} on '{type_name}'")]
    MissingPropertyMember {
        property: String,
        ty: ValueType,
        type_name: String,
    },

    #[error("shadow entity type '{entity}' can only declare shadow properties, not '{property}'")]
    NonShadowPropertyOnShadowEntity { property: String, entity: String },

    #[error("navigation '{navigation}' on entity type '{entity}' is invalid: {rule}")]
    InvalidNavigation {
        navigation: String,
        entity: String,
        rule: NavigationRule,
    },

    #[error("making '{base}' the base type of '{entity}' would create an inheritance cycle")]
    CircularInheritance { entity: String, base: String },

    //
    // in use
    //
    #[error("key {key} on entity type '{entity}' is referenced by foreign key {foreign_key} on '{dependent}'")]
    KeyInUse {
        key: String,
        entity: String,
        foreign_key: String,
        dependent: String,
    },

    #[error(
        "foreign key {foreign_key} on entity type '{entity}' is still used by navigation '{navigation}'"
    )]
    ForeignKeyInUse {
        foreign_key: String,
        entity: String,
        navigation: String,
    },

    #[error("property '{property}' on entity type '{entity}' is used by {user}")]
    PropertyInUse {
        property: String,
        entity: String,
        user: String,
    },

    #[error("entity type '{entity}' is referenced by {user}")]
    EntityTypeInUse { entity: String, user: String },

    //
    // not found
    //
    #[error("property '{property}' not found on entity type '{entity}'")]
    PropertyNotFound { property: String, entity: String },

    #[error("key {key} not found on entity type '{entity}'")]
    KeyNotFound { key: String, entity: String },

    #[error("entity type '{entity}' has no primary key")]
    PrimaryKeyNotFound { entity: String },

    #[error("foreign key {foreign_key} not found on entity type '{entity}'")]
    ForeignKeyNotFound { foreign_key: String, entity: String },

    #[error("navigation '{navigation}' not found on entity type '{entity}'")]
    NavigationNotFound { navigation: String, entity: String },

    #[error("index {index} not found on entity type '{entity}'")]
    IndexNotFound { index: String, entity: String },

    #[error("entity type '{0}' not found")]
    EntityTypeNotFound(String),
}

impl ModelError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::PropertyWrongEntityType { .. }
            | Self::ForeignKeyWrongEntityType { .. }
            | Self::PrincipalEntityTypeMismatch { .. }
            | Self::ForeignKeyArityMismatch { .. }
            | Self::ForeignKeyTypeMismatch { .. }
            | Self::UnknownEntityType(_) => ErrorClass::MetadataConsistency,

            Self::DerivedEntityTypeKey { .. }
            | Self::EagerSnapshotsRequired { .. }
            | Self::DuplicateEntityType(_)
            | Self::DuplicateProperty { .. }
            | Self::DuplicateKey { .. }
            | Self::DuplicateForeignKey { .. }
            | Self::DuplicateNavigation { .. }
            | Self::DuplicateIndex { .. }
            | Self::EmptyPropertyList { .. }
            | Self::RepeatedProperty { .. }
            | Self::MissingPropertyMember { .. }
            | Self::NonShadowPropertyOnShadowEntity { .. }
            | Self::InvalidNavigation { .. }
            | Self::CircularInheritance { .. } => ErrorClass::InvalidState,

            Self::KeyInUse { .. }
            | Self::ForeignKeyInUse { .. }
            | Self::PropertyInUse { .. }
            | Self::EntityTypeInUse { .. } => ErrorClass::InUse,

            Self::PropertyNotFound { .. }
            | Self::KeyNotFound { .. }
            | Self::PrimaryKeyNotFound { .. }
            | Self::ForeignKeyNotFound { .. }
            | Self::NavigationNotFound { .. }
            | Self::IndexNotFound { .. }
            | Self::EntityTypeNotFound(_) => ErrorClass::NotFound,
        }
    }
}
