use crate::{model::EntityTypeId, types::ValueType};
use derive_more::Display;

///
/// PropertyRef
/// Identity of a property: its declaring entity type plus its name.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{entity}.{name}")]
pub struct PropertyRef {
    pub entity: EntityTypeId,
    pub name: String,
}

///
/// Property
///
/// One modeled value on an entity type. The three slot indexes are owned by
/// the model and reassigned whenever membership changes anywhere in the
/// declaring hierarchy.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    pub(crate) name: String,
    pub(crate) ty: ValueType,
    pub(crate) shadow: bool,
    pub(crate) concurrency_token: bool,
    pub(crate) column_name: Option<String>,
    pub(crate) declaring: EntityTypeId,
    pub(crate) index: usize,
    pub(crate) shadow_index: Option<usize>,
    pub(crate) original_value_index: Option<usize>,
}

impl Property {
    pub(crate) fn new(name: &str, ty: ValueType, shadow: bool, declaring: EntityTypeId) -> Self {
        Self {
            name: name.to_string(),
            ty,
            shadow,
            concurrency_token: false,
            column_name: None,
            declaring,
            index: 0,
            shadow_index: None,
            original_value_index: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn ty(&self) -> ValueType {
        self.ty
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.ty.nullable
    }

    /// Shadow properties have no member on the backing type.
    #[must_use]
    pub const fn is_shadow(&self) -> bool {
        self.shadow
    }

    #[must_use]
    pub const fn is_concurrency_token(&self) -> bool {
        self.concurrency_token
    }

    /// Column name, defaulting to the property name.
    #[must_use]
    pub fn column_name(&self) -> &str {
        self.column_name.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub const fn declaring_entity_type(&self) -> EntityTypeId {
        self.declaring
    }

    /// Position in the entity's value-slot array.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn shadow_index(&self) -> Option<usize> {
        self.shadow_index
    }

    /// Snapshot slot, present only for properties whose original value is kept.
    #[must_use]
    pub const fn original_value_index(&self) -> Option<usize> {
        self.original_value_index
    }

    #[must_use]
    pub fn reference(&self) -> PropertyRef {
        PropertyRef {
            entity: self.declaring,
            name: self.name.clone(),
        }
    }

    #[must_use]
    pub fn is(&self, other: &PropertyRef) -> bool {
        self.declaring == other.entity && self.name == other.name
    }
}
