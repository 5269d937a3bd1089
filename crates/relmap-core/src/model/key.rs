use crate::model::{EntityTypeId, describe_properties};
use std::fmt::{self, Display};

///
/// KeyRef
/// Identity of a key: the entity type that declares it plus its property list.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct KeyRef {
    pub entity: EntityTypeId,
    pub properties: Vec<String>,
}

impl Display for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", describe_properties(&self.properties))
    }
}

///
/// Key
/// Ordered, immutable uniqueness constraint over properties of one entity type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Key {
    pub(crate) entity: EntityTypeId,
    pub(crate) properties: Vec<String>,
}

impl Key {
    #[must_use]
    pub const fn entity_type(&self) -> EntityTypeId {
        self.entity
    }

    #[must_use]
    pub fn property_names(&self) -> &[String] {
        &self.properties
    }

    #[must_use]
    pub fn reference(&self) -> KeyRef {
        KeyRef {
            entity: self.entity,
            properties: self.properties.clone(),
        }
    }

    #[must_use]
    pub fn is(&self, key: &KeyRef) -> bool {
        self.entity == key.entity && self.properties == key.properties
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", describe_properties(&self.properties))
    }
}
