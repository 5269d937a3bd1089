use crate::model::EntityTypeId;
use std::fmt::{self, Display};

///
/// Index
/// Secondary index over an ordered property list.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Index {
    pub(crate) entity: EntityTypeId,
    pub(crate) properties: Vec<String>,
    pub(crate) unique: bool,
}

impl Index {
    #[must_use]
    pub const fn entity_type(&self) -> EntityTypeId {
        self.entity
    }

    #[must_use]
    pub fn property_names(&self) -> &[String] {
        &self.properties
    }

    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let properties = self.properties.join(", ");

        if self.unique {
            write!(f, "UNIQUE {}({})", self.entity, properties)
        } else {
            write!(f, "{}({})", self.entity, properties)
        }
    }
}
