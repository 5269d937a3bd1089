use crate::model::{
    EntityTypeId,
    foreign_key::{ForeignKey, ForeignKeyRef},
};
use derive_more::Display;

///
/// NavigationRole
/// Direction in which a navigation traverses its foreign key.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum NavigationRole {
    /// From the dependent to the principal it references; always single-valued.
    #[display("dependent-to-principal")]
    DependentToPrincipal,

    /// From the principal to its dependents; a collection unless the key is unique.
    #[display("principal-to-dependent")]
    PrincipalToDependent,
}

impl NavigationRole {
    #[must_use]
    pub const fn points_to_principal(self) -> bool {
        matches!(self, Self::DependentToPrincipal)
    }
}

///
/// NavigationRef
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{entity}.{name}")]
pub struct NavigationRef {
    pub entity: EntityTypeId,
    pub name: String,
}

///
/// Navigation
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Navigation {
    pub(crate) name: String,
    pub(crate) declaring: EntityTypeId,
    pub(crate) foreign_key: ForeignKeyRef,
    pub(crate) role: NavigationRole,
}

impl Navigation {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn declaring_entity_type(&self) -> EntityTypeId {
        self.declaring
    }

    #[must_use]
    pub const fn foreign_key(&self) -> &ForeignKeyRef {
        &self.foreign_key
    }

    #[must_use]
    pub const fn role(&self) -> NavigationRole {
        self.role
    }

    #[must_use]
    pub fn reference(&self) -> NavigationRef {
        NavigationRef {
            entity: self.declaring,
            name: self.name.clone(),
        }
    }
}

///
/// NavigationInfo
/// A navigation resolved together with the foreign key it traverses.
///

#[derive(Clone, Copy, Debug)]
pub struct NavigationInfo<'m> {
    pub navigation: &'m Navigation,
    pub foreign_key: &'m ForeignKey,
}

impl NavigationInfo<'_> {
    #[must_use]
    pub const fn points_to_principal(&self) -> bool {
        self.navigation.role.points_to_principal()
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        !self.points_to_principal() && !self.foreign_key.unique
    }

    /// Entity type the navigation lands on.
    #[must_use]
    pub const fn target_entity_type(&self) -> EntityTypeId {
        if self.points_to_principal() {
            self.foreign_key.principal_entity
        } else {
            self.foreign_key.dependent
        }
    }
}
