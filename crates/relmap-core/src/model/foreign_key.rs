use crate::model::{
    EntityTypeId, describe_properties, key::KeyRef, navigation::NavigationRole,
    same_property_list,
};
use std::fmt::{self, Display};

///
/// ForeignKeyRef
/// Identity of a foreign key: its dependent entity type plus its property list.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ForeignKeyRef {
    pub entity: EntityTypeId,
    pub properties: Vec<String>,
}

impl Display for ForeignKeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", describe_properties(&self.properties))
    }
}

///
/// ForeignKey
///
/// Dependent-side properties referencing a principal key. The navigation
/// slots record which navigation (if any) traverses the key in each direction.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ForeignKey {
    pub(crate) dependent: EntityTypeId,
    pub(crate) properties: Vec<String>,
    pub(crate) principal_key: KeyRef,
    pub(crate) principal_entity: EntityTypeId,
    pub(crate) unique: bool,
    pub(crate) required: bool,
    pub(crate) dependent_to_principal: Option<String>,
    pub(crate) principal_to_dependent: Option<String>,
}

impl ForeignKey {
    #[must_use]
    pub const fn dependent_entity_type(&self) -> EntityTypeId {
        self.dependent
    }

    #[must_use]
    pub fn property_names(&self) -> &[String] {
        &self.properties
    }

    #[must_use]
    pub const fn principal_key(&self) -> &KeyRef {
        &self.principal_key
    }

    #[must_use]
    pub const fn principal_entity_type(&self) -> EntityTypeId {
        self.principal_entity
    }

    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique
    }

    /// A required foreign key always has a matching principal row.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn dependent_to_principal(&self) -> Option<&str> {
        self.dependent_to_principal.as_deref()
    }

    #[must_use]
    pub fn principal_to_dependent(&self) -> Option<&str> {
        self.principal_to_dependent.as_deref()
    }

    #[must_use]
    pub fn navigation(&self, role: NavigationRole) -> Option<&str> {
        match role {
            NavigationRole::DependentToPrincipal => self.dependent_to_principal(),
            NavigationRole::PrincipalToDependent => self.principal_to_dependent(),
        }
    }

    pub(crate) fn navigation_slot_mut(&mut self, role: NavigationRole) -> &mut Option<String> {
        match role {
            NavigationRole::DependentToPrincipal => &mut self.dependent_to_principal,
            NavigationRole::PrincipalToDependent => &mut self.principal_to_dependent,
        }
    }

    #[must_use]
    pub fn reference(&self) -> ForeignKeyRef {
        ForeignKeyRef {
            entity: self.dependent,
            properties: self.properties.clone(),
        }
    }

    /// Whether this foreign key satisfies every criterion set on `query`.
    ///
    /// A navigation criterion also matches an empty navigation slot, so a
    /// key that has not been given a navigation yet is still a candidate.
    #[must_use]
    pub fn matches(&self, query: &ForeignKeyQuery<'_>) -> bool {
        query
            .principal_entity
            .is_none_or(|principal| principal == self.principal_entity)
            && navigation_matches(self.dependent_to_principal(), query.navigation_to_principal)
            && navigation_matches(self.principal_to_dependent(), query.navigation_to_dependent)
            && query
                .dependent_properties
                .is_none_or(|names| same_property_list(&self.properties, names))
            && query
                .principal_properties
                .is_none_or(|names| same_property_list(&self.principal_key.properties, names))
            && query.unique.is_none_or(|unique| unique == self.unique)
    }
}

// An empty slot is still a candidate for the wanted navigation.
fn navigation_matches(slot: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        Some(wanted) => slot.is_none_or(|name| name == wanted),
        None => true,
    }
}

impl Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", describe_properties(&self.properties))
    }
}

///
/// ForeignKeyQuery
/// Semantic lookup criteria used by convention-based relationship discovery.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ForeignKeyQuery<'a> {
    pub principal_entity: Option<EntityTypeId>,
    pub navigation_to_principal: Option<&'a str>,
    pub navigation_to_dependent: Option<&'a str>,
    pub dependent_properties: Option<&'a [&'a str]>,
    pub principal_properties: Option<&'a [&'a str]>,
    pub unique: Option<bool>,
}
