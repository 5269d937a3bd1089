//! Metadata model: entity types and the properties, keys, foreign keys,
//! navigations and indexes they own.
//!
//! Entity types live in an arena owned by [`Model`] and are addressed by
//! [`EntityTypeId`]. A derived type stores its base's id; a base type keeps a
//! lookup-only set of derived ids, so the inheritance graph never forms an
//! ownership cycle. Reads go through [`EntityTypeRef`], mutations through
//! [`EntityTypeMut`], and every structural mutation recomputes the slot
//! indexes of the whole hierarchy before returning.

mod entity;
mod error;
pub mod foreign_key;
pub mod index;
pub mod key;
pub mod navigation;
pub mod property;
#[cfg(test)]
mod tests;

use crate::{config::ModelConfig, types::StructuralType};
use derive_more::Display;
use std::collections::BTreeMap;
use tracing::debug;

pub use entity::{EntityType, EntityTypeMut, EntityTypeRef};
pub use error::{ModelError, NavigationRule};
pub use foreign_key::{ForeignKey, ForeignKeyQuery, ForeignKeyRef};
pub use index::Index;
pub use key::{Key, KeyRef};
pub use navigation::{Navigation, NavigationInfo, NavigationRef, NavigationRole};
pub use property::{Property, PropertyRef};

///
/// EntityTypeId
/// Arena handle of one entity type within its model.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("#{_0}")]
pub struct EntityTypeId(usize);

impl EntityTypeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

///
/// Model
/// Registry of entity types, keyed by id and by name.
///

#[derive(Clone, Debug, Default)]
pub struct Model {
    pub(crate) entity_types: BTreeMap<EntityTypeId, EntityType>,
    names: BTreeMap<String, EntityTypeId>,
    next_id: usize,
    default_schema: Option<String>,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: &ModelConfig) -> Self {
        Self {
            default_schema: config.default_schema.clone(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    /// Register an entity type backed by a structural type; its name is the
    /// structural type's name.
    pub fn add_entity_type(&mut self, ty: StructuralType) -> Result<EntityTypeId, ModelError> {
        let name = ty.name().to_string();

        self.register(name, Some(ty))
    }

    /// Register a shadow entity type identified only by name.
    pub fn add_shadow_entity_type(&mut self, name: &str) -> Result<EntityTypeId, ModelError> {
        self.register(name.to_string(), None)
    }

    fn register(
        &mut self,
        name: String,
        structural: Option<StructuralType>,
    ) -> Result<EntityTypeId, ModelError> {
        if self.names.contains_key(&name) {
            return Err(ModelError::DuplicateEntityType(name));
        }

        let id = EntityTypeId(self.next_id);
        self.next_id += 1;

        debug!(entity = %name, %id, shadow = structural.is_none(), "registering entity type");

        self.names.insert(name.clone(), id);
        self.entity_types
            .insert(id, EntityType::new(id, name, structural));

        Ok(id)
    }

    #[must_use]
    pub fn find_entity_type(&self, name: &str) -> Option<EntityTypeRef<'_>> {
        self.names
            .get(name)
            .map(|id| EntityTypeRef::new(self, *id))
    }

    pub fn get_entity_type(&self, name: &str) -> Result<EntityTypeRef<'_>, ModelError> {
        self.find_entity_type(name)
            .ok_or_else(|| ModelError::EntityTypeNotFound(name.to_string()))
    }

    pub fn entity_type(&self, id: EntityTypeId) -> Result<EntityTypeRef<'_>, ModelError> {
        if self.entity_types.contains_key(&id) {
            Ok(EntityTypeRef::new(self, id))
        } else {
            Err(ModelError::UnknownEntityType(id))
        }
    }

    pub fn entity_type_mut(&mut self, id: EntityTypeId) -> Result<EntityTypeMut<'_>, ModelError> {
        if self.entity_types.contains_key(&id) {
            Ok(EntityTypeMut::new(self, id))
        } else {
            Err(ModelError::UnknownEntityType(id))
        }
    }

    /// Every registered entity type, in registration order.
    pub fn entity_types(&self) -> impl Iterator<Item = EntityTypeRef<'_>> {
        self.entity_types
            .keys()
            .map(|id| EntityTypeRef::new(self, *id))
    }

    /// Remove an entity type. Refused while derived types exist or any
    /// foreign key on another entity type still points at it.
    pub fn remove_entity_type(&mut self, id: EntityTypeId) -> Result<EntityType, ModelError> {
        let entity = self.entity_type(id)?;

        if let Some(derived) = entity.derived_types().next() {
            return Err(ModelError::EntityTypeInUse {
                entity: entity.name().to_string(),
                user: format!("derived entity type '{}'", derived.name()),
            });
        }
        for other in self.entity_types().filter(|other| other.id() != id) {
            if let Some(fk) = other.declared_foreign_keys().find(|fk| {
                fk.principal_entity == id || fk.principal_key.entity == id
            }) {
                return Err(ModelError::EntityTypeInUse {
                    entity: entity.name().to_string(),
                    user: format!("foreign key {fk} on '{}'", other.name()),
                });
            }
            if let Some(navigation) = other
                .declared_navigations()
                .find(|navigation| navigation.foreign_key.entity == id)
            {
                return Err(ModelError::EntityTypeInUse {
                    entity: entity.name().to_string(),
                    user: format!("navigation '{}' on '{}'", navigation.name, other.name()),
                });
            }
        }

        let base = entity.base_type().map(|base| base.id());
        if let Some(base) = base
            && let Some(base_entity) = self.entity_types.get_mut(&base)
        {
            base_entity.derived.remove(&id);
        }

        let removed = self
            .entity_types
            .remove(&id)
            .ok_or(ModelError::UnknownEntityType(id))?;
        self.names.remove(&removed.name);

        if let Some(base) = base {
            self.recompute_slots(base);
        }
        debug!(entity = %removed.name, %id, "removed entity type");

        Ok(removed)
    }

    #[must_use]
    pub fn key(&self, key: &KeyRef) -> Option<&Key> {
        self.entity_types
            .get(&key.entity)?
            .keys
            .get(&key.properties)
    }

    #[must_use]
    pub fn foreign_key(&self, foreign_key: &ForeignKeyRef) -> Option<&ForeignKey> {
        self.entity_types
            .get(&foreign_key.entity)?
            .foreign_keys
            .get(&foreign_key.properties)
    }

    /// Resolve a navigation together with the foreign key it traverses.
    pub fn navigation(&self, navigation: &NavigationRef) -> Result<NavigationInfo<'_>, ModelError> {
        let entity = self
            .entity_types
            .get(&navigation.entity)
            .ok_or(ModelError::UnknownEntityType(navigation.entity))?;
        let nav = entity.navigations.get(&navigation.name).ok_or_else(|| {
            ModelError::NavigationNotFound {
                navigation: navigation.name.clone(),
                entity: entity.name.clone(),
            }
        })?;
        let foreign_key =
            self.foreign_key(&nav.foreign_key)
                .ok_or_else(|| ModelError::ForeignKeyNotFound {
                    foreign_key: nav.foreign_key.to_string(),
                    entity: entity.name.clone(),
                })?;

        Ok(NavigationInfo {
            navigation: nav,
            foreign_key,
        })
    }

    /// Foreign keys anywhere in the model whose principal key is `key`.
    pub fn referencing_foreign_keys<'a>(
        &'a self,
        key: &'a KeyRef,
    ) -> impl Iterator<Item = &'a ForeignKey> + 'a {
        self.entity_types
            .values()
            .flat_map(|entity| entity.foreign_keys.values())
            .filter(move |fk| fk.principal_key == *key)
    }

    // Describe the first key, foreign key or index that uses a property.
    pub(crate) fn property_user(&self, property: &PropertyRef) -> Option<String> {
        for entity in self.entity_types() {
            let resolves = |name: &String| {
                entity
                    .find_property(name)
                    .is_some_and(|found| found.is(property))
            };

            if let Some(key) = entity.declared_keys().find(|key| key.properties.iter().any(resolves)) {
                return Some(format!("key {key} on '{}'", entity.name()));
            }
            if let Some(fk) = entity
                .declared_foreign_keys()
                .find(|fk| fk.properties.iter().any(resolves))
            {
                return Some(format!("foreign key {fk} on '{}'", entity.name()));
            }
            if let Some(index) = entity
                .declared_indexes()
                .find(|index| index.properties.iter().any(resolves))
            {
                return Some(format!(
                    "index {} on '{}'",
                    describe_properties(&index.properties),
                    entity.name()
                ));
            }
        }

        None
    }
}

// Render a property list as `{'A', 'B'}` for diagnostics.
pub(crate) fn describe_properties<S: AsRef<str>>(names: &[S]) -> String {
    let quoted = names
        .iter()
        .map(|name| format!("'{}'", name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{{{quoted}}}")
}

// Exact, ordered comparison of a stored property list with a requested one.
pub(crate) fn same_property_list(stored: &[String], wanted: &[&str]) -> bool {
    stored.len() == wanted.len() && stored.iter().zip(wanted).all(|(a, b)| a == b)
}

pub(crate) fn owned_names(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}
