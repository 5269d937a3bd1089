mod foreign_keys;
mod indexes;
mod inheritance;
mod keys;
mod navigations;
mod properties;
mod slots;

use crate::{
    model::{
        EntityTypeId, ForeignKey, ForeignKeyQuery, Index, Key, Model, ModelError, Navigation,
        NavigationInfo, Property, describe_properties, owned_names,
    },
    types::StructuralType,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    ops::Deref,
};

///
/// EntityType
///
/// Aggregate root of the metadata graph. Owns its declared properties, keys,
/// foreign keys, navigations and indexes. Inherited members are reached
/// through [`EntityTypeRef`], which walks the base chain via the model.
///
/// While a primary key is set its properties live in `key_properties` (key
/// order) rather than in the name-ordered `properties` map, so plain and key
/// property enumeration never overlap.
///

#[derive(Clone, Debug)]
pub struct EntityType {
    pub(crate) id: EntityTypeId,
    pub(crate) name: String,
    pub(crate) structural: Option<StructuralType>,
    pub(crate) base: Option<EntityTypeId>,
    pub(crate) derived: BTreeSet<EntityTypeId>,
    pub(crate) key_properties: Vec<Property>,
    pub(crate) properties: BTreeMap<String, Property>,
    pub(crate) primary_key: Option<Vec<String>>,
    pub(crate) keys: BTreeMap<Vec<String>, Key>,
    pub(crate) foreign_keys: BTreeMap<Vec<String>, ForeignKey>,
    pub(crate) navigations: BTreeMap<String, Navigation>,
    pub(crate) indexes: BTreeMap<Vec<String>, Index>,
    pub(crate) use_eager_snapshots: bool,
    pub(crate) table_name: Option<String>,
    pub(crate) schema: Option<String>,
    pub(crate) property_count: usize,
    pub(crate) shadow_property_count: usize,
    pub(crate) original_value_count: usize,
}

impl EntityType {
    pub(crate) fn new(id: EntityTypeId, name: String, structural: Option<StructuralType>) -> Self {
        // types that cannot notify changes must be snapshotted eagerly
        let use_eager_snapshots = structural
            .as_ref()
            .is_none_or(|ty| !ty.notifies_changes());

        Self {
            id,
            name,
            structural,
            base: None,
            derived: BTreeSet::new(),
            key_properties: Vec::new(),
            properties: BTreeMap::new(),
            primary_key: None,
            keys: BTreeMap::new(),
            foreign_keys: BTreeMap::new(),
            navigations: BTreeMap::new(),
            indexes: BTreeMap::new(),
            use_eager_snapshots,
            table_name: None,
            schema: None,
            property_count: 0,
            shadow_property_count: 0,
            original_value_count: 0,
        }
    }

    #[must_use]
    pub const fn id(&self) -> EntityTypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn structural_type(&self) -> Option<&StructuralType> {
        self.structural.as_ref()
    }

    /// Shadow entity types are identified by name only and have no backing type.
    #[must_use]
    pub const fn is_shadow(&self) -> bool {
        self.structural.is_none()
    }

    #[must_use]
    pub const fn base_type_id(&self) -> Option<EntityTypeId> {
        self.base
    }

    #[must_use]
    pub const fn uses_eager_snapshots(&self) -> bool {
        self.use_eager_snapshots
    }

    /// Slots across the whole base chain plus this type's own properties.
    #[must_use]
    pub const fn property_count(&self) -> usize {
        self.property_count
    }

    #[must_use]
    pub const fn shadow_property_count(&self) -> usize {
        self.shadow_property_count
    }

    #[must_use]
    pub const fn original_value_count(&self) -> usize {
        self.original_value_count
    }

    /// Properties declared on this type: primary-key properties in key
    /// order, then the rest by name.
    pub fn declared_properties(&self) -> impl Iterator<Item = &Property> {
        self.key_properties.iter().chain(self.properties.values())
    }

    #[must_use]
    pub fn find_declared_property(&self, name: &str) -> Option<&Property> {
        self.key_properties
            .iter()
            .find(|property| property.name == name)
            .or_else(|| self.properties.get(name))
    }

    pub(crate) fn declared_property_mut(&mut self, name: &str) -> Option<&mut Property> {
        match self
            .key_properties
            .iter_mut()
            .find(|property| property.name == name)
        {
            Some(property) => Some(property),
            None => self.properties.get_mut(name),
        }
    }

    #[must_use]
    pub fn declared_primary_key(&self) -> Option<&Key> {
        self.primary_key
            .as_ref()
            .and_then(|names| self.keys.get(names))
    }

    /// Declared keys, primary key first.
    pub fn declared_keys(&self) -> impl Iterator<Item = &Key> {
        let primary = self.declared_primary_key();

        primary.into_iter().chain(
            self.keys
                .values()
                .filter(move |key| Some(key.properties.as_slice()) != self.primary_key.as_deref()),
        )
    }

    #[must_use]
    pub fn find_declared_key(&self, names: &[&str]) -> Option<&Key> {
        self.keys.get(&owned_names(names))
    }

    pub fn declared_foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.foreign_keys.values()
    }

    #[must_use]
    pub fn find_declared_foreign_key(&self, names: &[&str]) -> Option<&ForeignKey> {
        self.foreign_keys.get(&owned_names(names))
    }

    pub fn declared_navigations(&self) -> impl Iterator<Item = &Navigation> {
        self.navigations.values()
    }

    #[must_use]
    pub fn find_declared_navigation(&self, name: &str) -> Option<&Navigation> {
        self.navigations.get(name)
    }

    pub fn declared_indexes(&self) -> impl Iterator<Item = &Index> {
        self.indexes.values()
    }

    #[must_use]
    pub fn find_declared_index(&self, names: &[&str]) -> Option<&Index> {
        self.indexes.get(&owned_names(names))
    }
}

///
/// EntityTypeRef
///
/// Read handle that resolves inherited members through the owning model.
/// Derefs to the declared-only [`EntityType`].
///

#[derive(Clone, Copy)]
pub struct EntityTypeRef<'m> {
    model: &'m Model,
    id: EntityTypeId,
}

impl<'m> EntityTypeRef<'m> {
    pub(crate) const fn new(model: &'m Model, id: EntityTypeId) -> Self {
        Self { model, id }
    }

    // Handles are only minted for registered ids and hold a shared borrow of
    // the model, so the entry cannot disappear underneath them.
    fn inner(self) -> &'m EntityType {
        &self.model.entity_types[&self.id]
    }

    #[must_use]
    pub const fn model(self) -> &'m Model {
        self.model
    }

    /// Name borrowed for the model's lifetime rather than the handle's.
    #[must_use]
    pub fn name(self) -> &'m str {
        &self.inner().name
    }

    #[must_use]
    pub fn base_type(self) -> Option<Self> {
        self.inner().base.map(|base| Self::new(self.model, base))
    }

    #[must_use]
    pub fn root_type(self) -> Self {
        let mut current = self;
        while let Some(base) = current.base_type() {
            current = base;
        }

        current
    }

    /// The inheritance chain from the root down to this type, inclusive.
    #[must_use]
    pub fn base_chain(self) -> Vec<Self> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(base) = current.base_type() {
            chain.push(base);
            current = base;
        }
        chain.reverse();

        chain
    }

    pub fn derived_types(self) -> impl Iterator<Item = Self> + 'm {
        let model = self.model;

        self.inner()
            .derived
            .iter()
            .map(move |id| Self::new(model, *id))
    }

    /// Every type below this one, breadth first.
    #[must_use]
    pub fn descendants(self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut pending: Vec<Self> = self.derived_types().collect();

        while !pending.is_empty() {
            let level = std::mem::take(&mut pending);
            for entity in level {
                pending.extend(entity.derived_types());
                out.push(entity);
            }
        }

        out
    }

    /// Whether `other` is this type or inherits from it.
    #[must_use]
    pub fn is_same_or_base_of(self, other: EntityTypeId) -> bool {
        self.model
            .entity_type(other)
            .is_ok_and(|other| other.base_chain().iter().any(|ty| ty.id == self.id))
    }

    //
    // properties
    //

    pub fn properties(self) -> impl Iterator<Item = &'m Property> {
        self.base_chain()
            .into_iter()
            .flat_map(|entity| entity.inner().declared_properties())
    }

    #[must_use]
    pub fn find_property(self, name: &str) -> Option<&'m Property> {
        self.base_chain()
            .into_iter()
            .find_map(|entity| entity.inner().find_declared_property(name))
    }

    pub fn get_property(self, name: &str) -> Result<&'m Property, ModelError> {
        self.find_property(name)
            .ok_or_else(|| ModelError::PropertyNotFound {
                property: name.to_string(),
                entity: self.inner().name.clone(),
            })
    }

    // Resolve property names against this type's chain. A name that only a
    // derived type declares belongs to the wrong entity type.
    pub(crate) fn resolve_properties(self, names: &[&str]) -> Result<Vec<&'m Property>, ModelError> {
        if names.is_empty() {
            return Err(ModelError::EmptyPropertyList {
                entity: self.inner().name.clone(),
            });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ModelError::RepeatedProperty {
                    property: (*name).to_string(),
                    entity: self.inner().name.clone(),
                });
            }
        }

        names
            .iter()
            .map(|name| {
                if let Some(property) = self.find_property(name) {
                    return Ok(property);
                }
                if let Some(owner) = self
                    .descendants()
                    .into_iter()
                    .find(|derived| derived.find_declared_property(name).is_some())
                {
                    return Err(ModelError::PropertyWrongEntityType {
                        property: format!("{}.{name}", owner.name()),
                        entity: self.inner().name.clone(),
                    });
                }

                Err(ModelError::PropertyNotFound {
                    property: (*name).to_string(),
                    entity: self.inner().name.clone(),
                })
            })
            .collect()
    }

    // Type in this hierarchy (base chain or derived subtree) already
    // declaring a property with this name.
    pub(crate) fn property_owner_in_hierarchy(self, name: &str) -> Option<Self> {
        self.base_chain()
            .into_iter()
            .chain(self.descendants())
            .find(|entity| entity.inner().find_declared_property(name).is_some())
    }

    pub(crate) fn navigation_owner_in_hierarchy(self, name: &str) -> Option<Self> {
        self.base_chain()
            .into_iter()
            .chain(self.descendants())
            .find(|entity| entity.inner().navigations.contains_key(name))
    }

    //
    // keys
    //

    /// Primary key, always declared on the inheritance root.
    #[must_use]
    pub fn primary_key(self) -> Option<&'m Key> {
        self.root_type().inner().declared_primary_key()
    }

    pub fn get_primary_key(self) -> Result<&'m Key, ModelError> {
        self.primary_key()
            .ok_or_else(|| ModelError::PrimaryKeyNotFound {
                entity: self.inner().name.clone(),
            })
    }

    pub fn keys(self) -> impl Iterator<Item = &'m Key> {
        self.root_type().inner().declared_keys()
    }

    /// Exact, ordered property-list match; the primary key is tried first.
    #[must_use]
    pub fn find_key(self, names: &[&str]) -> Option<&'m Key> {
        let root = self.root_type().inner();

        root.declared_primary_key()
            .filter(|key| crate::model::same_property_list(&key.properties, names))
            .or_else(|| root.find_declared_key(names))
    }

    pub fn get_key(self, names: &[&str]) -> Result<&'m Key, ModelError> {
        self.find_key(names).ok_or_else(|| ModelError::KeyNotFound {
            key: describe_properties(names),
            entity: self.inner().name.clone(),
        })
    }

    //
    // foreign keys
    //

    pub fn foreign_keys(self) -> impl Iterator<Item = &'m ForeignKey> {
        self.base_chain()
            .into_iter()
            .flat_map(|entity| entity.inner().declared_foreign_keys())
    }

    #[must_use]
    pub fn find_foreign_key(self, names: &[&str]) -> Option<&'m ForeignKey> {
        self.base_chain()
            .into_iter()
            .find_map(|entity| entity.inner().find_declared_foreign_key(names))
    }

    pub fn get_foreign_key(self, names: &[&str]) -> Result<&'m ForeignKey, ModelError> {
        self.find_foreign_key(names)
            .ok_or_else(|| ModelError::ForeignKeyNotFound {
                foreign_key: describe_properties(names),
                entity: self.inner().name.clone(),
            })
    }

    /// First foreign key in the chain satisfying every criterion set on `query`.
    #[must_use]
    pub fn find_foreign_key_by(self, query: &ForeignKeyQuery<'_>) -> Option<&'m ForeignKey> {
        self.foreign_keys().find(|fk| fk.matches(query))
    }

    //
    // navigations
    //

    pub fn navigations(self) -> impl Iterator<Item = &'m Navigation> {
        self.base_chain()
            .into_iter()
            .flat_map(|entity| entity.inner().declared_navigations())
    }

    #[must_use]
    pub fn find_navigation(self, name: &str) -> Option<&'m Navigation> {
        self.base_chain()
            .into_iter()
            .find_map(|entity| entity.inner().find_declared_navigation(name))
    }

    pub fn get_navigation(self, name: &str) -> Result<&'m Navigation, ModelError> {
        self.find_navigation(name)
            .ok_or_else(|| ModelError::NavigationNotFound {
                navigation: name.to_string(),
                entity: self.inner().name.clone(),
            })
    }

    /// Navigation by name, resolved together with its foreign key.
    pub fn navigation_info(self, name: &str) -> Result<NavigationInfo<'m>, ModelError> {
        let navigation = self.get_navigation(name)?;

        self.model.navigation(&navigation.reference())
    }

    //
    // indexes
    //

    pub fn indexes(self) -> impl Iterator<Item = &'m Index> {
        self.base_chain()
            .into_iter()
            .flat_map(|entity| entity.inner().declared_indexes())
    }

    #[must_use]
    pub fn find_index(self, names: &[&str]) -> Option<&'m Index> {
        self.base_chain()
            .into_iter()
            .find_map(|entity| entity.inner().find_declared_index(names))
    }

    pub fn get_index(self, names: &[&str]) -> Result<&'m Index, ModelError> {
        self.find_index(names).ok_or_else(|| ModelError::IndexNotFound {
            index: describe_properties(names),
            entity: self.inner().name.clone(),
        })
    }

    //
    // table mapping
    //

    /// Table the hierarchy maps to; defaults to the root type's name.
    #[must_use]
    pub fn table_name(self) -> &'m str {
        let root = self.root_type().inner();

        root.table_name.as_deref().unwrap_or(&root.name)
    }

    #[must_use]
    pub fn schema(self) -> Option<&'m str> {
        self.root_type()
            .inner()
            .schema
            .as_deref()
            .or_else(|| self.model.default_schema())
    }
}

impl Deref for EntityTypeRef<'_> {
    type Target = EntityType;

    fn deref(&self) -> &EntityType {
        self.inner()
    }
}

impl fmt::Debug for EntityTypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityTypeRef")
            .field("id", &self.id)
            .field("name", &self.inner().name)
            .finish()
    }
}

impl fmt::Display for EntityTypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner().name)
    }
}

///
/// EntityTypeMut
///
/// Mutation handle. Every structural change recomputes the slot indexes of
/// the affected hierarchy before the call returns.
///

pub struct EntityTypeMut<'m> {
    model: &'m mut Model,
    id: EntityTypeId,
}

impl<'m> EntityTypeMut<'m> {
    pub(crate) const fn new(model: &'m mut Model, id: EntityTypeId) -> Self {
        Self { model, id }
    }

    #[must_use]
    pub const fn id(&self) -> EntityTypeId {
        self.id
    }

    /// Read view of the entity type being mutated.
    #[must_use]
    pub fn read(&self) -> EntityTypeRef<'_> {
        EntityTypeRef::new(self.model, self.id)
    }

    fn entity_mut(&mut self) -> Result<&mut EntityType, ModelError> {
        self.model
            .entity_types
            .get_mut(&self.id)
            .ok_or(ModelError::UnknownEntityType(self.id))
    }

    fn name(&self) -> String {
        self.read().name().to_string()
    }
}
