use crate::model::{EntityTypeMut, Index, ModelError, describe_properties, owned_names};
use tracing::trace;

impl EntityTypeMut<'_> {
    /// One index per ordered property list across the whole hierarchy.
    pub fn add_index(&mut self, names: &[&str], unique: bool) -> Result<Index, ModelError> {
        let entity = self.read();
        entity.resolve_properties(names)?;

        if let Some(existing) = entity.find_index(names).or_else(|| {
            entity
                .descendants()
                .into_iter()
                .find_map(|derived| derived.find_index(names))
        }) {
            return Err(ModelError::DuplicateIndex {
                index: describe_properties(&existing.properties),
                entity: entity.name().to_string(),
            });
        }

        let index = Index {
            entity: self.id,
            properties: owned_names(names),
            unique,
        };
        self.entity_mut()?
            .indexes
            .insert(index.properties.clone(), index.clone());

        trace!(entity = %self.name(), %index, "added index");

        Ok(index)
    }

    /// Existing index over `names`, or a new non-unique one.
    pub fn get_or_add_index(&mut self, names: &[&str]) -> Result<Index, ModelError> {
        match self.read().find_index(names) {
            Some(index) => Ok(index.clone()),
            None => self.add_index(names, false),
        }
    }

    pub fn remove_index(&mut self, names: &[&str]) -> Result<Index, ModelError> {
        let entity = self.name();

        let removed = self
            .entity_mut()?
            .indexes
            .remove(&owned_names(names))
            .ok_or_else(|| ModelError::IndexNotFound {
                index: describe_properties(names),
                entity,
            })?;

        trace!(entity = %self.name(), index = %removed, "removed index");

        Ok(removed)
    }

    pub fn set_index_unique(&mut self, names: &[&str], unique: bool) -> Result<(), ModelError> {
        let entity = self.name();

        self.entity_mut()?
            .indexes
            .get_mut(&owned_names(names))
            .ok_or_else(|| ModelError::IndexNotFound {
                index: describe_properties(names),
                entity,
            })?
            .unique = unique;

        Ok(())
    }
}
