use crate::{
    model::{EntityTypeId, EntityTypeMut, ModelError},
    types::StructuralType,
};
use tracing::{debug, trace};

impl EntityTypeMut<'_> {
    /// Re-parent this type under `base`, or detach it with `None`.
    ///
    /// A type gaining a base must not declare keys, must not already be a
    /// base of `base`, and no property or navigation in its subtree may
    /// share a name with one declared along the new base chain.
    pub fn set_base_type(&mut self, base: Option<EntityTypeId>) -> Result<(), ModelError> {
        let entity = self.read();
        let previous = entity.base_type_id();
        if previous == base {
            return Ok(());
        }

        if let Some(base) = base {
            let model = entity.model();
            let base = model.entity_type(base)?;

            if entity.is_same_or_base_of(base.id()) {
                return Err(ModelError::CircularInheritance {
                    entity: entity.name().to_string(),
                    base: base.name().to_string(),
                });
            }
            if entity.declared_keys().next().is_some() {
                return Err(ModelError::DerivedEntityTypeKey {
                    entity: entity.name().to_string(),
                    base: base.name().to_string(),
                });
            }

            let mut subtree = vec![entity];
            subtree.extend(entity.descendants());
            let chain = base.base_chain();

            for member in &subtree {
                for property in member.declared_properties() {
                    if let Some(owner) = chain
                        .iter()
                        .find(|ty| ty.find_declared_property(&property.name).is_some())
                    {
                        return Err(ModelError::DuplicateProperty {
                            property: property.name.clone(),
                            entity: member.name().to_string(),
                            declared_on: owner.name().to_string(),
                        });
                    }
                }
                for navigation in member.declared_navigations() {
                    if let Some(owner) = chain
                        .iter()
                        .find(|ty| ty.find_declared_navigation(&navigation.name).is_some())
                    {
                        return Err(ModelError::DuplicateNavigation {
                            navigation: navigation.name.clone(),
                            entity: member.name().to_string(),
                            declared_on: owner.name().to_string(),
                        });
                    }
                }
            }
        }

        if let Some(previous) = previous
            && let Some(previous) = self.model.entity_types.get_mut(&previous)
        {
            previous.derived.remove(&self.id);
        }
        if let Some(base) = base
            && let Some(base) = self.model.entity_types.get_mut(&base)
        {
            base.derived.insert(self.id);
        }
        self.entity_mut()?.base = base;
        self.model.recompute_slots(self.id);
        if let Some(previous) = previous {
            self.model.recompute_slots(previous);
        }

        debug!(entity = %self.name(), ?previous, ?base, "changed base type");

        Ok(())
    }

    /// Eager snapshots keep an original value for every property. They can
    /// only be turned off when the backing type raises change notifications.
    pub fn set_use_eager_snapshots(&mut self, eager: bool) -> Result<(), ModelError> {
        let notifies = self
            .read()
            .structural_type()
            .is_some_and(StructuralType::notifies_changes);
        if !eager && !notifies {
            return Err(ModelError::EagerSnapshotsRequired {
                entity: self.name(),
            });
        }

        self.entity_mut()?.use_eager_snapshots = eager;
        self.model.recompute_slots(self.id);

        trace!(entity = %self.name(), eager, "set eager snapshots");

        Ok(())
    }

    /// Map the hierarchy to a table. Only meaningful on the root; derived
    /// types always resolve to their root's table.
    pub fn set_table(&mut self, name: Option<&str>, schema: Option<&str>) -> Result<(), ModelError> {
        let entity = self.entity_mut()?;
        entity.table_name = name.map(ToString::to_string);
        entity.schema = schema.map(ToString::to_string);

        Ok(())
    }
}
