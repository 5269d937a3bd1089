use crate::model::{
    EntityTypeId, EntityTypeMut, ForeignKey, ForeignKeyRef, KeyRef, ModelError,
    describe_properties, owned_names,
};
use tracing::trace;

impl EntityTypeMut<'_> {
    /// Add a foreign key over `names` referencing `principal_key`.
    ///
    /// `principal_entity` defaults to the key's owner and may name any type
    /// derived from it. The new key is required when every dependent property
    /// is non-nullable.
    pub fn add_foreign_key(
        &mut self,
        names: &[&str],
        principal_key: &KeyRef,
        principal_entity: Option<EntityTypeId>,
    ) -> Result<ForeignKeyRef, ModelError> {
        let entity = self.read();
        let properties = entity.resolve_properties(names)?;

        if entity.find_foreign_key(names).is_some() {
            return Err(ModelError::DuplicateForeignKey {
                foreign_key: describe_properties(names),
                entity: entity.name().to_string(),
            });
        }

        let model = entity.model();
        let key_owner = model.entity_type(principal_key.entity)?;
        if model.key(principal_key).is_none() {
            return Err(ModelError::KeyNotFound {
                key: principal_key.to_string(),
                entity: key_owner.name().to_string(),
            });
        }

        let principal_entity = principal_entity.unwrap_or(principal_key.entity);
        if !key_owner.is_same_or_base_of(principal_entity) {
            return Err(ModelError::PrincipalEntityTypeMismatch {
                principal: model.entity_type(principal_entity)?.name().to_string(),
                key_owner: key_owner.name().to_string(),
            });
        }

        if properties.len() != principal_key.properties.len() {
            return Err(ModelError::ForeignKeyArityMismatch {
                foreign_key: describe_properties(names),
                principal_key: principal_key.to_string(),
                expected: principal_key.properties.len(),
                found: properties.len(),
            });
        }

        for (property, principal_name) in properties.iter().zip(&principal_key.properties) {
            let principal = key_owner.get_property(principal_name)?;
            if !property.ty.is_compatible_with(principal.ty) {
                return Err(ModelError::ForeignKeyTypeMismatch {
                    property: property.name.clone(),
                    property_type: property.ty,
                    principal_property: principal.name.clone(),
                    principal_type: principal.ty,
                });
            }
        }

        let required = properties.iter().all(|property| !property.is_nullable());
        let foreign_key = ForeignKey {
            dependent: self.id,
            properties: owned_names(names),
            principal_key: principal_key.clone(),
            principal_entity,
            unique: false,
            required,
            dependent_to_principal: None,
            principal_to_dependent: None,
        };
        let reference = foreign_key.reference();

        self.entity_mut()?
            .foreign_keys
            .insert(reference.properties.clone(), foreign_key);
        self.model.recompute_slots(self.id);

        trace!(entity = %self.name(), foreign_key = %reference, principal_key = %principal_key, "added foreign key");

        Ok(reference)
    }

    /// Return the foreign key already declared over `names`, or add one.
    ///
    /// An existing key is returned even when it references a different
    /// principal key than the one supplied; lookup is by property list alone.
    pub fn get_or_add_foreign_key(
        &mut self,
        names: &[&str],
        principal_key: &KeyRef,
        principal_entity: Option<EntityTypeId>,
    ) -> Result<ForeignKeyRef, ModelError> {
        match self.read().find_foreign_key(names) {
            Some(fk) => Ok(fk.reference()),
            None => self.add_foreign_key(names, principal_key, principal_entity),
        }
    }

    /// Remove a foreign key declared on this type. Refused while a navigation
    /// still traverses it in either direction.
    pub fn remove_foreign_key(&mut self, names: &[&str]) -> Result<ForeignKey, ModelError> {
        let fk = self.declared_foreign_key(names)?;
        let navigation = fk
            .dependent_to_principal()
            .or_else(|| fk.principal_to_dependent())
            .map(ToString::to_string);

        if let Some(navigation) = navigation {
            return Err(ModelError::ForeignKeyInUse {
                foreign_key: describe_properties(names),
                entity: self.name(),
                navigation,
            });
        }

        let entity = self.name();
        let removed = self
            .entity_mut()?
            .foreign_keys
            .remove(&owned_names(names))
            .ok_or_else(|| ModelError::ForeignKeyNotFound {
                foreign_key: describe_properties(names),
                entity,
            })?;
        self.model.recompute_slots(self.id);

        trace!(entity = %self.name(), foreign_key = %removed, "removed foreign key");

        Ok(removed)
    }

    pub fn set_foreign_key_unique(&mut self, names: &[&str], unique: bool) -> Result<(), ModelError> {
        self.declared_foreign_key_mut(names)?.unique = unique;

        Ok(())
    }

    pub fn set_foreign_key_required(
        &mut self,
        names: &[&str],
        required: bool,
    ) -> Result<(), ModelError> {
        self.declared_foreign_key_mut(names)?.required = required;

        Ok(())
    }

    fn declared_foreign_key(&self, names: &[&str]) -> Result<&ForeignKey, ModelError> {
        self.model
            .entity_types
            .get(&self.id)
            .and_then(|entity| entity.find_declared_foreign_key(names))
            .ok_or_else(|| ModelError::ForeignKeyNotFound {
                foreign_key: describe_properties(names),
                entity: self.name(),
            })
    }

    fn declared_foreign_key_mut(&mut self, names: &[&str]) -> Result<&mut ForeignKey, ModelError> {
        let entity = self.name();

        self.entity_mut()?
            .foreign_keys
            .get_mut(&owned_names(names))
            .ok_or_else(|| ModelError::ForeignKeyNotFound {
                foreign_key: describe_properties(names),
                entity,
            })
    }
}
