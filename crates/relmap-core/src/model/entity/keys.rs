use crate::model::{
    EntityTypeMut, Key, KeyRef, ModelError, describe_properties, owned_names,
};
use tracing::{debug, trace};

impl EntityTypeMut<'_> {
    // Keys belong to the inheritance root only.
    fn ensure_root(&self) -> Result<(), ModelError> {
        match self.read().base_type() {
            Some(base) => Err(ModelError::DerivedEntityTypeKey {
                entity: self.name(),
                base: base.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn add_key(&mut self, names: &[&str]) -> Result<KeyRef, ModelError> {
        self.ensure_root()?;
        self.read().resolve_properties(names)?;

        if self.read().find_declared_key(names).is_some() {
            return Err(ModelError::DuplicateKey {
                key: describe_properties(names),
                entity: self.name(),
            });
        }

        let key = Key {
            entity: self.id,
            properties: owned_names(names),
        };
        let reference = key.reference();
        self.entity_mut()?
            .keys
            .insert(reference.properties.clone(), key);

        trace!(entity = %self.name(), key = %reference, "added key");

        Ok(reference)
    }

    pub fn get_or_add_key(&mut self, names: &[&str]) -> Result<KeyRef, ModelError> {
        match self.read().find_key(names) {
            Some(key) => Ok(key.reference()),
            None => self.add_key(names),
        }
    }

    /// Designate the primary key, or clear it with `None` or an empty list.
    ///
    /// The previous primary key's properties return to the plain property
    /// map before the new key's properties are taken out of it; the previous
    /// key itself stays registered as an alternate key.
    pub fn set_primary_key(&mut self, names: Option<&[&str]>) -> Result<Option<KeyRef>, ModelError> {
        self.ensure_root()?;

        let names = names.filter(|names| !names.is_empty());
        let key = match names {
            Some(names) => Some(self.get_or_add_key(names)?),
            None => None,
        };

        let entity = self.entity_mut()?;

        // demote
        for property in std::mem::take(&mut entity.key_properties) {
            entity.properties.insert(property.name.clone(), property);
        }
        entity.primary_key = None;

        // promote
        if let Some(key) = &key {
            for name in &key.properties {
                if let Some(property) = entity.properties.remove(name) {
                    entity.key_properties.push(property);
                }
            }
            entity.primary_key = Some(key.properties.clone());
        }

        self.model.recompute_slots(self.id);

        debug!(
            entity = %self.name(),
            primary_key = %key.as_ref().map_or_else(|| "none".to_string(), ToString::to_string),
            "set primary key"
        );

        Ok(key)
    }

    /// Remove a key. Refused while any foreign key in the model uses it as
    /// its principal key; a primary key is demoted first.
    pub fn remove_key(&mut self, names: &[&str]) -> Result<Key, ModelError> {
        let reference = self
            .read()
            .find_declared_key(names)
            .map(Key::reference)
            .ok_or_else(|| ModelError::KeyNotFound {
                key: describe_properties(names),
                entity: self.name(),
            })?;

        if let Some(fk) = self.model.referencing_foreign_keys(&reference).next() {
            return Err(ModelError::KeyInUse {
                key: reference.to_string(),
                entity: self.name(),
                foreign_key: fk.to_string(),
                dependent: self.model.entity_type(fk.dependent)?.name().to_string(),
            });
        }

        if self.read().primary_key.as_deref() == Some(reference.properties.as_slice()) {
            self.set_primary_key(None)?;
        }

        let entity = self.name();
        let removed = self
            .entity_mut()?
            .keys
            .remove(&reference.properties)
            .ok_or_else(|| ModelError::KeyNotFound {
                key: reference.to_string(),
                entity,
            })?;

        trace!(entity = %self.name(), key = %reference, "removed key");

        Ok(removed)
    }
}
