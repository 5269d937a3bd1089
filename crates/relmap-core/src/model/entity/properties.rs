use crate::{
    model::{EntityTypeMut, ModelError, Property, PropertyRef},
    types::{MemberType, ValueType},
};
use tracing::trace;

impl EntityTypeMut<'_> {
    /// Add a property backed by a scalar member of the same type on the
    /// entity's structural type.
    pub fn add_property(&mut self, name: &str, ty: ValueType) -> Result<PropertyRef, ModelError> {
        let entity = self.read();
        let Some(structural) = entity.structural_type() else {
            return Err(ModelError::NonShadowPropertyOnShadowEntity {
                property: name.to_string(),
                entity: entity.name().to_string(),
            });
        };
        if structural.member(name) != Some(&MemberType::Scalar(ty)) {
            return Err(ModelError::MissingPropertyMember {
                property: name.to_string(),
                ty,
                type_name: structural.name().to_string(),
            });
        }

        self.insert_property(name, ty, false)
    }

    /// Add a storage-only property with no backing member.
    pub fn add_shadow_property(
        &mut self,
        name: &str,
        ty: ValueType,
    ) -> Result<PropertyRef, ModelError> {
        self.insert_property(name, ty, true)
    }

    /// Find the property anywhere in the base chain, or add it. A new property
    /// is backed by a member when the structural type has a scalar of that
    /// name, and is a shadow property otherwise.
    pub fn get_or_add_property(
        &mut self,
        name: &str,
        ty: ValueType,
    ) -> Result<PropertyRef, ModelError> {
        let entity = self.read();
        if let Some(property) = entity.find_property(name) {
            return Ok(property.reference());
        }

        let backed = entity
            .structural_type()
            .is_some_and(|structural| matches!(structural.member(name), Some(MemberType::Scalar(_))));
        if backed {
            self.add_property(name, ty)
        } else {
            self.add_shadow_property(name, ty)
        }
    }

    fn insert_property(
        &mut self,
        name: &str,
        ty: ValueType,
        shadow: bool,
    ) -> Result<PropertyRef, ModelError> {
        if let Some(owner) = self.read().property_owner_in_hierarchy(name) {
            return Err(ModelError::DuplicateProperty {
                property: name.to_string(),
                entity: self.name(),
                declared_on: owner.name().to_string(),
            });
        }

        let property = Property::new(name, ty, shadow, self.id);
        let reference = property.reference();
        self.entity_mut()?
            .properties
            .insert(name.to_string(), property);
        self.model.recompute_slots(self.id);

        trace!(property = %reference, %ty, shadow, "added property");

        Ok(reference)
    }

    /// Remove a property declared on this type. Refused while any key,
    /// foreign key or index in the model uses it.
    pub fn remove_property(&mut self, name: &str) -> Result<Property, ModelError> {
        let reference = self
            .read()
            .find_declared_property(name)
            .map(Property::reference)
            .ok_or_else(|| ModelError::PropertyNotFound {
                property: name.to_string(),
                entity: self.name(),
            })?;

        if let Some(user) = self.model.property_user(&reference) {
            return Err(ModelError::PropertyInUse {
                property: name.to_string(),
                entity: self.name(),
                user,
            });
        }

        // primary-key members are always in use, so only the plain map can hold it
        let entity = self.name();
        let removed = self
            .entity_mut()?
            .properties
            .remove(name)
            .ok_or_else(|| ModelError::PropertyNotFound {
                property: name.to_string(),
                entity,
            })?;
        self.model.recompute_slots(self.id);

        trace!(property = %reference, "removed property");

        Ok(removed)
    }

    pub fn set_concurrency_token(&mut self, name: &str, token: bool) -> Result<(), ModelError> {
        self.declared_property_mut(name)?.concurrency_token = token;
        self.model.recompute_slots(self.id);

        Ok(())
    }

    /// Override the column a property maps to; `None` reverts to the property name.
    pub fn set_column_name(&mut self, name: &str, column: Option<&str>) -> Result<(), ModelError> {
        self.declared_property_mut(name)?.column_name = column.map(ToString::to_string);

        Ok(())
    }

    fn declared_property_mut(&mut self, name: &str) -> Result<&mut Property, ModelError> {
        let entity = self.name();

        self.entity_mut()?
            .declared_property_mut(name)
            .ok_or_else(|| ModelError::PropertyNotFound {
                property: name.to_string(),
                entity,
            })
    }
}
