use crate::{
    model::{
        EntityTypeMut, EntityTypeRef, ForeignKeyRef, ModelError, Navigation, NavigationRef,
        NavigationRole, NavigationRule,
    },
    types::MemberType,
};
use tracing::trace;

impl EntityTypeMut<'_> {
    /// Add a navigation named `name` that traverses `foreign_key` in the
    /// direction given by `role`.
    ///
    /// The backing type must expose a member of that name: a reference to
    /// the target for single-valued navigations, a collection of it for the
    /// principal side of a non-unique key.
    pub fn add_navigation(
        &mut self,
        name: &str,
        foreign_key: &ForeignKeyRef,
        role: NavigationRole,
    ) -> Result<NavigationRef, ModelError> {
        let entity = self.read();
        let model = entity.model();
        let fk = model
            .foreign_key(foreign_key)
            .ok_or_else(|| ModelError::ForeignKeyNotFound {
                foreign_key: foreign_key.to_string(),
                entity: entity.name().to_string(),
            })?;

        // the navigation must start on the side of the key it traverses
        let source = match role {
            NavigationRole::DependentToPrincipal => fk.dependent,
            NavigationRole::PrincipalToDependent => fk.principal_entity,
        };
        if !model.entity_type(source)?.is_same_or_base_of(self.id) {
            return Err(ModelError::ForeignKeyWrongEntityType {
                foreign_key: foreign_key.to_string(),
                entity: entity.name().to_string(),
            });
        }

        if let Some(owner) = entity.navigation_owner_in_hierarchy(name) {
            return Err(ModelError::DuplicateNavigation {
                navigation: name.to_string(),
                entity: entity.name().to_string(),
                declared_on: owner.name().to_string(),
            });
        }

        let invalid = |rule| ModelError::InvalidNavigation {
            navigation: name.to_string(),
            entity: entity.name().to_string(),
            rule,
        };

        if entity.property_owner_in_hierarchy(name).is_some() {
            return Err(invalid(NavigationRule::PropertyNameCollision));
        }

        let Some(structural) = entity.structural_type() else {
            return Err(invalid(NavigationRule::ShadowEntity));
        };
        let Some(member) = structural.member(name) else {
            return Err(invalid(NavigationRule::MissingMember));
        };

        let target = match role {
            NavigationRole::DependentToPrincipal => fk.principal_entity,
            NavigationRole::PrincipalToDependent => fk.dependent,
        };
        let target = model.entity_type(target)?;
        if target.is_shadow() {
            return Err(invalid(NavigationRule::ShadowTarget));
        }

        let collection = !role.points_to_principal() && !fk.unique;
        let member_target = match (member, collection) {
            (MemberType::Reference(ty), false) | (MemberType::Collection(ty), true) => Some(ty),
            _ => None,
        };
        if !member_target.is_some_and(|ty| is_assignable_from(ty, target)) {
            return Err(invalid(NavigationRule::TypeMismatch));
        }

        if fk.navigation(role).is_some() {
            return Err(invalid(NavigationRule::DirectionCollision));
        }

        let navigation = Navigation {
            name: name.to_string(),
            declaring: self.id,
            foreign_key: foreign_key.clone(),
            role,
        };
        let reference = navigation.reference();

        let slot = self
            .model
            .entity_types
            .get_mut(&foreign_key.entity)
            .and_then(|dependent| dependent.foreign_keys.get_mut(&foreign_key.properties))
            .ok_or_else(|| ModelError::ForeignKeyNotFound {
                foreign_key: foreign_key.to_string(),
                entity: foreign_key.entity.to_string(),
            })?
            .navigation_slot_mut(role);
        *slot = Some(name.to_string());

        self.entity_mut()?
            .navigations
            .insert(name.to_string(), navigation);

        trace!(entity = %self.name(), navigation = name, %role, "added navigation");

        Ok(reference)
    }

    /// Remove a navigation declared on this type, clearing the matching
    /// navigation slot on its foreign key.
    pub fn remove_navigation(&mut self, name: &str) -> Result<Navigation, ModelError> {
        let entity = self.name();
        let navigation = self
            .entity_mut()?
            .navigations
            .remove(name)
            .ok_or_else(|| ModelError::NavigationNotFound {
                navigation: name.to_string(),
                entity,
            })?;

        if let Some(fk) = self
            .model
            .entity_types
            .get_mut(&navigation.foreign_key.entity)
            .and_then(|dependent| dependent.foreign_keys.get_mut(&navigation.foreign_key.properties))
        {
            let slot = fk.navigation_slot_mut(navigation.role);
            if slot.as_deref() == Some(name) {
                *slot = None;
            }
        }

        trace!(entity = %self.name(), navigation = name, "removed navigation");

        Ok(navigation)
    }
}

// A member typed `ty` accepts the target or anything derived from a type named `ty`.
fn is_assignable_from(ty: &str, target: EntityTypeRef<'_>) -> bool {
    target.base_chain().iter().any(|entity| {
        entity
            .structural_type()
            .is_some_and(|structural| structural.name() == ty)
    })
}
