use crate::model::{EntityTypeId, Model, PropertyRef};
use std::collections::BTreeSet;
use tracing::trace;

///
/// SlotCounters
/// Running totals handed from a base type to its derived types.
///

#[derive(Clone, Copy, Debug, Default)]
struct SlotCounters {
    properties: usize,
    shadow: usize,
    original_values: usize,
}

impl Model {
    /// Reassign property, shadow and original-value slots for the whole
    /// hierarchy containing `id`, walking from the root down to every
    /// derived type. Each type starts numbering where its base stopped.
    pub(crate) fn recompute_slots(&mut self, id: EntityTypeId) {
        let Ok(entity) = self.entity_type(id) else {
            return;
        };
        let root = entity.root_type();

        // foreign-key members anywhere in the hierarchy need a snapshot slot
        let mut subtree = vec![root];
        subtree.extend(root.descendants());
        let foreign_key_members: BTreeSet<PropertyRef> = subtree
            .iter()
            .flat_map(|entity| {
                entity
                    .declared_foreign_keys()
                    .flat_map(|fk| fk.properties.iter())
                    .filter_map(|name| entity.find_property(name).map(|p| p.reference()))
                    .collect::<Vec<_>>()
            })
            .collect();
        let root = root.id();

        let mut pending = vec![(root, SlotCounters::default())];
        while let Some((id, mut counters)) = pending.pop() {
            let Some(entity) = self.entity_types.get_mut(&id) else {
                continue;
            };
            let eager = entity.use_eager_snapshots;

            for property in entity
                .key_properties
                .iter_mut()
                .chain(entity.properties.values_mut())
            {
                property.index = counters.properties;
                counters.properties += 1;

                property.shadow_index = if property.shadow {
                    counters.shadow += 1;
                    Some(counters.shadow - 1)
                } else {
                    None
                };

                let snapshot = eager
                    || property.concurrency_token
                    || foreign_key_members.contains(&property.reference());
                property.original_value_index = if snapshot {
                    counters.original_values += 1;
                    Some(counters.original_values - 1)
                } else {
                    None
                };
            }

            entity.property_count = counters.properties;
            entity.shadow_property_count = counters.shadow;
            entity.original_value_count = counters.original_values;

            trace!(
                entity = %entity.name,
                properties = counters.properties,
                shadow = counters.shadow,
                original_values = counters.original_values,
                "recomputed slots"
            );

            // reversed so derived types are visited in id order
            pending.extend(entity.derived.iter().rev().map(|derived| (*derived, counters)));
        }
    }
}
