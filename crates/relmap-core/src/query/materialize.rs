use crate::{
    model::{EntityTypeId, EntityTypeRef, Property, PropertyRef},
    query::{IncludeError, RelatedValuesError, select::SelectExpression},
    value::{Value, ValueBuffer},
};
use std::collections::BTreeMap;

/// Column-resolution callback handed to a [`MaterializerFactory`]: projects
/// the column for a property and returns its slot in the entity's value buffer.
pub type ProjectColumn<'a> =
    dyn FnMut(&Property, &mut SelectExpression) -> Result<usize, IncludeError> + 'a;

///
/// MaterializerFactory
///
/// Produces the row-to-entity reader for one entity type. The planner only
/// passes the result through to the strategies it emits.
///

pub trait MaterializerFactory {
    fn create_materializer(
        &self,
        entity: EntityTypeRef<'_>,
        select: &mut SelectExpression,
        project: &mut ProjectColumn<'_>,
    ) -> Result<Materializer, IncludeError>;
}

///
/// EntityMaterializerFactory
/// Projects every property of the entity type, base-type properties first.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct EntityMaterializerFactory;

impl MaterializerFactory for EntityMaterializerFactory {
    fn create_materializer(
        &self,
        entity: EntityTypeRef<'_>,
        select: &mut SelectExpression,
        project: &mut ProjectColumn<'_>,
    ) -> Result<Materializer, IncludeError> {
        let mut columns = Vec::new();
        for property in entity.properties() {
            let slot = project(property, select)?;
            columns.push(MaterializedColumn {
                property: property.reference(),
                name: property.name().to_string(),
                slot,
            });
        }

        let mut materializer = Materializer {
            entity: entity.id(),
            columns,
            key_slots: Vec::new(),
        };
        if let Some(key) = entity.primary_key() {
            materializer.key_slots = key
                .properties
                .iter()
                .filter_map(|name| entity.find_property(name))
                .filter_map(|property| materializer.slot_of(&property.reference()))
                .collect();
        }

        Ok(materializer)
    }
}

///
/// MaterializedColumn
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MaterializedColumn {
    pub property: PropertyRef,
    pub name: String,
    pub slot: usize,
}

///
/// Materializer
/// Maps value-buffer slots back to the properties of one entity type.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Materializer {
    entity: EntityTypeId,
    columns: Vec<MaterializedColumn>,
    key_slots: Vec<usize>,
}

impl Materializer {
    #[must_use]
    pub const fn entity_type(&self) -> EntityTypeId {
        self.entity
    }

    #[must_use]
    pub fn columns(&self) -> &[MaterializedColumn] {
        &self.columns
    }

    /// Slots of the primary-key properties, in key order.
    #[must_use]
    pub fn key_slots(&self) -> &[usize] {
        &self.key_slots
    }

    /// Number of buffer slots this materializer reads.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns
            .iter()
            .map(|column| column.slot + 1)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn slot_of(&self, property: &PropertyRef) -> Option<usize> {
        self.columns
            .iter()
            .find(|column| column.property == *property)
            .map(|column| column.slot)
    }

    pub fn materialize(&self, buffer: &ValueBuffer) -> Result<EntityValues, RelatedValuesError> {
        let values = self
            .columns
            .iter()
            .map(|column| {
                buffer
                    .get(column.slot)
                    .cloned()
                    .map(|value| (column.name.clone(), value))
                    .ok_or(RelatedValuesError::ShortRow {
                        offset: column.slot,
                        width: 1,
                        len: buffer.len(),
                    })
            })
            .collect::<Result<_, _>>()?;

        Ok(EntityValues {
            entity: self.entity,
            values,
        })
    }
}

///
/// EntityValues
/// One materialized entity, keyed by property name.
///

#[derive(Clone, Debug, PartialEq)]
pub struct EntityValues {
    pub entity: EntityTypeId,
    pub values: BTreeMap<String, Value>,
}

impl EntityValues {
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.values.get(property)
    }
}

///
/// ValueBufferFactory
/// Slices the part of a row that belongs to one include step.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValueBufferFactory {
    pub offset: usize,
    pub width: usize,
}

impl ValueBufferFactory {
    #[must_use]
    pub const fn new(offset: usize, width: usize) -> Self {
        Self { offset, width }
    }

    pub fn create(&self, row: &[Value]) -> Result<ValueBuffer, RelatedValuesError> {
        row.get(self.offset..self.offset + self.width)
            .map(|values| values.iter().cloned().collect())
            .ok_or(RelatedValuesError::ShortRow {
                offset: self.offset,
                width: self.width,
                len: row.len(),
            })
    }
}
