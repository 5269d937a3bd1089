mod foreign_keys;
mod inheritance;

use crate::{
    error::ErrorClass,
    model::{EntityTypeId, EntityTypeRef, Model, ModelError, Property},
    test_support::{init_tracing, int64, text},
    types::{StructuralType, ValueType},
};

fn names<'m>(entity: EntityTypeRef<'m>) -> Vec<&'m str> {
    entity.properties().map(Property::name).collect()
}

fn indexes(entity: EntityTypeRef<'_>) -> Vec<usize> {
    entity.properties().map(Property::index).collect()
}

/// Register an entity type whose backing type has exactly `scalars`, and
/// add a property for each.
fn entity_with(model: &mut Model, name: &str, scalars: &[(&str, ValueType)]) -> EntityTypeId {
    let ty = scalars
        .iter()
        .fold(StructuralType::new(name), |ty, (member, kind)| {
            ty.with_scalar(*member, *kind)
        });
    let id = model.add_entity_type(ty).expect("entity type should register");

    let mut entity = model.entity_type_mut(id).expect("entity type should exist");
    for (member, kind) in scalars {
        entity
            .add_property(member, *kind)
            .expect("property should add");
    }

    id
}

fn product() -> (Model, EntityTypeId) {
    init_tracing();

    let mut model = Model::new();
    let product = entity_with(
        &mut model,
        "Product",
        &[("Id", int64()), ("Code", text()), ("Name", text())],
    );

    (model, product)
}

fn assert_class(err: &ModelError, class: ErrorClass) {
    assert_eq!(err.class(), class, "unexpected class for {err}");
}
