use super::*;
use crate::{config::ModelConfig, test_support::add_keyed_entity};

// A <- B <- C, all keyless, each backed by a type exposing `P` and `Q`.
fn chain() -> (Model, EntityTypeId, EntityTypeId, EntityTypeId) {
    init_tracing();

    let mut model = Model::new();
    let [a, b, c] = ["A", "B", "C"].map(|name| {
        model
            .add_entity_type(
                StructuralType::new(name)
                    .with_scalar("P", int64())
                    .with_scalar("Q", text()),
            )
            .expect("entity type should register")
    });

    model
        .entity_type_mut(b)
        .expect("B should exist")
        .set_base_type(Some(a))
        .expect("B should derive from A");
    model
        .entity_type_mut(c)
        .expect("C should exist")
        .set_base_type(Some(b))
        .expect("C should derive from B");

    (model, a, b, c)
}

#[test]
fn base_property_is_visible_on_every_derived_type() {
    let (mut model, a, b, c) = chain();
    model
        .entity_type_mut(a)
        .expect("A should exist")
        .add_property("P", int64())
        .expect("P should add on A");

    for id in [b, c] {
        let entity = model.entity_type(id).expect("derived should exist");
        let property = entity.get_property("P").expect("P should be inherited");
        assert_eq!(property.declaring_entity_type(), a);
        assert!(entity.find_declared_property("P").is_none());
    }
}

#[test]
fn derived_type_cannot_redeclare_base_property() {
    let (mut model, a, b, _) = chain();
    model
        .entity_type_mut(a)
        .expect("A should exist")
        .add_property("P", int64())
        .expect("P should add on A");

    let err = model
        .entity_type_mut(b)
        .expect("B should exist")
        .add_property("P", int64())
        .expect_err("redeclaring P must fail");

    assert!(matches!(
        &err,
        ModelError::DuplicateProperty { entity, declared_on, .. }
            if entity == "B" && declared_on == "A"
    ));
    assert_class(&err, ErrorClass::InvalidState);
}

#[test]
fn base_type_cannot_declare_property_already_on_derived_type() {
    let (mut model, a, _, c) = chain();
    model
        .entity_type_mut(c)
        .expect("C should exist")
        .add_shadow_property("S", int64())
        .expect("S should add on C");

    let err = model
        .entity_type_mut(a)
        .expect("A should exist")
        .add_shadow_property("S", int64())
        .expect_err("S on the root must collide with C");

    assert!(matches!(
        &err,
        ModelError::DuplicateProperty { declared_on, .. } if declared_on == "C"
    ));
}

#[test]
fn inheritance_cycles_are_rejected() {
    let (mut model, a, _, c) = chain();
    let mut root = model.entity_type_mut(a).expect("A should exist");

    let err = root.set_base_type(Some(c)).expect_err("A <- C would loop");
    assert!(matches!(
        &err,
        ModelError::CircularInheritance { entity, base } if entity == "A" && base == "C"
    ));

    let err = root.set_base_type(Some(a)).expect_err("A <- A would loop");
    assert!(matches!(err, ModelError::CircularInheritance { .. }));
}

#[test]
fn keyed_type_cannot_gain_a_base() {
    let (mut model, a, _, _) = chain();
    let (keyed, _) = add_keyed_entity(
        &mut model,
        StructuralType::new("D").with_scalar("Id", int64()),
        &[("Id", int64())],
    );

    let err = model
        .entity_type_mut(keyed)
        .expect("D should exist")
        .set_base_type(Some(a))
        .expect_err("a keyed type cannot derive");
    assert!(matches!(err, ModelError::DerivedEntityTypeKey { .. }));
}

#[test]
fn reparenting_checks_the_whole_subtree_for_collisions() {
    let (mut model, a, _, _) = chain();
    model
        .entity_type_mut(a)
        .expect("A should exist")
        .add_shadow_property("Tag", text())
        .expect("Tag should add on A");

    // E <- F, where F declares a property named like one on A
    let e = model
        .add_entity_type(StructuralType::new("E"))
        .expect("E should register");
    let f = model
        .add_entity_type(StructuralType::new("F"))
        .expect("F should register");
    let mut derived = model.entity_type_mut(f).expect("F should exist");
    derived.set_base_type(Some(e)).expect("F should derive from E");
    derived
        .add_shadow_property("Tag", text())
        .expect("Tag should add on F");

    let err = model
        .entity_type_mut(e)
        .expect("E should exist")
        .set_base_type(Some(a))
        .expect_err("F.Tag collides with A.Tag");
    assert!(matches!(
        &err,
        ModelError::DuplicateProperty { entity, declared_on, .. }
            if entity == "F" && declared_on == "A"
    ));

    // nothing changed
    assert!(model.entity_type(e).expect("E").base_type().is_none());
}

#[test]
fn hierarchy_walks_are_root_first() {
    let (model, a, b, c) = chain();
    let leaf = model.entity_type(c).expect("C should exist");

    let chain: Vec<&str> = leaf.base_chain().into_iter().map(|ty| ty.name()).collect();
    assert_eq!(chain, ["A", "B", "C"]);
    assert_eq!(leaf.root_type().id(), a);

    let root = model.entity_type(a).expect("A should exist");
    let derived: Vec<EntityTypeId> = root.derived_types().map(|ty| ty.id()).collect();
    assert_eq!(derived, [b]);
    let descendants: Vec<EntityTypeId> = root.descendants().into_iter().map(|ty| ty.id()).collect();
    assert_eq!(descendants, [b, c]);

    assert!(root.is_same_or_base_of(c));
    assert!(root.is_same_or_base_of(a));
    assert!(!leaf.is_same_or_base_of(a));
}

#[test]
fn detaching_drops_inherited_properties_and_renumbers() {
    let (mut model, a, _, c) = chain();
    model
        .entity_type_mut(a)
        .expect("A should exist")
        .add_property("P", int64())
        .expect("P should add on A");
    let mut leaf = model.entity_type_mut(c).expect("C should exist");
    leaf.add_property("Q", text()).expect("Q should add on C");
    assert_eq!(indexes(leaf.read()), [0, 1]);

    leaf.set_base_type(None).expect("C should detach");

    let leaf = model.entity_type(c).expect("C should exist");
    assert_eq!(names(leaf), ["Q"]);
    assert_eq!(indexes(leaf), [0]);
    assert_eq!(leaf.property_count(), 1);
    assert!(model.entity_type(a).expect("A").descendants().len() == 1);
}

#[test]
fn base_cannot_index_a_list_a_derived_type_already_indexes() {
    let (mut model, a, b, c) = chain();
    model
        .entity_type_mut(a)
        .expect("A should exist")
        .add_property("P", int64())
        .expect("P should add on A");
    model
        .entity_type_mut(c)
        .expect("C should exist")
        .add_index(&["P"], false)
        .expect("C should index inherited P");

    for id in [a, b] {
        let err = model
            .entity_type_mut(id)
            .expect("base should exist")
            .add_index(&["P"], true)
            .expect_err("the hierarchy already indexes P");
        assert!(matches!(err, ModelError::DuplicateIndex { .. }));
        assert_class(&err, ErrorClass::InvalidState);
    }

    let indexed: usize = [a, b, c]
        .into_iter()
        .map(|id| model.entity_type(id).expect("type").declared_indexes().count())
        .sum();
    assert_eq!(indexed, 1);
}

#[test]
fn table_mapping_resolves_through_the_root() {
    init_tracing();

    let config = ModelConfig {
        default_schema: Some("dbo".to_string()),
    };
    let mut model = Model::with_config(&config);
    let base = model
        .add_entity_type(StructuralType::new("Vehicle"))
        .expect("base should register");
    let derived = model
        .add_entity_type(StructuralType::new("Truck"))
        .expect("derived should register");
    model
        .entity_type_mut(derived)
        .expect("derived should exist")
        .set_base_type(Some(base))
        .expect("Truck should derive from Vehicle");

    let truck = model.entity_type(derived).expect("derived should exist");
    assert_eq!(truck.table_name(), "Vehicle");
    assert_eq!(truck.schema(), Some("dbo"));

    model
        .entity_type_mut(base)
        .expect("base should exist")
        .set_table(Some("Vehicles"), Some("fleet"))
        .expect("table should set");

    let truck = model.entity_type(derived).expect("derived should exist");
    assert_eq!(truck.table_name(), "Vehicles");
    assert_eq!(truck.schema(), Some("fleet"));
}
