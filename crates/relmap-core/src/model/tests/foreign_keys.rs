use super::*;
use crate::{
    model::{ForeignKey, ForeignKeyQuery, KeyRef, NavigationRole},
    test_support::{add_keyed_entity, int64_nullable, sales_model},
};

const CUSTOMER_ID: &[&str] = &["CustomerId"];

// Customer{Id, Code} keyed on Id with alternate key Code; Order with a few
// candidate foreign-key columns.
fn customer_order() -> (Model, EntityTypeId, KeyRef, EntityTypeId) {
    init_tracing();

    let mut model = Model::new();
    let (customer, customer_key) = add_keyed_entity(
        &mut model,
        StructuralType::new("Customer")
            .with_scalar("Id", int64())
            .with_scalar("Code", text()),
        &[("Id", int64()), ("Code", text())],
    );
    let (order, _) = add_keyed_entity(
        &mut model,
        StructuralType::new("Order")
            .with_scalar("Id", int64())
            .with_scalar("CustomerId", int64())
            .with_scalar("CustomerCode", text())
            .with_scalar("ReferrerId", int64_nullable()),
        &[
            ("Id", int64()),
            ("CustomerId", int64()),
            ("CustomerCode", text()),
            ("ReferrerId", int64_nullable()),
        ],
    );

    (model, customer, customer_key, order)
}

#[test]
fn get_or_add_returns_existing_key_for_same_properties() {
    let (mut model, customer, customer_key, order) = customer_order();
    let alternate = model
        .entity_type_mut(customer)
        .expect("customer should exist")
        .add_key(&["Code"])
        .expect("alternate key should add");

    let mut entity = model.entity_type_mut(order).expect("order should exist");
    let fk = entity
        .add_foreign_key(CUSTOMER_ID, &customer_key, None)
        .expect("foreign key should add");

    // lookup is by property list, so the other principal key is ignored
    let again = entity
        .get_or_add_foreign_key(CUSTOMER_ID, &alternate, None)
        .expect("existing foreign key should resolve");
    assert_eq!(again, fk);
    assert_eq!(entity.read().foreign_keys().count(), 1);

    let stored = model.foreign_key(&again).expect("foreign key should exist");
    assert_eq!(stored.principal_key(), &customer_key);
}

#[test]
fn duplicate_foreign_key_is_rejected() {
    let (mut model, _, customer_key, order) = customer_order();
    let mut entity = model.entity_type_mut(order).expect("order should exist");
    entity
        .add_foreign_key(CUSTOMER_ID, &customer_key, None)
        .expect("foreign key should add");

    let err = entity
        .add_foreign_key(CUSTOMER_ID, &customer_key, None)
        .expect_err("duplicate foreign key must fail");
    assert!(matches!(err, ModelError::DuplicateForeignKey { .. }));
    assert_class(&err, ErrorClass::InvalidState);
}

#[test]
fn foreign_key_must_match_principal_arity_and_types() {
    let (mut model, _, customer_key, order) = customer_order();
    let mut entity = model.entity_type_mut(order).expect("order should exist");

    let err = entity
        .add_foreign_key(&["CustomerId", "ReferrerId"], &customer_key, None)
        .expect_err("two columns against a one-column key must fail");
    assert!(matches!(
        err,
        ModelError::ForeignKeyArityMismatch { expected: 1, found: 2, .. }
    ));
    assert_class(&err, ErrorClass::MetadataConsistency);

    let err = entity
        .add_foreign_key(&["CustomerCode"], &customer_key, None)
        .expect_err("text against int64 must fail");
    assert!(matches!(
        &err,
        ModelError::ForeignKeyTypeMismatch { property, principal_property, .. }
            if property == "CustomerCode" && principal_property == "Id"
    ));
    assert_class(&err, ErrorClass::MetadataConsistency);

    // nullability alone is not a mismatch
    entity
        .add_foreign_key(&["ReferrerId"], &customer_key, None)
        .expect("nullable int64 against int64 should add");
}

#[test]
fn required_defaults_from_nullability() {
    let (mut model, _, customer_key, order) = customer_order();
    let mut entity = model.entity_type_mut(order).expect("order should exist");
    entity
        .add_foreign_key(CUSTOMER_ID, &customer_key, None)
        .expect("required foreign key should add");
    entity
        .add_foreign_key(&["ReferrerId"], &customer_key, None)
        .expect("optional foreign key should add");

    let read = entity.read();
    assert!(read.get_foreign_key(CUSTOMER_ID).expect("fk").is_required());
    assert!(!read.get_foreign_key(&["ReferrerId"]).expect("fk").is_required());

    entity
        .set_foreign_key_required(&["ReferrerId"], true)
        .expect("required should set");
    entity
        .set_foreign_key_unique(&["ReferrerId"], true)
        .expect("unique should set");

    let fk = entity.read().get_foreign_key(&["ReferrerId"]).expect("fk");
    assert!(fk.is_required());
    assert!(fk.is_unique());
}

#[test]
fn principal_key_and_entity_are_validated() {
    let (mut model, customer, customer_key, order) = customer_order();
    let mut entity = model.entity_type_mut(order).expect("order should exist");

    let missing = KeyRef {
        entity: customer,
        properties: vec!["Code".to_string()],
    };
    let err = entity
        .add_foreign_key(&["CustomerCode"], &missing, None)
        .expect_err("undeclared principal key must fail");
    assert!(matches!(err, ModelError::KeyNotFound { .. }));

    let err = entity
        .add_foreign_key(CUSTOMER_ID, &customer_key, Some(order))
        .expect_err("Order is not derived from Customer");
    assert!(matches!(
        &err,
        ModelError::PrincipalEntityTypeMismatch { principal, key_owner }
            if principal == "Order" && key_owner == "Customer"
    ));

    let err = entity
        .add_foreign_key(&["Nope"], &customer_key, None)
        .expect_err("unknown property must fail");
    assert!(matches!(err, ModelError::PropertyNotFound { .. }));
}

#[test]
fn foreign_key_over_derived_property_belongs_to_derived_type() {
    init_tracing();

    let mut model = Model::new();
    let (depot, depot_key) = add_keyed_entity(
        &mut model,
        StructuralType::new("Depot").with_scalar("Id", int64()),
        &[("Id", int64())],
    );
    let (vehicle, _) = add_keyed_entity(
        &mut model,
        StructuralType::new("Vehicle").with_scalar("Id", int64()),
        &[("Id", int64())],
    );
    let truck = model
        .add_entity_type(StructuralType::new("Truck"))
        .expect("Truck should register");
    {
        let mut entity = model.entity_type_mut(truck).expect("Truck should exist");
        entity.set_base_type(Some(vehicle)).expect("Truck <- Vehicle");
        entity
            .add_shadow_property("DepotId", int64())
            .expect("DepotId should add");
    }

    let err = model
        .entity_type_mut(vehicle)
        .expect("Vehicle should exist")
        .add_foreign_key(&["DepotId"], &depot_key, None)
        .expect_err("Vehicle cannot see Truck.DepotId");
    assert!(matches!(
        &err,
        ModelError::PropertyWrongEntityType { entity, .. } if entity == "Vehicle"
    ));
    assert_class(&err, ErrorClass::MetadataConsistency);

    let fk = model
        .entity_type_mut(truck)
        .expect("Truck should exist")
        .add_foreign_key(&["DepotId"], &depot_key, None)
        .expect("Truck owns DepotId");
    let stored = model.foreign_key(&fk).expect("foreign key should exist");
    assert_eq!(stored.dependent_entity_type(), truck);
    assert_eq!(stored.principal_entity_type(), depot);
}

#[test]
fn semantic_lookup_matches_every_set_criterion() {
    let sales = sales_model();
    let order = sales.model.entity_type(sales.order).expect("order should exist");

    let by_navigation = ForeignKeyQuery {
        principal_entity: Some(sales.customer),
        navigation_to_principal: Some("Customer"),
        ..ForeignKeyQuery::default()
    };
    assert_eq!(
        order.find_foreign_key_by(&by_navigation).map(ForeignKey::reference),
        Some(sales.order_customer.clone())
    );

    let other_name = ForeignKeyQuery {
        navigation_to_principal: Some("Buyer"),
        principal_entity: Some(sales.customer),
        ..ForeignKeyQuery::default()
    };
    assert!(order.find_foreign_key_by(&other_name).is_none());

    let unique = ForeignKeyQuery {
        principal_entity: Some(sales.customer),
        unique: Some(true),
        ..ForeignKeyQuery::default()
    };
    assert!(order.find_foreign_key_by(&unique).is_none());

    let shipper_id: &[&str] = &["ShipperId"];
    let by_columns = ForeignKeyQuery {
        dependent_properties: Some(shipper_id),
        ..ForeignKeyQuery::default()
    };
    assert_eq!(
        order.find_foreign_key_by(&by_columns).map(ForeignKey::reference),
        Some(sales.order_shipper.clone())
    );

    // Order.ShipperId has no inverse navigation yet, so any name matches
    let unclaimed = ForeignKeyQuery {
        principal_entity: Some(sales.shipper),
        navigation_to_dependent: Some("Orders"),
        ..ForeignKeyQuery::default()
    };
    assert_eq!(
        order.find_foreign_key_by(&unclaimed).map(ForeignKey::reference),
        Some(sales.order_shipper)
    );
}

#[test]
fn foreign_key_in_use_by_navigation_cannot_be_removed() {
    let mut sales = sales_model();

    let err = sales
        .model
        .entity_type_mut(sales.order)
        .expect("order should exist")
        .remove_foreign_key(CUSTOMER_ID)
        .expect_err("Order.Customer still uses the key");
    assert!(matches!(
        &err,
        ModelError::ForeignKeyInUse { navigation, .. } if navigation == "Customer"
    ));
    assert_class(&err, ErrorClass::InUse);

    sales
        .model
        .entity_type_mut(sales.order)
        .expect("order should exist")
        .remove_navigation("Customer")
        .expect("navigation should remove");

    let err = sales
        .model
        .entity_type_mut(sales.order)
        .expect("order should exist")
        .remove_foreign_key(CUSTOMER_ID)
        .expect_err("Customer.Orders still uses the key");
    assert!(matches!(
        &err,
        ModelError::ForeignKeyInUse { navigation, .. } if navigation == "Orders"
    ));

    sales
        .model
        .entity_type_mut(sales.customer)
        .expect("customer should exist")
        .remove_navigation("Orders")
        .expect("inverse navigation should remove");
    let removed = sales
        .model
        .entity_type_mut(sales.order)
        .expect("order should exist")
        .remove_foreign_key(CUSTOMER_ID)
        .expect("unused foreign key should remove");
    assert_eq!(removed.reference(), sales.order_customer);
    assert!(sales.model.foreign_key(&sales.order_customer).is_none());
}

#[test]
fn referencing_foreign_keys_finds_dependents() {
    let sales = sales_model();
    let key = sales
        .model
        .entity_type(sales.customer)
        .expect("customer should exist")
        .get_primary_key()
        .expect("customer should be keyed")
        .reference();

    let dependents: Vec<_> = sales
        .model
        .referencing_foreign_keys(&key)
        .map(ForeignKey::reference)
        .collect();
    assert_eq!(dependents, [sales.order_customer.clone()]);

    let fk = sales
        .model
        .foreign_key(&sales.order_customer)
        .expect("foreign key should exist");
    assert_eq!(fk.navigation(NavigationRole::DependentToPrincipal), Some("Customer"));
    assert_eq!(fk.navigation(NavigationRole::PrincipalToDependent), Some("Orders"));
}
