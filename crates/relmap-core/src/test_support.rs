//! Shared fixtures for core tests.

use crate::{
    model::{EntityTypeId, ForeignKeyRef, KeyRef, Model, NavigationRole},
    types::{ScalarKind, StructuralType, ValueType},
};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per process; filter via `RUST_LOG`.
pub(crate) fn init_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub(crate) const fn int64() -> ValueType {
    ValueType::required(ScalarKind::Int64)
}

pub(crate) const fn int64_nullable() -> ValueType {
    ValueType::nullable(ScalarKind::Int64)
}

pub(crate) const fn text() -> ValueType {
    ValueType::required(ScalarKind::Text)
}

///
/// SalesModel
///
/// Customer 1--* Order (required), Order *--1 Shipper (optional),
/// Shipper *--1 Address (required).
///

pub(crate) struct SalesModel {
    pub model: Model,
    pub customer: EntityTypeId,
    pub order: EntityTypeId,
    pub shipper: EntityTypeId,
    pub address: EntityTypeId,
    pub order_customer: ForeignKeyRef,
    pub order_shipper: ForeignKeyRef,
    pub shipper_address: ForeignKeyRef,
}

/// Register an entity type with the given scalar members and primary key `Id`.
pub(crate) fn add_keyed_entity(
    model: &mut Model,
    ty: StructuralType,
    scalars: &[(&str, ValueType)],
) -> (EntityTypeId, KeyRef) {
    let id = model.add_entity_type(ty).expect("entity type should register");
    let mut entity = model.entity_type_mut(id).expect("entity type should exist");

    for (name, ty) in scalars {
        entity.add_property(name, *ty).expect("property should add");
    }
    let key = entity
        .set_primary_key(Some(["Id"].as_slice()))
        .expect("primary key should set")
        .expect("primary key should be present");

    (id, key)
}

pub(crate) fn sales_model() -> SalesModel {
    init_tracing();

    let mut model = Model::new();

    let (customer, customer_key) = add_keyed_entity(
        &mut model,
        StructuralType::new("Customer")
            .with_scalar("Id", int64())
            .with_scalar("Name", text())
            .with_collection("Orders", "Order"),
        &[("Id", int64()), ("Name", text())],
    );
    let (order, _) = add_keyed_entity(
        &mut model,
        StructuralType::new("Order")
            .with_scalar("Id", int64())
            .with_scalar("CustomerId", int64())
            .with_scalar("ShipperId", int64_nullable())
            .with_reference("Customer", "Customer")
            .with_reference("Shipper", "Shipper"),
        &[
            ("Id", int64()),
            ("CustomerId", int64()),
            ("ShipperId", int64_nullable()),
        ],
    );
    let (shipper, shipper_key) = add_keyed_entity(
        &mut model,
        StructuralType::new("Shipper")
            .with_scalar("Id", int64())
            .with_scalar("Name", text())
            .with_scalar("AddressId", int64())
            .with_reference("Address", "Address"),
        &[("Id", int64()), ("Name", text()), ("AddressId", int64())],
    );
    let (address, address_key) = add_keyed_entity(
        &mut model,
        StructuralType::new("Address")
            .with_scalar("Id", int64())
            .with_scalar("Street", text()),
        &[("Id", int64()), ("Street", text())],
    );

    let (order_customer, order_shipper) = {
        let mut entity = model.entity_type_mut(order).expect("order should exist");
        let order_customer = entity
            .add_foreign_key(&["CustomerId"], &customer_key, None)
            .expect("customer foreign key should add");
        let order_shipper = entity
            .add_foreign_key(&["ShipperId"], &shipper_key, None)
            .expect("shipper foreign key should add");
        entity
            .add_navigation("Customer", &order_customer, NavigationRole::DependentToPrincipal)
            .expect("Order.Customer should add");
        entity
            .add_navigation("Shipper", &order_shipper, NavigationRole::DependentToPrincipal)
            .expect("Order.Shipper should add");

        (order_customer, order_shipper)
    };

    model
        .entity_type_mut(customer)
        .expect("customer should exist")
        .add_navigation("Orders", &order_customer, NavigationRole::PrincipalToDependent)
        .expect("Customer.Orders should add");

    let shipper_address = {
        let mut entity = model.entity_type_mut(shipper).expect("shipper should exist");
        let shipper_address = entity
            .add_foreign_key(&["AddressId"], &address_key, None)
            .expect("address foreign key should add");
        entity
            .add_navigation("Address", &shipper_address, NavigationRole::DependentToPrincipal)
            .expect("Shipper.Address should add");

        shipper_address
    };

    SalesModel {
        model,
        customer,
        order,
        shipper,
        address,
        order_customer,
        order_shipper,
        shipper_address,
    }
}
