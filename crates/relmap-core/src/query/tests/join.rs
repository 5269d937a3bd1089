use super::*;
use crate::{
    model::{Model, NavigationRole},
    query::{IncludeError, JoinKind, SqlExpression, TableSource, build_join_predicate},
    test_support::{add_keyed_entity, init_tracing, int64, int64_nullable, sales_model, text},
    types::StructuralType,
};

// Predicate of the `n`th table in the root select, which must be a join.
fn join_predicate(plan: &IncludeQuery, n: usize) -> &SqlExpression {
    match &plan.root.select.tables()[n] {
        TableSource::Join(join) => &join.predicate,
        other => panic!("expected a join, got {other:?}"),
    }
}

#[test]
fn nullable_foreign_key_widens_the_principal_side() {
    let sales = sales_model();
    let plan = plan(&sales, sales.order, &["Shipper"]);
    let predicate = join_predicate(&plan, 1);

    assert_eq!(predicate.convert_count(), 1);
    let SqlExpression::Equal(left, right) = predicate else {
        panic!("expected an equality, got {predicate:?}");
    };
    assert_eq!(left.as_column().map(|c| c.name.as_str()), Some("ShipperId"));
    assert!(matches!(
        &**right,
        SqlExpression::Convert { operand, ty } if operand.as_column().is_some() && ty.nullable
    ));
    assert_eq!(
        predicate.to_string(),
        "\"o\".\"ShipperId\" = CAST(\"s\".\"Id\" AS int64?)"
    );
}

#[test]
fn nullable_principal_key_widens_the_foreign_key_side() {
    init_tracing();

    let mut model = Model::new();
    let parent_key: &[&str] = &["Code"];
    let parent = model
        .add_entity_type(StructuralType::new("Parent").with_scalar("Code", int64_nullable()))
        .expect("Parent should register");
    let key = {
        let mut entity = model.entity_type_mut(parent).expect("Parent should exist");
        entity
            .add_property("Code", int64_nullable())
            .expect("Code should add");
        entity
            .set_primary_key(Some(parent_key))
            .expect("primary key should set")
            .expect("primary key should be present")
    };
    let (child, _) = add_keyed_entity(
        &mut model,
        StructuralType::new("Child")
            .with_scalar("Id", int64())
            .with_scalar("ParentCode", int64())
            .with_reference("Parent", "Parent"),
        &[("Id", int64()), ("ParentCode", int64())],
    );
    {
        let mut entity = model.entity_type_mut(child).expect("Child should exist");
        let fk = entity
            .add_foreign_key(&["ParentCode"], &key, None)
            .expect("foreign key should add");
        entity
            .add_navigation("Parent", &fk, NavigationRole::DependentToPrincipal)
            .expect("navigation should add");
    }

    let planner = IncludePlanner::new(&model);
    let query = planner
        .root_query(child, QuerySource::new("c"))
        .expect("root query should plan");
    let plan = planner
        .include_names(query, &["Parent"], true)
        .expect("include should plan");

    // a required foreign key stays an inner join whatever the key's nullability
    assert_eq!(reference(&plan.strategies[0]).join_kind, JoinKind::Inner);
    assert_eq!(
        join_predicate(&plan, 1).to_string(),
        "CAST(\"c\".\"ParentCode\" AS int64?) = \"p\".\"Code\""
    );
}

#[test]
fn composite_keys_pair_columns_in_key_order() {
    init_tracing();

    let mut model = Model::new();
    let warehouse_key: &[&str] = &["Region", "Number"];
    let (warehouse, _) = add_keyed_entity(
        &mut model,
        StructuralType::new("Warehouse")
            .with_scalar("Id", int64())
            .with_scalar("Region", text())
            .with_scalar("Number", int64()),
        &[("Id", int64()), ("Region", text()), ("Number", int64())],
    );
    let key = model
        .entity_type_mut(warehouse)
        .expect("Warehouse should exist")
        .set_primary_key(Some(warehouse_key))
        .expect("primary key should set")
        .expect("primary key should be present");
    let (bin, _) = add_keyed_entity(
        &mut model,
        StructuralType::new("Bin")
            .with_scalar("Id", int64())
            .with_scalar("WarehouseRegion", text())
            .with_scalar("WarehouseNumber", int64())
            .with_reference("Warehouse", "Warehouse"),
        &[
            ("Id", int64()),
            ("WarehouseRegion", text()),
            ("WarehouseNumber", int64()),
        ],
    );
    {
        let mut entity = model.entity_type_mut(bin).expect("Bin should exist");
        let fk = entity
            .add_foreign_key(&["WarehouseRegion", "WarehouseNumber"], &key, None)
            .expect("composite foreign key should add");
        entity
            .add_navigation("Warehouse", &fk, NavigationRole::DependentToPrincipal)
            .expect("navigation should add");
    }

    let planner = IncludePlanner::new(&model);
    let query = planner
        .root_query(bin, QuerySource::new("b"))
        .expect("root query should plan");
    let plan = planner
        .include_names(query, &["Warehouse"], true)
        .expect("include should plan");

    let predicate = join_predicate(&plan, 1);
    assert_eq!(predicate.conjuncts().len(), 2);
    assert_eq!(predicate.convert_count(), 0);
    assert_eq!(
        predicate.to_string(),
        "\"b\".\"WarehouseRegion\" = \"w\".\"Region\" AND \"b\".\"WarehouseNumber\" = \"w\".\"Number\""
    );
}

#[test]
fn principal_key_length_must_match_the_foreign_key() {
    let sales = sales_model();
    let model = &sales.model;
    let navigation = model
        .entity_type(sales.order)
        .expect("order should exist")
        .navigation_info("Customer")
        .expect("Order.Customer should resolve");
    let customer = model.entity_type(sales.customer).expect("customer should exist");
    let principal_key = [
        customer.get_property("Id").expect("Id"),
        customer.get_property("Name").expect("Name"),
    ];

    let planner = IncludePlanner::new(model);
    let order = planner
        .root_query(sales.order, QuerySource::new("o"))
        .expect("order query should plan");
    let customers = planner
        .root_query(sales.customer, QuerySource::new("c"))
        .expect("customer query should plan");

    let err = build_join_predicate(
        model,
        navigation,
        &principal_key,
        &order.select.tables()[0],
        &customers.select.tables()[0],
    )
    .expect_err("two principal columns against one foreign-key column");
    assert!(matches!(
        &err,
        IncludeError::JoinArityMismatch { navigation, .. } if navigation == "Customer"
    ));
}
