mod join;

use crate::{
    model::EntityTypeId,
    query::{
        CollectionStrategy, IncludePlanner, IncludeQuery, QuerySource, ReferenceStrategy,
        RelatedValuesStrategy,
    },
    test_support::SalesModel,
};

// Plan `names` from a root select over `root`.
fn plan(sales: &SalesModel, root: EntityTypeId, names: &[&str]) -> IncludeQuery {
    let planner = IncludePlanner::new(&sales.model);
    let query = planner
        .root_query(root, QuerySource::new("root"))
        .expect("root query should plan");

    planner
        .include_names(query, names, true)
        .expect("include path should plan")
}

fn reference(strategy: &RelatedValuesStrategy) -> &ReferenceStrategy {
    match strategy {
        RelatedValuesStrategy::Reference(reference) => reference,
        RelatedValuesStrategy::Collection(_) => panic!("expected a reference strategy"),
    }
}

fn collection(strategy: &RelatedValuesStrategy) -> &CollectionStrategy {
    match strategy {
        RelatedValuesStrategy::Collection(collection) => collection,
        RelatedValuesStrategy::Reference(_) => panic!("expected a collection strategy"),
    }
}
