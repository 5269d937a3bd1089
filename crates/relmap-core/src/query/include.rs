//! Include planning: rewrites an entity query so that each navigation on an
//! include path is loaded alongside the root rows.
//!
//! Reference navigations become joins on the current select. Collection
//! navigations cannot be joined without duplicating parent rows, so each one
//! orders the current select by the parent key and starts a nested select
//! over the child table, joined to a `DISTINCT` order-key projection of the
//! parent query. Later steps continue on that nested select.

use crate::{
    config::PlannerConfig,
    model::{EntityTypeId, EntityTypeRef, Model, NavigationInfo, NavigationRef, Property},
    query::{
        IncludeError, QuerySource,
        join::build_join_predicate,
        materialize::{
            EntityMaterializerFactory, Materializer, MaterializerFactory, ValueBufferFactory,
        },
        select::{JoinKind, OrderDirection, SelectExpression, TableExpression, TableSource},
    },
};
use tracing::debug;

///
/// ReferenceStrategy
/// Reads a single related entity from columns appended to the parent row.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReferenceStrategy {
    pub navigation: NavigationRef,
    pub reader_index: usize,
    pub join_kind: JoinKind,
    pub value_buffer: ValueBufferFactory,
    pub materializer: Materializer,
}

///
/// CollectionStrategy
///
/// Reads related entities from an independently executable nested query
/// whose rows arrive ordered by the parent key. `principal_key_slots` index
/// the parent's value buffer and `foreign_key_slots` the child's.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollectionStrategy {
    pub navigation: NavigationRef,
    pub reader_index: usize,
    pub query: SelectExpression,
    pub value_buffer: ValueBufferFactory,
    pub materializer: Materializer,
    pub principal_key_slots: Vec<usize>,
    pub foreign_key_slots: Vec<usize>,
}

///
/// RelatedValuesStrategy
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RelatedValuesStrategy {
    Reference(ReferenceStrategy),
    Collection(CollectionStrategy),
}

impl RelatedValuesStrategy {
    #[must_use]
    pub const fn navigation(&self) -> &NavigationRef {
        match self {
            Self::Reference(strategy) => &strategy.navigation,
            Self::Collection(strategy) => &strategy.navigation,
        }
    }

    #[must_use]
    pub const fn reader_index(&self) -> usize {
        match self {
            Self::Reference(strategy) => strategy.reader_index,
            Self::Collection(strategy) => strategy.reader_index,
        }
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }
}

///
/// EntityQuery
/// A select producing the rows of one entity type for one query source.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntityQuery {
    pub entity: EntityTypeId,
    pub query_source: QuerySource,
    pub select: SelectExpression,
    pub materializer: Materializer,
}

///
/// IncludeQuery
///
/// The rewritten root query paired with one strategy per navigation, in
/// path order, plus the query source, path and tracking flag the execution
/// layer needs to attach related entities to each root entity.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncludeQuery {
    pub root: EntityQuery,
    pub query_source: QuerySource,
    pub navigation_path: Vec<NavigationRef>,
    pub track: bool,
    pub strategies: Vec<RelatedValuesStrategy>,
}

///
/// IncludePlanner
///

pub struct IncludePlanner<'m, F = EntityMaterializerFactory> {
    model: &'m Model,
    factory: F,
    config: PlannerConfig,
}

impl<'m> IncludePlanner<'m> {
    #[must_use]
    pub fn new(model: &'m Model) -> Self {
        Self::with_factory(model, EntityMaterializerFactory)
    }
}

impl<'m, F: MaterializerFactory> IncludePlanner<'m, F> {
    #[must_use]
    pub fn with_factory(model: &'m Model, factory: F) -> Self {
        Self {
            model,
            factory,
            config: PlannerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Select every property of `entity` from its table, bound to `source`.
    pub fn root_query(
        &self,
        entity: EntityTypeId,
        source: QuerySource,
    ) -> Result<EntityQuery, IncludeError> {
        let entity = self.model.entity_type(entity)?;

        let mut select = SelectExpression::new();
        let table = table_source(entity, &select, Some(source.clone()));
        select.add_table(table.clone());

        let materializer = self.factory.create_materializer(
            entity,
            &mut select,
            &mut |property: &Property, select: &mut SelectExpression| -> Result<usize, IncludeError> {
                Ok(select.add_column_to_projection(table.column_for(property)?))
            },
        )?;

        Ok(EntityQuery {
            entity: entity.id(),
            query_source: source,
            select,
            materializer,
        })
    }

    /// Resolve navigation names step by step from the query's entity type,
    /// then plan them.
    pub fn include_names(
        &self,
        query: EntityQuery,
        names: &[&str],
        track: bool,
    ) -> Result<IncludeQuery, IncludeError> {
        let mut path = Vec::with_capacity(names.len());
        let mut current = self.model.entity_type(query.entity)?;

        for name in names {
            let navigation = current.get_navigation(name)?;
            let info = self.model.navigation(&navigation.reference())?;

            path.push(navigation.reference());
            current = self.model.entity_type(info.target_entity_type())?;
        }

        self.include(query, &path, track)
    }

    /// As [`Self::include_names`], tracking per the configured default.
    pub fn include_default(
        &self,
        query: EntityQuery,
        names: &[&str],
    ) -> Result<IncludeQuery, IncludeError> {
        self.include_names(query, names, self.config.track_by_default)
    }

    /// Plan `path` against `query`, emitting one strategy per navigation.
    pub fn include(
        &self,
        query: EntityQuery,
        path: &[NavigationRef],
        track: bool,
    ) -> Result<IncludeQuery, IncludeError> {
        if path.len() > self.config.max_include_depth {
            return Err(IncludeError::PathTooDeep {
                depth: path.len(),
                max: self.config.max_include_depth,
            });
        }

        let EntityQuery {
            entity,
            query_source,
            select,
            materializer,
        } = query;

        let mut state = PlanState {
            current_table: select
                .table_for_query_source(&query_source)
                .cloned()
                .ok_or_else(|| IncludeError::QuerySourceNotFound(query_source.clone()))?,
            current_entity: self.model.entity_type(entity)?,
            parent_materializer: materializer.clone(),
            current: select,
            finished: Vec::new(),
            outer: false,
        };
        let mut strategies = Vec::with_capacity(path.len());

        for navigation in path {
            if !self
                .model
                .entity_type(navigation.entity)?
                .is_same_or_base_of(state.current_entity.id())
            {
                return Err(IncludeError::DisconnectedPath {
                    navigation: navigation.name.clone(),
                    entity: state.current_entity.name().to_string(),
                });
            }

            let info = self.model.navigation(navigation)?;
            let strategy = if info.is_collection() {
                self.include_collection(&mut state, navigation, info)?
            } else {
                self.include_reference(&mut state, navigation, info)?
            };
            strategies.push(strategy);
        }

        // nested selects are complete only once the whole path is planned
        let mut selects = state.finished;
        selects.push(state.current);
        for strategy in &mut strategies {
            if let RelatedValuesStrategy::Collection(collection) = strategy
                && let Some(select) = selects.get_mut(collection.reader_index)
            {
                collection.query = std::mem::take(select);
            }
        }
        let select = selects.into_iter().next().unwrap_or_default();

        Ok(IncludeQuery {
            root: EntityQuery {
                entity,
                query_source: query_source.clone(),
                select,
                materializer,
            },
            query_source,
            navigation_path: path.to_vec(),
            track,
            strategies,
        })
    }

    fn include_reference(
        &self,
        state: &mut PlanState<'m>,
        navigation: &NavigationRef,
        info: NavigationInfo<'m>,
    ) -> Result<RelatedValuesStrategy, IncludeError> {
        let target = self.model.entity_type(info.target_entity_type())?;
        let principal_key = self.principal_key(info)?;

        // inner only while every reference so far is a required dependent-to-principal hop
        state.outer |= !(info.points_to_principal() && info.foreign_key.is_required());
        let join_kind = if state.outer {
            JoinKind::LeftOuter
        } else {
            JoinKind::Inner
        };

        let joined = table_source(target, &state.current, None);
        let predicate = if info.points_to_principal() {
            build_join_predicate(self.model, info, &principal_key, &state.current_table, &joined)?
        } else {
            build_join_predicate(self.model, info, &principal_key, &joined, &state.current_table)?
        };

        let reader_offset = state.current.projection().len();
        state.current.register_reader_offset(reader_offset);
        state.current.add_join(join_kind, joined.clone(), predicate);

        let materializer = self.factory.create_materializer(
            target,
            &mut state.current,
            &mut |property: &Property, select: &mut SelectExpression| -> Result<usize, IncludeError> {
                Ok(select.add_column_to_projection(joined.column_for(property)?) - reader_offset)
            },
        )?;
        let reader_index = state.finished.len();

        debug!(
            navigation = %navigation.name,
            target = %target.name(),
            %join_kind,
            reader_index,
            reader_offset,
            "include reference"
        );

        state.current_table = joined;
        state.current_entity = target;
        state.parent_materializer = materializer.clone();

        Ok(RelatedValuesStrategy::Reference(ReferenceStrategy {
            navigation: navigation.clone(),
            reader_index,
            join_kind,
            value_buffer: ValueBufferFactory::new(reader_offset, materializer.width()),
            materializer,
        }))
    }

    fn include_collection(
        &self,
        state: &mut PlanState<'m>,
        navigation: &NavigationRef,
        info: NavigationInfo<'m>,
    ) -> Result<RelatedValuesStrategy, IncludeError> {
        let target = self.model.entity_type(info.target_entity_type())?;
        let principal_key = self.principal_key(info)?;

        // parent rows must arrive grouped by key for the child merge
        for property in &principal_key {
            let column = state.current_table.column_for(property)?;
            state.current.add_to_order_by(column, OrderDirection::Ascending);
        }
        let parent_alias = state
            .current_table
            .alias()
            .ok_or(IncludeError::UnaliasedTable)?
            .to_string();

        let mut nested = SelectExpression::new();
        let target_table = table_source(target, &nested, None);
        nested.add_table(target_table.clone());

        let materializer = self.factory.create_materializer(
            target,
            &mut nested,
            &mut |property: &Property, select: &mut SelectExpression| -> Result<usize, IncludeError> {
                Ok(select.add_column_to_projection(target_table.column_for(property)?))
            },
        )?;

        let subquery_alias = nested.unique_table_alias(&alias_base(state.current_entity.table_name()));
        let (subquery, orderings) = state
            .current
            .clone_with_order_by_through(&parent_alias)
            .into_order_key_subquery(&subquery_alias);
        let subquery = TableSource::Select(Box::new(subquery));

        let predicate =
            build_join_predicate(self.model, info, &principal_key, &target_table, &subquery)?;
        nested.add_inner_join(subquery, predicate);
        for ordering in orderings {
            nested.add_to_order_by(ordering.column, ordering.direction);
        }

        let foreign_key_slots = info
            .foreign_key
            .property_names()
            .iter()
            .map(|name| {
                let property = target.get_property(name)?;
                slot(&materializer, property, &target_table)
            })
            .collect::<Result<Vec<_>, IncludeError>>()?;
        let principal_key_slots = principal_key
            .iter()
            .map(|property| slot(&state.parent_materializer, property, &state.current_table))
            .collect::<Result<Vec<_>, IncludeError>>()?;

        let reader_index = state.finished.len() + 1;

        debug!(
            navigation = %navigation.name,
            target = %target.name(),
            reader_index,
            nested = %nested,
            "include collection"
        );

        state
            .finished
            .push(std::mem::replace(&mut state.current, nested));
        state.current_table = target_table;
        state.current_entity = target;
        state.parent_materializer = materializer.clone();

        Ok(RelatedValuesStrategy::Collection(CollectionStrategy {
            navigation: navigation.clone(),
            reader_index,
            query: SelectExpression::default(),
            value_buffer: ValueBufferFactory::new(0, materializer.width()),
            materializer,
            principal_key_slots,
            foreign_key_slots,
        }))
    }

    // Principal-key properties the navigation's foreign key references, in key order.
    fn principal_key(&self, info: NavigationInfo<'m>) -> Result<Vec<&'m Property>, IncludeError> {
        let key = info.foreign_key.principal_key();
        let owner = self.model.entity_type(key.entity)?;

        key.properties
            .iter()
            .map(|name| owner.get_property(name).map_err(IncludeError::from))
            .collect()
    }
}

///
/// PlanState
/// Where the next include step attaches.
///

struct PlanState<'m> {
    current: SelectExpression,
    current_table: TableSource,
    current_entity: EntityTypeRef<'m>,
    parent_materializer: Materializer,
    finished: Vec<SelectExpression>,
    outer: bool,
}

fn table_source(
    entity: EntityTypeRef<'_>,
    select: &SelectExpression,
    query_source: Option<QuerySource>,
) -> TableSource {
    let name = entity.table_name();

    TableSource::Table(TableExpression {
        name: name.to_string(),
        schema: entity.schema().map(ToString::to_string),
        alias: select.unique_table_alias(&alias_base(name)),
        query_source,
    })
}

// First character of the table name, lower-cased.
fn alias_base(table: &str) -> String {
    table
        .chars()
        .next()
        .map_or_else(|| "t".to_string(), |c| c.to_lowercase().collect())
}

fn slot(
    materializer: &Materializer,
    property: &Property,
    table: &TableSource,
) -> Result<usize, IncludeError> {
    materializer
        .slot_of(&property.reference())
        .ok_or_else(|| IncludeError::ColumnNotProjected {
            property: property.name().to_string(),
            alias: table.alias().unwrap_or_default().to_string(),
        })
}
