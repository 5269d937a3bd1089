//! ## Crate layout
//! - `core`: metadata model, relational query shape, include planner, readers.
//! - `error`: public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module carries the model vocabulary plus the planner entry
//! points most callers need.

pub use relmap_core as core;

pub mod error;

use crate::core::{
    config::{PlannerConfig, RelmapConfig},
    model::{EntityTypeId, Model},
    query::{IncludePlanner, IncludeQuery, QuerySource},
};
use std::path::Path;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::Error;

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<RelmapConfig, Error> {
    Ok(RelmapConfig::from_file(path)?)
}

/// Plan the navigations named by `names` from a fresh root query over `entity`.
pub fn plan_include(
    model: &Model,
    config: &PlannerConfig,
    entity: EntityTypeId,
    source: QuerySource,
    names: &[&str],
) -> Result<IncludeQuery, Error> {
    let planner = IncludePlanner::new(model).with_config(config.clone());
    let query = planner.root_query(entity, source)?;

    Ok(planner.include_default(query, names)?)
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        prelude::*,
        query::{IncludePlanner, IncludeQuery, RelatedValuesStrategy},
    };
    pub use crate::{Error, plan_include};
}
