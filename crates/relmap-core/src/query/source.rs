use derive_more::Display;

///
/// QuerySource
/// Opaque token naming one logical stream of rows within a query.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QuerySource(String);

impl QuerySource {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}
