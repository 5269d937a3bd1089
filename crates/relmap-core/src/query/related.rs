//! Execution-side readers that attach related entities using the strategies
//! emitted by the include planner.

use crate::{
    query::{
        include::{CollectionStrategy, ReferenceStrategy},
        materialize::EntityValues,
    },
    value::{Value, ValueBuffer},
};
use std::iter::Peekable;
use thiserror::Error as ThisError;

///
/// RelatedValuesError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RelatedValuesError {
    #[error("row has {len} values but {width} were requested at offset {offset}")]
    ShortRow {
        offset: usize,
        width: usize,
        len: usize,
    },
}

///
/// ReferenceRelatedValues
/// Reads the related entity a reference include appended to each row.
///

#[derive(Clone, Copy, Debug)]
pub struct ReferenceRelatedValues<'a> {
    strategy: &'a ReferenceStrategy,
}

impl<'a> ReferenceRelatedValues<'a> {
    #[must_use]
    pub const fn new(strategy: &'a ReferenceStrategy) -> Self {
        Self { strategy }
    }

    /// The related entity for `row`, or `None` when an outer join found no
    /// match and every key slot came back null.
    pub fn read(&self, row: &[Value]) -> Result<Option<EntityValues>, RelatedValuesError> {
        let buffer = self.strategy.value_buffer.create(row)?;
        let key_slots = self.strategy.materializer.key_slots();

        let missing = if key_slots.is_empty() {
            buffer.iter().all(Value::is_null)
        } else {
            key_slots
                .iter()
                .all(|slot| buffer.get(*slot).is_none_or(Value::is_null))
        };
        if missing {
            return Ok(None);
        }

        self.strategy.materializer.materialize(&buffer).map(Some)
    }
}

///
/// CollectionRelatedValues
///
/// Walks the rows of one nested collection query alongside the parent
/// cursor. Both sides are ordered by the parent key, so each parent's
/// children form one contiguous run at the head of the child cursor.
/// Equal parent keys arrive back to back (a collection reached through a
/// reference repeats its parent on every root row), so the last run is
/// kept and handed out again while the key stays the same.
///

pub struct CollectionRelatedValues<'a, I>
where
    I: Iterator<Item = Vec<Value>>,
{
    strategy: &'a CollectionStrategy,
    rows: Peekable<I>,
    last: Option<(Vec<Value>, Vec<EntityValues>)>,
}

impl<'a, I> CollectionRelatedValues<'a, I>
where
    I: Iterator<Item = Vec<Value>>,
{
    pub fn new(strategy: &'a CollectionStrategy, rows: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            strategy,
            rows: rows.into_iter().peekable(),
            last: None,
        }
    }

    /// Children of the parent whose value buffer is `parent`.
    ///
    /// A parent with a null key has no children. Rows are consumed only
    /// while their foreign-key values equal the parent key; a parent whose
    /// key equals the previous one gets the same run again.
    pub fn related_to(&mut self, parent: &ValueBuffer) -> Result<Vec<EntityValues>, RelatedValuesError> {
        let key = self
            .strategy
            .principal_key_slots
            .iter()
            .map(|slot| {
                parent.get(*slot).cloned().ok_or(RelatedValuesError::ShortRow {
                    offset: *slot,
                    width: 1,
                    len: parent.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut related = Vec::new();
        if key.iter().any(Value::is_null) {
            return Ok(related);
        }
        if let Some((last_key, last_run)) = &self.last
            && *last_key == key
        {
            return Ok(last_run.clone());
        }

        while let Some(row) = self.rows.peek() {
            let buffer = self.strategy.value_buffer.create(row)?;
            let matches = self
                .strategy
                .foreign_key_slots
                .iter()
                .zip(&key)
                .all(|(slot, key)| buffer.get(*slot).is_some_and(|value| value.sql_eq(key)));
            if !matches {
                break;
            }

            related.push(self.strategy.materializer.materialize(&buffer)?);
            self.rows.next();
        }
        self.last = Some((key, related.clone()));

        Ok(related)
    }
}
