use super::Hydrator;
use crate::{convert::DateCache, Entity, Shared};

use rowmap_core::{
    schema::Schema,
    stmt::{Row, Value},
    Error, Result,
};

use std::{marker::PhantomData, rc::Rc};

/// Lazily hydrated entities, one per row.
pub struct Hydrate<E, I> {
    hydrator: Hydrator,
    schema: Rc<Schema>,
    rows: I,
    reuse: bool,
    dates: DateCache,
    _entity: PhantomData<fn() -> E>,
}

/// Hydrated entities keyed by a column of their row.
pub struct Indexed<E, I> {
    inner: Hydrate<E, I>,
    column: String,
}

impl<E, I> Hydrate<E, I>
where
    E: Entity,
    I: Iterator<Item = Result<Row>>,
{
    pub(super) fn new(
        hydrator: Hydrator,
        schema: Rc<Schema>,
        rows: I,
        reuse: bool,
    ) -> Result<Hydrate<E, I>> {
        if schema.fields.is_empty() {
            return Err(Error::mapping(format!(
                "{} has no mapped fields",
                schema.entity
            )));
        }

        Ok(Hydrate {
            hydrator,
            schema,
            rows,
            reuse,
            dates: DateCache::new(),
            _entity: PhantomData,
        })
    }

    /// Yield `(row[column], entity)` pairs instead.
    pub fn indexed_by(self, column: impl Into<String>) -> Indexed<E, I> {
        Indexed {
            inner: self,
            column: column.into(),
        }
    }

    fn next_row(&mut self) -> Option<Result<(Row, Shared<E>)>> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(err) => return Some(Err(err)),
        };

        Some(
            self.hydrator
                .hydrate_row::<E>(&self.schema, &row, self.reuse, &mut self.dates)
                .map(|entity| (row, entity)),
        )
    }
}

impl<E, I> Iterator for Hydrate<E, I>
where
    E: Entity,
    I: Iterator<Item = Result<Row>>,
{
    type Item = Result<Shared<E>>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_row()?.map(|(_, entity)| entity))
    }
}

impl<E, I> Iterator for Indexed<E, I>
where
    E: Entity,
    I: Iterator<Item = Result<Row>>,
{
    type Item = Result<(Value, Shared<E>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (row, entity) = match self.inner.next_row()? {
            Ok(pair) => pair,
            Err(err) => return Some(Err(err)),
        };

        Some(match row.get(&self.column) {
            Some(key) => Ok((key.clone(), entity)),
            None => Err(Error::mapping(format!(
                "index column `{}` is not in the row",
                self.column
            ))),
        })
    }
}
