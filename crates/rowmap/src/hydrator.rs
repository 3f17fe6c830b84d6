mod hydrate;
pub use hydrate::{Hydrate, Indexed};

mod identity_map;
pub use identity_map::IdentityMap;

mod rows;
pub use rows::StatementRows;

mod weak_cache;
use weak_cache::WeakCache;

use crate::{
    convert::{self, DateCache},
    entity::{check_target, CollectionValue, ItemValue, PendingCollection, PendingItem},
    relation::LazyItem,
    Entity, FieldValue, Registry, Shared,
};

use rowmap_core::{
    driver::{Connection, Statement},
    schema::{Field, Relation, Schema},
    stmt::{Id, Row, Value},
    Error, Result,
};
use rowmap_sql::{stmt::Select, Serializer};
use tracing::{debug, trace};

use std::{
    any::{Any, TypeId},
    cell::RefCell,
    fmt,
    rc::Rc,
};

/// Builds entities from rows.
///
/// Cloning is cheap; clones share the identity map and the lazy item cache.
#[derive(Clone)]
pub struct Hydrator {
    inner: Rc<Inner>,
}

struct Inner {
    connection: Rc<dyn Connection>,
    registry: Registry,
    serializer: Serializer,
    identity_map: RefCell<IdentityMap>,
    lazy_items: RefCell<WeakCache<LazyKey>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LazyKey {
    target: TypeId,
    column: String,
    id: Id,
}

impl Hydrator {
    pub fn new(connection: Rc<dyn Connection>, registry: Registry) -> Hydrator {
        let serializer = Serializer::new(connection.capability());

        Hydrator {
            inner: Rc::new(Inner {
                connection,
                registry,
                serializer,
                identity_map: RefCell::new(IdentityMap::new()),
                lazy_items: RefCell::new(WeakCache::new()),
            }),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn connection(&self) -> &Rc<dyn Connection> {
        &self.inner.connection
    }

    /// Lazily hydrate `rows` into entities of type `E`.
    ///
    /// With `reuse`, a row whose identity is already live in the identity map
    /// yields that instance untouched.
    pub fn hydrate<E, I>(&self, rows: I, reuse: bool) -> Result<Hydrate<E, RowsOk<I::IntoIter>>>
    where
        E: Entity,
        I: IntoIterator<Item = Row>,
    {
        let rows: RowsOk<I::IntoIter> = rows.into_iter().map(Ok as fn(Row) -> Result<Row>);
        Hydrate::new(self.clone(), self.registry().schema::<E>()?, rows, reuse)
    }

    /// Hydrate the rows an executed statement produces.
    pub fn hydrate_statement<E: Entity>(
        &self,
        statement: Box<dyn Statement>,
        reuse: bool,
    ) -> Result<Hydrate<E, StatementRows>> {
        Hydrate::new(
            self.clone(),
            self.registry().schema::<E>()?,
            StatementRows::new(statement),
            reuse,
        )
    }

    pub fn hydrate_all<E, I>(&self, rows: I, reuse: bool) -> Result<Vec<Shared<E>>>
    where
        E: Entity,
        I: IntoIterator<Item = Row>,
    {
        self.hydrate::<E, I>(rows, reuse)?.collect()
    }

    /// `SELECT * FROM <E's table> WHERE <column> IN (<values>)`, hydrated.
    pub fn select<E: Entity>(
        &self,
        column: &str,
        values: &[Value],
        for_update: bool,
        reuse: bool,
    ) -> Result<Vec<Shared<E>>> {
        if values.is_empty() {
            return Ok(vec![]);
        }

        let schema = self.registry().schema::<E>()?;
        let stmt = Select::new(&schema.table, column, values.len()).for_update(for_update);
        let sql = self.inner.serializer.serialize(&stmt.into());

        debug!(sql = %sql, params = values.len(), "select");

        let mut statement = self.inner.connection.prepare(&sql)?;
        statement.execute(values)?;

        let entities: Vec<_> = self.hydrate_statement::<E>(statement, reuse)?.collect::<Result<_>>()?;

        debug!(entity = %schema.entity, rows = entities.len(), "hydrated");
        Ok(entities)
    }

    /// The shared lazy item for `relation` pointing at `id`.
    pub fn lazy_item<T: Entity>(
        &self,
        relation: &Relation,
        id: Id,
    ) -> Result<Rc<LazyItem<T>>> {
        check_target::<T>(relation)?;

        let key = LazyKey {
            target: TypeId::of::<T>(),
            column: relation.their_column.clone(),
            id: id.identity_key(),
        };

        let mut cache = self.inner.lazy_items.borrow_mut();

        if let Some(live) = cache.get(&key) {
            if let Ok(item) = live.downcast::<LazyItem<T>>() {
                return Ok(item);
            }
        }

        let item = Rc::new(LazyItem::new(self.clone(), relation.clone(), id));
        let erased: Rc<dyn Any> = item.clone();
        cache.insert(key, &erased);

        Ok(item)
    }

    /// Live instance of `E` with `id`, if the identity map holds one.
    pub fn identity<E: Entity>(&self, id: &Id) -> Option<Shared<E>> {
        self.inner.identity_map.borrow().get::<E>(id)
    }

    /// Identity map entries, live or not yet swept.
    pub fn cached_identities(&self) -> usize {
        self.inner.identity_map.borrow().len()
    }

    /// Forget every cached instance. Entities already handed out stay valid.
    pub fn clear(&self) {
        self.inner.identity_map.borrow_mut().clear();
        self.inner.lazy_items.borrow_mut().clear();
    }

    /// Drop cache entries whose value is no longer alive.
    pub fn prune(&self) {
        self.inner.identity_map.borrow_mut().prune();
        self.inner.lazy_items.borrow_mut().prune();
    }

    pub(crate) fn hydrate_row<E: Entity>(
        &self,
        schema: &Schema,
        row: &Row,
        reuse: bool,
        dates: &mut DateCache,
    ) -> Result<Shared<E>> {
        let id_column = schema.id_column();
        let raw_id = row.get(id_column).ok_or_else(|| {
            Error::mapping(format!("row of `{}` has no `{id_column}` column", schema.table))
        })?;
        let id = Id::from_value(raw_id)?;

        if reuse {
            if let Some(entity) = self.identity::<E>(&id) {
                trace!(entity = %schema.entity, id = %id, "identity map hit");
                return Ok(entity);
            }
        }

        let mut entity = E::blank();

        for field in &schema.fields {
            self.field_value(field, row, dates)
                .and_then(|value| entity.load_field(&field.name, value))
                .map_err(|err| err.context(format!("{}::{}", schema.entity, field.name)))?;
        }

        let entity = Rc::new(RefCell::new(entity));
        self.inner
            .identity_map
            .borrow_mut()
            .insert::<E>(&id, &entity);

        Ok(entity)
    }

    fn field_value(
        &self,
        field: &Field,
        row: &Row,
        dates: &mut DateCache,
    ) -> Result<FieldValue> {
        if let Some(relation) = field.relation.as_ref().filter(|_| field.is_to_many()) {
            // The owning id is read from our side, never from a column
            // named after the field.
            let column = relation.our_column.as_deref().unwrap_or_default();

            return Ok(match row.get(column) {
                None | Some(Value::Null) => FieldValue::Collection(CollectionValue::Empty),
                Some(owner) => FieldValue::Collection(CollectionValue::Pending(PendingCollection {
                    hydrator: self.clone(),
                    relation: relation.clone(),
                    owner: Id::from_value(owner)?,
                })),
            });
        }

        let column = field.column_name();

        let value = match row.get(column) {
            Some(value) => value,
            None if field.nullable => return Ok(FieldValue::Null),
            None => {
                return Err(Error::mapping(format!(
                    "missing column `{column}` for a non-nullable field"
                )))
            }
        };

        match &field.relation {
            Some(_) if value.is_null() => Ok(FieldValue::Null),
            Some(relation) => Ok(FieldValue::Item(ItemValue::Pending(PendingItem {
                hydrator: self.clone(),
                relation: relation.clone(),
                id: Id::from_value(value)?,
            }))),
            None => convert::hydrate(field, value.clone(), dates),
        }
    }
}

/// Row source adapter for in-memory rows.
pub type RowsOk<I> = std::iter::Map<I, fn(Row) -> Result<Row>>;

impl fmt::Debug for Hydrator {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Hydrator")
            .field("identity_map", &self.inner.identity_map.borrow().len())
            .field("lazy_items", &self.inner.lazy_items.borrow().len())
            .finish()
    }
}
