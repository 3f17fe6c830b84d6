mod snapshot;
pub use snapshot::EntitySnapshot;

mod tracker;
pub use tracker::ChangeTracker;

use crate::{
    convert::{self, DateCache},
    entity::ItemValue,
    event::{ChangeEvent, Event, EventSink, Mode},
    AnyEntity, Entity, EntityRef, FieldValue, Registry, Shared,
};

use indexmap::IndexMap;
use rowmap_core::{
    driver::Connection,
    schema::{EntityType, Field, Schema},
    stmt::{Id, Value},
    Error, Result,
};
use rowmap_sql::{
    stmt::{Delete, Insert, Update},
    Serializer, Statement,
};
use tracing::debug;

use std::{cell::RefCell, collections::HashSet, fmt, rc::Rc};

/// The unit of work: snapshots entities, diffs them against their last
/// capture, and writes the difference.
///
/// `flush` does not recapture. Call [`capture`](Persister::capture) again
/// after a flush to make the written state the new baseline.
pub struct Persister {
    connection: Rc<dyn Connection>,
    registry: Registry,
    serializer: Serializer,
    events: Rc<dyn EventSink>,
    tracker: RefCell<ChangeTracker>,
}

/// Entities of one flush waiting to be written, grouped by column list.
type Batches = IndexMap<Vec<String>, Vec<(EntityRef, EntitySnapshot)>>;

impl Persister {
    pub fn new(
        connection: Rc<dyn Connection>,
        registry: Registry,
        events: Rc<dyn EventSink>,
    ) -> Persister {
        let serializer = Serializer::new(connection.capability());

        Persister {
            connection,
            registry,
            serializer,
            events,
            tracker: RefCell::new(ChangeTracker::new()),
        }
    }

    /// Record the current state of `entities` as their baseline.
    pub fn capture<E: Entity>(&self, entities: &[Shared<E>]) -> Result<()> {
        self.capture_dyn(&erase(entities))
    }

    pub fn capture_dyn(&self, entities: &[EntityRef]) -> Result<()> {
        self.tracker.borrow_mut().prune();

        for entity in entities {
            let schema = self.schema_of(&**entity)?;
            let snapshot = self.snapshot(&schema, &**entity)?;
            self.tracker.borrow_mut().insert(entity, snapshot);
        }

        Ok(())
    }

    /// Write the changes of `entities` since their last capture.
    pub fn flush<E: Entity>(&self, entities: &[Shared<E>]) -> Result<()> {
        self.flush_dyn(&erase(entities))
    }

    pub fn flush_dyn(&self, entities: &[EntityRef]) -> Result<()> {
        if entities.is_empty() {
            return Ok(());
        }

        let schema = self.schema_of(single_type(entities)?)?;

        let mut inserts = Batches::new();
        let mut updates = Batches::new();

        for entity in entities {
            self.events.dispatch(&Event::BeforeDump {
                entity: entity.clone(),
            });

            let snapshot = self.snapshot(&schema, &**entity)?;

            let (mode, change) = {
                let tracker = self.tracker.borrow();
                let prior = tracker.get(entity);

                let insert = if schema.is_auto_increment() {
                    snapshot.id.is_none()
                } else {
                    prior.is_none()
                };

                if insert {
                    (Mode::Insert, insert_change(&schema, &snapshot))
                } else {
                    let prior = prior.ok_or_else(|| {
                        Error::logic(format!(
                            "`{}` entity must be captured before it can be updated",
                            schema.entity
                        ))
                    })?;
                    (Mode::Update, update_change(&schema, &snapshot, prior))
                }
            };

            if change.is_empty() {
                continue;
            }

            self.events.dispatch(&Event::Change(ChangeEvent {
                entity: entity.clone(),
                change: change.clone(),
                mode,
            }));

            let batches = match mode {
                Mode::Insert => &mut inserts,
                Mode::Update => &mut updates,
            };

            batches
                .entry(change.column_names())
                .or_default()
                .push((entity.clone(), change));
        }

        for (columns, batch) in inserts {
            self.execute_inserts(&schema, columns, batch)?;
        }

        for (columns, batch) in updates {
            self.execute_updates(&schema, columns, batch)?;
        }

        Ok(())
    }

    /// Delete the rows of `entities` and stop tracking them.
    pub fn delete<E: Entity>(&self, entities: &[Shared<E>]) -> Result<()> {
        self.delete_dyn(&erase(entities))
    }

    pub fn delete_dyn(&self, entities: &[EntityRef]) -> Result<()> {
        if entities.is_empty() {
            return Ok(());
        }

        let schema = self.schema_of(single_type(entities)?)?;
        let id_field = schema.id_field();

        let ids = entities
            .iter()
            .map(|entity| {
                let value = entity
                    .dump_field(&id_field.name)
                    .and_then(|value| dump_value(id_field, value))?;

                if value.is_null() {
                    return Err(Error::logic(format!(
                        "cannot delete a `{}` entity without id",
                        schema.entity
                    )));
                }

                Ok(Id::from_value(&value)?.to_value())
            })
            .collect::<Result<Vec<_>>>()?;

        let stmt = Delete::new(&schema.table, schema.id_column(), ids.len());
        let sql = self.serializer.serialize(&stmt.into());

        debug!(sql = %sql, params = ids.len(), "delete");

        self.connection.prepare(&sql)?.execute(&ids)?;

        let mut tracker = self.tracker.borrow_mut();
        for entity in entities {
            tracker.remove(entity);
        }

        Ok(())
    }

    /// Snapshot of the entity's current state, without recording it.
    pub fn snapshot_of(&self, entity: &EntityRef) -> Result<EntitySnapshot> {
        let schema = self.schema_of(&**entity)?;
        self.snapshot(&schema, &**entity)
    }

    /// The last captured snapshot of `entity`.
    pub fn captured(&self, entity: &EntityRef) -> Option<EntitySnapshot> {
        self.tracker.borrow().get(entity).cloned()
    }

    pub fn is_tracked(&self, entity: &EntityRef) -> bool {
        self.tracker.borrow().contains(entity)
    }

    /// Stop tracking `entity`. The next flush treats it as never captured.
    pub fn forget(&self, entity: &EntityRef) -> bool {
        self.tracker.borrow_mut().remove(entity)
    }

    /// Live tracked entities, in capture order.
    pub fn tracked(&self) -> Vec<EntityRef> {
        self.tracker.borrow().live()
    }

    /// Drop snapshots of entities that are no longer alive.
    pub fn prune(&self) {
        self.tracker.borrow_mut().prune();
    }

    fn schema_of(&self, entity: &dyn AnyEntity) -> Result<Rc<Schema>> {
        self.registry
            .schema_for(entity.entity_type(), entity.declaration())
    }

    /// Dump every column field. The id column is only part of the data when
    /// the application assigns it.
    fn snapshot(&self, schema: &Schema, entity: &dyn AnyEntity) -> Result<EntitySnapshot> {
        let mut snapshot = EntitySnapshot::new(None);

        for field in schema.column_fields() {
            let value = entity
                .dump_field(&field.name)
                .and_then(|value| dump_value(field, value))
                .map_err(|err| err.context(format!("{}::{}", schema.entity, field.name)))?;

            if field.is_id() {
                if !value.is_null() {
                    snapshot.id = Some(Id::from_value(&value)?);
                }

                if field.is_auto_increment() {
                    continue;
                }
            }

            snapshot.insert(field.column_name(), value);
        }

        Ok(snapshot)
    }

    fn execute_inserts(
        &self,
        schema: &Schema,
        columns: Vec<String>,
        batch: Vec<(EntityRef, EntitySnapshot)>,
    ) -> Result<()> {
        let returning = self.connection.capability().returning && schema.is_auto_increment();

        let mut stmt = Insert::new(&schema.table, columns.clone());
        if returning {
            stmt = stmt.returning(schema.id_column());
        }

        let sql = self.serializer.serialize(&Statement::from(stmt));

        debug!(sql = %sql, params = columns.len(), rows = batch.len(), "insert");

        let mut prepared = self.connection.prepare(&sql)?;
        let id_field = schema.id_field();

        for (entity, change) in batch {
            prepared.execute(&params(&columns, &change))?;

            if id_field.is_to_one() {
                // Relation ids come back as unloaded references.
                if let Some(id) = change.id {
                    let reference = FieldValue::Item(ItemValue::Reference(id));
                    entity.load_field(&id_field.name, reference)?;
                }
                continue;
            }

            if !schema.is_auto_increment() {
                continue;
            }

            let key = if returning {
                prepared
                    .fetch_row()?
                    .and_then(|row| {
                        row.get(schema.id_column())
                            .or_else(|| row.get_index(0))
                            .cloned()
                    })
                    .unwrap_or_default()
            } else {
                self.connection.last_insert_id()?
            };

            assign_generated_id(schema, &entity, key)?;
        }

        Ok(())
    }

    fn execute_updates(
        &self,
        schema: &Schema,
        columns: Vec<String>,
        batch: Vec<(EntityRef, EntitySnapshot)>,
    ) -> Result<()> {
        let stmt = Update::new(&schema.table, columns.clone(), schema.id_column());
        let sql = self.serializer.serialize(&stmt.into());

        debug!(sql = %sql, params = columns.len() + 1, rows = batch.len(), "update");

        let mut prepared = self.connection.prepare(&sql)?;

        for (_, change) in batch {
            let Some(id) = &change.id else {
                return Err(Error::logic(format!(
                    "cannot update a `{}` entity without id",
                    schema.entity
                )));
            };

            let mut params = params(&columns, &change);
            params.push(id.to_value());
            prepared.execute(&params)?;
        }

        Ok(())
    }
}

/// Columns an insert writes: every writable column with a value.
fn insert_change(schema: &Schema, snapshot: &EntitySnapshot) -> EntitySnapshot {
    let writable = writable_columns(schema);
    snapshot.narrow(|column, value| writable.contains(column) && !value.is_null())
}

/// Columns an update writes. The row is addressed by its captured id, so an
/// application-assigned id can change.
fn update_change(
    schema: &Schema,
    snapshot: &EntitySnapshot,
    prior: &EntitySnapshot,
) -> EntitySnapshot {
    let writable = writable_columns(schema);
    let mut change = snapshot
        .changed_since(prior)
        .narrow(|column, _| writable.contains(column));

    if !schema.is_auto_increment() {
        change.id = prior.id.clone().or(change.id);
    }

    change
}

fn writable_columns(schema: &Schema) -> HashSet<&str> {
    schema.writable_fields().map(Field::column_name).collect()
}

fn params(columns: &[String], change: &EntitySnapshot) -> Vec<Value> {
    columns
        .iter()
        .map(|column| change.get(column).cloned().unwrap_or_default())
        .collect()
}

/// Field value -> column value, reducing relation items to their foreign id.
fn dump_value(field: &Field, value: FieldValue) -> Result<Value> {
    if !field.is_to_one() {
        return convert::dump(field, value);
    }

    match value {
        FieldValue::Item(item) => match item.id() {
            Some(id) => Ok(id.to_value()),
            None => Err(Error::logic("related entity has no id")),
        },
        FieldValue::Collection(_) => Err(Error::mapping("expected item, found collection")),
        other => convert::dump(field, other),
    }
}

fn assign_generated_id(schema: &Schema, entity: &EntityRef, key: Value) -> Result<()> {
    if key.is_null() {
        return Err(Error::logic(format!(
            "insert of `{}` returned no generated key",
            schema.entity
        )));
    }

    let field = schema.id_field();
    let value = convert::hydrate(field, key, &mut DateCache::new())?;

    entity.load_field(&field.name, value)
}

/// The one concrete type shared by `entities`.
fn single_type(entities: &[EntityRef]) -> Result<&dyn AnyEntity> {
    let Some(first) = entities.first() else {
        return Err(Error::logic("empty entity batch"));
    };
    let expected: EntityType = first.entity_type();

    for entity in &entities[1..] {
        let found = entity.entity_type();
        if found != expected {
            return Err(Error::type_mismatch(expected.name, found.name));
        }
    }

    Ok(&**first)
}

fn erase<E: Entity>(entities: &[Shared<E>]) -> Vec<EntityRef> {
    entities
        .iter()
        .map(|entity| entity.clone() as EntityRef)
        .collect()
}

impl fmt::Debug for Persister {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Persister")
            .field("registry", &self.registry)
            .field("tracked", &self.tracker.borrow().len())
            .finish()
    }
}
