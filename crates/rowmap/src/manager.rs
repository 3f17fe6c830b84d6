use crate::{
    Builder, Entity, EntityRef, Hydrator, Persister, Registry, Shared,
};

use indexmap::IndexMap;
use rowmap_core::{
    driver::Connection,
    stmt::{Id, Value},
    Error, Result,
};

use std::{any::TypeId, fmt, rc::Rc};

/// Entry point tying a connection to a hydrator and a persister.
pub struct EntityManager {
    connection: Rc<dyn Connection>,
    registry: Registry,
    hydrator: Hydrator,
    persister: Persister,
}

impl EntityManager {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn new(
        connection: Rc<dyn Connection>,
        registry: Registry,
        hydrator: Hydrator,
        persister: Persister,
    ) -> EntityManager {
        EntityManager {
            connection,
            registry,
            hydrator,
            persister,
        }
    }

    pub fn connection(&self) -> &Rc<dyn Connection> {
        &self.connection
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn hydrator(&self) -> &Hydrator {
        &self.hydrator
    }

    pub fn persister(&self) -> &Persister {
        &self.persister
    }

    /// The entity with `id`, or `None`.
    pub fn find<E: Entity>(&self, id: impl Into<Id>, for_update: bool) -> Result<Option<Shared<E>>> {
        Ok(self
            .find_by_ids::<E>(&[id.into()], for_update)?
            .into_iter()
            .next())
    }

    /// Entities whose id is in `ids`, in row order. Live instances are
    /// reused.
    pub fn find_by_ids<E: Entity>(&self, ids: &[Id], for_update: bool) -> Result<Vec<Shared<E>>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let schema = self.registry.schema::<E>()?;
        let values: Vec<Value> = ids.iter().map(Id::to_value).collect();

        self.hydrator
            .select::<E>(schema.id_column(), &values, for_update, true)
    }

    /// Select the entity's row again with a row lock.
    pub fn lock_for_update<E: Entity>(&self, entity: &Shared<E>) -> Result<()> {
        let id = entity
            .try_borrow()
            .map_err(|_| Error::logic("entity is mutably borrowed elsewhere"))?
            .id()
            .ok_or_else(|| Error::logic("cannot lock an entity without id"))?;

        self.find_by_ids::<E>(&[id], true)?;
        Ok(())
    }

    pub fn begin_transaction(&self) -> Result<()> {
        self.connection.begin_transaction()
    }

    pub fn commit(&self) -> Result<()> {
        self.connection.commit()
    }

    pub fn rollback(&self) -> Result<()> {
        self.connection.rollback()
    }

    pub fn capture<E: Entity>(&self, entities: &[Shared<E>]) -> Result<()> {
        self.persister.capture(entities)
    }

    pub fn flush<E: Entity>(&self, entities: &[Shared<E>]) -> Result<()> {
        self.persister.flush(entities)
    }

    pub fn delete<E: Entity>(&self, entities: &[Shared<E>]) -> Result<()> {
        self.persister.delete(entities)
    }

    /// Flush every live tracked entity, one batch per type, then recapture
    /// them so the written state becomes the new baseline.
    pub fn flush_tracked(&self) -> Result<()> {
        let tracked = self.persister.tracked();

        let mut by_type: IndexMap<TypeId, Vec<EntityRef>> = IndexMap::new();
        for entity in &tracked {
            by_type
                .entry(entity.entity_type().id)
                .or_default()
                .push(entity.clone());
        }

        for entities in by_type.values() {
            self.persister.flush_dyn(entities)?;
        }

        self.persister.capture_dyn(&tracked)
    }
}

impl fmt::Debug for EntityManager {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("EntityManager")
            .field("connection", &self.connection)
            .field("hydrator", &self.hydrator)
            .field("persister", &self.persister)
            .finish()
    }
}
