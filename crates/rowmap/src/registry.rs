use crate::{schema::EntityDecl, Entity};

use rowmap_core::{
    schema::{EntityType, Schema},
    Result,
};
use tracing::debug;

use std::{
    any::TypeId,
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
};

/// Builds schema descriptors on first use and caches them per type.
///
/// Cache entries are weak: a descriptor lives as long as something uses it.
/// Types registered through [`register`](Registry::register) are pinned for
/// the lifetime of the registry.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    table_name_prefix: String,
    cache: RefCell<HashMap<TypeId, Weak<Schema>>>,
    pinned: RefCell<HashMap<TypeId, Rc<Schema>>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// A registry that prefixes every table name.
    pub fn with_table_name_prefix(prefix: impl Into<String>) -> Registry {
        Registry {
            inner: Rc::new(Inner {
                table_name_prefix: prefix.into(),
                ..Inner::default()
            }),
        }
    }

    pub fn table_name_prefix(&self) -> &str {
        &self.inner.table_name_prefix
    }

    pub fn schema<E: Entity>(&self) -> Result<Rc<Schema>> {
        self.schema_for(EntityType::of::<E>(), E::declare)
    }

    /// Descriptor for an erased entity type.
    pub fn schema_for(&self, entity: EntityType, declare: fn() -> EntityDecl) -> Result<Rc<Schema>> {
        if let Some(schema) = self.cached(entity.id) {
            return Ok(schema);
        }

        let schema = Rc::new(declare().build(entity, &self.inner.table_name_prefix)?);

        debug!(
            entity = %entity,
            table = %schema.table,
            fields = schema.fields.len(),
            "built entity schema"
        );

        self.inner
            .cache
            .borrow_mut()
            .insert(entity.id, Rc::downgrade(&schema));

        Ok(schema)
    }

    /// Build the descriptor now and keep it alive.
    pub fn register<E: Entity>(&self) -> Result<Rc<Schema>> {
        self.register_for(EntityType::of::<E>(), E::declare)
    }

    pub(crate) fn register_for(
        &self,
        entity: EntityType,
        declare: fn() -> EntityDecl,
    ) -> Result<Rc<Schema>> {
        let schema = self.schema_for(entity, declare)?;
        self.inner
            .pinned
            .borrow_mut()
            .insert(entity.id, schema.clone());
        Ok(schema)
    }

    /// Discard the descriptor of `E`. The next lookup rebuilds it.
    pub fn evict<E: Entity>(&self) -> bool {
        let id = TypeId::of::<E>();
        let pinned = self.inner.pinned.borrow_mut().remove(&id).is_some();
        let cached = self.inner.cache.borrow_mut().remove(&id).is_some();
        pinned || cached
    }

    /// True when a live descriptor of `E` is cached.
    pub fn is_cached<E: Entity>(&self) -> bool {
        self.cached(TypeId::of::<E>()).is_some()
    }

    fn cached(&self, id: TypeId) -> Option<Rc<Schema>> {
        let mut cache = self.inner.cache.borrow_mut();

        match cache.get(&id).map(Weak::upgrade) {
            Some(Some(schema)) => Some(schema),
            Some(None) => {
                cache.remove(&id);
                None
            }
            None => None,
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt.debug_struct("Registry")
            .field("table_name_prefix", &self.inner.table_name_prefix)
            .field("cached", &self.inner.cache.borrow().len())
            .field("pinned", &self.inner.pinned.borrow().len())
            .finish()
    }
}
