use crate::{entity::PendingCollection, Entity, Shared};

use by_address::ByAddress;
use indexmap::IndexSet;
use rowmap_core::{Error, Result};
use tracing::debug;

use std::{
    cell::{Cell, RefCell},
    fmt,
};

/// The entities on the many side of a `OneToMany` field.
///
/// Ordered and free of duplicates, where two entities are equal only if they
/// are the same shared instance. A lazy collection queries its rows on the
/// first read or mutation. Mutating a collection never writes anything; flush
/// the affected entities to persist the change.
pub struct Collection<T> {
    state: RefCell<State<T>>,
    changed: Cell<bool>,
}

enum State<T> {
    Pending(PendingCollection),
    Loaded(IndexSet<ByAddress<Shared<T>>>),
}

impl<T: Entity> Collection<T> {
    /// An empty, materialized collection.
    pub fn new() -> Collection<T> {
        Collection::from_vec(vec![])
    }

    /// A materialized collection. Repeated instances are kept once.
    pub fn from_vec(entities: Vec<Shared<T>>) -> Collection<T> {
        Collection {
            state: RefCell::new(State::Loaded(entities.into_iter().map(ByAddress).collect())),
            changed: Cell::new(false),
        }
    }

    pub(crate) fn lazy(pending: PendingCollection) -> Collection<T> {
        Collection {
            state: RefCell::new(State::Pending(pending)),
            changed: Cell::new(false),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(&*self.state.borrow(), State::Loaded(_))
    }

    /// True once an `add` or `remove` changed the content.
    pub fn has_changed(&self) -> bool {
        self.changed.get()
    }

    /// Appends `entity` unless already present. Returns true if added.
    pub fn add(&self, entity: Shared<T>) -> Result<bool> {
        let added = self.with_loaded(|entities| entities.insert(ByAddress(entity)))?;
        self.mark(added);
        Ok(added)
    }

    /// Removes `entity`, keeping the order of the rest. Returns true if it
    /// was present.
    pub fn remove(&self, entity: &Shared<T>) -> Result<bool> {
        let removed =
            self.with_loaded(|entities| entities.shift_remove(&ByAddress(entity.clone())))?;
        self.mark(removed);
        Ok(removed)
    }

    pub fn contains(&self, entity: &Shared<T>) -> Result<bool> {
        self.with_loaded(|entities| entities.contains(&ByAddress(entity.clone())))
    }

    /// The entity at `index`, in insertion order.
    pub fn get(&self, index: usize) -> Result<Option<Shared<T>>> {
        self.with_loaded(|entities| entities.get_index(index).map(|entity| entity.0.clone()))
    }

    pub fn len(&self) -> Result<usize> {
        self.with_loaded(|entities| entities.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn to_vec(&self) -> Result<Vec<Shared<T>>> {
        self.with_loaded(|entities| {
            entities
                .iter()
                .map(|entity| entity.0.clone())
                .collect()
        })
    }

    /// Iterates over a snapshot of the content.
    pub fn iter(&self) -> Result<std::vec::IntoIter<Shared<T>>> {
        Ok(self.to_vec()?.into_iter())
    }

    fn mark(&self, changed: bool) {
        if changed {
            self.changed.set(true);
        }
    }

    fn with_loaded<R>(&self, f: impl FnOnce(&mut IndexSet<ByAddress<Shared<T>>>) -> R) -> Result<R> {
        self.load()?;

        match &mut *self.state.borrow_mut() {
            State::Loaded(entities) => Ok(f(entities)),
            State::Pending(_) => Err(Error::logic("collection failed to load")),
        }
    }

    fn load(&self) -> Result<()> {
        let pending = match &*self.state.borrow() {
            State::Pending(pending) => pending.clone(),
            State::Loaded(_) => return Ok(()),
        };

        let entities = pending.hydrator.select::<T>(
            &pending.relation.their_column,
            &[pending.owner.to_value()],
            false,
            true,
        )?;

        debug!(
            target_entity = %pending.relation.target,
            owner = %pending.owner,
            len = entities.len(),
            "loaded lazy collection"
        );

        *self.state.borrow_mut() = State::Loaded(entities.into_iter().map(ByAddress).collect());
        Ok(())
    }
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Collection::new()
    }
}

impl<T: Entity> From<Vec<Shared<T>>> for Collection<T> {
    fn from(entities: Vec<Shared<T>>) -> Self {
        Collection::from_vec(entities)
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.borrow() {
            State::Pending(pending) => write!(fmt, "Collection(<not loaded, owner={}>)", pending.owner),
            State::Loaded(entities) => write!(fmt, "Collection(len={})", entities.len()),
        }
    }
}
