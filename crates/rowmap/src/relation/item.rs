use super::LazyItem;
use crate::{entity::ItemValue, Entity, Shared};

use rowmap_core::{schema::EntityType, stmt::Id, Error, Result};

use std::{fmt, rc::Rc};

/// The value of a `ManyToOne` or `OneToOne` field.
pub enum Item<T> {
    /// A concrete entity
    Loaded(Shared<T>),

    /// Resolved from the foreign id on first access
    Lazy(Rc<LazyItem<T>>),

    /// Only the id is known; the entity cannot be resolved through this item
    Unloaded(Id),
}

impl<T: Entity> Item<T> {
    pub fn loaded(entity: Shared<T>) -> Item<T> {
        Item::Loaded(entity)
    }

    pub fn unloaded(id: impl Into<Id>) -> Item<T> {
        Item::Unloaded(id.into())
    }

    /// Id of the referenced entity.
    pub fn id(&self) -> Result<Id> {
        match self {
            Item::Loaded(entity) => {
                let entity = entity.try_borrow().map_err(|_| {
                    Error::logic(format!(
                        "`{}` is mutably borrowed elsewhere",
                        EntityType::of::<T>()
                    ))
                })?;

                entity.id().ok_or_else(|| {
                    Error::logic(format!("`{}` entity has no id", EntityType::of::<T>()))
                })
            }
            Item::Lazy(lazy) => Ok(lazy.id().clone()),
            Item::Unloaded(id) => Ok(id.clone()),
        }
    }

    /// The referenced entity, resolving a lazy item if needed.
    pub fn get(&self) -> Result<Shared<T>> {
        match self {
            Item::Loaded(entity) => Ok(entity.clone()),
            Item::Lazy(lazy) => lazy.resolve(),
            Item::Unloaded(id) => Err(Error::logic(format!(
                "unloaded items only know their id; `{}` {id} cannot be resolved",
                EntityType::of::<T>()
            ))),
        }
    }

    /// True when the entity is available without a query.
    pub fn is_loaded(&self) -> bool {
        match self {
            Item::Loaded(_) => true,
            Item::Lazy(lazy) => lazy.is_resolved(),
            Item::Unloaded(_) => false,
        }
    }

    pub(crate) fn to_item_value(&self) -> ItemValue {
        match self {
            Item::Loaded(entity) => {
                ItemValue::Loaded(entity.try_borrow().ok().and_then(|entity| entity.id()))
            }
            Item::Lazy(lazy) => ItemValue::Reference(lazy.id().clone()),
            Item::Unloaded(id) => ItemValue::Reference(id.clone()),
        }
    }
}

impl<T> Clone for Item<T> {
    fn clone(&self) -> Self {
        match self {
            Item::Loaded(entity) => Item::Loaded(entity.clone()),
            Item::Lazy(lazy) => Item::Lazy(lazy.clone()),
            Item::Unloaded(id) => Item::Unloaded(id.clone()),
        }
    }
}

impl<T> From<Shared<T>> for Item<T> {
    fn from(entity: Shared<T>) -> Self {
        Item::Loaded(entity)
    }
}

impl<T: fmt::Debug> fmt::Debug for Item<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Loaded(entity) => match entity.try_borrow() {
                Ok(entity) => fmt.debug_tuple("Loaded").field(&*entity).finish(),
                Err(_) => fmt.write_str("Loaded(<borrowed>)"),
            },
            Item::Lazy(lazy) => write!(fmt, "Lazy({})", lazy.id()),
            Item::Unloaded(id) => write!(fmt, "Unloaded({id})"),
        }
    }
}
