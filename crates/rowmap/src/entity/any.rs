use super::{Entity, FieldValue};
use crate::schema::EntityDecl;

use rowmap_core::{schema::EntityType, stmt::Id, Error, Result};

use std::{any::Any, cell::RefCell, rc::Rc};

/// A shared entity of any type.
pub type EntityRef = Rc<dyn AnyEntity>;

/// Object-safe view of a shared entity.
///
/// Implemented for `RefCell<E>`, so any `Shared<E>` coerces to an
/// [`EntityRef`].
pub trait AnyEntity: Any {
    fn entity_type(&self) -> EntityType;

    /// The declaration function of the concrete type.
    fn declaration(&self) -> fn() -> EntityDecl;

    fn entity_id(&self) -> Result<Option<Id>>;

    fn load_field(&self, name: &str, value: FieldValue) -> Result<()>;

    fn dump_field(&self, name: &str) -> Result<FieldValue>;

    fn as_any(&self) -> &dyn Any;
}

impl<E: Entity> AnyEntity for RefCell<E> {
    fn entity_type(&self) -> EntityType {
        EntityType::of::<E>()
    }

    fn declaration(&self) -> fn() -> EntityDecl {
        E::declare
    }

    fn entity_id(&self) -> Result<Option<Id>> {
        Ok(borrow(self)?.id())
    }

    fn load_field(&self, name: &str, value: FieldValue) -> Result<()> {
        let mut entity = self.try_borrow_mut().map_err(|_| {
            Error::logic(format!(
                "`{}` is borrowed while loading `{name}`",
                EntityType::of::<E>()
            ))
        })?;

        entity.load_field(name, value)
    }

    fn dump_field(&self, name: &str) -> Result<FieldValue> {
        borrow(self)?.dump_field(name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn borrow<E: Entity>(cell: &RefCell<E>) -> Result<std::cell::Ref<'_, E>> {
    cell.try_borrow().map_err(|_| {
        Error::logic(format!(
            "`{}` is mutably borrowed elsewhere",
            EntityType::of::<E>()
        ))
    })
}

/// Address of the shared allocation, used as a reference identity key.
pub(crate) fn address(entity: &EntityRef) -> usize {
    Rc::as_ptr(entity) as *const () as usize
}

