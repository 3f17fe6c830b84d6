mod any;
pub use any::{AnyEntity, EntityRef};
pub(crate) use any::address;

mod db_enum;
pub use db_enum::DbEnum;

mod field_value;
pub use field_value::{CollectionValue, FieldValue, ItemValue, PendingCollection, PendingItem};
pub(crate) use field_value::check_target;

use crate::schema::EntityDecl;

use rowmap_core::{stmt::Id, Result};

use std::{cell::RefCell, rc::Rc};

/// A live entity, shared between application code and the engine.
pub type Shared<E> = Rc<RefCell<E>>;

/// An application type mapped to one table row.
///
/// Implementations are usually one match arm per mapped field:
///
/// ```ignore
/// impl Entity for Company {
///     fn declare() -> EntityDecl {
///         EntityDecl::new("companies")
///             .field(FieldDecl::new("id").ty(FieldTy::Int).auto_increment())
///             .field(FieldDecl::new("name").mapped())
///     }
///
///     fn blank() -> Self {
///         Company::default()
///     }
///
///     fn id(&self) -> Option<Id> {
///         self.id.map(Id::from)
///     }
///
///     fn load_field(&mut self, name: &str, value: FieldValue) -> Result<()> {
///         match name {
///             "id" => self.id = value.try_into()?,
///             "name" => self.name = value.try_into()?,
///             _ => bail!("unknown field `{name}`"),
///         }
///         Ok(())
///     }
///
///     fn dump_field(&self, name: &str) -> Result<FieldValue> {
///         Ok(match name {
///             "id" => self.id.into(),
///             "name" => self.name.clone().into(),
///             _ => bail!("unknown field `{name}`"),
///         })
///     }
/// }
/// ```
pub trait Entity: Sized + 'static {
    /// Raw declaration of the entity's table and fields.
    fn declare() -> EntityDecl;

    /// An instance whose fields are about to be populated by hydration. No
    /// application invariants are expected to hold yet.
    fn blank() -> Self;

    /// Identity of the entity, `None` until it has been inserted.
    fn id(&self) -> Option<Id>;

    /// Set a mapped field from its runtime value.
    fn load_field(&mut self, name: &str, value: FieldValue) -> Result<()>;

    /// Current runtime value of a mapped field.
    fn dump_field(&self, name: &str) -> Result<FieldValue>;
}
