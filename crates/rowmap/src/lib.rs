mod builder;
pub use builder::Builder;

pub mod convert;

pub mod entity;
pub use entity::{AnyEntity, DbEnum, Entity, EntityRef, FieldValue, Shared};

pub mod event;
pub use event::{Event, EventSink};

pub mod hydrator;
pub use hydrator::Hydrator;

mod manager;
pub use manager::EntityManager;

pub mod persister;
pub use persister::{EntitySnapshot, Persister};

pub mod registry;
pub use registry::Registry;

pub mod relation;
pub use relation::{Collection, Item, LazyItem};

pub mod schema;

pub use rowmap_core::{
    bail, driver, err,
    stmt::{Id, Row, Value},
    Error, Result,
};

/// Wrap an entity for sharing with the engine.
pub fn shared<E: Entity>(entity: E) -> Shared<E> {
    std::rc::Rc::new(std::cell::RefCell::new(entity))
}
