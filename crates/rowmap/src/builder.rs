use crate::{
    event::{EventSink, NoopEvents},
    schema::EntityDecl,
    Entity, EntityManager, Hydrator, Persister, Registry,
};

use rowmap_core::{driver::Connection, schema::EntityType, Result};
use tracing::debug;

use std::rc::Rc;

#[derive(Default)]
pub struct Builder {
    /// Registered entity types, validated on build
    entities: Vec<(EntityType, fn() -> EntityDecl)>,

    table_name_prefix: String,

    events: Option<Rc<dyn EventSink>>,
}

impl Builder {
    pub fn register<E: Entity>(&mut self) -> &mut Self {
        self.entities.push((EntityType::of::<E>(), E::declare));
        self
    }

    /// Set the table name prefix for all tables
    pub fn table_name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.table_name_prefix = prefix.to_string();
        self
    }

    /// Receiver of persister events. Events are discarded by default.
    pub fn events(&mut self, events: impl EventSink + 'static) -> &mut Self {
        self.events = Some(Rc::new(events));
        self
    }

    pub fn build(&mut self, connection: impl Connection) -> Result<EntityManager> {
        let connection: Rc<dyn Connection> = Rc::new(connection);
        let registry = Registry::with_table_name_prefix(&self.table_name_prefix);

        for (entity, declare) in &self.entities {
            registry.register_for(*entity, *declare)?;
        }

        debug!(
            entities = self.entities.len(),
            dialect = ?connection.capability().dialect,
            "entity manager ready"
        );

        let events = self
            .events
            .clone()
            .unwrap_or_else(|| Rc::new(NoopEvents));

        let hydrator = Hydrator::new(connection.clone(), registry.clone());
        let persister = Persister::new(connection.clone(), registry.clone(), events);

        Ok(EntityManager::new(connection, registry, hydrator, persister))
    }
}
