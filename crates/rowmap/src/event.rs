//! Notifications emitted by the persister.

use crate::{persister::EntitySnapshot, EntityRef};

use std::{cell::RefCell, fmt, rc::Rc};

/// Receives persister events. Dispatch is fire-and-forget.
pub trait EventSink {
    fn dispatch(&self, event: &Event);
}

#[derive(Clone)]
pub enum Event {
    /// An entity is about to be snapshotted by `flush`.
    BeforeDump { entity: EntityRef },

    /// An entity will be written. Emitted before any statement runs.
    Change(ChangeEvent),
}

#[derive(Clone)]
pub struct ChangeEvent {
    pub entity: EntityRef,

    /// The columns that will be written
    pub change: EntitySnapshot,

    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Insert,
    Update,
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl EventSink for NoopEvents {
    fn dispatch(&self, _: &Event) {}
}

/// Keeps every event for later inspection.
#[derive(Default)]
pub struct RecordingEvents {
    events: RefCell<Vec<Event>>,
}

impl RecordingEvents {
    pub fn new() -> RecordingEvents {
        RecordingEvents::default()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl EventSink for RecordingEvents {
    fn dispatch(&self, event: &Event) {
        self.events.borrow_mut().push(event.clone());
    }
}

impl<T: EventSink + ?Sized> EventSink for Rc<T> {
    fn dispatch(&self, event: &Event) {
        (**self).dispatch(event)
    }
}

impl Event {
    pub fn entity(&self) -> &EntityRef {
        match self {
            Event::BeforeDump { entity } => entity,
            Event::Change(change) => &change.entity,
        }
    }

    pub fn as_change(&self) -> Option<&ChangeEvent> {
        match self {
            Event::Change(change) => Some(change),
            Event::BeforeDump { .. } => None,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::BeforeDump { entity } => fmt
                .debug_struct("BeforeDump")
                .field("entity", &entity.entity_type())
                .finish(),
            Event::Change(change) => change.fmt(fmt),
        }
    }
}

impl fmt::Debug for ChangeEvent {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Change")
            .field("entity", &self.entity.entity_type())
            .field("change", &self.change)
            .field("mode", &self.mode)
            .finish()
    }
}
