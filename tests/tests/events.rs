use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rowmap::{
    event::{Mode, RecordingEvents},
    shared, Event, EventSink, Value,
};
use tests::{models::*, setup_with_events, LoggingConnection, ScriptedConnection};

use std::{cell::RefCell, rc::Rc};

#[test]
fn events_precede_each_write() {
    let events = Rc::new(RecordingEvents::new());
    let db = setup_with_events(ScriptedConnection::sqlite(), events.clone());

    let acme = shared(Company::new("Acme"));
    let globex = shared(Company::new("Globex"));
    db.flush(&[acme.clone(), globex.clone()]).unwrap();

    let events = events.take();
    let kinds: Vec<_> = events
        .iter()
        .map(|event| match event {
            Event::BeforeDump { .. } => "before_dump",
            Event::Change(_) => "change",
        })
        .collect();

    assert_eq!(kinds, vec!["before_dump", "change", "before_dump", "change"]);

    let change = events[1].as_change().unwrap();
    assert_eq!(change.mode, Mode::Insert);
    assert_eq!(change.change.column_names(), vec!["name"]);
    assert_eq!(change.change.get("name"), Some(&Value::from("Acme")));

    let acme: rowmap::EntityRef = acme;
    assert!(Rc::ptr_eq(events[0].entity(), &acme));
}

#[test]
fn unchanged_entities_emit_no_change() {
    let events = Rc::new(RecordingEvents::new());
    let db = setup_with_events(ScriptedConnection::sqlite(), events.clone());

    let acme = shared(Company::new("Acme"));
    db.flush(&[acme.clone()]).unwrap();
    db.capture(&[acme.clone()]).unwrap();
    events.take();

    db.flush(&[acme.clone()]).unwrap();

    let events = events.take();
    assert_eq!(events.len(), 1);
    assert!(events[0].as_change().is_none());
}

#[test]
fn updates_report_their_mode() {
    let events = Rc::new(RecordingEvents::new());
    let db = setup_with_events(ScriptedConnection::sqlite(), events.clone());

    let acme = shared(Company::new("Acme"));
    db.flush(&[acme.clone()]).unwrap();
    db.capture(&[acme.clone()]).unwrap();
    acme.borrow_mut().name = "Acme Corp".to_string();
    events.take();

    db.flush(&[acme.clone()]).unwrap();

    let events = events.take();
    let change = events[1].as_change().unwrap();
    assert_eq!(change.mode, Mode::Update);
    assert_eq!(change.change.id, Some(rowmap::Id::from(1_i64)));
}

/// Fills in a founding date right before the entity is snapshotted.
struct StampFounded(NaiveDate);

impl EventSink for StampFounded {
    fn dispatch(&self, event: &Event) {
        let Event::BeforeDump { entity } = event else {
            return;
        };

        if let Some(company) = entity.as_any().downcast_ref::<RefCell<Company>>() {
            company.borrow_mut().founded.get_or_insert(self.0);
        }
    }
}

#[test]
fn before_dump_can_modify_the_entity() {
    let connection = LoggingConnection::new(ScriptedConnection::sqlite());
    let log = connection.log();
    let date = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
    let db = setup_with_events(connection, StampFounded(date));

    let acme = shared(Company::new("Acme"));
    db.flush(&[acme.clone()]).unwrap();

    assert_eq!(acme.borrow().founded, Some(date));
    assert_eq!(
        log.pop(),
        Some((
            r#"INSERT INTO "companies" ("name", "founded") VALUES (?, ?)"#.to_string(),
            vec![Value::from("Acme"), Value::from("2001-01-01")]
        ))
    );
}
