use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rowmap::{Id, Item, Row, Value};
use tests::{models::*, setup, LoggingConnection, ScriptedConnection};

use std::rc::Rc;

fn company_row(id: i64, name: &str) -> Row {
    Row::new()
        .with("id", id)
        .with("name", name)
        .with("founded", Value::Null)
}

fn person_row(id: i64, name: &str, company_id: Option<i64>) -> Row {
    Row::new()
        .with("id", id)
        .with("name", name)
        .with("status", "active")
        .with("company_id", company_id.map(Value::I64).unwrap_or_default())
}

#[test]
fn live_instances_are_reused() {
    let db = setup(ScriptedConnection::sqlite());
    let hydrator = db.hydrator();

    let first = hydrator
        .hydrate_all::<Company, _>(vec![company_row(1, "Acme")], true)
        .unwrap();
    let again = hydrator
        .hydrate_all::<Company, _>(vec![company_row(1, "Renamed")], true)
        .unwrap();

    assert!(Rc::ptr_eq(&first[0], &again[0]));
    // The live instance is returned untouched
    assert_eq!(first[0].borrow().name, "Acme");
}

#[test]
fn reuse_disabled_builds_fresh_instances() {
    let db = setup(ScriptedConnection::sqlite());
    let hydrator = db.hydrator();

    let first = hydrator
        .hydrate_all::<Company, _>(vec![company_row(1, "Acme")], true)
        .unwrap();
    let fresh = hydrator
        .hydrate_all::<Company, _>(vec![company_row(1, "Renamed")], false)
        .unwrap();

    assert!(!Rc::ptr_eq(&first[0], &fresh[0]));
    assert_eq!(fresh[0].borrow().name, "Renamed");
}

#[test]
fn identity_map_does_not_keep_entities_alive() {
    let db = setup(ScriptedConnection::sqlite());
    let hydrator = db.hydrator();
    let id = Id::from(1_i64);

    let companies = hydrator
        .hydrate_all::<Company, _>(vec![company_row(1, "Acme")], true)
        .unwrap();
    assert!(hydrator.identity::<Company>(&id).is_some());

    drop(companies);
    assert!(hydrator.identity::<Company>(&id).is_none());
}

#[test]
fn identity_map_growth_follows_the_live_set() {
    let db = setup(ScriptedConnection::sqlite());
    let hydrator = db.hydrator();

    let kept = hydrator
        .hydrate_all::<Company, _>(vec![company_row(1, "Acme")], true)
        .unwrap();

    for id in 2..1002 {
        let dropped = hydrator
            .hydrate_all::<Company, _>(vec![company_row(id, "Temp")], true)
            .unwrap();
        drop(dropped);
    }

    assert!(hydrator.cached_identities() < 64, "{hydrator:?}");
    assert!(Rc::ptr_eq(
        &hydrator.identity::<Company>(&Id::from(1_i64)).unwrap(),
        &kept[0]
    ));
}

#[test]
fn identities_are_per_type() {
    let db = setup(ScriptedConnection::sqlite());
    let hydrator = db.hydrator();

    let _company = hydrator
        .hydrate_all::<Company, _>(vec![company_row(1, "Acme")], true)
        .unwrap();

    assert!(hydrator.identity::<Person>(&Id::from(1_i64)).is_none());
}

#[test]
fn missing_nullable_column_hydrates_null() {
    let db = setup(ScriptedConnection::sqlite());

    let row = Row::new().with("id", 1_i64).with("name", "Acme");
    let companies = db
        .hydrator()
        .hydrate_all::<Company, _>(vec![row], true)
        .unwrap();

    assert_eq!(companies[0].borrow().founded, None);
}

#[test]
fn missing_required_column_is_a_mapping_error() {
    let db = setup(ScriptedConnection::sqlite());

    let row = Row::new().with("id", 1_i64);
    let err = db
        .hydrator()
        .hydrate_all::<Company, _>(vec![row], true)
        .unwrap_err();

    assert!(err.is_mapping());
    assert!(err.to_string().starts_with("Company::name: "), "{err}");
}

#[test]
fn dates_are_parsed() {
    let db = setup(ScriptedConnection::sqlite());

    let rows = vec![
        company_row(1, "Acme").with("founded", "1999-03-04"),
        company_row(2, "Globex").with("founded", "1989-12-31 08:30:00"),
    ];
    let companies = db
        .hydrator()
        .hydrate_all::<Company, _>(rows, true)
        .unwrap();

    assert_eq!(
        companies[0].borrow().founded,
        NaiveDate::from_ymd_opt(1999, 3, 4)
    );
    assert_eq!(
        companies[1].borrow().founded,
        NaiveDate::from_ymd_opt(1989, 12, 31)
    );
}

#[test]
fn undeclared_enum_variant_is_rejected() {
    let db = setup(ScriptedConnection::sqlite());

    let row = person_row(1, "Ann", None).with("status", "deleted");
    let err = db
        .hydrator()
        .hydrate_all::<Person, _>(vec![row], true)
        .unwrap_err();

    assert!(err.is_mapping());
    assert!(err.to_string().starts_with("Person::status: "), "{err}");
}

#[test]
fn rows_can_be_indexed_by_a_column() {
    let db = setup(ScriptedConnection::sqlite());

    let rows = vec![company_row(1, "Acme"), company_row(2, "Globex")];
    let indexed = db
        .hydrator()
        .hydrate::<Company, _>(rows, true)
        .unwrap()
        .indexed_by("name")
        .collect::<rowmap::Result<Vec<_>>>()
        .unwrap();

    let keys: Vec<_> = indexed.iter().map(|(key, _)| key.clone()).collect();
    assert_eq!(keys, vec![Value::from("Acme"), Value::from("Globex")]);
    assert_eq!(indexed[1].1.borrow().id, Some(2));
}

#[test]
fn hydrating_relations_runs_no_queries() {
    let connection = LoggingConnection::new(ScriptedConnection::sqlite());
    let log = connection.log();
    let db = setup(connection);

    let people = db
        .hydrator()
        .hydrate_all::<Person, _>(
            vec![
                person_row(1, "Ann", Some(7)),
                person_row(2, "Bob", Some(7)),
                person_row(3, "Cid", None),
            ],
            true,
        )
        .unwrap();

    assert!(log.is_empty());

    let ann = people[0].borrow();
    let bob = people[1].borrow();

    match (&ann.company, &bob.company) {
        (Some(Item::Lazy(a)), Some(Item::Lazy(b))) => {
            assert!(Rc::ptr_eq(a, b));
            assert!(!a.is_resolved());
        }
        other => panic!("expected lazy items; got {other:?}"),
    }
    assert_eq!(format!("{:?}", ann.company), "Some(Lazy(7))");

    assert!(people[2].borrow().company.is_none());
}

#[test]
fn lazy_item_resolves_once() {
    let scripted = ScriptedConnection::sqlite();
    let script = scripted.script();
    let connection = LoggingConnection::new(scripted);
    let log = connection.log();
    let db = setup(connection);

    let people = db
        .hydrator()
        .hydrate_all::<Person, _>(
            vec![person_row(1, "Ann", Some(7)), person_row(2, "Bob", Some(7))],
            true,
        )
        .unwrap();

    script.push(vec![company_row(7, "Acme")]);

    let via_ann = people[0].borrow().company.as_ref().unwrap().get().unwrap();
    let via_bob = people[1].borrow().company.as_ref().unwrap().get().unwrap();

    assert!(Rc::ptr_eq(&via_ann, &via_bob));
    assert_eq!(via_ann.borrow().name, "Acme");

    assert_eq!(log.len(), 1);
    assert_eq!(
        log.pop(),
        Some((
            r#"SELECT * FROM "companies" WHERE "id" IN (?)"#.to_string(),
            vec![Value::I64(7)]
        ))
    );
}

#[test]
fn lazy_item_without_row_is_not_found() {
    let db = setup(ScriptedConnection::sqlite());

    let people = db
        .hydrator()
        .hydrate_all::<Person, _>(vec![person_row(1, "Ann", Some(7))], true)
        .unwrap();

    let err = people[0]
        .borrow()
        .company
        .as_ref()
        .unwrap()
        .get()
        .unwrap_err();

    assert!(err.is_not_found());
}

#[test]
fn collections_load_on_first_access() {
    let scripted = ScriptedConnection::sqlite();
    let script = scripted.script();
    let connection = LoggingConnection::new(scripted);
    let log = connection.log();
    let db = setup(connection);

    let companies = db
        .hydrator()
        .hydrate_all::<Company, _>(vec![company_row(1, "Acme")], true)
        .unwrap();
    let acme = companies[0].borrow();

    assert!(!acme.employees.is_loaded());
    assert!(log.is_empty());

    script.push(vec![
        person_row(1, "Ann", Some(1)),
        person_row(2, "Bob", Some(1)),
    ]);

    assert_eq!(acme.employees.len().unwrap(), 2);
    assert!(acme.employees.is_loaded());
    assert!(!acme.employees.has_changed());

    // Already loaded
    assert_eq!(acme.employees.len().unwrap(), 2);

    assert_eq!(
        log.sql(),
        vec![r#"SELECT * FROM "people" WHERE "company_id" IN (?)"#.to_string()]
    );
}
