use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rowmap::{shared, EntityRef, Id, Item, Row, Value};
use tests::{models::*, setup, ExecLog, LoggingConnection, ScriptedConnection};

fn logged(connection: ScriptedConnection) -> (rowmap::EntityManager, ExecLog) {
    let connection = LoggingConnection::new(connection);
    let log = connection.log();
    (setup(connection), log)
}

fn hydrated_company(db: &rowmap::EntityManager, id: i64, name: &str) -> rowmap::Shared<Company> {
    let row = Row::new()
        .with("id", id)
        .with("name", name)
        .with("founded", Value::Null);

    db.hydrator()
        .hydrate_all::<Company, _>(vec![row], true)
        .unwrap()
        .remove(0)
}

#[test]
fn inserts_are_grouped_by_column_list() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let acme = shared(Company::new("Acme"));
    acme.borrow_mut().founded = NaiveDate::from_ymd_opt(1999, 3, 4);
    let globex = shared(Company::new("Globex"));
    let initech = shared(Company::new("Initech"));

    db.flush(&[acme.clone(), globex.clone(), initech.clone()])
        .unwrap();

    assert_eq!(
        log.prepared(),
        vec![
            r#"INSERT INTO "companies" ("name", "founded") VALUES (?, ?)"#.to_string(),
            r#"INSERT INTO "companies" ("name") VALUES (?)"#.to_string(),
        ]
    );

    let params: Vec<_> = log.with_ops(|ops| ops.iter().map(|op| op.params.clone()).collect());
    assert_eq!(
        params,
        vec![
            vec![Value::from("Acme"), Value::from("1999-03-04")],
            vec![Value::from("Globex")],
            vec![Value::from("Initech")],
        ]
    );

    assert_eq!(acme.borrow().id, Some(1));
    assert_eq!(globex.borrow().id, Some(2));
    assert_eq!(initech.borrow().id, Some(3));
}

#[test]
fn generated_keys_are_returned_when_supported() {
    let (db, log) = logged(ScriptedConnection::postgresql());

    let acme = shared(Company::new("Acme"));
    db.flush(&[acme.clone()]).unwrap();

    assert_eq!(
        log.sql(),
        vec![r#"INSERT INTO "companies" ("name") VALUES ($1) RETURNING "id""#.to_string()]
    );
    assert_eq!(acme.borrow().id, Some(1));
}

#[test]
fn update_writes_only_changed_columns() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let acme = hydrated_company(&db, 1, "Acme");
    db.capture(&[acme.clone()]).unwrap();

    acme.borrow_mut().name = "Acme Corp".to_string();
    db.flush(&[acme.clone()]).unwrap();

    assert_eq!(
        log.pop(),
        Some((
            r#"UPDATE "companies" SET "name" = ? WHERE "id" = ?"#.to_string(),
            vec![Value::from("Acme Corp"), Value::I64(1)]
        ))
    );
    assert!(log.is_empty());
}

#[test]
fn unchanged_entities_are_not_written() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let acme = hydrated_company(&db, 1, "Acme");
    db.capture(&[acme.clone()]).unwrap();
    db.flush(&[acme.clone()]).unwrap();

    assert!(log.is_empty());
    assert!(log.prepared().is_empty());
}

#[test]
fn flush_keeps_the_captured_baseline() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let acme = hydrated_company(&db, 1, "Acme");
    db.capture(&[acme.clone()]).unwrap();
    acme.borrow_mut().name = "Acme Corp".to_string();

    db.flush(&[acme.clone()]).unwrap();
    db.flush(&[acme.clone()]).unwrap();
    assert_eq!(log.count("UPDATE"), 2);

    log.clear();
    db.capture(&[acme.clone()]).unwrap();
    db.flush(&[acme.clone()]).unwrap();
    assert!(log.is_empty());
}

#[test]
fn flush_tracked_recaptures() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let acme = hydrated_company(&db, 1, "Acme");
    let ann = shared(Person::new("Ann"));
    ann.borrow_mut().id = Some(5);
    db.capture(&[acme.clone()]).unwrap();
    db.capture(&[ann.clone()]).unwrap();

    acme.borrow_mut().name = "Acme Corp".to_string();
    ann.borrow_mut().name = "Anne".to_string();

    db.flush_tracked().unwrap();
    assert_eq!(
        log.sql(),
        vec![
            r#"UPDATE "companies" SET "name" = ? WHERE "id" = ?"#.to_string(),
            r#"UPDATE "people" SET "name" = ? WHERE "id" = ?"#.to_string(),
        ]
    );

    log.clear();
    db.flush_tracked().unwrap();
    assert!(log.is_empty());
}

#[test]
fn update_requires_a_capture() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let acme = hydrated_company(&db, 1, "Acme");
    let err = db.flush(&[acme]).unwrap_err();

    assert!(err.is_logic());
    assert!(log.is_empty());
}

#[test]
fn assigned_ids_insert_until_captured() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let georgia = shared(Country::new("GE", "Georgia"));
    db.flush(&[georgia.clone()]).unwrap();

    assert_eq!(
        log.pop(),
        Some((
            r#"INSERT INTO "countries" ("code", "name") VALUES (?, ?)"#.to_string(),
            vec![Value::from("GE"), Value::from("Georgia")]
        ))
    );

    db.capture(&[georgia.clone()]).unwrap();
    georgia.borrow_mut().code = "DE".to_string();
    georgia.borrow_mut().name = "Germany".to_string();
    db.flush(&[georgia.clone()]).unwrap();

    // The row is addressed by the captured id
    assert_eq!(
        log.pop(),
        Some((
            r#"UPDATE "countries" SET "code" = ?, "name" = ? WHERE "code" = ?"#.to_string(),
            vec![Value::from("DE"), Value::from("Germany"), Value::from("GE")]
        ))
    );
}

#[test]
fn numeric_looking_codes_are_bound_verbatim() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let bond = shared(Country::new("007", "Bond"));
    db.flush(&[bond.clone()]).unwrap();
    db.capture(&[bond.clone()]).unwrap();

    assert_eq!(
        log.pop(),
        Some((
            r#"INSERT INTO "countries" ("code", "name") VALUES (?, ?)"#.to_string(),
            vec![Value::from("007"), Value::from("Bond")]
        ))
    );

    bond.borrow_mut().name = "James".to_string();
    db.flush(&[bond.clone()]).unwrap();

    assert_eq!(
        log.pop(),
        Some((
            r#"UPDATE "countries" SET "name" = ? WHERE "code" = ?"#.to_string(),
            vec![Value::from("James"), Value::from("007")]
        ))
    );

    db.delete(&[bond]).unwrap();

    assert_eq!(
        log.pop(),
        Some((
            r#"DELETE FROM "countries" WHERE "code" IN (?)"#.to_string(),
            vec![Value::from("007")]
        ))
    );
}

#[test]
fn relation_ids_insert_until_captured() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let ann = shared(Person::new("Ann"));
    ann.borrow_mut().id = Some(5);
    let profile = shared(Profile::new(ann, "Hello"));

    db.flush(&[profile.clone()]).unwrap();

    assert_eq!(
        log.pop(),
        Some((
            r#"INSERT INTO "profiles" ("person_id", "bio") VALUES (?, ?)"#.to_string(),
            vec![Value::I64(5), Value::from("Hello")]
        ))
    );

    // The loaded person is replaced by a reference to the written id
    assert!(matches!(
        profile.borrow().person,
        Some(Item::Unloaded(Id::Int(5)))
    ));
}

#[test]
fn relation_ids_address_updates_and_deletes() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let profile = shared(Profile::new(Item::<Person>::unloaded(5_i64), "Hello"));
    db.capture(&[profile.clone()]).unwrap();

    let snapshot = db.persister().captured(&(profile.clone() as EntityRef)).unwrap();
    assert_eq!(snapshot.id, Some(Id::from(5_i64)));
    assert_eq!(snapshot.get("person_id"), Some(&Value::I64(5)));

    profile.borrow_mut().bio = "Goodbye".to_string();
    db.flush(&[profile.clone()]).unwrap();

    assert_eq!(
        log.pop(),
        Some((
            r#"UPDATE "profiles" SET "bio" = ? WHERE "person_id" = ?"#.to_string(),
            vec![Value::from("Goodbye"), Value::I64(5)]
        ))
    );

    db.delete(&[profile]).unwrap();

    assert_eq!(
        log.pop(),
        Some((
            r#"DELETE FROM "profiles" WHERE "person_id" IN (?)"#.to_string(),
            vec![Value::I64(5)]
        ))
    );
}

#[test]
fn relations_are_written_as_foreign_ids() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let acme = hydrated_company(&db, 4, "Acme");
    let ann = shared(Person::new("Ann"));
    ann.borrow_mut().company = Some(Item::loaded(acme));

    let bob = shared(Person::new("Bob"));
    bob.borrow_mut().status = Status::Retired;
    bob.borrow_mut().company = Some(Item::unloaded(9_i64));

    db.flush(&[ann.clone(), bob.clone()]).unwrap();

    let params: Vec<_> = log.with_ops(|ops| ops.iter().map(|op| op.params.clone()).collect());
    assert_eq!(
        log.prepared(),
        vec![r#"INSERT INTO "people" ("name", "status", "company_id") VALUES (?, ?, ?)"#.to_string()]
    );
    assert_eq!(
        params,
        vec![
            vec![Value::from("Ann"), Value::from("active"), Value::I64(4)],
            vec![Value::from("Bob"), Value::from("retired"), Value::I64(9)],
        ]
    );
}

#[test]
fn related_entity_without_id_is_rejected() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let ann = shared(Person::new("Ann"));
    ann.borrow_mut().company = Some(Item::loaded(shared(Company::new("Acme"))));

    let err = db.flush(&[ann]).unwrap_err();

    assert!(err.is_logic());
    assert!(err.to_string().starts_with("Person::company: "), "{err}");
    assert!(log.is_empty());
}

#[test]
fn mixed_batches_are_rejected() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let acme: EntityRef = shared(Company::new("Acme"));
    let ann: EntityRef = shared(Person::new("Ann"));

    let err = db.persister().flush_dyn(&[acme, ann]).unwrap_err();

    assert!(err.is_type_mismatch());
    assert_eq!(
        err.to_string(),
        "entity type mismatch: expected `Company`, found `Person`"
    );
    assert!(log.is_empty());
}

#[test]
fn delete_removes_rows_and_tracking() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let acme = hydrated_company(&db, 1, "Acme");
    let globex = hydrated_company(&db, 2, "Globex");
    db.capture(&[acme.clone(), globex.clone()]).unwrap();

    db.delete(&[acme.clone(), globex.clone()]).unwrap();

    assert_eq!(
        log.pop(),
        Some((
            r#"DELETE FROM "companies" WHERE "id" IN (?, ?)"#.to_string(),
            vec![Value::I64(1), Value::I64(2)]
        ))
    );

    let acme: EntityRef = acme;
    assert!(!db.persister().is_tracked(&acme));
}

#[test]
fn delete_requires_an_id() {
    let (db, log) = logged(ScriptedConnection::sqlite());

    let err = db.delete(&[shared(Company::new("Acme"))]).unwrap_err();

    assert!(err.is_logic());
    assert!(log.is_empty());
}

#[test]
fn snapshots_skip_generated_ids() {
    let (db, _log) = logged(ScriptedConnection::sqlite());

    let acme: EntityRef = hydrated_company(&db, 1, "Acme");
    let snapshot = db.persister().snapshot_of(&acme).unwrap();

    assert_eq!(snapshot.id, Some(Id::from(1_i64)));
    assert_eq!(snapshot.column_names(), vec!["name", "founded"]);
    assert_eq!(snapshot.get("founded"), Some(&Value::Null));
}
