mod support;

use coverage_swap::store::{Encoding, FileStore, Store};
use coverage_swap::{FieldMap, FieldValue, Orchestrator, Predicate, Record};
use support::*;

fn seed_files(store: &FileStore, live: Vec<Record>, upload: Vec<Record>) {
    store.create(PRIMARY, live_schema()).unwrap();
    store.insert_all(PRIMARY, live).unwrap();
    store.create(DATASET, dataset_schema()).unwrap();
    store.insert_all(DATASET, upload).unwrap();
    store.create(ARCHIVE, FieldMap::default().archive_schema()).unwrap();
}

fn reopen_round_trips(encoding: Encoding) {
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![
        live_feature("A", 12.5, "{X}"),
        live_feature("B", 0.2, "{Y}").with("TransTech", FieldValue::Null),
    ];
    {
        let store = FileStore::open(dir.path(), encoding).unwrap();
        store.create(PRIMARY, live_schema()).unwrap();
        store.insert_all(PRIMARY, rows.clone()).unwrap();
    }

    let reopened = FileStore::open(dir.path(), encoding).unwrap();
    assert_eq!(reopened.list_attributes(PRIMARY).unwrap(), live_schema());
    let read: Vec<Record> = reopened
        .scan(PRIMARY, None, &Predicate::All)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(read, rows);
    assert!(dir
        .path()
        .join(format!("{}.{}", PRIMARY, encoding.extension()))
        .exists());
}

#[test]
fn json_files_round_trip() {
    reopen_round_trips(Encoding::Json);
}

#[test]
fn bitcode_files_round_trip() {
    reopen_round_trips(Encoding::Bitcode);
}

#[test]
fn full_run_against_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path(), Encoding::Json).unwrap();
    seed_files(
        &store,
        vec![
            live_feature("A", 3.0, "a1"),
            live_feature("A", 7.0, "a2"),
            live_feature("B", 1.0, "b1"),
        ],
        vec![feature("A", 300.0)],
    );
    let config = run_config("2024 Q3");
    let config = coverage_swap::RunConfig {
        secondary_stores: Vec::new(),
        ..config
    };

    let report = Orchestrator::new(&store, config).run().unwrap();
    assert_eq!(report.archived, Some(2));
    assert_eq!(report.identifiers_assigned, 1);

    let reopened = FileStore::open(dir.path(), Encoding::Json).unwrap();
    let replaced = provider_rows(&reopened, PRIMARY, "A");
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].get("MAXADDOWN"), &FieldValue::Double(300.0));
    assert_eq!(provider_rows(&reopened, PRIMARY, "B").len(), 1);
    assert_eq!(
        reopened.count_where(ARCHIVE, &Predicate::eq("DataRound", "2024 Q3")).unwrap(),
        2
    );
    assert!(!reopened.exists("ubb__archive_stage").unwrap());
}
