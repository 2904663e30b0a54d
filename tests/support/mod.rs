#![allow(dead_code)]

pub mod faulty_store;

use chrono::{TimeZone, Utc};
use coverage_swap::store::{AttributeDef, InMemoryStore, Store};
use coverage_swap::{FieldMap, FieldValue, Record, RunConfig};

#[allow(unused_imports)]
pub use faulty_store::FaultyStore;

pub const PRIMARY: &str = "ubb";
pub const SECONDARY: &str = "sgid";
pub const DATASET: &str = "provider_upload";
pub const ARCHIVE: &str = "ubb_archive";

/// Schema of a live coverage store.
pub fn live_schema() -> Vec<AttributeDef> {
    FieldMap::default().archive_schema().into_iter().take(8).collect()
}

/// Schema of an upload, which arrives without identifiers.
pub fn dataset_schema() -> Vec<AttributeDef> {
    let identifier = FieldMap::default().identifier;
    live_schema()
        .into_iter()
        .filter(|def| def.name != identifier)
        .collect()
}

pub fn feature(provider: &str, download: f64) -> Record {
    Record::new()
        .with("SHAPE", FieldValue::Geometry(vec![0x01, 0x03, 0x00, 0x00, 0x00]))
        .with("UTProvCode", provider)
        .with("TransTech", "50")
        .with("MAXADDOWN", download)
        .with("MAXADUP", download / 10.0)
        .with("LastEdit", Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap())
        .with("LastVerified", Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
}

pub fn live_feature(provider: &str, download: f64, identifier: &str) -> Record {
    feature(provider, download).with("Identifier", identifier)
}

/// Primary and secondary seeded with `live`, the upload with `upload`, and an
/// empty archive.
pub fn seed(store: &InMemoryStore, live: Vec<Record>, upload: Vec<Record>) {
    store.seed(PRIMARY, live_schema(), live.clone()).unwrap();
    store.seed(SECONDARY, live_schema(), live).unwrap();
    store.seed(DATASET, dataset_schema(), upload).unwrap();
    store.create(ARCHIVE, FieldMap::default().archive_schema()).unwrap();
}

pub fn run_config(round: &str) -> RunConfig {
    RunConfig::new(DATASET, PRIMARY)
        .with_secondary(SECONDARY)
        .with_archive(ARCHIVE, round)
}

pub fn provider_rows<S: Store + ?Sized>(store: &S, name: &str, provider: &str) -> Vec<Record> {
    store
        .scan(
            name,
            None,
            &coverage_swap::Predicate::eq("UTProvCode", provider),
        )
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// Every record of every store, for before/after comparisons.
pub fn snapshot(store: &InMemoryStore) -> Vec<(String, Vec<Record>)> {
    store
        .store_names()
        .unwrap()
        .into_iter()
        .map(|name| {
            let records = store.records(&name).unwrap();
            (name, records)
        })
        .collect()
}
