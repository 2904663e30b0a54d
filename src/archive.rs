//! Archival of a provider's outgoing records.
//!
//! Rows are staged in a scratch store first and appended to the archive in
//! one bulk call, so a row whose speed cannot be classified stops the run
//! before the archive sees any of the batch.

use tracing::info;

use crate::error::SwapError;
use crate::record::{ArchiveRecord, FeatureRecord, FieldMap, Record};
use crate::store::{Predicate, SchemaCheck, ScratchStore, Store};

/// Suffix appended to the source store name to name the staging store.
pub const STAGE_SUFFIX: &str = "__archive_stage";

/// What to archive and where.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveRequest<'a> {
    pub provider: &'a str,
    pub provider_field: &'a str,
    /// Live store whose current rows are archived.
    pub source: &'a str,
    pub archive: &'a str,
    pub data_round: &'a str,
    pub fields: &'a FieldMap,
}

impl ArchiveRequest<'_> {
    pub fn stage_name(&self) -> String {
        format!("{}{}", self.source, STAGE_SUFFIX)
    }
}

/// Copy the provider's current rows from the source store into the archive,
/// tagging each with the data round and its speed tier. The source is only
/// read. Returns the number of rows archived; a provider with no rows
/// archives nothing and succeeds.
///
/// The archive must declare every archive attribute, and `provider_field`
/// must be the provider attribute of `fields`; either mismatch is a
/// configuration error raised before anything is written.
pub fn archive_provider<S: Store + ?Sized>(
    store: &S,
    request: &ArchiveRequest<'_>,
) -> Result<usize, SwapError> {
    info!(
        provider = request.provider,
        source = request.source,
        archive = request.archive,
        "copying provider's current features to archive"
    );

    let fields = request.fields;
    if request.provider_field != fields.provider_code {
        return Err(SwapError::Configuration(format!(
            "provider field {} does not match field map provider attribute {}",
            request.provider_field, fields.provider_code
        )));
    }
    let missing = store.missing_attributes(request.archive, &fields.archive_attributes())?;
    if !missing.is_empty() {
        return Err(SwapError::Configuration(format!(
            "archive store {} lacks {}",
            request.archive,
            missing.join(", ")
        )));
    }

    let current = Predicate::eq(request.provider_field, request.provider);
    let projection = fields.feature_attributes();

    let staged: Vec<Record> = store
        .scan(request.source, Some(projection.as_slice()), &current)?
        .map(|row| -> Result<Record, SwapError> {
            let feature = FeatureRecord::from_record(&row?, fields);
            Ok(ArchiveRecord::new(feature, request.data_round)?.into_record(fields))
        })
        .collect::<Result<_, _>>()?;

    if staged.is_empty() {
        info!(provider = request.provider, source = request.source, "no features to archive");
        return Ok(0);
    }

    let scratch = ScratchStore::acquire(store, request.stage_name(), fields.archive_schema())?;
    store.insert_all(scratch.name(), staged)?;
    let archived = store.bulk_append(scratch.name(), request.archive, SchemaCheck::NoTest)?;

    info!(
        archived,
        source = request.source,
        archive = request.archive,
        data_round = request.data_round,
        "features archived"
    );
    Ok(archived)
}
