//! Identifier assignment for an incoming dataset.

use tracing::info;
use uuid::Uuid;

use crate::error::SwapError;
use crate::record::FieldValue;
use crate::store::{AttributeDef, Store};

/// Capacity of the identifier attribute when it has to be added.
pub const IDENTIFIER_FIELD_LENGTH: u32 = 50;

/// A fresh identifier: random UUID, upper-case, wrapped in braces.
pub fn new_identifier() -> String {
    format!("{{{}}}", Uuid::new_v4().hyphenated().to_string().to_uppercase())
}

/// Whether `value` has the `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}` shape
/// with upper-case hex digits.
pub fn is_brace_identifier(value: &str) -> bool {
    let Some(inner) = value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) else {
        return false;
    };
    let hyphens_in_place = inner.len() == 36
        && inner
            .char_indices()
            .all(|(i, c)| matches!(i, 8 | 13 | 18 | 23) == (c == '-'));
    hyphens_in_place
        && !inner.chars().any(|c| c.is_ascii_lowercase())
        && Uuid::parse_str(inner).is_ok()
}

/// Stamp every record of `dataset` with a new identifier in `attribute`,
/// adding the attribute (text, 50 characters) when the schema lacks it.
/// Returns the number of records updated.
pub fn assign_identifiers<S: Store + ?Sized>(
    store: &S,
    dataset: &str,
    attribute: &str,
) -> Result<usize, SwapError> {
    info!(dataset, attribute, "checking identifier attribute");
    if !store.has_attribute(dataset, attribute)? {
        info!(dataset, attribute, "adding identifier attribute");
        store.add_attribute(dataset, AttributeDef::text(attribute, IDENTIFIER_FIELD_LENGTH))?;
    }

    let updated = store.update_each(dataset, &mut |record| {
        record.set(attribute, FieldValue::Text(new_identifier()));
    })?;

    info!(dataset, updated, "identifiers assigned");
    Ok(updated)
}
