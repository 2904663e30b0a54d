//! Provider validation: the new dataset must name exactly one provider, and
//! that provider must already be known to the primary store.

use tracing::info;

use crate::error::SwapError;
use crate::record::FieldValue;
use crate::store::Store;

/// Returns the new dataset's provider after checking it against the
/// distinct values of `provider_field` in `primary`. Matching is exact:
/// case, whitespace and type all count.
pub fn validate_provider<S: Store + ?Sized>(
    store: &S,
    new_dataset: &str,
    primary: &str,
    provider_field: &str,
) -> Result<String, SwapError> {
    info!(new_dataset, primary, provider_field, "checking if provider is valid");

    let candidates = store.distinct_values(new_dataset, provider_field)?;
    let candidate = match candidates.as_slice() {
        [] => {
            return Err(SwapError::Validation(format!(
                "{} has no records; cannot determine provider",
                new_dataset
            )))
        }
        [single] => single,
        many => {
            let listed: Vec<String> = many.iter().map(ToString::to_string).collect();
            return Err(SwapError::Validation(format!(
                "{} carries {} provider values in {} ({}); expected exactly one",
                new_dataset,
                many.len(),
                provider_field,
                listed.join(", ")
            )));
        }
    };

    let provider = match candidate {
        FieldValue::Text(text) if !text.is_empty() => text.clone(),
        other => {
            return Err(SwapError::Validation(format!(
                "{} in {} must be non-empty text, got {}",
                provider_field,
                new_dataset,
                other.type_name()
            )))
        }
    };

    let known = store.distinct_values(primary, provider_field)?;
    if !known.contains(candidate) {
        return Err(SwapError::Validation(format!(
            "{} not found in list of existing providers in {}",
            provider, primary
        )));
    }

    info!(provider = %provider, "updating data for provider");
    Ok(provider)
}
