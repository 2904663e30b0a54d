use crate::store::StoreError;

/// Error raised by any step of a swap-and-archive run.
///
/// Each variant maps to one failure class of the workflow. None of them is
/// retried or downgraded; the orchestrator stops at the first one.
#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    /// A referenced store or attribute does not exist, or the run configuration
    /// is inconsistent. Raised before anything is mutated.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The new dataset's provider is unknown, ambiguous or missing, or the
    /// dataset cannot be written into a target store.
    #[error("validation error: {0}")]
    Validation(String),

    /// A download speed could not be read as a number.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// The store collaborator failed (I/O, schema, lock contention).
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl SwapError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, SwapError::Configuration(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SwapError::Validation(_))
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, SwapError::Conversion(_))
    }

    pub fn is_store(&self) -> bool {
        matches!(self, SwapError::Store(_))
    }
}
