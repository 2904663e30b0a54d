mod archive;
mod config;
mod error;
mod identifier;
mod orchestrator;
mod provider;
mod replace;

pub mod record;
pub mod speed_tier;
pub mod store;

pub use archive::{archive_provider, ArchiveRequest, STAGE_SUFFIX};
pub use config::{RunConfig, DEFAULT_PROVIDER_FIELD};
pub use error::SwapError;
pub use identifier::{assign_identifiers, is_brace_identifier, new_identifier, IDENTIFIER_FIELD_LENGTH};
pub use orchestrator::{Orchestrator, RunFailure, RunReport, RunState, TargetReplacement};
pub use provider::validate_provider;
pub use record::{ArchiveRecord, FeatureRecord, FieldMap, FieldValue, Record};
pub use replace::{replace_provider, Replacement};
pub use speed_tier::SpeedTier;
pub use store::{
    AttributeDef, AttributeType, Encoding, FileStore, InMemoryStore, Predicate, SchemaCheck,
    ScratchStore, Store, StoreError,
};
