//! Orchestrator - drives one swap-and-archive run from validation to the
//! last secondary store.
//!
//! ```ignore
//! let config = RunConfig::new("acme_2024q2", "ubb")
//!     .with_secondary("sgid")
//!     .with_archive("ubb_archive", "2024 Q2");
//!
//! match Orchestrator::new(&store, config).run() {
//!     Ok(report) => println!("replaced {} targets", report.replacements.len()),
//!     Err(failure) => eprintln!("{} (stopped in {})", failure.error, failure.state),
//! }
//! ```
//!
//! Steps run strictly in order and the first error stops the run. Nothing is
//! compensated: stores already replaced stay replaced.

use std::fmt;

use serde::Serialize;
use tracing::{error, info};

use crate::archive::{archive_provider, ArchiveRequest};
use crate::config::RunConfig;
use crate::error::SwapError;
use crate::identifier::assign_identifiers;
use crate::provider::validate_provider;
use crate::record::FieldMap;
use crate::replace::{replace_provider, Replacement};
use crate::store::Store;

/// Where a run is, or where it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RunState {
    #[default]
    Idle,
    Validating,
    AssigningIdentifiers,
    Archiving,
    ReplacingPrimary,
    /// Index into the configured secondary stores.
    ReplacingSecondary(usize),
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => f.write_str("idle"),
            RunState::Validating => f.write_str("validating"),
            RunState::AssigningIdentifiers => f.write_str("assigning identifiers"),
            RunState::Archiving => f.write_str("archiving"),
            RunState::ReplacingPrimary => f.write_str("replacing primary"),
            RunState::ReplacingSecondary(i) => write!(f, "replacing secondary #{}", i + 1),
            RunState::Done => f.write_str("done"),
            RunState::Failed => f.write_str("failed"),
        }
    }
}

/// Replacement outcome for one target store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReplacement {
    pub store: String,
    pub replacement: Replacement,
}

/// What a run did, complete or partial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub provider: Option<String>,
    pub identifiers_assigned: usize,
    /// `None` when archival was skipped or never reached.
    pub archived: Option<usize>,
    /// Targets replaced so far, primary first.
    pub replacements: Vec<TargetReplacement>,
    /// Every state entered, in order.
    pub history: Vec<RunState>,
}

impl RunReport {
    pub fn replacement_for(&self, store: &str) -> Option<&Replacement> {
        self.replacements
            .iter()
            .find(|t| t.store == store)
            .map(|t| &t.replacement)
    }
}

/// A run that stopped early.
#[derive(Debug, thiserror::Error)]
#[error("run failed while {state}: {error}")]
pub struct RunFailure {
    /// State the run was in when the error occurred.
    pub state: RunState,
    /// Work completed before the failure.
    pub report: RunReport,
    #[source]
    pub error: SwapError,
}

struct Progress {
    state: RunState,
    report: RunReport,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: RunState::Idle,
            report: RunReport {
                history: vec![RunState::Idle],
                ..RunReport::default()
            },
        }
    }

    fn enter(&mut self, state: RunState) {
        self.state = state;
        self.report.history.push(state);
    }
}

/// Runs the workflow described by a [`RunConfig`] against one store.
pub struct Orchestrator<'a, S: Store + ?Sized> {
    store: &'a S,
    config: RunConfig,
}

impl<'a, S: Store + ?Sized> Orchestrator<'a, S> {
    pub fn new(store: &'a S, config: RunConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn run(&self) -> Result<RunReport, RunFailure> {
        let mut progress = Progress::new();
        match self.execute(&mut progress) {
            Ok(()) => {
                progress.enter(RunState::Done);
                info!(
                    provider = progress.report.provider.as_deref().unwrap_or_default(),
                    targets = progress.report.replacements.len(),
                    "run complete"
                );
                Ok(progress.report)
            }
            Err(err) => {
                let state = progress.state;
                progress.enter(RunState::Failed);
                error!(state = %state, error = %err, "run failed");
                Err(RunFailure {
                    state,
                    report: progress.report,
                    error: err,
                })
            }
        }
    }

    fn execute(&self, progress: &mut Progress) -> Result<(), SwapError> {
        let config = &self.config;
        let fields = config.field_map();

        progress.enter(RunState::Validating);
        config.validate()?;
        self.check_stores(&fields)?;
        let provider = validate_provider(
            self.store,
            &config.new_dataset,
            &config.primary_store,
            &config.provider_field,
        )?;
        progress.report.provider = Some(provider.clone());

        progress.enter(RunState::AssigningIdentifiers);
        progress.report.identifiers_assigned =
            assign_identifiers(self.store, &config.new_dataset, &fields.identifier)?;

        match config.archive_store.as_deref() {
            Some(archive) if config.archive_enabled => {
                progress.enter(RunState::Archiving);
                let request = ArchiveRequest {
                    provider: &provider,
                    provider_field: &config.provider_field,
                    source: &config.primary_store,
                    archive,
                    data_round: &config.data_round,
                    fields: &fields,
                };
                progress.report.archived = Some(archive_provider(self.store, &request)?);
            }
            _ => info!(primary = %config.primary_store, "archival disabled; skipping"),
        }

        progress.enter(RunState::ReplacingPrimary);
        self.replace(progress, &provider, &config.primary_store)?;

        for (i, secondary) in config.secondary_stores.iter().enumerate() {
            progress.enter(RunState::ReplacingSecondary(i));
            self.replace(progress, &provider, secondary)?;
        }
        Ok(())
    }

    fn replace(&self, progress: &mut Progress, provider: &str, target: &str) -> Result<(), SwapError> {
        let replacement = replace_provider(
            self.store,
            provider,
            &self.config.provider_field,
            &self.config.new_dataset,
            target,
        )?;
        progress.report.replacements.push(TargetReplacement {
            store: target.to_string(),
            replacement,
        });
        Ok(())
    }

    /// Referenced stores exist, the provider attribute is where it is read,
    /// and when archiving, the primary and archive declare what archival
    /// reads and writes. Reads only.
    fn check_stores(&self, fields: &FieldMap) -> Result<(), SwapError> {
        let config = &self.config;
        for name in config.referenced_stores() {
            if !self.store.exists(name)? {
                return Err(SwapError::Configuration(format!("store {} does not exist", name)));
            }
        }

        for name in [config.new_dataset.as_str(), config.primary_store.as_str()] {
            if !self.store.has_attribute(name, &config.provider_field)? {
                return Err(SwapError::Configuration(format!(
                    "{} has no {} attribute",
                    name, config.provider_field
                )));
            }
        }

        if let Some(archive) = config.archive_store.as_deref().filter(|_| config.archive_enabled) {
            let checks = [
                (config.primary_store.as_str(), fields.feature_attributes()),
                (archive, fields.archive_attributes()),
            ];
            for (name, required) in checks {
                let missing = self.store.missing_attributes(name, &required)?;
                if !missing.is_empty() {
                    return Err(SwapError::Configuration(format!(
                        "{} lacks {}",
                        name,
                        missing.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }
}
