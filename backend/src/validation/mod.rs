//! Conditional form validation.
//!
//! A form is an ordered list of [`ValidationStage`]s. Each stage is evaluated
//! exhaustively and independently; a record is accepted only when no stage reports a
//! violation. Failures are returned as a [`FieldErrorMap`], never as errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

pub mod formats;
pub mod record;
pub mod rules;
pub mod stage;

pub use formats::Format;
pub use record::FormRecord;
pub use rules::{Condition, Rule};
pub use stage::{StageBuilder, ValidationStage};

/// DefinitionError
///
/// A malformed stage or form definition. This is a programming fault in the form
/// definitions, raised when they are built, and never caused by user input.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("stage name must not be blank")]
    BlankStageName,

    #[error("stage '{stage}' references a blank field path")]
    BlankPath { stage: String },

    #[error("stage '{stage}' references malformed field path '{path}'")]
    MalformedPath { stage: String, path: String },

    #[error("stage '{stage}' declares a field group with no fields")]
    EmptyFieldGroup { stage: String },

    #[error("stage '{stage}' declares min > max for field '{field}'")]
    InvalidBounds { stage: String, field: String },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("form '{form}' declares stage '{stage}' more than once")]
    DuplicateStage { form: String, stage: String },

    #[error("form '{0}' is registered more than once")]
    DuplicateForm(String),
}

/// FieldErrorMap
///
/// Field path -> messages, in rule order. Keys are kept sorted so identical inputs
/// always serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrorMap(BTreeMap<String, Vec<String>>);

impl FieldErrorMap {
    pub fn push(&mut self, path: &str, message: &str) {
        self.0
            .entry(path.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Appends `other`'s messages after any already recorded for the same path.
    pub fn merge(&mut self, other: FieldErrorMap) {
        for (path, messages) in other.0 {
            self.0.entry(path).or_default().extend(messages);
        }
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Total messages across all fields.
    pub fn violation_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// ValidationOutcome
///
/// Verdict of a validation pass. Recomputed from scratch on every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ValidationOutcome {
    pub accepted: bool,
    #[ts(type = "Record<string, Array<string>>")]
    pub errors: FieldErrorMap,
}

impl ValidationOutcome {
    fn from_errors(errors: FieldErrorMap) -> Self {
        Self {
            accepted: errors.is_empty(),
            errors,
        }
    }
}

/// validate
///
/// Runs every stage against the record and merges their errors. Pure and idempotent.
pub fn validate<'a, I>(record: &FormRecord, stages: I) -> ValidationOutcome
where
    I: IntoIterator<Item = &'a ValidationStage>,
{
    let mut errors = FieldErrorMap::default();
    for stage in stages {
        let stage_errors = stage.evaluate(record);
        if !stage_errors.is_empty() {
            tracing::debug!(
                stage = stage.name(),
                violations = stage_errors.violation_count(),
                "validation stage rejected record"
            );
        }
        errors.merge(stage_errors);
    }
    ValidationOutcome::from_errors(errors)
}

/// Validates a single section, as when the user moves from one form step to the next.
pub fn validate_stage(record: &FormRecord, stage: &ValidationStage) -> ValidationOutcome {
    validate(record, std::iter::once(stage))
}
