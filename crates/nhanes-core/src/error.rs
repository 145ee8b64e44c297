//! Error type for catalog and retrieval operations.

use polars::prelude::PolarsError;
use thiserror::Error;

use nhanes_model::{Category, Cycle, ModelError, SourceError};

#[derive(Debug, Error)]
pub enum NhanesError {
    /// The raw catalog lacks columns the normalizer depends on.
    #[error("variable table for {category} has an unrecognised layout: missing column(s) {}", .missing.join(", "))]
    CatalogFormat {
        category: Category,
        missing: Vec<String>,
    },

    /// No catalog rows survive filtering.
    #[error("no catalog rows available for {category}{}", scope_suffix(.scope))]
    CatalogEmpty {
        category: Category,
        scope: Option<String>,
    },

    /// The cycle tokens resolve to no known cycle.
    #[error("invalid cycle '{token}'; valid cycles are {}", nhanes_model::CYCLE_LABELS.join(", "))]
    InvalidCycle { token: String },

    /// Reconciliation needs at least two distinct cycles.
    #[error("reconciliation needs at least two cycles, got {found}")]
    InsufficientCycles { found: usize },

    /// No catalog row for the file in the given cycle.
    #[error("no data file '{file_description}' in {category}{}", cycle_suffix(.cycle))]
    FileNotFound {
        category: Category,
        cycle: Option<Cycle>,
        file_description: String,
    },

    /// A join side names a file the cycle does not carry.
    #[error("data file '{file_description}' is not available in {category} for cycle '{cycle}'")]
    FileNotAvailable {
        category: Category,
        cycle: String,
        file_description: String,
    },

    /// Every resolved cycle was skipped.
    #[error("no data available for '{file_description}' in {category} for cycle '{cycle}'")]
    NoDataAvailable {
        category: Category,
        cycle: String,
        file_description: String,
    },

    /// The join key column is absent on one side.
    #[error("join key '{key}' missing from '{file_description}' ({category})")]
    JoinKey {
        key: String,
        category: Category,
        file_description: String,
    },

    /// Requested or common columns absent from a retrieved table.
    #[error("column(s) {} missing from '{file_description}'{}", .missing.join(", "), cycle_suffix(.cycle))]
    MissingVariables {
        file_description: String,
        cycle: Option<Cycle>,
        missing: Vec<String>,
    },

    #[error("unknown data category '{0}'")]
    UnknownCategory(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("dataframe error: {0}")]
    Frame(#[from] PolarsError),
}

fn scope_suffix(scope: &Option<String>) -> String {
    scope
        .as_ref()
        .map(|scope| format!(" in cycle '{scope}'"))
        .unwrap_or_default()
}

fn cycle_suffix(cycle: &Option<Cycle>) -> String {
    cycle
        .map(|cycle| format!(" for cycle {cycle}"))
        .unwrap_or_default()
}

impl From<ModelError> for NhanesError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::UnknownCycle(token) => NhanesError::InvalidCycle { token },
            ModelError::UnknownCategory(name) => NhanesError::UnknownCategory(name),
        }
    }
}

pub type Result<T> = std::result::Result<T, NhanesError>;
