//! Accessor configuration.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use nhanes_model::{CYCLE_COLUMN, SUBJECT_KEY};

/// What a range does when its end year matches no cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Run on to the last registered cycle.
    #[default]
    OpenEnded,
    /// Contribute no cycles.
    Strict,
}

impl RangePolicy {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OpenEnded => "open-ended",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for RangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Settings shared by every operation of an [`crate::Nhanes`] accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NhanesConfig {
    /// Local storage directory. Accepted and carried, never read by the engine.
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,

    #[serde(default)]
    pub range_policy: RangePolicy,

    /// Respondent identifier used for projections and joins.
    #[serde(default = "default_subject_key")]
    pub subject_key: String,

    /// Name of the column tagging each row with its cycle.
    #[serde(default = "default_cycle_column")]
    pub cycle_column: String,
}

impl Default for NhanesConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            range_policy: RangePolicy::default(),
            subject_key: default_subject_key(),
            cycle_column: default_cycle_column(),
        }
    }
}

impl NhanesConfig {
    #[must_use]
    pub fn with_data_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_directory = dir.into();
        self
    }

    #[must_use]
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = policy;
        self
    }

    #[must_use]
    pub fn with_subject_key(mut self, key: impl Into<String>) -> Self {
        self.subject_key = key.into();
        self
    }

    #[must_use]
    pub fn with_cycle_column(mut self, column: impl Into<String>) -> Self {
        self.cycle_column = column.into();
        self
    }
}

fn default_data_directory() -> PathBuf {
    PathBuf::from("data/")
}

fn default_subject_key() -> String {
    SUBJECT_KEY.to_string()
}

fn default_cycle_column() -> String {
    CYCLE_COLUMN.to_string()
}
