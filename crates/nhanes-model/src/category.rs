//! Top-level NHANES data categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A top-level data domain of the survey.
///
/// The set is closed: the remote variable catalog is organised by exactly
/// these components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Demographics,
    Dietary,
    Examination,
    Laboratory,
    Questionnaire,
    #[serde(rename = "limitedaccess")]
    LimitedAccess,
}

impl Category {
    /// Every category, in catalog order.
    pub const ALL: [Category; 6] = [
        Category::Demographics,
        Category::Dietary,
        Category::Examination,
        Category::Laboratory,
        Category::Questionnaire,
        Category::LimitedAccess,
    ];

    /// Lowercase identifier used on the command line and in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Demographics => "demographics",
            Category::Dietary => "dietary",
            Category::Examination => "examination",
            Category::Laboratory => "laboratory",
            Category::Questionnaire => "questionnaire",
            Category::LimitedAccess => "limitedaccess",
        }
    }

    /// Component name as the remote variable list spells it.
    pub fn component(&self) -> &'static str {
        match self {
            Category::Demographics => "Demographics",
            Category::Dietary => "Dietary",
            Category::Examination => "Examination",
            Category::Laboratory => "Laboratory",
            Category::Questionnaire => "Questionnaire",
            Category::LimitedAccess => "LimitedAccess",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ModelError;

    /// Parse a category name (case-insensitive, `-`/`_`/space ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownCategory(s.to_string()))
    }
}
