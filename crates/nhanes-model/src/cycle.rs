//! The cycle registry.
//!
//! NHANES publishes its continuous survey in fixed two-year collection
//! periods. [`CYCLE_LABELS`] is the authoritative time axis: a [`Cycle`] is a
//! position in that list, so cycles order by registry position and never by
//! re-parsing their labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ModelError;

/// Canonical cycle labels in collection order.
pub const CYCLE_LABELS: [&str; 10] = [
    "1999-2000",
    "2001-2002",
    "2003-2004",
    "2005-2006",
    "2007-2008",
    "2009-2010",
    "2011-2012",
    "2013-2014",
    "2015-2016",
    "2017-2018",
];

/// Separator between the begin and end year of a cycle label.
pub const CYCLE_SEPARATOR: char = '-';

/// A survey cycle drawn from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cycle(usize);

impl Cycle {
    /// Every registered cycle, in registry order.
    pub fn all() -> impl DoubleEndedIterator<Item = Cycle> + ExactSizeIterator {
        (0..CYCLE_LABELS.len()).map(Cycle)
    }

    /// Look up a cycle by its exact canonical label.
    pub fn from_label(label: &str) -> Option<Cycle> {
        CYCLE_LABELS
            .iter()
            .position(|candidate| *candidate == label)
            .map(Cycle)
    }

    /// Build a cycle from a catalog's begin/end year pair.
    ///
    /// Years are compared after trimming; spreadsheet-style values such as
    /// `1999.0` are accepted.
    pub fn from_years(begin: &str, end: &str) -> Option<Cycle> {
        let label = format!(
            "{}{CYCLE_SEPARATOR}{}",
            normalize_year(begin),
            normalize_year(end)
        );
        Self::from_label(&label)
    }

    /// Position of this cycle in the registry.
    pub fn index(self) -> usize {
        self.0
    }

    /// The canonical label, e.g. `2005-2006`.
    pub fn label(self) -> &'static str {
        CYCLE_LABELS[self.0]
    }

    /// Returns true if `fragment` occurs anywhere in the label.
    pub fn contains(self, fragment: &str) -> bool {
        self.label().contains(fragment)
    }
}

fn normalize_year(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value >= 0.0 => format!("{value:.0}"),
        _ => trimmed.to_string(),
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Cycle {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s.trim()).ok_or_else(|| ModelError::UnknownCycle(s.to_string()))
    }
}

impl Serialize for Cycle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Cycle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}
