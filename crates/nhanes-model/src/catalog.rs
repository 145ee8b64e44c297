//! Normalized variable catalogs.
//!
//! A [`Catalog`] holds one row per (cycle, file, variable) for a single
//! [`Category`]. Lookups that the reconciler and retriever need repeatedly
//! (variables per cycle, file identifier per cycle and description) are
//! indexed once when the catalog is built.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::cycle::Cycle;

/// One catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub category: Category,
    pub cycle: Cycle,
    /// Human-readable file name, e.g. `Body Measures`.
    pub file_description: String,
    /// File identifier used to locate the data file, e.g. `BMX_D`.
    pub file_id: String,
    pub variable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_description: Option<String>,
}

/// The normalized catalog of one category.
#[derive(Debug, Clone)]
pub struct Catalog {
    category: Category,
    rows: Vec<CatalogRow>,
    variables_by_cycle: BTreeMap<Cycle, BTreeSet<String>>,
    files: BTreeMap<(Cycle, String), String>,
}

impl Catalog {
    /// Build a catalog and its lookup indexes.
    ///
    /// When several rows name the same (cycle, description) pair with
    /// different identifiers, the first one wins.
    pub fn new(category: Category, rows: Vec<CatalogRow>) -> Self {
        let mut variables_by_cycle: BTreeMap<Cycle, BTreeSet<String>> = BTreeMap::new();
        let mut files = BTreeMap::new();
        for row in &rows {
            variables_by_cycle
                .entry(row.cycle)
                .or_default()
                .insert(row.variable.clone());
            files
                .entry((row.cycle, row.file_description.clone()))
                .or_insert_with(|| row.file_id.clone());
        }
        Self {
            category,
            rows,
            variables_by_cycle,
            files,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cycles with at least one row, in registry order.
    pub fn cycles(&self) -> impl Iterator<Item = Cycle> + '_ {
        self.variables_by_cycle.keys().copied()
    }

    /// Variable names present in `cycle`; empty when the cycle has no rows.
    pub fn variables(&self, cycle: Cycle) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.variables_by_cycle.get(&cycle).unwrap_or(&EMPTY)
    }

    /// File identifier for a (cycle, file description) pair.
    pub fn file_id(&self, cycle: Cycle, file_description: &str) -> Option<&str> {
        self.files
            .get(&(cycle, file_description.to_string()))
            .map(String::as_str)
    }

    /// Unique file descriptions in first-appearance order.
    ///
    /// With `cycles`, only rows from those cycles are considered.
    pub fn file_descriptions(&self, cycles: Option<&[Cycle]>) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut descriptions = Vec::new();
        for row in &self.rows {
            if cycles.is_some_and(|wanted| !wanted.contains(&row.cycle)) {
                continue;
            }
            if seen.insert(row.file_description.as_str()) {
                descriptions.push(row.file_description.as_str());
            }
        }
        descriptions
    }

    /// Cycle → file identifier for one file description.
    pub fn file_mapping(&self, file_description: &str) -> BTreeMap<Cycle, &str> {
        self.files
            .iter()
            .filter(|((_, description), _)| description == file_description)
            .map(|((cycle, _), file_id)| (*cycle, file_id.as_str()))
            .collect()
    }

    /// A catalog holding only the rows of one file description.
    pub fn for_file(&self, file_description: &str) -> Catalog {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.file_description == file_description)
            .cloned()
            .collect();
        Catalog::new(self.category, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cycle: &str, description: &str, file_id: &str, variable: &str) -> CatalogRow {
        CatalogRow {
            category: Category::Examination,
            cycle: Cycle::from_label(cycle).unwrap(),
            file_description: description.to_string(),
            file_id: file_id.to_string(),
            variable: variable.to_string(),
            variable_description: None,
        }
    }

    fn sample() -> Catalog {
        Catalog::new(
            Category::Examination,
            vec![
                row("2007-2008", "Body Measures", "BMX_E", "SEQN"),
                row("2007-2008", "Body Measures", "BMX_E", "BMXWT"),
                row("2005-2006", "Body Measures", "BMX_D", "SEQN"),
                row("2005-2006", "Blood Pressure", "BPX_D", "BPXSY1"),
            ],
        )
    }

    #[test]
    fn indexes_variables_by_cycle() {
        let catalog = sample();
        let cycle = Cycle::from_label("2005-2006").unwrap();
        let names: Vec<&str> = catalog.variables(cycle).iter().map(String::as_str).collect();
        assert_eq!(names, vec!["BPXSY1", "SEQN"]);
        let missing = Cycle::from_label("1999-2000").unwrap();
        assert!(catalog.variables(missing).is_empty());
    }

    #[test]
    fn cycles_follow_registry_order() {
        let labels: Vec<&str> = sample().cycles().map(Cycle::label).collect();
        assert_eq!(labels, vec!["2005-2006", "2007-2008"]);
    }

    #[test]
    fn file_lookup_and_mapping() {
        let catalog = sample();
        let cycle = Cycle::from_label("2007-2008").unwrap();
        assert_eq!(catalog.file_id(cycle, "Body Measures"), Some("BMX_E"));
        assert_eq!(catalog.file_id(cycle, "Blood Pressure"), None);

        let mapping = catalog.file_mapping("Body Measures");
        let pairs: Vec<(&str, &str)> = mapping.iter().map(|(c, id)| (c.label(), *id)).collect();
        assert_eq!(pairs, vec![("2005-2006", "BMX_D"), ("2007-2008", "BMX_E")]);
    }

    #[test]
    fn descriptions_keep_first_appearance_order() {
        let catalog = sample();
        assert_eq!(
            catalog.file_descriptions(None),
            vec!["Body Measures", "Blood Pressure"]
        );
        let only = [Cycle::from_label("2007-2008").unwrap()];
        assert_eq!(catalog.file_descriptions(Some(&only)), vec!["Body Measures"]);
    }

    #[test]
    fn for_file_restricts_rows() {
        let scoped = sample().for_file("Blood Pressure");
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped.cycles().count(), 1);
    }
}
