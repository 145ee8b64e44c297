//! Common and uncommon variables across cycles.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use nhanes_model::{Catalog, Cycle};

use crate::error::{NhanesError, Result};
use crate::resolve::unique_cycles;

/// Outcome of reconciling a catalog over a set of cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Distinct cycles reconciled, in the order supplied.
    pub cycles: Vec<Cycle>,
    /// Variables present in every cycle.
    pub common: BTreeSet<String>,
    /// Variables present in some but not all cycles.
    pub uncommon: BTreeSet<String>,
    /// Cycles each variable appears in, following `cycles`.
    pub occurrence: BTreeMap<String, Vec<Cycle>>,
}

impl Reconciliation {
    /// Every variable seen in any cycle.
    pub fn universe(&self) -> BTreeSet<String> {
        self.common.union(&self.uncommon).cloned().collect()
    }
}

/// Reconcile `catalog` over `cycles`.
///
/// Repeated cycles count once, so at least two distinct cycles are needed.
pub fn reconcile(catalog: &Catalog, cycles: &[Cycle]) -> Result<Reconciliation> {
    let cycles = unique_cycles(cycles);
    if cycles.len() < 2 {
        return Err(NhanesError::InsufficientCycles {
            found: cycles.len(),
        });
    }

    let mut common: Option<BTreeSet<String>> = None;
    let mut occurrence: BTreeMap<String, Vec<Cycle>> = BTreeMap::new();
    for &cycle in &cycles {
        let variables = catalog.variables(cycle);
        for variable in variables {
            occurrence.entry(variable.clone()).or_default().push(cycle);
        }
        common = Some(match common {
            None => variables.clone(),
            Some(acc) => acc.intersection(variables).cloned().collect(),
        });
    }

    let common = common.unwrap_or_default();
    let uncommon = occurrence
        .keys()
        .filter(|variable| !common.contains(*variable))
        .cloned()
        .collect();

    Ok(Reconciliation {
        cycles,
        common,
        uncommon,
        occurrence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nhanes_model::{CatalogRow, Category};

    fn row(cycle: &str, variable: &str) -> CatalogRow {
        CatalogRow {
            category: Category::Examination,
            cycle: Cycle::from_label(cycle).unwrap(),
            file_description: "Body Measures".to_string(),
            file_id: "BMX".to_string(),
            variable: variable.to_string(),
            variable_description: None,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            Category::Examination,
            vec![
                row("1999-2000", "SEQN"),
                row("1999-2000", "BMXWT"),
                row("1999-2000", "BMDSTATS"),
                row("2001-2002", "SEQN"),
                row("2001-2002", "BMXWT"),
                row("2001-2002", "BMXSAD1"),
            ],
        )
    }

    #[test]
    fn splits_common_and_uncommon() {
        let cycles = [
            Cycle::from_label("1999-2000").unwrap(),
            Cycle::from_label("2001-2002").unwrap(),
        ];
        let result = reconcile(&catalog(), &cycles).unwrap();
        assert_eq!(
            result.common.iter().map(String::as_str).collect::<Vec<_>>(),
            ["BMXWT", "SEQN"]
        );
        assert_eq!(
            result.uncommon.iter().map(String::as_str).collect::<Vec<_>>(),
            ["BMDSTATS", "BMXSAD1"]
        );
        assert_eq!(result.occurrence["BMXWT"], cycles.to_vec());
        assert_eq!(result.occurrence["BMXSAD1"], vec![cycles[1]]);
        assert_eq!(result.universe().len(), 4);
    }

    #[test]
    fn repeated_cycle_is_insufficient() {
        let cycle = Cycle::from_label("1999-2000").unwrap();
        assert!(matches!(
            reconcile(&catalog(), &[cycle, cycle]),
            Err(NhanesError::InsufficientCycles { found: 1 })
        ));
        assert!(matches!(
            reconcile(&catalog(), &[]),
            Err(NhanesError::InsufficientCycles { found: 0 })
        ));
    }
}
