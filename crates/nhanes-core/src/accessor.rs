//! The [`Nhanes`] accessor: catalog-level operations.
//!
//! Retrieval and joining live in [`crate::retrieve`] and [`crate::join`].

use std::collections::BTreeMap;

use tracing::debug;

use nhanes_model::{CYCLE_LABELS, Catalog, CatalogSource, Category, Cycle, FileSource};

use crate::config::NhanesConfig;
use crate::error::{NhanesError, Result};
use crate::normalize::normalize;
use crate::reconcile::{Reconciliation, reconcile};
use crate::resolve::CycleResolver;

/// Catalog-driven accessor over a catalog source and a file source.
///
/// The accessor holds no data between calls: every operation fetches and
/// normalizes the catalogs it needs.
pub struct Nhanes<C, F> {
    catalogs: C,
    files: F,
    config: NhanesConfig,
}

impl<C: CatalogSource, F: FileSource> Nhanes<C, F> {
    pub fn new(catalogs: C, files: F) -> Self {
        Self::with_config(catalogs, files, NhanesConfig::default())
    }

    pub fn with_config(catalogs: C, files: F, config: NhanesConfig) -> Self {
        Self {
            catalogs,
            files,
            config,
        }
    }

    pub fn config(&self) -> &NhanesConfig {
        &self.config
    }

    pub(crate) fn files(&self) -> &F {
        &self.files
    }

    pub fn resolver(&self) -> CycleResolver {
        CycleResolver::new(self.config.range_policy)
    }

    /// Every data category.
    pub fn list_categories(&self) -> &'static [Category] {
        &Category::ALL
    }

    /// Every registered cycle label.
    pub fn list_cycles(&self) -> &'static [&'static str] {
        &CYCLE_LABELS
    }

    /// Resolve cycle tokens with the configured range policy.
    pub fn resolve<I, S>(&self, tokens: I) -> Vec<Cycle>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolver().resolve(tokens)
    }

    /// Resolve tokens, failing when nothing matches.
    pub(crate) fn resolve_required(&self, tokens: &[String]) -> Result<Vec<Cycle>> {
        let cycles = self.resolve(tokens);
        if cycles.is_empty() {
            return Err(NhanesError::InvalidCycle {
                token: tokens.join(","),
            });
        }
        Ok(cycles)
    }

    /// Fetch and normalize the catalog of `category`.
    pub fn catalog(&self, category: Category) -> Result<Catalog> {
        debug!(%category, "fetching variable catalog");
        let raw = self.catalogs.fetch_catalog(category)?;
        normalize(category, &raw)
    }

    /// Distinct file descriptions of a category, in catalog order.
    ///
    /// With `cycles`, only files present in the cycles those tokens resolve
    /// to are listed.
    pub fn list_file_names(
        &self,
        category: Category,
        cycles: Option<&[String]>,
    ) -> Result<Vec<String>> {
        let catalog = self.catalog(category)?;
        file_names_in(&catalog, cycles.map(|tokens| self.resolve(tokens)).as_deref()).ok_or_else(
            || NhanesError::CatalogEmpty {
                category,
                scope: cycles.map(|tokens| tokens.join(",")),
            },
        )
    }

    /// File identifier of one file description in every cycle that has it.
    pub fn cycle_file_mapping(
        &self,
        category: Category,
        file_description: &str,
    ) -> Result<BTreeMap<Cycle, String>> {
        let catalog = self.catalog(category)?;
        let mapping: BTreeMap<Cycle, String> = catalog
            .file_mapping(file_description)
            .into_iter()
            .map(|(cycle, file_id)| (cycle, file_id.to_string()))
            .collect();
        if mapping.is_empty() {
            return Err(NhanesError::FileNotFound {
                category,
                cycle: None,
                file_description: file_description.to_string(),
            });
        }
        Ok(mapping)
    }

    /// Reconcile the category's variables over the cycles the tokens resolve to.
    pub fn common_variables(&self, category: Category, tokens: &[String]) -> Result<Reconciliation> {
        let cycles = self.resolve_required(tokens)?;
        let catalog = self.catalog(category)?;
        reconcile(&catalog, &cycles)
    }
}

/// File descriptions of `catalog`, optionally restricted to `cycles`.
/// `None` when the restriction leaves nothing.
pub(crate) fn file_names_in(catalog: &Catalog, cycles: Option<&[Cycle]>) -> Option<Vec<String>> {
    let names: Vec<String> = catalog
        .file_descriptions(cycles)
        .into_iter()
        .map(str::to_string)
        .collect();
    if names.is_empty() { None } else { Some(names) }
}
