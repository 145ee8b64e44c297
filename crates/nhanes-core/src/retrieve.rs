//! Multi-cycle retrieval.
//!
//! One file description is fetched for every resolved cycle, tagged with
//! its cycle and stacked in registry order. Cycles whose catalog has no such
//! file are skipped; only a retrieval where every cycle is skipped fails.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use nhanes_model::{Catalog, CatalogSource, Category, Cycle, FileSource};

use crate::accessor::Nhanes;
use crate::error::{NhanesError, Result};
use crate::frame::{concat_aligned, missing_columns, retain_columns, tag_cycle};
use crate::reconcile::reconcile;
use crate::resolve::distinct_cycles;

/// What to retrieve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveRequest {
    pub category: Category,
    /// Cycle tokens, resolved with the accessor's range policy.
    pub cycles: Vec<String>,
    pub file_description: String,
    /// Keep variables missing from some cycles (null-filled there).
    #[serde(default = "default_include_uncommon")]
    pub include_uncommon: bool,
    /// Project the result to these columns plus the subject key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_variables: Option<Vec<String>>,
}

fn default_include_uncommon() -> bool {
    true
}

impl RetrieveRequest {
    pub fn new<I, S>(category: Category, cycles: I, file_description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category,
            cycles: cycles.into_iter().map(Into::into).collect(),
            file_description: file_description.into(),
            include_uncommon: true,
            specific_variables: None,
        }
    }

    #[must_use]
    pub fn include_uncommon(mut self, include: bool) -> Self {
        self.include_uncommon = include;
        self
    }

    #[must_use]
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specific_variables = Some(variables.into_iter().map(Into::into).collect());
        self
    }
}

/// A retrieved table and the cycles that went into it.
#[derive(Debug, Clone)]
pub struct RetrievedTable {
    pub data: DataFrame,
    /// Cycles that contributed rows, in registry order.
    pub cycles: Vec<Cycle>,
    /// Resolved cycles without the requested file.
    pub skipped: Vec<Cycle>,
}

impl<C: CatalogSource, F: FileSource> Nhanes<C, F> {
    /// Retrieve one file description across the cycles of `request`.
    pub fn retrieve(&self, request: &RetrieveRequest) -> Result<RetrievedTable> {
        let span = info_span!(
            "retrieve",
            category = %request.category,
            cycles = %request.cycles.join(","),
            file = %request.file_description,
        );
        let _guard = span.enter();

        let cycles = self.resolve_required(&request.cycles)?;
        let catalog = self.catalog(request.category)?;
        self.retrieve_from(&catalog, &cycles, request)
    }

    /// Retrieval against an already normalized catalog.
    pub(crate) fn retrieve_from(
        &self,
        catalog: &Catalog,
        cycles: &[Cycle],
        request: &RetrieveRequest,
    ) -> Result<RetrievedTable> {
        let cycles = distinct_cycles(cycles);
        let mut table = match cycles.as_slice() {
            [cycle] => self.retrieve_single(catalog, *cycle, request)?,
            _ => self.retrieve_multi(catalog, &cycles, request)?,
        };

        if let Some(variables) = &request.specific_variables {
            table.data = self.select_variables(&table.data, variables, request)?;
        }

        info!(
            rows = table.data.height(),
            columns = table.data.width(),
            cycles = table.cycles.len(),
            skipped = table.skipped.len(),
            "retrieved data"
        );
        Ok(table)
    }

    fn retrieve_single(
        &self,
        catalog: &Catalog,
        cycle: Cycle,
        request: &RetrieveRequest,
    ) -> Result<RetrievedTable> {
        let file_id = catalog
            .file_id(cycle, &request.file_description)
            .ok_or_else(|| NhanesError::FileNotFound {
                category: request.category,
                cycle: Some(cycle),
                file_description: request.file_description.clone(),
            })?;
        let data = self.fetch_tagged(cycle, file_id)?;
        Ok(RetrievedTable {
            data,
            cycles: vec![cycle],
            skipped: Vec::new(),
        })
    }

    fn retrieve_multi(
        &self,
        catalog: &Catalog,
        cycles: &[Cycle],
        request: &RetrieveRequest,
    ) -> Result<RetrievedTable> {
        let description = request.file_description.as_str();
        let file_catalog = catalog.for_file(description);
        let mut available: Vec<(Cycle, &str)> = Vec::new();
        let mut skipped: Vec<Cycle> = Vec::new();
        for &cycle in cycles {
            match file_catalog.file_id(cycle, description) {
                Some(file_id) => available.push((cycle, file_id)),
                None => {
                    warn!(%cycle, file = description, "file not listed for cycle; skipping");
                    skipped.push(cycle);
                }
            }
        }
        if available.is_empty() {
            return Err(NhanesError::NoDataAvailable {
                category: request.category,
                cycle: request.cycles.join(","),
                file_description: request.file_description.clone(),
            });
        }
        let available_cycles: Vec<Cycle> = available.iter().map(|(cycle, _)| *cycle).collect();

        let common = if request.include_uncommon {
            None
        } else {
            Some(match available_cycles.as_slice() {
                [only] => file_catalog.variables(*only).clone(),
                _ => reconcile(&file_catalog, &available_cycles)?.common,
            })
        };

        let mut frames = Vec::with_capacity(available.len());
        for &(cycle, file_id) in &available {
            let mut data = self.fetch_tagged(cycle, file_id)?;
            if let Some(common) = &common {
                data = self.project_common(data, common, cycle, description)?;
            }
            frames.push(data);
        }

        Ok(RetrievedTable {
            data: concat_aligned(frames)?,
            cycles: available_cycles,
            skipped,
        })
    }

    fn fetch_tagged(&self, cycle: Cycle, file_id: &str) -> Result<DataFrame> {
        debug!(%cycle, file_id, "fetching data file");
        let data = self.files().fetch_file(cycle, file_id)?;
        Ok(tag_cycle(data, &self.config().cycle_column, cycle)?)
    }

    fn project_common(
        &self,
        data: DataFrame,
        common: &BTreeSet<String>,
        cycle: Cycle,
        description: &str,
    ) -> Result<DataFrame> {
        let missing = missing_columns(&data, common.iter().map(String::as_str));
        if !missing.is_empty() {
            return Err(NhanesError::MissingVariables {
                file_description: description.to_string(),
                cycle: Some(cycle),
                missing,
            });
        }
        let key = self.config().subject_key.as_str();
        let tag = self.config().cycle_column.as_str();
        Ok(retain_columns(&data, |name| {
            name == key || name == tag || common.contains(name)
        })?)
    }

    /// Subject key first, then the requested columns in request order.
    fn select_variables(
        &self,
        data: &DataFrame,
        variables: &[String],
        request: &RetrieveRequest,
    ) -> Result<DataFrame> {
        let key = self.config().subject_key.as_str();
        let mut wanted: Vec<&str> = vec![key];
        for variable in variables {
            if !wanted.contains(&variable.as_str()) {
                wanted.push(variable);
            }
        }
        let missing = missing_columns(data, wanted.iter().copied());
        if !missing.is_empty() {
            return Err(NhanesError::MissingVariables {
                file_description: request.file_description.clone(),
                cycle: None,
                missing,
            });
        }
        Ok(data.select(wanted)?)
    }
}
