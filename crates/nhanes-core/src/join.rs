//! Joining two files of the same cycles on the subject key.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use nhanes_model::{Catalog, CatalogSource, Category, Cycle, FileSource};

use crate::accessor::{Nhanes, file_names_in};
use crate::error::{NhanesError, Result};
use crate::retrieve::{RetrieveRequest, RetrievedTable};

/// One side of a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSide {
    pub category: Category,
    pub file_description: String,
}

impl JoinSide {
    pub fn new(category: Category, file_description: impl Into<String>) -> Self {
        Self {
            category,
            file_description: file_description.into(),
        }
    }
}

/// Two files retrieved over the same cycle tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub cycles: Vec<String>,
    pub left: JoinSide,
    pub right: JoinSide,
    #[serde(default = "default_include_uncommon")]
    pub include_uncommon: bool,
}

fn default_include_uncommon() -> bool {
    true
}

impl JoinRequest {
    pub fn new<I, S>(cycles: I, left: JoinSide, right: JoinSide) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cycles: cycles.into_iter().map(Into::into).collect(),
            left,
            right,
            include_uncommon: true,
        }
    }

    #[must_use]
    pub fn include_uncommon(mut self, include: bool) -> Self {
        self.include_uncommon = include;
        self
    }

    fn retrieve_request(&self, side: &JoinSide) -> RetrieveRequest {
        RetrieveRequest::new(side.category, self.cycles.clone(), side.file_description.clone())
            .include_uncommon(self.include_uncommon)
    }
}

impl<C: CatalogSource, F: FileSource> Nhanes<C, F> {
    /// Inner-join two files on the subject key.
    ///
    /// Both file descriptions are checked against their catalogs before
    /// anything is fetched. The result keeps the left side's cycle column.
    pub fn join(&self, request: &JoinRequest) -> Result<DataFrame> {
        let span = info_span!(
            "join",
            cycles = %request.cycles.join(","),
            left = %request.left.file_description,
            right = %request.right.file_description,
        );
        let _guard = span.enter();

        let cycles = self.resolve_required(&request.cycles)?;
        let left_catalog = self.catalog(request.left.category)?;
        let right_catalog = self.catalog(request.right.category)?;
        ensure_available(&left_catalog, &cycles, &request.left, &request.cycles)?;
        ensure_available(&right_catalog, &cycles, &request.right, &request.cycles)?;

        let left = self.retrieve_from(&left_catalog, &cycles, &request.retrieve_request(&request.left))?;
        let right =
            self.retrieve_from(&right_catalog, &cycles, &request.retrieve_request(&request.right))?;

        let joined = self.join_tables(left, &request.left, right, &request.right)?;
        info!(rows = joined.height(), columns = joined.width(), "joined data");
        Ok(joined)
    }

    fn join_tables(
        &self,
        left: RetrievedTable,
        left_side: &JoinSide,
        right: RetrievedTable,
        right_side: &JoinSide,
    ) -> Result<DataFrame> {
        let key = self.config().subject_key.as_str();
        for (table, side) in [(&left, left_side), (&right, right_side)] {
            if table.data.column(key).is_err() {
                return Err(NhanesError::JoinKey {
                    key: key.to_string(),
                    category: side.category,
                    file_description: side.file_description.clone(),
                });
            }
        }

        let tag = self.config().cycle_column.as_str();
        let right_data = if right.data.column(tag).is_ok() {
            right.data.drop(tag)?
        } else {
            right.data
        };

        Ok(left
            .data
            .lazy()
            .inner_join(right_data.lazy(), col(key), col(key))
            .collect()?)
    }
}

fn ensure_available(
    catalog: &Catalog,
    cycles: &[Cycle],
    side: &JoinSide,
    tokens: &[String],
) -> Result<()> {
    let available = file_names_in(catalog, Some(cycles)).unwrap_or_default();
    if available.contains(&side.file_description) {
        Ok(())
    } else {
        Err(NhanesError::FileNotAvailable {
            category: side.category,
            cycle: tokens.join(","),
            file_description: side.file_description.clone(),
        })
    }
}
