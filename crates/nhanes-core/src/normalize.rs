//! Raw variable table → normalized [`Catalog`].

use tracing::debug;

use nhanes_model::{Catalog, CatalogRow, Category, Cycle, RawTable};

use crate::error::{NhanesError, Result};

pub const VARIABLE_NAME: &str = "Variable Name";
pub const VARIABLE_DESCRIPTION: &str = "Variable Description";
pub const DATA_FILE_NAME: &str = "Data File Name";
pub const DATA_FILE_DESCRIPTION: &str = "Data File Description";
pub const BEGIN_YEAR: &str = "Begin Year";
pub const END_YEAR: &str = "EndYear";

/// Category-specific adjustments applied while normalizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryPolicy {
    /// Replace every row's file description with this label.
    pub file_description: Option<&'static str>,
}

/// The remote catalog splits demographics over several descriptions, but
/// every cycle ships exactly one demographics file.
pub const DEMOGRAPHICS_FILE_DESCRIPTION: &str = "Demographic Variables & Sample Weights";

const POLICIES: &[(Category, CategoryPolicy)] = &[(
    Category::Demographics,
    CategoryPolicy {
        file_description: Some(DEMOGRAPHICS_FILE_DESCRIPTION),
    },
)];

/// Policy for `category`; categories without an entry get the default.
pub fn policy_for(category: Category) -> CategoryPolicy {
    POLICIES
        .iter()
        .find(|(candidate, _)| *candidate == category)
        .map(|(_, policy)| *policy)
        .unwrap_or_default()
}

/// Normalize a raw variable table into a catalog.
///
/// Rows whose begin/end years do not form a registered cycle are dropped, as
/// are rows without a variable name. Columns outside the canonical schema are
/// ignored.
pub fn normalize(category: Category, table: &RawTable) -> Result<Catalog> {
    let required = [BEGIN_YEAR, END_YEAR, VARIABLE_NAME, DATA_FILE_NAME, DATA_FILE_DESCRIPTION];
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !table.has_column(name))
        .map(|name| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(NhanesError::CatalogFormat { category, missing });
    }

    let index = |name: &str| table.column_index(name).unwrap_or_default();
    let begin = index(BEGIN_YEAR);
    let end = index(END_YEAR);
    let variable = index(VARIABLE_NAME);
    let file_id = index(DATA_FILE_NAME);
    let file_description = index(DATA_FILE_DESCRIPTION);
    let variable_description = table.column_index(VARIABLE_DESCRIPTION);

    let policy = policy_for(category);
    let mut dropped = 0usize;
    let rows: Vec<CatalogRow> = table
        .rows
        .iter()
        .filter_map(|row| {
            let cycle = Cycle::from_years(cell(row, begin), cell(row, end));
            let name = cell(row, variable);
            let Some(cycle) = cycle.filter(|_| !name.is_empty()) else {
                dropped += 1;
                return None;
            };
            Some(CatalogRow {
                category,
                cycle,
                file_description: policy
                    .file_description
                    .unwrap_or_else(|| cell(row, file_description))
                    .to_string(),
                file_id: cell(row, file_id).to_string(),
                variable: name.to_string(),
                variable_description: variable_description
                    .map(|idx| cell(row, idx))
                    .filter(|text| !text.is_empty())
                    .map(str::to_string),
            })
        })
        .collect();

    debug!(%category, kept = rows.len(), dropped, "normalized variable table");
    if rows.is_empty() {
        return Err(NhanesError::CatalogEmpty {
            category,
            scope: None,
        });
    }
    Ok(Catalog::new(category, rows))
}

/// Cell text, empty when the row is shorter than the header.
fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map_or("", String::as_str)
}
