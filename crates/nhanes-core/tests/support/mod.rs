//! In-memory catalog and file sources.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use polars::prelude::*;

use nhanes_model::{CatalogSource, Category, Cycle, FileSource, RawTable, SourceError};

const HEADERS: [&str; 8] = [
    "Variable Name",
    "Variable Description",
    "Data File Name",
    "Data File Description",
    "Begin Year",
    "EndYear",
    "Component",
    "Use Constraints",
];

/// Canned variable tables, counting fetches.
#[derive(Default)]
pub struct MockCatalogs {
    tables: HashMap<Category, RawTable>,
    pub fetches: RefCell<Vec<Category>>,
}

impl MockCatalogs {
    /// Add catalog rows as `(begin, end, file_id, description, variable)`.
    pub fn with_rows(mut self, category: Category, rows: &[(&str, &str, &str, &str, &str)]) -> Self {
        let rows = rows
            .iter()
            .map(|(begin, end, file_id, description, variable)| {
                vec![
                    variable.to_string(),
                    format!("{variable} description"),
                    file_id.to_string(),
                    description.to_string(),
                    begin.to_string(),
                    end.to_string(),
                    category.component().to_string(),
                    "None".to_string(),
                ]
            })
            .collect();
        let headers = HEADERS.iter().map(|h| h.to_string()).collect();
        self.tables.insert(category, RawTable::new(headers, rows));
        self
    }

    pub fn with_table(mut self, category: Category, table: RawTable) -> Self {
        self.tables.insert(category, table);
        self
    }
}

impl CatalogSource for MockCatalogs {
    fn fetch_catalog(&self, category: Category) -> Result<RawTable, SourceError> {
        self.fetches.borrow_mut().push(category);
        self.tables
            .get(&category)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                origin: format!("catalog {category}"),
            })
    }
}

/// Canned data files keyed by `(cycle label, file id)`, logging fetches.
#[derive(Default)]
pub struct MockFiles {
    files: HashMap<(String, String), DataFrame>,
    pub fetches: RefCell<Vec<String>>,
}

impl MockFiles {
    pub fn with_file(mut self, cycle: &str, file_id: &str, data: DataFrame) -> Self {
        self.files
            .insert((cycle.to_string(), file_id.to_string()), data);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetches.borrow().clone()
    }
}

impl FileSource for MockFiles {
    fn fetch_file(&self, cycle: Cycle, file_id: &str) -> Result<DataFrame, SourceError> {
        self.fetches
            .borrow_mut()
            .push(format!("{}/{file_id}", cycle.label()));
        self.files
            .get(&(cycle.label().to_string(), file_id.to_string()))
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                origin: format!("{}/{file_id}.XPT", cycle.label()),
            })
    }
}

pub const BODY_MEASURES: &str = "Body Measures";
pub const BLOOD_PRESSURE: &str = "Blood Pressure";
pub const ODDITIES: &str = "Oddities";

/// Examination: Body Measures in 1999-2000, 2001-2002 and 2005-2006;
/// Blood Pressure and Oddities (no SEQN column) in 2005-2006 only.
/// Demographics in 1999-2000 and 2005-2006.
pub fn catalogs() -> MockCatalogs {
    MockCatalogs::default()
        .with_rows(
            Category::Examination,
            &[
                ("1999", "2000", "BMX", BODY_MEASURES, "SEQN"),
                ("1999", "2000", "BMX", BODY_MEASURES, "BMXWT"),
                ("1999", "2000", "BMX", BODY_MEASURES, "BMDSTATS"),
                ("2001", "2002", "BMX_B", BODY_MEASURES, "SEQN"),
                ("2001", "2002", "BMX_B", BODY_MEASURES, "BMXWT"),
                ("2001", "2002", "BMX_B", BODY_MEASURES, "BMXSAD1"),
                ("2005", "2006", "BMX_D", BODY_MEASURES, "SEQN"),
                ("2005", "2006", "BMX_D", BODY_MEASURES, "BMXWT"),
                ("2005", "2006", "BMX_D", BODY_MEASURES, "BMXHT"),
                ("2005", "2006", "BPX_D", BLOOD_PRESSURE, "SEQN"),
                ("2005", "2006", "BPX_D", BLOOD_PRESSURE, "BPXSY1"),
                ("2005", "2006", "ODD_D", ODDITIES, "X"),
                // outside the registry
                ("2017", "2020", "P_BMX", BODY_MEASURES, "BMXWT"),
            ],
        )
        .with_rows(
            Category::Demographics,
            &[
                ("1999", "2000", "DEMO", "Demographics Data", "SEQN"),
                ("1999", "2000", "DEMO", "Demographics Data", "RIAGENDR"),
                ("2005", "2006", "DEMO_D", "Demographic Variables and Sample Weights", "SEQN"),
                ("2005", "2006", "DEMO_D", "Demographic Variables and Sample Weights", "RIAGENDR"),
                ("2005", "2006", "DEMO_D", "Demographic Variables and Sample Weights", "RIDAGEYR"),
            ],
        )
}

pub fn files() -> MockFiles {
    MockFiles::default()
        .with_file(
            "1999-2000",
            "BMX",
            df!(
                "SEQN" => [1.0f64, 2.0, 3.0],
                "BMXWT" => [70.1f64, 80.2, 65.0],
                "BMDSTATS" => [1.0f64, 1.0, 2.0],
            )
            .unwrap(),
        )
        .with_file(
            "2001-2002",
            "BMX_B",
            df!(
                "SEQN" => [4.0f64, 5.0],
                "BMXWT" => [55.5f64, 90.0],
                "BMXSAD1" => [20.1f64, 22.4],
            )
            .unwrap(),
        )
        .with_file(
            "2005-2006",
            "BMX_D",
            df!(
                "SEQN" => [6.0f64, 7.0, 8.0],
                "BMXWT" => [61.0f64, 72.3, 88.8],
                "BMXHT" => [160.2f64, 171.0, 182.5],
            )
            .unwrap(),
        )
        .with_file(
            "2005-2006",
            "BPX_D",
            df!(
                "SEQN" => [6.0f64, 8.0, 9.0],
                "BPXSY1" => [118.0f64, 132.0, 124.0],
            )
            .unwrap(),
        )
        .with_file("2005-2006", "ODD_D", df!("X" => [1.0f64]).unwrap())
        .with_file(
            "1999-2000",
            "DEMO",
            df!("SEQN" => [1.0f64, 2.0], "RIAGENDR" => [1.0f64, 2.0]).unwrap(),
        )
        .with_file(
            "2005-2006",
            "DEMO_D",
            df!(
                "SEQN" => [6.0f64, 7.0, 8.0, 9.0, 10.0],
                "RIAGENDR" => [1.0f64, 2.0, 2.0, 1.0, 1.0],
                "RIDAGEYR" => [34.0f64, 61.0, 8.0, 45.0, 19.0],
            )
            .unwrap(),
        )
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn cycle_values(df: &DataFrame, column: &str) -> Vec<String> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect()
}
