//! Core types for XPT file handling.

use std::fmt;

use chrono::{Local, NaiveDateTime};

/// Variable storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XptType {
    Num,
    Char,
}

impl XptType {
    /// Decode the NAMESTR `ntype` field (1 = numeric, 2 = character).
    pub fn from_ntype(ntype: i16) -> Option<Self> {
        match ntype {
            1 => Some(Self::Num),
            2 => Some(Self::Char),
            _ => None,
        }
    }

    pub fn to_ntype(self) -> i16 {
        match self {
            Self::Num => 1,
            Self::Char => 2,
        }
    }
}

impl fmt::Display for XptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num => f.write_str("Num"),
            Self::Char => f.write_str("Char"),
        }
    }
}

/// Variable definition parsed from (or written to) a NAMESTR record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XptColumn {
    pub name: String,
    pub label: Option<String>,
    pub data_type: XptType,
    /// Width in bytes within an observation.
    pub length: u16,
}

impl XptColumn {
    /// An 8-byte numeric column.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            data_type: XptType::Num,
            length: 8,
        }
    }

    /// A character column of `length` bytes.
    pub fn character(name: impl Into<String>, length: u16) -> Self {
        Self {
            name: name.into(),
            label: None,
            data_type: XptType::Char,
            length,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A single cell value. Numeric `None` is a SAS missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum XptValue {
    Num(Option<f64>),
    Char(String),
}

impl XptValue {
    pub fn numeric(value: f64) -> Self {
        Self::Num(Some(value))
    }

    pub fn character(value: impl Into<String>) -> Self {
        Self::Char(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Num(None))
    }
}

/// One member (dataset) of a transport file.
#[derive(Debug, Clone, PartialEq)]
pub struct XptDataset {
    pub name: String,
    pub label: Option<String>,
    pub columns: Vec<XptColumn>,
    pub rows: Vec<Vec<XptValue>>,
}

impl XptDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_columns(name, Vec::new())
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<XptColumn>) -> Self {
        Self {
            name: name.into(),
            label: None,
            columns,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn add_row(&mut self, row: Vec<XptValue>) {
        self.rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_by_name(&self, name: &str) -> Option<&XptColumn> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Options for reading transport files.
#[derive(Debug, Clone)]
pub struct XptReaderOptions {
    /// Trim trailing spaces from character values.
    pub trim_strings: bool,
}

impl Default for XptReaderOptions {
    fn default() -> Self {
        Self { trim_strings: true }
    }
}

/// Options for writing transport files.
#[derive(Debug, Clone)]
pub struct XptWriterOptions {
    pub sas_version: String,
    pub os_name: String,
    /// Creation timestamp; `None` stamps the current local time.
    pub created: Option<NaiveDateTime>,
}

impl Default for XptWriterOptions {
    fn default() -> Self {
        Self {
            sas_version: "9.4".to_string(),
            os_name: "RUST".to_string(),
            created: None,
        }
    }
}

impl XptWriterOptions {
    /// Created datetime in transport format (`ddMMMyy:hh:mm:ss`).
    pub fn format_created(&self) -> String {
        let created = self.created.unwrap_or_else(|| Local::now().naive_local());
        created.format("%d%b%y:%H:%M:%S").to_string().to_uppercase()
    }
}
