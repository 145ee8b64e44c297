//! Writing retrieved tables to disk.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use polars::prelude::*;
use tracing::info;

use nhanes_xpt::{MAX_NAME_LEN, XptWriterOptions, write_dataframe_to_xpt};

/// File formats a table can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Xpt,
}

impl OutputFormat {
    /// Pick the format from the path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "xpt" => Some(Self::Xpt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Xpt => "XPT",
        }
    }
}

/// Write `df` to `path` in the format its extension names.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<OutputFormat> {
    let Some(format) = OutputFormat::from_path(path) else {
        bail!(
            "unsupported output extension for {} (expected .csv or .xpt)",
            path.display()
        );
    };
    match format {
        OutputFormat::Csv => {
            let mut file =
                File::create(path).with_context(|| format!("create {}", path.display()))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(df)
                .with_context(|| format!("write {}", path.display()))?;
        }
        OutputFormat::Xpt => {
            let name = dataset_name(path);
            write_dataframe_to_xpt(path, &name, df, &XptWriterOptions::default())
                .with_context(|| format!("write {}", path.display()))?;
        }
    }
    info!(
        path = %path.display(),
        format = format.as_str(),
        rows = df.height(),
        "wrote table"
    );
    Ok(format)
}

/// Transport member name derived from the file stem: uppercase
/// alphanumerics and underscores, starting with a letter, at most eight long.
pub fn dataset_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let mut name: String = stem
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .map(|ch| ch.to_ascii_uppercase())
        .collect();
    if name.is_empty() {
        name.push_str("DATA");
    } else if name.starts_with(|ch: char| ch.is_ascii_digit()) {
        name.insert(0, 'D');
    }
    name.truncate(MAX_NAME_LEN);
    name
}
