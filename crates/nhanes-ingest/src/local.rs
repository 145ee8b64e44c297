//! Offline sources: catalog CSV exports and a mirrored file tree.

use std::fs;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use polars::prelude::DataFrame;
use tracing::debug;

use nhanes_model::{CatalogSource, Category, Cycle, FileSource, RawTable, SourceError};

use crate::xpt::decode_xpt;

/// Reads `<dir>/<category>.csv`, one exported variable list per category.
#[derive(Debug, Clone)]
pub struct CsvCatalogSource {
    root: PathBuf,
}

impl CsvCatalogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, category: Category) -> PathBuf {
        self.root.join(format!("{}.csv", category.as_str()))
    }
}

impl CatalogSource for CsvCatalogSource {
    fn fetch_catalog(&self, category: Category) -> Result<RawTable, SourceError> {
        let path = self.path_for(category);
        if !path.is_file() {
            return Err(SourceError::NotFound {
                origin: path.display().to_string(),
            });
        }
        read_csv_table(&path)
    }
}

/// Read a CSV file into a [`RawTable`]. Ragged rows are tolerated.
pub fn read_csv_table(path: &Path) -> Result<RawTable, SourceError> {
    let origin = path.display().to_string();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| SourceError::parse(&origin, e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SourceError::parse(&origin, e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SourceError::parse(&origin, e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(path = %path.display(), rows = rows.len(), "read catalog CSV");
    Ok(RawTable::new(headers, rows))
}

/// Reads data files from a local mirror laid out as
/// `<dir>/<cycle>/<FILE>.XPT`.
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    root: PathBuf,
}

impl LocalFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locate a file, accepting either `.XPT` or `.xpt`.
    pub fn locate(&self, cycle: Cycle, file_id: &str) -> Option<PathBuf> {
        let dir = self.root.join(cycle.label());
        [format!("{file_id}.XPT"), format!("{file_id}.xpt")]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }
}

impl FileSource for LocalFileSource {
    fn fetch_file(&self, cycle: Cycle, file_id: &str) -> Result<DataFrame, SourceError> {
        let path = self
            .locate(cycle, file_id)
            .ok_or_else(|| SourceError::NotFound {
                origin: self
                    .root
                    .join(cycle.label())
                    .join(format!("{file_id}.XPT"))
                    .display()
                    .to_string(),
            })?;
        let bytes = fs::read(&path).map_err(|e| SourceError::io(&path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "read mirrored data file");
        decode_xpt(&bytes, &path.display().to_string())
    }
}
