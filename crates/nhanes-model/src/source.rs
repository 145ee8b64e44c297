//! Contracts for the external collaborators.
//!
//! The engine never fetches anything itself. It asks a [`CatalogSource`] for
//! the raw variable table of a category and a [`FileSource`] for the data file
//! of a cycle. Implementations may hit the network, read a local mirror, or
//! return canned tables in tests.

use polars::prelude::DataFrame;

use crate::category::Category;
use crate::cycle::Cycle;
use crate::error::SourceError;
use crate::table::RawTable;

/// Supplies the raw variable table for a category.
///
/// The table must at least carry begin-year, end-year, file-description,
/// file-identifier and variable-name columns.
pub trait CatalogSource {
    fn fetch_catalog(&self, category: Category) -> Result<RawTable, SourceError>;
}

/// Supplies the data file of one cycle, keyed by a subject identifier column.
pub trait FileSource {
    fn fetch_file(&self, cycle: Cycle, file_id: &str) -> Result<DataFrame, SourceError>;
}

impl<T: CatalogSource + ?Sized> CatalogSource for &T {
    fn fetch_catalog(&self, category: Category) -> Result<RawTable, SourceError> {
        (**self).fetch_catalog(category)
    }
}

impl<T: CatalogSource + ?Sized> CatalogSource for Box<T> {
    fn fetch_catalog(&self, category: Category) -> Result<RawTable, SourceError> {
        (**self).fetch_catalog(category)
    }
}

impl<T: FileSource + ?Sized> FileSource for &T {
    fn fetch_file(&self, cycle: Cycle, file_id: &str) -> Result<DataFrame, SourceError> {
        (**self).fetch_file(cycle, file_id)
    }
}

impl<T: FileSource + ?Sized> FileSource for Box<T> {
    fn fetch_file(&self, cycle: Cycle, file_id: &str) -> Result<DataFrame, SourceError> {
        (**self).fetch_file(cycle, file_id)
    }
}
