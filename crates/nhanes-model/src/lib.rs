//! Shared NHANES types: the cycle registry, data categories, normalized
//! variable catalogs and the collaborator traits the engine consumes.

pub mod catalog;
pub mod category;
pub mod cycle;
pub mod error;
pub mod source;
pub mod table;

pub use catalog::{Catalog, CatalogRow};
pub use category::Category;
pub use cycle::{CYCLE_LABELS, CYCLE_SEPARATOR, Cycle};
pub use error::{ModelError, Result, SourceError};
pub use source::{CatalogSource, FileSource};
pub use table::RawTable;

/// Column identifying a survey respondent in every data file.
pub const SUBJECT_KEY: &str = "SEQN";

/// Column added to retrieved tables naming each row's source cycle.
pub const CYCLE_COLUMN: &str = "Cycle";
