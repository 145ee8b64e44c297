//! Concrete catalog and file sources.
//!
//! - [`HttpCatalogSource`] scrapes the variable list page of the CDC site
//! - [`HttpFileSource`] downloads `.XPT` data files
//! - [`CsvCatalogSource`] reads exported variable lists from disk
//! - [`LocalFileSource`] reads a mirrored `<cycle>/<FILE>.XPT` tree

pub mod html;
pub mod http;
pub mod local;
pub mod xpt;

pub use html::parse_first_table;
pub use http::{
    CATALOG_URL_ENV, DATA_URL_ENV, DEFAULT_CATALOG_URL, DEFAULT_DATA_URL, DEFAULT_TIMEOUT,
    HttpCatalogSource, HttpConfig, HttpFileSource,
};
pub use local::{CsvCatalogSource, LocalFileSource, read_csv_table};
pub use xpt::decode_xpt;
