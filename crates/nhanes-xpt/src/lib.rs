//! SAS Transport (XPT) file format reader and writer.
//!
//! NHANES publishes every data file as a SAS Transport V5 file. This crate
//! reads the first member of such a file and writes single-member files.
//!
//! # Features
//!
//! - IEEE ↔ IBM mainframe floating-point conversion
//! - All 28 SAS missing value codes (`.`, `._`, `.A`-`.Z`) read as missing
//! - Optional Polars DataFrame integration (with `polars` feature)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use nhanes_xpt::{XptColumn, XptDataset, XptValue, XptWriterOptions, read_xpt, write_xpt};
//!
//! let dataset = read_xpt(Path::new("DEMO_D.XPT")).unwrap();
//! println!("Dataset: {} ({} rows)", dataset.name, dataset.num_rows());
//!
//! let mut ds = XptDataset::with_columns(
//!     "DEMO",
//!     vec![
//!         XptColumn::numeric("SEQN").with_label("Respondent sequence number"),
//!         XptColumn::character("Cycle", 9),
//!     ],
//! );
//! ds.add_row(vec![XptValue::numeric(31127.0), XptValue::character("2005-2006")]);
//! write_xpt(Path::new("demo_out.xpt"), &ds, &XptWriterOptions::default()).unwrap();
//! ```

mod error;
pub mod float;
pub mod header;
mod reader;
mod types;
mod writer;

#[cfg(feature = "polars")]
mod polars_ext;

pub use error::{Result, XptError};

pub use types::{XptColumn, XptDataset, XptReaderOptions, XptType, XptValue, XptWriterOptions};

pub use reader::{XptReader, read_xpt, read_xpt_bytes};

pub use writer::{MAX_NAME_LEN, XptWriter, to_bytes, write_xpt};

#[cfg(feature = "polars")]
pub use polars_ext::{
    dataframe_to_dataset, dataset_to_dataframe, read_xpt_to_dataframe, write_dataframe_to_xpt,
};
