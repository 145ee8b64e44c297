//! Cycle resolution and variable reconciliation engine for NHANES.
//!
//! The pipeline runs registry → resolver → normalizer → reconciler →
//! retriever → joiner. [`Nhanes`] ties the stages to a
//! [`CatalogSource`](nhanes_model::CatalogSource) and a
//! [`FileSource`](nhanes_model::FileSource):
//!
//! ```no_run
//! # use nhanes_core::{Nhanes, RetrieveRequest};
//! # use nhanes_model::{Category, CatalogSource, FileSource};
//! # fn demo(catalogs: impl CatalogSource, files: impl FileSource) -> nhanes_core::Result<()> {
//! let nhanes = Nhanes::new(catalogs, files);
//! let request = RetrieveRequest::new(Category::Examination, ["2005-2009"], "Body Measures")
//!     .include_uncommon(false);
//! let table = nhanes.retrieve(&request)?;
//! println!("{} rows from {} cycles", table.data.height(), table.cycles.len());
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod config;
pub mod error;
pub mod frame;
pub mod join;
pub mod normalize;
pub mod reconcile;
pub mod resolve;
pub mod retrieve;

pub use accessor::Nhanes;
pub use config::{NhanesConfig, RangePolicy};
pub use error::{NhanesError, Result};
pub use join::{JoinRequest, JoinSide};
pub use normalize::{CategoryPolicy, DEMOGRAPHICS_FILE_DESCRIPTION, normalize, policy_for};
pub use reconcile::{Reconciliation, reconcile};
pub use resolve::{CycleResolver, distinct_cycles, resolve, unique_cycles};
pub use retrieve::{RetrieveRequest, RetrievedTable};
