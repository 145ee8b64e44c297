//! Library side of the `nhanes` binary: logging, source selection,
//! fetch progress and table output.

pub mod logging;
pub mod output;
pub mod progress;
pub mod sources;
