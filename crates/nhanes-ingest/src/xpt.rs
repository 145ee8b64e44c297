//! Decoding transport-file payloads into DataFrames.

use polars::prelude::DataFrame;

use nhanes_model::SourceError;
use nhanes_xpt::{dataset_to_dataframe, read_xpt_bytes};

/// Decode an XPT payload: character variables become `String` columns,
/// numeric ones nullable `Float64` with SAS missing codes as null.
pub fn decode_xpt(bytes: &[u8], origin: &str) -> Result<DataFrame, SourceError> {
    let dataset = read_xpt_bytes(bytes).map_err(|e| SourceError::decode(origin, e.to_string()))?;
    dataset_to_dataframe(&dataset).map_err(|e| SourceError::decode(origin, e.to_string()))
}
