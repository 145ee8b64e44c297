//! Conversion between transport datasets and Polars DataFrames.

use std::path::Path;

use polars::prelude::*;

use crate::error::{Result, XptError};
use crate::reader::read_xpt;
use crate::types::{XptColumn, XptDataset, XptType, XptValue, XptWriterOptions};
use crate::writer::write_xpt;

/// Longest character variable a V5 file can hold.
const MAX_CHAR_LEN: usize = 200;

/// Build a DataFrame with one Float64 or String column per variable.
pub fn dataset_to_dataframe(dataset: &XptDataset) -> Result<DataFrame> {
    let columns = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let name = PlSmallStr::from(column.name.as_str());
            match column.data_type {
                XptType::Num => {
                    let values: Vec<Option<f64>> = dataset
                        .rows
                        .iter()
                        .map(|row| match row.get(idx) {
                            Some(XptValue::Num(value)) => *value,
                            Some(XptValue::Char(text)) => text.trim().parse().ok(),
                            None => None,
                        })
                        .collect();
                    Series::new(name, values).into_column()
                }
                XptType::Char => {
                    let values: Vec<Option<String>> = dataset
                        .rows
                        .iter()
                        .map(|row| match row.get(idx) {
                            Some(XptValue::Char(text)) => Some(text.clone()),
                            Some(XptValue::Num(value)) => value.map(|v| v.to_string()),
                            None => None,
                        })
                        .collect();
                    Series::new(name, values).into_column()
                }
            }
        })
        .collect::<Vec<_>>();
    Ok(DataFrame::new(columns)?)
}

/// Build a dataset from a DataFrame. Numeric columns become 8-byte
/// numerics; everything else is stored as text sized to its longest value.
pub fn dataframe_to_dataset(name: &str, df: &DataFrame) -> Result<XptDataset> {
    let height = df.height();
    let mut columns = Vec::with_capacity(df.width());
    let mut values: Vec<Vec<XptValue>> = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let column_name = column.name().to_string();
        if is_numeric(column.dtype()) {
            let cast = column.cast(&DataType::Float64)?;
            let data = cast.as_materialized_series().f64()?;
            values.push(data.into_iter().map(XptValue::Num).collect());
            columns.push(XptColumn::numeric(column_name));
        } else {
            let cast = column
                .cast(&DataType::String)
                .map_err(|_| XptError::UnsupportedType {
                    name: column_name.clone(),
                    dtype: column.dtype().to_string(),
                })?;
            let data = cast.as_materialized_series().str()?;
            let texts: Vec<String> = data
                .into_iter()
                .map(|value| value.unwrap_or_default().to_string())
                .collect();
            let width = texts
                .iter()
                .map(String::len)
                .max()
                .unwrap_or(0)
                .clamp(1, MAX_CHAR_LEN);
            values.push(texts.into_iter().map(XptValue::Char).collect());
            columns.push(XptColumn::character(column_name, width as u16));
        }
    }

    let mut dataset = XptDataset::with_columns(name, columns);
    for row_idx in 0..height {
        dataset.add_row(values.iter().map(|col| col[row_idx].clone()).collect());
    }
    Ok(dataset)
}

/// Read an XPT file straight into a DataFrame.
pub fn read_xpt_to_dataframe(path: &Path) -> Result<DataFrame> {
    dataset_to_dataframe(&read_xpt(path)?)
}

/// Write a DataFrame as a single-member XPT file.
pub fn write_dataframe_to_xpt(
    path: &Path,
    name: &str,
    df: &DataFrame,
    options: &XptWriterOptions,
) -> Result<()> {
    write_xpt(path, &dataframe_to_dataset(name, df)?, options)
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}
