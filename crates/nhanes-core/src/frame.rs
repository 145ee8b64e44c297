//! DataFrame helpers for retrieved tables.

use std::collections::HashMap;

use polars::prelude::*;

use nhanes_model::Cycle;

/// Add (or overwrite) a string column naming `cycle` on every row.
pub fn tag_cycle(mut df: DataFrame, column: &str, cycle: Cycle) -> PolarsResult<DataFrame> {
    let labels = vec![cycle.label(); df.height()];
    df.with_column(Series::new(column.into(), labels))?;
    Ok(df)
}

/// Names in `wanted` that `df` does not have.
pub fn missing_columns<'a>(df: &DataFrame, wanted: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    wanted
        .into_iter()
        .filter(|name| df.column(name).is_err())
        .map(str::to_string)
        .collect()
}

/// Keep only the columns for which `keep` returns true, in frame order.
pub fn retain_columns(df: &DataFrame, keep: impl Fn(&str) -> bool) -> PolarsResult<DataFrame> {
    let names: Vec<PlSmallStr> = df
        .get_column_names()
        .into_iter()
        .filter(|name| keep(name.as_str()))
        .cloned()
        .collect();
    df.select(names)
}

/// Stack frames whose column sets differ.
///
/// The result has the union of all columns in first-seen order. A column
/// absent from a frame is filled with nulls for that frame's rows; a column
/// whose type differs between frames is widened to `String`.
pub fn concat_aligned(frames: Vec<DataFrame>) -> PolarsResult<DataFrame> {
    let mut order: Vec<PlSmallStr> = Vec::new();
    let mut dtypes: HashMap<PlSmallStr, DataType> = HashMap::new();
    for df in &frames {
        for column in df.get_columns() {
            match dtypes.get_mut(column.name()) {
                None => {
                    order.push(column.name().clone());
                    dtypes.insert(column.name().clone(), column.dtype().clone());
                }
                Some(dtype) if *dtype == DataType::Null => *dtype = column.dtype().clone(),
                Some(dtype) if dtype != column.dtype() && *column.dtype() != DataType::Null => {
                    *dtype = DataType::String;
                }
                Some(_) => {}
            }
        }
    }

    let mut combined: Option<DataFrame> = None;
    for df in frames {
        let height = df.height();
        let columns = order
            .iter()
            .map(|name| {
                let dtype = &dtypes[name];
                match df.column(name) {
                    Ok(column) if column.dtype() == dtype => Ok(column.clone()),
                    Ok(column) => column.cast(dtype),
                    Err(_) => Ok(Column::full_null(name.clone(), height, dtype)),
                }
            })
            .collect::<PolarsResult<Vec<_>>>()?;
        let aligned = DataFrame::new(columns)?;
        match combined.as_mut() {
            Some(existing) => {
                existing.vstack_mut(&aligned)?;
            }
            None => combined = Some(aligned),
        }
    }
    Ok(combined.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_every_row() {
        let df = df!("SEQN" => [1.0f64, 2.0]).unwrap();
        let cycle = Cycle::from_label("2005-2006").unwrap();
        let tagged = tag_cycle(df, "Cycle", cycle).unwrap();
        let values: Vec<Option<&str>> = tagged
            .column("Cycle")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some("2005-2006"), Some("2005-2006")]);
    }

    #[test]
    fn concat_fills_missing_columns_with_nulls() {
        let first = df!("SEQN" => [1.0f64, 2.0], "A" => [10.0f64, 20.0]).unwrap();
        let second = df!("SEQN" => [3.0f64], "B" => ["x"]).unwrap();
        let combined = concat_aligned(vec![first, second]).unwrap();

        assert_eq!(combined.height(), 3);
        let names: Vec<&str> = combined
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(names, ["SEQN", "A", "B"]);
        assert_eq!(combined.column("A").unwrap().null_count(), 1);
        assert_eq!(combined.column("B").unwrap().null_count(), 2);
    }

    #[test]
    fn concat_widens_conflicting_types() {
        let first = df!("X" => [1.0f64]).unwrap();
        let second = df!("X" => ["a"]).unwrap();
        let combined = concat_aligned(vec![first, second]).unwrap();
        assert_eq!(combined.column("X").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn retain_and_missing() {
        let df = df!("SEQN" => [1.0f64], "A" => [1.0f64], "B" => [2.0f64]).unwrap();
        let kept = retain_columns(&df, |name| name != "A").unwrap();
        assert_eq!(kept.width(), 2);
        assert_eq!(missing_columns(&kept, ["SEQN", "A"]), vec!["A".to_string()]);
    }
}
