use std::fs;

use nhanes_ingest::{CsvCatalogSource, LocalFileSource};
use nhanes_model::{CatalogSource, Category, Cycle, FileSource, SourceError};
use nhanes_xpt::{XptColumn, XptDataset, XptValue, XptWriterOptions, write_xpt};
use polars::prelude::DataType;

const DEMOGRAPHICS_CSV: &str = "\u{feff}Variable Name,Variable Description,Data File Name,Data File Description,Begin Year,EndYear,Component,Use Constraints
SEQN,Respondent sequence number.,DEMO,Demographic Variables and Sample Weights,1999,2000,Demographics,None
RIAGENDR,Gender,DEMO_B,Demographic Variables and Sample Weights,2001,2002,Demographics
";

#[test]
fn csv_catalog_reads_category_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("demographics.csv"), DEMOGRAPHICS_CSV).unwrap();

    let source = CsvCatalogSource::new(dir.path());
    let table = source.fetch_catalog(Category::Demographics).unwrap();

    assert_eq!(table.headers[0], "Variable Name");
    assert!(table.has_column("EndYear"));
    assert_eq!(table.num_rows(), 2);
    // short row padded to the header width
    assert_eq!(table.rows[1].len(), table.headers.len());
    assert_eq!(table.rows[1][7], "");
}

#[test]
fn csv_catalog_missing_category_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = CsvCatalogSource::new(dir.path());
    assert!(matches!(
        source.fetch_catalog(Category::Dietary),
        Err(SourceError::NotFound { .. })
    ));
}

#[test]
fn local_mirror_decodes_xpt() {
    let dir = tempfile::tempdir().unwrap();
    let cycle = Cycle::from_label("2005-2006").unwrap();
    let cycle_dir = dir.path().join(cycle.label());
    fs::create_dir_all(&cycle_dir).unwrap();

    let mut dataset = XptDataset::with_columns(
        "DEMO_D",
        vec![XptColumn::numeric("SEQN"), XptColumn::character("SDDSRVYR", 4)],
    );
    dataset.add_row(vec![XptValue::numeric(31127.0), XptValue::character("4")]);
    dataset.add_row(vec![XptValue::Num(None), XptValue::character("4")]);
    // lowercase extension is accepted too
    write_xpt(
        &cycle_dir.join("DEMO_D.xpt"),
        &dataset,
        &XptWriterOptions::default(),
    )
    .unwrap();

    let source = LocalFileSource::new(dir.path());
    let df = source.fetch_file(cycle, "DEMO_D").unwrap();

    assert_eq!(df.shape(), (2, 2));
    let seqn = df.column("SEQN").unwrap();
    assert_eq!(seqn.dtype(), &DataType::Float64);
    assert_eq!(seqn.null_count(), 1);
    assert_eq!(df.column("SDDSRVYR").unwrap().dtype(), &DataType::String);
}

#[test]
fn local_mirror_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = LocalFileSource::new(dir.path());
    let cycle = Cycle::from_label("1999-2000").unwrap();
    assert!(matches!(
        source.fetch_file(cycle, "DEMO"),
        Err(SourceError::NotFound { .. })
    ));
}

#[test]
fn local_mirror_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let cycle = Cycle::from_label("1999-2000").unwrap();
    let cycle_dir = dir.path().join(cycle.label());
    fs::create_dir_all(&cycle_dir).unwrap();
    fs::write(cycle_dir.join("DEMO.XPT"), b"not a transport file").unwrap();

    let source = LocalFileSource::new(dir.path());
    assert!(matches!(
        source.fetch_file(cycle, "DEMO"),
        Err(SourceError::Decode { .. })
    ));
}
