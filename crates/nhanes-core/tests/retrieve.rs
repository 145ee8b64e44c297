mod support;

use nhanes_core::{Nhanes, NhanesError, RetrieveRequest};
use nhanes_model::{Category, Cycle, RawTable};

use support::{BLOOD_PRESSURE, BODY_MEASURES, catalogs, column_names, cycle_values, files};

fn cycle(label: &str) -> Cycle {
    Cycle::from_label(label).unwrap()
}

#[test]
fn single_cycle_takes_the_fast_path() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Examination, ["2005"], BODY_MEASURES)
        .include_uncommon(false);
    let table = nhanes.retrieve(&request).unwrap();

    assert_eq!(table.data.height(), 3);
    assert_eq!(column_names(&table.data), ["SEQN", "BMXWT", "BMXHT", "Cycle"]);
    assert_eq!(cycle_values(&table.data, "Cycle"), ["2005-2006"; 3]);
    assert_eq!(table.cycles, [cycle("2005-2006")]);
    assert_eq!(files.fetched(), ["2005-2006/BMX_D"]);
    assert_eq!(catalogs.fetches.borrow().len(), 1);
}

#[test]
fn single_cycle_without_file_is_file_not_found() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Examination, ["2003"], BODY_MEASURES);
    match nhanes.retrieve(&request) {
        Err(NhanesError::FileNotFound { cycle, .. }) => {
            assert_eq!(cycle, Some(self::cycle("2003-2004")));
        }
        other => panic!("expected FileNotFound, got {other:?}"),
    }
    assert!(files.fetched().is_empty());
}

#[test]
fn common_only_projects_to_common_variables() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Examination, ["1999-2002"], BODY_MEASURES)
        .include_uncommon(false);
    let table = nhanes.retrieve(&request).unwrap();

    assert_eq!(column_names(&table.data), ["SEQN", "BMXWT", "Cycle"]);
    assert_eq!(table.data.height(), 5);
    assert_eq!(
        cycle_values(&table.data, "Cycle"),
        ["1999-2000", "1999-2000", "1999-2000", "2001-2002", "2001-2002"]
    );
}

#[test]
fn uncommon_variables_are_null_filled() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Examination, ["1999", "2001"], BODY_MEASURES);
    let table = nhanes.retrieve(&request).unwrap();

    assert_eq!(
        column_names(&table.data),
        ["SEQN", "BMXWT", "BMDSTATS", "Cycle", "BMXSAD1"]
    );
    assert_eq!(table.data.column("BMDSTATS").unwrap().null_count(), 2);
    assert_eq!(table.data.column("BMXSAD1").unwrap().null_count(), 3);
}

#[test]
fn cycles_without_the_file_are_skipped() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Examination, ["1999-2006"], BODY_MEASURES);
    let table = nhanes.retrieve(&request).unwrap();

    assert_eq!(table.data.height(), 8);
    assert_eq!(table.skipped, [cycle("2003-2004")]);
    assert_eq!(
        files.fetched(),
        ["1999-2000/BMX", "2001-2002/BMX_B", "2005-2006/BMX_D"]
    );
}

#[test]
fn single_available_cycle_keeps_all_its_variables() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Examination, ["2003-2006"], BODY_MEASURES)
        .include_uncommon(false);
    let table = nhanes.retrieve(&request).unwrap();

    assert_eq!(column_names(&table.data), ["SEQN", "BMXWT", "BMXHT", "Cycle"]);
    assert_eq!(table.skipped, [cycle("2003-2004")]);
}

#[test]
fn every_cycle_skipped_is_no_data() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Examination, ["1999-2002"], BLOOD_PRESSURE);
    assert!(matches!(
        nhanes.retrieve(&request),
        Err(NhanesError::NoDataAvailable { .. })
    ));
    assert!(files.fetched().is_empty());
}

#[test]
fn unresolvable_cycle_is_invalid() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Examination, ["2050"], BODY_MEASURES);
    assert!(matches!(
        nhanes.retrieve(&request),
        Err(NhanesError::InvalidCycle { .. })
    ));
    // resolution fails before the catalog is fetched
    assert!(catalogs.fetches.borrow().is_empty());
}

#[test]
fn specific_variables_are_selected_after_the_key() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Examination, ["2001-2006"], BODY_MEASURES)
        .with_variables(["Cycle", "BMXWT", "SEQN"]);
    let table = nhanes.retrieve(&request).unwrap();
    assert_eq!(column_names(&table.data), ["SEQN", "Cycle", "BMXWT"]);

    let request = RetrieveRequest::new(Category::Examination, ["2005"], BODY_MEASURES)
        .with_variables(["BMXHT", "BMXBMI"]);
    match nhanes.retrieve(&request) {
        Err(NhanesError::MissingVariables { missing, .. }) => assert_eq!(missing, ["BMXBMI"]),
        other => panic!("expected MissingVariables, got {other:?}"),
    }
}

#[test]
fn fetch_failures_surface() {
    let catalogs = catalogs();
    let files = support::MockFiles::default();
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Examination, ["2005"], BODY_MEASURES);
    assert!(matches!(
        nhanes.retrieve(&request),
        Err(NhanesError::Source(_))
    ));
}

#[test]
fn catalog_layout_drift_is_fatal() {
    let catalogs = support::MockCatalogs::default().with_table(
        Category::Dietary,
        RawTable::new(
            vec!["Variable Name".to_string(), "Years".to_string()],
            vec![vec!["DR1TKCAL".to_string(), "2005-2006".to_string()]],
        ),
    );
    let files = files();
    let nhanes = Nhanes::new(&catalogs, &files);

    let request = RetrieveRequest::new(Category::Dietary, ["2005"], "Total Nutrient Intakes");
    assert!(matches!(
        nhanes.retrieve(&request),
        Err(NhanesError::CatalogFormat { .. })
    ));
}

#[test]
fn file_listing_and_mapping() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    assert_eq!(
        nhanes.list_file_names(Category::Examination, None).unwrap(),
        [BODY_MEASURES, BLOOD_PRESSURE, support::ODDITIES]
    );
    assert_eq!(
        nhanes
            .list_file_names(Category::Examination, Some(&["1999".to_string()]))
            .unwrap(),
        [BODY_MEASURES]
    );
    assert!(matches!(
        nhanes.list_file_names(Category::Examination, Some(&["2050".to_string()])),
        Err(NhanesError::CatalogEmpty { .. })
    ));
    assert_eq!(
        nhanes.list_file_names(Category::Demographics, None).unwrap(),
        ["Demographic Variables & Sample Weights"]
    );

    let mapping = nhanes
        .cycle_file_mapping(Category::Examination, BODY_MEASURES)
        .unwrap();
    let pairs: Vec<(&str, &str)> = mapping
        .iter()
        .map(|(cycle, file_id)| (cycle.label(), file_id.as_str()))
        .collect();
    assert_eq!(
        pairs,
        [
            ("1999-2000", "BMX"),
            ("2001-2002", "BMX_B"),
            ("2005-2006", "BMX_D")
        ]
    );
    assert!(matches!(
        nhanes.cycle_file_mapping(Category::Examination, "Audiometry"),
        Err(NhanesError::FileNotFound { cycle: None, .. })
    ));
}

#[test]
fn common_variables_over_category() {
    let (catalogs, files) = (catalogs(), files());
    let nhanes = Nhanes::new(&catalogs, &files);

    let result = nhanes
        .common_variables(Category::Examination, &["1999-2002".to_string()])
        .unwrap();
    assert_eq!(
        result.common.iter().map(String::as_str).collect::<Vec<_>>(),
        ["BMXWT", "SEQN"]
    );
    assert!(matches!(
        nhanes.common_variables(Category::Examination, &["2005".to_string()]),
        Err(NhanesError::InsufficientCycles { found: 1 })
    ));
    assert!(matches!(
        nhanes.common_variables(Category::Examination, &["2050".to_string()]),
        Err(NhanesError::InvalidCycle { .. })
    ));
}
