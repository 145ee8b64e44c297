use std::collections::BTreeMap;
use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::{AnyValue, DataFrame};

use nhanes_cli::output::OutputFormat;
use nhanes_core::{Reconciliation, RetrievedTable};
use nhanes_model::{Category, Cycle};

pub fn print_categories(categories: &[Category]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Category"), header_cell("Component")]);
    apply_table_style(&mut table);
    for category in categories {
        table.add_row(vec![
            name_cell(category.as_str()),
            Cell::new(category.component()),
        ]);
    }
    println!("{table}");
}

pub fn print_cycles(labels: &[&str]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Cycle")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, label) in labels.iter().enumerate() {
        table.add_row(vec![dim_cell(index + 1), name_cell(label)]);
    }
    println!("{table}");
}

pub fn print_resolution(tokens: &[String], cycles: &[Cycle]) {
    println!("Tokens: {}", tokens.join(", "));
    if cycles.is_empty() {
        println!("No cycle matches.");
        return;
    }
    let labels: Vec<&str> = cycles.iter().map(|cycle| cycle.label()).collect();
    println!("Cycles: {}", labels.join(", "));
}

pub fn print_file_names(category: Category, names: &[String]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("File Description")]);
    apply_table_style(&mut table);
    for name in names {
        table.add_row(vec![Cell::new(name)]);
    }
    println!("Category: {category}");
    println!("{table}");
}

pub fn print_mapping(file_description: &str, mapping: &BTreeMap<Cycle, String>) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Cycle"), header_cell("File")]);
    apply_table_style(&mut table);
    for (cycle, file_id) in mapping {
        table.add_row(vec![Cell::new(cycle.label()), name_cell(file_id)]);
    }
    println!("File: {file_description}");
    println!("{table}");
}

pub fn print_reconciliation(result: &Reconciliation) {
    let labels: Vec<&str> = result.cycles.iter().map(|cycle| cycle.label()).collect();
    println!("Cycles: {}", labels.join(", "));
    println!(
        "Common: {}  Uncommon: {}",
        result.common.len(),
        result.uncommon.len()
    );

    let mut table = Table::new();
    let mut header = vec![header_cell("Variable")];
    header.extend(labels.iter().map(|label| header_cell(label)));
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..=labels.len() {
        align_column(&mut table, index, CellAlignment::Center);
    }
    for (variable, present_in) in &result.occurrence {
        let mut row = vec![if result.common.contains(variable) {
            name_cell(variable)
        } else {
            Cell::new(variable).fg(Color::Yellow)
        }];
        row.extend(result.cycles.iter().map(|cycle| {
            if present_in.contains(cycle) {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            }
        }));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn print_retrieval(table: &RetrievedTable, written: Option<(&Path, OutputFormat)>, preview_rows: usize) {
    let cycles: Vec<&str> = table.cycles.iter().map(|cycle| cycle.label()).collect();
    println!("Cycles: {}", cycles.join(", "));
    if !table.skipped.is_empty() {
        let skipped: Vec<&str> = table.skipped.iter().map(|cycle| cycle.label()).collect();
        println!("Skipped (file not listed): {}", skipped.join(", "));
    }
    print_frame(&table.data, written, preview_rows);
}

pub fn print_frame(data: &DataFrame, written: Option<(&Path, OutputFormat)>, preview_rows: usize) {
    println!("Rows: {}  Columns: {}", data.height(), data.width());
    match written {
        Some((path, format)) => println!("Output ({}): {}", format.as_str(), path.display()),
        None => print_preview(data, preview_rows),
    }
}

fn print_preview(data: &DataFrame, rows: usize) {
    if rows == 0 || data.width() == 0 {
        return;
    }
    let preview = data.head(Some(rows));
    let mut table = Table::new();
    table.set_header(
        preview
            .get_column_names()
            .into_iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for index in 0..preview.height() {
        let row: Vec<Cell> = preview
            .get_columns()
            .iter()
            .map(|column| match column.get(index) {
                Ok(value) => value_cell(&value),
                Err(_) => dim_cell("?"),
            })
            .collect();
        table.add_row(row);
    }
    println!("{table}");
    if data.height() > preview.height() {
        println!("... {} more rows", data.height() - preview.height());
    }
}

fn value_cell(value: &AnyValue<'_>) -> Cell {
    match value {
        AnyValue::Null => dim_cell("null"),
        other => match other.get_str() {
            Some(text) => Cell::new(text),
            None => Cell::new(other.to_string()).set_alignment(CellAlignment::Right),
        },
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn name_cell(name: &str) -> Cell {
    Cell::new(name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
