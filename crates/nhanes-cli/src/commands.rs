use anyhow::{Context, Result};
use tracing::info_span;

use nhanes_cli::output::write_table;
use nhanes_cli::sources::DynNhanes;
use nhanes_core::{JoinRequest, JoinSide, RetrieveRequest};

use crate::cli::{FilesArgs, JoinArgs, MappingArgs, ResolveArgs, RetrieveArgs, VariablesArgs};
use crate::summary::{
    print_categories, print_cycles, print_file_names, print_frame, print_mapping,
    print_reconciliation, print_resolution, print_retrieval,
};

pub fn run_categories(nhanes: &DynNhanes) -> Result<()> {
    print_categories(nhanes.list_categories());
    Ok(())
}

pub fn run_cycles(nhanes: &DynNhanes) -> Result<()> {
    print_cycles(nhanes.list_cycles());
    Ok(())
}

pub fn run_resolve(nhanes: &DynNhanes, args: &ResolveArgs) -> Result<()> {
    let cycles = nhanes.resolve(&args.tokens);
    print_resolution(&args.tokens, &cycles);
    Ok(())
}

pub fn run_files(nhanes: &DynNhanes, args: &FilesArgs) -> Result<()> {
    let cycles = (!args.cycles.is_empty()).then_some(args.cycles.as_slice());
    let names = nhanes
        .list_file_names(args.category, cycles)
        .with_context(|| format!("list files of {}", args.category))?;
    print_file_names(args.category, &names);
    Ok(())
}

pub fn run_mapping(nhanes: &DynNhanes, args: &MappingArgs) -> Result<()> {
    let mapping = nhanes
        .cycle_file_mapping(args.category, &args.file)
        .with_context(|| format!("map cycles of {:?}", args.file))?;
    print_mapping(&args.file, &mapping);
    Ok(())
}

pub fn run_variables(nhanes: &DynNhanes, args: &VariablesArgs) -> Result<()> {
    let result = nhanes
        .common_variables(args.category, &args.cycles)
        .with_context(|| format!("reconcile {} variables", args.category))?;
    if args.json {
        let json = serde_json::to_string_pretty(&result).context("serialize reconciliation")?;
        println!("{json}");
    } else {
        print_reconciliation(&result);
    }
    Ok(())
}

pub fn run_retrieve(nhanes: &DynNhanes, args: &RetrieveArgs) -> Result<()> {
    let span = info_span!("command", name = "retrieve");
    let _guard = span.enter();

    let mut request = RetrieveRequest::new(args.category, args.cycles.clone(), args.file.clone())
        .include_uncommon(!args.common_only);
    if !args.variables.is_empty() {
        request = request.with_variables(args.variables.clone());
    }
    let mut table = nhanes
        .retrieve(&request)
        .with_context(|| format!("retrieve {:?}", args.file))?;

    let written = match &args.output.path {
        Some(path) => Some((path.as_path(), write_table(&mut table.data, path)?)),
        None => None,
    };
    print_retrieval(&table, written, args.output.preview_rows);
    Ok(())
}

pub fn run_join(nhanes: &DynNhanes, args: &JoinArgs) -> Result<()> {
    let span = info_span!("command", name = "join");
    let _guard = span.enter();

    let request = JoinRequest::new(
        args.cycles.clone(),
        JoinSide::new(args.left_category, args.left_file.clone()),
        JoinSide::new(args.right_category, args.right_file.clone()),
    )
    .include_uncommon(!args.common_only);
    let mut joined = nhanes
        .join(&request)
        .with_context(|| format!("join {:?} with {:?}", args.left_file, args.right_file))?;

    let written = match &args.output.path {
        Some(path) => Some((path.as_path(), write_table(&mut joined, path)?)),
        None => None,
    };
    print_frame(&joined, written, args.output.preview_rows);
    Ok(())
}
