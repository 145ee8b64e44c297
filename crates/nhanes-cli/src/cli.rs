//! CLI argument definitions for the `nhanes` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use nhanes_model::Category;

#[derive(Parser)]
#[command(
    name = "nhanes",
    version,
    about = "NHANES data accessor - resolve cycles, reconcile variables, retrieve and join files",
    long_about = "Query the NHANES variable catalogs and retrieve data files across survey cycles.\n\n\
                  Cycles are given as tokens: an exact label (2005-2006), a year (2005) or a\n\
                  range of years (2005-2010). Catalogs and files come from the CDC website\n\
                  unless offline directories are given."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Where catalogs and data files come from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Read variable catalogs from `<DIR>/<category>.csv` instead of the website.
    #[arg(long = "catalog-dir", value_name = "DIR", global = true)]
    pub catalog_dir: Option<PathBuf>,

    /// Read data files from a local `<DIR>/<cycle>/<FILE>.XPT` mirror.
    #[arg(long = "mirror-dir", value_name = "DIR", global = true)]
    pub mirror_dir: Option<PathBuf>,

    /// Storage directory recorded in the accessor configuration.
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS", default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Ignore ranges whose end year matches no cycle instead of running
    /// them to the last registered cycle.
    #[arg(long = "strict-ranges", global = true)]
    pub strict_ranges: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the data categories.
    Categories,

    /// List the registered survey cycles.
    Cycles,

    /// Show the cycles a set of tokens resolves to.
    Resolve(ResolveArgs),

    /// List the file descriptions of a category.
    Files(FilesArgs),

    /// Show the file identifier of a file description in every cycle.
    Mapping(MappingArgs),

    /// Split a category's variables into common and uncommon across cycles.
    Variables(VariablesArgs),

    /// Retrieve one file across cycles.
    Retrieve(RetrieveArgs),

    /// Retrieve two files and join them on the subject key.
    Join(JoinArgs),
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// Cycle tokens (labels, years or year ranges).
    #[arg(value_name = "TOKEN", required = true)]
    pub tokens: Vec<String>,
}

#[derive(Parser)]
pub struct FilesArgs {
    #[arg(value_name = "CATEGORY")]
    pub category: Category,

    /// Only list files present in these cycles.
    #[arg(long = "cycles", value_name = "TOKENS", value_delimiter = ',')]
    pub cycles: Vec<String>,
}

#[derive(Parser)]
pub struct MappingArgs {
    #[arg(value_name = "CATEGORY")]
    pub category: Category,

    /// File description, e.g. "Body Measures".
    #[arg(value_name = "FILE")]
    pub file: String,
}

#[derive(Parser)]
pub struct VariablesArgs {
    #[arg(value_name = "CATEGORY")]
    pub category: Category,

    /// At least two cycles.
    #[arg(long = "cycles", value_name = "TOKENS", value_delimiter = ',', required = true)]
    pub cycles: Vec<String>,

    /// Print the reconciliation as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct RetrieveArgs {
    #[arg(value_name = "CATEGORY")]
    pub category: Category,

    /// File description, e.g. "Body Measures".
    #[arg(value_name = "FILE")]
    pub file: String,

    #[arg(long = "cycles", value_name = "TOKENS", value_delimiter = ',', required = true)]
    pub cycles: Vec<String>,

    /// Keep only variables present in every retrieved cycle.
    #[arg(long = "common-only")]
    pub common_only: bool,

    /// Keep only these variables (the subject key is always kept).
    #[arg(long = "variables", value_name = "NAMES", value_delimiter = ',')]
    pub variables: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct JoinArgs {
    #[arg(long = "cycles", value_name = "TOKENS", value_delimiter = ',', required = true)]
    pub cycles: Vec<String>,

    #[arg(long = "left-category", value_name = "CATEGORY")]
    pub left_category: Category,

    #[arg(long = "left-file", value_name = "FILE")]
    pub left_file: String,

    #[arg(long = "right-category", value_name = "CATEGORY")]
    pub right_category: Category,

    #[arg(long = "right-file", value_name = "FILE")]
    pub right_file: String,

    /// Keep only variables present in every retrieved cycle of each side.
    #[arg(long = "common-only")]
    pub common_only: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct OutputArgs {
    /// Write the table to PATH (.csv or .xpt) instead of printing a preview.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Rows shown in the preview.
    #[arg(long = "preview-rows", value_name = "N", default_value_t = 10)]
    pub preview_rows: usize,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_retrieve() {
        let cli = Cli::try_parse_from([
            "nhanes",
            "--catalog-dir",
            "catalogs",
            "retrieve",
            "examination",
            "Body Measures",
            "--cycles",
            "1999-2004,2007",
            "--variables",
            "BMXWT,BMXHT",
            "-o",
            "out.csv",
        ])
        .unwrap();
        assert_eq!(cli.sources.catalog_dir, Some(PathBuf::from("catalogs")));
        let Command::Retrieve(args) = cli.command else {
            panic!("expected retrieve");
        };
        assert_eq!(args.category, Category::Examination);
        assert_eq!(args.cycles, ["1999-2004", "2007"]);
        assert_eq!(args.variables, ["BMXWT", "BMXHT"]);
        assert!(!args.common_only);
        assert_eq!(args.output.path, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn category_names_are_loose() {
        let cli = Cli::try_parse_from(["nhanes", "files", "Limited-Access"]).unwrap();
        let Command::Files(args) = cli.command else {
            panic!("expected files");
        };
        assert_eq!(args.category, Category::LimitedAccess);
        assert!(Cli::try_parse_from(["nhanes", "files", "labs"]).is_err());
    }
}
