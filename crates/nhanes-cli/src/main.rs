//! NHANES accessor CLI.

use std::io::{self, IsTerminal};
use std::time::Duration;

use clap::{ColorChoice, Parser};
use nhanes_cli::logging::{LogConfig, LogFormat, init_logging};
use nhanes_cli::progress::Progress;
use nhanes_cli::sources::{SourceOptions, build_accessor};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, SourceArgs};
use crate::commands::{
    run_categories, run_cycles, run_files, run_join, run_mapping, run_resolve, run_retrieve,
    run_variables,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    // the spinner would interleave with log lines written to the terminal
    let progress = if io::stderr().is_terminal() && cli.log_file.is_none() && needs_fetch(&cli.command)
    {
        Progress::spinner()
    } else {
        Progress::hidden()
    };

    let result = build_accessor(&source_options(&cli.sources), &progress).and_then(|nhanes| {
        match &cli.command {
            Command::Categories => run_categories(&nhanes),
            Command::Cycles => run_cycles(&nhanes),
            Command::Resolve(args) => run_resolve(&nhanes, args),
            Command::Files(args) => run_files(&nhanes, args),
            Command::Mapping(args) => run_mapping(&nhanes, args),
            Command::Variables(args) => run_variables(&nhanes, args),
            Command::Retrieve(args) => run_retrieve(&nhanes, args),
            Command::Join(args) => run_join(&nhanes, args),
        }
    });
    progress.finish();

    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn needs_fetch(command: &Command) -> bool {
    !matches!(
        command,
        Command::Categories | Command::Cycles | Command::Resolve(_)
    )
}

fn source_options(args: &SourceArgs) -> SourceOptions {
    SourceOptions {
        catalog_dir: args.catalog_dir.clone(),
        mirror_dir: args.mirror_dir.clone(),
        data_dir: args.data_dir.clone(),
        timeout: Some(Duration::from_secs(args.timeout)),
        strict_ranges: args.strict_ranges,
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
