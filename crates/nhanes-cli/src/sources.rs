//! Accessor construction from command-line source options.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use nhanes_core::{Nhanes, NhanesConfig, RangePolicy};
use nhanes_ingest::{CsvCatalogSource, HttpCatalogSource, HttpConfig, HttpFileSource, LocalFileSource};
use nhanes_model::{CatalogSource, FileSource};

use crate::progress::Progress;

/// Accessor over whichever sources the options select.
pub type DynNhanes = Nhanes<Box<dyn CatalogSource>, Box<dyn FileSource>>;

/// Source selection and accessor settings.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Offline `<category>.csv` catalogs; the website otherwise.
    pub catalog_dir: Option<PathBuf>,
    /// Local XPT mirror; the website otherwise.
    pub mirror_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub strict_ranges: bool,
}

impl SourceOptions {
    pub fn config(&self) -> NhanesConfig {
        let mut config = NhanesConfig::default().with_range_policy(if self.strict_ranges {
            RangePolicy::Strict
        } else {
            RangePolicy::OpenEnded
        });
        if let Some(dir) = &self.data_dir {
            config = config.with_data_directory(dir.clone());
        }
        config
    }

    fn http_config(&self) -> HttpConfig {
        let config = HttpConfig::from_env();
        match self.timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }
}

/// Build the accessor, wrapping both sources in `progress`.
pub fn build_accessor(options: &SourceOptions, progress: &Progress) -> Result<DynNhanes> {
    let catalogs: Box<dyn CatalogSource> = match &options.catalog_dir {
        Some(dir) => {
            debug!(dir = %dir.display(), "using offline catalogs");
            Box::new(progress.wrap(CsvCatalogSource::new(dir)))
        }
        None => Box::new(
            progress.wrap(
                HttpCatalogSource::new(options.http_config()).context("create catalog client")?,
            ),
        ),
    };
    let files: Box<dyn FileSource> = match &options.mirror_dir {
        Some(dir) => {
            debug!(dir = %dir.display(), "using local file mirror");
            Box::new(progress.wrap(LocalFileSource::new(dir)))
        }
        None => Box::new(
            progress.wrap(HttpFileSource::new(options.http_config()).context("create data client")?),
        ),
    };
    Ok(Nhanes::with_config(catalogs, files, options.config()))
}
