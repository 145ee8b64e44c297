//! Spinner feedback while catalogs and data files are fetched.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::DataFrame;

use nhanes_model::{CatalogSource, Category, Cycle, FileSource, RawTable, SourceError};

const TICK: Duration = Duration::from_millis(120);

/// A spinner shared by every source it wraps.
#[derive(Clone)]
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// A spinner drawn on stderr.
    pub fn spinner() -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(TICK);
        Self { bar }
    }

    /// No output at all.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Wrap a source so each fetch updates the spinner.
    pub fn wrap<S>(&self, inner: S) -> Tracked<S> {
        Tracked {
            inner,
            bar: self.bar.clone(),
        }
    }

    /// Number of fetches started so far.
    pub fn fetches(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// A source reporting its fetches to a [`Progress`] spinner.
pub struct Tracked<S> {
    inner: S,
    bar: ProgressBar,
}

impl<S: CatalogSource> CatalogSource for Tracked<S> {
    fn fetch_catalog(&self, category: Category) -> Result<RawTable, SourceError> {
        self.bar.set_message(format!("fetching {category} catalog"));
        self.bar.inc(1);
        self.inner.fetch_catalog(category)
    }
}

impl<S: FileSource> FileSource for Tracked<S> {
    fn fetch_file(&self, cycle: Cycle, file_id: &str) -> Result<DataFrame, SourceError> {
        self.bar.set_message(format!("fetching {cycle}/{file_id}"));
        self.bar.inc(1);
        self.inner.fetch_file(cycle, file_id)
    }
}
