//! Sources backed by the CDC NHANES website.

use std::time::Duration;

use polars::prelude::DataFrame;
use reqwest::blocking::{Client, Response};
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use nhanes_model::{CatalogSource, Category, Cycle, FileSource, RawTable, SourceError};

use crate::html::parse_first_table;
use crate::xpt::decode_xpt;

/// Variable-list search page; takes a `Component` query parameter.
pub const DEFAULT_CATALOG_URL: &str = "https://wwwn.cdc.gov/nchs/nhanes/search/variablelist.aspx";

/// Root under which data files live as `<cycle>/<FILE>.XPT`.
pub const DEFAULT_DATA_URL: &str = "https://wwwn.cdc.gov/Nchs/Nhanes";

/// HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable overriding the catalog URL.
pub const CATALOG_URL_ENV: &str = "NHANES_CATALOG_URL";

/// Environment variable overriding the data URL.
pub const DATA_URL_ENV: &str = "NHANES_DATA_URL";

/// Endpoints and client settings for the website sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub catalog_url: String,
    pub data_url: String,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("nhanes/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    /// Defaults, with URLs taken from the environment when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(CATALOG_URL_ENV) {
            config.catalog_url = url;
        }
        if let Ok(url) = std::env::var(DATA_URL_ENV) {
            config.data_url = url;
        }
        config
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Catalog page URL for a category.
    pub fn catalog_url_for(&self, category: Category) -> String {
        format!("{}?Component={}", self.catalog_url, category.component())
    }

    /// Data file URL for one cycle.
    pub fn data_url_for(&self, cycle: Cycle, file_id: &str) -> String {
        format!(
            "{}/{}/{}.XPT",
            self.data_url.trim_end_matches('/'),
            cycle.label(),
            file_id
        )
    }

    fn build_client(&self) -> Result<Client, SourceError> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| SourceError::Http {
                url: self.catalog_url.clone(),
                message: e.to_string(),
            })
    }
}

/// Issue a GET and turn transport failures and error statuses into
/// [`SourceError`]s. A 404 becomes [`SourceError::NotFound`].
fn get(client: &Client, url: &str, user_agent: &str) -> Result<Response, SourceError> {
    debug!(url, "GET");
    let response = client
        .get(url)
        .header(USER_AGENT, user_agent)
        .send()
        .map_err(|e| SourceError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if status.as_u16() == 404 {
        return Err(SourceError::NotFound {
            origin: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Scrapes the per-category variable list page. Every call downloads the
/// page again.
pub struct HttpCatalogSource {
    client: Client,
    config: HttpConfig,
}

impl HttpCatalogSource {
    pub fn new(config: HttpConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: config.build_client()?,
            config,
        })
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch_catalog(&self, category: Category) -> Result<RawTable, SourceError> {
        let url = self.config.catalog_url_for(category);
        let body = get(&self.client, &url, &self.config.user_agent)?
            .text()
            .map_err(|e| SourceError::Http {
                url: url.clone(),
                message: e.to_string(),
            })?;
        let table = parse_first_table(&body, &url)?;
        info!(%category, rows = table.num_rows(), "fetched variable catalog");
        Ok(table)
    }
}

/// Downloads `.XPT` data files.
pub struct HttpFileSource {
    client: Client,
    config: HttpConfig,
}

impl HttpFileSource {
    pub fn new(config: HttpConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: config.build_client()?,
            config,
        })
    }
}

impl FileSource for HttpFileSource {
    fn fetch_file(&self, cycle: Cycle, file_id: &str) -> Result<DataFrame, SourceError> {
        let url = self.config.data_url_for(cycle, file_id);
        let bytes = get(&self.client, &url, &self.config.user_agent)?
            .bytes()
            .map_err(|e| SourceError::Http {
                url: url.clone(),
                message: e.to_string(),
            })?;
        debug!(url, bytes = bytes.len(), "downloaded data file");
        decode_xpt(&bytes, &url)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Serve one HTML page per connection, in order, then stop.
    fn serve_pages(pages: Vec<&'static str>) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            for page in pages {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                    line.clear();
                }
                write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{page}",
                    page.len()
                )
                .unwrap();
            }
        });
        (format!("http://{addr}/variablelist.aspx"), handle)
    }

    #[test]
    fn builds_catalog_and_data_urls() {
        let config = HttpConfig::default();
        assert_eq!(
            config.catalog_url_for(Category::Demographics),
            "https://wwwn.cdc.gov/nchs/nhanes/search/variablelist.aspx?Component=Demographics"
        );
        let cycle = Cycle::from_label("2005-2006").unwrap();
        assert_eq!(
            config.data_url_for(cycle, "DEMO_D"),
            "https://wwwn.cdc.gov/Nchs/Nhanes/2005-2006/DEMO_D.XPT"
        );
    }

    #[test]
    fn every_catalog_call_downloads_the_page() {
        let (url, server) = serve_pages(vec![
            "<table><tr><th>Variable Name</th></tr><tr><td>SEQN</td></tr></table>",
            "<table><tr><th>Variable Name</th></tr><tr><td>RIAGENDR</td></tr></table>",
        ]);
        let source = HttpCatalogSource::new(HttpConfig {
            catalog_url: url,
            ..HttpConfig::default()
        })
        .unwrap();

        let first = source.fetch_catalog(Category::Demographics).unwrap();
        let second = source.fetch_catalog(Category::Demographics).unwrap();
        server.join().unwrap();
        assert_eq!(first.rows, vec![vec!["SEQN"]]);
        assert_eq!(second.rows, vec![vec!["RIAGENDR"]]);
    }

    #[test]
    fn timeout_serializes_as_seconds() {
        let config = HttpConfig::default().with_timeout(Duration::from_secs(5));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout"], 5);
    }
}
