//! Where deck payloads come from.
//!
//! A [`SlideSource`] fetches the raw JSON payload once; parsing and
//! validation happen in [`Deck::from_json`](crate::deck::Deck::from_json).

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use horizon_overture_core::logging::targets;

use crate::error::{DeckError, Result};
use crate::slide::Slide;

/// Default timeout for HTTP deck requests.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can produce a deck payload.
pub trait SlideSource {
    /// Fetch the payload.
    fn fetch(&self) -> impl Future<Output = Result<String>> + Send;

    /// A short description for logs, such as a path or URL.
    fn describe(&self) -> String;
}

/// A payload held in memory.
#[derive(Debug, Clone)]
pub struct StaticSource {
    json: String,
}

impl StaticSource {
    /// Serve `json` as-is.
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }

    /// Serve a payload built from `slides`.
    pub fn from_slides(slides: &[Slide]) -> Result<Self> {
        #[derive(Serialize)]
        struct Payload<'a> {
            slides: &'a [Slide],
        }

        let json = serde_json::to_string(&Payload { slides })?;
        Ok(Self { json })
    }
}

impl SlideSource for StaticSource {
    async fn fetch(&self) -> Result<String> {
        Ok(self.json.clone())
    }

    fn describe(&self) -> String {
        format!("<static, {} bytes>", self.json.len())
    }
}

/// A payload read from a local file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Read from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SlideSource for FileSource {
    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DeckError::io(&self.path, e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A payload fetched with an HTTP GET.
///
/// Any status outside `2xx` is a failure; there is no retry.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpSource {
    /// Fetch from `url` with the default timeout.
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Fetch from `url`, giving up after `timeout`.
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url).map_err(|source| DeckError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    /// The request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl SlideSource for HttpSource {
    async fn fetch(&self) -> Result<String> {
        tracing::debug!(target: targets::DECK, url = %self.url, "requesting deck");

        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeckError::HttpStatus {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// A source chosen at runtime, for example from settings.
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Static(StaticSource),
    File(FileSource),
    Http(HttpSource),
}

impl ConfiguredSource {
    /// Pick a source for `location`: `http(s)://` URLs are fetched, anything
    /// else is read as a file path.
    pub fn from_location(location: &str, http_timeout: Duration) -> Result<Self> {
        let is_http = location.starts_with("http://") || location.starts_with("https://");
        if is_http {
            Ok(Self::Http(HttpSource::with_timeout(location, http_timeout)?))
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            Ok(Self::File(FileSource::new(path)))
        }
    }
}

impl SlideSource for ConfiguredSource {
    async fn fetch(&self) -> Result<String> {
        match self {
            Self::Static(source) => source.fetch().await,
            Self::File(source) => source.fetch().await,
            Self::Http(source) => source.fetch().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Static(source) => source.describe(),
            Self::File(source) => source.describe(),
            Self::Http(source) => source.describe(),
        }
    }
}
