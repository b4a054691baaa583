//! I/O boundary traits for testability
//!
//! Document retrieval is abstracted so the tree builder can be driven by
//! canned pages in tests and by HTTP in production.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::Client;
use scraper::Html;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::Settings;

/// Errors raised while retrieving a document.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),
}

/// What to retrieve: a search on the configured site, or a page by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Search(String),
    Url(Url),
}

impl PageRequest {
    /// Absolute `http(s)` URLs are fetched directly, anything else is searched.
    pub fn from_term(term: &str) -> Self {
        match Url::parse(term) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(url),
            _ => Self::Search(term.to_string()),
        }
    }

    /// Concrete URL of this request for a site rooted at `base`.
    pub fn to_url(&self, base: &Url, search_path: &str) -> Result<Url, FetchError> {
        match self {
            Self::Url(url) => Ok(url.clone()),
            Self::Search(term) => Ok(search_url(base, search_path, term)?),
        }
    }
}

/// `<base><search_path>?search=<term>`
pub fn search_url(base: &Url, search_path: &str, term: &str) -> Result<Url, url::ParseError> {
    let mut url = base.join(search_path)?;
    url.query_pairs_mut().append_pair("search", term);
    Ok(url)
}

/// One retrieved and parsed document.
#[derive(Debug)]
pub struct Document {
    /// Final URL after redirects; relative links resolve against it
    pub url: Url,
    pub html: Html,
}

impl Document {
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(body),
        }
    }
}

/// Document retrieval abstraction.
pub trait DocumentSource: Send + Sync {
    /// Fetch and parse one document.
    fn fetch(&self, request: &PageRequest) -> Result<Document, FetchError>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Blocking HTTP retrieval against the configured site.
#[derive(Debug)]
pub struct HttpDocumentSource {
    client: Client,
    base: Url,
    search_path: String,
}

impl HttpDocumentSource {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            base: Url::parse(&settings.base_url)?,
            search_path: settings.search_path.clone(),
        })
    }
}

impl DocumentSource for HttpDocumentSource {
    #[instrument(level = "debug", skip(self))]
    fn fetch(&self, request: &PageRequest) -> Result<Document, FetchError> {
        let url = request.to_url(&self.base, &self.search_path)?;
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().map_err(transport)?;
        debug!("fetched {} ({} bytes)", final_url, body.len());
        Ok(Document::parse(final_url, &body))
    }
}

// ============================================================
// IN-MEMORY IMPLEMENTATION
// ============================================================

/// Serves canned pages keyed by URL and records every request.
#[derive(Debug)]
pub struct MemoryDocumentSource {
    base: Url,
    search_path: String,
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryDocumentSource {
    pub fn new(base: Url, search_path: impl Into<String>) -> Self {
        Self {
            base,
            search_path: search_path.into(),
            pages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Source rooted at the configured defaults (`Settings::default()`).
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Ok(Self::new(
            Url::parse(&settings.base_url)?,
            settings.search_path.clone(),
        ))
    }

    /// Register a page; relative `location`s resolve against the base URL.
    pub fn with_page(mut self, location: &str, html: impl Into<String>) -> Self {
        let key = self
            .base
            .join(location)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| location.to_string());
        self.pages.insert(key, html.into());
        self
    }

    /// Register the result page of searching for `term`.
    pub fn with_search(mut self, term: &str, html: impl Into<String>) -> Self {
        let key = search_url(&self.base, &self.search_path, term)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| term.to_string());
        self.pages.insert(key, html.into());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl DocumentSource for MemoryDocumentSource {
    fn fetch(&self, request: &PageRequest) -> Result<Document, FetchError> {
        let url = request.to_url(&self.base, &self.search_path)?;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        match self.pages.get(url.as_str()) {
            Some(body) => Ok(Document::parse(url, body)),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
