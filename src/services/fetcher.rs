// src/services/fetcher.rs

//! Document fetcher.
//!
//! Retrieves the source page and applies CSS selectors to it. Matched
//! elements are returned as owned snapshots so callers never hold a parsed
//! DOM across an await point.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;
use crate::utils::http;

/// Source of raw page bodies.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the body of the page at `url`.
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// `PageSource` backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    /// Create a page source from HTTP settings.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        log::debug!("Fetching {}", url);
        http::fetch_page_async(&self.client, url).await
    }
}

/// Text snapshot of a matched element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapedElement {
    /// Concatenated text of the element and its descendants
    pub text: String,

    /// Text of the first element child, if the element has one
    pub first_child_text: Option<String>,
}

impl ScrapedElement {
    fn from_element(element: ElementRef<'_>) -> Self {
        let first_child_text = element
            .children()
            .filter_map(ElementRef::wrap)
            .next()
            .map(|child| child.text().collect());

        Self {
            text: element.text().collect(),
            first_child_text,
        }
    }
}

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a response body as HTML.
    pub fn parse(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Err(AppError::parse(body, "response body is not an HTML document"));
        }
        Ok(Self {
            html: Html::parse_document(body),
        })
    }

    /// First element matching `selector`.
    pub fn select_one(&self, selector: &str) -> Result<Option<ScrapedElement>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .html
            .select(&selector)
            .next()
            .map(ScrapedElement::from_element))
    }

    /// All elements matching `selector`, in document order.
    pub fn select_all(&self, selector: &str) -> Result<Vec<ScrapedElement>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .html
            .select(&selector)
            .map(ScrapedElement::from_element)
            .collect())
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
