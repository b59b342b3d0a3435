//! Steam store page scraper: fetch an app page and pull out title, snippet, tags and long description.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::config::STORE_TIMEOUT;
use crate::error::RelayError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";
/// Pre-answers the age gate so mature titles render their store page.
const AGE_GATE_COOKIE: &str = "birthtime=568022401; lastagecheckage=1-January-1990; wants_mature_content=1";

pub const MAX_TAGS: usize = 10;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub title: String,
    pub short_description: String,
    pub tags: Vec<String>,
    pub description: String,
}

#[async_trait]
pub trait StoreScraper: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ProductPage, RelayError>;
}

pub struct SteamScraper {
    client: reqwest::Client,
}

impl SteamScraper {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(STORE_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self { client }
    }
}

impl Default for SteamScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreScraper for SteamScraper {
    async fn fetch(&self, url: &str) -> Result<ProductPage, RelayError> {
        tracing::debug!(url, "fetching store page");
        let res = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .header(reqwest::header::COOKIE, AGE_GATE_COOKIE)
            .send()
            .await
            .map_err(RelayError::http("steam"))?;
        let status = res.status();
        if !status.is_success() {
            return Err(RelayError::Status {
                service: "steam",
                status: status.as_u16(),
                body: String::new(),
            });
        }
        let html = res.text().await.map_err(RelayError::http("steam"))?;
        let page = parse_product_page(&html)?;
        tracing::debug!(url, title = %page.title, tags = page.tags.len(), "store page parsed");
        Ok(page)
    }
}

fn selector(css: &str) -> Result<Selector, RelayError> {
    Selector::parse(css).map_err(|e| RelayError::Scrape(format!("bad selector {}: {:?}", css, e)))
}

fn first<'a>(doc: &'a Html, css: &str) -> Result<Option<ElementRef<'a>>, RelayError> {
    Ok(doc.select(&selector(css)?).next())
}

fn joined_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text nodes trimmed, blanks dropped, one per line.
fn line_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract the fields we need from a store page. Title, snippet and description are required.
pub fn parse_product_page(html: &str) -> Result<ProductPage, RelayError> {
    let doc = Html::parse_document(html);

    let title = first(&doc, ".apphub_AppName")?
        .map(joined_text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RelayError::Scrape("missing app name".into()))?;

    let short_description = first(&doc, ".game_description_snippet")?
        .map(joined_text)
        .ok_or_else(|| RelayError::Scrape("missing description snippet".into()))?;

    let tag_selector = selector("a.app_tag")?;
    let tags = doc
        .select(&tag_selector)
        .map(joined_text)
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .collect();

    let description: String = first(&doc, "#game_area_description")?
        .map(line_text)
        .ok_or_else(|| RelayError::Scrape("missing game description".into()))?
        .chars()
        .take(MAX_DESCRIPTION_CHARS)
        .collect();

    Ok(ProductPage {
        title,
        short_description,
        tags,
        description,
    })
}
