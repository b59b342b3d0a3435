//! Error type shared by the Feishu client, store scraper and Gemini client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    /// Network failure, timeout, or body read error.
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// API answered 2xx but with a non-zero business code (Feishu style).
    #[error("{service} API code={code} body={body}")]
    Api {
        service: &'static str,
        code: i64,
        body: String,
    },

    /// API answered with a non-success HTTP status.
    #[error("{service} API status={status} body={body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// API returned 429. Not retried.
    #[error("{service} API rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        service: &'static str,
        retry_after_secs: f64,
    },

    #[error("malformed {service} response: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },

    #[error("store page scrape failed: {0}")]
    Scrape(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl RelayError {
    pub(crate) fn http(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| RelayError::Http { service, source }
    }

    pub(crate) fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        RelayError::Malformed {
            service,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = RelayError> = std::result::Result<T, E>;
