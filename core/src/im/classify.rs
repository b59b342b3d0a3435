//! Link classifier: Steam store link → link analysis, anything else non-empty → general chat.

use std::sync::OnceLock;

use regex::Regex;

const STORE_LINK_PATTERN: &str = r"https://store\.steampowered\.com/app/\d+";

fn store_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(STORE_LINK_PATTERN).expect("store link pattern"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedRequest {
    LinkRequest(String),
    ChatRequest(String),
}

impl ClassifiedRequest {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifiedRequest::LinkRequest(_) => "link",
            ClassifiedRequest::ChatRequest(_) => "chat",
        }
    }
}

/// First store link in `text` (`https://store.steampowered.com/app/<digits>`), without any trailing path.
pub fn find_store_link(text: &str) -> Option<&str> {
    store_link_re().find(text).map(|m| m.as_str())
}

/// Classify cleaned text. Empty text yields None.
pub fn classify(text: &str) -> Option<ClassifiedRequest> {
    if let Some(url) = find_store_link(text) {
        return Some(ClassifiedRequest::LinkRequest(url.to_string()));
    }
    let question = text.trim();
    if question.is_empty() {
        None
    } else {
        Some(ClassifiedRequest::ChatRequest(question.to_string()))
    }
}
