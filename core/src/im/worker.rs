//! Reply worker: turn a classified request into the card we post back.
//! Every failure along the way becomes an apology card; nothing here returns an error.

use std::sync::Arc;

use super::card::ReplyCard;
use super::classify::ClassifiedRequest;
use super::log::truncate_content_default;
use super::transport::{truncate_chars, ImTransport};
use crate::error::RelayError;
use crate::gemini::{Generation, TextGenerator};
use crate::prompt;
use crate::store::StoreScraper;

/// Collaborators a background job needs. `generator` is None when no Gemini key is configured.
pub struct JobContext {
    pub transport: Arc<dyn ImTransport>,
    pub scraper: Arc<dyn StoreScraper>,
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl JobContext {
    async fn generate(&self, prompt: &str) -> Result<Generation, RelayError> {
        match &self.generator {
            Some(generator) => generator.generate(prompt).await,
            None => Err(RelayError::NotConfigured("gemini")),
        }
    }
}

pub async fn build_reply(ctx: &JobContext, request: &ClassifiedRequest) -> ReplyCard {
    match request {
        ClassifiedRequest::LinkRequest(url) => link_reply(ctx, url).await,
        ClassifiedRequest::ChatRequest(question) => chat_reply(ctx, question).await,
    }
}

/// Scrape the store page, ask for a review, wrap it with title and link.
pub async fn link_reply(ctx: &JobContext, url: &str) -> ReplyCard {
    let page = match ctx.scraper.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(url, error = %e, "store page scrape failed");
            return ReplyCard::failure(prompt::FAILURE_CARD_TITLE, prompt::scrape_failed(url));
        }
    };

    let review = match ctx.generate(&prompt::game_review_prompt(&page)).await {
        Ok(Generation::Text(text)) => text,
        Ok(Generation::Blocked(reason)) => {
            tracing::warn!(url, reason = %reason, "review blocked by safety filter");
            prompt::review_blocked(&reason)
        }
        Err(RelayError::NotConfigured(what)) => {
            tracing::warn!(url, what, "review skipped, generator not configured");
            prompt::AI_NOT_CONFIGURED.to_string()
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "review generation failed");
            prompt::REVIEW_FAILED.to_string()
        }
    };

    ReplyCard::info(
        prompt::review_card_title(&page.title),
        prompt::review_markdown(&page.title, &review, url),
    )
}

pub async fn chat_reply(ctx: &JobContext, question: &str) -> ReplyCard {
    let content = truncate_content_default(question);
    match ctx.generate(&prompt::general_chat_prompt(question)).await {
        Ok(Generation::Text(text)) => ReplyCard::info(prompt::CHAT_CARD_TITLE, text),
        Ok(Generation::Blocked(reason)) => {
            tracing::warn!(question = %content, reason = %reason, "answer blocked by safety filter");
            ReplyCard::failure(prompt::CHAT_CARD_TITLE, prompt::chat_blocked(&reason))
        }
        Err(RelayError::NotConfigured(what)) => {
            tracing::warn!(question = %content, what, "answer skipped, generator not configured");
            ReplyCard::failure(prompt::CHAT_CARD_TITLE, prompt::AI_NOT_CONFIGURED)
        }
        Err(e) => {
            tracing::warn!(question = %content, error = %e, "answer generation failed");
            ReplyCard::failure(prompt::CHAT_CARD_TITLE, prompt::CHAT_FAILED)
        }
    }
}

/// Post `card` as a reply, cut to the channel's card limit.
pub async fn send_reply(ctx: &JobContext, message_id: &str, mut card: ReplyCard) -> Result<(), RelayError> {
    let caps = ctx.transport.capabilities();
    card.markdown = truncate_chars(&card.markdown, caps.max_card_len);
    tracing::debug!(
        channel = caps.channel,
        message_id,
        chars = card.markdown.chars().count(),
        "sending reply card"
    );
    ctx.transport.reply_card(message_id, &card).await
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::im::card::CardTone;

    const URL: &str = "https://store.steampowered.com/app/620";

    #[tokio::test]
    async fn link_reply_wraps_review() {
        let ctx = context(Arc::default(), Some(portal()), Some(FakeGenerator::Echo));
        let card = link_reply(&ctx, URL).await;
        assert_eq!(card.title, "🎮 Portal 2 分析报告");
        assert_eq!(card.tone, CardTone::Info);
        assert!(card.markdown.starts_with("**Portal 2**\n\ngenerated for "));
        assert!(card.markdown.ends_with("[前往 Steam 商店页面](https://store.steampowered.com/app/620)"));
    }

    #[tokio::test]
    async fn link_reply_reports_scrape_failure() {
        let ctx = context(Arc::default(), None, Some(FakeGenerator::Echo));
        let card = link_reply(&ctx, URL).await;
        assert_eq!(card.title, "处理失败");
        assert_eq!(card.tone, CardTone::Failure);
        assert!(card.markdown.ends_with(URL));
    }

    #[tokio::test]
    async fn link_reply_keeps_link_when_blocked() {
        let ctx = context(Arc::default(), Some(portal()), Some(FakeGenerator::Blocked("SAFETY")));
        let card = link_reply(&ctx, URL).await;
        assert!(card.markdown.contains("原因：SAFETY"));
        assert!(card.markdown.contains(URL));
    }

    #[tokio::test]
    async fn link_reply_without_generator() {
        let ctx = context(Arc::default(), Some(portal()), None);
        let card = link_reply(&ctx, URL).await;
        assert!(card.markdown.contains(prompt::AI_NOT_CONFIGURED));
    }

    #[tokio::test]
    async fn chat_reply_variants() {
        let ok = chat_reply(&context(Arc::default(), None, Some(FakeGenerator::Echo)), "hi").await;
        assert_eq!(ok.title, prompt::CHAT_CARD_TITLE);
        assert_eq!(ok.tone, CardTone::Info);

        let blocked = chat_reply(&context(Arc::default(), None, Some(FakeGenerator::Blocked("OTHER"))), "hi").await;
        assert_eq!(blocked.markdown, prompt::chat_blocked("OTHER"));

        let failed = chat_reply(&context(Arc::default(), None, Some(FakeGenerator::Fails)), "hi").await;
        assert_eq!(failed.markdown, prompt::CHAT_FAILED);

        let missing = chat_reply(&context(Arc::default(), None, None), "hi").await;
        assert_eq!(missing.markdown, prompt::AI_NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn send_reply_truncates_to_capabilities() {
        let transport = Arc::new(RecordingTransport { max_card_len: Some(4), ..Default::default() });
        let ctx = context(transport.clone(), None, None);
        send_reply(&ctx, "om_1", ReplyCard::info("t", "abcdefgh")).await.unwrap();

        let replies = transport.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, "om_1");
        assert_eq!(replies[0].1.markdown, "abcd…");
    }
}
