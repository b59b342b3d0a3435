//! Wiring: build the webhook state (Feishu client, scraper, Gemini client, dispatcher) from settings.

use std::sync::Arc;

use crate::config::Config;
use crate::gemini::{GeminiClient, TextGenerator};
use crate::im::dispatch::Dispatcher;
use crate::im::feishu::FeishuClient;
use crate::im::webhook::WebhookState;
use crate::im::worker::JobContext;
use crate::store::SteamScraper;

/// Gemini client if an API key is configured; otherwise AI answers are replaced by an apology.
pub fn build_generator(config: &Config) -> Option<Arc<dyn TextGenerator>> {
    let Some(key) = config.gemini_api_key.clone() else {
        tracing::warn!("GOOGLE_API_KEY not set, AI features disabled");
        return None;
    };
    tracing::info!(model = %config.gemini_model, "gemini configured");
    Some(Arc::new(GeminiClient::new(
        key,
        config.gemini_model.clone(),
        config.gemini_api_base.clone(),
    )))
}

/// Webhook state for the server. Missing Feishu credentials yield a state that acks and drops.
pub fn build_webhook_state(config: &Config) -> WebhookState {
    let Some((app_id, app_secret)) = config.feishu_credentials() else {
        tracing::warn!("feishu app_id/app_secret missing, replies disabled");
        return WebhookState::replies_disabled();
    };

    let transport = Arc::new(FeishuClient::new(
        app_id.to_string(),
        app_secret.to_string(),
        config.feishu_api_base.clone(),
    ));
    let ctx = JobContext {
        transport,
        scraper: Arc::new(SteamScraper::new()),
        generator: build_generator(config),
    };
    tracing::info!(webhook = %config.webhook_path, "feishu relay ready");
    WebhookState::new(Dispatcher::new(Arc::new(ctx)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_credentials_disables_replies() {
        let state = build_webhook_state(&Config::default());
        assert!(!state.replies_enabled());
        assert!(build_generator(&Config::default()).is_none());
    }

    #[test]
    fn credentials_enable_replies() {
        let config = Config {
            feishu_app_id: Some("cli_a".into()),
            feishu_app_secret: Some("secret".into()),
            gemini_api_key: Some("k".into()),
            ..Config::default()
        };
        assert!(build_webhook_state(&config).replies_enabled());
        assert!(build_generator(&config).is_some());
    }
}
