//! Feishu webhook handling: challenge echo, event parsing, mention filter, classification, dispatch.
//! Whatever happens inside, the HTTP answer is 200 so Feishu never retries on our account.

use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;

use super::classify::classify;
use super::dispatch::Dispatcher;
use super::event::{parse_event, ChatType};
use super::identity::BotIdentityCache;
use super::log::truncate_content_default;
use super::mention;

/// State shared by every webhook request. `dispatcher` is None when Feishu credentials are missing.
#[derive(Clone)]
pub struct WebhookState {
    identity: Arc<BotIdentityCache>,
    dispatcher: Option<Dispatcher>,
}

impl WebhookState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            identity: Arc::new(BotIdentityCache::new()),
            dispatcher: Some(dispatcher),
        }
    }

    /// Acknowledge events but never reply (no Feishu credentials).
    pub fn replies_disabled() -> Self {
        Self {
            identity: Arc::new(BotIdentityCache::new()),
            dispatcher: None,
        }
    }

    pub fn replies_enabled(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Resolve the bot identity in the background. The webhook never waits on this lookup;
    /// group messages arriving before it completes are dropped.
    pub fn warm_identity(&self) -> Option<JoinHandle<()>> {
        let dispatcher = self.dispatcher.clone()?;
        let identity = self.identity.clone();
        Some(tokio::spawn(async move {
            identity.get_or_fetch(dispatcher.context().transport.as_ref()).await;
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// URL verification handshake; echo the value verbatim.
    Challenge(serde_json::Value),
    /// A job was spawned.
    Dispatched,
    /// A message event that we looked at and chose not to act on.
    Dropped(&'static str),
    /// Not a message event (or not parseable).
    Ignored(&'static str),
}

impl WebhookOutcome {
    /// (status_code, body_json_string). Always 200.
    pub fn into_response_parts(self) -> (u16, String) {
        let body = match self {
            WebhookOutcome::Challenge(challenge) => json!({ "challenge": challenge }),
            WebhookOutcome::Dispatched | WebhookOutcome::Dropped(_) => json!({ "status": "ok" }),
            WebhookOutcome::Ignored(_) => json!({ "status": "ignored" }),
        };
        (200, body.to_string())
    }
}

/// Handle one webhook body. Returns as soon as the job (if any) is spawned.
/// Encrypted bodies ({"encrypt": "..."}) are not decrypted and are ignored.
pub async fn handle_webhook_body(body: &str, state: &WebhookState) -> WebhookOutcome {
    let root: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(bytes = body.len(), "webhook body is not JSON");
            return WebhookOutcome::Ignored("invalid json");
        }
    };

    if let Some(challenge) = root.get("challenge") {
        tracing::info!("url verification");
        return WebhookOutcome::Challenge(challenge.clone());
    }

    if root.get("encrypt").is_some() {
        tracing::warn!("encrypted event received; disable Encrypt Key in the Feishu console");
        return WebhookOutcome::Ignored("encrypted");
    }

    let event = match parse_event(&root) {
        Ok(e) => e,
        Err(skip) => {
            tracing::debug!(?skip, "event skipped");
            return WebhookOutcome::Ignored("no message");
        }
    };

    tracing::info!(
        event_type = event.event_type.as_deref().unwrap_or("?"),
        chat_type = event.chat_type.as_str(),
        chat_id = %event.chat_id,
        message_id = %event.message_id,
        mentions = event.mentions.len(),
        content = %truncate_content_default(&event.raw_text),
        "incoming message"
    );

    let Some(dispatcher) = state.dispatcher.as_ref() else {
        tracing::warn!(message_id = %event.message_id, "feishu credentials missing, reply disabled");
        return WebhookOutcome::Dropped("replies disabled");
    };

    // Only the cached identity is consulted; a miss starts a lookup for later messages.
    let identity = state.identity.peek().await;
    if identity.is_none() && event.chat_type != ChatType::P2p {
        tracing::debug!(message_id = %event.message_id, "bot identity not cached yet, resolving in background");
        drop(state.warm_identity());
    }

    let filtered = mention::filter(&event, identity.as_ref());
    if !filtered.addressed {
        tracing::debug!(
            message_id = %event.message_id,
            identity_known = identity.is_some(),
            "bot not addressed"
        );
        return WebhookOutcome::Dropped("not addressed");
    }

    let Some(request) = classify(&filtered.text) else {
        tracing::info!(message_id = %event.message_id, "empty message ignored");
        return WebhookOutcome::Dropped("empty");
    };

    tracing::info!(message_id = %event.message_id, kind = request.kind(), "dispatching");
    // Detached: the handle is dropped, the job keeps running.
    drop(dispatcher.dispatch(request, event.message_id));
    WebhookOutcome::Dispatched
}
