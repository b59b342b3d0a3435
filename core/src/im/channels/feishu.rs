//! Feishu (Lark) IM: HTTP API with tenant_access_token.
//! Reply via open-apis/im/v1/messages/{id}/reply (interactive card); bot identity via open-apis/bot/v3/info.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::FEISHU_TIMEOUT;
use crate::error::RelayError;
use crate::im::card::ReplyCard;
use crate::im::identity::BotIdentity;
use crate::im::transport::{ImChannelCapabilities, ImTransport};

/// Markdown budget for one card reply (conservative; card payload limit is ~30 KB).
pub const FEISHU_MAX_CARD_LEN: usize = 8000;

/// Refresh token when less than this many seconds remain.
const TOKEN_REFRESH_MARGIN_SECS: u64 = 300;
/// Used when the token response omits `expire`.
const DEFAULT_TOKEN_TTL_SECS: u64 = 7200;

const SERVICE: &str = "feishu";

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Tenant access token cache. One per client; concurrent misses may both fetch (idempotent).
#[derive(Default)]
pub struct TokenCache {
    slot: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fresh(&self) -> Option<String> {
        let guard = self.slot.read().await;
        guard
            .as_ref()
            .filter(|c| {
                c.expires_at.saturating_duration_since(Instant::now())
                    > Duration::from_secs(TOKEN_REFRESH_MARGIN_SECS)
            })
            .map(|c| c.token.clone())
    }

    async fn store(&self, token: String, ttl: Duration) {
        *self.slot.write().await = Some(CachedToken {
            token,
            expires_at: Instant::now() + ttl,
        });
    }
}

/// Feishu client: app_id + app_secret, cached tenant_access_token, replies via HTTP.
pub struct FeishuClient {
    app_id: String,
    app_secret: String,
    api_base: String,
    client: reqwest::Client,
    tokens: TokenCache,
}

impl FeishuClient {
    pub fn new(app_id: String, app_secret: String, api_base: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FEISHU_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self {
            app_id,
            app_secret,
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
            tokens: TokenCache::new(),
        }
    }

    async fn get_token(&self) -> Result<String, RelayError> {
        if let Some(token) = self.tokens.fresh().await {
            return Ok(token);
        }
        let body = serde_json::json!({
            "app_id": self.app_id,
            "app_secret": self.app_secret,
        });
        let url = format!("{}/auth/v3/tenant_access_token/internal", self.api_base);
        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(RelayError::http(SERVICE))?;
        let text = res.text().await.map_err(RelayError::http(SERVICE))?;
        let json = check_code(&text)?;
        let token = json
            .get("tenant_access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| RelayError::malformed(SERVICE, "token response missing tenant_access_token"))?
            .to_string();
        let ttl = json.get("expire").and_then(|e| e.as_u64()).unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        self.tokens.store(token.clone(), Duration::from_secs(ttl)).await;
        tracing::debug!(ttl_secs = ttl, "feishu tenant_access_token refreshed");
        Ok(token)
    }
}

/// Parse a Feishu JSON body and require `code == 0`.
fn check_code(text: &str) -> Result<serde_json::Value, RelayError> {
    let json: serde_json::Value = serde_json::from_str(text).unwrap_or(serde_json::Value::Null);
    let code = json.get("code").and_then(|c| c.as_i64()).unwrap_or(-1);
    if code != 0 {
        return Err(RelayError::Api {
            service: SERVICE,
            code,
            body: text.to_string(),
        });
    }
    Ok(json)
}

#[async_trait]
impl ImTransport for FeishuClient {
    fn capabilities(&self) -> ImChannelCapabilities {
        ImChannelCapabilities {
            max_card_len: FEISHU_MAX_CARD_LEN,
            channel: SERVICE,
        }
    }

    async fn reply_card(&self, message_id: &str, card: &ReplyCard) -> Result<(), RelayError> {
        let token = self.get_token().await?;
        let body = serde_json::json!({
            "msg_type": "interactive",
            "content": card.to_feishu_card().to_string(),
        });
        let url = format!("{}/im/v1/messages/{}/reply", self.api_base, message_id);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&body)
            .send()
            .await
            .map_err(RelayError::http(SERVICE))?;
        if res.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = res
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(60.0);
            return Err(RelayError::RateLimited {
                service: SERVICE,
                retry_after_secs: retry_after,
            });
        }
        let text = res.text().await.map_err(RelayError::http(SERVICE))?;
        let json = check_code(&text)?;
        tracing::info!(
            message_id,
            msg = json.get("msg").and_then(|m| m.as_str()).unwrap_or(""),
            "feishu reply sent"
        );
        Ok(())
    }

    async fn bot_identity(&self) -> Result<BotIdentity, RelayError> {
        let token = self.get_token().await?;
        let url = format!("{}/bot/v3/info", self.api_base);
        let res = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(RelayError::http(SERVICE))?;
        let text = res.text().await.map_err(RelayError::http(SERVICE))?;
        let json = check_code(&text)?;
        json.pointer("/bot/open_id")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(BotIdentity::new)
            .ok_or_else(|| RelayError::malformed(SERVICE, "bot info missing bot.open_id"))
    }
}
