//! Bot identity cache. The bot's open_id is fetched lazily once and kept for the process lifetime.
//! Failed lookups are not cached; the next caller retries. Concurrent misses may both fetch (idempotent).

use tokio::sync::RwLock;

use super::transport::ImTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub open_id: String,
}

impl BotIdentity {
    pub fn new(open_id: impl Into<String>) -> Self {
        Self { open_id: open_id.into() }
    }

    /// Exact id match. An empty id never matches.
    pub fn matches(&self, id: &str) -> bool {
        !id.is_empty() && self.open_id == id
    }
}

#[derive(Default)]
pub struct BotIdentityCache {
    cached: RwLock<Option<BotIdentity>>,
}

impl BotIdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached identity without triggering a lookup.
    pub async fn peek(&self) -> Option<BotIdentity> {
        self.cached.read().await.clone()
    }

    /// Cached identity, or fetch it through `transport`. Returns None when the lookup fails.
    pub async fn get_or_fetch(&self, transport: &dyn ImTransport) -> Option<BotIdentity> {
        if let Some(identity) = self.peek().await {
            return Some(identity);
        }
        match transport.bot_identity().await {
            Ok(identity) => {
                tracing::info!(open_id = %identity.open_id, "bot identity resolved");
                *self.cached.write().await = Some(identity.clone());
                Some(identity)
            }
            Err(e) => {
                tracing::warn!(error = %e, "bot identity lookup failed");
                None
            }
        }
    }
}
