//! Dispatch router: one detached tokio task per qualifying message.
//! The webhook never awaits these tasks. Outcomes (reply failures, panics) are logged here and
//! nowhere else; a panicking job still gets a best-effort apology card.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::JoinHandle;

use super::card::ReplyCard;
use super::classify::ClassifiedRequest;
use super::worker::{self, JobContext};
use crate::error::RelayError;
use crate::prompt;

#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<JobContext>,
}

impl Dispatcher {
    pub fn new(ctx: Arc<JobContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<JobContext> {
        &self.ctx
    }

    /// Start the job for `request` and return immediately. The handle is only for callers that
    /// want to observe completion (tests); dropping it does not cancel the job.
    pub fn dispatch(&self, request: ClassifiedRequest, message_id: String) -> JoinHandle<()> {
        let ctx = self.ctx.clone();
        let kind = request.kind();
        let id = message_id.clone();
        let job = async move {
            let card = worker::build_reply(&ctx, &request).await;
            worker::send_reply(&ctx, &id, card).await
        };
        spawn_detached(self.ctx.clone(), kind, message_id, job)
    }
}

/// Spawn `job` fire-and-forget with central outcome logging.
fn spawn_detached<F>(
    ctx: Arc<JobContext>,
    kind: &'static str,
    message_id: String,
    job: F,
) -> JoinHandle<()>
where
    F: Future<Output = Result<(), RelayError>> + Send + 'static,
{
    tokio::spawn(async move {
        tracing::debug!(kind, message_id = %message_id, "job started");
        match AssertUnwindSafe(job).catch_unwind().await {
            Ok(Ok(())) => {
                tracing::info!(kind, message_id = %message_id, "job finished, reply sent");
            }
            Ok(Err(e)) => {
                tracing::error!(kind, message_id = %message_id, error = %e, "job failed to reply");
            }
            Err(_) => {
                tracing::error!(kind, message_id = %message_id, "job panicked");
                let card = ReplyCard::failure(prompt::FAILURE_CARD_TITLE, prompt::INTERNAL_ERROR);
                if let Err(e) = worker::send_reply(&ctx, &message_id, card).await {
                    tracing::error!(kind, message_id = %message_id, error = %e, "apology reply failed");
                }
            }
        }
    })
}
