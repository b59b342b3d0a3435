//! Axum HTTP server: POST {webhook_path} feeds the raw Feishu event body to the core webhook handler.
//! The handler acknowledges immediately; replies are sent later by background jobs.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tower_http::trace::TraceLayer;

use steamlens_core::config::Config;
use steamlens_core::im::webhook::{handle_webhook_body, WebhookState};

/// Shared app state: the webhook pipeline.
#[derive(Clone)]
struct AppState {
    webhook: WebhookState,
}

/// Router with the Feishu event route mounted at `webhook_path`.
pub fn build_router(webhook: WebhookState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(feishu_webhook_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { webhook })
}

/// Bind `host:port` and serve until the process exits.
pub async fn run_web_server(config: &Config, webhook: WebhookState) -> anyhow::Result<()> {
    drop(webhook.warm_identity());
    let app = build_router(webhook, &config.webhook_path);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, path = %config.webhook_path, "webhook server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// POST {webhook_path}: Feishu sends url_verification (answer {"challenge":"..."}) or an event callback.
async fn feishu_webhook_handler(State(state): State<AppState>, body: String) -> Response {
    let (status_code, body_str) = handle_webhook_body(&body, &state.webhook)
        .await
        .into_response_parts();
    let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::OK);
    (
        status,
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        body_str,
    )
        .into_response()
}
