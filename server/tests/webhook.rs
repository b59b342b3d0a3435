//! End-to-end: real listener, fake Feishu and Gemini APIs served in-process.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use steamlens_core::config::Config;
use steamlens_core::relay;

#[derive(Clone, Default)]
struct Upstream {
    replies: Arc<Mutex<Vec<(String, Value)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

async fn token() -> Json<Value> {
    Json(json!({ "code": 0, "tenant_access_token": "t-e2e", "expire": 7200 }))
}

async fn bot_info() -> Json<Value> {
    Json(json!({ "code": 0, "bot": { "open_id": "ou_bot" } }))
}

async fn reply(
    State(up): State<Upstream>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let card: Value = serde_json::from_str(body["content"].as_str().unwrap_or("{}")).unwrap_or(Value::Null);
    up.replies.lock().unwrap().push((id, card));
    Json(json!({ "code": 0, "msg": "success" }))
}

async fn generate(State(up): State<Upstream>, Json(body): Json<Value>) -> Json<Value> {
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or("").to_string();
    up.prompts.lock().unwrap().push(prompt);
    Json(json!({
        "candidates": [{ "content": { "parts": [{ "text": "试试《传送门 2》。" }] }, "finishReason": "STOP" }]
    }))
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn start() -> (String, Upstream) {
    let up = Upstream::default();
    let upstream = Router::new()
        .route("/open-apis/auth/v3/tenant_access_token/internal", post(token))
        .route("/open-apis/bot/v3/info", get(bot_info))
        .route("/open-apis/im/v1/messages/{id}/reply", post(reply))
        .route("/v1beta/models/{model}", post(generate))
        .with_state(up.clone());
    let upstream_base = spawn(upstream).await;

    let config = Config {
        feishu_app_id: Some("cli_e2e".into()),
        feishu_app_secret: Some("secret".into()),
        feishu_api_base: format!("{}/open-apis", upstream_base),
        gemini_api_key: Some("k".into()),
        gemini_api_base: upstream_base,
        ..Config::default()
    };
    let state = relay::build_webhook_state(&config);
    // The webhook only consults the cached identity; resolve it up front as the server does at startup.
    state.warm_identity().expect("replies enabled").await.unwrap();
    let app = steamlens_server::build_router(state, &config.webhook_path);
    let base = spawn(app).await;
    (format!("{}{}", base, config.webhook_path), up)
}

fn message(chat_type: &str, text: &str, mentions: Value) -> Value {
    json!({
        "schema": "2.0",
        "header": { "event_type": "im.message.receive_v1" },
        "event": { "message": {
            "message_id": "om_e2e",
            "chat_id": "oc_e2e",
            "chat_type": chat_type,
            "message_type": "text",
            "content": json!({ "text": text }).to_string(),
            "mentions": mentions,
        } }
    })
}

async fn wait_for_reply(up: &Upstream) -> (String, Value) {
    for _ in 0..200 {
        if let Some(r) = up.replies.lock().unwrap().first().cloned() {
            return r;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no reply posted");
}

#[tokio::test]
async fn url_verification_echoes_challenge() {
    let (url, _) = start().await;
    let res = reqwest::Client::new()
        .post(&url)
        .json(&json!({ "challenge": "c-123", "type": "url_verification" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "challenge": "c-123" }));
}

#[tokio::test]
async fn p2p_question_gets_card_reply() {
    let (url, up) = start().await;
    let res = reqwest::Client::new()
        .post(&url)
        .json(&message("p2p", "有什么好玩的解谜游戏？", json!([])))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "status": "ok" }));

    let (id, card) = wait_for_reply(&up).await;
    assert_eq!(id, "om_e2e");
    assert_eq!(card["header"]["title"]["content"], "🤖 AI 助手 (Gemini)");
    assert_eq!(card["elements"][0]["content"], "试试《传送门 2》。");
    assert!(up.prompts.lock().unwrap()[0].ends_with("有什么好玩的解谜游戏？"));
}

#[tokio::test]
async fn group_mention_is_stripped_before_prompting() {
    let (url, up) = start().await;
    let mentions = json!([{ "key": "@_user_1", "name": "SteamLens", "id": { "open_id": "ou_bot" } }]);
    let res = reqwest::Client::new()
        .post(&url)
        .json(&message("group", "@_user_1 推荐一款 roguelike", mentions))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    wait_for_reply(&up).await;
    let prompt = up.prompts.lock().unwrap()[0].clone();
    assert!(prompt.ends_with("推荐一款 roguelike"));
    assert!(!prompt.contains("@_user_1"));
}

#[tokio::test]
async fn group_without_bot_mention_is_acked_and_dropped() {
    let (url, up) = start().await;
    let mentions = json!([{ "key": "@_user_1", "name": "Ann", "id": { "open_id": "ou_ann" } }]);
    let res = reqwest::Client::new()
        .post(&url)
        .json(&message("group", "@_user_1 晚上开黑吗", mentions))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "status": "ok" }));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(up.replies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn garbage_body_still_gets_200() {
    let (url, up) = start().await;
    let res = reqwest::Client::new()
        .post(&url)
        .header("content-type", "application/json")
        .body("{oops")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "status": "ignored" }));
    assert!(up.replies.lock().unwrap().is_empty());
}
