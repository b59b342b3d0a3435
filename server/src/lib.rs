//! SteamLens server: Axum HTTP endpoint for Feishu events. The relay pipeline lives in steamlens-core.

mod web_server;

pub use web_server::{build_router, run_web_server};
