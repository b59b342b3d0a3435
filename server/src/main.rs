//! Standalone SteamLens server binary. Run with --config and --port, or use defaults.

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use steamlens_core::config::{self, Config};
use steamlens_core::relay;

fn main() -> Result<()> {
    // .env is optional; real environment wins.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,steamlens_core=debug,steamlens_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config_path: Option<PathBuf> = None;
    let mut port: Option<u16> = None;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            config_path = Some(PathBuf::from(&args[i + 1]));
            i += 2;
            continue;
        }
        if args[i] == "--port" && i + 1 < args.len() {
            port = args[i + 1].parse().ok();
            i += 2;
            continue;
        }
        i += 1;
    }

    let config_path = config_path.unwrap_or_else(config::default_settings_path);
    tracing::info!(path = %config_path.display(), "loading settings");
    let mut config = Config::load(&config_path);
    if let Some(port) = port {
        config.port = port;
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let webhook = relay::build_webhook_state(&config);
        steamlens_server::run_web_server(&config, webhook).await
    })
}
