//! SteamLens core: Feishu webhook pipeline, Steam store scraper, Gemini client, settings. No HTTP server.

pub mod config;
pub mod error;
pub mod gemini;
pub mod im;
pub mod prompt;
pub mod relay;
pub mod store;
