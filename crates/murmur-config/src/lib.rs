#![allow(clippy::must_use_candidate)]

pub mod cache;
pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod quota;
pub mod server;
pub mod tts;

use serde::Deserialize;

pub use cache::*;
pub use cors::*;
pub use health::*;
pub use quota::*;
pub use server::*;
pub use tts::*;

/// Top-level murmur configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Audio cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Daily quota configuration
    #[serde(default)]
    pub quota: QuotaConfig,
    /// TTS provider configuration
    #[serde(default)]
    pub tts: TtsConfig,
}
