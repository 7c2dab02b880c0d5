//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use murmur_config::{Config, GoogleTtsConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
///
/// Cache and ledger files land under the provided data directory so
/// each test gets isolated state.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with state rooted at `data_dir`
    pub fn new(data_dir: &Path) -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        config.cache.dir = data_dir.join("cache");
        config.quota.ledger_path = data_dir.join("usage.json");
        Self { config }
    }

    /// Point the Streamlabs relay at a mock backend
    pub fn with_streamlabs(mut self, base_url: &str) -> Self {
        self.config.tts.streamlabs.base_url = Some(base_url.to_owned());
        self
    }

    /// Configure the Google provider against a mock backend
    pub fn with_google(mut self, base_url: &str) -> Self {
        self.config.tts.google = Some(GoogleTtsConfig {
            api_key: SecretString::from("test-key"),
            base_url: Some(base_url.to_owned()),
        });
        self
    }

    /// Set the daily request limit
    pub fn with_request_limit(mut self, limit: u32) -> Self {
        self.config.quota.daily_request_limit = limit;
        self
    }

    /// Set the daily character limit
    pub fn with_char_limit(mut self, limit: u64) -> Self {
        self.config.quota.daily_char_limit = limit;
        self
    }

    /// Set the cache capacity in bytes
    pub fn with_cache_capacity(mut self, max_size_bytes: u64) -> Self {
        self.config.cache.max_size_bytes = max_size_bytes;
        self
    }

    /// Disable the health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
