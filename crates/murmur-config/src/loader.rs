use std::path::Path;

use crate::{Config, DefaultProvider};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if a limit or capacity is zero, or the configured
    /// default provider is missing its section
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache.max_size_bytes == 0 {
            anyhow::bail!("cache.max_size_bytes must be greater than 0");
        }

        if self.quota.daily_request_limit == 0 {
            anyhow::bail!("quota.daily_request_limit must be greater than 0");
        }

        if self.quota.daily_char_limit == 0 {
            anyhow::bail!("quota.daily_char_limit must be greater than 0");
        }

        if self.tts.default_provider == DefaultProvider::Polly && self.tts.polly.is_none() {
            anyhow::bail!("tts.default_provider = \"polly\" requires a [tts.polly] section");
        }

        Ok(())
    }
}
