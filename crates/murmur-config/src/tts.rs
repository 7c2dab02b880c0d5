use secrecy::SecretString;
use serde::Deserialize;

/// Top-level TTS provider configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    /// Provider used for voices that do not match the neural naming convention
    #[serde(default)]
    pub default_provider: DefaultProvider,
    /// Google Cloud TTS, serves wavenet voices
    #[serde(default)]
    pub google: Option<GoogleTtsConfig>,
    /// AWS Polly
    #[serde(default)]
    pub polly: Option<PollyConfig>,
    /// Streamlabs relay
    #[serde(default)]
    pub streamlabs: StreamlabsConfig,
}

/// Provider selected for non-neural voices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultProvider {
    /// Streamlabs relay (no credentials required)
    #[default]
    Streamlabs,
    /// AWS Polly
    Polly,
}

/// Configuration for the Google Cloud TTS REST endpoint
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleTtsConfig {
    /// API key
    pub api_key: SecretString,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Configuration for AWS Polly
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollyConfig {
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
}

/// Configuration for the Streamlabs relay
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamlabsConfig {
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_owned()
}
