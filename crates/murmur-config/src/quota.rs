use std::path::PathBuf;

use serde::Deserialize;

/// Daily usage quota configuration
///
/// Both limits apply to the whole gateway, shared across all callers.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Path of the persisted usage ledger
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    /// Maximum synthesis requests admitted per calendar day
    #[serde(default = "default_daily_request_limit")]
    pub daily_request_limit: u32,
    /// Maximum characters synthesized per calendar day
    #[serde(default = "default_daily_char_limit")]
    pub daily_char_limit: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            daily_request_limit: default_daily_request_limit(),
            daily_char_limit: default_daily_char_limit(),
        }
    }
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("usage.json")
}

const fn default_daily_request_limit() -> u32 {
    8000
}

const fn default_daily_char_limit() -> u64 {
    250_000
}
