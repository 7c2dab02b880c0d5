use std::path::PathBuf;

use serde::Deserialize;

/// Audio cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Directory holding audio blobs and the manifest file
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// Hard capacity bound for the blob area in bytes
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            max_size_bytes: default_max_size_bytes(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("cache")
}

const fn default_max_size_bytes() -> u64 {
    1024 * 1024 * 1024
}
