//! Filesystem-backed audio cache for synthesized speech
//!
//! Entries are content-addressed by a SHA-256 fingerprint of the
//! (text, voice) pair. Blobs live as `<key>.mp3` files next to a JSON
//! manifest tracking size and last-access time per entry. When the
//! configured capacity would be exceeded, least-recently-accessed
//! entries are evicted first.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::Mutex;

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Blob area or manifest I/O error
    #[error("cache io: {0}")]
    Io(#[from] std::io::Error),
    /// Manifest serialization error
    #[error("manifest serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A single blob can never fit the configured capacity
    #[error("audio blob of {size} bytes exceeds cache capacity of {capacity} bytes")]
    BlobTooLarge { size: u64, capacity: u64 },
}

/// Metadata for one cached audio blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Blob size in bytes
    pub size: u64,
    /// Last access time in milliseconds since the Unix epoch
    pub last_accessed: i64,
    /// Voice the audio was synthesized with
    pub voice_id: String,
    /// Text the audio was synthesized from
    pub text: String,
}

/// Index of all cached entries plus the running total size
///
/// Invariant: `total_size` equals the sum of all entry sizes, and never
/// exceeds the configured capacity after a mutation completes.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    files: HashMap<String, CacheEntry>,
    total_size: u64,
}

/// Content-addressed audio cache with LRU eviction
///
/// All manifest mutation is serialized behind one async mutex, so
/// concurrent stores and lookups cannot lose size-accounting updates.
pub struct AudioCache {
    dir: PathBuf,
    manifest_path: PathBuf,
    max_size_bytes: u64,
    state: Mutex<Manifest>,
}

/// Compute the cache fingerprint for a (text, voice) pair
///
/// Lowercase hex SHA-256 of the text concatenated with the voice
/// identifier. This is the sole identity of a cache entry.
pub fn fingerprint(text: &str, voice_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(voice_id.as_bytes());
    let hash = hasher.finalize();
    format!("{hash:x}")
}

impl AudioCache {
    /// Open the cache, creating the directory if needed
    ///
    /// An unreadable or corrupt manifest starts the cache fresh with a
    /// warning. Manifest entries whose blob file is missing (crash
    /// between blob write and manifest persist, or external deletion)
    /// are dropped and the size total recomputed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be created
    pub async fn open(dir: &Path, max_size_bytes: u64) -> Result<Self, CacheError> {
        tokio::fs::create_dir_all(dir).await?;

        let manifest_path = dir.join("manifest.json");
        let mut manifest = match tokio::fs::read(&manifest_path).await {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "corrupt cache manifest, starting fresh");
                Manifest::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Manifest::default(),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable cache manifest, starting fresh");
                Manifest::default()
            }
        };

        let mut missing = Vec::new();
        for key in manifest.files.keys() {
            if tokio::fs::metadata(dir.join(format!("{key}.mp3"))).await.is_err() {
                missing.push(key.clone());
            }
        }
        for key in missing {
            tracing::warn!(%key, "dropping manifest entry with missing blob");
            manifest.files.remove(&key);
        }
        manifest.total_size = manifest.files.values().map(|entry| entry.size).sum();

        tracing::debug!(
            entries = manifest.files.len(),
            total_size = manifest.total_size,
            "audio cache opened"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            manifest_path,
            max_size_bytes,
            state: Mutex::new(manifest),
        })
    }

    /// Look up cached audio for a (text, voice) pair
    ///
    /// On a hit the entry's access time is bumped and the manifest
    /// persisted. A manifest entry whose blob has gone missing is
    /// dropped and reported as a miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob exists but cannot be read
    pub async fn lookup(&self, text: &str, voice_id: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let key = fingerprint(text, voice_id);
        let mut manifest = self.state.lock().await;

        let Some(entry) = manifest.files.get_mut(&key) else {
            tracing::debug!(%key, "cache miss");
            return Ok(None);
        };

        entry.last_accessed = now_millis();

        match tokio::fs::read(self.blob_path(&key)).await {
            Ok(audio) => {
                self.persist(&manifest).await;
                tracing::debug!(%key, size = audio.len(), "cache hit");
                Ok(Some(audio))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(%key, "cached blob missing, dropping entry");
                if let Some(removed) = manifest.files.remove(&key) {
                    manifest.total_size -= removed.size;
                }
                self.persist(&manifest).await;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Store synthesized audio for a (text, voice) pair
    ///
    /// Storing an already-present key is a no-op, so concurrent misses
    /// that both synthesize the same pair cannot double-count size.
    /// Evicts least-recently-accessed entries first to make room. The
    /// blob is written before the manifest so a crash in between leaves
    /// an orphaned blob, never a dangling manifest entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob alone exceeds capacity or the blob
    /// write fails
    pub async fn store(&self, text: &str, voice_id: &str, audio: &[u8]) -> Result<(), CacheError> {
        let size = audio.len() as u64;
        if size > self.max_size_bytes {
            return Err(CacheError::BlobTooLarge {
                size,
                capacity: self.max_size_bytes,
            });
        }

        let key = fingerprint(text, voice_id);
        let mut manifest = self.state.lock().await;

        if manifest.files.contains_key(&key) {
            tracing::debug!(%key, "entry already cached");
            return Ok(());
        }

        self.evict(&mut manifest, size).await;

        tokio::fs::write(self.blob_path(&key), audio).await?;

        manifest.files.insert(
            key.clone(),
            CacheEntry {
                size,
                last_accessed: now_millis(),
                voice_id: voice_id.to_owned(),
                text: text.to_owned(),
            },
        );
        manifest.total_size += size;

        self.persist(&manifest).await;
        tracing::debug!(%key, size, total_size = manifest.total_size, "cached audio");
        Ok(())
    }

    /// Number of cached entries
    pub async fn entry_count(&self) -> usize {
        self.state.lock().await.files.len()
    }

    /// Sum of all cached blob sizes in bytes
    pub async fn total_size(&self) -> u64 {
        self.state.lock().await.total_size
    }

    /// Evict least-recently-accessed entries until `needed` bytes fit
    ///
    /// Ties on access time break deterministically by key ordering.
    async fn evict(&self, manifest: &mut Manifest, needed: u64) {
        while manifest.total_size + needed > self.max_size_bytes && !manifest.files.is_empty() {
            let oldest = manifest
                .files
                .iter()
                .min_by_key(|(key, entry)| (entry.last_accessed, (*key).clone()))
                .map(|(key, _)| key.clone())
                .expect("manifest is non-empty");

            if let Err(e) = tokio::fs::remove_file(self.blob_path(&oldest)).await {
                tracing::warn!(key = %oldest, error = %e, "failed to unlink evicted blob");
            }

            if let Some(removed) = manifest.files.remove(&oldest) {
                manifest.total_size -= removed.size;
            }
            tracing::debug!(key = %oldest, "evicted cache entry");
        }
    }

    /// Persist the manifest, logging on failure
    ///
    /// The in-memory manifest stays authoritative for this process; a
    /// missed persist only loses the entry across a restart.
    async fn persist(&self, manifest: &Manifest) {
        let data = match serde_json::to_vec_pretty(manifest) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize cache manifest");
                return;
            }
        };

        if let Err(e) = tokio::fs::write(&self.manifest_path, data).await {
            tracing::error!(error = %e, "failed to persist cache manifest");
        }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.mp3"))
    }
}

fn now_millis() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}
