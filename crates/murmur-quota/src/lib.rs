//! Daily usage ledger shared by all gateway callers
//!
//! Tracks per-day request and character totals and admits or rejects
//! new synthesis work against configured ceilings. All mutation is
//! funneled through one async mutex so two concurrent reservations can
//! never jointly overshoot a limit neither alone would breach.
//!
//! The ledger is persisted as a JSON array, rewritten whole on each
//! mutation. A persist failure after an in-memory commit is logged and
//! swallowed: the admission already happened, and a crash at worst
//! undercounts usage, never overcounts it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Configured daily ceilings
#[derive(Debug, Clone, Copy)]
pub struct QuotaLimits {
    /// Maximum synthesis requests admitted per calendar day
    pub daily_requests: u32,
    /// Maximum characters synthesized per calendar day
    pub daily_chars: u64,
}

/// Usage counters for one calendar day (UTC)
///
/// `requests` and `chars` only grow within a day; a fresh record is
/// created lazily when the first request of a new date arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayUsage {
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    /// Synthesis requests admitted
    pub requests: u32,
    /// Characters admitted for synthesis
    pub chars: u64,
    /// Requests served from the audio cache (not counted against quota)
    #[serde(default)]
    pub cache_hits: u64,
}

impl DayUsage {
    fn new(date: String) -> Self {
        Self {
            date,
            requests: 0,
            chars: 0,
            cache_hits: 0,
        }
    }
}

/// Outcome of a quota reservation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// Both counters were committed
    Admitted,
    /// Nothing was committed
    Rejected(RejectReason),
}

/// Why a reservation was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The daily request ceiling would be breached
    RequestsExceeded,
    /// The daily character ceiling would be breached
    CharsExceeded,
}

/// Persistent ledger of [`DayUsage`] records, oldest first
pub struct UsageLedger {
    path: PathBuf,
    limits: QuotaLimits,
    state: Mutex<Vec<DayUsage>>,
}

impl UsageLedger {
    /// Open the ledger, reading any previously persisted history
    ///
    /// A missing file starts an empty history. A ledger written in the
    /// legacy single-record format is migrated to a one-element
    /// history. Anything unreadable starts fresh with a warning.
    pub async fn open(path: &Path, limits: QuotaLimits) -> Self {
        let history = match tokio::fs::read(path).await {
            Ok(data) => parse_history(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable usage ledger, starting fresh");
                Vec::new()
            }
        };

        tracing::debug!(days = history.len(), "usage ledger opened");

        Self {
            path: path.to_path_buf(),
            limits,
            state: Mutex::new(history),
        }
    }

    /// Reserve one request and `additional_chars` characters for today
    ///
    /// The request ceiling is checked before the character ceiling. On
    /// rejection neither counter changes. On admission both counters
    /// are committed and the ledger persisted.
    pub async fn reserve(&self, additional_chars: u64) -> Reservation {
        self.reserve_on(&today_utc(), additional_chars).await
    }

    async fn reserve_on(&self, date: &str, additional_chars: u64) -> Reservation {
        let mut history = self.state.lock().await;
        let today = day_record(&mut history, date);

        let next_requests = today.requests + 1;
        let next_chars = today.chars + additional_chars;

        if next_requests > self.limits.daily_requests {
            tracing::debug!(date, requests = today.requests, "daily request limit reached");
            return Reservation::Rejected(RejectReason::RequestsExceeded);
        }

        if next_chars > self.limits.daily_chars {
            tracing::debug!(date, chars = today.chars, additional_chars, "daily character limit reached");
            return Reservation::Rejected(RejectReason::CharsExceeded);
        }

        today.requests = next_requests;
        today.chars = next_chars;

        self.persist(&history).await;
        Reservation::Admitted
    }

    /// Record a request served from the audio cache
    ///
    /// Cache hits never consume quota; they are tracked separately for
    /// reporting.
    pub async fn record_cache_hit(&self) {
        self.record_cache_hit_on(&today_utc()).await;
    }

    async fn record_cache_hit_on(&self, date: &str) {
        let mut history = self.state.lock().await;
        let today = day_record(&mut history, date);

        today.cache_hits += 1;

        self.persist(&history).await;
    }

    /// All day records, oldest first
    ///
    /// Read-only; old records are retained indefinitely for reporting.
    pub async fn report(&self) -> Vec<DayUsage> {
        self.state.lock().await.clone()
    }

    /// Persist the ledger, logging on failure
    async fn persist(&self, history: &[DayUsage]) {
        let data = match serde_json::to_vec_pretty(history) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize usage ledger");
                return;
            }
        };

        if let Err(e) = tokio::fs::write(&self.path, data).await {
            tracing::error!(error = %e, "failed to persist usage ledger");
        }
    }
}

/// Find or lazily create the record for `date`
fn day_record<'a>(history: &'a mut Vec<DayUsage>, date: &str) -> &'a mut DayUsage {
    if let Some(index) = history.iter().position(|day| day.date == date) {
        &mut history[index]
    } else {
        history.push(DayUsage::new(date.to_owned()));
        history.last_mut().expect("record was just pushed")
    }
}

/// Parse a persisted ledger, accepting the legacy single-record form
fn parse_history(data: &[u8]) -> Vec<DayUsage> {
    if let Ok(history) = serde_json::from_slice::<Vec<DayUsage>>(data) {
        return history;
    }

    if let Ok(single) = serde_json::from_slice::<DayUsage>(data) {
        return vec![single];
    }

    tracing::warn!("unparseable usage ledger, starting fresh");
    Vec::new()
}

/// Today's calendar date under the UTC convention
fn today_utc() -> String {
    jiff::Timestamp::now()
        .to_zoned(jiff::tz::TimeZone::UTC)
        .strftime("%Y-%m-%d")
        .to_string()
}
