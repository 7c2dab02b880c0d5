use std::sync::Arc;

use axum::{Json, extract::State};
use murmur_quota::DayUsage;
use tts::Gateway;

/// Usage report, oldest day first
///
/// Raw data only; rendering is owned by the external stats surface.
pub async fn stats_handler(State(gateway): State<Arc<Gateway>>) -> Json<Vec<DayUsage>> {
    Json(gateway.usage_report().await)
}
