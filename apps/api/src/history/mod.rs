//! Analysis history — a single serialized array of entries, newest first,
//! capped at [`HISTORY_CAP`].
//!
//! Decoding never fails: unreadable payloads read as an empty history and
//! entries without an `id` or `extractedSkills` are dropped.

pub mod file;
pub mod redis_store;
pub mod store;

use serde_json::Value;
use tracing::warn;

use crate::models::analysis::AnalysisEntry;

pub use file::FileHistoryStore;
pub use redis_store::RedisHistoryStore;
pub use store::{HistoryStore, MemoryHistoryStore, StoreError};

pub const HISTORY_CAP: usize = 20;

/// Default storage key, shared with histories written by the browser app.
pub const DEFAULT_HISTORY_KEY: &str = "kodnestAnalysisHistory";

/// Truthiness of a JSON value as the browser app judged it.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Parses a raw history payload, filtering out malformed entries.
pub fn decode_history(raw: Option<&str>) -> Vec<AnalysisEntry> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Vec::new();
    };

    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!("History payload is not an array, ignoring it");
            return Vec::new();
        }
        Err(e) => {
            warn!("History corrupted: {e}");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter(|item| is_truthy(item.get("id")) && is_truthy(item.get("extractedSkills")))
        .filter_map(|item| match serde_json::from_value::<AnalysisEntry>(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Dropping unreadable history entry: {e}");
                None
            }
        })
        .collect()
}

pub fn encode_history(entries: &[AnalysisEntry]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(entries)?)
}

/// Inserts at the head and evicts from the tail past the cap.
pub fn push_capped(history: &mut Vec<AnalysisEntry>, entry: AnalysisEntry) {
    history.insert(0, entry);
    history.truncate(HISTORY_CAP);
}
