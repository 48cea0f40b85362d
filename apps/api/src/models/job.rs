use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step in a job application's status history. Entries are
/// append-oriented; insertion order is chronological order and the store
/// never reorders or dedups them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub phase: String,
    pub date: String,
}

/// One tracked job application, as returned by the list endpoint.
///
/// `reject_reason` is omitted from the JSON entirely when unset; clients
/// key off field presence, not null-ness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub job_name: String,
    pub company: String,
    pub platform: String,
    pub notes: String,
    pub status: Vec<StatusEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}

/// Partial job record accepted at the upsert boundary. Absent fields are
/// never written, so an existing record's fields survive a partial update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<StatusEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
}

impl JobRecord {
    /// Reconstructs a record from whatever is stored under `jobs[id]`.
    ///
    /// Stored documents are trusted at write time, so reads stay defensive:
    /// missing or non-string scalars collapse to `""`, a missing or
    /// non-array `status` collapses to `[]`, and `rejectReason` is dropped
    /// when absent or empty. The record-level `updatedAt` stamp is not
    /// echoed back to clients.
    pub fn from_stored(id: &str, raw: &Value) -> Self {
        JobRecord {
            id: id.to_string(),
            job_name: str_field(raw, "jobName"),
            company: str_field(raw, "company"),
            platform: str_field(raw, "platform"),
            notes: str_field(raw, "notes"),
            status: status_field(raw),
            reject_reason: raw
                .get("rejectReason")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

fn str_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn status_field(raw: &Value) -> Vec<StatusEntry> {
    match raw.get("status").and_then(Value::as_array) {
        Some(entries) => entries
            .iter()
            .map(|entry| StatusEntry {
                phase: str_field(entry, "phase"),
                date: str_field(entry, "date"),
            })
            .collect(),
        None => vec![],
    }
}
