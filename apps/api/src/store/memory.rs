#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::store::JobStore;

#[derive(Default)]
struct CollectionDoc {
    jobs: Map<String, Value>,
    updated_at: i64,
}

/// In-memory job store with the same observable semantics as `PgJobStore`.
/// Backs the handler tests; the whole map sits behind one `RwLock`, which
/// matches the per-document write atomicity the Postgres backend gets from
/// row-level updates.
#[derive(Default)]
pub struct MemoryJobStore {
    collections: RwLock<HashMap<String, CollectionDoc>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection-level `updatedAt` for a user, if the document exists.
    pub async fn collection_updated_at(&self, user_id: &str) -> Option<i64> {
        self.collections
            .read()
            .await
            .get(user_id)
            .map(|doc| doc.updated_at)
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn load_jobs(&self, user_id: &str) -> Result<Option<Map<String, Value>>, AppError> {
        Ok(self
            .collections
            .read()
            .await
            .get(user_id)
            .map(|doc| doc.jobs.clone()))
    }

    async fn merge_job(
        &self,
        user_id: &str,
        job_id: &str,
        fields: Map<String, Value>,
        now_ms: i64,
    ) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let doc = collections.entry(user_id.to_string()).or_default();

        let entry = doc
            .jobs
            .entry(job_id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(existing) = entry {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }

        doc.updated_at = now_ms;
        Ok(())
    }

    async fn delete_job(
        &self,
        user_id: &str,
        job_id: &str,
        now_ms: i64,
    ) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let doc = collections.get_mut(user_id).ok_or_else(|| {
            AppError::NotFound(format!("No job collection for user '{user_id}'"))
        })?;

        // Removing an id that was never written is a no-op, not an error.
        doc.jobs.remove(job_id);
        doc.updated_at = now_ms;
        Ok(())
    }
}
