//! Job Store — pluggable, trait-based persistence for per-user job
//! collections.
//!
//! Each user owns a single document: a mapping from job id to the stored
//! record, plus a collection-level `updatedAt` stamp. The store exposes the
//! three primitives the handlers need (read the mapping, shallow-merge one
//! entry, remove one entry) and nothing else; all write atomicity is the
//! backend's problem.
//!
//! `AppState` holds an `Arc<dyn JobStore>`. Default: `PgJobStore` (one JSONB
//! row per user). `MemoryJobStore` backs the handler tests.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::AppError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryJobStore;
pub use postgres::PgJobStore;

/// Persistence seam for per-user job collections.
///
/// Semantics every backend must honor:
/// - `load_jobs` returns `None` when the user has no collection document at
///   all; an existing document with no jobs is `Some` of an empty map.
/// - `merge_job` creates the collection document on demand and
///   shallow-merges `fields` into the entry at `job_id`: fields absent from
///   `fields` survive from the existing entry. Collection `updatedAt` is set
///   to `now_ms`. One atomic write.
/// - `delete_job` removes the `job_id` entry outright (not a null-out) and
///   stamps `now_ms`. A missing collection document is `NotFound`; a missing
///   entry inside an existing document is a no-op.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn load_jobs(&self, user_id: &str) -> Result<Option<Map<String, Value>>, AppError>;

    async fn merge_job(
        &self,
        user_id: &str,
        job_id: &str,
        fields: Map<String, Value>,
        now_ms: i64,
    ) -> Result<(), AppError>;

    async fn delete_job(&self, user_id: &str, job_id: &str, now_ms: i64)
        -> Result<(), AppError>;
}
