use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::store::JobStore;

/// Postgres-backed job store: one JSONB row per user in
/// `user_job_collections`. Merge and field-deletion are expressed as single
/// UPDATE statements so concurrent writers serialize on the row.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn load_jobs(&self, user_id: &str) -> Result<Option<Map<String, Value>>, AppError> {
        let jobs: Option<Value> =
            sqlx::query_scalar("SELECT jobs FROM user_job_collections WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(jobs.map(|value| match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }))
    }

    async fn merge_job(
        &self,
        user_id: &str,
        job_id: &str,
        fields: Map<String, Value>,
        now_ms: i64,
    ) -> Result<(), AppError> {
        // `||` is a shallow object merge, so fields absent from the patch
        // survive from the stored entry. COALESCE handles the first upsert
        // for a job id; ON CONFLICT handles the first upsert for a user.
        sqlx::query(
            r#"
            INSERT INTO user_job_collections (user_id, jobs, updated_at)
            VALUES ($1, jsonb_build_object($2::text, $3::jsonb), $4)
            ON CONFLICT (user_id) DO UPDATE
            SET jobs = jsonb_set(
                    user_job_collections.jobs,
                    ARRAY[$2::text],
                    COALESCE(user_job_collections.jobs -> $2::text, '{}'::jsonb) || $3::jsonb
                ),
                updated_at = $4
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(Value::Object(fields))
        .bind(now_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_job(
        &self,
        user_id: &str,
        job_id: &str,
        now_ms: i64,
    ) -> Result<(), AppError> {
        // `-` removes the key outright; removing an absent key is a no-op,
        // but an absent row means the user never had a collection document.
        let result = sqlx::query(
            r#"
            UPDATE user_job_collections
            SET jobs = jobs - $2::text, updated_at = $3
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(now_ms)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "No job collection for user '{user_id}'"
            )));
        }

        Ok(())
    }
}
