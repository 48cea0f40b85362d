use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::job::{JobPatch, JobRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListJobsQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListJobsResponse {
    pub message: String,
    pub data: Vec<JobRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertJobRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub job: Option<JobPatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteJobRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

fn require_id(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// GET /api/v1/jobs
///
/// Read-only. A user with no collection document gets an empty `data`, not
/// an error; only a missing `userId` is a client fault.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsQuery>,
) -> Result<Json<ListJobsResponse>, AppError> {
    let user_id = require_id(params.user_id)
        .ok_or_else(|| AppError::Validation("Missing userId parameter".to_string()))?;

    let jobs = state.store.load_jobs(&user_id).await?;

    let data = match jobs {
        Some(map) => map
            .iter()
            .map(|(id, raw)| JobRecord::from_stored(id, raw))
            .collect(),
        None => vec![],
    };

    Ok(Json(ListJobsResponse {
        message: "Jobs retrieved successfully".to_string(),
        data,
    }))
}

/// PUT /api/v1/job
///
/// Shallow-merges the patch into `jobs[jobId]`, creating the collection
/// document on first write. Both the record and the collection get the same
/// wall-clock `updatedAt` stamp. Same-id writers race last-write-wins; there
/// is deliberately no version check here.
pub async fn handle_upsert_job(
    State(state): State<AppState>,
    Json(req): Json<UpsertJobRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (user_id, job_id, job) = match (
        require_id(req.user_id),
        require_id(req.job_id),
        req.job,
    ) {
        (Some(user_id), Some(job_id), Some(job)) => (user_id, job_id, job),
        _ => {
            return Err(AppError::Validation(
                "Missing userId, jobId or job data".to_string(),
            ))
        }
    };

    let now_ms = Utc::now().timestamp_millis();

    let Ok(Value::Object(mut fields)) = serde_json::to_value(&job) else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "job patch did not serialize to an object"
        )));
    };
    fields.insert("updatedAt".to_string(), Value::from(now_ms));

    state.store.merge_job(&user_id, &job_id, fields, now_ms).await?;

    Ok(Json(MessageResponse {
        message: "Job updated successfully".to_string(),
    }))
}

/// DELETE /api/v1/job
///
/// Removes the `jobs[jobId]` field path outright. A missing collection
/// document is 404 — unlike List, which reports it as empty — while a
/// missing id inside an existing document deletes nothing and still
/// succeeds.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Json(req): Json<DeleteJobRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (user_id, job_id) = match (require_id(req.user_id), require_id(req.job_id)) {
        (Some(user_id), Some(job_id)) => (user_id, job_id),
        _ => {
            return Err(AppError::Validation(
                "Missing userId or jobId".to_string(),
            ))
        }
    };

    let now_ms = Utc::now().timestamp_millis();
    state.store.delete_job(&user_id, &job_id, now_ms).await?;

    Ok(Json(MessageResponse {
        message: "Job deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::store::MemoryJobStore;

    fn app() -> Router {
        build_router(AppState {
            store: Arc::new(MemoryJobStore::new()),
        })
    }

    fn list_request(user_id: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/api/v1/jobs?userId={user_id}"))
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri("/api/v1/job")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_list_unknown_user_is_empty_success() {
        let app = app();
        let (status, body) = send(&app, list_request("ghost")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Jobs retrieved successfully");
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_list_without_user_id_is_400() {
        let app = app();
        let request = Request::builder()
            .uri("/api/v1/jobs")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Missing userId parameter");
    }

    #[tokio::test]
    async fn test_upsert_then_list_round_trip() {
        let app = app();
        let (status, _) = send(
            &app,
            json_request(
                "PUT",
                json!({
                    "userId": "u1",
                    "jobId": "j1",
                    "job": {
                        "jobName": "Engineer",
                        "company": "Acme",
                        "platform": "LinkedIn",
                        "notes": "",
                        "status": []
                    }
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, list_request("u1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!([{
                "id": "j1",
                "jobName": "Engineer",
                "company": "Acme",
                "platform": "LinkedIn",
                "notes": "",
                "status": []
            }])
        );
        // rejectReason must be absent, not null
        assert!(body["data"][0].get("rejectReason").is_none());
    }

    #[tokio::test]
    async fn test_upsert_missing_job_data_is_400() {
        let app = app();
        let (status, body) = send(
            &app,
            json_request("PUT", json!({ "userId": "u1", "jobId": "j1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Missing userId, jobId or job data");
    }

    #[tokio::test]
    async fn test_upsert_empty_user_id_is_400() {
        let app = app();
        let (status, _) = send(
            &app,
            json_request("PUT", json!({ "userId": "", "jobId": "j1", "job": {} })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let app = app();
        let payload = json!({
            "userId": "u1",
            "jobId": "j1",
            "job": { "jobName": "Engineer", "company": "Acme" }
        });
        send(&app, json_request("PUT", payload.clone())).await;
        send(&app, json_request("PUT", payload)).await;

        let (_, body) = send(&app, list_request("u1")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["jobName"], "Engineer");
        assert_eq!(body["data"][0]["company"], "Acme");
    }

    #[tokio::test]
    async fn test_partial_upsert_preserves_unsent_fields() {
        let app = app();
        send(
            &app,
            json_request(
                "PUT",
                json!({
                    "userId": "u1",
                    "jobId": "j1",
                    "job": { "jobName": "Engineer", "company": "Acme", "notes": "referral" }
                }),
            ),
        )
        .await;
        send(
            &app,
            json_request(
                "PUT",
                json!({
                    "userId": "u1",
                    "jobId": "j1",
                    "job": { "notes": "phone screen booked" }
                }),
            ),
        )
        .await;

        let (_, body) = send(&app, list_request("u1")).await;
        assert_eq!(body["data"][0]["company"], "Acme");
        assert_eq!(body["data"][0]["notes"], "phone screen booked");
    }

    #[tokio::test]
    async fn test_delete_removes_only_target() {
        let app = app();
        send(
            &app,
            json_request(
                "PUT",
                json!({ "userId": "u1", "jobId": "j1", "job": { "company": "Acme" } }),
            ),
        )
        .await;
        send(
            &app,
            json_request(
                "PUT",
                json!({ "userId": "u1", "jobId": "j2", "job": { "company": "Globex" } }),
            ),
        )
        .await;

        let (status, _) = send(
            &app,
            json_request("DELETE", json!({ "userId": "u1", "jobId": "j1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, list_request("u1")).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"], "j2");
    }

    #[tokio::test]
    async fn test_delete_without_collection_is_404() {
        let app = app();
        let (status, _) = send(
            &app,
            json_request("DELETE", json!({ "userId": "ghost", "jobId": "j1" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_absent_id_in_existing_collection_is_200() {
        let app = app();
        send(
            &app,
            json_request(
                "PUT",
                json!({ "userId": "u1", "jobId": "j1", "job": { "company": "Acme" } }),
            ),
        )
        .await;

        let (status, _) = send(
            &app,
            json_request("DELETE", json!({ "userId": "u1", "jobId": "missing-id" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, list_request("u1")).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_job_id_is_400() {
        let app = app();
        let (status, body) = send(
            &app,
            json_request("DELETE", json!({ "userId": "u1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Missing userId or jobId");
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let app = app();

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/jobs")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let request = Request::builder()
            .method("GET")
            .uri("/api/v1/job")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
