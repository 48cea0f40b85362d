#![allow(dead_code)]

//! Jobs API client — typed access to the tracker endpoints for the
//! client/session layer. The session side of the house lives in
//! [`session`]; nothing here touches the store directly.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::jobs::handlers::ListJobsResponse;
use crate::models::job::{JobPatch, JobRecord};

pub mod session;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("No signed-in user")]
    SignedOut,
}

/// Thin typed client for the three job endpoints. Holds no identity; the
/// session layer decides which `user_id` to pass.
pub struct JobsClient {
    http: Client,
    base_url: String,
}

impl JobsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_jobs(&self, user_id: &str) -> Result<Vec<JobRecord>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/v1/jobs", self.base_url))
            .query(&[("userId", user_id)])
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<ListJobsResponse>().await?.data)
    }

    pub async fn upsert_job(
        &self,
        user_id: &str,
        job_id: &str,
        patch: &JobPatch,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .put(format!("{}/api/v1/job", self.base_url))
            .json(&serde_json::json!({
                "userId": user_id,
                "jobId": job_id,
                "job": patch,
            }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn delete_job(&self, user_id: &str, job_id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(format!("{}/api/v1/job", self.base_url))
            .json(&serde_json::json!({
                "userId": user_id,
                "jobId": job_id,
            }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorEnvelope>()
        .await
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| status.to_string());

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
