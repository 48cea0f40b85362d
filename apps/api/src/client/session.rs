#![allow(dead_code)]

//! Client session/state layer.
//!
//! Holds the authenticated identity in an explicit `SessionContext` instead
//! of a process-wide singleton. Consumers attach a listener with
//! [`SessionContext::subscribe`] (init), sign in or up to publish the user,
//! and tear the session down with [`SessionContext::sign_out`]. API access
//! is mediated through [`SessionContext::jobs`], which binds the signed-in
//! uid so call sites never pass identity by hand.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::client::{ClientError, JobsClient};
use crate::models::job::{JobPatch, JobRecord};

/// The authenticated user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

/// Identity provider seam. The production implementation wraps the managed
/// auth service's REST API; tests use a mock.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ClientError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ClientError>;
    async fn sign_out(&self) -> Result<(), ClientError>;
}

/// Explicit session object owning the auth state. Auth-state changes fan
/// out over a watch channel, so every subscriber sees sign-in and sign-out
/// transitions in order.
pub struct SessionContext {
    provider: Arc<dyn IdentityProvider>,
    auth_state: watch::Sender<Option<AuthUser>>,
}

impl SessionContext {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (auth_state, _) = watch::channel(None);
        Self {
            provider,
            auth_state,
        }
    }

    /// Attaches an auth-state listener. The receiver immediately holds the
    /// current state and is notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.auth_state.subscribe()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.auth_state.borrow().clone()
    }

    /// Creates an account and signs the new user in. On provider failure
    /// the session state is left untouched.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, ClientError> {
        let user = self.provider.sign_up(email, password).await?;
        self.auth_state.send_replace(Some(user.clone()));
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ClientError> {
        let user = self.provider.sign_in(email, password).await?;
        self.auth_state.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Tears the session down: signs out at the provider, then clears the
    /// published state.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        self.provider.sign_out().await?;
        self.auth_state.send_replace(None);
        Ok(())
    }

    /// Mediated API access for the signed-in user.
    pub fn jobs(&self, base_url: &str) -> Result<UserJobs, ClientError> {
        let user = self.current_user().ok_or(ClientError::SignedOut)?;
        Ok(UserJobs {
            client: JobsClient::new(base_url),
            uid: user.uid,
        })
    }
}

/// Job endpoint calls bound to one user's uid.
pub struct UserJobs {
    client: JobsClient,
    uid: String,
}

impl UserJobs {
    pub async fn list(&self) -> Result<Vec<JobRecord>, ClientError> {
        self.client.list_jobs(&self.uid).await
    }

    pub async fn upsert(&self, job_id: &str, patch: &JobPatch) -> Result<(), ClientError> {
        self.client.upsert_job(&self.uid, job_id, patch).await
    }

    pub async fn delete(&self, job_id: &str) -> Result<(), ClientError> {
        self.client.delete_job(&self.uid, job_id).await
    }
}
