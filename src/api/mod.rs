//! REST surface of the TaskMate backend.
//!
//! [`Backend`] is the seam the stores and forms talk to. [`HttpClient`] is
//! the real implementation; tests substitute an in-memory fake.

pub mod client;
pub mod cookies;

use async_trait::async_trait;

use crate::model::{Credentials, NewTask, Registration, Task, TaskId, TaskPatch, User};

pub use client::{HttpClient, parse_base_url};
pub use cookies::{CSRF_COOKIE, CSRF_HEADER, CookieJar};

/// Error type for backend calls
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response at all: connection refused, DNS, TLS, ...
    #[error("could not reach server: {0}")]
    Transport(#[source] reqwest::Error),
    /// HTTP 401. Carries the server's `error` text when it sent one.
    #[error("not authenticated{}", fmt_message(.message))]
    Unauthorized { message: Option<String> },
    /// Any other non-success status
    #[error("server returned {status}{}", fmt_message(.message))]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request path '{path}': {reason}")]
    Url { path: String, reason: String },
}

fn fmt_message(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl ApiError {
    /// The message to show a user: the server's own words when it gave
    /// any, otherwise the operation's generic fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized { message: Some(m) }
            | ApiError::Rejected {
                message: Some(m), ..
            } => m.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// The backend operations the client consumes. Every call is a single
/// attempt; nothing retries.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET users/me/`
    async fn current_user(&self) -> Result<User, ApiError>;
    /// `GET tasks/`, in server order
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;
    /// `POST tasks/`
    async fn create_task(&self, draft: &NewTask) -> Result<Task, ApiError>;
    /// `PATCH tasks/{id}/`
    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError>;
    /// `DELETE tasks/{id}/`
    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError>;
    /// `POST auth/login/`; succeeds only when the response names a user
    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError>;
    /// `POST auth/register/`; succeeds only on HTTP 201
    async fn register(&self, registration: &Registration) -> Result<(), ApiError>;
    /// `POST auth/logout/`
    async fn logout(&self) -> Result<(), ApiError>;
}

#[cfg(test)]
pub(crate) mod fake;
