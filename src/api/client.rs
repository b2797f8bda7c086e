use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::cookies::{CSRF_HEADER, CookieJar};
use super::{ApiError, Backend};
use crate::model::{Credentials, NewTask, Registration, Task, TaskId, TaskPatch, User};

/// reqwest-backed [`Backend`] bound to one base URL and one cookie jar
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
    jar: Arc<CookieJar>,
}

/// Body of a successful `auth/login/`
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_jar(base_url, Arc::new(CookieJar::new()))
    }

    /// Build a client that shares (and keeps filling) an existing jar
    pub fn with_jar(base_url: &str, jar: Arc<CookieJar>) -> Result<Self, ApiError> {
        let base = parse_base_url(base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(HttpClient { http, base, jar })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn jar(&self) -> &Arc<CookieJar> {
        &self.jar
    }

    /// Resolve a relative API path (`tasks/42/`) against the base URL
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base.join(path).map_err(|e| ApiError::Url {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Start a request carrying the session cookies, plus the CSRF token
    /// when the method changes server state.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        debug!(method = %method, url = %url, "request");

        let mut builder = self.http.request(method.clone(), url);
        if let Some(cookies) = self.jar.header_value() {
            builder = builder.header(COOKIE, cookies);
        }
        if is_state_changing(&method)
            && let Some(token) = self.jar.csrf_token()
        {
            builder = builder.header(CSRF_HEADER, token);
        }
        Ok(builder)
    }

    /// Send once, absorb cookies, and turn non-success statuses into errors
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(ApiError::Transport)?;
        self.jar.absorb(response.cookies());

        let status = response.status();
        debug!(status = status.as_u16(), "response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::Unauthorized { message })
        } else {
            Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        let body = response.text().await.map_err(ApiError::Transport)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Parse a configured base URL. The result always ends in `/`, otherwise
/// `Url::join` would drop its last segment.
pub fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Url::parse(&normalized).map_err(|e| ApiError::Url {
        path: base_url.to_string(),
        reason: e.to_string(),
    })
}

fn is_state_changing(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

/// Pull a human-readable message out of an error body: the backend's own
/// `error` field, or DRF's `detail`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(String::from)
}

fn task_path(id: TaskId) -> String {
    format!("tasks/{}/", id)
}

#[async_trait]
impl Backend for HttpClient {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.send_json(self.request(Method::GET, "users/me/")?).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.send_json(self.request(Method::GET, "tasks/")?).await
    }

    async fn create_task(&self, draft: &NewTask) -> Result<Task, ApiError> {
        let builder = self.request(Method::POST, "tasks/")?.json(draft);
        self.send_json(builder).await
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        let builder = self.request(Method::PATCH, &task_path(id))?.json(patch);
        self.send_json(builder).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &task_path(id))?)
            .await
            .map(drop)
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let builder = self.request(Method::POST, "auth/login/")?.json(credentials);
        let response = self.send(builder).await?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(ApiError::Transport)?;
        let parsed: LoginResponse = serde_json::from_str(&body)?;
        parsed.user.ok_or(ApiError::Rejected {
            status,
            message: parsed.error,
        })
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "auth/register/")?
            .json(registration);
        let response = self.send(builder).await?;
        let status = response.status();
        if status == StatusCode::CREATED {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    /// The local jar is emptied whether or not the server call succeeds
    async fn logout(&self) -> Result<(), ApiError> {
        let result = match self.request(Method::POST, "auth/logout/") {
            Ok(builder) => self.send(builder).await.map(drop),
            Err(e) => Err(e),
        };
        self.jar.clear();
        result
    }
}
