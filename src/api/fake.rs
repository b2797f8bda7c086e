//! In-memory backend for tests. Behaves like the real server closely
//! enough for the stores and forms, and records every call it receives.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use super::{ApiError, Backend};
use crate::model::{
    Credentials, NewTask, Registration, Task, TaskId, TaskPatch, TaskStatus, User,
};

/// A call the fake received, with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CurrentUser,
    ListTasks,
    Create(NewTask),
    Update(TaskId, TaskPatch),
    Delete(TaskId),
    Login(Credentials),
    Register(Registration),
    Logout,
}

pub const PASSWORD: &str = "secret";

#[derive(Default)]
struct FakeState {
    tasks: Vec<Task>,
    user: Option<User>,
    usernames: Vec<String>,
    next_id: TaskId,
    calls: Vec<Call>,
    fail_next: Option<ApiError>,
    expired: bool,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn task(id: TaskId, title: &str, status: TaskStatus) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: String::new(),
        status,
        created_at: timestamp(),
        deadline: None,
    }
}

pub fn user(username: &str) -> User {
    User {
        id: 1,
        username: username.to_string(),
        first_name: None,
        email: None,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake whose server already holds `tasks`; new ids start above them
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        FakeBackend {
            state: Mutex::new(FakeState {
                tasks,
                next_id,
                ..Default::default()
            }),
        }
    }

    pub fn with_user(self, user: User) -> Self {
        {
            let mut state = self.lock();
            state.usernames.push(user.username.clone());
            state.user = Some(user);
        }
        self
    }

    pub fn set_next_id(&self, id: TaskId) {
        self.lock().next_id = id;
    }

    /// Make the next call, whatever it is, fail with `err`
    pub fn fail_next(&self, err: ApiError) {
        self.lock().fail_next = Some(err);
    }

    /// From now on every call answers 401, as after a server-side logout
    pub fn expire_session(&self) {
        let mut state = self.lock();
        state.expired = true;
        state.user = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn server_tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and pop any queued failure
    fn enter(&self, call: Call) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.lock();
        let needs_session = !matches!(call, Call::Login(_) | Call::Register(_) | Call::Logout);
        state.calls.push(call);
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        if state.expired && needs_session {
            return Err(ApiError::Unauthorized { message: None });
        }
        Ok(state)
    }
}

fn not_found() -> ApiError {
    ApiError::Rejected {
        status: 404,
        message: None,
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn current_user(&self) -> Result<User, ApiError> {
        let state = self.enter(Call::CurrentUser)?;
        state
            .user
            .clone()
            .ok_or(ApiError::Unauthorized { message: None })
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let state = self.enter(Call::ListTasks)?;
        Ok(state.tasks.clone())
    }

    async fn create_task(&self, draft: &NewTask) -> Result<Task, ApiError> {
        let mut state = self.enter(Call::Create(draft.clone()))?;
        let id = state.next_id;
        state.next_id += 1;
        let created = Task {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status,
            created_at: timestamp(),
            // like the real backend, the fake does not persist deadlines
            deadline: None,
        };
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        let mut state = self.enter(Call::Update(id, patch.clone()))?;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(not_found)?;
        if let Some(title) = &patch.title {
            // server-side normalization, so tests can tell whose copy won
            task.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            task.description = description.clone();
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        let mut state = self.enter(Call::Delete(id))?;
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let mut state = self.enter(Call::Login(credentials.clone()))?;
        if credentials.password != PASSWORD
            || !state.usernames.contains(&credentials.username)
        {
            return Err(ApiError::Unauthorized {
                message: Some(
                    "Invalid credentials - please check your username and password".into(),
                ),
            });
        }
        let logged_in = user(&credentials.username);
        state.user = Some(logged_in.clone());
        Ok(logged_in)
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let mut state = self.enter(Call::Register(registration.clone()))?;
        if state.usernames.contains(&registration.username) {
            return Err(ApiError::Rejected {
                status: 400,
                message: Some("Username already exists".into()),
            });
        }
        state.usernames.push(registration.username.clone());
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let mut state = self.enter(Call::Logout)?;
        state.user = None;
        Ok(())
    }
}
