use tracing::error;

use crate::api::{ApiError, Backend};
use crate::model::{NewTask, StatusFilter, Task, TaskId, TaskPatch, TaskStatus};

pub const MSG_FETCH_FAILED: &str = "Failed to fetch tasks";
pub const MSG_CREATE_FAILED: &str = "Failed to create task";
pub const MSG_UPDATE_FAILED: &str = "Failed to update task";
pub const MSG_COMPLETE_FAILED: &str = "Failed to complete task";
pub const MSG_DELETE_FAILED: &str = "Failed to delete task";
pub const MSG_TITLE_REQUIRED: &str = "Title is required";

/// The fields an edit stages before saving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEdit {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl StagedEdit {
    pub fn from_task(task: &Task) -> Self {
        StagedEdit {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
        }
    }

    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status),
        }
    }
}

/// Whether a record is being edited. At most one record is edited at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Viewing,
    Editing { id: TaskId, staged: StagedEdit },
}

/// Per-record view of [`EditState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState<'a> {
    Viewing,
    Editing(&'a StagedEdit),
}

/// Result of [`TaskStore::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
    /// The server answered 401; the host should send the user to login
    SessionExpired,
}

/// Proof that the user was asked before deleting. Dropping it declines.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a delete request does nothing until passed to confirm_delete"]
pub struct DeleteRequest {
    id: TaskId,
    title: String,
}

impl DeleteRequest {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Per-status totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed
    }

    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }
}

/// Tasks of `tasks` that pass `filter`, in their original order
pub fn filter(tasks: &[Task], filter: StatusFilter) -> Vec<&Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// The logged-in user's tasks as last confirmed by the server.
///
/// The list is only ever changed after a call succeeds, and only with
/// records the server returned.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    filter: StatusFilter,
    edit: EditState,
    last_error: Option<String>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn filter_value(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    /// The current view, derived on every call
    pub fn filtered(&self) -> Vec<&Task> {
        filter(&self.tasks, self.filter)
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for task in &self.tasks {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }

    /// Message from the most recent failure, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn row_state(&self, id: TaskId) -> RowState<'_> {
        match &self.edit {
            EditState::Editing { id: editing, staged } if *editing == id => {
                RowState::Editing(staged)
            }
            _ => RowState::Viewing,
        }
    }

    pub fn editing_id(&self) -> Option<TaskId> {
        match &self.edit {
            EditState::Editing { id, .. } => Some(*id),
            EditState::Viewing => None,
        }
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Replace the whole list with the server's
    pub async fn load<B: Backend + ?Sized>(&mut self, api: &B) -> LoadOutcome {
        match api.list_tasks().await {
            Ok(tasks) => {
                self.tasks = tasks;
                if let Some(id) = self.editing_id()
                    && self.get(id).is_none()
                {
                    self.edit = EditState::Viewing;
                }
                self.succeed();
                LoadOutcome::Loaded
            }
            Err(err) => {
                let expired = err.is_unauthorized();
                self.fail("fetch tasks", &err, MSG_FETCH_FAILED);
                if expired {
                    LoadOutcome::SessionExpired
                } else {
                    LoadOutcome::Failed
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Create a task and put the server's record at the head of the list.
    /// Nothing is sent when the title is blank.
    pub async fn create<B: Backend + ?Sized>(&mut self, api: &B, mut draft: NewTask) -> bool {
        draft.title = draft.title.trim().to_string();
        if draft.title.is_empty() {
            self.last_error = Some(MSG_TITLE_REQUIRED.to_string());
            return false;
        }
        match api.create_task(&draft).await {
            Ok(created) => {
                self.tasks.insert(0, created);
                self.succeed();
                true
            }
            Err(err) => {
                self.fail("create task", &err, MSG_CREATE_FAILED);
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Edit
    // -----------------------------------------------------------------------

    /// Stage an edit of `id`, replacing any other staged edit
    pub fn begin_edit(&mut self, id: TaskId) -> bool {
        match self.get(id) {
            Some(task) => {
                let staged = StagedEdit::from_task(task);
                self.edit = EditState::Editing { id, staged };
                true
            }
            None => false,
        }
    }

    pub fn staged(&self) -> Option<&StagedEdit> {
        match &self.edit {
            EditState::Editing { staged, .. } => Some(staged),
            EditState::Viewing => None,
        }
    }

    pub fn staged_mut(&mut self) -> Option<&mut StagedEdit> {
        match &mut self.edit {
            EditState::Editing { staged, .. } => Some(staged),
            EditState::Viewing => None,
        }
    }

    /// Drop the staged copy. Sends nothing.
    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Viewing;
    }

    /// Send the staged fields. On failure the stage stays for a retry.
    pub async fn save_edit<B: Backend + ?Sized>(&mut self, api: &B) -> bool {
        let (id, patch) = match &self.edit {
            EditState::Editing { id, staged } => (*id, staged.to_patch()),
            EditState::Viewing => return false,
        };
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            self.last_error = Some(MSG_TITLE_REQUIRED.to_string());
            return false;
        }
        match api.update_task(id, &patch).await {
            Ok(updated) => {
                self.replace(updated);
                self.edit = EditState::Viewing;
                self.succeed();
                true
            }
            Err(err) => {
                self.fail("update task", &err, MSG_UPDATE_FAILED);
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Complete
    // -----------------------------------------------------------------------

    pub async fn mark_complete<B: Backend + ?Sized>(&mut self, api: &B, id: TaskId) -> bool {
        match api.update_task(id, &TaskPatch::complete()).await {
            Ok(updated) => {
                self.replace(updated);
                self.succeed();
                true
            }
            Err(err) => {
                self.fail("complete task", &err, MSG_COMPLETE_FAILED);
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Ask to delete `id`. The request must be confirmed before anything is sent.
    pub fn request_delete(&self, id: TaskId) -> Option<DeleteRequest> {
        self.get(id).map(|task| DeleteRequest {
            id,
            title: task.title.clone(),
        })
    }

    pub async fn confirm_delete<B: Backend + ?Sized>(
        &mut self,
        api: &B,
        request: DeleteRequest,
    ) -> bool {
        let id = request.id;
        match api.delete_task(id).await {
            Ok(()) => {
                self.tasks.retain(|t| t.id != id);
                if self.editing_id() == Some(id) {
                    self.edit = EditState::Viewing;
                }
                self.succeed();
                true
            }
            Err(err) => {
                self.fail("delete task", &err, MSG_DELETE_FAILED);
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Swap in the server's copy of a record, keeping its position
    fn replace(&mut self, updated: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
            *slot = updated;
        }
    }

    fn succeed(&mut self) {
        self.last_error = None;
    }

    fn fail(&mut self, op: &str, err: &ApiError, fallback: &str) {
        error!(error = %err, "{} failed", op);
        self.last_error = Some(err.user_message(fallback));
    }
}
