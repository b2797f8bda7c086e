use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned task identifier
pub type TaskId = u64;

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Wire name (`pending`, `in_progress`, `completed`)
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Human label (`pending`, `in progress`, `completed`)
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Title-case label for tabs and the status picker
    pub fn title(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Next status in the edit-form cycle
    pub fn next(self) -> TaskStatus {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}' (expected pending, in_progress or completed)")]
pub struct ParseStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A task record as returned by the server. The client never builds one
/// from user input; identity and timestamps always come from a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Only present when the server chose to persist it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

/// RFC 3339, or a naive timestamp (servers running without time zones)
/// taken as UTC
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(at.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Create payload for `POST tasks/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    /// Sent when set; the backend may ignore it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub status: TaskStatus,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Partial update for `PATCH tasks/{id}/`. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// The restricted patch used by mark-complete
    pub fn complete() -> Self {
        TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

/// Dashboard filter: everything, or one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    /// Filter tabs in display order
    pub const TABS: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(TaskStatus::Pending),
        StatusFilter::Only(TaskStatus::InProgress),
        StatusFilter::Only(TaskStatus::Completed),
    ];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == status,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.title(),
        }
    }

    /// Cycle through `TABS`, wrapping at either end
    pub fn step(self, delta: i32) -> StatusFilter {
        let len = Self::TABS.len() as i32;
        let idx = Self::TABS.iter().position(|f| *f == self).unwrap_or(0) as i32;
        Self::TABS[(idx + delta).rem_euclid(len) as usize]
    }
}

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let s: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(s, TaskStatus::Completed);
    }

    #[test]
    fn status_from_str_accepts_loose_spellings() {
        assert_eq!("in progress".parse(), Ok(TaskStatus::InProgress));
        assert_eq!("In-Progress".parse(), Ok(TaskStatus::InProgress));
        assert_eq!("done".parse(), Ok(TaskStatus::Completed));
        assert!("later".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn task_deserializes_server_record() {
        let json = r#"{"id":42,"title":"Buy milk","status":"pending","created_at":"2024-01-01T00:00:00Z","user":7}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 42);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.deadline, None);
        assert_eq!(task.created_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn task_accepts_fractional_timestamps() {
        let json = r#"{"id":1,"title":"t","description":"d","status":"in_progress","created_at":"2025-03-04T10:11:12.345678Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn task_accepts_naive_timestamps_as_utc() {
        let json = r#"{"id":1,"title":"t","created_at":"2024-01-01T09:30:00.123456"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(
            task.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-01-01 09:30:00"
        );
    }

    #[test]
    fn task_rejects_garbage_timestamp() {
        let json = r#"{"id":1,"title":"t","created_at":"yesterday"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn tabs_use_title_case() {
        assert_eq!(TaskStatus::InProgress.title(), "In Progress");
        assert_eq!(TaskStatus::InProgress.label(), "in progress");
        assert_eq!(
            StatusFilter::Only(TaskStatus::Pending).label(),
            "Pending"
        );
    }

    #[test]
    fn new_task_omits_unset_deadline() {
        let value = serde_json::to_value(NewTask::new("Buy milk")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"title": "Buy milk", "description": "", "status": "pending"})
        );
    }

    #[test]
    fn new_task_sends_deadline_as_date() {
        let draft = NewTask {
            deadline: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..NewTask::new("Ship")
        };
        let value = serde_json::to_value(draft).unwrap();
        assert_eq!(value["deadline"], "2025-06-01");
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let value = serde_json::to_value(TaskPatch::complete()).unwrap();
        assert_eq!(value, serde_json::json!({"status": "completed"}));
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn filter_step_wraps() {
        assert_eq!(
            StatusFilter::All.step(1),
            StatusFilter::Only(TaskStatus::Pending)
        );
        assert_eq!(
            StatusFilter::All.step(-1),
            StatusFilter::Only(TaskStatus::Completed)
        );
        assert_eq!(
            StatusFilter::Only(TaskStatus::Completed).step(1),
            StatusFilter::All
        );
    }

    #[test]
    fn filter_from_str() {
        assert_eq!("All".parse(), Ok(StatusFilter::All));
        assert_eq!(
            "pending".parse(),
            Ok(StatusFilter::Only(TaskStatus::Pending))
        );
    }
}
