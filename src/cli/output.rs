use std::path::Path;

use serde::Serialize;

use crate::model::{ClientConfig, StatusFilter, Task, User};
use crate::ops::task_store::StatusCounts;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    pub filter: String,
    pub total: usize,
    pub counts: CountsJson,
    pub tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct CountsJson {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

#[derive(Serialize)]
pub struct WhoamiJson<'a> {
    pub base_url: &'a str,
    pub user: Option<&'a User>,
}

#[derive(Serialize)]
pub struct ConfigJson<'a> {
    pub path: String,
    #[serde(flatten)]
    pub config: &'a ClientConfig,
}

pub fn counts_to_json(counts: StatusCounts) -> CountsJson {
    CountsJson {
        pending: counts.pending,
        in_progress: counts.in_progress,
        completed: counts.completed,
    }
}

pub fn task_list_json<'a>(
    tasks: Vec<&'a Task>,
    filter: StatusFilter,
    counts: StatusCounts,
) -> TaskListJson<'a> {
    TaskListJson {
        filter: match filter {
            StatusFilter::All => "all".to_string(),
            StatusFilter::Only(status) => status.as_str().to_string(),
        },
        total: counts.total(),
        counts: counts_to_json(counts),
        tasks,
    }
}

pub fn config_json<'a>(path: &Path, config: &'a ClientConfig) -> ConfigJson<'a> {
    ConfigJson {
        path: path.display().to_string(),
        config,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let due = task
        .deadline
        .map(|d| format!(" (due {})", d))
        .unwrap_or_default();
    format!(
        "#{:<4} {:<11} {}{}",
        task.id,
        task.status.as_str(),
        task.title,
        due
    )
}

/// Format detailed task view
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![
        format!("#{} {}", task.id, task.title),
        format!("status:   {}", task.status.label()),
        format!("created:  {}", task.created_at.format("%Y-%m-%d %H:%M UTC")),
    ];
    if let Some(deadline) = task.deadline {
        lines.push(format!("deadline: {}", deadline));
    }
    if !task.description.trim().is_empty() {
        lines.push(String::new());
        lines.extend(task.description.lines().map(String::from));
    }
    lines
}

/// The list view: one line per task, then a total
pub fn format_task_list(tasks: &[&Task], counts: StatusCounts) -> Vec<String> {
    if tasks.is_empty() {
        let mut lines = vec!["(no tasks)".to_string()];
        if counts.total() > 0 {
            lines.push(format!("Total: {}", counts.total()));
        }
        return lines;
    }
    let mut lines: Vec<String> = tasks.iter().map(|t| format_task_line(t)).collect();
    lines.push(String::new());
    lines.push(format!(
        "Total: {} ({} pending, {} in progress, {} completed)",
        counts.total(),
        counts.pending,
        counts.in_progress,
        counts.completed
    ));
    lines
}

pub fn format_config(path: &Path, config: &ClientConfig) -> Vec<String> {
    vec![
        format!("config:   {}", path.display()),
        format!("base_url: {}", config.server.base_url),
        format!(
            "log:      {}",
            config.log.filter.as_deref().unwrap_or("(default)")
        ),
    ]
}
