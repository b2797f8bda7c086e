use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::model::{StatusFilter, TaskId, TaskStatus};

#[derive(Parser)]
#[command(name = "tm", about = concat!("taskmate v", env!("CARGO_PKG_VERSION"), " - your tasks, from the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// API base URL (overrides config and $TASKMATE_BASE_URL)
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Log target: off|0, stdout|1, stderr|2, or a file path
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and save the session
    Login(LoginArgs),
    /// Create an account
    Register(RegisterArgs),
    /// End the session and forget it locally
    Logout,
    /// Show who the saved session belongs to
    Whoami,
    /// List tasks
    List(ListArgs),
    /// Create a task
    Add(AddArgs),
    /// Change a task's title, description or status
    Edit(EditArgs),
    /// Mark a task completed
    Done(DoneArgs),
    /// Permanently delete a task
    Delete(DeleteArgs),
    /// Show the effective config, or change the base URL
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct LoginArgs {
    pub username: String,
    /// Password (default: $TASKMATE_PASSWORD, else prompt)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct RegisterArgs {
    pub username: String,
    pub email: String,
    /// Password (default: $TASKMATE_PASSWORD, else prompt)
    #[arg(long)]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Only tasks with this status (all, pending, in_progress, completed)
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: Option<NaiveDate>,
    /// Initial status (default: pending)
    #[arg(long)]
    pub status: Option<TaskStatus>,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: TaskId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
}

#[derive(Args)]
pub struct DoneArgs {
    pub id: TaskId,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: TaskId,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigArgs {
    /// Save this base URL to the config file
    #[arg(long = "set-base-url")]
    pub set_base_url: Option<String>,
    /// Print the config file path and exit
    #[arg(long)]
    pub path: bool,
}
