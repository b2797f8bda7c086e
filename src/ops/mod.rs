pub mod auth;
pub mod session;
pub mod task_store;

pub use auth::{LoginForm, LoginHandoff, LoginOutcome, RegisterForm, RegisterOutcome};
pub use task_store::{DeleteRequest, EditState, LoadOutcome, RowState, StagedEdit, TaskStore};
