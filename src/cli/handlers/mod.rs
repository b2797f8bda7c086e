mod account;
pub use account::{PASSWORD_ENV, cmd_login, cmd_logout, cmd_register, cmd_whoami, read_password};

use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use tracing::warn;

use crate::api::{Backend, parse_base_url};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::{config_io, session_io};
use crate::model::{ClientConfig, NewTask, Task, TaskId};
use crate::ops::task_store::{
    MSG_COMPLETE_FAILED, MSG_CREATE_FAILED, MSG_DELETE_FAILED, MSG_FETCH_FAILED, MSG_UPDATE_FAILED,
};
use crate::ops::{LoadOutcome, TaskStore};

/// Shown when the server answers 401
const NOT_LOGGED_IN: &str = "not logged in (run `tm login <username>`)";

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one subcommand against the configured server, saving whatever
/// cookies it handed out afterwards (even if the command failed).
pub async fn dispatch(command: Commands, json: bool, config: &ClientConfig) -> Result<()> {
    let mut stdout = std::io::stdout();
    let out: &mut dyn Write = &mut stdout;

    if let Commands::Config(args) = command {
        return cmd_config(args, json, config, out);
    }

    let session_path = session_io::session_path();
    let client = session_io::connect(&config.server.base_url, &session_path)
        .with_context(|| format!("bad base URL '{}'", config.server.base_url))?;
    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    let result = match command {
        Commands::Login(mut args) => {
            let password = read_password(args.password.take(), env_var, &mut input)?;
            cmd_login(&client, args, password, json, out).await
        }
        Commands::Register(mut args) => {
            let password = read_password(args.password.take(), env_var, &mut input)?;
            cmd_register(&client, args, password, out).await
        }
        Commands::Logout => cmd_logout(&client, out).await,
        Commands::Whoami => cmd_whoami(&client, client.base_url().as_str(), json, out).await,
        Commands::List(args) => cmd_list(&client, args, json, out).await,
        Commands::Add(args) => cmd_add(&client, args, json, out).await,
        Commands::Edit(args) => cmd_edit(&client, args, json, out).await,
        Commands::Done(args) => cmd_done(&client, args, json, out).await,
        Commands::Delete(args) => cmd_delete(&client, args, json, out, &mut input).await,
        Commands::Config(args) => cmd_config(args, json, config, out),
    };

    if let Err(e) = session_io::persist(&client, &session_path) {
        warn!(error = %e, "could not save session");
    }
    result
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn print_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn print_task(out: &mut dyn Write, task: &Task, json: bool) -> Result<()> {
    if json {
        return print_json(out, task);
    }
    for line in format_task_detail(task) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// The store's message for the failure that just happened
fn store_error(store: &TaskStore, fallback: &str) -> anyhow::Error {
    anyhow!(store.last_error().unwrap_or(fallback).to_string())
}

/// Fetch the list, mapping 401 to a hint to log in
async fn load_store<B: Backend + ?Sized>(api: &B) -> Result<TaskStore> {
    let mut store = TaskStore::new();
    match store.load(api).await {
        LoadOutcome::Loaded => Ok(store),
        LoadOutcome::SessionExpired => bail!(NOT_LOGGED_IN),
        LoadOutcome::Failed => Err(store_error(&store, MSG_FETCH_FAILED)),
    }
}

fn ensure_exists(store: &TaskStore, id: TaskId) -> Result<()> {
    if store.get(id).is_none() {
        bail!("task #{} not found", id);
    }
    Ok(())
}

/// Ask on stderr, read the answer from `input`; only `y`/`yes` confirms
pub fn confirm(prompt: &str, input: &mut dyn BufRead) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

pub async fn cmd_list<B: Backend + ?Sized>(
    api: &B,
    args: ListArgs,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let mut store = load_store(api).await?;
    store.set_filter(args.status);
    let counts = store.counts();
    let tasks = store.filtered();

    if json {
        return print_json(out, &task_list_json(tasks, args.status, counts));
    }
    for line in format_task_list(&tasks, counts) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

pub async fn cmd_add<B: Backend + ?Sized>(
    api: &B,
    args: AddArgs,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let mut draft = NewTask::new(args.title);
    draft.description = args.description.unwrap_or_default();
    draft.deadline = args.deadline;
    if let Some(status) = args.status {
        draft.status = status;
    }

    let mut store = TaskStore::new();
    if !store.create(api, draft).await {
        return Err(store_error(&store, MSG_CREATE_FAILED));
    }
    match store.tasks().first() {
        Some(created) => print_task(out, created, json),
        None => Ok(()),
    }
}

/// Stage the task as the server has it, apply the flags, send all fields
pub async fn cmd_edit<B: Backend + ?Sized>(
    api: &B,
    args: EditArgs,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    if args.title.is_none() && args.description.is_none() && args.status.is_none() {
        bail!("nothing to change (use --title, --description or --status)");
    }
    let mut store = load_store(api).await?;
    if !store.begin_edit(args.id) {
        bail!("task #{} not found", args.id);
    }
    if let Some(staged) = store.staged_mut() {
        if let Some(title) = args.title {
            staged.title = title;
        }
        if let Some(description) = args.description {
            staged.description = description;
        }
        if let Some(status) = args.status {
            staged.status = status;
        }
    }
    if !store.save_edit(api).await {
        return Err(store_error(&store, MSG_UPDATE_FAILED));
    }
    match store.get(args.id) {
        Some(task) => print_task(out, task, json),
        None => Ok(()),
    }
}

pub async fn cmd_done<B: Backend + ?Sized>(
    api: &B,
    args: DoneArgs,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let mut store = load_store(api).await?;
    ensure_exists(&store, args.id)?;
    if !store.mark_complete(api, args.id).await {
        return Err(store_error(&store, MSG_COMPLETE_FAILED));
    }
    match store.get(args.id) {
        Some(task) => print_task(out, task, json),
        None => Ok(()),
    }
}

pub async fn cmd_delete<B: Backend + ?Sized>(
    api: &B,
    args: DeleteArgs,
    json: bool,
    out: &mut dyn Write,
    input: &mut dyn BufRead,
) -> Result<()> {
    let mut store = load_store(api).await?;
    let Some(request) = store.request_delete(args.id) else {
        bail!("task #{} not found", args.id);
    };
    if !args.yes {
        eprintln!("#{} {}", request.id(), request.title());
        if !confirm("Delete this task?", input)? {
            writeln!(out, "cancelled")?;
            return Ok(());
        }
    }
    if !store.confirm_delete(api, request).await {
        return Err(store_error(&store, MSG_DELETE_FAILED));
    }
    if json {
        print_json(out, &serde_json::json!({ "deleted": args.id }))
    } else {
        writeln!(out, "Deleted #{}", args.id)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub fn cmd_config(
    args: ConfigArgs,
    json: bool,
    config: &ClientConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let path = config_io::config_path();
    if args.path {
        writeln!(out, "{}", path.display())?;
        return Ok(());
    }
    if let Some(url) = args.set_base_url {
        let base = parse_base_url(&url).with_context(|| format!("invalid base URL '{}'", url))?;
        config_io::set_base_url(&path, base.as_str())?;
        writeln!(out, "base_url = {} (saved to {})", base, path.display())?;
        return Ok(());
    }
    if json {
        return print_json(out, &config_json(&path, config));
    }
    for line in format_config(&path, config) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
