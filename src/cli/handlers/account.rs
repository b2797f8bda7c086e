use std::io::{BufRead, Write};

use anyhow::{Result, bail};

use super::print_json;
use crate::api::Backend;
use crate::cli::commands::{LoginArgs, RegisterArgs};
use crate::cli::output::WhoamiJson;
use crate::model::greeting;
use crate::ops::auth::{self, MSG_LOGIN_FAILED, MSG_LOGIN_OK, MSG_REGISTER_FAILED};
use crate::ops::{LoginForm, LoginOutcome, RegisterForm, RegisterOutcome, session};

/// Environment variable consulted when `--password` is absent
pub const PASSWORD_ENV: &str = "TASKMATE_PASSWORD";

/// `--password`, else `$TASKMATE_PASSWORD`, else one line from `input`
pub fn read_password(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
    input: &mut dyn BufRead,
) -> Result<String> {
    if let Some(password) = explicit.or_else(|| lookup(PASSWORD_ENV)) {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn cmd_login<B: Backend + ?Sized>(
    api: &B,
    args: LoginArgs,
    password: String,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let mut form = LoginForm {
        username: args.username,
        password,
        message: None,
    };
    match form.submit(api).await {
        LoginOutcome::LoggedIn(user) => {
            if json {
                print_json(out, &user)?;
            } else {
                writeln!(out, "{} {}", MSG_LOGIN_OK, greeting(Some(&user)))?;
            }
            Ok(())
        }
        LoginOutcome::Incomplete | LoginOutcome::Rejected => {
            bail!(form.message.unwrap_or_else(|| MSG_LOGIN_FAILED.to_string()))
        }
    }
}

pub async fn cmd_register<B: Backend + ?Sized>(
    api: &B,
    args: RegisterArgs,
    password: String,
    out: &mut dyn Write,
) -> Result<()> {
    let mut form = RegisterForm {
        username: args.username,
        email: args.email,
        password,
        message: None,
    };
    match form.submit(api).await {
        RegisterOutcome::Registered(handoff) => {
            writeln!(out, "{}", handoff.message)?;
            writeln!(out, "Next: tm login {}", handoff.username)?;
            Ok(())
        }
        RegisterOutcome::Rejected => {
            bail!(form.message.unwrap_or_else(|| MSG_REGISTER_FAILED.to_string()))
        }
    }
}

/// The local session is forgotten even when the server call fails
pub async fn cmd_logout<B: Backend + ?Sized>(api: &B, out: &mut dyn Write) -> Result<()> {
    if auth::logout(api).await {
        writeln!(out, "Logged out")?;
    } else {
        writeln!(out, "Logged out locally (server did not confirm)")?;
    }
    Ok(())
}

pub async fn cmd_whoami<B: Backend + ?Sized>(
    api: &B,
    base_url: &str,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let user = session::resolve(api).await;
    if json {
        return print_json(
            out,
            &WhoamiJson {
                base_url,
                user: user.as_ref(),
            },
        );
    }
    match &user {
        Some(u) => writeln!(out, "{} ({})", greeting(Some(u)), u.username)?,
        None => writeln!(out, "anonymous")?,
    }
    Ok(())
}
