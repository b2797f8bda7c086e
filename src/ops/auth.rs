use std::time::Duration;

use tracing::{error, info, warn};

use crate::api::Backend;
use crate::model::{Credentials, Registration, User};

/// How long the registration success banner shows before moving to login
pub const REGISTER_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

pub const MSG_LOGIN_INCOMPLETE: &str = "Please enter both username and password";
pub const MSG_LOGIN_OK: &str = "Login successful!";
pub const MSG_LOGIN_FAILED: &str = "Login failed";
pub const MSG_REGISTER_OK: &str = "Registration successful! Please log in.";
pub const MSG_REGISTER_HANDOFF: &str =
    "Registration successful! Please log in with your credentials.";
pub const MSG_REGISTER_FAILED: &str = "Registration failed";

/// What registration passes to the login screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginHandoff {
    pub username: String,
    pub message: String,
}

/// How a form banner should be styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerTone {
    Success,
    Error,
}

pub fn banner_tone(message: &str) -> BannerTone {
    if message.contains("successful") {
        BannerTone::Success
    } else {
        BannerTone::Error
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn(User),
    /// A field was empty; nothing was sent
    Incomplete,
    Rejected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub message: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill from a registration that just succeeded
    pub fn from_handoff(handoff: LoginHandoff) -> Self {
        LoginForm {
            username: handoff.username,
            password: String::new(),
            message: Some(handoff.message),
        }
    }

    pub async fn submit<B: Backend + ?Sized>(&mut self, api: &B) -> LoginOutcome {
        if self.username.is_empty() || self.password.is_empty() {
            self.message = Some(MSG_LOGIN_INCOMPLETE.to_string());
            return LoginOutcome::Incomplete;
        }

        let credentials = Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        };
        match api.login(&credentials).await {
            Ok(user) => {
                info!(username = %user.username, "logged in");
                self.message = Some(MSG_LOGIN_OK.to_string());
                LoginOutcome::LoggedIn(user)
            }
            Err(err) => {
                error!(error = %err, "login failed");
                self.message = Some(err.user_message(MSG_LOGIN_FAILED));
                LoginOutcome::Rejected
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Deliver the handoff to the login screen after [`REGISTER_REDIRECT_DELAY`]
    Registered(LoginHandoff),
    Rejected,
}

/// Registration form. Validation is entirely the server's business.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub message: Option<String>,
}

impl RegisterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit<B: Backend + ?Sized>(&mut self, api: &B) -> RegisterOutcome {
        let registration = Registration {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        };
        match api.register(&registration).await {
            Ok(()) => {
                info!(username = %self.username, "registered");
                self.message = Some(MSG_REGISTER_OK.to_string());
                RegisterOutcome::Registered(LoginHandoff {
                    username: self.username.clone(),
                    message: MSG_REGISTER_HANDOFF.to_string(),
                })
            }
            Err(err) => {
                error!(error = %err, "registration failed");
                self.message = Some(err.user_message(MSG_REGISTER_FAILED));
                RegisterOutcome::Rejected
            }
        }
    }
}

/// End the server session. Failure is logged; the caller forgets the
/// local session either way.
pub async fn logout<B: Backend + ?Sized>(api: &B) -> bool {
    match api.logout().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "logout failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::api::fake::{Call, FakeBackend, PASSWORD, user};
    use pretty_assertions::assert_eq;

    fn filled_login(username: &str, password: &str) -> LoginForm {
        LoginForm {
            username: username.into(),
            password: password.into(),
            message: None,
        }
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let api = FakeBackend::new();
        let mut form = filled_login("ada", "");
        assert_eq!(form.submit(&api).await, LoginOutcome::Incomplete);
        assert_eq!(form.message.as_deref(), Some(MSG_LOGIN_INCOMPLETE));

        let mut form = filled_login("", PASSWORD);
        assert_eq!(form.submit(&api).await, LoginOutcome::Incomplete);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn login_success() {
        let api = FakeBackend::new().with_user(user("ada"));
        let mut form = filled_login("ada", PASSWORD);
        assert_eq!(form.submit(&api).await, LoginOutcome::LoggedIn(user("ada")));
        assert_eq!(form.message.as_deref(), Some(MSG_LOGIN_OK));
    }

    #[tokio::test]
    async fn login_shows_server_error() {
        let api = FakeBackend::new().with_user(user("ada"));
        let mut form = filled_login("ada", "wrong");
        assert_eq!(form.submit(&api).await, LoginOutcome::Rejected);
        assert_eq!(
            form.message.as_deref(),
            Some("Invalid credentials - please check your username and password")
        );
    }

    #[tokio::test]
    async fn login_falls_back_to_generic_message() {
        let api = FakeBackend::new();
        api.fail_next(ApiError::Rejected {
            status: 500,
            message: None,
        });
        let mut form = filled_login("ada", PASSWORD);
        assert_eq!(form.submit(&api).await, LoginOutcome::Rejected);
        assert_eq!(form.message.as_deref(), Some(MSG_LOGIN_FAILED));
    }

    #[tokio::test]
    async fn register_success_hands_off_to_login() {
        let api = FakeBackend::new();
        let mut form = RegisterForm {
            username: "grace".into(),
            email: "grace@example.com".into(),
            password: "pw".into(),
            message: None,
        };
        let outcome = form.submit(&api).await;
        assert_eq!(form.message.as_deref(), Some(MSG_REGISTER_OK));

        let RegisterOutcome::Registered(handoff) = outcome else {
            panic!("expected registration to succeed");
        };
        let login = LoginForm::from_handoff(handoff);
        assert_eq!(login.username, "grace");
        assert_eq!(login.password, "");
        assert_eq!(login.message.as_deref(), Some(MSG_REGISTER_HANDOFF));
        assert_eq!(
            api.calls(),
            vec![Call::Register(Registration {
                username: "grace".into(),
                email: "grace@example.com".into(),
                password: "pw".into(),
            })]
        );
    }

    #[tokio::test]
    async fn register_rejection_shows_server_error() {
        let api = FakeBackend::new().with_user(user("grace"));
        let mut form = RegisterForm {
            username: "grace".into(),
            ..Default::default()
        };
        assert_eq!(form.submit(&api).await, RegisterOutcome::Rejected);
        assert_eq!(form.message.as_deref(), Some("Username already exists"));
    }

    #[tokio::test]
    async fn register_sends_even_when_empty() {
        let api = FakeBackend::new();
        let mut form = RegisterForm::new();
        form.submit(&api).await;
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn logout_reports_failure_without_error() {
        let api = FakeBackend::new();
        assert!(logout(&api).await);
        api.fail_next(ApiError::Rejected {
            status: 500,
            message: None,
        });
        assert!(!logout(&api).await);
    }

    #[test]
    fn banner_tone_keys_on_success_word() {
        assert_eq!(banner_tone(MSG_LOGIN_OK), BannerTone::Success);
        assert_eq!(banner_tone(MSG_REGISTER_HANDOFF), BannerTone::Success);
        assert_eq!(banner_tone(MSG_LOGIN_FAILED), BannerTone::Error);
    }
}
