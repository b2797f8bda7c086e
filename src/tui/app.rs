use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::api::{Backend, HttpClient};
use crate::io::session_io;
use crate::model::{ClientConfig, NewTask, Task, TaskId, TaskStatus, User};
use crate::ops::auth::{self, LoginHandoff, REGISTER_REDIRECT_DELAY};
use crate::ops::{
    DeleteRequest, LoadOutcome, LoginForm, LoginOutcome, RegisterForm, RegisterOutcome, TaskStore,
    session,
};

use super::input;
use super::render;
use super::theme::Theme;

/// Which screen is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Login,
    Register,
    Dashboard,
}

/// Dashboard interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// The create-task popup is open
    Create,
    /// The selected task is being edited in place
    Edit,
    /// Waiting for y/n on a delete
    Confirm,
}

/// A form field that can hold focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Email,
    Password,
    Title,
    Description,
    Deadline,
    Status,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Username => "Username",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::Title => "Title",
            Field::Description => "Description",
            Field::Deadline => "Deadline",
            Field::Status => "Status",
        }
    }
}

const LOGIN_FIELDS: &[Field] = &[Field::Username, Field::Password];
const REGISTER_FIELDS: &[Field] = &[Field::Username, Field::Email, Field::Password];
const CREATE_FIELDS: &[Field] = &[Field::Title, Field::Description, Field::Deadline, Field::Status];
const EDIT_FIELDS: &[Field] = &[Field::Title, Field::Description, Field::Status];

/// Contents of the create-task popup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub title: String,
    pub description: String,
    /// Free text; must be empty or `YYYY-MM-DD` on submit
    pub deadline: String,
    pub status: TaskStatus,
}

impl CreateForm {
    /// Build the create payload, or the message to show for a bad deadline
    pub fn to_draft(&self) -> Result<NewTask, String> {
        let deadline = match self.deadline.trim() {
            "" => None,
            text => Some(
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .map_err(|_| "Deadline must be YYYY-MM-DD".to_string())?,
            ),
        };
        Ok(NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            deadline,
            status: self.status,
        })
    }
}

/// Work the input layer asks for that needs the server
#[derive(Debug)]
pub enum Action {
    SubmitLogin,
    SubmitRegister,
    /// Fetch the user and the task list
    Reload,
    CreateTask,
    SaveEdit,
    Complete(TaskId),
    Delete(DeleteRequest),
    Logout,
}

/// Registration succeeded; move to login once `due` passes
#[derive(Debug, Clone)]
pub struct PendingHandoff {
    pub handoff: LoginHandoff,
    pub due: Instant,
}

/// Main application state
pub struct App {
    pub api: Arc<dyn Backend>,
    pub screen: Screen,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub show_key_hints: bool,
    pub show_help: bool,

    pub user: Option<User>,
    pub store: TaskStore,
    /// Index into the filtered task list
    pub cursor: usize,
    /// First visible task
    pub scroll_offset: usize,

    pub login: LoginForm,
    pub register: RegisterForm,
    pub create: CreateForm,
    pub pending_handoff: Option<PendingHandoff>,
    pub confirm: Option<DeleteRequest>,
    /// Local message for problems caught before any request (bad deadline)
    pub notice: Option<String>,

    /// Focused form field and the byte offset of the text cursor in it
    pub focus: Field,
    pub edit_cursor: usize,

    /// Set when login or logout changed the cookies worth saving
    pub session_changed: bool,
}

impl App {
    pub fn new(api: Arc<dyn Backend>, config: &ClientConfig) -> Self {
        App {
            api,
            screen: Screen::Welcome,
            mode: Mode::Navigate,
            should_quit: false,
            theme: Theme::from_config(&config.ui),
            show_key_hints: config.ui.show_key_hints,
            show_help: false,
            user: None,
            store: TaskStore::new(),
            cursor: 0,
            scroll_offset: 0,
            login: LoginForm::new(),
            register: RegisterForm::new(),
            create: CreateForm::default(),
            pending_handoff: None,
            confirm: None,
            notice: None,
            focus: Field::Username,
            edit_cursor: 0,
            session_changed: false,
        }
    }

    // -----------------------------------------------------------------------
    // Screens
    // -----------------------------------------------------------------------

    pub fn show_login(&mut self, form: LoginForm) {
        let prefilled = !form.username.is_empty();
        self.login = form;
        self.screen = Screen::Login;
        self.mode = Mode::Navigate;
        self.focus_field(if prefilled {
            Field::Password
        } else {
            Field::Username
        });
    }

    pub fn show_register(&mut self) {
        self.register = RegisterForm::new();
        self.pending_handoff = None;
        self.screen = Screen::Register;
        self.focus_field(Field::Username);
    }

    pub fn show_welcome(&mut self) {
        self.screen = Screen::Welcome;
        self.mode = Mode::Navigate;
    }

    /// Called every loop iteration; delivers a due registration handoff
    pub fn tick(&mut self, now: Instant) {
        let due = self.pending_handoff.as_ref().is_some_and(|p| now >= p.due);
        if due && let Some(pending) = self.pending_handoff.take() {
            self.show_login(LoginForm::from_handoff(pending.handoff));
        }
    }

    // -----------------------------------------------------------------------
    // Fields
    // -----------------------------------------------------------------------

    /// Fields of the current form, in tab order
    pub fn fields(&self) -> &'static [Field] {
        match (self.screen, self.mode) {
            (Screen::Login, _) => LOGIN_FIELDS,
            (Screen::Register, _) => REGISTER_FIELDS,
            (Screen::Dashboard, Mode::Create) => CREATE_FIELDS,
            (Screen::Dashboard, Mode::Edit) => EDIT_FIELDS,
            _ => &[],
        }
    }

    /// Text behind a field on the current form. `Status` has none.
    pub fn field_text(&self, field: Field) -> Option<&str> {
        let text = match (self.screen, field) {
            (Screen::Login, Field::Username) => &self.login.username,
            (Screen::Login, Field::Password) => &self.login.password,
            (Screen::Register, Field::Username) => &self.register.username,
            (Screen::Register, Field::Email) => &self.register.email,
            (Screen::Register, Field::Password) => &self.register.password,
            (Screen::Dashboard, _) => return self.task_field_text(field),
            _ => return None,
        };
        Some(text.as_str())
    }

    fn task_field_text(&self, field: Field) -> Option<&str> {
        match self.mode {
            Mode::Create => match field {
                Field::Title => Some(&self.create.title),
                Field::Description => Some(&self.create.description),
                Field::Deadline => Some(&self.create.deadline),
                _ => None,
            },
            Mode::Edit => {
                let staged = self.store.staged()?;
                match field {
                    Field::Title => Some(&staged.title),
                    Field::Description => Some(&staged.description),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn field_text_mut(&mut self, field: Field) -> Option<&mut String> {
        match (self.screen, self.mode, field) {
            (Screen::Login, _, Field::Username) => Some(&mut self.login.username),
            (Screen::Login, _, Field::Password) => Some(&mut self.login.password),
            (Screen::Register, _, Field::Username) => Some(&mut self.register.username),
            (Screen::Register, _, Field::Email) => Some(&mut self.register.email),
            (Screen::Register, _, Field::Password) => Some(&mut self.register.password),
            (Screen::Dashboard, Mode::Create, Field::Title) => Some(&mut self.create.title),
            (Screen::Dashboard, Mode::Create, Field::Description) => {
                Some(&mut self.create.description)
            }
            (Screen::Dashboard, Mode::Create, Field::Deadline) => Some(&mut self.create.deadline),
            (Screen::Dashboard, Mode::Edit, Field::Title) => {
                self.store.staged_mut().map(|s| &mut s.title)
            }
            (Screen::Dashboard, Mode::Edit, Field::Description) => {
                self.store.staged_mut().map(|s| &mut s.description)
            }
            _ => None,
        }
    }

    pub fn cycle_form_status(&mut self) {
        match self.mode {
            Mode::Create => self.create.status = self.create.status.next(),
            Mode::Edit => {
                if let Some(staged) = self.store.staged_mut() {
                    staged.status = staged.status.next();
                }
            }
            _ => {}
        }
    }

    /// Move focus, putting the text cursor at the end of the field
    pub fn focus_field(&mut self, field: Field) {
        self.focus = field;
        self.edit_cursor = self.field_text(field).map_or(0, str::len);
    }

    /// Move focus `delta` fields through the tab order, wrapping
    pub fn step_focus(&mut self, delta: i32) {
        let fields = self.fields();
        if fields.is_empty() {
            return;
        }
        let len = fields.len() as i32;
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as i32;
        self.focus_field(fields[(idx + delta).rem_euclid(len) as usize]);
    }

    // -----------------------------------------------------------------------
    // Dashboard
    // -----------------------------------------------------------------------

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.store.filtered()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.cursor).copied()
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.selected_task().map(|t| t.id)
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.visible_tasks().len();
        self.cursor = if len == 0 { 0 } else { self.cursor.min(len - 1) };
        self.scroll_offset = self.scroll_offset.min(self.cursor);
    }

    /// The message for the status row: local notice first, then the store's
    pub fn error_message(&self) -> Option<&str> {
        self.notice.as_deref().or(self.store.last_error())
    }

    // -----------------------------------------------------------------------
    // Server work
    // -----------------------------------------------------------------------

    /// Run an action from the input layer
    pub async fn perform(&mut self, action: Action) {
        self.notice = None;
        match action {
            Action::SubmitLogin => {
                if let LoginOutcome::LoggedIn(user) = self.login.submit(&*self.api).await {
                    self.user = Some(user);
                    self.session_changed = true;
                    self.enter_dashboard().await;
                }
            }
            Action::SubmitRegister => {
                if let RegisterOutcome::Registered(handoff) =
                    self.register.submit(&*self.api).await
                {
                    self.pending_handoff = Some(PendingHandoff {
                        handoff,
                        due: Instant::now() + REGISTER_REDIRECT_DELAY,
                    });
                }
            }
            Action::Reload => self.enter_dashboard().await,
            Action::CreateTask => match self.create.to_draft() {
                Ok(draft) => {
                    if self.store.create(&*self.api, draft).await {
                        self.create = CreateForm::default();
                        self.mode = Mode::Navigate;
                        self.cursor = 0;
                        self.scroll_offset = 0;
                    }
                }
                Err(message) => self.notice = Some(message),
            },
            Action::SaveEdit => {
                if self.store.save_edit(&*self.api).await {
                    self.mode = Mode::Navigate;
                    self.clamp_cursor();
                }
            }
            Action::Complete(id) => {
                self.store.mark_complete(&*self.api, id).await;
                self.clamp_cursor();
            }
            Action::Delete(request) => {
                self.store.confirm_delete(&*self.api, request).await;
                if self.store.editing_id().is_none() && self.mode == Mode::Edit {
                    self.mode = Mode::Navigate;
                }
                self.clamp_cursor();
            }
            Action::Logout => {
                auth::logout(&*self.api).await;
                info!("logged out");
                self.session_changed = true;
                self.user = None;
                self.store = TaskStore::new();
                self.cursor = 0;
                self.scroll_offset = 0;
                self.login = LoginForm::new();
                self.show_welcome();
            }
        }
    }

    /// Show the dashboard, fetching the user and the list side by side
    pub async fn enter_dashboard(&mut self) {
        self.screen = Screen::Dashboard;
        self.mode = Mode::Navigate;
        let api = &*self.api;
        let (user, outcome) = tokio::join!(session::resolve(api), self.store.load(api));
        self.user = user;
        self.clamp_cursor();
        if outcome == LoadOutcome::SessionExpired {
            warn!("session expired, back to login");
            self.user = None;
            self.show_login(LoginForm::new());
        }
    }
}

/// Where the TUI writes its log by default
pub fn default_log_path() -> PathBuf {
    session_io::state_dir().join("taskmate.log")
}

/// Run the TUI application
pub async fn run(config: &ClientConfig) -> Result<()> {
    let session_path = session_io::session_path();
    let client = session_io::connect(&config.server.base_url, &session_path)
        .with_context(|| format!("bad base URL '{}'", config.server.base_url))?;
    let has_session = !client.jar().is_empty();

    let mut app = App::new(Arc::new(client.clone()), config);
    if has_session {
        app.enter_dashboard().await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, &client, &session_path).await;

    save_session(&client, &session_path);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn save_session(client: &HttpClient, path: &std::path::Path) {
    if let Err(e) = session_io::persist(client, path) {
        warn!(error = %e, "could not save session");
    }
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &HttpClient,
    session_path: &std::path::Path,
) -> Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(action) = input::handle_key(app, key)
        {
            app.perform(action).await;
        }

        if app.session_changed {
            app.session_changed = false;
            save_session(client, session_path);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
