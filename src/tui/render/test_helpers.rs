use std::sync::Arc;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::api::fake::{FakeBackend, user};
use crate::model::{ClientConfig, Task};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Build an App on the welcome screen talking to `api`.
pub fn app_with(api: FakeBackend) -> (App, Arc<FakeBackend>) {
    let api = Arc::new(api);
    let app = App::new(api.clone(), &ClientConfig::default());
    (app, api)
}

/// Build an App on the dashboard, logged in as "ada", with `tasks` loaded.
pub async fn dashboard_with(tasks: Vec<Task>) -> (App, Arc<FakeBackend>) {
    let (mut app, api) = app_with(FakeBackend::with_tasks(tasks).with_user(user("ada")));
    app.enter_dashboard().await;
    (app, api)
}

/// Render the whole screen at the default test size.
pub fn render_app(app: &mut App) -> String {
    render_to_string(TERM_W, TERM_H, |frame, _area| super::render(frame, app))
}
