//! Core TUI application state and event loop.

use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use color_eyre::eyre::{Result, eyre};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::layout::Flex;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};
use url::Url;

use ghdataset_core::review::ReviewLedger;
use ghdataset_github::GithubClient;
use ghdataset_shared::{AppConfig, Decision, resolve_token};

use crate::screens::{Action, ConfigureScreen, ReviewScreen, ScreenId};
use crate::widgets::status_bar;

/// The TUI owns the terminal, so logs go to this file instead.
const LOG_FILE_NAME: &str = "issue-reviewer.log";

/// Library crates log under `ghdataset_*`; this binary logs under its own
/// crate name.
const DEFAULT_LOG_FILTER: &str = concat!("ghdataset=info,", env!("CARGO_CRATE_NAME"), "=info");

/// Send tracing output to [`LOG_FILE_NAME`] in the working directory.
/// Logging is skipped if the file cannot be opened.
pub(crate) fn init_file_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let Ok(file) = File::options().create(true).append(true).open(LOG_FILE_NAME) else {
        return;
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether the status message is an error.
    pub status_is_error: bool,
    /// Whether help overlay is visible.
    pub show_help: bool,
    pub configure: ConfigureScreen,
    pub review: ReviewScreen,
    ledger: ReviewLedger,
    endpoint: Url,
    runtime: Runtime,
}

impl App {
    pub(crate) fn new(config: &AppConfig) -> Result<Self> {
        let ledger = ReviewLedger::from_config(&config.reviewer);
        Self::with_ledger(config, ledger)
    }

    pub(crate) fn with_ledger(config: &AppConfig, ledger: ReviewLedger) -> Result<Self> {
        let selected = ledger.selected_count()?;
        let runtime = Runtime::new().map_err(|e| eyre!("failed to start async runtime: {e}"))?;

        Ok(Self {
            active_tab: 0,
            should_quit: false,
            status: "Ready. Press ? for help".to_string(),
            status_is_error: false,
            show_help: false,
            configure: ConfigureScreen::new(&config.reviewer, resolve_token(&config.reviewer)),
            review: ReviewScreen::new(selected),
            ledger,
            endpoint: config.reviewer.endpoint.clone(),
            runtime,
        })
    }

    fn current_screen(&self) -> ScreenId {
        ScreenId::ALL[self.active_tab]
    }

    fn is_editing(&self) -> bool {
        self.current_screen() == ScreenId::Configure && self.configure.is_editing()
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        self.status_is_error = false;
    }

    fn set_error(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        self.status_is_error = true;
    }

    fn switch_to(&mut self, idx: usize) {
        self.active_tab = idx;
        self.set_status(ScreenId::ALL[idx].to_string());
    }

    /// Handle a key press. Returns the side effect the caller should run.
    pub(crate) fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Action {
        // Global keybindings (always active)
        match code {
            KeyCode::Char('q') | KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return Action::None;
            }
            KeyCode::Char('q') if !self.is_editing() => {
                self.should_quit = true;
                return Action::None;
            }
            KeyCode::Char('?') if !self.is_editing() => {
                self.show_help = !self.show_help;
                return Action::None;
            }
            KeyCode::Esc if self.show_help => {
                self.show_help = false;
                return Action::None;
            }
            _ => {}
        }

        // If help is showing, consume any key to dismiss
        if self.show_help {
            self.show_help = false;
            return Action::None;
        }

        if self.is_editing() {
            self.configure.handle_key(code);
            return Action::None;
        }

        match code {
            KeyCode::Char(c @ '1'..='2') => {
                self.switch_to((c as usize) - ('1' as usize));
                Action::None
            }
            KeyCode::Tab => {
                self.switch_to((self.active_tab + 1) % ScreenId::ALL.len());
                Action::None
            }
            KeyCode::BackTab => {
                let len = ScreenId::ALL.len();
                self.switch_to((self.active_tab + len - 1) % len);
                Action::None
            }
            KeyCode::Char('f') => self.request_fetch(),
            _ => match self.current_screen() {
                ScreenId::Configure => {
                    self.configure.handle_key(code);
                    Action::None
                }
                ScreenId::Review => self.review.handle_key(code),
            },
        }
    }

    /// Validate the form before a fetch is attempted.
    fn request_fetch(&mut self) -> Action {
        if self.configure.token().is_empty() {
            self.set_error("Please enter a valid GitHub API token.");
            return Action::None;
        }
        let query = self.configure.query();
        self.set_status(format!("Fetching issues from {}/{}...", query.owner, query.name));
        Action::Fetch
    }

    /// Fetch issues with the current form values and load the review queue.
    /// Blocks until the fetch completes.
    pub(crate) fn fetch(&mut self) {
        let query = self.configure.query();
        let client = match GithubClient::new(self.configure.token(), self.endpoint.clone()) {
            Ok(client) => client,
            Err(e) => {
                self.set_error(e.to_string());
                return;
            }
        };

        let fetched = match self.runtime.block_on(client.fetch_issues(&query)) {
            Ok(issues) => issues,
            Err(e) => {
                error!(error = %e, "issue fetch failed");
                self.set_error(format!("Fetch failed: {e}"));
                return;
            }
        };

        let reviewed = match self.ledger.reviewed_urls() {
            Ok(reviewed) => reviewed,
            Err(e) => {
                self.set_error(format!("Could not read review ledger: {e}"));
                return;
            }
        };

        let total = fetched.len();
        let queued = self.review.load(fetched, &reviewed);
        info!(total, queued, "issues loaded for review");

        self.active_tab = 1;
        self.set_status(format!("Fetched {total} issues, {queued} not yet reviewed"));
    }

    /// Record a decision for the issue on screen.
    pub(crate) fn decide(&mut self, decision: Decision) {
        match self.review.decide(&self.ledger, decision) {
            Ok(url) => {
                let verdict = match decision {
                    Decision::Yes => "yes",
                    Decision::No => "no",
                };
                info!(%url, verdict, remaining = self.review.session().remaining(), "decision recorded");
                self.set_status(format!("Marked {url} as {verdict}"));
            }
            Err(e) => {
                error!(error = %e, "failed to record decision");
                self.set_error(format!("Could not record decision: {e}"));
                return;
            }
        }

        match self.ledger.selected_count() {
            Ok(count) => self.review.set_selected_count(count),
            Err(e) => warn!(error = %e, "could not count selected issues"),
        }
    }
}

/// Entry point: sets up terminal, runs event loop, restores terminal.
pub(crate) fn run(config: AppConfig) -> Result<()> {
    let mut app = App::new(&config)?;

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key.code, key.modifiers) {
                    Action::Fetch => {
                        // Show the "Fetching" status before blocking.
                        terminal.draw(|f| draw(f, app))?;
                        app.fetch();
                    }
                    Action::Decide(decision) => app.decide(decision),
                    Action::None => {}
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &App) {
    let [tab_area, content_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = ScreenId::ALL
        .iter()
        .map(|s| Line::from(s.to_string()))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" GitHub Issue Reviewer "),
        )
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .divider(" │ ");

    f.render_widget(tabs, tab_area);

    match app.current_screen() {
        ScreenId::Configure => app.configure.draw(f, content_area),
        ScreenId::Review => app.review.draw(f, content_area),
    }

    f.render_widget(status_bar(&app.status, app.status_is_error), status_area);

    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-2          Switch to screen"),
        Line::from("  Tab/S-Tab    Next/previous screen"),
        Line::from("  f            Fetch issues"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Configure:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓          Select field"),
        Line::from("  Enter        Edit field / change option"),
        Line::from("  ←/→          Change option"),
        Line::from(""),
        Line::from("Review:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  y / n        Mark issue yes / no"),
        Line::from("  b            Show/hide issue body"),
        Line::from("  ↑/↓          Scroll"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (press any key to close) ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// A rectangle of the given percentage size, centered in `r`.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(r);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    area
}
