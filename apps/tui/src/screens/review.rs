//! "Review" screen: one issue at a time with its comments, plus statistics.

use std::collections::HashSet;

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use ghdataset_core::review::{QueueState, ReviewLedger, ReviewSession};
use ghdataset_shared::{Decision, Issue, Result};

use super::Action;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub(crate) struct ReviewScreen {
    session: ReviewSession,
    /// Lines in `selected_urls.txt`, refreshed after each decision.
    selected_count: usize,
    scroll: u16,
    show_body: bool,
}

impl ReviewScreen {
    pub(crate) fn new(selected_count: usize) -> Self {
        Self {
            session: ReviewSession::new(),
            selected_count,
            scroll: 0,
            show_body: false,
        }
    }

    pub(crate) fn session(&self) -> &ReviewSession {
        &self.session
    }

    pub(crate) fn selected_count(&self) -> usize {
        self.selected_count
    }

    pub(crate) fn set_selected_count(&mut self, count: usize) {
        self.selected_count = count;
    }

    /// Replace the queue with freshly fetched issues.
    pub(crate) fn load(&mut self, fetched: Vec<Issue>, reviewed: &HashSet<String>) -> usize {
        self.reset_view();
        self.session.load_queue(fetched, reviewed)
    }

    pub(crate) fn decide(&mut self, ledger: &ReviewLedger, decision: Decision) -> Result<String> {
        let url = self.session.decide(ledger, decision)?;
        self.reset_view();
        Ok(url)
    }

    fn reset_view(&mut self) {
        self.scroll = 0;
        self.show_body = false;
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode) -> Action {
        let reviewing = self.session.current().is_some();
        match code {
            KeyCode::Char('y') if reviewing => Action::Decide(Decision::Yes),
            KeyCode::Char('n') if reviewing => Action::Decide(Decision::No),
            KeyCode::Char('b') => {
                self.show_body = !self.show_body;
                Action::None
            }
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                Action::None
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                Action::None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                Action::None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                Action::None
            }
            _ => Action::None,
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Statistics
                Constraint::Min(1),    // Issue
                Constraint::Length(1), // Hint
            ])
            .split(area);

        let stats = Paragraph::new(format!(
            "Fetched: {}   Remaining: {}   Reviewed this session: {}   Marked 'Yes': {}",
            self.session.total(),
            self.session.remaining(),
            self.session.reviewed_count(),
            self.selected_count,
        ))
        .block(Block::default().borders(Borders::ALL).title(" Statistics "));
        f.render_widget(stats, chunks[0]);

        let body = match self.session.state() {
            QueueState::NotFetched => message("Please configure and fetch issues (press f)."),
            QueueState::Empty => message("No new issues found matching the specified criteria."),
            QueueState::Finished => message("All issues reviewed!"),
            QueueState::Reviewing(issue) => Paragraph::new(issue_lines(issue, self.show_body))
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
        };
        f.render_widget(
            body.block(Block::default().borders(Borders::ALL).title(" Issue ")),
            chunks[1],
        );

        let hint = Paragraph::new("y yes · n no · b show/hide body · ↑/↓ PgUp/PgDn scroll")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[2]);
    }
}

fn message(text: &str) -> Paragraph<'_> {
    Paragraph::new(text).alignment(Alignment::Center)
}

fn issue_lines(issue: &Issue, show_body: bool) -> Vec<Line<'_>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::styled(format!("Issue #{}: {}", issue.number, issue.title), bold),
        Line::raw(format!(
            "Created At: {}",
            issue.created_at.format(TIMESTAMP_FORMAT)
        )),
        Line::raw(format!(
            "Updated At: {}",
            issue.updated_at.format(TIMESTAMP_FORMAT)
        )),
        Line::raw(format!("Comment Count: {}", issue.comment_count)),
        Line::styled(
            issue.url.as_str(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
        ),
        Line::raw(""),
    ];

    if show_body {
        lines.push(Line::styled("Issue Body", bold));
        lines.extend(issue.body.lines().map(Line::raw));
    } else {
        lines.push(Line::styled(
            "Issue body hidden (press b)",
            Style::default().fg(Color::DarkGray),
        ));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Comments:", bold));
    for comment in &issue.comments {
        lines.push(Line::styled(
            format!(
                "{} commented at {}",
                comment.author,
                comment.created_at.format(TIMESTAMP_FORMAT)
            ),
            bold,
        ));
        lines.extend(comment.body.lines().map(Line::raw));
        lines.push(Line::styled("───", Style::default().fg(Color::DarkGray)));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ghdataset_shared::IssueComment;

    fn issue(number: u64) -> Issue {
        let ts = Utc.with_ymd_and_hms(2024, 2, 10, 8, 15, 0).unwrap();
        Issue {
            number,
            url: format!("https://github.com/o/r/issues/{number}"),
            title: "Routing fails".into(),
            body: "line one\nline two".into(),
            created_at: ts,
            updated_at: ts,
            comments: vec![IssueComment {
                author: "Unknown".into(),
                body: "same here".into(),
                created_at: ts,
            }],
            comment_count: 1,
        }
    }

    #[test]
    fn decisions_need_a_current_issue() {
        let mut screen = ReviewScreen::new(0);
        assert_eq!(screen.handle_key(KeyCode::Char('y')), Action::None);

        screen.load(vec![issue(1)], &HashSet::new());
        assert_eq!(
            screen.handle_key(KeyCode::Char('y')),
            Action::Decide(Decision::Yes)
        );
        assert_eq!(
            screen.handle_key(KeyCode::Char('n')),
            Action::Decide(Decision::No)
        );
    }

    #[test]
    fn body_is_hidden_until_toggled() {
        let hidden_issue = issue(1);
        let hidden = issue_lines(&hidden_issue, false);
        assert!(!hidden.iter().any(|l| l.to_string() == "line one"));

        let shown_issue = issue(1);
        let shown = issue_lines(&shown_issue, true);
        assert!(shown.iter().any(|l| l.to_string() == "line one"));
        assert!(shown.iter().any(|l| l.to_string() == "line two"));
    }

    #[test]
    fn issue_lines_show_metadata_and_comments() {
        let text: Vec<String> = issue_lines(&issue(7), false)
            .iter()
            .map(|l| l.to_string())
            .collect();

        assert_eq!(text[0], "Issue #7: Routing fails");
        assert_eq!(text[1], "Created At: 2024-02-10 08:15:00 UTC");
        assert_eq!(text[3], "Comment Count: 1");
        assert!(text.contains(&"Unknown commented at 2024-02-10 08:15:00 UTC".to_string()));
        assert!(text.contains(&"same here".to_string()));
    }

    #[test]
    fn scrolling_saturates_at_top() {
        let mut screen = ReviewScreen::new(0);
        screen.handle_key(KeyCode::Up);
        assert_eq!(screen.scroll, 0);
        screen.handle_key(KeyCode::Down);
        screen.handle_key(KeyCode::Down);
        assert_eq!(screen.scroll, 2);
    }
}
