//! "Configure" screen: token, repository, and issue filter settings.

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use ghdataset_shared::{
    IssueOrderField, IssueQuery, IssueStateFilter, OrderDirection, ReviewerConfig,
};

use crate::widgets::field_line;

/// Longest accepted minimum-comments input.
const MAX_COUNT_DIGITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Token,
    Owner,
    Repo,
    MinComments,
    State,
    OrderBy,
    Direction,
}

const FIELDS: [Field; 7] = [
    Field::Token,
    Field::Owner,
    Field::Repo,
    Field::MinComments,
    Field::State,
    Field::OrderBy,
    Field::Direction,
];

impl Field {
    fn label(self) -> &'static str {
        match self {
            Self::Token => "GitHub API Token",
            Self::Owner => "Repository Owner",
            Self::Repo => "Repository Name",
            Self::MinComments => "Minimum Comments",
            Self::State => "Issue State",
            Self::OrderBy => "Order By",
            Self::Direction => "Direction",
        }
    }

    fn is_text(self) -> bool {
        matches!(
            self,
            Self::Token | Self::Owner | Self::Repo | Self::MinComments
        )
    }
}

pub(crate) struct ConfigureScreen {
    token: String,
    owner: String,
    repo: String,
    min_comments: String,
    state: IssueStateFilter,
    order_by: IssueOrderField,
    direction: OrderDirection,
    page_size: u32,
    focused: usize,
    editing: bool,
}

impl ConfigureScreen {
    pub(crate) fn new(config: &ReviewerConfig, token: Option<String>) -> Self {
        Self {
            token: token.unwrap_or_default(),
            owner: config.owner.clone(),
            repo: config.name.clone(),
            min_comments: config.min_comments.to_string(),
            state: config.state,
            order_by: config.order_by,
            direction: config.direction,
            page_size: config.page_size,
            focused: 0,
            editing: false,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn token(&self) -> &str {
        self.token.trim()
    }

    /// The query described by the current form values.
    pub(crate) fn query(&self) -> IssueQuery {
        IssueQuery {
            owner: self.owner.trim().to_string(),
            name: self.repo.trim().to_string(),
            min_comments: self.min_comments.parse().unwrap_or(0),
            state: self.state,
            order_by: self.order_by,
            direction: self.direction,
            page_size: self.page_size,
        }
    }

    fn focused_field(&self) -> Field {
        FIELDS[self.focused]
    }

    fn display_value(&self, field: Field) -> String {
        match field {
            Field::Token if self.token.is_empty() => "(not set)".to_string(),
            Field::Token => "•".repeat(self.token.chars().count()),
            Field::Owner => self.owner.clone(),
            Field::Repo => self.repo.clone(),
            Field::MinComments => self.min_comments.clone(),
            Field::State => format!("< {} >", self.state),
            Field::OrderBy => format!("< {} >", self.order_by),
            Field::Direction => format!("< {} >", self.direction),
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(FIELDS.len() as u16 + 2), // Form
                Constraint::Length(2),                       // Hint
                Constraint::Min(0),
            ])
            .split(area);

        let lines: Vec<Line> = FIELDS
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let focused = idx == self.focused;
                field_line(
                    field.label(),
                    self.display_value(*field),
                    focused,
                    focused && self.editing,
                )
            })
            .collect();

        let form = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Configuration "));
        f.render_widget(form, chunks[0]);

        let hint = if self.editing {
            "Type to edit · Enter/Esc to stop editing"
        } else {
            "↑/↓ select field · Enter to edit · ←/→ change option · f to fetch issues"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[1]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode) {
        if self.editing {
            match code {
                KeyCode::Esc | KeyCode::Enter => self.editing = false,
                KeyCode::Backspace => {
                    if let Some(value) = self.text_mut() {
                        value.pop();
                    }
                }
                KeyCode::Char(c) => self.push_char(c),
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Up => self.focused = (self.focused + FIELDS.len() - 1) % FIELDS.len(),
            KeyCode::Down => self.focused = (self.focused + 1) % FIELDS.len(),
            KeyCode::Enter if self.focused_field().is_text() => self.editing = true,
            KeyCode::Enter | KeyCode::Right | KeyCode::Left => self.cycle_option(),
            _ => {}
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focused_field() {
            Field::Token => Some(&mut self.token),
            Field::Owner => Some(&mut self.owner),
            Field::Repo => Some(&mut self.repo),
            Field::MinComments => Some(&mut self.min_comments),
            _ => None,
        }
    }

    fn push_char(&mut self, c: char) {
        if self.focused_field() == Field::MinComments
            && (!c.is_ascii_digit() || self.min_comments.len() >= MAX_COUNT_DIGITS)
        {
            return;
        }
        if let Some(value) = self.text_mut() {
            value.push(c);
        }
    }

    /// Both arrow keys step forward through the options.
    fn cycle_option(&mut self) {
        match self.focused_field() {
            Field::State => self.state = self.state.next(),
            Field::OrderBy => self.order_by = self.order_by.next(),
            Field::Direction => self.direction = self.direction.next(),
            _ => {}
        }
    }
}
