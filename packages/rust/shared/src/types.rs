//! Core domain types: discussion records for export, issues for review.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// DiscussionRecord
// ---------------------------------------------------------------------------

/// One turn of a discussion conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Speaker role, rendered as a level-3 heading.
    pub role: String,
    /// Raw message text, passed through verbatim.
    pub message: String,
}

/// A single line of the discussions JSONL dataset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscussionRecord {
    /// Unique identifier, used as the Markdown filename stem.
    /// Accepts a JSON string or number.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Grouping key; sanitized into the category directory name.
    pub category: String,
    /// Optional display label.
    #[serde(default, deserialize_with = "deserialize_label")]
    pub subcategory: Option<String>,
    /// Display heading.
    pub title: String,
    /// Optional originating tool name.
    #[serde(rename = "Tool", default, deserialize_with = "deserialize_label")]
    pub tool: Option<String>,
    /// Ordered conversation turns.
    pub content: Vec<ConversationTurn>,
    /// Canonical source link.
    pub url: String,
    pub author: String,
    pub date: String,
}

/// Accept `"abc"` or `42` as an identifier.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

/// Optional labels: `null` and `""` both mean absent.
fn deserialize_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

// ---------------------------------------------------------------------------
// MappingEntry
// ---------------------------------------------------------------------------

/// Provenance for one exported document, stored in `mapping.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub url: String,
    /// Always serialized, as `null` when the record had no tool.
    pub tool: Option<String>,
    pub author: String,
    pub date: String,
}

impl From<&DiscussionRecord> for MappingEntry {
    fn from(record: &DiscussionRecord) -> Self {
        Self {
            url: record.url.clone(),
            tool: record.tool.clone(),
            author: record.author.clone(),
            date: record.date.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Issue review
// ---------------------------------------------------------------------------

/// Which issue states to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStateFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl IssueStateFilter {
    /// Values for the GraphQL `states` argument.
    pub fn states(self) -> &'static [&'static str] {
        match self {
            Self::All => &["OPEN", "CLOSED"],
            Self::Open => &["OPEN"],
            Self::Closed => &["CLOSED"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    /// Cycle to the next option (for selector widgets).
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Open,
            Self::Open => Self::Closed,
            Self::Closed => Self::All,
        }
    }
}

/// Field used to order the issue listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueOrderField {
    #[default]
    UpdatedAt,
    CreatedAt,
    Comments,
}

impl IssueOrderField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpdatedAt => "UPDATED_AT",
            Self::CreatedAt => "CREATED_AT",
            Self::Comments => "COMMENTS",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::UpdatedAt => Self::CreatedAt,
            Self::CreatedAt => Self::Comments,
            Self::Comments => Self::UpdatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderDirection {
    #[default]
    Desc,
    Asc,
}

impl OrderDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Desc => "DESC",
            Self::Asc => "ASC",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Desc => Self::Asc,
            Self::Asc => Self::Desc,
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(IssueStateFilter, IssueOrderField, OrderDirection);

/// Parameters for one issue listing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    /// Repository owner (user or organization login).
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Issues with fewer comments than this are dropped.
    pub min_comments: u32,
    pub state: IssueStateFilter,
    pub order_by: IssueOrderField,
    pub direction: OrderDirection,
    /// Issues requested per page (GitHub caps this at 100).
    pub page_size: u32,
}

/// A comment on an issue, as shown to the reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Author login, or `"Unknown"` for deleted accounts.
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// An issue fetched for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub url: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// First page of comments (up to 100).
    pub comments: Vec<IssueComment>,
    /// Total comment count reported by the API.
    pub comment_count: u32,
}

/// A reviewer's verdict on one issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Yes,
    No,
}
