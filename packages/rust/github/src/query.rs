//! GraphQL document and wire types for the repository issues query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ghdataset_shared::{Issue, IssueComment, IssueOrderField, IssueQuery, OrderDirection};

/// Author shown for comments whose account no longer exists.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const MISSING_TITLE: &str = "No Title";
const MISSING_BODY: &str = "No Description";

pub(crate) const ISSUES_QUERY: &str = r#"
query($owner: String!, $name: String!, $cursor: String, $state: [IssueState!], $orderBy: IssueOrderField!, $direction: OrderDirection!, $first: Int!) {
  repository(owner: $owner, name: $name) {
    issues(first: $first, after: $cursor, states: $state, orderBy: {field: $orderBy, direction: $direction}) {
      edges {
        node {
          number
          url
          title
          body
          createdAt
          updatedAt
          comments(first: 100) {
            totalCount
            edges {
              node {
                author {
                  login
                }
                body
                createdAt
              }
            }
          }
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}
"#;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct GraphQlRequest<'a> {
    pub query: &'static str,
    pub variables: &'a IssueVariables<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueVariables<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub cursor: Option<String>,
    pub state: &'static [&'static str],
    pub order_by: IssueOrderField,
    pub direction: OrderDirection,
    pub first: u32,
}

impl<'a> IssueVariables<'a> {
    pub fn first_page(query: &'a IssueQuery) -> Self {
        Self {
            owner: &query.owner,
            name: &query.name,
            cursor: None,
            state: query.state.states(),
            order_by: query.order_by,
            direction: query.direction,
            first: query.page_size,
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse {
    pub data: Option<ResponseData>,
    pub errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlErrorEntry {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseData {
    pub repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryNode {
    pub issues: IssueConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueConnection {
    pub edges: Vec<Edge<IssueNode>>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueNode {
    pub number: u64,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: CommentConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentConnection {
    pub total_count: u32,
    pub edges: Vec<Edge<CommentNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentNode {
    pub author: Option<Actor>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Actor {
    pub login: String,
}

impl From<IssueNode> for Issue {
    fn from(node: IssueNode) -> Self {
        let comments = node
            .comments
            .edges
            .into_iter()
            .map(|edge| IssueComment {
                author: edge
                    .node
                    .author
                    .map(|a| a.login)
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
                body: edge.node.body,
                created_at: edge.node.created_at,
            })
            .collect();

        Issue {
            number: node.number,
            url: node.url,
            title: node.title.unwrap_or_else(|| MISSING_TITLE.to_string()),
            body: node.body.unwrap_or_else(|| MISSING_BODY.to_string()),
            created_at: node.created_at,
            updated_at: node.updated_at,
            comments,
            comment_count: node.comments.total_count,
        }
    }
}
