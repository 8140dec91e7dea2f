//! GitHub GraphQL client for listing repository issues.
//!
//! Used by the issue reviewer to pull candidate issues (with their first page
//! of comments) for manual triage into the dataset.

mod query;

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};
use url::Url;

use ghdataset_shared::{DatasetError, Issue, IssueQuery, Result};

use query::{GraphQlRequest, GraphQlResponse, ISSUES_QUERY, IssueConnection, IssueVariables};

pub use query::UNKNOWN_AUTHOR;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for API requests. GitHub rejects requests without one.
const USER_AGENT: &str = concat!("ghdataset/", env!("CARGO_PKG_VERSION"));

static OWNER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,38})$").expect("valid owner regex")
});

static REPO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]{1,100}$").expect("valid repo regex"));

// ---------------------------------------------------------------------------
// GithubClient
// ---------------------------------------------------------------------------

/// Authenticated client for the GitHub GraphQL API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    endpoint: Url,
    token: String,
}

impl GithubClient {
    /// Build a client that authenticates with `token` against `endpoint`.
    pub fn new(token: impl Into<String>, endpoint: Url) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DatasetError::validation("a GitHub API token is required"));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| DatasetError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch every issue matching `query`, following pagination to the end.
    ///
    /// Issues with fewer than `query.min_comments` comments are dropped. Any
    /// failed page aborts the whole fetch.
    #[instrument(skip_all, fields(owner = %query.owner, repo = %query.name))]
    pub async fn fetch_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
        validate_repository(&query.owner, &query.name)?;

        let mut variables = IssueVariables::first_page(query);
        let mut issues = Vec::new();
        let mut pages = 0usize;

        loop {
            let connection = self.fetch_page(&variables).await?;
            pages += 1;

            let page_len = connection.edges.len();
            issues.extend(
                connection
                    .edges
                    .into_iter()
                    .map(|edge| edge.node)
                    .filter(|node| node.comments.total_count >= query.min_comments)
                    .map(Issue::from),
            );
            debug!(page = pages, received = page_len, kept = issues.len(), "fetched issue page");

            let page_info = connection.page_info;
            if !page_info.has_next_page {
                break;
            }
            match page_info.end_cursor {
                Some(cursor) => variables.cursor = Some(cursor),
                None => {
                    warn!("hasNextPage without endCursor, stopping pagination");
                    break;
                }
            }
        }

        info!(pages, issues = issues.len(), "issue fetch complete");
        Ok(issues)
    }

    async fn fetch_page(&self, variables: &IssueVariables<'_>) -> Result<IssueConnection> {
        let request = GraphQlRequest {
            query: ISSUES_QUERY,
            variables,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("bearer {}", self.token))
            .json(&request)
            .send()
            .await
            .map_err(|e| DatasetError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DatasetError::Network(format!(
                "query failed with status code {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DatasetError::Network(format!("failed to read response body: {e}")))?;
        let parsed: GraphQlResponse = serde_json::from_str(&body)
            .map_err(|e| DatasetError::parse(format!("invalid GraphQL response: {e}")))?;

        if let Some(errors) = parsed.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(DatasetError::GraphQl(messages.join("; ")));
        }

        parsed
            .data
            .ok_or_else(|| DatasetError::GraphQl("response contained no data".into()))?
            .repository
            .map(|repo| repo.issues)
            .ok_or_else(|| DatasetError::GraphQl("repository not found".into()))
    }
}

/// Reject owner/repository names GitHub would never accept.
pub fn validate_repository(owner: &str, name: &str) -> Result<()> {
    if !OWNER_RE.is_match(owner) {
        return Err(DatasetError::validation(format!(
            "invalid repository owner: {owner:?}"
        )));
    }
    if !REPO_RE.is_match(name) || name == "." || name == ".." {
        return Err(DatasetError::validation(format!(
            "invalid repository name: {name:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghdataset_shared::{IssueOrderField, IssueStateFilter, OrderDirection};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("../../../fixtures/graphql/{name}"))
            .expect("read graphql fixture")
    }

    fn query(min_comments: u32) -> IssueQuery {
        IssueQuery {
            owner: "The-OpenROAD-Project".into(),
            name: "OpenROAD".into(),
            min_comments,
            state: IssueStateFilter::All,
            order_by: IssueOrderField::UpdatedAt,
            direction: OrderDirection::Desc,
            page_size: 100,
        }
    }

    fn client(server: &MockServer) -> GithubClient {
        let endpoint = Url::parse(&format!("{}/graphql", server.uri())).unwrap();
        GithubClient::new("test-token", endpoint).unwrap()
    }

    #[test]
    fn test_validate_repository() {
        assert!(validate_repository("The-OpenROAD-Project", "OpenROAD").is_ok());
        assert!(validate_repository("octo", "repo.rs_v2").is_ok());
        assert!(validate_repository("-octo", "repo").is_err());
        assert!(validate_repository("octo cat", "repo").is_err());
        assert!(validate_repository("octo", "").is_err());
        assert!(validate_repository("octo", "..").is_err());
        assert!(validate_repository("octo", "a/b").is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        let endpoint = Url::parse(ghdataset_shared::DEFAULT_GRAPHQL_ENDPOINT).unwrap();
        let err = GithubClient::new("  ", endpoint).unwrap_err();
        assert!(matches!(err, DatasetError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_fetch_follows_pagination_and_filters() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "variables": { "cursor": null, "state": ["OPEN", "CLOSED"], "orderBy": "UPDATED_AT" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("issues_page1.json")))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(serde_json::json!({
                "variables": { "cursor": "Y3Vyc29yOnYyOjE=" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("issues_page2.json")))
            .expect(1)
            .mount(&server)
            .await;

        let issues = client(&server).fetch_issues(&query(2)).await.unwrap();

        let numbers: Vec<u64> = issues.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1201, 1190]);

        let first = &issues[0];
        assert_eq!(first.comment_count, 3);
        assert_eq!(first.comments.len(), 3);
        assert_eq!(first.comments[0].author, "maliberty");
        assert_eq!(first.comments[1].author, UNKNOWN_AUTHOR);
    }

    #[tokio::test]
    async fn test_min_comments_zero_keeps_everything() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "variables": { "cursor": null } })))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("issues_page1.json")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "variables": { "cursor": "Y3Vyc29yOnYyOjE=" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("issues_page2.json")))
            .mount(&server)
            .await;

        let issues = client(&server).fetch_issues(&query(0)).await.unwrap();
        assert_eq!(issues.len(), 3);
    }

    #[tokio::test]
    async fn test_graphql_errors_abort_fetch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("errors.json")))
            .mount(&server)
            .await;

        let err = client(&server).fetch_issues(&query(0)).await.unwrap_err();
        match err {
            DatasetError::GraphQl(message) => {
                assert!(message.contains("Could not resolve to a Repository"));
            }
            other => panic!("expected GraphQl error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_repository_is_graphql_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "data": { "repository": null } })),
            )
            .mount(&server)
            .await;

        let err = client(&server).fetch_issues(&query(0)).await.unwrap_err();
        assert!(matches!(err, DatasetError::GraphQl(_)));
    }

    #[tokio::test]
    async fn test_non_200_is_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = client(&server).fetch_issues(&query(0)).await.unwrap_err();
        match err {
            DatasetError::Network(message) => assert!(message.contains("401")),
            other => panic!("expected Network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_owner_sends_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut q = query(0);
        q.owner = "not a login".into();
        let err = client(&server).fetch_issues(&q).await.unwrap_err();
        assert!(matches!(err, DatasetError::Validation { .. }));
    }
}
