//! Application configuration for the dataset toolkit.
//!
//! User config lives at `~/.ghdataset/ghdataset.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DatasetError, Result};
use crate::types::{IssueOrderField, IssueQuery, IssueStateFilter, OrderDirection};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "ghdataset.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".ghdataset";

/// Directory the exporter writes into when nothing else is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "gh_discussions_dataset";

/// Public GitHub GraphQL endpoint.
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

// ---------------------------------------------------------------------------
// Config structs (matching ghdataset.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Exporter settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// Issue reviewer settings.
    #[serde(default)]
    pub reviewer: ReviewerConfig,
}

/// `[export]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Root directory for the Markdown dataset.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.into()
}

/// `[reviewer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerConfig {
    /// GraphQL endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: Url,

    /// Name of the env var holding the GitHub token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Default repository owner.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Default repository name.
    #[serde(default = "default_repo_name")]
    pub name: String,

    #[serde(default = "default_min_comments")]
    pub min_comments: u32,

    #[serde(default)]
    pub state: IssueStateFilter,

    #[serde(default)]
    pub order_by: IssueOrderField,

    #[serde(default)]
    pub direction: OrderDirection,

    /// Issues per GraphQL page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Append-only list of every reviewed issue URL.
    #[serde(default = "default_reviewed_file")]
    pub reviewed_file: String,

    /// Append-only list of issue URLs marked "yes".
    #[serde(default = "default_selected_file")]
    pub selected_file: String,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token_env: default_token_env(),
            owner: default_owner(),
            name: default_repo_name(),
            min_comments: default_min_comments(),
            state: IssueStateFilter::default(),
            order_by: IssueOrderField::default(),
            direction: OrderDirection::default(),
            page_size: default_page_size(),
            reviewed_file: default_reviewed_file(),
            selected_file: default_selected_file(),
        }
    }
}

impl ReviewerConfig {
    /// Build the default issue query from this section.
    pub fn query(&self) -> IssueQuery {
        IssueQuery {
            owner: self.owner.clone(),
            name: self.name.clone(),
            min_comments: self.min_comments,
            state: self.state,
            order_by: self.order_by,
            direction: self.direction,
            page_size: self.page_size,
        }
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_GRAPHQL_ENDPOINT).expect("valid default endpoint")
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_owner() -> String {
    "The-OpenROAD-Project".into()
}
fn default_repo_name() -> String {
    "OpenROAD".into()
}
fn default_min_comments() -> u32 {
    2
}
fn default_page_size() -> u32 {
    100
}
fn default_reviewed_file() -> String {
    "urls.txt".into()
}
fn default_selected_file() -> String {
    "selected_urls.txt".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.ghdataset/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DatasetError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.ghdataset/ghdataset.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DatasetError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DatasetError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DatasetError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DatasetError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the GitHub token from the env var named in the config, if set and non-empty.
pub fn resolve_token(config: &ReviewerConfig) -> Option<String> {
    std::env::var(&config.token_env)
        .ok()
        .filter(|val| !val.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("GITHUB_TOKEN"));
        assert!(toml_str.contains("UPDATED_AT"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.export.output_dir, DEFAULT_OUTPUT_DIR);
        assert_eq!(parsed.reviewer.min_comments, 2);
        assert_eq!(parsed.reviewer.endpoint.as_str(), DEFAULT_GRAPHQL_ENDPOINT);
    }

    #[test]
    fn partial_reviewer_section() {
        let toml_str = r#"
[export]
output_dir = "/tmp/dataset"

[reviewer]
owner = "rust-lang"
name = "rust"
state = "CLOSED"
direction = "ASC"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.export.output_dir, "/tmp/dataset");
        assert_eq!(config.reviewer.owner, "rust-lang");
        assert_eq!(config.reviewer.state, IssueStateFilter::Closed);
        assert_eq!(config.reviewer.direction, OrderDirection::Asc);
        assert_eq!(config.reviewer.order_by, IssueOrderField::UpdatedAt);
        assert_eq!(config.reviewer.reviewed_file, "urls.txt");
    }

    #[test]
    fn reviewer_query_from_config() {
        let query = ReviewerConfig::default().query();
        assert_eq!(query.owner, "The-OpenROAD-Project");
        assert_eq!(query.name, "OpenROAD");
        assert_eq!(query.min_comments, 2);
        assert_eq!(query.page_size, 100);
        assert_eq!(query.state, IssueStateFilter::All);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let dir = std::env::temp_dir().join(format!("ghdataset-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "[reviewer\nowner = 1").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unset_token_env_resolves_to_none() {
        let mut config = ReviewerConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.token_env = "GHDATASET_TEST_NONEXISTENT_TOKEN_12345".into();
        assert!(resolve_token(&config).is_none());
    }
}
