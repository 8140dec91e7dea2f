//! Shared types, error model, and configuration for the dataset toolkit.
//!
//! This crate is the foundation depended on by all other workspace crates.
//! It provides:
//! - [`DatasetError`]: the unified error type
//! - Domain types ([`DiscussionRecord`], [`MappingEntry`], [`Issue`], [`IssueQuery`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_GRAPHQL_ENDPOINT, DEFAULT_OUTPUT_DIR, ExportConfig, ReviewerConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from, resolve_token,
};
pub use error::{DatasetError, Result};
pub use types::{
    ConversationTurn, Decision, DiscussionRecord, Issue, IssueComment, IssueOrderField,
    IssueQuery, IssueStateFilter, MappingEntry, OrderDirection,
};
