//! Issue review bookkeeping: the append-only URL ledger and the review queue.
//!
//! The ledger is two plain text files, one URL per line:
//! - `urls.txt`: every issue that has been reviewed
//! - `selected_urls.txt`: issues marked "yes"

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use ghdataset_shared::{DatasetError, Decision, Issue, Result, ReviewerConfig};

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Append-only record of review decisions.
#[derive(Debug, Clone)]
pub struct ReviewLedger {
    reviewed_path: PathBuf,
    selected_path: PathBuf,
}

impl ReviewLedger {
    pub fn new(reviewed_path: impl Into<PathBuf>, selected_path: impl Into<PathBuf>) -> Self {
        Self {
            reviewed_path: reviewed_path.into(),
            selected_path: selected_path.into(),
        }
    }

    pub fn from_config(config: &ReviewerConfig) -> Self {
        Self::new(&config.reviewed_file, &config.selected_file)
    }

    pub fn reviewed_path(&self) -> &Path {
        &self.reviewed_path
    }

    pub fn selected_path(&self) -> &Path {
        &self.selected_path
    }

    /// URLs already reviewed. A missing ledger file means none.
    pub fn reviewed_urls(&self) -> Result<HashSet<String>> {
        Ok(read_lines(&self.reviewed_path)?
            .into_iter()
            .map(|line| line.trim().to_string())
            .collect())
    }

    /// Append `url` to the reviewed list, and to the selected list on `Yes`.
    pub fn record(&self, url: &str, decision: Decision) -> Result<()> {
        append_line(&self.reviewed_path, url)?;
        if decision == Decision::Yes {
            append_line(&self.selected_path, url)?;
        }
        debug!(url, ?decision, "recorded review decision");
        Ok(())
    }

    /// Number of issues marked "yes" so far, across all sessions.
    pub fn selected_count(&self) -> Result<usize> {
        Ok(read_lines(&self.selected_path)?.len())
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
    Ok(content.lines().map(String::from).collect())
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| DatasetError::io(path, e))?;
    writeln!(file, "{line}").map_err(|e| DatasetError::io(path, e))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Where the reviewer currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState<'a> {
    /// No fetch has happened yet.
    NotFetched,
    /// A fetch happened but every match was already reviewed (or none matched).
    Empty,
    /// An issue is waiting for a decision.
    Reviewing(&'a Issue),
    /// Every queued issue has been decided.
    Finished,
}

/// The queue of issues awaiting review plus the running decision count.
///
/// The count survives re-fetches; loading a new queue only resets the cursor.
#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    queue: Option<Vec<Issue>>,
    index: usize,
    reviewed_count: usize,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with the fetched issues not yet in `reviewed`.
    /// Returns how many were queued.
    pub fn load_queue(&mut self, fetched: Vec<Issue>, reviewed: &HashSet<String>) -> usize {
        let fetched_count = fetched.len();
        let queue: Vec<Issue> = fetched
            .into_iter()
            .filter(|issue| !reviewed.contains(&issue.url))
            .collect();

        info!(
            fetched = fetched_count,
            queued = queue.len(),
            "review queue loaded"
        );

        let queued = queue.len();
        self.queue = Some(queue);
        self.index = 0;
        queued
    }

    pub fn state(&self) -> QueueState<'_> {
        match &self.queue {
            None => QueueState::NotFetched,
            Some(queue) if queue.is_empty() => QueueState::Empty,
            Some(queue) => match queue.get(self.index) {
                Some(issue) => QueueState::Reviewing(issue),
                None => QueueState::Finished,
            },
        }
    }

    pub fn current(&self) -> Option<&Issue> {
        match self.state() {
            QueueState::Reviewing(issue) => Some(issue),
            _ => None,
        }
    }

    /// Issues in the current queue.
    pub fn total(&self) -> usize {
        self.queue.as_ref().map_or(0, Vec::len)
    }

    /// Issues in the current queue still awaiting a decision.
    pub fn remaining(&self) -> usize {
        self.total().saturating_sub(self.index)
    }

    /// Decisions made during this session.
    pub fn reviewed_count(&self) -> usize {
        self.reviewed_count
    }

    /// Record a decision for the current issue and move to the next one.
    ///
    /// The cursor only advances once the ledger write succeeded. Returns the
    /// decided issue's URL.
    pub fn decide(&mut self, ledger: &ReviewLedger, decision: Decision) -> Result<String> {
        let url = self
            .current()
            .map(|issue| issue.url.clone())
            .ok_or_else(|| DatasetError::validation("no issue is awaiting review"))?;

        ledger.record(&url, decision)?;
        self.index += 1;
        self.reviewed_count += 1;
        Ok(url)
    }
}
