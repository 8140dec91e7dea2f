//! issue-reviewer: terminal dashboard for triaging GitHub issues into the
//! discussion dataset.
//!
//! Fetches issues over the GraphQL API and records yes/no decisions in
//! `urls.txt` / `selected_urls.txt`, built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod widgets;

use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    let config = ghdataset_shared::load_config()?;
    app::init_file_logging();
    app::run(config)
}
