//! Core dataset logic for ghdataset.
//!
//! Reads discussion records from JSON Lines, renders them to markdown and
//! assembles the output tree plus `mapping.json`. Also holds the review
//! ledger used by the issue reviewer.

pub mod assembler;
pub mod pipeline;
pub mod reader;
pub mod review;
