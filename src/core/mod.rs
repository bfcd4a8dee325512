//! Core engine for bgt-release
//!
//! - **config**: release.toml parsing, defaults and validation
//! - **error**: error taxonomy with exit codes and contextual help
//! - **pipeline**: the release run state machine
//! - **plan**: dry-run release plan

pub mod config;
pub mod error;
pub mod pipeline;
pub mod plan;
