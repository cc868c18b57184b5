//! Core types, configuration, and error handling for Scout.
//!
//! This crate provides the shared foundation used by the other Scout crates:
//! - [`ScoutError`]: unified error type using `thiserror` and `miette`
//! - [`ScoutConfig`]: configuration loaded from `.scout.toml` and the
//!   environment, validated into a [`RunConfig`]
//! - Shared types: [`ChangedFile`], [`FileStatus`], [`PullRequest`],
//!   [`PullRequestEvent`], [`DiffStrategy`]

mod config;
mod error;
mod types;

pub use config::{GitHubConfig, LlmConfig, ReviewConfig, RunConfig, ScoutConfig};
pub use error::ScoutError;
pub use types::{ChangedFile, DiffStrategy, FileStatus, PullRequest, PullRequestEvent};
