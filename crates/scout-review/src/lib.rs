//! Review orchestration for Scout.
//!
//! Provides the I/O side of a review run: collecting the change set, the
//! completion client, prompt and comment rendering, GitHub integration, and
//! the pipeline that sequences them.

pub mod comment;
pub mod github;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod source;
