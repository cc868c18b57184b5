use std::path::PathBuf;

/// Errors that can occur while running a review.
///
/// Library crates return this type directly; the binary renders it through
/// `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use scout_core::ScoutError;
///
/// let err = ScoutError::Config("missing GitHub token".into());
/// assert!(err.to_string().contains("missing GitHub token"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ScoutError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(scout::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(scout::config),
        help("values come from CLI flags, the environment, then .scout.toml")
    )]
    Config(String),

    /// A `git` command failed with no usable fallback.
    #[error("git error: {0}")]
    #[diagnostic(code(scout::git))]
    Git(String),

    /// GitHub API transport or status failure.
    #[error("GitHub error: {0}")]
    #[diagnostic(code(scout::github))]
    GitHub(String),

    /// Completion API transport or status failure.
    #[error("LLM error: {0}")]
    #[diagnostic(code(scout::llm))]
    Llm(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(scout::json))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(scout::toml))]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(scout::file_not_found))]
    FileNotFound(PathBuf),
}
