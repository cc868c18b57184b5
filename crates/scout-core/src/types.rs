use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScoutError;

/// A single changed file in a pull request.
///
/// `patch` is `None` for binary files and for files GitHub considers too
/// large to diff.
///
/// # Examples
///
/// ```
/// use scout_core::{ChangedFile, FileStatus};
///
/// let file = ChangedFile {
///     filename: "src/lib.rs".into(),
///     status: FileStatus::Modified,
///     patch: Some("@@ -1 +1 @@\n-a\n+b".into()),
/// };
/// assert!(file.has_patch());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path relative to the repository root.
    pub filename: String,
    /// How the file changed.
    pub status: FileStatus,
    /// Unified-diff hunks for the file, if textual.
    #[serde(default)]
    pub patch: Option<String>,
}

impl ChangedFile {
    /// Whether the file carries non-empty patch text.
    pub fn has_patch(&self) -> bool {
        self.patch.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Change status of a file, using GitHub's vocabulary.
///
/// Unrecognised values deserialize as [`FileStatus::Changed`].
///
/// # Examples
///
/// ```
/// use scout_core::FileStatus;
///
/// let s: FileStatus = serde_json::from_str("\"renamed\"").unwrap();
/// assert_eq!(s, FileStatus::Renamed);
/// let other: FileStatus = serde_json::from_str("\"typechange\"").unwrap();
/// assert_eq!(other, FileStatus::Changed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// New file.
    Added,
    /// Existing file edited in place.
    Modified,
    /// File deleted.
    Removed,
    /// File moved, possibly with edits.
    Renamed,
    /// File copied from another path.
    Copied,
    /// Listed without content changes.
    Unchanged,
    /// Metadata or other change.
    #[serde(other)]
    Changed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
        };
        f.write_str(s)
    }
}

/// How the change set of a pull request is obtained.
///
/// # Examples
///
/// ```
/// use scout_core::DiffStrategy;
///
/// let s: DiffStrategy = "local".parse().unwrap();
/// assert_eq!(s, DiffStrategy::Local);
/// assert_eq!(DiffStrategy::default(), DiffStrategy::Api);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStrategy {
    /// Paginate the hosted "list pull request files" endpoint.
    #[default]
    Api,
    /// Run `git diff` in the checked-out working copy.
    Local,
}

impl fmt::Display for DiffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffStrategy::Api => write!(f, "api"),
            DiffStrategy::Local => write!(f, "local"),
        }
    }
}

impl FromStr for DiffStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "api" => Ok(DiffStrategy::Api),
            "local" | "git" => Ok(DiffStrategy::Local),
            other => Err(format!(
                "unknown diff strategy '{other}', expected 'api' or 'local'"
            )),
        }
    }
}

/// Pull-request metadata taken from the CI event document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull-request (and issue) number.
    pub number: u64,
    /// Title, when the event carries one.
    pub title: Option<String>,
    /// Whether the pull request is a draft.
    pub draft: bool,
    /// Target branch name.
    pub base_ref: String,
    /// Target commit, when known.
    pub base_sha: Option<String>,
    /// Source branch name.
    pub head_ref: Option<String>,
    /// Source commit.
    pub head_sha: String,
}

/// A parsed CI event document.
///
/// Events that are not about a pull request (pushes, schedules) parse to a
/// value with `pull_request == None`.
///
/// # Examples
///
/// ```
/// use scout_core::PullRequestEvent;
///
/// let json = r#"{
///   "pull_request": {
///     "number": 7,
///     "draft": false,
///     "base": { "ref": "main", "sha": "aaa" },
///     "head": { "ref": "feature", "sha": "bbb" }
///   }
/// }"#;
/// let event = PullRequestEvent::from_json(json).unwrap();
/// let pr = event.pull_request.unwrap();
/// assert_eq!(pr.number, 7);
/// assert_eq!(pr.base_ref, "main");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestEvent {
    /// The pull request this event concerns, if any.
    pub pull_request: Option<PullRequest>,
}

#[derive(Deserialize)]
struct RawEvent {
    pull_request: Option<RawPullRequest>,
}

#[derive(Deserialize)]
struct RawPullRequest {
    number: u64,
    title: Option<String>,
    #[serde(default)]
    draft: bool,
    base: RawRef,
    head: RawRef,
}

#[derive(Deserialize)]
struct RawRef {
    #[serde(rename = "ref")]
    ref_name: Option<String>,
    sha: Option<String>,
}

impl PullRequestEvent {
    /// Read and parse the event document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::FileNotFound`] if the file does not exist,
    /// [`ScoutError::Io`] if it cannot be read, or an error from
    /// [`PullRequestEvent::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, ScoutError> {
        if !path.exists() {
            return Err(ScoutError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse an event document.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Serialization`] for malformed JSON, or
    /// [`ScoutError::Config`] when a pull request lacks its base branch or
    /// head commit.
    pub fn from_json(content: &str) -> Result<Self, ScoutError> {
        let raw: RawEvent = serde_json::from_str(content)?;
        let Some(pr) = raw.pull_request else {
            return Ok(Self::default());
        };

        let base_ref = pr.base.ref_name.ok_or_else(|| {
            ScoutError::Config(format!("pull request #{} has no base ref", pr.number))
        })?;
        let head_sha = pr.head.sha.ok_or_else(|| {
            ScoutError::Config(format!("pull request #{} has no head sha", pr.number))
        })?;

        Ok(Self {
            pull_request: Some(PullRequest {
                number: pr.number,
                title: pr.title,
                draft: pr.draft,
                base_ref,
                base_sha: pr.base.sha,
                head_ref: pr.head.ref_name,
                head_sha,
            }),
        })
    }
}
