//! Change-set collection for a pull request.
//!
//! One [`DiffSource`] with two strategies: a local `git diff` in the
//! checked-out working copy, or the paginated GitHub files listing. Both
//! return [`ChangedFile`]s in source order.

use std::fmt;
use std::path::{Path, PathBuf};

use scout_core::{ChangedFile, DiffStrategy, PullRequest, PullRequestEvent, ScoutError};
use scout_difflens::parser::{combined_diff, split_git_diff};
use tokio::process::Command;
use tracing::{info, warn};

use crate::github::GitHubClient;

/// Why a run ended without calling the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The event is not about a pull request.
    NoPullRequest,
    /// The pull request is a draft and drafts are skipped.
    DraftPullRequest,
    /// No changed file carries patch text.
    NothingToReview,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoPullRequest => write!(f, "event has no pull request"),
            SkipReason::DraftPullRequest => write!(f, "pull request is a draft"),
            SkipReason::NothingToReview => write!(f, "no changed file has a textual patch"),
        }
    }
}

/// Pick the pull request to review out of an event.
///
/// # Errors
///
/// Returns the [`SkipReason`] when there is nothing to review: no pull
/// request in the event, or a draft while `skip_drafts` is set.
///
/// # Examples
///
/// ```
/// use scout_core::PullRequestEvent;
/// use scout_review::source::{pull_request_to_review, SkipReason};
///
/// let event = PullRequestEvent::default();
/// assert_eq!(pull_request_to_review(&event, true), Err(SkipReason::NoPullRequest));
/// ```
pub fn pull_request_to_review(
    event: &PullRequestEvent,
    skip_drafts: bool,
) -> Result<&PullRequest, SkipReason> {
    let pr = event
        .pull_request
        .as_ref()
        .ok_or(SkipReason::NoPullRequest)?;
    if pr.draft && skip_drafts {
        return Err(SkipReason::DraftPullRequest);
    }
    Ok(pr)
}

/// Where the changed files of a pull request come from.
pub enum DiffSource {
    /// `git diff` in a local checkout.
    Local(LocalDiff),
    /// GitHub's "list pull request files" endpoint.
    Api(ApiListing),
}

impl DiffSource {
    /// Strategy this source uses.
    pub fn strategy(&self) -> DiffStrategy {
        match self {
            DiffSource::Local(_) => DiffStrategy::Local,
            DiffSource::Api(_) => DiffStrategy::Api,
        }
    }

    /// Collect the changed files of `pr`, in source order.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Git`] when both local diff attempts fail, or
    /// [`ScoutError::GitHub`] when the listing fails.
    pub async fn changed_files(&self, pr: &PullRequest) -> Result<Vec<ChangedFile>, ScoutError> {
        match self {
            DiffSource::Local(local) => local.changed_files(pr).await,
            DiffSource::Api(api) => api.changed_files(pr).await,
        }
    }
}

/// Paginated GitHub files listing.
pub struct ApiListing {
    github: GitHubClient,
    owner: String,
    repo: String,
}

impl ApiListing {
    /// List files of pull requests in `owner/repo`.
    pub fn new(github: GitHubClient, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            github,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    async fn changed_files(&self, pr: &PullRequest) -> Result<Vec<ChangedFile>, ScoutError> {
        self.github
            .list_pr_files(&self.owner, &self.repo, pr.number)
            .await
    }
}

/// The two `git diff` invocations tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalAttempt {
    /// `git diff origin/<base>...<head>`: changes since the merge base.
    MergeBase,
    /// `git diff <base> HEAD`: base against the checked-out revision.
    CheckedOut,
}

impl LocalAttempt {
    fn diff_args(self, pr: &PullRequest) -> Vec<String> {
        match self {
            LocalAttempt::MergeBase => vec![
                "diff".into(),
                format!("origin/{}...{}", pr.base_ref, pr.head_sha),
            ],
            LocalAttempt::CheckedOut => {
                let base = pr
                    .base_sha
                    .clone()
                    .unwrap_or_else(|| format!("origin/{}", pr.base_ref));
                vec!["diff".into(), base, "HEAD".into()]
            }
        }
    }
}

impl fmt::Display for LocalAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalAttempt::MergeBase => write!(f, "merge-base"),
            LocalAttempt::CheckedOut => write!(f, "checked-out"),
        }
    }
}

/// `git diff` in a local checkout.
pub struct LocalDiff {
    repo_root: PathBuf,
    split_files: bool,
}

impl LocalDiff {
    /// Diff inside `repo_root`; `split_files` splits the output per file.
    pub fn new(repo_root: impl Into<PathBuf>, split_files: bool) -> Self {
        Self {
            repo_root: repo_root.into(),
            split_files,
        }
    }

    async fn changed_files(&self, pr: &PullRequest) -> Result<Vec<ChangedFile>, ScoutError> {
        let (attempt, raw) = self.diff(pr).await?;
        let files = if self.split_files {
            split_git_diff(&raw)
        } else {
            combined_diff(&raw)
        };
        info!(%attempt, count = files.len(), "collected local diff");
        Ok(files)
    }

    /// Fetch the base branch, then run the diff attempts in order.
    ///
    /// Returns the attempt that succeeded with its output.
    pub async fn diff(&self, pr: &PullRequest) -> Result<(LocalAttempt, String), ScoutError> {
        let fetch: Vec<String> = ["fetch", "--no-tags", "--depth=1", "origin", pr.base_ref.as_str()]
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Err(e) = run_git(&self.repo_root, &fetch).await {
            warn!(error = %e, base = %pr.base_ref, "shallow fetch of base branch failed");
        }

        let primary = LocalAttempt::MergeBase;
        match run_git(&self.repo_root, &primary.diff_args(pr)).await {
            Ok(out) => return Ok((primary, out)),
            Err(e) => warn!(%primary, error = %e, "diff attempt failed, falling back"),
        }

        let fallback = LocalAttempt::CheckedOut;
        let out = run_git(&self.repo_root, &fallback.diff_args(pr)).await?;
        Ok((fallback, out))
    }
}

async fn run_git(repo_root: &Path, args: &[String]) -> Result<String, ScoutError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(args)
        .output()
        .await
        .map_err(|e| ScoutError::Git(format!("failed to run git {}: {e}", args.join(" "))))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScoutError::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
