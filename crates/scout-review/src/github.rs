use scout_core::{ChangedFile, ScoutError};
use tracing::{debug, info};

/// Files requested per page of the "list pull request files" endpoint.
pub const FILES_PER_PAGE: usize = 100;

/// GitHub stops listing pull-request files after 3000 entries.
pub const MAX_FILE_PAGES: usize = 30;

/// GitHub REST client for listing pull-request files and posting comments.
///
/// # Examples
///
/// ```no_run
/// # async fn demo() -> Result<(), scout_core::ScoutError> {
/// use scout_review::github::GitHubClient;
///
/// let client = GitHubClient::new("ghp_xxxx", "https://api.github.com")?;
/// let files = client.list_pr_files("octocat", "hello-world", 42).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
    api_url: String,
}

impl GitHubClient {
    /// Create a client for the REST API rooted at `api_url`.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] if `api_url` is not a valid URI, or
    /// [`ScoutError::GitHub`] if the client cannot be built.
    pub fn new(token: &str, api_url: &str) -> Result<Self, ScoutError> {
        let api_url = api_url.trim_end_matches('/').to_string();

        let octocrab = octocrab::Octocrab::builder()
            .base_uri(api_url.as_str())
            .map_err(|e| ScoutError::Config(format!("invalid GitHub API url '{api_url}': {e}")))?
            .personal_token(token.to_string())
            .build()
            .map_err(|e| ScoutError::GitHub(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent("scout")
            .build()
            .map_err(|e| ScoutError::GitHub(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            octocrab,
            http,
            token: token.to_string(),
            api_url,
        })
    }

    /// List the changed files of a pull request, in API order.
    ///
    /// Pages are requested until a short page or [`MAX_FILE_PAGES`] is
    /// reached. Entries without a patch are kept; callers decide what to do
    /// with them.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::GitHub`] on network errors, non-success status
    /// (status and body included), or an unreadable page.
    pub async fn list_pr_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<ChangedFile>, ScoutError> {
        let url = format!(
            "{}/repos/{owner}/{repo}/pulls/{pr_number}/files",
            self.api_url
        );

        let mut files = Vec::new();
        for page in 1..=MAX_FILE_PAGES {
            let response = self
                .http
                .get(&url)
                .query(&[("per_page", FILES_PER_PAGE), ("page", page)])
                .header("Accept", "application/vnd.github+json")
                .header("X-GitHub-Api-Version", "2022-11-28")
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|e| ScoutError::GitHub(format!("failed to list PR files: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ScoutError::GitHub(format!(
                    "GitHub API error {status}: {body}"
                )));
            }

            let batch: Vec<ChangedFile> = response.json().await.map_err(|e| {
                ScoutError::GitHub(format!("failed to read PR files page {page}: {e}"))
            })?;
            let count = batch.len();
            debug!(page, count, "fetched PR files page");
            files.extend(batch);

            if count < FILES_PER_PAGE {
                break;
            }
        }

        info!(count = files.len(), "listed pull request files");
        Ok(files)
    }

    /// Post `body` as a comment on the pull request's conversation.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::GitHub`] on transport errors or a non-success
    /// status (status and body included).
    pub async fn post_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        body: &str,
    ) -> Result<(), ScoutError> {
        let route = format!("/repos/{owner}/{repo}/issues/{pr_number}/comments");
        let payload = serde_json::json!({ "body": body });

        let response = self
            .octocrab
            ._post(route, Some(&payload))
            .await
            .map_err(|e| ScoutError::GitHub(format!("failed to post comment: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = self
                .octocrab
                .body_to_string(response)
                .await
                .unwrap_or_default();
            return Err(ScoutError::GitHub(format!(
                "GitHub API error {status}: {body}"
            )));
        }

        debug!(pr = pr_number, %status, "posted issue comment");
        Ok(())
    }
}
