use std::path::{Path, PathBuf};

use scout_core::{DiffStrategy, PullRequestEvent, RunConfig, ScoutError};
use scout_difflens::filter::PathFilter;
use scout_difflens::payload::{PayloadAssembler, PayloadLimits, TruncationReport};
use tracing::{info, warn};

use crate::comment::render_comment;
use crate::github::GitHubClient;
use crate::llm::{ChatMessage, LlmClient};
use crate::prompt;
use crate::source::{pull_request_to_review, ApiListing, DiffSource, LocalDiff, SkipReason};

/// How a review run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Nothing was sent to the model.
    Skipped(SkipReason),
    /// The review comment was posted.
    Posted {
        /// Pull request commented on.
        pr_number: u64,
        /// Truncation decisions behind the reviewed payload.
        report: TruncationReport,
    },
    /// Dry run: the comment was rendered but not posted.
    DryRun {
        /// Pull request that would have been commented on.
        pr_number: u64,
        /// Rendered comment body.
        comment: String,
    },
}

/// Review orchestrator: event → diff source → payload → model → comment.
///
/// Every step runs once, in order. The first failure ends the run and no
/// later step is attempted.
pub struct ReviewPipeline {
    source: DiffSource,
    filter: PathFilter,
    assembler: PayloadAssembler,
    llm: LlmClient,
    github: GitHubClient,
    owner: String,
    repo: String,
    event_path: PathBuf,
    skip_drafts: bool,
    dry_run: bool,
}

impl ReviewPipeline {
    /// Build the pipeline from validated settings.
    ///
    /// `repo_root` is the checkout used by the local strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(run: &RunConfig, repo_root: &Path) -> Result<Self, ScoutError> {
        let github = GitHubClient::new(&run.github_token, &run.api_url)?;
        let llm = LlmClient::new(&run.llm)?;

        let source = match run.review.strategy {
            DiffStrategy::Local => {
                DiffSource::Local(LocalDiff::new(repo_root, run.review.split_local_diff))
            }
            DiffStrategy::Api => {
                DiffSource::Api(ApiListing::new(github.clone(), &run.owner, &run.repo))
            }
        };

        Ok(Self {
            source,
            filter: PathFilter::from_config(&run.review),
            assembler: PayloadAssembler::new(PayloadLimits::from_config(&run.review)),
            llm,
            github,
            owner: run.owner.clone(),
            repo: run.repo.clone(),
            event_path: run.event_path.clone(),
            skip_drafts: run.review.skip_drafts,
            dry_run: false,
        })
    }

    /// Render the comment instead of posting it.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Read the configured event document and review it.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be read, or from
    /// [`ReviewPipeline::review_event`].
    pub async fn run(&self) -> Result<ReviewOutcome, ScoutError> {
        let event = PullRequestEvent::from_file(&self.event_path)?;
        self.review_event(&event).await
    }

    /// Review the pull request described by `event`.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error: diff collection, the
    /// completion call, or the comment post.
    pub async fn review_event(&self, event: &PullRequestEvent) -> Result<ReviewOutcome, ScoutError> {
        let pr = match pull_request_to_review(event, self.skip_drafts) {
            Ok(pr) => pr,
            Err(reason) => {
                info!(%reason, "skipping review");
                return Ok(ReviewOutcome::Skipped(reason));
            }
        };

        info!(pr = pr.number, strategy = %self.source.strategy(), "collecting changes");
        let files = self.filter.apply(self.source.changed_files(pr).await?);

        let Some(payload) = self.assembler.assemble(&files) else {
            let reason = SkipReason::NothingToReview;
            info!(%reason, files = files.len(), "skipping review");
            return Ok(ReviewOutcome::Skipped(reason));
        };
        for w in payload.report.warnings() {
            warn!("{w}");
        }
        info!(
            selected = payload.report.selected_count,
            chars = payload.text.chars().count(),
            "payload assembled"
        );

        let messages = vec![
            ChatMessage::system(prompt::build_system_prompt()),
            ChatMessage::user(prompt::build_review_prompt(&payload.text, Some(pr))),
        ];
        let review = self.llm.chat(messages).await?;
        let comment = render_comment(&review, &payload.report, self.llm.model());

        if self.dry_run {
            info!(pr = pr.number, "dry run, comment not posted");
            return Ok(ReviewOutcome::DryRun {
                pr_number: pr.number,
                comment,
            });
        }

        self.github
            .post_issue_comment(&self.owner, &self.repo, pr.number, &comment)
            .await?;
        info!(pr = pr.number, "review comment posted");

        Ok(ReviewOutcome::Posted {
            pr_number: pr.number,
            report: payload.report,
        })
    }
}
