use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scout_core::{DiffStrategy, ScoutConfig};
use scout_review::pipeline::{ReviewOutcome, ReviewPipeline};

const CONFIG_FILE: &str = ".scout.toml";

#[derive(Parser)]
#[command(
    name = "scout",
    version,
    about = "Pull-request review bot",
    long_about = "Scout sends a pull request's diff to a language model and posts the\n\
                  review back as a comment. Meant to run as a CI step on pull-request events.\n\n\
                  Examples:\n  \
                    scout review                         Review the PR in $GITHUB_EVENT_PATH\n  \
                    scout review --strategy local        Diff the local checkout instead of the API\n  \
                    scout review --event ev.json --dry-run  Print the comment, do not post it\n  \
                    scout init                           Write a default .scout.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .scout.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Review the pull request of a CI event and post the result
    #[command(long_about = "Review the pull request of a CI event and post the result.\n\n\
        Requires OPENAI_API_KEY, GITHUB_TOKEN and GITHUB_REPOSITORY (or their\n\
        .scout.toml equivalents). Events without a pull request, draft pull\n\
        requests and diffs without textual changes exit successfully without\n\
        calling the model.\n\n\
        Examples:\n  scout review\n  scout review --strategy local --repo .\n  scout review --event event.json --dry-run")]
    Review {
        /// CI event document (default: $GITHUB_EVENT_PATH)
        #[arg(long)]
        event: Option<PathBuf>,

        /// Where the diff comes from: api or local
        #[arg(long)]
        strategy: Option<DiffStrategy>,

        /// Checkout used by the local strategy (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Print the comment to stdout instead of posting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Create a default .scout.toml in the current directory
    Init,
}

const DEFAULT_CONFIG: &str = r#"# Scout Configuration

[llm]
# OpenAI-compatible completion endpoint; the key comes from OPENAI_API_KEY
# model = "gpt-4o-mini"
# base_url = "https://api.openai.com"
# temperature = 0.2

[github]
# Usually provided by the CI environment:
# GITHUB_TOKEN, GITHUB_REPOSITORY, GITHUB_EVENT_PATH
# api_url = "https://api.github.com"

[review]
# strategy = "api"            # "api" lists files via GitHub, "local" runs git diff
# skip_drafts = true
# max_files = 15
# max_patch_chars_per_file = 5000
# max_total_chars = 12000
# skip_patterns = ["*.lock", "*.min.js", "vendor/**"]
# split_local_diff = true
"#;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ScoutConfig> {
    let config = match path {
        Some(path) => ScoutConfig::from_file(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                ScoutConfig::from_file(default_path)?
            } else {
                ScoutConfig::default()
            }
        }
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Review {
            event,
            strategy,
            repo,
            dry_run,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            config.apply_env();
            if let Some(event) = event {
                config.github.event_path = Some(event);
            }
            if let Some(strategy) = strategy {
                config.review.strategy = strategy;
            }
            let run = config.resolve()?;

            let pipeline = ReviewPipeline::from_config(&run, &repo)?.with_dry_run(dry_run);
            match pipeline.run().await? {
                ReviewOutcome::Skipped(reason) => info!(%reason, "nothing to do"),
                ReviewOutcome::Posted { pr_number, report } => {
                    info!(
                        pr = pr_number,
                        truncated = report.is_truncated(),
                        "review complete"
                    );
                }
                ReviewOutcome::DryRun { comment, .. } => print!("{comment}"),
            }
        }
        Command::Init => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
    }

    Ok(())
}
