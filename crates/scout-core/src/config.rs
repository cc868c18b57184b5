use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScoutError;
use crate::types::DiffStrategy;

/// Top-level configuration loaded from `.scout.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
/// Call [`ScoutConfig::resolve`] once at startup to turn it into a
/// [`RunConfig`] with every required value present.
///
/// # Examples
///
/// ```
/// use scout_core::ScoutConfig;
///
/// let config = ScoutConfig::default();
/// assert_eq!(config.review.max_files, 15);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Completion API settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// GitHub API and event settings.
    #[serde(default)]
    pub github: GitHubConfig,
    /// Diff collection and payload limits.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl ScoutConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Io`] if the file cannot be read, or
    /// [`ScoutError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use scout_core::ScoutConfig;
    /// use std::path::Path;
    ///
    /// let config = ScoutConfig::from_file(Path::new(".scout.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ScoutError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use scout_core::ScoutConfig;
    ///
    /// let toml = r#"
    /// [review]
    /// max_files = 30
    /// "#;
    /// let config = ScoutConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.review.max_files, 30);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ScoutError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// Empty values are ignored. Variables read: `OPENAI_API_KEY`,
    /// `OPENAI_BASE_URL`, `SCOUT_MODEL`, `GITHUB_TOKEN`, `GITHUB_REPOSITORY`,
    /// `GITHUB_EVENT_PATH`, `GITHUB_API_URL`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scout_core::ScoutConfig;
    ///
    /// let mut config = ScoutConfig::default();
    /// config.apply_env_with(|key| match key {
    ///     "GITHUB_REPOSITORY" => Some("octocat/hello".into()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.github.repository.as_deref(), Some("octocat/hello"));
    /// ```
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = get("SCOUT_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = get("GITHUB_TOKEN") {
            self.github.token = Some(v);
        }
        if let Some(v) = get("GITHUB_REPOSITORY") {
            self.github.repository = Some(v);
        }
        if let Some(v) = get("GITHUB_EVENT_PATH") {
            self.github.event_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("GITHUB_API_URL") {
            self.github.api_url = v;
        }
    }

    /// Validate the configuration and produce the settings for one run.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] naming the first missing or invalid
    /// item: the LLM API key, the GitHub token, the repository identity,
    /// the event path, or a zero payload limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use scout_core::ScoutConfig;
    ///
    /// let err = ScoutConfig::default().resolve().unwrap_err();
    /// assert!(err.to_string().contains("LLM API key"));
    /// ```
    pub fn resolve(&self) -> Result<RunConfig, ScoutError> {
        if self.llm.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ScoutError::Config(
                "LLM API key is not set (OPENAI_API_KEY or [llm] api_key)".into(),
            ));
        }
        let Some(github_token) = self.github.token.clone().filter(|t| !t.is_empty()) else {
            return Err(ScoutError::Config(
                "GitHub token is not set (GITHUB_TOKEN or [github] token)".into(),
            ));
        };
        let Some(repository) = self.github.repository.as_deref() else {
            return Err(ScoutError::Config(
                "repository is not set (GITHUB_REPOSITORY or [github] repository)".into(),
            ));
        };
        let (owner, repo) = parse_repository(repository)?;
        let Some(event_path) = self.github.event_path.clone() else {
            return Err(ScoutError::Config(
                "event path is not set (GITHUB_EVENT_PATH, --event or [github] event_path)".into(),
            ));
        };
        self.review.validate()?;

        Ok(RunConfig {
            llm: self.llm.clone(),
            github_token,
            owner,
            repo,
            api_url: self.github.api_url.trim_end_matches('/').to_string(),
            event_path,
            review: self.review.clone(),
        })
    }
}

/// Split an `owner/repo` identity into its parts.
fn parse_repository(repository: &str) -> Result<(String, String), ScoutError> {
    let invalid = || {
        ScoutError::Config(format!(
            "invalid repository '{repository}', expected owner/repo"
        ))
    };
    let (owner, repo) = repository.split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }
    Ok((owner.to_string(), repo.to_string()))
}

/// Completion API configuration.
///
/// # Examples
///
/// ```
/// use scout_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-4o-mini");
/// assert_eq!(config.base_url, "https://api.openai.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Base URL; `/v1/chat/completions` is appended.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com".into()
}

fn default_temperature() -> f64 {
    0.2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: default_llm_base_url(),
            temperature: default_temperature(),
        }
    }
}

/// GitHub API and event configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Token used for both the file listing and the comment post.
    pub token: Option<String>,
    /// Repository identity as `owner/repo`.
    pub repository: Option<String>,
    /// Path to the JSON event document.
    pub event_path: Option<PathBuf>,
    /// REST API root (default: `https://api.github.com`).
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "https://api.github.com".into()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            repository: None,
            event_path: None,
            api_url: default_api_url(),
        }
    }
}

/// Diff collection and payload limits.
///
/// The numeric limits are tuned for a model with a modest context window;
/// raise them for larger models.
///
/// # Examples
///
/// ```
/// use scout_core::{DiffStrategy, ReviewConfig};
///
/// let config = ReviewConfig::default();
/// assert_eq!(config.strategy, DiffStrategy::Api);
/// assert!(config.skip_drafts);
/// assert_eq!(config.max_files, 15);
/// assert_eq!(config.max_patch_chars_per_file, 5000);
/// assert_eq!(config.max_total_chars, 12000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Where the change set comes from (default: `api`).
    #[serde(default)]
    pub strategy: DiffStrategy,
    /// Skip draft pull requests (default: true).
    #[serde(default = "default_true")]
    pub skip_drafts: bool,
    /// Maximum number of files with patches included (default: 15).
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Per-file patch character cap (default: 5000).
    #[serde(default = "default_max_patch_chars")]
    pub max_patch_chars_per_file: usize,
    /// Hard cap on the assembled payload (default: 12000).
    #[serde(default = "default_max_total_chars")]
    pub max_total_chars: usize,
    /// Glob patterns for files never sent to the model.
    #[serde(default)]
    pub skip_patterns: Vec<String>,
    /// Split a local `git diff` into per-file records (default: true).
    #[serde(default = "default_true")]
    pub split_local_diff: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_files() -> usize {
    15
}

fn default_max_patch_chars() -> usize {
    5000
}

fn default_max_total_chars() -> usize {
    12000
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            strategy: DiffStrategy::default(),
            skip_drafts: true,
            max_files: default_max_files(),
            max_patch_chars_per_file: default_max_patch_chars(),
            max_total_chars: default_max_total_chars(),
            skip_patterns: Vec::new(),
            split_local_diff: true,
        }
    }
}

impl ReviewConfig {
    fn validate(&self) -> Result<(), ScoutError> {
        for (name, value) in [
            ("max_files", self.max_files),
            ("max_patch_chars_per_file", self.max_patch_chars_per_file),
            ("max_total_chars", self.max_total_chars),
        ] {
            if value == 0 {
                return Err(ScoutError::Config(format!(
                    "[review] {name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

/// Validated settings for a single review run.
///
/// Produced by [`ScoutConfig::resolve`]; every required value is present.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Completion API settings; `api_key` is guaranteed to be set.
    pub llm: LlmConfig,
    /// GitHub token.
    pub github_token: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// REST API root without a trailing slash.
    pub api_url: String,
    /// Path to the JSON event document.
    pub event_path: PathBuf,
    /// Diff collection and payload limits.
    pub review: ReviewConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ScoutConfig {
        let mut config = ScoutConfig::default();
        config.apply_env_with(|key| {
            let v = match key {
                "OPENAI_API_KEY" => "sk-test",
                "GITHUB_TOKEN" => "ghp-test",
                "GITHUB_REPOSITORY" => "octocat/hello-world",
                "GITHUB_EVENT_PATH" => "/tmp/event.json",
                _ => return None,
            };
            Some(v.to_string())
        });
        config
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = ScoutConfig::default();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.review.max_files, 15);
        assert_eq!(config.review.max_patch_chars_per_file, 5000);
        assert_eq!(config.review.max_total_chars, 12000);
        assert!(config.review.skip_drafts);
        assert!(config.review.split_local_diff);
        assert!(config.review.skip_patterns.is_empty());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[llm]
model = "gpt-4o"
base_url = "http://localhost:11434"
temperature = 0.0

[github]
repository = "octocat/hello-world"
api_url = "https://ghe.example.com/api/v3"

[review]
strategy = "local"
skip_drafts = false
max_files = 5
max_patch_chars_per_file = 100
max_total_chars = 1000
skip_patterns = ["*.lock", "vendor/**"]
split_local_diff = false
"#;
        let config = ScoutConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.review.strategy, DiffStrategy::Local);
        assert!(!config.review.skip_drafts);
        assert_eq!(config.review.max_files, 5);
        assert_eq!(config.review.skip_patterns, vec!["*.lock", "vendor/**"]);
        assert!(!config.review.split_local_diff);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ScoutConfig::from_toml("").unwrap();
        assert_eq!(config.review.max_files, 15);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = ScoutConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = ScoutConfig::from_toml("[llm]\nmodel = \"from-file\"\n").unwrap();
        config.apply_env_with(|key| (key == "SCOUT_MODEL").then(|| "from-env".to_string()));
        assert_eq!(config.llm.model, "from-env");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = ScoutConfig::default();
        config.apply_env_with(|_| Some("   ".to_string()));
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.github.api_url, "https://api.github.com");
    }

    #[test]
    fn resolve_complete_config() {
        let run = complete().resolve().unwrap();
        assert_eq!(run.owner, "octocat");
        assert_eq!(run.repo, "hello-world");
        assert_eq!(run.github_token, "ghp-test");
        assert_eq!(run.event_path, PathBuf::from("/tmp/event.json"));
        assert_eq!(run.llm.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn resolve_names_each_missing_item() {
        let mut config = complete();
        config.github.token = None;
        assert!(config.resolve().unwrap_err().to_string().contains("GitHub token"));

        let mut config = complete();
        config.github.repository = None;
        assert!(config.resolve().unwrap_err().to_string().contains("repository"));

        let mut config = complete();
        config.github.event_path = None;
        assert!(config.resolve().unwrap_err().to_string().contains("event path"));

        let mut config = complete();
        config.llm.api_key = Some(String::new());
        assert!(config.resolve().unwrap_err().to_string().contains("LLM API key"));
    }

    #[test]
    fn resolve_rejects_malformed_repository() {
        for bad in ["octocat", "/repo", "owner/", "a/b/c"] {
            let mut config = complete();
            config.github.repository = Some(bad.into());
            let err = config.resolve().unwrap_err();
            assert!(err.to_string().contains("invalid repository"), "{bad}");
        }
    }

    #[test]
    fn resolve_rejects_zero_limits() {
        let mut config = complete();
        config.review.max_total_chars = 0;
        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("max_total_chars"));
    }

    #[test]
    fn resolve_trims_api_url_slash() {
        let mut config = complete();
        config.github.api_url = "http://127.0.0.1:8080/".into();
        assert_eq!(config.resolve().unwrap().api_url, "http://127.0.0.1:8080");
    }
}
