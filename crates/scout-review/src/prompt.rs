use scout_core::PullRequest;

const SYSTEM_PROMPT: &str = "\
You are an experienced software engineer reviewing a pull request.

Review the changes for:
- bugs and logic errors
- security problems
- performance pitfalls
- readability and maintainability issues worth fixing

Rules:
- Refer to files by name and quote the relevant lines
- Be concise; group minor nits into a single short list
- Do not restate the diff
- If the diff was truncated, review only what you can see
- If nothing needs attention, say so in one sentence

Answer in GitHub-flavored Markdown.";

/// Build the system prompt for the review model.
///
/// # Examples
///
/// ```
/// use scout_review::prompt::build_system_prompt;
///
/// let prompt = build_system_prompt();
/// assert!(prompt.contains("pull request"));
/// ```
pub fn build_system_prompt() -> String {
    SYSTEM_PROMPT.to_string()
}

/// Build the user prompt containing the assembled payload.
///
/// # Examples
///
/// ```
/// use scout_review::prompt::build_review_prompt;
///
/// let prompt = build_review_prompt("File: a.rs\nStatus: added\n+x", None);
/// assert!(prompt.contains("File: a.rs"));
/// ```
pub fn build_review_prompt(payload: &str, pr: Option<&PullRequest>) -> String {
    let mut prompt = String::new();
    if let Some(pr) = pr {
        prompt.push_str(&format!("Pull request #{}", pr.number));
        if let Some(title) = pr.title.as_deref().filter(|t| !t.is_empty()) {
            prompt.push_str(&format!(": {title}"));
        }
        prompt.push_str(&format!(" (into `{}`)\n\n", pr.base_ref));
    }
    prompt.push_str(&format!(
        "Review the following changes:\n\n```diff\n{payload}\n```\n"
    ));
    prompt
}
