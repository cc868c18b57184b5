//! Pull-request comment rendering.

use scout_difflens::payload::TruncationReport;

/// First line of every posted comment.
pub const COMMENT_HEADER: &str = "## 🤖 AI Code Review";

/// Render the comment body posted on the pull request.
///
/// Layout: header, the model's review, a truncation warning block when any
/// limit engaged, a separator, and the disclaimer footer.
///
/// # Examples
///
/// ```
/// use scout_core::{ChangedFile, FileStatus};
/// use scout_difflens::payload::{PayloadAssembler, PayloadLimits};
/// use scout_review::comment::render_comment;
///
/// let files = vec![ChangedFile {
///     filename: "a.rs".into(),
///     status: FileStatus::Added,
///     patch: Some("+fn a() {}".into()),
/// }];
/// let payload = PayloadAssembler::new(PayloadLimits::default()).assemble(&files).unwrap();
/// let body = render_comment("Looks fine.", &payload.report, "gpt-4o-mini");
/// assert!(body.starts_with("## 🤖 AI Code Review\n\nLooks fine.\n"));
/// assert!(!body.contains("truncated"));
/// ```
pub fn render_comment(review: &str, report: &TruncationReport, model: &str) -> String {
    let mut out = String::new();
    out.push_str(COMMENT_HEADER);
    out.push_str("\n\n");
    out.push_str(review.trim());
    out.push_str("\n\n");

    let warnings = report.warnings();
    if !warnings.is_empty() {
        out.push_str("> ⚠️ **The diff was truncated before review:**\n");
        for w in &warnings {
            out.push_str(&format!("> - {w}\n"));
        }
        out.push('\n');
    }

    out.push_str("---\n");
    out.push_str(&format!(
        "_This review was generated automatically by a language model ({model}). \
         It may be incomplete or wrong; use your own judgement._\n"
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::{ChangedFile, FileStatus};
    use scout_difflens::payload::{PayloadAssembler, PayloadLimits};

    fn report_for(count: usize, limits: PayloadLimits) -> TruncationReport {
        let files: Vec<ChangedFile> = (0..count)
            .map(|i| ChangedFile {
                filename: format!("f{i}.rs"),
                status: FileStatus::Modified,
                patch: Some("z".repeat(200)),
            })
            .collect();
        PayloadAssembler::new(limits)
            .assemble(&files)
            .unwrap()
            .report
    }

    #[test]
    fn untruncated_comment_layout() {
        let report = report_for(1, PayloadLimits::default());
        let body = render_comment("  All good.  \n", &report, "m");
        assert_eq!(
            body,
            "## 🤖 AI Code Review\n\nAll good.\n\n---\n\
             _This review was generated automatically by a language model (m). \
             It may be incomplete or wrong; use your own judgement._\n"
        );
    }

    #[test]
    fn truncated_comment_lists_each_limit() {
        let limits = PayloadLimits {
            max_files: 2,
            max_patch_chars_per_file: 50,
            max_total_chars: 80,
        };
        let report = report_for(3, limits);
        let body = render_comment("Review.", &report, "m");
        assert!(body.contains("> ⚠️ **The diff was truncated before review:**"));
        assert!(body.contains("> - Only the first 2 of 3 files"));
        assert!(body.contains("> - 2 file patch(es) were cut to 50 characters"));
        assert!(body.contains("> - The combined diff was cut to 80 characters"));

        let warning_at = body.find("⚠️").unwrap();
        let separator_at = body.find("\n---\n").unwrap();
        assert!(warning_at < separator_at);
    }
}
