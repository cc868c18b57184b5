//! Size-bounded payload assembly.
//!
//! Turns a sequence of [`ChangedFile`]s into a single text blob for the
//! completion prompt, applying three limits in order: a file-count cap
//! (first-N in source order), a per-file patch cap, and a hard cap on the
//! whole text. Every cut is recorded in a [`TruncationReport`].

use scout_core::{ChangedFile, ReviewConfig};
use serde::Serialize;
use tracing::debug;

/// Suffix appended wherever text is cut.
pub const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// Line placed between rendered file blocks.
pub const FILE_SEPARATOR: &str = "\n---\n";

/// The three size limits applied during assembly.
///
/// # Examples
///
/// ```
/// use scout_difflens::payload::PayloadLimits;
///
/// let limits = PayloadLimits::default();
/// assert_eq!(limits.max_files, 15);
/// assert_eq!(limits.max_patch_chars_per_file, 5000);
/// assert_eq!(limits.max_total_chars, 12000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadLimits {
    /// Maximum number of files with patches to include.
    pub max_files: usize,
    /// Per-file patch cap in characters, excluding the marker.
    pub max_patch_chars_per_file: usize,
    /// Hard cap on the assembled text in characters, including the marker.
    pub max_total_chars: usize,
}

impl PayloadLimits {
    /// Take the limits from review configuration.
    pub fn from_config(config: &ReviewConfig) -> Self {
        Self {
            max_files: config.max_files,
            max_patch_chars_per_file: config.max_patch_chars_per_file,
            max_total_chars: config.max_total_chars,
        }
    }
}

impl Default for PayloadLimits {
    fn default() -> Self {
        Self::from_config(&ReviewConfig::default())
    }
}

/// Record of every truncation decision made while assembling a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncationReport {
    /// More files with patches existed than `max_files`.
    pub files_limited: bool,
    /// Number of selected files whose patch was cut.
    pub patch_truncated_count: usize,
    /// The joined text was cut to `max_total_chars`.
    pub total_truncated: bool,
    /// Limits in effect.
    pub limits: PayloadLimits,
    /// Files that carried a non-empty patch.
    pub files_with_patch_count: usize,
    /// Files rendered into the payload.
    pub selected_count: usize,
}

impl TruncationReport {
    /// Whether any limit engaged.
    pub fn is_truncated(&self) -> bool {
        self.files_limited || self.patch_truncated_count > 0 || self.total_truncated
    }

    /// One human-readable line per limit that engaged.
    ///
    /// # Examples
    ///
    /// ```
    /// use scout_core::{ChangedFile, FileStatus};
    /// use scout_difflens::payload::{PayloadAssembler, PayloadLimits};
    ///
    /// let files = vec![ChangedFile {
    ///     filename: "a.rs".into(),
    ///     status: FileStatus::Modified,
    ///     patch: Some("x".repeat(50)),
    /// }];
    /// let limits = PayloadLimits { max_files: 5, max_patch_chars_per_file: 10, max_total_chars: 1000 };
    /// let payload = PayloadAssembler::new(limits).assemble(&files).unwrap();
    /// let warnings = payload.report.warnings();
    /// assert_eq!(warnings.len(), 1);
    /// assert!(warnings[0].contains("10 characters"));
    /// ```
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.files_limited {
            out.push(format!(
                "Only the first {} of {} files with patches were reviewed (max_files = {}).",
                self.selected_count, self.files_with_patch_count, self.limits.max_files
            ));
        }
        if self.patch_truncated_count > 0 {
            out.push(format!(
                "{} file patch(es) were cut to {} characters (max_patch_chars_per_file).",
                self.patch_truncated_count, self.limits.max_patch_chars_per_file
            ));
        }
        if self.total_truncated {
            out.push(format!(
                "The combined diff was cut to {} characters (max_total_chars).",
                self.limits.max_total_chars
            ));
        }
        out
    }
}

/// The bounded text handed to the completion API, with its truncation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPayload {
    /// Assembled text; never longer than `max_total_chars` characters.
    pub text: String,
    /// What was cut on the way.
    pub report: TruncationReport,
}

/// Builds a [`ReviewPayload`] from changed files under fixed limits.
///
/// # Examples
///
/// ```
/// use scout_core::{ChangedFile, FileStatus};
/// use scout_difflens::payload::{PayloadAssembler, PayloadLimits};
///
/// let files = vec![ChangedFile {
///     filename: "src/lib.rs".into(),
///     status: FileStatus::Modified,
///     patch: Some("@@ -1 +1 @@\n-a\n+b".into()),
/// }];
/// let payload = PayloadAssembler::new(PayloadLimits::default())
///     .assemble(&files)
///     .unwrap();
/// assert!(payload.text.starts_with("File: src/lib.rs\nStatus: modified\nPatch:\n@@"));
/// assert!(!payload.report.is_truncated());
///
/// assert!(PayloadAssembler::new(PayloadLimits::default()).assemble(&[]).is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PayloadAssembler {
    limits: PayloadLimits,
}

impl PayloadAssembler {
    /// Create an assembler with the given limits.
    pub fn new(limits: PayloadLimits) -> Self {
        Self { limits }
    }

    /// Assemble the payload, or `None` when no file carries a patch.
    pub fn assemble(&self, files: &[ChangedFile]) -> Option<ReviewPayload> {
        let eligible: Vec<&ChangedFile> = files.iter().filter(|f| f.has_patch()).collect();
        if eligible.is_empty() {
            return None;
        }

        let files_with_patch_count = eligible.len();
        let selected = &eligible[..files_with_patch_count.min(self.limits.max_files)];

        let mut patch_truncated_count = 0;
        let blocks: Vec<String> = selected
            .iter()
            .map(|file| {
                let patch = file.patch.as_deref().unwrap_or_default();
                let (head, cut) = split_at_chars(patch, self.limits.max_patch_chars_per_file);
                let body = if cut {
                    patch_truncated_count += 1;
                    debug!(file = %file.filename, "patch cut to per-file limit");
                    format!("{head}{TRUNCATION_MARKER}")
                } else {
                    head.to_string()
                };
                format!(
                    "File: {}\nStatus: {}\nPatch:\n{body}",
                    file.filename, file.status
                )
            })
            .collect();

        let mut text = blocks.join(FILE_SEPARATOR);

        let files_limited = files_with_patch_count > selected.len();
        if files_limited {
            text.push_str(&format!(
                "\n\n[Only the first {} of {} changed files are included; {} omitted.]",
                selected.len(),
                files_with_patch_count,
                files_with_patch_count - selected.len()
            ));
        }

        let (text, total_truncated) = cap_total(text, self.limits.max_total_chars);

        Some(ReviewPayload {
            text,
            report: TruncationReport {
                files_limited,
                patch_truncated_count,
                total_truncated,
                limits: self.limits,
                files_with_patch_count,
                selected_count: selected.len(),
            },
        })
    }
}

/// Split `s` after `max` characters; the flag reports whether anything was cut.
fn split_at_chars(s: &str, max: usize) -> (&str, bool) {
    match s.char_indices().nth(max) {
        Some((idx, _)) => (&s[..idx], true),
        None => (s, false),
    }
}

/// Cut `text` so that it, marker included, fits in `max` characters.
fn cap_total(text: String, max: usize) -> (String, bool) {
    let (_, over) = split_at_chars(&text, max);
    if !over {
        return (text, false);
    }
    let marker_len = TRUNCATION_MARKER.chars().count();
    if max <= marker_len {
        return (TRUNCATION_MARKER.chars().take(max).collect(), true);
    }
    let (head, _) = split_at_chars(&text, max - marker_len);
    (format!("{head}{TRUNCATION_MARKER}"), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::FileStatus;

    fn file(name: &str, patch: Option<&str>) -> ChangedFile {
        ChangedFile {
            filename: name.into(),
            status: FileStatus::Modified,
            patch: patch.map(str::to_string),
        }
    }

    fn limits(max_files: usize, per_file: usize, total: usize) -> PayloadLimits {
        PayloadLimits {
            max_files,
            max_patch_chars_per_file: per_file,
            max_total_chars: total,
        }
    }

    #[test]
    fn split_at_chars_respects_multibyte() {
        let (head, cut) = split_at_chars("héllo", 2);
        assert_eq!(head, "hé");
        assert!(cut);
        let (head, cut) = split_at_chars("héllo", 5);
        assert_eq!(head, "héllo");
        assert!(!cut);
    }

    #[test]
    fn files_without_patches_are_not_eligible() {
        let files = vec![
            file("logo.png", None),
            file("empty.txt", Some("")),
            file("a.rs", Some("+a")),
        ];
        let payload = PayloadAssembler::new(limits(1, 100, 1000))
            .assemble(&files)
            .unwrap();
        assert_eq!(payload.report.files_with_patch_count, 1);
        assert_eq!(payload.report.selected_count, 1);
        assert!(!payload.report.files_limited);
        assert!(payload.text.contains("File: a.rs"));
        assert!(!payload.text.contains("logo.png"));
    }

    #[test]
    fn only_binary_files_yield_none() {
        let files = vec![file("logo.png", None), file("font.woff", None)];
        assert!(PayloadAssembler::new(PayloadLimits::default())
            .assemble(&files)
            .is_none());
    }

    #[test]
    fn blocks_are_joined_by_separator_in_source_order() {
        let files = vec![file("z.rs", Some("+z")), file("a.rs", Some("+a"))];
        let payload = PayloadAssembler::new(PayloadLimits::default())
            .assemble(&files)
            .unwrap();
        assert_eq!(
            payload.text,
            "File: z.rs\nStatus: modified\nPatch:\n+z\n---\nFile: a.rs\nStatus: modified\nPatch:\n+a"
        );
    }

    #[test]
    fn omitted_note_is_appended_after_last_block() {
        let files = vec![
            file("a.rs", Some("+a")),
            file("b.rs", Some("+b")),
            file("c.rs", Some("+c")),
        ];
        let payload = PayloadAssembler::new(limits(1, 100, 1000))
            .assemble(&files)
            .unwrap();
        assert_eq!(
            payload.text,
            "File: a.rs\nStatus: modified\nPatch:\n+a\n\n\
             [Only the first 1 of 3 changed files are included; 2 omitted.]"
        );
    }

    #[test]
    fn total_cap_includes_marker() {
        let files = vec![file("a.rs", Some(&"x".repeat(500)))];
        let payload = PayloadAssembler::new(limits(15, 5000, 100))
            .assemble(&files)
            .unwrap();
        assert_eq!(payload.text.chars().count(), 100);
        assert!(payload.text.ends_with(TRUNCATION_MARKER));
        assert!(payload.report.total_truncated);
        assert_eq!(payload.report.patch_truncated_count, 0);
    }

    #[test]
    fn total_cap_smaller_than_marker() {
        let files = vec![file("a.rs", Some("+a"))];
        let payload = PayloadAssembler::new(limits(15, 5000, 4))
            .assemble(&files)
            .unwrap();
        assert_eq!(payload.text, "\n...");
        assert!(payload.report.total_truncated);
    }

    #[test]
    fn text_exactly_at_total_cap_is_untouched() {
        let files = vec![file("a.rs", Some("+a"))];
        let exact = "File: a.rs\nStatus: modified\nPatch:\n+a".chars().count();
        let payload = PayloadAssembler::new(limits(15, 5000, exact))
            .assemble(&files)
            .unwrap();
        assert!(!payload.report.total_truncated);
        assert!(!payload.text.contains("[truncated]"));
    }

    #[test]
    fn warnings_cover_each_engaged_limit() {
        let files: Vec<ChangedFile> = (0..4)
            .map(|i| file(&format!("f{i}.rs"), Some(&"y".repeat(300))))
            .collect();
        let payload = PayloadAssembler::new(limits(2, 100, 150))
            .assemble(&files)
            .unwrap();
        let report = &payload.report;
        assert!(report.files_limited);
        assert_eq!(report.patch_truncated_count, 2);
        assert!(report.total_truncated);
        let warnings = report.warnings();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("first 2 of 4"));
    }

    #[test]
    fn report_serializes_camel_case() {
        let files = vec![file("a.rs", Some("+a"))];
        let payload = PayloadAssembler::new(PayloadLimits::default())
            .assemble(&files)
            .unwrap();
        let json = serde_json::to_value(&payload.report).unwrap();
        assert_eq!(json["patchTruncatedCount"], 0);
        assert_eq!(json["limits"]["maxTotalChars"], 12000);
    }
}
