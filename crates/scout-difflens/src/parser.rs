use scout_core::{ChangedFile, FileStatus};

/// Filename given to an unsplit local diff.
pub const COMBINED_DIFF_NAME: &str = "(combined diff)";

/// Split `git diff` output into one [`ChangedFile`] per `diff --git` section.
///
/// The patch of each record holds the lines after the file headers, starting
/// at the first `@@` hunk header, which matches what the GitHub files API
/// returns. Binary files and header-only sections (mode changes, pure
/// renames) get `patch = None`. Output order is diff order.
///
/// # Examples
///
/// ```
/// use scout_core::FileStatus;
/// use scout_difflens::parser::split_git_diff;
///
/// let diff = "diff --git a/hello.rs b/hello.rs\n\
///             --- a/hello.rs\n\
///             +++ b/hello.rs\n\
///             @@ -1,3 +1,4 @@\n\
///              fn main() {\n\
///             +    println!(\"hello\");\n\
///              }\n";
/// let files = split_git_diff(diff);
/// assert_eq!(files.len(), 1);
/// assert_eq!(files[0].filename, "hello.rs");
/// assert_eq!(files[0].status, FileStatus::Modified);
/// assert!(files[0].patch.as_deref().unwrap().starts_with("@@ -1,3 +1,4 @@"));
/// ```
pub fn split_git_diff(input: &str) -> Vec<ChangedFile> {
    let mut files = Vec::new();
    let mut current: Option<Section> = None;

    // Split on '\n' only; a CRLF file keeps its '\r' like the API patch does.
    let body = input.strip_suffix('\n').unwrap_or(input);
    for line in body.split('\n') {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(section) = current.take() {
                files.push(section.finish());
            }
            current = Some(Section::new(path_from_git_header(rest)));
            continue;
        }

        let Some(section) = current.as_mut() else {
            continue;
        };

        if section.in_hunks {
            section.patch.push(line);
            continue;
        }

        if line.starts_with("@@") {
            section.in_hunks = true;
            section.patch.push(line);
        } else if line.starts_with("new file mode") {
            section.status = FileStatus::Added;
        } else if line.starts_with("deleted file mode") {
            section.status = FileStatus::Removed;
        } else if let Some(path) = line.strip_prefix("rename to ") {
            section.status = FileStatus::Renamed;
            section.filename = path.to_string();
        } else if let Some(path) = line.strip_prefix("copy to ") {
            section.status = FileStatus::Copied;
            section.filename = path.to_string();
        } else if line.starts_with("Binary files ") || line == "GIT binary patch" {
            section.binary = true;
        } else if let Some(path) = line.strip_prefix("+++ ") {
            if let Some(p) = strip_side_prefix(path) {
                section.filename = p.to_string();
            }
        }
    }

    if let Some(section) = current.take() {
        files.push(section.finish());
    }
    files
}

/// Wrap a whole diff as a single record named [`COMBINED_DIFF_NAME`].
///
/// Returns an empty vec for a blank diff.
///
/// # Examples
///
/// ```
/// use scout_difflens::parser::{combined_diff, COMBINED_DIFF_NAME};
///
/// let files = combined_diff("diff --git a/x b/x\n");
/// assert_eq!(files[0].filename, COMBINED_DIFF_NAME);
/// assert!(combined_diff("  \n").is_empty());
/// ```
pub fn combined_diff(input: &str) -> Vec<ChangedFile> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    vec![ChangedFile {
        filename: COMBINED_DIFF_NAME.to_string(),
        status: FileStatus::Modified,
        patch: Some(input.trim_end_matches('\n').to_string()),
    }]
}

struct Section<'a> {
    filename: String,
    status: FileStatus,
    binary: bool,
    in_hunks: bool,
    patch: Vec<&'a str>,
}

impl<'a> Section<'a> {
    fn new(filename: String) -> Self {
        Self {
            filename,
            status: FileStatus::Modified,
            binary: false,
            in_hunks: false,
            patch: Vec::new(),
        }
    }

    fn finish(self) -> ChangedFile {
        let patch = if self.binary || self.patch.is_empty() {
            None
        } else {
            Some(self.patch.join("\n"))
        };
        ChangedFile {
            filename: self.filename,
            status: self.status,
            patch,
        }
    }
}

/// Best-effort new-side path from `a/<old> b/<new>`.
fn path_from_git_header(rest: &str) -> String {
    match rest.rfind(" b/") {
        Some(idx) => rest[idx + 3..].to_string(),
        None => rest.to_string(),
    }
}

fn strip_side_prefix(path: &str) -> Option<&str> {
    let path = path.trim_end();
    if path == "/dev/null" {
        return None;
    }
    Some(
        path.strip_prefix("b/")
            .or_else(|| path.strip_prefix("a/"))
            .unwrap_or(path),
    )
}
