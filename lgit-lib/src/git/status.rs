//! Parsing of the human-readable `git status` report into lists of paths.

use std::collections::HashSet;
use std::ffi::OsString;

use eyre::Context;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{instrument, warn};

use crate::git::{GitRunInfo, GitRunOpts};

/// A section of the long-format `git status` report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StatusSection {
    /// Changes in the index relative to `HEAD`.
    Staged,

    /// Changes in the working copy relative to the index.
    Unstaged,

    /// Files which Git does not track.
    Untracked,

    /// Paths with unresolved merge conflicts.
    Unmerged,
}

impl StatusSection {
    /// All sections, in no particular order.
    pub const ALL: [StatusSection; 4] = [
        StatusSection::Staged,
        StatusSection::Unstaged,
        StatusSection::Untracked,
        StatusSection::Unmerged,
    ];

    /// The header line which introduces this section in the report.
    pub fn header(&self) -> &'static str {
        match self {
            StatusSection::Staged => "Changes to be committed:",
            StatusSection::Unstaged => "Changes not staged for commit:",
            StatusSection::Untracked => "Untracked files:",
            StatusSection::Unmerged => "Unmerged paths:",
        }
    }

    fn from_header(line: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.header() == line.trim())
    }

    /// Whether entries in this section are of the form `<kind>:   <path>`.
    fn has_kind_prefix(&self) -> bool {
        match self {
            StatusSection::Staged | StatusSection::Unstaged | StatusSection::Unmerged => true,
            StatusSection::Untracked => false,
        }
    }
}

lazy_static! {
    static ref KIND_PREFIX_RE: Regex =
        Regex::new(r"^(?P<kind>[a-z][a-z ]*):\s+(?P<path>.+)$").unwrap();
    static ref SUBMODULE_ANNOTATION_RE: Regex = Regex::new(
        r" \((?:new commits|modified content|untracked content)(?:, (?:new commits|modified content|untracked content))*\)$"
    )
    .unwrap();
}

/// Undo the C-style quoting that Git applies to paths containing special
/// characters (see `core.quotePath`).
fn unquote_path(path: &str) -> String {
    let inner = match path
        .strip_prefix('"')
        .and_then(|path| path.strip_suffix('"'))
    {
        Some(inner) => inner,
        None => return path.to_owned(),
    };

    let mut bytes: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        match chars.next() {
            Some('a') => bytes.push(0x07),
            Some('b') => bytes.push(0x08),
            Some('f') => bytes.push(0x0c),
            Some('n') => bytes.push(b'\n'),
            Some('r') => bytes.push(b'\r'),
            Some('t') => bytes.push(b'\t'),
            Some('v') => bytes.push(0x0b),
            Some(digit @ '0'..='7') => {
                let mut value = digit.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        None => break,
                    }
                }
                bytes.push(u8::try_from(value).unwrap_or(b'?'));
            }
            Some(other) => {
                let mut buf = [0; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// One path listed in a section of the report.
#[derive(Debug, PartialEq, Eq)]
struct StatusEntry {
    /// For renames, the path the file was renamed from.
    renamed_from: Option<String>,

    /// The path as it is now.
    path: String,
}

fn parse_entry(section: StatusSection, entry: &str) -> Option<StatusEntry> {
    let entry = entry.trim_end();
    if entry.is_empty() {
        return None;
    }

    let (kind, path) = if section.has_kind_prefix() {
        match KIND_PREFIX_RE.captures(entry) {
            Some(captures) => (
                Some(captures["kind"].to_owned()),
                captures["path"].to_owned(),
            ),
            None => {
                warn!(?section, ?entry, "Status entry has no kind prefix");
                (None, entry.trim_start().to_owned())
            }
        }
    } else {
        (None, entry.to_owned())
    };

    let path = SUBMODULE_ANNOTATION_RE.replace(&path, "");
    let path: &str = &path;
    let (source, path) = match kind.as_deref() {
        Some(kind @ ("renamed" | "copied")) => match path.rsplit_once(" -> ") {
            // The source of a copy is left as it was.
            Some((source, destination)) => ((kind == "renamed").then_some(source), destination),
            None => (None, path),
        },
        _ => (None, path),
    };
    Some(StatusEntry {
        renamed_from: source.map(unquote_path),
        path: unquote_path(path),
    })
}

/// The raw text output of `git status`, along with accessors for the paths
/// listed in each of its sections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusReport {
    text: String,
}

impl StatusReport {
    /// Wrap the output of a `git status` invocation.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Run `git status` in the working directory and capture its report.
    ///
    /// Colors are disabled and the locale is forced to `C`, so that the section
    /// headers can be recognized regardless of user configuration.
    #[instrument]
    pub fn read(git_run_info: &GitRunInfo) -> eyre::Result<Self> {
        let result = git_run_info
            .run_silent(
                &["-c", "color.status=false", "status", "--long"],
                GitRunOpts {
                    env: vec![
                        (OsString::from("LC_ALL"), OsString::from("C")),
                        (OsString::from("LANGUAGE"), OsString::from("C")),
                    ],
                    ..Default::default()
                },
            )
            .wrap_err("Reading git status")?;
        let text = String::from_utf8(result.stdout).wrap_err("Decoding git status output")?;
        Ok(Self::from_text(text))
    }

    /// Walk the report, calling `f` with each entry and the section it
    /// belongs to.
    fn for_each_entry(&self, mut f: impl FnMut(StatusSection, &str)) {
        let mut current_section: Option<StatusSection> = None;
        let mut seen_entry = false;
        for line in self.text.lines() {
            let line = console::strip_ansi_codes(line);
            // Older versions of Git prefix every line of the report with `#`.
            let line = line.strip_prefix('#').unwrap_or(&line);

            if let Some(section) = StatusSection::from_header(line) {
                current_section = Some(section);
                seen_entry = false;
                continue;
            }

            let section = match current_section {
                Some(section) => section,
                None => continue,
            };

            if line.trim().is_empty() {
                if seen_entry {
                    current_section = None;
                }
                continue;
            }

            if let Some(entry) = line.strip_prefix('\t') {
                f(section, entry);
                seen_entry = true;
            } else if line.starts_with(char::is_whitespace) && line.trim_start().starts_with('(')
            {
                // Hint, such as `(use "git add <file>..." to update what will be committed)`.
            } else {
                current_section = None;
            }
        }
    }

    /// The sections present in the report, in the order they appear.
    pub fn sections(&self) -> Vec<StatusSection> {
        let mut result = Vec::new();
        for line in self.text.lines() {
            let line = console::strip_ansi_codes(line);
            let line = line.strip_prefix('#').unwrap_or(&line);
            if let Some(section) = StatusSection::from_header(line) {
                if !result.contains(&section) {
                    result.push(section);
                }
            }
        }
        result
    }

    /// The paths listed under the given section.
    pub fn paths_in(&self, section: StatusSection) -> Vec<String> {
        self.paths_in_sections(&[section])
    }

    /// The paths listed under any of the given sections, ordered by section
    /// (as given) and then by their order in the report. A path which appears
    /// in more than one section is only returned once.
    pub fn paths_in_sections(&self, sections: &[StatusSection]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for wanted in sections {
            self.for_each_entry(|section, entry| {
                if section != *wanted {
                    return;
                }
                if let Some(StatusEntry { path, .. }) = parse_entry(section, entry) {
                    if seen.insert(path.clone()) {
                        result.push(path);
                    }
                }
            });
        }
        result
    }

    /// Paths which `git add` would act on: unstaged changes, unmerged paths
    /// and untracked files.
    pub fn files_to_stage(&self) -> Vec<String> {
        self.paths_in_sections(&[
            StatusSection::Unstaged,
            StatusSection::Unmerged,
            StatusSection::Untracked,
        ])
    }

    /// Paths with staged changes.
    pub fn files_to_unstage(&self) -> Vec<String> {
        self.paths_in(StatusSection::Staged)
    }

    /// For each of the given staged paths which is the destination of a staged
    /// rename, the path it was renamed from. Unstaging only the destination
    /// would leave the deletion of the source staged.
    pub fn staged_rename_sources(&self, paths: &[String]) -> Vec<String> {
        let mut result = Vec::new();
        self.for_each_entry(|section, entry| {
            if section != StatusSection::Staged {
                return;
            }
            if let Some(StatusEntry {
                renamed_from: Some(source),
                path,
            }) = parse_entry(section, entry)
            {
                if paths.contains(&path) && !result.contains(&source) {
                    result.push(source);
                }
            }
        });
        result
    }

    /// Paths whose working copy changes can be discarded with `git checkout`.
    pub fn files_to_checkout(&self) -> Vec<String> {
        self.paths_in(StatusSection::Unstaged)
    }

    /// Paths for which `git diff` shows something.
    pub fn files_to_diff(&self) -> Vec<String> {
        self.paths_in_sections(&[StatusSection::Unstaged, StatusSection::Unmerged])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODERN_STATUS: &str = "\
On branch master
Changes to be committed:
  (use \"git restore --staged <file>...\" to unstage)
\tnew file:   staged.txt
\trenamed:    old name.txt -> new name.txt

Changes not staged for commit:
  (use \"git add <file>...\" to update what will be committed)
  (use \"git restore <file>...\" to discard changes in working directory)
\tmodified:   staged.txt
\tdeleted:    gone.txt
\tmodified:   vendor/lib (new commits, modified content)

Untracked files:
  (use \"git add <file>...\" to include in what will be committed)
\tb c.txt
\tnewdir/

";

    #[test]
    fn test_sections() {
        let report = StatusReport::from_text(MODERN_STATUS);
        assert_eq!(
            report.sections(),
            vec![
                StatusSection::Staged,
                StatusSection::Unstaged,
                StatusSection::Untracked
            ]
        );
    }

    #[test]
    fn test_paths_in_modern_report() {
        let report = StatusReport::from_text(MODERN_STATUS);
        assert_eq!(
            report.files_to_unstage(),
            vec!["staged.txt".to_string(), "new name.txt".to_string()]
        );
        assert_eq!(
            report.files_to_stage(),
            vec![
                "staged.txt".to_string(),
                "gone.txt".to_string(),
                "vendor/lib".to_string(),
                "b c.txt".to_string(),
                "newdir/".to_string(),
            ]
        );
        assert_eq!(
            report.files_to_checkout(),
            vec![
                "staged.txt".to_string(),
                "gone.txt".to_string(),
                "vendor/lib".to_string(),
            ]
        );
    }

    #[test]
    fn test_paths_in_legacy_report() {
        let report = StatusReport::from_text(
            "\
# On branch master
# Changes to be committed:
#   (use \"git reset HEAD <file>...\" to unstage)
#
#\tnew file:   foo.txt
#
# Changes not staged for commit:
#   (use \"git add <file>...\" to update what will be committed)
#
#\tmodified:   bar.txt
#
# Untracked files:
#   (use \"git add <file>...\" to include in what will be committed)
#
#\tbaz.txt
",
        );
        assert_eq!(report.files_to_unstage(), vec!["foo.txt".to_string()]);
        assert_eq!(
            report.files_to_stage(),
            vec!["bar.txt".to_string(), "baz.txt".to_string()]
        );
    }

    #[test]
    fn test_paths_with_colors() {
        let report = StatusReport::from_text(
            "\
Changes not staged for commit:
\t\x1b[31mmodified:   colored.txt\x1b[m

Untracked files:
\t\x1b[31muntracked.txt\x1b[m
",
        );
        assert_eq!(
            report.files_to_stage(),
            vec!["colored.txt".to_string(), "untracked.txt".to_string()]
        );
    }

    #[test]
    fn test_unmerged_paths() {
        let report = StatusReport::from_text(
            "\
You have unmerged paths.
  (fix conflicts and run \"git commit\")

Unmerged paths:
  (use \"git add <file>...\" to mark resolution)
\tboth modified:   conflict.txt
\tdeleted by them: removed.txt

no changes added to commit (use \"git add\" and/or \"git commit -a\")
",
        );
        assert_eq!(
            report.files_to_stage(),
            vec!["conflict.txt".to_string(), "removed.txt".to_string()]
        );
        assert_eq!(
            report.files_to_diff(),
            vec!["conflict.txt".to_string(), "removed.txt".to_string()]
        );
        assert!(report.files_to_checkout().is_empty());
    }

    #[test]
    fn test_clean_report() {
        let report = StatusReport::from_text(
            "\
On branch master
nothing to commit, working tree clean
",
        );
        assert!(report.sections().is_empty());
        assert!(report.files_to_stage().is_empty());
        assert!(report.files_to_unstage().is_empty());
    }

    #[test]
    fn test_section_ends_at_trailing_text() {
        let report = StatusReport::from_text(
            "\
Untracked files:
\tfoo.txt
nothing added to commit but untracked files present
\tnot-a-path.txt
",
        );
        assert_eq!(report.files_to_stage(), vec!["foo.txt".to_string()]);
    }

    #[test]
    fn test_staged_rename_sources() {
        let report = StatusReport::from_text(
            "\
Changes to be committed:
\trenamed:    old name.txt -> new name.txt
\trenamed:    \"a\\tb.txt\" -> plain.txt
\tcopied:     original.txt -> copy.txt
\tmodified:   other.txt

Changes not staged for commit:
\trenamed:    not -> staged.txt
",
        );
        assert_eq!(
            report.staged_rename_sources(&[
                "new name.txt".to_string(),
                "plain.txt".to_string(),
                "copy.txt".to_string(),
                "other.txt".to_string(),
                "staged.txt".to_string(),
            ]),
            vec!["old name.txt".to_string(), "a\tb.txt".to_string()]
        );
        assert_eq!(
            report.staged_rename_sources(&["other.txt".to_string()]),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_unquote_path() {
        assert_eq!(unquote_path("plain.txt"), "plain.txt");
        assert_eq!(unquote_path("\"tab\\there.txt\""), "tab\there.txt");
        assert_eq!(unquote_path("\"quote\\\"d.txt\""), "quote\"d.txt");
        assert_eq!(unquote_path("\"caf\\303\\251.txt\""), "café.txt");
    }
}
