//! Reconstruct recently checked-out branches from the `HEAD` reflog.

use std::collections::HashSet;

use eyre::Context;
use tracing::{debug, instrument};

use crate::core::item::SelectableItem;
use crate::git::{GitRunInfo, GitRunOpts, Repo};

/// A branch which was checked out at some point, according to the reflog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecentBranch {
    /// When the branch was checked out, as rendered by Git (`%cr`), e.g. `3
    /// days ago`.
    pub relative_date: String,

    /// The short name of the branch.
    pub name: String,
}

impl RecentBranch {
    /// Render this branch for a picker, padding the date to `date_width`
    /// columns so that branch names line up.
    pub fn to_item(&self, date_width: usize) -> SelectableItem {
        let padding = date_width.saturating_sub(console::measure_text_width(&self.relative_date));
        SelectableItem::with_label(
            format!(
                "{}{}  {}",
                self.relative_date,
                " ".repeat(padding),
                self.name
            ),
            self.name.clone(),
        )
    }

    /// Render a list of branches with their dates aligned in a column.
    pub fn to_items(branches: &[RecentBranch]) -> Vec<SelectableItem> {
        let date_width = branches
            .iter()
            .map(|branch| console::measure_text_width(&branch.relative_date))
            .max()
            .unwrap_or_default();
        branches
            .iter()
            .map(|branch| branch.to_item(date_width))
            .collect()
    }
}

/// Parse the output of `git reflog --pretty=%cr|%gs`, restricted to `checkout:
/// moving from <old> to <new>` entries, into the list of branches moved to.
///
/// Entries are expected newest first. Only the most recent checkout of each
/// branch is kept.
pub fn parse_checkout_reflog(text: &str) -> Vec<RecentBranch> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let (relative_date, subject) = match line.split_once('|') {
            Some(parts) => parts,
            None => {
                debug!(?line, "Skipping reflog line without date separator");
                continue;
            }
        };
        let name = match subject.split_whitespace().last() {
            Some(name) => name,
            None => {
                debug!(?line, "Skipping reflog line without subject");
                continue;
            }
        };

        if seen.insert(name.to_owned()) {
            result.push(RecentBranch {
                relative_date: relative_date.trim().to_owned(),
                name: name.to_owned(),
            });
        }
    }
    result
}

/// Get the branches most recently checked out in this repository, newest
/// first, looking at most `limit` reflog entries back. Branches which have
/// since been deleted, as well as detached checkouts, are omitted.
#[instrument]
pub fn get_recent_branches(
    git_run_info: &GitRunInfo,
    repo: &Repo,
    limit: usize,
) -> eyre::Result<Vec<RecentBranch>> {
    let limit_arg = format!("-n{limit}");
    let result = git_run_info
        .run_silent(
            &[
                "reflog",
                limit_arg.as_str(),
                "--pretty=%cr|%gs",
                "--grep-reflog=checkout: moving",
                "HEAD",
            ],
            GitRunOpts {
                treat_git_failure_as_error: false,
                ..Default::default()
            },
        )
        .wrap_err("Reading reflog")?;
    if !result.exit_code.is_success() {
        // There is no reflog to read in a repository without commits.
        debug!(?result, "Could not read reflog");
        return Ok(Vec::new());
    }

    let text = String::from_utf8_lossy(&result.stdout);
    let mut branches = Vec::new();
    for branch in parse_checkout_reflog(&text) {
        if repo.branch_exists(&branch.name)? {
            branches.push(branch);
        } else {
            debug!(?branch, "Skipping reflog entry for missing branch");
        }
    }
    Ok(branches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_checkout_reflog() {
        let branches = parse_checkout_reflog(
            "\
2 minutes ago|checkout: moving from feature to master
5 minutes ago|checkout: moving from master to feature
1 hour ago|checkout: moving from bugfix to master

3 days ago|checkout: moving from master to bugfix
",
        );
        assert_eq!(
            branches,
            vec![
                RecentBranch {
                    relative_date: "2 minutes ago".to_string(),
                    name: "master".to_string(),
                },
                RecentBranch {
                    relative_date: "5 minutes ago".to_string(),
                    name: "feature".to_string(),
                },
                RecentBranch {
                    relative_date: "3 days ago".to_string(),
                    name: "bugfix".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_checkout_reflog_skips_malformed_lines() {
        let branches = parse_checkout_reflog(
            "garbage\n4 weeks ago|\n1 day ago|checkout: moving from a to b\n",
        );
        assert_eq!(
            branches,
            vec![RecentBranch {
                relative_date: "1 day ago".to_string(),
                name: "b".to_string(),
            }]
        );
    }

    #[test]
    fn test_to_items_aligns_dates() {
        let branches = parse_checkout_reflog(
            "\
2 minutes ago|checkout: moving from feature to master
3 days ago|checkout: moving from master to feature
",
        );
        let items = RecentBranch::to_items(&branches);
        let labels: Vec<&str> = items.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["2 minutes ago  master", "3 days ago     feature"]
        );
        assert_eq!(items[1].value, "feature");
    }
}
