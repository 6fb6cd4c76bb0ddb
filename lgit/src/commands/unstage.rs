//! Remove files from the index, keeping their contents in the working copy.

use lib::core::effects::Effects;
use lib::git::{GitRunInfo, Repo, StatusReport};
use lib::try_exit_code;
use lib::util::EyreExitOr;
use tracing::instrument;

use super::{prompt_for_files, run_on_files, show_status};

/// Prompt for staged files and unstage the chosen ones.
///
/// Choosing the new name of a staged rename also unstages the deletion of the
/// old name. Before the first commit there is no `HEAD` to reset the index to,
/// so the files are removed from the index instead.
#[instrument]
pub fn unstage(effects: &Effects, git_run_info: &GitRunInfo) -> EyreExitOr<()> {
    let repo = Repo::from_current_dir()?;
    let status = StatusReport::read(git_run_info)?;
    let chosen_files = try_exit_code!(prompt_for_files(
        effects,
        &repo,
        "Which files do you want to unstage? (space to select, enter to submit)",
        status.files_to_unstage(),
        "Nothing to unstage",
    )?);
    let chosen_files = match chosen_files {
        Some(chosen_files) => chosen_files,
        None => return Ok(Ok(())),
    };

    let command: &[&str] = if repo.is_head_unborn()? {
        &["rm", "--cached", "-r"]
    } else {
        &["reset", "HEAD"]
    };
    let renamed_from = status.staged_rename_sources(&chosen_files);
    let files: Vec<String> = chosen_files.into_iter().chain(renamed_from).collect();
    try_exit_code!(run_on_files(effects, git_run_info, command, files)?);
    show_status(git_run_info)
}
