//! Stage files chosen from the working copy.

use lib::core::effects::Effects;
use lib::git::{GitRunInfo, Repo, StatusReport};
use lib::try_exit_code;
use lib::util::EyreExitOr;
use tracing::instrument;

use super::{prompt_for_files, run_on_files, show_status};

/// Prompt for files with unstaged changes, unresolved conflicts, or which are
/// untracked, and `git add` the chosen ones.
#[instrument]
pub fn stage(effects: &Effects, git_run_info: &GitRunInfo) -> EyreExitOr<()> {
    let repo = Repo::from_current_dir()?;
    let status = StatusReport::read(git_run_info)?;
    let chosen_files = try_exit_code!(prompt_for_files(
        effects,
        &repo,
        "Which files do you want to stage? (space to select, enter to submit)",
        status.files_to_stage(),
        "Nothing to add",
    )?);
    let chosen_files = match chosen_files {
        Some(chosen_files) => chosen_files,
        None => return Ok(Ok(())),
    };

    try_exit_code!(run_on_files(effects, git_run_info, &["add"], chosen_files)?);
    show_status(git_run_info)
}
