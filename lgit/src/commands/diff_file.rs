//! Show the working copy changes to a single file.

use std::fmt::Write;

use lib::core::effects::Effects;
use lib::core::item::SelectableItem;
use lib::git::{GitRunInfo, Repo, StatusReport};
use lib::try_exit_code;
use lib::util::EyreExitOr;
use tracing::instrument;

use super::{check_interactive, get_prompt_page_size};

/// Prompt for one file with unstaged changes or conflicts and run `git diff`
/// on it. Git is attached to the terminal so that the user's pager is used.
#[instrument]
pub fn diff_file(effects: &Effects, git_run_info: &GitRunInfo) -> EyreExitOr<()> {
    let repo = Repo::from_current_dir()?;
    let status = StatusReport::read(git_run_info)?;
    let files = status.files_to_diff();
    if files.is_empty() {
        writeln!(effects.get_output_stream(), "Nothing to diff")?;
        return Ok(Ok(()));
    }
    try_exit_code!(check_interactive(effects)?);

    let items: Vec<SelectableItem> = files.into_iter().map(SelectableItem::from_value).collect();
    let page_size = get_prompt_page_size(&repo)?;
    let chosen_file =
        match lgit_prompt::prompt_select("Which file do you want to diff?", &items, page_size)? {
            Some(item) => item.value,
            None => return Ok(Ok(())),
        };

    git_run_info.run_direct_no_wrapping(&["diff", "--", chosen_file.as_str()])
}
