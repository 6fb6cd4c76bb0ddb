//! Switch to a recently checked-out branch.

use std::fmt::Write;

use lib::core::config::{get_reflog_limit, get_update_submodules};
use lib::core::effects::Effects;
use lib::git::{get_recent_branches, GitRunInfo, RecentBranch, Repo};
use lib::try_exit_code;
use lib::util::EyreExitOr;
use tracing::{debug, instrument};

use super::{check_interactive, get_prompt_page_size};

/// Prompt for one of the branches recently checked out, most recent first, and
/// check it out. Submodules are then updated to match, unless
/// `lgit.checkoutBranch.updateSubmodules` is disabled.
#[instrument]
pub fn checkout_branch(effects: &Effects, git_run_info: &GitRunInfo) -> EyreExitOr<()> {
    let repo = Repo::from_current_dir()?;
    let reflog_limit = get_reflog_limit(&repo)?;
    let branches = get_recent_branches(git_run_info, &repo, reflog_limit)?;
    if branches.is_empty() {
        writeln!(effects.get_output_stream(), "No branches to checkout")?;
        return Ok(Ok(()));
    }
    try_exit_code!(check_interactive(effects)?);

    let items = RecentBranch::to_items(&branches);
    let page_size = get_prompt_page_size(&repo)?;
    let branch_name = match lgit_prompt::prompt_select(
        "Which branch do you want to checkout?",
        &items,
        page_size,
    )? {
        Some(item) => item.value,
        None => return Ok(Ok(())),
    };

    try_exit_code!(git_run_info.run(effects, &["checkout", branch_name.as_str()])?);

    if !get_update_submodules(&repo)? {
        return Ok(Ok(()));
    }
    let has_submodules = match repo.get_working_copy_path() {
        Some(working_copy_path) => working_copy_path.join(".gitmodules").exists(),
        None => false,
    };
    if !has_submodules {
        debug!("No .gitmodules file, not updating submodules");
        return Ok(Ok(()));
    }
    git_run_info.run(effects, &["submodule", "update", "--init", "--recursive"])
}
