//! Accesses repo-specific configuration.

use tracing::{instrument, warn};

use crate::git::{ConfigRead, Repo};

/// The number of reflog entries scanned when looking for recently checked-out
/// branches, unless overridden by `lgit.checkoutBranch.reflogLimit`.
pub const DEFAULT_REFLOG_LIMIT: usize = 100;

/// How many reflog entries to scan for recently checked-out branches.
#[instrument]
pub fn get_reflog_limit(repo: &Repo) -> eyre::Result<usize> {
    let config = repo.get_readonly_config()?;
    let limit: Option<i64> = config.get("lgit.checkoutBranch.reflogLimit")?;
    let limit = match limit {
        None => DEFAULT_REFLOG_LIMIT,
        Some(limit) => match usize::try_from(limit) {
            Ok(limit) if limit > 0 => limit,
            Ok(_) | Err(_) => {
                warn!(
                    ?limit,
                    "lgit.checkoutBranch.reflogLimit must be positive; using default"
                );
                DEFAULT_REFLOG_LIMIT
            }
        },
    };
    Ok(limit)
}

/// Whether submodules should be updated after checking out a branch.
#[instrument]
pub fn get_update_submodules(repo: &Repo) -> eyre::Result<bool> {
    repo.get_readonly_config()?
        .get_or("lgit.checkoutBranch.updateSubmodules", true)
}

/// The number of rows to show in interactive pickers, if configured. When
/// unset, the prompt derives it from the terminal height.
#[instrument]
pub fn get_page_size(repo: &Repo) -> eyre::Result<Option<usize>> {
    let config = repo.get_readonly_config()?;
    let page_size: Option<i64> = config.get("lgit.prompt.pageSize")?;
    let page_size = match page_size {
        None => None,
        Some(page_size) => match usize::try_from(page_size) {
            Ok(page_size) if page_size > 0 => Some(page_size),
            Ok(_) | Err(_) => {
                warn!(?page_size, "lgit.prompt.pageSize must be positive; ignoring");
                None
            }
        },
    };
    Ok(page_size)
}

/// Environment variables which affect the functioning of `lgit`.
pub mod env_vars {
    use std::path::PathBuf;
    use std::process::Command;

    use eyre::Context;
    use tracing::instrument;

    use crate::util::get_from_path;

    /// Path to the Git executable to shell out to as a subprocess when
    /// appropriate. This may be set during tests.
    pub const TEST_GIT: &str = "TEST_GIT";

    /// "Path to wherever your core Git programs are installed". You can find
    /// the default value by running `git --exec-path`.
    ///
    /// See <https://git-scm.com/docs/git#Documentation/git.txt---exec-pathltpathgt>.
    pub const TEST_GIT_EXEC_PATH: &str = "TEST_GIT_EXEC_PATH";

    /// Get the path to the Git executable. Uses `TEST_GIT` if set, and
    /// otherwise the first `git` on `PATH`.
    #[instrument]
    pub fn get_path_to_git() -> eyre::Result<PathBuf> {
        if let Some(path_to_git) = std::env::var_os(TEST_GIT) {
            return Ok(PathBuf::from(path_to_git));
        }

        let exe_name = if cfg!(target_os = "windows") {
            "git.exe"
        } else {
            "git"
        };
        get_from_path(exe_name).ok_or_else(|| {
            eyre::eyre!(
                "No path to Git executable was set, and none was found on PATH. \
Try running as: `{0}=$(which git) cargo test ...` \
or set `env.{0}` in your `config.toml` \
(see https://doc.rust-lang.org/cargo/reference/config.html)",
                TEST_GIT,
            )
        })
    }

    /// Get the `GIT_EXEC_PATH` environment variable. Uses `TEST_GIT_EXEC_PATH`
    /// if set, and otherwise asks Git via `git --exec-path`.
    #[instrument]
    pub fn get_git_exec_path() -> eyre::Result<PathBuf> {
        if let Some(git_exec_path) = std::env::var_os(TEST_GIT_EXEC_PATH) {
            return Ok(PathBuf::from(git_exec_path));
        }

        let path_to_git = get_path_to_git()?;
        let output = Command::new(&path_to_git)
            .arg("--exec-path")
            .output()
            .wrap_err_with(|| format!("Running {path_to_git:?} --exec-path"))?;
        if !output.status.success() {
            eyre::bail!(
                "Could not determine Git exec path. \
Try running as: `{0}=$(git --exec-path) cargo test ...`",
                TEST_GIT_EXEC_PATH,
            );
        }
        let git_exec_path = String::from_utf8(output.stdout)
            .wrap_err("Decoding output of git --exec-path")?;
        Ok(PathBuf::from(git_exec_path.trim_end()))
    }
}
