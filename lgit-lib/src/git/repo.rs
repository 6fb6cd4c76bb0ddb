//! Operations on the Git repository. This module exists for a few reasons:
//!
//! - To ensure that every call to a Git operation has an associated error
//!   variant.
//! - To improve the interface in some cases. In particular, some operations in
//!   `git2` return an `Error` with code `ENOTFOUND`, but we should really return
//!   an `Option` in those cases.
//!
//! Everything that changes the repository goes through the `git` executable
//! instead (see `GitRunInfo`).

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::instrument;

use crate::git::config::Config;

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not open repository: {0}")]
    OpenRepo(#[source] git2::Error),

    #[error("could not open repository: {0}")]
    UnsupportedExtensionWorktreeConfig(#[source] git2::Error),

    #[error("could not read config: {0}")]
    ReadConfig(#[source] git2::Error),

    #[error("could not resolve HEAD: {0}")]
    ResolveHead(#[source] git2::Error),

    #[error("could not look up branch {name:?}: {source}")]
    FindBranch { source: git2::Error, name: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper around `git2`'s `Repository` type, with some additional
/// functionality.
pub struct Repo {
    inner: git2::Repository,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Git repository at: {:?}>", self.get_path())
    }
}

impl Repo {
    /// Get the Git repository associated with the given directory.
    #[instrument]
    pub fn from_dir(path: &Path) -> Result<Self> {
        let repo = match git2::Repository::discover(path) {
            Ok(repo) => repo,
            Err(err)
                if err.code() == git2::ErrorCode::GenericError
                    && err
                        .message()
                        .contains("unsupported extension name extensions.worktreeconfig") =>
            {
                return Err(Error::UnsupportedExtensionWorktreeConfig(err))
            }
            Err(err) => return Err(Error::OpenRepo(err)),
        };
        Ok(Repo { inner: repo })
    }

    /// Get the Git repository associated with the current directory.
    #[instrument]
    pub fn from_current_dir() -> Result<Self> {
        let path = std::env::current_dir().map_err(Error::Io)?;
        Repo::from_dir(&path)
    }

    /// Get the path to the `.git` directory for the repository.
    pub fn get_path(&self) -> &Path {
        self.inner.path()
    }

    /// Get the path to the working copy for this repository. If the repository
    /// is bare (has no working copy), returns `None`.
    pub fn get_working_copy_path(&self) -> Option<PathBuf> {
        self.inner.workdir().map(|workdir| workdir.to_path_buf())
    }

    /// Get a read-only view of the Git configuration for this repository.
    #[instrument]
    pub fn get_readonly_config(&self) -> Result<Config> {
        let config = self.inner.config().map_err(Error::ReadConfig)?;
        Ok(Config::from(config))
    }

    /// Whether `HEAD` points to a branch which has no commits yet, as in a
    /// freshly-initialized repository.
    #[instrument]
    pub fn is_head_unborn(&self) -> Result<bool> {
        match self.inner.head() {
            Ok(_) => Ok(false),
            Err(err) if err.code() == git2::ErrorCode::UnbornBranch => Ok(true),
            Err(err) if err.code() == git2::ErrorCode::NotFound => Ok(true),
            Err(err) => Err(Error::ResolveHead(err)),
        }
    }

    /// Whether a local branch (`refs/heads/<name>`) with the given name exists.
    /// Both loose and packed references are considered.
    #[instrument]
    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        match self.inner.find_branch(name, git2::BranchType::Local) {
            Ok(_) => Ok(true),
            Err(err)
                if err.code() == git2::ErrorCode::NotFound
                    || err.code() == git2::ErrorCode::InvalidSpec
                    || err.class() == git2::ErrorClass::Reference =>
            {
                Ok(false)
            }
            Err(source) => Err(Error::FindBranch {
                source,
                name: name.to_owned(),
            }),
        }
    }
}
