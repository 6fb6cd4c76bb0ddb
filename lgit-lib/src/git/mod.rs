//! Tools for interfacing with the Git repository and the `git` executable.

mod config;
mod reflog;
mod repo;
mod run;
mod status;

pub use config::{Config, ConfigRead, GetConfigValue};
pub use reflog::{get_recent_branches, parse_checkout_reflog, RecentBranch};
pub use repo::{Error as RepoError, Repo};
pub use run::{GitRunInfo, GitRunOpts, GitRunResult};
pub use status::{StatusReport, StatusSection};
