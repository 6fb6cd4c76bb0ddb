//! Interactive front-end for everyday Git operations.
//!
//! `lgit` reads `git status` and the `HEAD` reflog, offers the relevant files
//! or branches in a picker, and runs the corresponding Git command on the
//! selection:
//!
//!   * `add` stages files with changes and untracked files.
//!   * `unstage` removes staged files from the index.
//!   * `checkout-file` discards working copy changes to files.
//!   * `diff-file` shows the changes to a single file.
//!   * `checkout-branch` switches to a recently checked-out branch.
//!
//! Without a subcommand, `lgit` shows a menu of these actions and runs the one
//! whose key is pressed.

#![warn(missing_docs)]
#![warn(
    clippy::all,
    clippy::as_conversions,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro
)]
#![allow(clippy::too_many_arguments, clippy::blocks_in_conditions)]

pub mod commands;
