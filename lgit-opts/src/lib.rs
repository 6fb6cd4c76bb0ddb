//! The command-line options for `lgit`.

#![warn(missing_docs)]
#![warn(
    clippy::all,
    clippy::as_conversions,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro
)]
#![allow(clippy::too_many_arguments, clippy::blocks_in_conditions)]

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// `lgit` subcommands.
#[derive(Clone, Debug, Parser, PartialEq, Eq)]
pub enum Command {
    /// Print the available actions and run the one whose key is pressed. This
    /// is the default when no subcommand is given.
    Menu,

    /// Choose files with changes or untracked files, and stage them with `git
    /// add`.
    #[clap(visible_alias = "stage")]
    Add,

    /// Choose staged files and remove them from the index, keeping their
    /// working copy contents.
    Unstage,

    /// Choose one of the branches recently checked out, according to the
    /// reflog, and check it out.
    CheckoutBranch,

    /// Choose modified files and discard their working copy changes with `git
    /// checkout`.
    CheckoutFile,

    /// Choose a modified file and show its changes with `git diff`.
    DiffFile,
}

/// Whether to display terminal colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorSetting {
    /// Automatically determine whether to display colors from the terminal and environment variables.
    /// This is the default behavior.
    Auto,
    /// Always display terminal colors.
    Always,
    /// Never display terminal colors.
    Never,
}

/// Arguments which apply to all commands. Used during setup.
#[derive(Debug, Parser)]
pub struct GlobalArgs {
    /// Change to the given directory before executing the rest of the program.
    /// (The option is called `-C` for symmetry with Git.)
    #[clap(value_parser, short = 'C', global = true)]
    pub working_directory: Option<PathBuf>,

    /// Flag to force enable or disable terminal colors.
    #[clap(value_parser, long = "color", value_enum, global = true)]
    pub color: Option<ColorSetting>,
}

/// Interactive staging, unstaging, checkout and diffing for Git.
#[derive(Debug, Parser)]
#[clap(name = "lgit", version = env!("CARGO_PKG_VERSION"))]
pub struct Opts {
    /// Global arguments.
    #[clap(flatten)]
    pub global_args: GlobalArgs,

    /// The `lgit` subcommand to run. Defaults to `menu`.
    #[clap(subcommand)]
    pub command: Option<Command>,
}

impl Opts {
    /// The subcommand to run, falling back to the menu.
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Menu)
    }
}

/// Rewrite arguments so that invocations through a symlink or alias named
/// `lgit-<subcommand>` (for example `lgit-add`) behave as `lgit <subcommand>`.
pub fn rewrite_args(args: Vec<OsString>) -> Vec<OsString> {
    let first_arg = match args.first() {
        None => return args,
        Some(first_arg) => first_arg.clone(),
    };

    // Don't use `std::env::current_exe`, because it may or may not resolve the
    // symlink. We want to preserve the symlink in our case.
    let exe_path = PathBuf::from(first_arg);
    let exe_name = match exe_path.file_name().and_then(|arg| arg.to_str()) {
        Some(exe_name) => exe_name,
        None => return args,
    };

    // On Windows, the first argument might be `lgit-add.exe` instead of just
    // `lgit-add`.
    let exe_name = match exe_name.strip_suffix(std::env::consts::EXE_SUFFIX) {
        Some(exe_name) => exe_name,
        None => exe_name,
    };

    match exe_name.strip_prefix("lgit-") {
        Some(subcommand) => {
            let mut new_args = vec![OsString::from("lgit"), OsString::from(subcommand)];
            new_args.extend(args.into_iter().skip(1));
            new_args
        }
        None => {
            let mut new_args = vec![OsString::from(exe_name)];
            new_args.extend(args.into_iter().skip(1));
            new_args
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_opts_are_valid() {
        Opts::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        let opts = Opts::parse_from(["lgit"]);
        assert_eq!(opts.command_or_default(), Command::Menu);

        let opts = Opts::parse_from(["lgit", "stage"]);
        assert_eq!(opts.command_or_default(), Command::Add);

        let opts = Opts::parse_from(["lgit", "-C", "/tmp", "--color", "never", "diff-file"]);
        assert_eq!(opts.command_or_default(), Command::DiffFile);
        assert_eq!(
            opts.global_args.working_directory,
            Some(PathBuf::from("/tmp"))
        );
        assert_eq!(opts.global_args.color, Some(ColorSetting::Never));

        assert!(Opts::try_parse_from(["lgit", "frobnicate"]).is_err());
    }

    #[test]
    fn test_rewrite_args() {
        assert_eq!(
            rewrite_args(vec![OsString::from("lgit")]),
            vec![OsString::from("lgit")]
        );
        assert_eq!(
            rewrite_args(vec![OsString::from("lgit-add")]),
            vec![OsString::from("lgit"), OsString::from("add")]
        );

        // Should only happen on Windows.
        if std::env::consts::EXE_SUFFIX == ".exe" {
            assert_eq!(
                rewrite_args(vec![OsString::from("lgit-add.exe")]),
                vec![OsString::from("lgit"), OsString::from("add")]
            );
        }

        assert_eq!(
            rewrite_args(vec![
                OsString::from("/usr/local/bin/lgit-checkout-branch"),
                OsString::from("--color"),
                OsString::from("never"),
            ]),
            vec![
                OsString::from("lgit"),
                OsString::from("checkout-branch"),
                OsString::from("--color"),
                OsString::from("never"),
            ]
        );
        assert_eq!(
            rewrite_args(vec![
                OsString::from("target/debug/lgit"),
                OsString::from("unstage"),
            ]),
            vec![OsString::from("lgit"), OsString::from("unstage")]
        );
    }
}
