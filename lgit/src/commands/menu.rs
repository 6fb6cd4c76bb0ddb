//! The menu shown when `lgit` is run without a subcommand.

use std::fmt::Write;

use lgit_opts::Command;
use lib::core::effects::Effects;
use lib::git::GitRunInfo;
use lib::try_exit_code;
use lib::util::EyreExitOr;
use tracing::instrument;

use super::{check_interactive, run_command};

/// An entry of the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    /// Stage files.
    Add,

    /// Unstage files.
    Unstage,

    /// Check out a recent branch.
    CheckoutBranch,

    /// Discard changes to files.
    CheckoutFile,

    /// Diff a file.
    DiffFile,

    /// Do nothing.
    Quit,
}

impl Choice {
    /// All choices, in the order they're listed.
    pub const ALL: [Choice; 6] = [
        Choice::Add,
        Choice::Unstage,
        Choice::CheckoutBranch,
        Choice::CheckoutFile,
        Choice::DiffFile,
        Choice::Quit,
    ];

    /// The key which selects this choice.
    pub fn key(&self) -> char {
        match self {
            Choice::Add => 'a',
            Choice::Unstage => 'u',
            Choice::CheckoutBranch => 'c',
            Choice::CheckoutFile => 'x',
            Choice::DiffFile => 'd',
            Choice::Quit => 'q',
        }
    }

    /// The description shown in the menu.
    pub fn label(&self) -> &'static str {
        match self {
            Choice::Add => "Add",
            Choice::Unstage => "Unstage",
            Choice::CheckoutBranch => "Checkout branch",
            Choice::CheckoutFile => "Checkout file",
            Choice::DiffFile => "Diff file",
            Choice::Quit => "Quit",
        }
    }

    /// Look up the choice selected by `key`.
    pub fn from_key(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|choice| choice.key() == key)
    }

    /// The subcommand to run for this choice, if any.
    pub fn command(&self) -> Option<Command> {
        match self {
            Choice::Add => Some(Command::Add),
            Choice::Unstage => Some(Command::Unstage),
            Choice::CheckoutBranch => Some(Command::CheckoutBranch),
            Choice::CheckoutFile => Some(Command::CheckoutFile),
            Choice::DiffFile => Some(Command::DiffFile),
            Choice::Quit => None,
        }
    }
}

/// Print the choices, wait for one of their keys, and run the chosen command.
#[instrument]
pub fn menu(effects: &Effects, git_run_info: &GitRunInfo) -> EyreExitOr<()> {
    let glyphs = effects.get_glyphs();
    writeln!(effects.get_output_stream(), "choices:")?;
    for choice in Choice::ALL {
        writeln!(
            effects.get_output_stream(),
            "\t{}: {}",
            glyphs.render_key(choice.key()),
            choice.label()
        )?;
    }
    try_exit_code!(check_interactive(effects)?);

    let keys: Vec<char> = Choice::ALL.iter().map(Choice::key).collect();
    let key = match lgit_prompt::prompt_choice_key(
        &glyphs.render_heading("what do you want to do?"),
        &keys,
    )? {
        Some(key) => key,
        None => return Ok(Ok(())),
    };
    let choice =
        Choice::from_key(key).ok_or_else(|| eyre::eyre!("No menu entry for key: {key:?}"))?;

    match choice.command() {
        Some(command) => run_command(effects, git_run_info, command),
        None => Ok(Ok(())),
    }
}
