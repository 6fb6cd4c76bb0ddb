//! Sub-commands of `lgit`.

mod checkout_branch;
mod checkout_file;
mod diff_file;
mod menu;
mod stage;
mod unstage;

use std::fmt::Write;

use lgit_invoke::CommandContext;
use lgit_opts::{rewrite_args, Command, Opts};
use lib::core::config::get_page_size;
use lib::core::effects::Effects;
use lib::core::item::SelectableItem;
use lib::git::{GitRunInfo, Repo};
use lib::util::{ExitCode, EyreExitOr};
use tracing::instrument;

pub use menu::Choice;

/// Exit code used when a prompt is needed but there's no terminal to show it on.
const NOT_INTERACTIVE_EXIT_CODE: ExitCode = ExitCode(1);

/// Run the given subcommand.
#[instrument]
fn run_command(
    effects: &Effects,
    git_run_info: &GitRunInfo,
    command: Command,
) -> EyreExitOr<()> {
    match command {
        Command::Menu => menu::menu(effects, git_run_info),
        Command::Add => stage::stage(effects, git_run_info),
        Command::Unstage => unstage::unstage(effects, git_run_info),
        Command::CheckoutBranch => checkout_branch::checkout_branch(effects, git_run_info),
        Command::CheckoutFile => checkout_file::checkout_file(effects, git_run_info),
        Command::DiffFile => diff_file::diff_file(effects, git_run_info),
    }
}

/// The number of rows to show in pickers: `lgit.prompt.pageSize` if set, and
/// otherwise whatever fits in the terminal.
fn get_prompt_page_size(repo: &Repo) -> eyre::Result<usize> {
    let page_size = get_page_size(repo)?.unwrap_or_else(lgit_prompt::default_page_size);
    Ok(page_size)
}

/// Fail with a message if we can't prompt the user.
fn check_interactive(effects: &Effects) -> EyreExitOr<()> {
    if lgit_prompt::is_interactive() {
        return Ok(Ok(()));
    }

    writeln!(
        effects.get_error_stream(),
        "{}",
        effects
            .get_glyphs()
            .render_error("Error: lgit needs a terminal to prompt for input.")
    )?;
    Ok(Err(NOT_INTERACTIVE_EXIT_CODE))
}

/// Offer `files` in a multi-select prompt.
///
/// Returns `None`, without prompting, if there are no files (after printing
/// `empty_message`), and also if the user cancels the prompt.
fn prompt_for_files(
    effects: &Effects,
    repo: &Repo,
    header: &str,
    files: Vec<String>,
    empty_message: &str,
) -> EyreExitOr<Option<Vec<String>>> {
    if files.is_empty() {
        writeln!(effects.get_output_stream(), "{empty_message}")?;
        return Ok(Ok(None));
    }
    if let Err(exit_code) = check_interactive(effects)? {
        return Ok(Err(exit_code));
    }

    let items: Vec<SelectableItem> = files.into_iter().map(SelectableItem::from_value).collect();
    let page_size = get_prompt_page_size(repo)?;
    let chosen = lgit_prompt::prompt_multi_select(header, &items, page_size)?;
    Ok(Ok(chosen.map(|items| items.into_iter().map(|item| item.value).collect())))
}

/// Run `git <command> -- <files>`, if any files were given.
fn run_on_files(
    effects: &Effects,
    git_run_info: &GitRunInfo,
    command: &[&str],
    files: Vec<String>,
) -> EyreExitOr<()> {
    if files.is_empty() {
        return Ok(Ok(()));
    }

    let args: Vec<String> = command
        .iter()
        .map(|arg| arg.to_string())
        .chain(std::iter::once("--".to_string()))
        .chain(files)
        .collect();
    git_run_info.run(effects, &args)
}

/// Show the state of the working copy after a command.
fn show_status(git_run_info: &GitRunInfo) -> EyreExitOr<()> {
    git_run_info.run_direct_no_wrapping(&["status"])
}

fn command_main(ctx: CommandContext, opts: Opts) -> EyreExitOr<()> {
    let CommandContext {
        effects,
        git_run_info,
    } = ctx;
    let command = opts.command_or_default();
    run_command(&effects, &git_run_info, command)
}

/// Execute the main process and exit with the appropriate exit code.
pub fn main() {
    // Install panic handler.
    color_eyre::install().expect("Could not install panic handler");
    let args: Vec<_> = std::env::args_os().collect();
    let args = rewrite_args(args);
    let exit_code =
        lgit_invoke::do_main_and_drop_locals(command_main, args).expect("A fatal error occurred");
    std::process::exit(exit_code);
}
