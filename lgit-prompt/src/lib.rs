//! Interactive prompts: pickers over files and branches, and the single
//! keypress menu.

#![warn(missing_docs)]
#![warn(
    clippy::all,
    clippy::as_conversions,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro
)]
#![allow(clippy::too_many_arguments, clippy::blocks_in_conditions)]

use std::io::{self, IsTerminal};

use console::{Key, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{MultiSelect, Select};
use eyre::Context;
use lib::core::item::SelectableItem;
use tracing::instrument;

/// Number of rows used when the terminal size can't be determined.
const FALLBACK_TERMINAL_HEIGHT: u16 = 24;

/// Whether we're attached to a terminal that we can prompt on: keys are read
/// from stdin and the prompt is drawn on stderr.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && Term::stderr().is_term()
}

fn page_size_for_height(rows: u16) -> usize {
    usize::from(rows.saturating_sub(2)).max(1)
}

/// The number of items to show at once in a picker: the height of the terminal
/// minus two rows for the prompt and the cursor line.
pub fn default_page_size() -> usize {
    let rows = match Term::stderr().size_checked() {
        Some((rows, _cols)) => rows,
        None => FALLBACK_TERMINAL_HEIGHT,
    };
    page_size_for_height(rows)
}

/// Prompt the user to choose any number of the provided items. Space toggles an
/// item and enter submits.
///
/// Returns `None` if the user cancelled the prompt (with `q` or escape), and
/// otherwise the chosen items in their original order (possibly none).
#[instrument(skip(items))]
pub fn prompt_multi_select(
    header: &str,
    items: &[SelectableItem],
    page_size: usize,
) -> eyre::Result<Option<Vec<SelectableItem>>> {
    let theme = ColorfulTheme::default();
    let selection = MultiSelect::with_theme(&theme)
        .with_prompt(header)
        .items(items)
        .max_length(page_size)
        .interact_on_opt(&Term::stderr())
        .wrap_err("Prompting for items")?;
    let selection = selection.map(|indices| {
        indices
            .into_iter()
            .filter_map(|index| items.get(index).cloned())
            .collect()
    });
    Ok(selection)
}

/// Prompt the user to choose exactly one of the provided items, starting with
/// the cursor on the first one.
///
/// Returns `None` if the user cancelled the prompt.
#[instrument(skip(items))]
pub fn prompt_select(
    header: &str,
    items: &[SelectableItem],
    page_size: usize,
) -> eyre::Result<Option<SelectableItem>> {
    let theme = ColorfulTheme::default();
    let selection = Select::with_theme(&theme)
        .with_prompt(header)
        .items(items)
        .default(0)
        .max_length(page_size)
        .interact_on_opt(&Term::stderr())
        .wrap_err("Prompting for item")?;
    Ok(selection.and_then(|index| items.get(index).cloned()))
}

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Chosen(char),
    Cancelled,
    Ignored,
}

fn classify_key(key: &Key, keys: &[char]) -> KeyOutcome {
    match key {
        Key::Char('\x03') | Key::Escape => KeyOutcome::Cancelled,
        Key::Char(c) if keys.contains(c) => KeyOutcome::Chosen(*c),
        _ => KeyOutcome::Ignored,
    }
}

/// Ask `question` and wait for the user to press one of `keys`. Other keys are
/// ignored. Returns `None` if the user pressed escape or Ctrl-C instead.
#[instrument]
pub fn prompt_choice_key(question: &str, keys: &[char]) -> eyre::Result<Option<char>> {
    let term = Term::stderr();
    term.write_str(&format!("{question} "))?;
    term.flush()?;

    loop {
        let key = match term.read_key() {
            Ok(key) => key,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                term.write_line("")?;
                return Ok(None);
            }
            Err(err) => return Err(err).wrap_err("Reading keypress"),
        };
        match classify_key(&key, keys) {
            KeyOutcome::Chosen(c) => {
                term.write_line(&c.to_string())?;
                return Ok(Some(c));
            }
            KeyOutcome::Cancelled => {
                term.write_line("")?;
                return Ok(None);
            }
            KeyOutcome::Ignored => continue,
        }
    }
}
