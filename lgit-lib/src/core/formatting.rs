//! Formatting and output helpers.
//!
//! We try to handle both textual output and interactive output (output to a
//! "TTY"). In the case of interactive output, we render with prettier non-ASCII
//! characters and with colors, using shell-specific escape codes.

use std::fmt::Display;

use console::Style;

/// Glyphs and styles to use for rendering output.
#[derive(Clone, Debug)]
pub struct Glyphs {
    /// Whether or not ANSI escape codes should be emitted (e.g. to render
    /// color).
    pub should_write_ansi_escape_codes: bool,
}

impl Glyphs {
    /// Make the `Glyphs` object appropriate for `stdout`.
    pub fn detect() -> Self {
        if console::user_attended() && console::colors_enabled() {
            Glyphs::pretty()
        } else {
            Glyphs::text()
        }
    }

    /// Glyphs used for output to a text file or non-TTY.
    pub fn text() -> Self {
        Glyphs {
            should_write_ansi_escape_codes: false,
        }
    }

    /// Glyphs used for output to a TTY.
    pub fn pretty() -> Self {
        Glyphs {
            should_write_ansi_escape_codes: true,
        }
    }

    fn apply(&self, style: Style, text: impl Display) -> String {
        style
            .force_styling(self.should_write_ansi_escape_codes)
            .apply_to(text)
            .to_string()
    }

    /// Render text indicating an error.
    pub fn render_error(&self, text: impl Display) -> String {
        self.apply(Style::new().red().bright(), text)
    }

    /// Render a heading, such as a prompt question.
    pub fn render_heading(&self, text: impl Display) -> String {
        self.apply(Style::new().bold(), text)
    }

    /// Render a keyboard shortcut.
    pub fn render_key(&self, text: impl Display) -> String {
        self.apply(Style::new().cyan().bold(), text)
    }

    /// Render de-emphasized text, such as the commands that we run.
    pub fn render_dim(&self, text: impl Display) -> String {
        self.apply(Style::new().dim(), text)
    }
}
