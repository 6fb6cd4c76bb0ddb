//! Items that can be presented in an interactive picker.

use std::fmt::Display;

/// An entry in a selection prompt: what the user sees, and what we pass back
/// to Git once it has been chosen.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectableItem {
    /// The text rendered in the prompt.
    pub label: String,

    /// The underlying path or branch name.
    pub value: String,
}

impl SelectableItem {
    /// An item whose label is the value itself, such as a file path.
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }

    /// An item displayed differently from its underlying value.
    pub fn with_label(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl Display for SelectableItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}
