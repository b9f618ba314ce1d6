//! ui::output
//!
//! Output formatting and styling.
//!
//! # Design
//!
//! Styling is off unless `--color` (or `color = true` in the config file) is
//! given. Every helper takes the `color` switch explicitly and returns plain
//! text when it is off, so tests see unstyled strings.

use std::fmt::Display;

use nu_ansi_term::{Color, Style};

/// Bold text.
pub fn bold(text: impl Display, color: bool) -> String {
    paint(Style::new().bold(), text, color)
}

/// Italic text, used for argument placeholders in usage lines.
pub fn italic(text: impl Display, color: bool) -> String {
    paint(Style::new().italic(), text, color)
}

/// Format an error line.
pub fn error(message: impl Display, color: bool) -> String {
    format!("{} {}", paint(Color::Red.bold(), "Error:", color), message)
}

/// Format a warning line.
pub fn warning(message: impl Display, color: bool) -> String {
    format!("{} {}", paint(Color::Yellow.bold(), "Warning:", color), message)
}

fn paint(style: Style, text: impl Display, color: bool) -> String {
    if color {
        style.paint(text.to_string()).to_string()
    } else {
        text.to_string()
    }
}
