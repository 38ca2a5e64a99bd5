//! Terminal styling.
//!
//! ANSI helpers for the plain stdout messages printed outside the TUI, and
//! the ratatui palette the views draw with.

use crate::core::BranchStatus;
use ratatui::style::{Color, Modifier, Style};

/// ANSI escape code for bold text.
pub const BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
pub const RESET: &str = "\x1b[0m";

/// Wraps text in bold styling.
pub fn bold(text: &str) -> String {
    format!("{BOLD}{text}{RESET}")
}

pub fn title() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

/// The row under the cursor.
pub fn cursor() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn success() -> Style {
    Style::default().fg(Color::Green)
}

pub fn warning() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn error() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

pub fn key() -> Style {
    Style::default().fg(Color::Cyan)
}

/// Banner shown while delete mode is armed.
pub fn danger() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

/// Dot color for a branch row.
pub fn status(status: BranchStatus) -> Style {
    match status {
        BranchStatus::Ok | BranchStatus::Updated => success(),
        BranchStatus::Behind => warning(),
        BranchStatus::Conflict => Style::default().fg(Color::Red),
        BranchStatus::Deleted => dim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_wraps_text() {
        assert_eq!(bold("gitsync"), "\x1b[1mgitsync\x1b[0m");
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status(BranchStatus::Behind).fg, Some(Color::Yellow));
        assert_eq!(status(BranchStatus::Conflict).fg, Some(Color::Red));
        assert_eq!(status(BranchStatus::Updated), success());
    }
}
