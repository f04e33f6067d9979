//! Terminal detection for jls.
//!
//! Decides whether stdout is interactive and how wide it is. The width only
//! matters for colour bleed suppression in [crate::core::lister].

use std::io::{self, IsTerminal};

/// Width assumed when neither the terminal nor `COLUMNS` can tell us.
pub const DEFAULT_TERM_WIDTH: usize = 80;

#[inline]
pub fn stdout_is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Queries the width of the terminal attached to stdout.
///
/// Falls back to the `COLUMNS` environment variable, then [DEFAULT_TERM_WIDTH].
pub fn terminal_width() -> usize {
    let queried = if stdout_is_terminal() {
        crossterm::terminal::size().ok().map(|(cols, _)| cols)
    } else {
        None
    };
    let columns = std::env::var("COLUMNS").ok();
    resolve_width(queried, columns.as_deref())
}

/// Picks the first usable width out of a terminal query and a `COLUMNS` value.
/// Zero is never usable.
pub fn resolve_width(queried: Option<u16>, columns: Option<&str>) -> usize {
    if let Some(cols) = queried
        && cols > 0
    {
        return cols as usize;
    }
    columns
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|&c| c > 0)
        .unwrap_or(DEFAULT_TERM_WIDTH)
}
