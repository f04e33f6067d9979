//! Helpers for jls.
//!
//! Small utilities used by the config loader and the entry point:
//! - Locating the home directory
//! - Formatting the one-line error report printed for a failed path

use std::fmt::Display;
use std::path::PathBuf;

/// The user's home directory, if it can be determined.
pub fn get_home() -> Option<PathBuf> {
    dirs::home_dir()
}

/// One stderr line for a failed path, e.g. `ls: cannot access 'x': ...`.
pub fn error_line(program: &str, err: &dyn Display) -> String {
    format!("{}: {}", program, err)
}
