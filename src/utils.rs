//! Miscellaneous utility functions for jls.
//!
//! - [cli]: the clap command-line parser.
//! - [helpers]: home directory lookup and error line formatting.

pub mod cli;
pub mod helpers;

pub use helpers::{error_line, get_home};
