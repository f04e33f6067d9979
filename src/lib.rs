//! Internal library crate for jls.
//!
//! The shipped application is the `jls` binary (`src/main.rs`).
//!
//! This library exists to share code between targets (binary, tests) and to keep modules organized.
//! This API is only used to build the `jls` binary and is not considered a library for external use.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use error::{JlsError, Result};
