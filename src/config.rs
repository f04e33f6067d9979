//! Configuration for jls.
//!
//! - [load]: the [Config] struct, jls.toml lookup and `--init` generation.
//! - [general]: the `[general]` table ([General], [InternalGeneral], [Toggle]).
//! - [theme]: the `[theme]` table and colour table selection ([Theme]).

pub mod general;
pub mod load;
pub mod theme;

pub use general::{General, InternalGeneral, Toggle};
pub use load::Config;
pub use theme::Theme;
