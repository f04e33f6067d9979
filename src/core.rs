//! Core listing engine for jls.
//!
//! This module contains the pieces between a path and a rendered line:
//! - [fm]: metadata resolution of one path into an [Entry], symlink targets included.
//! - [color]: LS_COLORS-style classification and the [ColorTable].
//! - [quote]: shell-safe quoting of names and targets.
//! - [formatter]: per-field formatting, column alignment and name ordering.
//! - [lister]: the two-pass directory renderer ([Lister]).
//! - [terminal]: tty detection and terminal width.
//!
//! Most callers will import [Lister], [ListingOptions] and [ColorTable] from this module.

pub mod color;
pub mod fm;
pub mod formatter;
pub mod lister;
pub mod quote;
pub mod terminal;

pub use color::{ColorKey, ColorTable, ColorView, DEFAULT_COLORS};
pub use fm::{AccessMode, Entry, EntryType, Permission, TargetInfo, read_dir_names, resolve};
pub use formatter::{
    AlignmentWidths, EntryFields, Formatter, SortOrder, format_device, format_group,
    format_owner, format_permissions, format_size, format_time,
};
pub use lister::{Lister, ListingOptions};
pub use quote::{Quoting, SafeRender, make_safe, needs_quoting, quoting_for};
pub use terminal::{stdout_is_terminal, terminal_width};
