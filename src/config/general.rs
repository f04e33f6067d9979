//! The general configuration settings for jls.
//!
//! This module defines the [General] struct for deserializing the `[general]`
//! table of jls.toml and the [InternalGeneral] struct used at runtime, where
//! the program labels are already validated.

use crate::core::formatter::SortOrder;

use serde::Deserialize;

/// Tri-state switch for settings that follow the terminal by default.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    #[default]
    Auto,
    Always,
    Never,
}

impl Toggle {
    /// Final on/off value. A command-line flag beats the config file, and
    /// `Auto` follows whether stdout is a terminal.
    pub fn resolve(self, cli: Option<bool>, is_tty: bool) -> bool {
        match (cli, self) {
            (Some(flag), _) => flag,
            (None, Toggle::Always) => true,
            (None, Toggle::Never) => false,
            (None, Toggle::Auto) => is_tty,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct General {
    color: Toggle,
    safe: Toggle,
    sort: SortOrder,
    case_insensitive: bool,
    follow_chain: bool,
    program_name: String,
    test_name: String,
}

impl Default for General {
    fn default() -> Self {
        General {
            color: Toggle::Auto,
            safe: Toggle::Auto,
            sort: SortOrder::Ascend,
            case_insensitive: true,
            follow_chain: false,
            program_name: DEFAULT_PROGRAM_NAME.to_string(),
            test_name: DEFAULT_TEST_NAME.to_string(),
        }
    }
}

/// Label used in error messages.
pub const DEFAULT_PROGRAM_NAME: &str = "jls";
/// Label used in error messages while test mode is on.
pub const DEFAULT_TEST_NAME: &str = "ls";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalGeneral {
    color: Toggle,
    safe: Toggle,
    sort: SortOrder,
    case_insensitive: bool,
    follow_chain: bool,
    program_name: String,
    test_name: String,
}

impl From<General> for InternalGeneral {
    fn from(g: General) -> Self {
        Self {
            color: g.color,
            safe: g.safe,
            sort: g.sort,
            case_insensitive: g.case_insensitive,
            follow_chain: g.follow_chain,
            program_name: non_blank_label(g.program_name, DEFAULT_PROGRAM_NAME),
            test_name: non_blank_label(g.test_name, DEFAULT_TEST_NAME),
        }
    }
}

impl Default for InternalGeneral {
    fn default() -> Self {
        General::default().into()
    }
}

impl InternalGeneral {
    #[inline]
    pub fn color(&self) -> Toggle {
        self.color
    }

    #[inline]
    pub fn safe(&self) -> Toggle {
        self.safe
    }

    #[inline]
    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    #[inline]
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    #[inline]
    pub fn follow_chain(&self) -> bool {
        self.follow_chain
    }

    #[inline]
    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    #[inline]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }
}

/// Blank labels would produce error lines starting with `: `.
fn non_blank_label(label: String, fallback: &str) -> String {
    if label.trim().is_empty() {
        tracing::warn!(fallback, "blank program label in config, using default");
        fallback.to_string()
    } else {
        label
    }
}
