//! The main config loading module for jls.
//!
//! Handles loading and deserializing settings from `jls.toml`.
//!
//! Provides and manages the main [Config] struct, as well as the internal [RawConfig] used for parsing and processing.
//!
//! Also implements default config initialization through `jls --init`.

use crate::config::Theme;
use crate::config::{General, InternalGeneral};
use crate::core::color::ColorTable;
use crate::utils::get_home;

use serde::Deserialize;
use std::{fs, io, path::Path, path::PathBuf};

/// Raw configuration as read from the toml file
/// This struct is deserialized directly from the toml file.
/// It uses owned types and is then converted into the main [Config] struct.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RawConfig {
    general: General,
    theme: Theme,
}

/// Main configuration struct for jls
/// This struct holds the processed configuration options used by jls.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    general: InternalGeneral,
    theme: Theme,
}

/// Conversion from RawConfig to Config
/// This handles any necessary processing of the raw values
impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: InternalGeneral::from(raw.general),
            theme: raw.theme,
        }
    }
}

/// Public methods for loading and accessing the configuration
impl Config {
    /// Load configuration from the default path
    /// If the file does not exist or fails to parse, returns the default configuration.
    ///
    /// Called by entry point to load config at startup.
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, falling back to defaults like [Config::load].
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no jls.toml found, using internal defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "error parsing config: {}", e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot read config: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawConfig>(content).map(Config::from)
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &InternalGeneral {
        &self.general
    }

    #[inline]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The colour table for this run: `LS_COLORS` when set, the theme otherwise.
    pub fn color_table(&self) -> ColorTable {
        let env = std::env::var("LS_COLORS").ok();
        self.theme.color_table(env.as_deref())
    }

    /// Determine the default configuration file path.
    /// Checks the JLS_CONFIG environment variable first,
    /// Checks for XDG_CONFIG_HOME after,
    /// then defaults to ~/.config/jls/jls.toml,
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("JLS_CONFIG") {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("jls/jls.toml");
        }

        if let Some(home) = get_home() {
            return home.join(".config/jls/jls.toml");
        }
        PathBuf::from("jls.toml")
    }

    /// Generate a default configuration file at the specified path.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &Path) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {:?}", path),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_TOML)?;
        tracing::info!(path = %path.display(), "default config written");
        Ok(())
    }
}

const DEFAULT_TOML: &str = r##"# jls.toml - default configuration for jls

# Note:
# Commented values are the internal defaults of jls.

[general]
# color = "auto"            # "auto", "always" or "never"
# safe = "auto"             # shell-safe quoting of names
# sort = "ascend"           # "ascend" or "descend"
# case_insensitive = true
# follow_chain = false      # resolve symlink chains to the final target
# program_name = "jls"      # label of error messages
# test_name = "ls"          # label of error messages with --test

[theme]
# Used when the LS_COLORS environment variable is not set.
# ls_colors = "di=01;34:ln=01;36:ex=01;32"

# Applied on top of LS_COLORS or ls_colors.
# [theme.colors]
# "*.rs" = "33"
"##;
