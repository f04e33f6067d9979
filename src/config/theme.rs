//! Theme configuration options for jls.
//!
//! The `[theme]` table supplies the colour table used when the `LS_COLORS`
//! environment variable is not set, plus per-key overrides that apply on top
//! of whichever base table wins.

use crate::core::color::ColorTable;

use serde::Deserialize;

use std::collections::BTreeMap;

/// Theme configuration options
/// # Examples
/// ```toml
/// [theme]
/// ls_colors = "di=01;34:ln=01;36:*.rs=33"
/// [theme.colors]
/// ex = "01;31"
/// "*.md" = "35"
/// ```
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Theme {
    ls_colors: Option<String>,
    colors: BTreeMap<String, String>,
}

impl Theme {
    #[inline]
    pub fn ls_colors(&self) -> Option<&str> {
        self.ls_colors.as_deref()
    }

    /// Builds the colour table from `env` (the `LS_COLORS` value, if any),
    /// falling back to the configured `ls_colors`. Overrides from
    /// `[theme.colors]` are placed first so they take precedence.
    pub fn color_table(&self, env: Option<&str>) -> ColorTable {
        let base = env.or(self.ls_colors()).unwrap_or_default();

        let mut spec: Vec<String> = self
            .colors
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        spec.push(base.to_string());

        ColorTable::parse(&spec.join(":"))
    }
}
