//! LS_COLORS-style colour classification for jls.
//!
//! An entry (or a symlink's target) is first mapped to a [ColorKey] by a fixed
//! precedence of rules, then the key is looked up in a [ColorTable]: the
//! runtime-loaded entries first, the built-in [DEFAULT_COLORS] second.

use crate::core::fm::{AccessMode, Entry, EntryType, TargetInfo};
use crate::error::{JlsError, Result};

use phf::phf_map;

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

/// Built-in SGR codes, used for any key the loaded table does not define.
pub static DEFAULT_COLORS: phf::Map<&'static str, &'static str> = phf_map! {
    "rs" => "0",
    "no" => "0",
    "fi" => "0",
    "di" => "01;34",
    "ln" => "01;36",
    "mh" => "0",
    "pi" => "33",
    "so" => "01;35",
    "do" => "01;35",
    "bd" => "01;33",
    "cd" => "01;33",
    "or" => "0",
    "mi" => "0",
    "su" => "37;41",
    "sg" => "30;43",
    "ca" => "30;41",
    "tw" => "30;42",
    "ow" => "34;42",
    "st" => "37;44",
    "ex" => "01;32",
};

/// Symbolic colour class of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorKey {
    Reset,
    RegularFile,
    Directory,
    Symlink,
    Fifo,
    Socket,
    BlockDevice,
    CharDevice,
    MissingTarget,
    MissingFile,
    Setuid,
    Setgid,
    StickyOtherWritable,
    OtherWritable,
    Sticky,
    Executable,
    /// A loaded `*<suffix>` rule, holding the key as configured.
    Pattern(String),
}

impl ColorKey {
    /// The two-letter LS_COLORS code, or the pattern itself.
    pub fn code(&self) -> &str {
        match self {
            ColorKey::Reset => "rs",
            ColorKey::RegularFile => "fi",
            ColorKey::Directory => "di",
            ColorKey::Symlink => "ln",
            ColorKey::Fifo => "pi",
            ColorKey::Socket => "so",
            ColorKey::BlockDevice => "bd",
            ColorKey::CharDevice => "cd",
            ColorKey::MissingTarget => "or",
            ColorKey::MissingFile => "mi",
            ColorKey::Setuid => "su",
            ColorKey::Setgid => "sg",
            ColorKey::StickyOtherWritable => "tw",
            ColorKey::OtherWritable => "ow",
            ColorKey::Sticky => "st",
            ColorKey::Executable => "ex",
            ColorKey::Pattern(key) => key,
        }
    }
}

/// The facts the classifier needs about one coloured name.
#[derive(Debug, Clone, Copy)]
pub struct ColorView<'a> {
    pub kind: EntryType,
    pub access: AccessMode,
    pub name: &'a OsStr,
    /// Only consulted for symlinks.
    pub target_exists: bool,
}

impl<'a> From<&'a Entry> for ColorView<'a> {
    fn from(entry: &'a Entry) -> Self {
        ColorView {
            kind: entry.kind(),
            access: *entry.access(),
            name: entry.name(),
            target_exists: entry.target().is_some_and(TargetInfo::exists),
        }
    }
}

impl TargetInfo {
    /// View of the resolved target, `None` when the link is dangling.
    pub fn color_view(&self) -> Option<ColorView<'_>> {
        self.resolved().map(|(kind, access)| ColorView {
            kind,
            access,
            name: self.name(),
            // A one-hop target that is itself a link was reachable.
            target_exists: true,
        })
    }
}

/// Runtime colour table parsed from an LS_COLORS-style string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    entries: Vec<(String, String)>,
}

impl ColorTable {
    pub fn parse(spec: &str) -> Self {
        let mut table = ColorTable::default();
        table.load(spec);
        table
    }

    /// Replaces the whole table with the items of `spec`.
    ///
    /// `spec` is a `:`-separated list of `key=value` items where every value
    /// is a `;`-separated list of decimal SGR codes. An item without a value
    /// takes the built-in value for its key; items that have neither, or that
    /// carry a malformed value, are dropped.
    pub fn load(&mut self, spec: &str) {
        let mut entries = Vec::new();

        for item in spec.split(':').filter(|item| !item.is_empty()) {
            let (key, value) = match item.split_once('=') {
                Some((key, value)) => (key, value),
                None => (item, ""),
            };
            if key.is_empty() {
                tracing::debug!(item, "dropping colour item without a key");
                continue;
            }

            let value = if value.is_empty() {
                match DEFAULT_COLORS.get(key) {
                    Some(default) => *default,
                    None => {
                        tracing::debug!(key, "dropping colour key without value or default");
                        continue;
                    }
                }
            } else if is_sgr(value) {
                value
            } else {
                tracing::debug!(key, value, "dropping malformed colour value");
                continue;
            };

            entries.push((key.to_string(), value.to_string()));
        }

        tracing::debug!(count = entries.len(), "colour table loaded");
        self.entries = entries;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks the colour key for `view`. The first matching rule wins.
    pub fn classify_key(&self, view: &ColorView<'_>) -> ColorKey {
        let access = &view.access;

        match view.kind {
            EntryType::Symlink if !view.target_exists => return ColorKey::MissingTarget,
            EntryType::Symlink => return ColorKey::Symlink,
            EntryType::Socket => return ColorKey::Socket,
            EntryType::Fifo => return ColorKey::Fifo,
            EntryType::BlockDevice => return ColorKey::BlockDevice,
            EntryType::CharDevice => return ColorKey::CharDevice,
            EntryType::Directory => {
                return match (access.other.special, access.other.write) {
                    (true, true) => ColorKey::StickyOtherWritable,
                    (false, true) => ColorKey::OtherWritable,
                    (true, false) => ColorKey::Sticky,
                    (false, false) => ColorKey::Directory,
                };
            }
            EntryType::File if access.owner.special => return ColorKey::Setuid,
            EntryType::File if access.group.special => return ColorKey::Setgid,
            _ => {}
        }

        if let Some(key) = self.match_suffix(view.name) {
            return ColorKey::Pattern(key.to_string());
        }

        if access.any_execute() {
            ColorKey::Executable
        } else {
            ColorKey::RegularFile
        }
    }

    /// Raw SGR codes for `key`.
    ///
    /// # Returns
    /// [JlsError::NoAnsi] when neither the loaded table nor the defaults know
    /// the key.
    pub fn ansi_for(&self, key: &ColorKey) -> Result<&str> {
        let code = key.code();
        self.entries
            .iter()
            .find(|(k, _)| k == code)
            .map(|(_, v)| v.as_str())
            .or_else(|| DEFAULT_COLORS.get(code).copied())
            .ok_or_else(|| JlsError::NoAnsi(code.to_string()))
    }

    /// Full escape sequence selecting the colour of `key`.
    pub fn escape_for(&self, key: &ColorKey) -> Result<String> {
        Ok(format!("\x1b[{}m", self.ansi_for(key)?))
    }

    /// Escape sequence restoring the default rendition.
    pub fn reset(&self) -> Result<String> {
        self.escape_for(&ColorKey::Reset)
    }

    /// First loaded `*<suffix>` key whose suffix ends `name`.
    fn match_suffix(&self, name: &OsStr) -> Option<&str> {
        let name = name.as_bytes();
        self.entries.iter().map(|(k, _)| k.as_str()).find(|key| {
            key.len() >= 2
                && key
                    .strip_prefix('*')
                    .is_some_and(|suffix| name.ends_with(suffix.as_bytes()))
        })
    }
}

/// True for a non-empty `;`-separated list of decimal codes.
fn is_sgr(value: &str) -> bool {
    value
        .split(';')
        .all(|code| !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()))
}
