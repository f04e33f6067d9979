//! Sorting and per-field formatting of entries for jls.
//!
//! The [Formatter] struct holds the name ordering rules from the jls.toml
//! configuration. The free functions turn one [Entry] into the plain-text
//! columns of a long listing line, and [AlignmentWidths] tracks how wide each
//! padded column has to be.

use crate::core::fm::{AccessMode, Entry, EntryType, Permission};

use chrono::{DateTime, Local, TimeDelta};
use nix::unistd::{Gid, Group, Uid, User};
use serde::Deserialize;
use unicode_width::UnicodeWidthStr;

use std::ffi::OsString;
use std::time::SystemTime;

/// Half of an average Gregorian year, in seconds.
/// Older timestamps show the year instead of the time of day.
pub const RECENT_WINDOW_SECS: i64 = 31_556_952 / 2;

/// Direction names are sorted in.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascend,
    Descend,
}

/// Formatter struct to handle the ordering of directory children
/// based on user preferences.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    order: SortOrder,
    case_insensitive: bool,
}

impl Formatter {
    pub fn new(order: SortOrder, case_insensitive: bool) -> Self {
        Self {
            order,
            case_insensitive,
        }
    }

    /// Sorts the given names in place according to the formatter's settings.
    /// Case-insensitive ordering falls back to byte order for ties, so the
    /// result is total and stable across runs.
    pub fn sort_names(&self, names: &mut [OsString]) {
        names.sort_by(|a, b| {
            let cmp = if self.case_insensitive {
                a.to_string_lossy()
                    .to_lowercase()
                    .cmp(&b.to_string_lossy().to_lowercase())
                    .then_with(|| a.cmp(b))
            } else {
                a.cmp(b)
            };
            match self.order {
                SortOrder::Ascend => cmp,
                SortOrder::Descend => cmp.reverse(),
            }
        });
    }
}

/// Plain-text columns of one listing line, before padding and colouring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFields {
    pub type_char: char,
    pub permissions: String,
    pub links: String,
    pub owner: String,
    pub group: String,
    pub size: String,
    pub time: String,
}

impl EntryFields {
    pub fn new(entry: &Entry, now: SystemTime) -> Self {
        EntryFields {
            type_char: entry.kind().as_char(),
            permissions: format_permissions(entry.access(), entry.kind()),
            links: entry.links().to_string(),
            owner: format_owner(entry.uid()),
            group: format_group(entry.gid()),
            size: format_size(entry),
            time: format_time(entry.modified(), now),
        }
    }
}

/// Display widths of the padded columns of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentWidths {
    pub links: usize,
    pub owner: usize,
    pub group: usize,
    pub size: usize,
}

/// Widths used when no alignment pass has been run (single-file listings).
impl Default for AlignmentWidths {
    fn default() -> Self {
        AlignmentWidths {
            links: 2,
            owner: 0,
            group: 0,
            size: 4,
        }
    }
}

impl AlignmentWidths {
    pub fn zero() -> Self {
        AlignmentWidths {
            links: 0,
            owner: 0,
            group: 0,
            size: 0,
        }
    }

    /// Widens every column to fit `fields`.
    pub fn fold(&mut self, fields: &EntryFields) {
        self.links = self.links.max(fields.links.width());
        self.owner = self.owner.max(fields.owner.width());
        self.group = self.group.max(fields.group.width());
        self.size = self.size.max(fields.size.width());
    }

    pub fn measure<'a>(fields: impl IntoIterator<Item = &'a EntryFields>) -> Self {
        let mut widths = AlignmentWidths::zero();
        for f in fields {
            widths.fold(f);
        }
        widths
    }
}

/// Formats the nine permission characters of `access`.
///
/// The execute slot of the owner and group shows `s`/`S` for setuid/setgid
/// regular files; the one of others shows `t`/`T` for sticky directories.
pub fn format_permissions(access: &AccessMode, kind: EntryType) -> String {
    let mut out = String::with_capacity(9);
    let groups = [
        (&access.owner, kind == EntryType::File, 's'),
        (&access.group, kind == EntryType::File, 's'),
        (&access.other, kind == EntryType::Directory, 't'),
    ];
    for (perm, shows_special, letter) in groups {
        push_triplet(&mut out, perm, shows_special, letter);
    }
    out
}

fn push_triplet(out: &mut String, perm: &Permission, shows_special: bool, letter: char) {
    out.push(if perm.read { 'r' } else { '-' });
    out.push(if perm.write { 'w' } else { '-' });
    out.push(match (shows_special && perm.special, perm.execute) {
        (true, true) => letter,
        (true, false) => letter.to_ascii_uppercase(),
        (false, true) => 'x',
        (false, false) => '-',
    });
}

/// Owner name from the passwd database, or the numeric id.
pub fn format_owner(uid: u32) -> String {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

/// Group name from the group database, or the numeric id.
pub fn format_group(gid: u32) -> String {
    match Group::from_gid(Gid::from_raw(gid)) {
        Ok(Some(group)) => group.name,
        _ => gid.to_string(),
    }
}

/// Byte size, or `major, minor` for device nodes.
pub fn format_size(entry: &Entry) -> String {
    if entry.kind().is_device() {
        format_device(entry.rdev())
    } else {
        entry.size().to_string()
    }
}

pub fn format_device(rdev: u64) -> String {
    use nix::sys::stat::{major, minor};
    format!("{}, {}", major(rdev), minor(rdev))
}

/// Formats a modification time relative to `now`.
/// Recent times show the hour and minute, old or future ones the year.
pub fn format_time(modified: SystemTime, now: SystemTime) -> String {
    let then: DateTime<Local> = DateTime::from(modified);
    let now: DateTime<Local> = DateTime::from(now);
    let age = now.signed_duration_since(then);

    if age > TimeDelta::seconds(RECENT_WINDOW_SECS) || age < TimeDelta::zero() {
        then.format("%b %e  %Y").to_string()
    } else {
        then.format("%b %e %H:%M").to_string()
    }
}

/// Right-justifies `text` to `width` display columns.
pub fn pad_left(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    let mut out = String::with_capacity(text.len() + pad);
    out.extend(std::iter::repeat_n(' ', pad));
    out.push_str(text);
    out
}

/// Left-justifies `text` to `width` display columns.
pub fn pad_right(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    let mut out = String::with_capacity(text.len() + pad);
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', pad));
    out
}

/// Formatter tests
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const PERM_CHARS: &[char] = &['r', 'w', 'x', '-', 's', 'S', 't', 'T'];

    #[test]
    fn permission_strings() {
        let cases = [
            (0o644, EntryType::File, "rw-r--r--"),
            (0o755, EntryType::Directory, "rwxr-xr-x"),
            (0o4755, EntryType::File, "rwsr-xr-x"),
            (0o4644, EntryType::File, "rwSr--r--"),
            (0o2755, EntryType::File, "rwxr-sr-x"),
            (0o2745, EntryType::File, "rwxr-Sr-x"),
            (0o1777, EntryType::Directory, "rwxrwxrwt"),
            (0o1776, EntryType::Directory, "rwxrwxrwT"),
            // Special bits only show where they mean something.
            (0o1777, EntryType::File, "rwxrwxrwx"),
            (0o4755, EntryType::Directory, "rwxr-xr-x"),
        ];
        for (mode, kind, expected) in cases {
            assert_eq!(
                format_permissions(&AccessMode::from_mode(mode), kind),
                expected,
                "mode {:o} kind {:?}",
                mode,
                kind
            );
        }
    }

    #[test]
    fn permission_strings_are_always_nine_known_chars() {
        let kinds = [
            EntryType::File,
            EntryType::Directory,
            EntryType::Symlink,
            EntryType::CharDevice,
        ];
        for mode in (0..0o7777u32).step_by(7) {
            for kind in kinds {
                let perms = format_permissions(&AccessMode::from_mode(mode), kind);
                assert_eq!(perms.chars().count(), 9);
                assert!(perms.chars().all(|c| PERM_CHARS.contains(&c)), "{}", perms);
            }
        }
    }

    #[test]
    fn unknown_ids_fall_back_to_numbers() {
        assert_eq!(format_owner(3_999_999_999), "3999999999");
        assert_eq!(format_group(3_999_999_998), "3999999998");
    }

    #[test]
    fn recent_and_old_timestamps() {
        let now = SystemTime::now();
        let recent = format_time(now - Duration::from_secs(3600), now);
        assert!(recent.contains(':'), "{}", recent);

        let old = format_time(now - Duration::from_secs(400 * 24 * 3600), now);
        assert!(!old.contains(':'), "{}", old);
        assert!(old.contains("  "), "{}", old);

        let future = format_time(now + Duration::from_secs(3600), now);
        assert!(!future.contains(':'), "{}", future);
    }

    #[test]
    fn padding_uses_display_width() {
        assert_eq!(pad_left("7", 3), "  7");
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_right("日本", 5), "日本 ");
        assert_eq!(pad_left("toolong", 2), "toolong");
    }

    #[test]
    fn alignment_is_the_maximum_of_each_column() {
        let a = EntryFields {
            type_char: '-',
            permissions: "rw-r--r--".into(),
            links: "1".into(),
            owner: "root".into(),
            group: "wheel".into(),
            size: "123456".into(),
            time: String::new(),
        };
        let b = EntryFields {
            links: "12".into(),
            owner: "alice".into(),
            group: "g".into(),
            size: "0".into(),
            ..a.clone()
        };
        let widths = AlignmentWidths::measure([&a, &b]);
        assert_eq!(
            widths,
            AlignmentWidths {
                links: 2,
                owner: 5,
                group: 5,
                size: 6
            }
        );
        assert_eq!(AlignmentWidths::default().links, 2);
        assert_eq!(AlignmentWidths::default().size, 4);
    }

    #[test]
    fn sort_orders() {
        let mut names: Vec<OsString> = ["beta", "Alpha", "alpha", "Gamma"]
            .iter()
            .map(OsString::from)
            .collect();

        Formatter::new(SortOrder::Ascend, true).sort_names(&mut names);
        assert_eq!(names, ["Alpha", "alpha", "beta", "Gamma"]);

        Formatter::new(SortOrder::Ascend, false).sort_names(&mut names);
        assert_eq!(names, ["Alpha", "Gamma", "alpha", "beta"]);

        Formatter::new(SortOrder::Descend, false).sort_names(&mut names);
        assert_eq!(names, ["beta", "alpha", "Gamma", "Alpha"]);
    }

    #[test]
    fn device_numbers() {
        // makedev(8, 1) on Linux.
        assert_eq!(format_device(0x0801), "8, 1");
    }

    #[test]
    fn char_device_size_is_right_aligned() -> Result<(), Box<dyn std::error::Error>> {
        let entry = crate::core::fm::resolve(std::path::Path::new("/dev/null"), false)?;
        assert_eq!(entry.kind(), EntryType::CharDevice);

        let fields = EntryFields::new(&entry, SystemTime::now());
        assert_eq!(fields.type_char, 'c');
        assert_eq!(fields.size, "1, 3");

        let mut widths = AlignmentWidths::zero();
        widths.fold(&fields);
        widths.size = widths.size.max("123456".width());
        assert_eq!(pad_left(&fields.size, widths.size), "  1, 3");
        Ok(())
    }
}
