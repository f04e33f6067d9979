//! Shell-safe quoting of names and symlink targets.
//!
//! [make_safe] picks the lightest quoting that keeps a name unambiguous when
//! pasted into a POSIX shell. [SafeRender] records, per listing, whether any
//! name or target needed it.

use crate::core::fm::Entry;
use crate::error::{JlsError, Result};

use bitflags::bitflags;

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};

/// Longest quoted string [make_safe] will produce.
pub const QUOTED_MAX_LEN: usize = 64 * 1024;

/// Characters a shell would interpret when left unquoted.
const SHELL_META: &[char] = &[
    '\'', '"', '\\', '|', '&', ';', '<', '>', '(', ')', '$', '!', '*', '?', '[', ']', '{', '}',
    '`',
];

/// Characters that still expand inside double quotes.
const DOUBLE_QUOTE_ACTIVE: &[char] = &['"', '$', '`', '\\'];

bitflags! {
    /// Which columns of a listing contain at least one unsafe string.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SafeRender: u8 {
        const NAME = 1 << 0;
        const TARGET = 1 << 1;
    }
}

impl SafeRender {
    /// Scans the name and, for symlinks, the target text of one entry.
    pub fn scan(entry: &Entry) -> Self {
        let mut flags = SafeRender::empty();
        if needs_quoting(entry.name()) {
            flags |= SafeRender::NAME;
        }
        if let Some(target) = entry.target()
            && needs_quoting(target.link().as_os_str())
        {
            flags |= SafeRender::TARGET;
        }
        flags
    }
}

/// Quoting strategy chosen by [quoting_for].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    None,
    Single,
    Double,
    Escaped,
}

#[inline]
pub fn is_unsafe_char(c: char) -> bool {
    c.is_control() || c.is_whitespace() || SHELL_META.contains(&c)
}

/// True when `name` is not valid UTF-8 or holds any unsafe character.
pub fn needs_quoting(name: &OsStr) -> bool {
    match name.to_str() {
        Some(text) => text.chars().any(is_unsafe_char),
        None => true,
    }
}

pub fn quoting_for(text: &str) -> Quoting {
    if !text.chars().any(is_unsafe_char) {
        Quoting::None
    } else if !text.contains('\'') {
        Quoting::Single
    } else if !text.contains(DOUBLE_QUOTE_ACTIVE) {
        Quoting::Double
    } else {
        Quoting::Escaped
    }
}

/// Returns `name` quoted for safe shell use, or unchanged if already safe.
///
/// The bytes of `name` are kept as they are, so names that are not valid
/// UTF-8 still quote to the exact file they came from. Such names are always
/// quoted.
///
/// # Returns
/// [JlsError::Capacity] when the quoted form would exceed [QUOTED_MAX_LEN].
pub fn make_safe(name: &OsStr) -> Result<Cow<'_, OsStr>> {
    let quoting = match quoting_for(&name.to_string_lossy()) {
        Quoting::None if name.to_str().is_none() => Quoting::Single,
        quoting => quoting,
    };

    let bytes = name.as_bytes();
    let quoted_len = match quoting {
        Quoting::None => return Ok(Cow::Borrowed(name)),
        Quoting::Single | Quoting::Double => bytes.len() + 2,
        Quoting::Escaped => {
            let quotes = bytes.iter().filter(|&&b| b == b'\'').count();
            bytes.len() + 2 + 3 * quotes
        }
    };
    JlsError::check_capacity("quoted name", quoted_len, QUOTED_MAX_LEN)?;

    let mut out = Vec::with_capacity(quoted_len);
    match quoting {
        Quoting::Double => {
            out.push(b'"');
            out.extend_from_slice(bytes);
            out.push(b'"');
        }
        Quoting::Escaped => {
            out.push(b'\'');
            for &b in bytes {
                if b == b'\'' {
                    out.extend_from_slice(br"'\''");
                } else {
                    out.push(b);
                }
            }
            out.push(b'\'');
        }
        _ => {
            out.push(b'\'');
            out.extend_from_slice(bytes);
            out.push(b'\'');
        }
    }
    Ok(Cow::Owned(OsString::from_vec(out)))
}
