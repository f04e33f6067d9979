//! Error type shared by the resolver, the colour classifier and the lister.
//!
//! Only [JlsError::NotFound] is treated as a soft failure by callers: it is
//! reported for the offending argument and the run continues. Everything else
//! aborts the listing it happened in.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, JlsError>;

#[derive(Debug, Error)]
pub enum JlsError {
    #[error("cannot access '{}': No such file or directory", .path.display())]
    NotFound { path: PathBuf },

    #[error("cannot access '{}': {}", .path.display(), io_message(.source))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot classify '{}': unknown file type in mode {mode:#o}", .path.display())]
    UnknownType { path: PathBuf, mode: u32 },

    #[error("no ANSI mapping for key '{0}'")]
    NoAnsi(String),

    #[error("{what} is too long ({len} bytes, limit {max})")]
    Capacity {
        what: &'static str,
        len: usize,
        max: usize,
    },

    #[error("write error: {}", io_message(.0))]
    Output(#[from] io::Error),
}

impl JlsError {
    /// Wraps an I/O failure on `path`, keeping `ENOENT` distinct from the rest.
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            JlsError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            JlsError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, JlsError::NotFound { .. })
    }

    /// Fails with [JlsError::Capacity] when `len` exceeds `max`.
    pub(crate) fn check_capacity(what: &'static str, len: usize, max: usize) -> Result<()> {
        if len > max {
            return Err(JlsError::Capacity { what, len, max });
        }
        Ok(())
    }
}

/// The text of `err` without the `(os error N)` suffix std appends to OS errors.
fn io_message(err: &io::Error) -> String {
    let text = err.to_string();
    match text.rfind(" (os error ") {
        Some(at) if text.ends_with(')') => text[..at].to_string(),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enoent_maps_to_not_found() {
        let err = JlsError::from_io(
            Path::new("missing"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "cannot access 'missing': No such file or directory"
        );
    }

    #[test]
    fn other_io_errors_stay_io() {
        let err = JlsError::from_io(
            Path::new("locked"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!err.is_not_found());
        assert!(matches!(err, JlsError::Io { .. }));
    }

    #[test]
    fn os_errors_read_like_ls() {
        let err = JlsError::from_io(Path::new("locked"), io::Error::from_raw_os_error(13));
        assert_eq!(err.to_string(), "cannot access 'locked': Permission denied");

        let err = JlsError::Output(io::Error::from_raw_os_error(32));
        assert_eq!(err.to_string(), "write error: Broken pipe");
    }

    #[test]
    fn capacity_check_rejects_overflow() {
        assert!(JlsError::check_capacity("name", 10, 10).is_ok());
        let err = JlsError::check_capacity("name", 11, 10);
        assert!(matches!(
            err,
            Err(JlsError::Capacity {
                len: 11,
                max: 10,
                ..
            })
        ));
    }
}
