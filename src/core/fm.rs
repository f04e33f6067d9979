//! Metadata resolution for jls.
//!
//! Provides the [Entry] struct which is used throughout jls, along with the
//! [EntryType], [AccessMode] and [TargetInfo] types it is built from.
//! [resolve] produces one [Entry] per path; [read_dir_names] lists a directory.

use crate::error::{JlsError, Result};

use std::ffi::{OsStr, OsString};
use std::fs::{self, Metadata};
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Longest basename accepted for an entry. Linux caps names at 255 bytes.
pub const NAME_MAX_LEN: usize = 1024;
/// Longest symlink text accepted. Linux caps paths at 4096 bytes.
pub const TARGET_MAX_LEN: usize = 16 * 1024;

/// The kind of filesystem object an [Entry] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Unknown,
    Directory,
    CharDevice,
    BlockDevice,
    File,
    Fifo,
    Symlink,
    Socket,
}

impl EntryType {
    /// Classifies the type bits of `meta` without following symlinks.
    pub(crate) fn from_metadata(meta: &Metadata) -> Self {
        let ft = meta.file_type();
        if ft.is_dir() {
            EntryType::Directory
        } else if ft.is_char_device() {
            EntryType::CharDevice
        } else if ft.is_block_device() {
            EntryType::BlockDevice
        } else if ft.is_file() {
            EntryType::File
        } else if ft.is_fifo() {
            EntryType::Fifo
        } else if ft.is_symlink() {
            EntryType::Symlink
        } else if ft.is_socket() {
            EntryType::Socket
        } else {
            EntryType::Unknown
        }
    }

    /// The leading character of a long listing line.
    pub fn as_char(self) -> char {
        match self {
            EntryType::Unknown => '?',
            EntryType::Directory => 'd',
            EntryType::CharDevice => 'c',
            EntryType::BlockDevice => 'b',
            EntryType::File => '-',
            EntryType::Fifo => 'p',
            EntryType::Symlink => 'l',
            EntryType::Socket => 's',
        }
    }

    #[inline]
    pub fn is_device(self) -> bool {
        matches!(self, EntryType::CharDevice | EntryType::BlockDevice)
    }
}

/// One permission group. `special` overlays the execute slot when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permission {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    pub special: bool,
}

/// Owner, group and other permission groups decoded from a raw mode.
///
/// `special` is setuid for the owner, setgid for the group and the sticky bit
/// for others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessMode {
    pub owner: Permission,
    pub group: Permission,
    pub other: Permission,
}

impl AccessMode {
    pub const SETUID: u32 = 0o4000;
    pub const SETGID: u32 = 0o2000;
    pub const STICKY: u32 = 0o1000;

    pub fn from_mode(mode: u32) -> Self {
        let group = |shift: u32, special: u32| Permission {
            read: (mode >> (shift + 2)) & 1 != 0,
            write: (mode >> (shift + 1)) & 1 != 0,
            execute: (mode >> shift) & 1 != 0,
            special: mode & special != 0,
        };
        AccessMode {
            owner: group(6, Self::SETUID),
            group: group(3, Self::SETGID),
            other: group(0, Self::STICKY),
        }
    }

    #[inline]
    pub fn any_execute(&self) -> bool {
        self.owner.execute || self.group.execute || self.other.execute
    }
}

/// Where a symlink points.
///
/// `name` always describes the first hop. The resolved type and
/// access are only available while the target exists.
#[derive(Debug, Clone)]
pub struct TargetInfo {
    link: PathBuf,
    name: OsString,
    resolved: Option<(EntryType, AccessMode)>,
}

impl TargetInfo {
    /// The text stored in the link itself.
    #[inline]
    pub fn link(&self) -> &Path {
        &self.link
    }

    #[inline]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.resolved.is_some()
    }

    /// Type and access of the resolved target, `None` for a dangling link.
    #[inline]
    pub fn resolved(&self) -> Option<(EntryType, AccessMode)> {
        self.resolved
    }
}

/// Normalized metadata for a single path.
/// Built fresh by [resolve] for every query and dropped once rendered.
#[derive(Debug, Clone)]
pub struct Entry {
    kind: EntryType,
    access: AccessMode,
    links: u64,
    uid: u32,
    gid: u32,
    size: i64,
    modified: SystemTime,
    blocks: u64,
    name: OsString,
    rdev: u64,
    target: Option<TargetInfo>,
}

impl Entry {
    // Accessors

    #[inline]
    pub fn kind(&self) -> EntryType {
        self.kind
    }

    #[inline]
    pub fn access(&self) -> &AccessMode {
        &self.access
    }

    #[inline]
    pub fn links(&self) -> u64 {
        self.links
    }

    #[inline]
    pub fn uid(&self) -> u32 {
        self.uid
    }

    #[inline]
    pub fn gid(&self) -> u32 {
        self.gid
    }

    #[inline]
    pub fn size(&self) -> i64 {
        self.size
    }

    #[inline]
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Allocated 512-byte blocks.
    #[inline]
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    #[inline]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// Packed device number, only meaningful for device entries.
    #[inline]
    pub fn rdev(&self) -> u64 {
        self.rdev
    }

    #[inline]
    pub fn target(&self) -> Option<&TargetInfo> {
        self.target.as_ref()
    }
}

/// Resolves `path` into an [Entry] without following it if it is a symlink.
///
/// With `follow_chain` set, a symlink's resolved type and access come from
/// the end of its chain; otherwise exactly one hop is inspected. Either way
/// the displayed target is the first hop.
///
/// # Returns
/// [JlsError::NotFound] when the path does not exist, [JlsError::Io] for any
/// other `lstat` failure and [JlsError::UnknownType] for unclassifiable modes.
pub fn resolve(path: &Path, follow_chain: bool) -> Result<Entry> {
    let meta = fs::symlink_metadata(path).map_err(|e| JlsError::from_io(path, e))?;

    let kind = EntryType::from_metadata(&meta);
    if kind == EntryType::Unknown {
        return Err(JlsError::UnknownType {
            path: path.to_path_buf(),
            mode: meta.mode(),
        });
    }

    let name = basename(path);
    JlsError::check_capacity("file name", name.len(), NAME_MAX_LEN)?;

    let target = if kind == EntryType::Symlink {
        Some(resolve_target(path, follow_chain)?)
    } else {
        None
    };

    let modified = meta.modified().map_err(|e| JlsError::from_io(path, e))?;

    Ok(Entry {
        kind,
        access: AccessMode::from_mode(meta.mode()),
        links: meta.nlink(),
        uid: meta.uid(),
        gid: meta.gid(),
        size: i64::try_from(meta.size()).unwrap_or(i64::MAX),
        modified,
        blocks: meta.blocks(),
        name,
        rdev: meta.rdev(),
        target,
    })
}

/// Reads the names of every child of `path`.
/// `fs::read_dir` never yields `.` or `..`, so nothing needs filtering.
pub fn read_dir_names(path: &Path) -> Result<Vec<OsString>> {
    let mut names = Vec::with_capacity(64);
    for entry in fs::read_dir(path).map_err(|e| JlsError::from_io(path, e))? {
        let entry = entry.map_err(|e| JlsError::from_io(path, e))?;
        names.push(entry.file_name());
    }
    Ok(names)
}

fn resolve_target(link_path: &Path, follow_chain: bool) -> Result<TargetInfo> {
    let link = fs::read_link(link_path).map_err(|e| JlsError::from_io(link_path, e))?;
    JlsError::check_capacity("symlink target", link.as_os_str().len(), TARGET_MAX_LEN)?;

    // Relative targets are relative to the link's directory, not to the cwd.
    let joined = if link.is_absolute() {
        link.clone()
    } else {
        link_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&link)
    };
    let path = std::path::absolute(&joined).map_err(|e| JlsError::from_io(link_path, e))?;

    let lookup = if follow_chain {
        fs::metadata(&path)
    } else {
        fs::symlink_metadata(&path)
    };
    let resolved = match lookup {
        Ok(meta) => Some((
            EntryType::from_metadata(&meta),
            AccessMode::from_mode(meta.mode()),
        )),
        Err(err) => {
            tracing::debug!(
                link = %link_path.display(),
                target = %path.display(),
                %err,
                "symlink target unresolved"
            );
            None
        }
    };

    Ok(TargetInfo {
        name: basename(&path),
        link,
        resolved,
    })
}

/// Final component of `path`, or the whole path when it has none (`/`, `..`).
fn basename(path: &Path) -> OsString {
    path.file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| path.as_os_str().to_os_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::os::unix::fs::{PermissionsExt, symlink};
    use std::result::Result;
    use tempfile::TempDir;

    #[test]
    fn access_mode_decodes_groups_and_special_bits() {
        let access = AccessMode::from_mode(0o4751);
        assert!(access.owner.read && access.owner.write && access.owner.execute);
        assert!(access.owner.special);
        assert!(access.group.read && !access.group.write && access.group.execute);
        assert!(!access.group.special);
        assert!(!access.other.read && !access.other.write && access.other.execute);
        assert!(!access.other.special);

        let sticky = AccessMode::from_mode(0o1777);
        assert!(sticky.other.special && sticky.other.write);
        assert!(!AccessMode::from_mode(0o644).any_execute());
    }

    #[test]
    fn resolve_regular_file() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        let file_path = tmp.path().join("hello.txt");
        let mut file = File::create(&file_path)?;
        write!(file, "abc123")?;
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o640))?;

        let entry = resolve(&file_path, false)?;
        assert_eq!(entry.kind(), EntryType::File);
        assert_eq!(entry.name(), OsStr::new("hello.txt"));
        assert_eq!(entry.size(), 6);
        assert_eq!(entry.links(), 1);
        assert_eq!(*entry.access(), AccessMode::from_mode(0o640));
        assert!(entry.target().is_none());
        Ok(())
    }

    #[test]
    fn resolve_directory() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        let dir_path = tmp.path().join("emptydir");
        fs::create_dir(&dir_path)?;

        let entry = resolve(&dir_path, false)?;
        assert_eq!(entry.kind(), EntryType::Directory);
        assert!(entry.target().is_none());
        Ok(())
    }

    #[test]
    fn resolve_missing_path_is_not_found() {
        let err = resolve(Path::new("/path/does/not/exist"), false);
        assert!(matches!(err, Err(JlsError::NotFound { .. })));
    }

    #[test]
    fn relative_symlink_resolves_against_link_directory() -> Result<(), Box<dyn std::error::Error>>
    {
        let tmp = TempDir::new()?;
        File::create(tmp.path().join("a.txt"))?;
        symlink("a.txt", tmp.path().join("b"))?;

        let entry = resolve(&tmp.path().join("b"), false)?;
        assert_eq!(entry.kind(), EntryType::Symlink);
        let target = entry.target().ok_or("symlink without target")?;
        assert!(target.exists());
        assert_eq!(target.link(), Path::new("a.txt"));
        assert_eq!(target.name(), OsStr::new("a.txt"));
        assert_eq!(target.resolved().map(|(kind, _)| kind), Some(EntryType::File));
        Ok(())
    }

    #[test]
    fn dangling_symlink_has_no_resolved_type() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        symlink("nowhere", tmp.path().join("broken"))?;

        let entry = resolve(&tmp.path().join("broken"), true)?;
        let target = entry.target().ok_or("symlink without target")?;
        assert!(!target.exists());
        assert!(target.resolved().is_none());
        Ok(())
    }

    #[test]
    fn chain_following_reports_final_type() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        fs::create_dir(tmp.path().join("real"))?;
        symlink("real", tmp.path().join("hop"))?;
        symlink("hop", tmp.path().join("start"))?;

        let one_hop = resolve(&tmp.path().join("start"), false)?;
        let target = one_hop.target().ok_or("symlink without target")?;
        assert_eq!(target.resolved().map(|(k, _)| k), Some(EntryType::Symlink));

        let chained = resolve(&tmp.path().join("start"), true)?;
        let target = chained.target().ok_or("symlink without target")?;
        assert_eq!(target.name(), OsStr::new("hop"));
        assert_eq!(target.resolved().map(|(k, _)| k), Some(EntryType::Directory));
        Ok(())
    }

    #[test]
    fn read_dir_names_lists_children() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        File::create(tmp.path().join("one"))?;
        fs::create_dir(tmp.path().join("two"))?;

        let mut names = read_dir_names(tmp.path())?;
        names.sort();
        assert_eq!(names, vec![OsString::from("one"), OsString::from("two")]);
        Ok(())
    }
}
