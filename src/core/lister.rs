//! Long-format listing of files and directories.
//!
//! A [Lister] writes `ls -l` style lines for each path it is given:
//! - a directory gets an optional `<path>:` header, a `total` line and one
//!   line per child, aligned over all children;
//! - anything else, symlinks included, gets exactly one line.
//!
//! Every line is composed in memory first, so a failing entry never leaves a
//! partial line behind on the output.

use crate::core::color::{ColorKey, ColorTable, ColorView};
use crate::core::fm::{self, Entry, EntryType};
use crate::core::formatter::{
    AlignmentWidths, EntryFields, Formatter, SortOrder, pad_left, pad_right,
};
use crate::core::quote::{SafeRender, make_safe, needs_quoting};
use crate::core::terminal::DEFAULT_TERM_WIDTH;
use crate::error::{JlsError, Result};

use unicode_width::UnicodeWidthStr;

use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::SystemTime;

/// Longest single output line, escapes included.
pub const LINE_MAX_LEN: usize = 128 * 1024;

/// Erases from the cursor to the end of the terminal line.
const CLEAR_TO_EOL: &str = "\x1b[K";

/// Per-run rendering switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingOptions {
    pub color: bool,
    pub safe: bool,
    pub term_width: usize,
    pub follow_chain: bool,
    pub sort: SortOrder,
    pub case_insensitive: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        ListingOptions {
            color: false,
            safe: false,
            term_width: DEFAULT_TERM_WIDTH,
            follow_chain: false,
            sort: SortOrder::Ascend,
            case_insensitive: true,
        }
    }
}

/// One resolved child of a directory and its formatted columns.
struct Row {
    entry: Entry,
    fields: EntryFields,
}

/// Writes listings of paths to `out`.
pub struct Lister<'a, W: Write> {
    out: W,
    options: ListingOptions,
    colors: &'a ColorTable,
    formatter: Formatter,
    /// Cached reset sequence, present only when colour is on.
    reset: Option<String>,
    now: SystemTime,
    wrote_any: bool,
}

impl<'a, W: Write> Lister<'a, W> {
    /// Creates a lister writing to `out`.
    ///
    /// # Returns
    /// [JlsError::NoAnsi] when colour is on and the table has no reset code.
    pub fn new(out: W, options: ListingOptions, colors: &'a ColorTable) -> Result<Self> {
        let reset = if options.color {
            Some(colors.reset()?)
        } else {
            None
        };
        let formatter = Formatter::new(options.sort, options.case_insensitive);

        Ok(Lister {
            out,
            options,
            colors,
            formatter,
            reset,
            now: SystemTime::now(),
            wrote_any: false,
        })
    }

    /// Uses `now` instead of the wall clock when deciding how to show times.
    pub fn with_clock(mut self, now: SystemTime) -> Self {
        self.now = now;
        self
    }

    /// Lists `path`. Directories get a `<path>:` header when `header` is set.
    pub fn list(&mut self, path: &Path, header: bool) -> Result<()> {
        let entry = fm::resolve(path, self.options.follow_chain)?;
        if entry.kind() == EntryType::Directory {
            self.list_directory(path, header)
        } else {
            self.list_entry(path, &entry)
        }
    }

    /// Lists the children of the directory at `path`.
    pub fn list_directory(&mut self, path: &Path, header: bool) -> Result<()> {
        let mut names = fm::read_dir_names(path)?;
        self.formatter.sort_names(&mut names);

        // Pass 1: resolve everything and measure.
        let mut rows = Vec::with_capacity(names.len());
        let mut widths = AlignmentWidths::zero();
        let mut blocks: u64 = 0;
        let mut safe = SafeRender::empty();

        for name in names {
            let entry = fm::resolve(&path.join(&name), self.options.follow_chain)?;
            let fields = EntryFields::new(&entry, self.now);
            widths.fold(&fields);
            blocks = blocks.saturating_add(entry.blocks());
            safe |= SafeRender::scan(&entry);
            rows.push(Row { entry, fields });
        }
        tracing::debug!(
            path = %path.display(),
            children = rows.len(),
            blocks,
            "directory measured"
        );

        // Pass 2: render.
        let mut block = Vec::new();
        if header {
            if self.wrote_any {
                block.push(b'\n');
            }
            block.extend_from_slice(self.display(path.as_os_str())?.as_bytes());
            block.extend_from_slice(b":\n");
        }
        block.extend_from_slice(format!("total {}\n", blocks / 2).as_bytes());

        for row in &rows {
            let line = self.render_line(&row.entry, &row.fields, &widths, safe, None)?;
            block.extend_from_slice(&line);
        }

        self.emit(&block)
    }

    /// Writes the single line describing `entry`, named as `path` was given.
    pub fn list_entry(&mut self, path: &Path, entry: &Entry) -> Result<()> {
        let fields = EntryFields::new(entry, self.now);
        let mut safe = SafeRender::scan(entry);
        safe.set(SafeRender::NAME, needs_quoting(path.as_os_str()));

        let line = self.render_line(
            entry,
            &fields,
            &AlignmentWidths::default(),
            safe,
            Some(path.as_os_str()),
        )?;
        self.emit(&line)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.write_all(bytes)?;
        self.wrote_any = true;
        Ok(())
    }

    /// Composes one full line, trailing newline included. Names and targets
    /// are copied byte for byte.
    fn render_line(
        &self,
        entry: &Entry,
        fields: &EntryFields,
        widths: &AlignmentWidths,
        safe: SafeRender,
        display_name: Option<&OsStr>,
    ) -> Result<Vec<u8>> {
        let mut line = Line::new(self.options.term_width);

        line.push(&format!(
            "{}{} {} {} {} {} {} ",
            fields.type_char,
            fields.permissions,
            pad_left(&fields.links, widths.links),
            pad_right(&fields.owner, widths.owner),
            pad_right(&fields.group, widths.group),
            pad_left(&fields.size, widths.size),
            fields.time,
        ));

        let name = display_name.unwrap_or_else(|| entry.name());
        let shown = self.display(name)?;
        if self.options.safe && safe.contains(SafeRender::NAME) && !needs_quoting(name) {
            line.push(" ");
        }
        let key = self.colors.classify_key(&ColorView::from(entry));
        self.push_field(&mut line, &shown, &key)?;

        if let Some(target) = entry.target() {
            line.push(" -> ");
            let link = target.link().as_os_str();
            let shown = self.display(link)?;
            if self.options.safe && safe.contains(SafeRender::TARGET) && !needs_quoting(link) {
                line.push(" ");
            }
            let key = match target.color_view() {
                Some(view) => self.colors.classify_key(&view),
                None => ColorKey::MissingFile,
            };
            self.push_field(&mut line, &shown, &key)?;
        }

        line.finish()
    }

    /// The bytes shown for a name, target or header, quoted in safe mode.
    fn display<'n>(&self, name: &'n OsStr) -> Result<Cow<'n, OsStr>> {
        if self.options.safe {
            make_safe(name)
        } else {
            Ok(Cow::Borrowed(name))
        }
    }

    fn push_field(&self, line: &mut Line, text: &OsStr, key: &ColorKey) -> Result<()> {
        match &self.reset {
            Some(reset) => {
                let escape = self.colors.escape_for(key)?;
                line.push_colored(text, &escape, reset);
            }
            None => line.push_name(text),
        }
        Ok(())
    }
}

/// A line under construction that knows its visible column.
struct Line {
    bytes: Vec<u8>,
    column: usize,
    term_width: usize,
}

impl Line {
    fn new(term_width: usize) -> Self {
        Line {
            bytes: Vec::new(),
            column: 0,
            term_width: term_width.max(1),
        }
    }

    fn push(&mut self, text: &str) {
        self.bytes.extend_from_slice(text.as_bytes());
        self.column += text.width();
    }

    /// Pushes the raw bytes of `name`. Bytes that are not UTF-8 count as one
    /// column each, the way a terminal shows a replacement glyph.
    fn push_name(&mut self, name: &OsStr) {
        self.bytes.extend_from_slice(name.as_bytes());
        self.column += name.to_string_lossy().width();
    }

    /// Pushes `name` wrapped in `escape` and `reset`. When the field's first
    /// and last columns fall in different terminal rows the rest of the line
    /// is cleared so a background colour cannot bleed into the next row.
    fn push_colored(&mut self, name: &OsStr, escape: &str, reset: &str) {
        let start = self.column;
        self.bytes.extend_from_slice(escape.as_bytes());
        self.push_name(name);
        self.bytes.extend_from_slice(reset.as_bytes());

        let last = self.column.saturating_sub(1).max(start);
        if start / self.term_width != last / self.term_width {
            self.bytes.extend_from_slice(CLEAR_TO_EOL.as_bytes());
        }
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        JlsError::check_capacity("output line", self.bytes.len() + 1, LINE_MAX_LEN)?;
        self.bytes.push(b'\n');
        Ok(self.bytes)
    }
}
