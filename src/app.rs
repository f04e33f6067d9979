//! Application wiring for jls.
//!
//! A [Session] merges the command line, jls.toml and the terminal state into
//! the options of one run; [run] lists every path of a session in order.

use crate::config::Config;
use crate::core::color::ColorTable;
use crate::core::lister::{Lister, ListingOptions};
use crate::core::terminal::{self, DEFAULT_TERM_WIDTH};
use crate::error::{JlsError, Result};
use crate::utils::cli::Cli;
use crate::utils::error_line;

use std::io::Write;
use std::path::PathBuf;

/// Everything one invocation needs, fixed before the first path is listed.
#[derive(Debug, Clone)]
pub struct Session {
    paths: Vec<PathBuf>,
    options: ListingOptions,
    colors: ColorTable,
    program: String,
}

impl Session {
    /// Builds the session for the process' own stdout.
    pub fn new(cli: &Cli, config: &Config) -> Self {
        let is_tty = terminal::stdout_is_terminal();
        Self::with_terminal(cli, config, is_tty, terminal::terminal_width)
    }

    /// Builds a session as if stdout were a terminal when `is_tty` is set.
    /// `width` is only called when colour ends up on.
    pub fn with_terminal(
        cli: &Cli,
        config: &Config,
        is_tty: bool,
        width: impl FnOnce() -> usize,
    ) -> Self {
        let general = config.general();
        let color = general.color().resolve(cli.color(), is_tty);
        let safe = general.safe().resolve(cli.safe(), is_tty);

        let options = ListingOptions {
            color,
            safe,
            term_width: if color { width() } else { DEFAULT_TERM_WIDTH },
            follow_chain: general.follow_chain(),
            sort: general.sort(),
            case_insensitive: general.case_insensitive(),
        };

        let paths = if cli.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            cli.paths.clone()
        };

        let program = if cli.test() {
            general.test_name()
        } else {
            general.program_name()
        };

        let colors = if color {
            config.color_table()
        } else {
            ColorTable::default()
        };

        tracing::debug!(?options, paths = paths.len(), "session ready");

        Session {
            paths,
            options,
            colors,
            program: program.to_string(),
        }
    }

    // Accessors
    #[inline]
    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Lists every path of `session` to `out`, reporting failures on `err`.
///
/// Returns `Ok(true)` when every path was listed. A path that fails is
/// reported with one line and skipped; only a failure to write the output
/// itself stops the run.
pub fn run<W: Write, E: Write>(session: &Session, out: W, err: &mut E) -> Result<bool> {
    let mut lister = Lister::new(out, session.options.clone(), &session.colors)?;
    let header = session.paths.len() > 1;
    let mut all_ok = true;

    for path in &session.paths {
        match lister.list(path, header) {
            Ok(()) => {}
            Err(JlsError::Output(e)) => return Err(JlsError::Output(e)),
            Err(e) => {
                if !e.is_not_found() {
                    tracing::debug!(path = %path.display(), error = ?e, "listing failed");
                }
                // Keep stdout and stderr interleaved in argument order.
                lister.flush()?;
                writeln!(err, "{}", error_line(&session.program, &e))?;
                all_ok = false;
            }
        }
    }

    lister.flush()?;
    Ok(all_ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsStr;
    use std::fs;
    use std::result::Result;
    use tempfile::tempdir;

    fn session(args: &[&str], is_tty: bool) -> Result<Session, clap::Error> {
        let cli = Cli::try_parse_from(std::iter::once("jls").chain(args.iter().copied()))?;
        Ok(Session::with_terminal(&cli, &Config::default(), is_tty, || 33))
    }

    #[test]
    fn terminal_decides_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let tty = session(&[], true)?;
        assert!(tty.options.color && tty.options.safe);
        assert_eq!(tty.options.term_width, 33);
        assert_eq!(tty.paths, [PathBuf::from(".")]);

        let pipe = session(&[], false)?;
        assert!(!pipe.options.color && !pipe.options.safe);
        assert_eq!(pipe.options.term_width, DEFAULT_TERM_WIDTH);

        let forced = session(&["--color", "--no-safe"], false)?;
        assert!(forced.options.color && !forced.options.safe);
        Ok(())
    }

    #[test]
    fn test_mode_changes_label() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(session(&[], false)?.program(), "jls");
        assert_eq!(session(&["--test"], false)?.program(), "ls");
        Ok(())
    }

    #[test]
    fn failures_are_reported_and_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let present = dir.path().join("here");
        fs::write(&present, b"")?;
        let missing = dir.path().join("gone");

        let cli = Cli::try_parse_from([
            OsStr::new("jls"),
            missing.as_os_str(),
            present.as_os_str(),
        ])?;
        let session = Session::with_terminal(&cli, &Config::default(), false, || 80);

        let mut out = Vec::new();
        let mut err = Vec::new();
        let ok = run(&session, &mut out, &mut err)?;

        assert!(!ok);
        let err = String::from_utf8(err)?;
        assert_eq!(
            err,
            format!(
                "jls: cannot access '{}': No such file or directory\n",
                missing.display()
            )
        );
        let out = String::from_utf8(out)?;
        assert_eq!(out.lines().count(), 1);
        assert!(out.trim_end().ends_with(&*present.to_string_lossy()));
        Ok(())
    }
}
