//! Command-line argument parsing for jls.
//!
//! Every switch comes as an on/off pair; the last one given wins. A switch
//! that is not given at all leaves the decision to jls.toml and to whether
//! stdout is a terminal.

use clap::Parser;

use std::path::PathBuf;

/// List files and directories in long format.
///
/// Colour classification follows the LS_COLORS environment variable.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "jls", version)]
pub struct Cli {
    /// Files or directories to list. Defaults to the current directory.
    pub paths: Vec<PathBuf>,

    /// Colourize names and symlink targets
    #[arg(long, overrides_with = "no_color")]
    color: bool,

    /// Never colourize output
    #[arg(long, overrides_with = "color")]
    no_color: bool,

    /// Quote names that are unsafe to paste into a shell
    #[arg(long, overrides_with = "no_safe")]
    safe: bool,

    /// Print names verbatim
    #[arg(long, overrides_with = "safe")]
    no_safe: bool,

    /// Label error messages like the system `ls`
    #[arg(long, overrides_with = "no_test")]
    test: bool,

    /// Label error messages with the program name
    #[arg(long, overrides_with = "test")]
    no_test: bool,

    /// Write a default jls.toml to the config path and exit
    #[arg(long)]
    pub init: bool,
}

impl Cli {
    /// `Some(true)` for `--color`, `Some(false)` for `--no-color`.
    #[inline]
    pub fn color(&self) -> Option<bool> {
        flag_pair(self.color, self.no_color)
    }

    #[inline]
    pub fn safe(&self) -> Option<bool> {
        flag_pair(self.safe, self.no_safe)
    }

    #[inline]
    pub fn test(&self) -> bool {
        flag_pair(self.test, self.no_test).unwrap_or(false)
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::result::Result;

    #[test]
    fn last_switch_of_a_pair_wins() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::try_parse_from(["jls", "--color", "--no-color", "--safe"])?;
        assert_eq!(cli.color(), Some(false));
        assert_eq!(cli.safe(), Some(true));

        let cli = Cli::try_parse_from(["jls", "--no-color", "--color"])?;
        assert_eq!(cli.color(), Some(true));
        Ok(())
    }

    #[test]
    fn unset_switches_defer() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::try_parse_from(["jls", "a", "b"])?;
        assert_eq!(cli.color(), None);
        assert_eq!(cli.safe(), None);
        assert!(!cli.test());
        assert!(!cli.init);
        assert_eq!(cli.paths, [PathBuf::from("a"), PathBuf::from("b")]);
        Ok(())
    }

    #[test]
    fn test_mode_toggles() -> Result<(), Box<dyn std::error::Error>> {
        assert!(Cli::try_parse_from(["jls", "--test"])?.test());
        assert!(!Cli::try_parse_from(["jls", "--test", "--no-test"])?.test());
        Ok(())
    }
}
