//! Command-line arguments for the mirror binary.

use crate::config::TransferSettings;
use camino::Utf8PathBuf;
use clap::Parser;
use log::LevelFilter;

/// Copy Maven artefacts from one repository to another.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "artefact-mirror")]
#[command(version, about)]
#[command(long_about = concat!(
    "Copy Maven artefacts from one repository to another.\n\n",
    "Each configured coordinate is looked up on the download repository, its ",
    "files are staged locally, and every discovered file is then published to ",
    "the upload repository. Failures are logged per file and never stop the run.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Mirror everything listed in mirror.yaml:\n",
    "    $ artefact-mirror mirror.yaml\n\n",
    "  Show what would be transferred:\n",
    "    $ artefact-mirror --dry-run -v mirror.yaml\n\n",
    "RUST_LOG overrides the level selected by -v and -q.",
))]
pub struct Cli {
    /// YAML configuration file.
    #[arg(value_name = "CONFIG")]
    pub config: Utf8PathBuf,

    /// Log every transfer without downloading or uploading anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Return the log level selected by `-v` and `-q`.
    ///
    /// # Examples
    ///
    /// ```
    /// use artefact_mirror::cli::Cli;
    /// use log::LevelFilter;
    ///
    /// let cli = Cli { verbosity: 1, ..Cli::default() };
    /// assert_eq!(cli.log_level(), LevelFilter::Debug);
    /// ```
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Force both debug switches on when `--dry-run` was given.
    pub const fn apply_to(&self, settings: &mut TransferSettings) {
        if self.dry_run {
            settings.debug_download = true;
            settings.debug_upload = true;
        }
    }
}
