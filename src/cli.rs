//! Command line parsing.
//!
//! Help output and usage errors follow the GNU `getopt` conventions
//! (`prog: message` plus a "Try `prog --help'" hint) instead of clap's own
//! layout, so clap's help and version flags are disabled. As with
//! `getopt`, long options may be shortened to any unique prefix and option
//! values may start with `-`.

use clap::Parser;
use std::ffi::OsString;
use std::path::Path;
use thiserror::Error;

/// Program name used when `argv[0]` is unusable.
pub const DEFAULT_PROGRAM_NAME: &str = "ruuvitag-form";

const MISSING_ADDRESS: &str = "Need to specify an url to a ruuvitag-hark server.";

/// Raw command line options.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ruuvitag-form",
    about,
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true,
    infer_long_args = true
)]
pub struct Options {
    /// Specify what FORMAT to use for the output.
    #[arg(short = 'F', long, value_name = "FORMAT", allow_hyphen_values = true)]
    pub format: Option<String>,

    /// Show ruuvitag with MAC address
    #[arg(long, value_name = "MAC", allow_hyphen_values = true)]
    pub show: Option<String>,

    /// Print this message then exits
    #[arg(short, long)]
    pub help: bool,

    /// ruuvitag-hark server address; the last one given is used
    #[arg(value_name = "ADDRESS")]
    pub addresses: Vec<String>,
}

/// Validated configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Lower-cased format name, `None` for the default format
    pub format: Option<String>,
    /// Upper-cased MAC address of the tag to show
    pub mac: Option<String>,
    /// Base address of the ruuvitag-hark server
    pub address: String,
}

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Run(Config),
}

/// A command line that cannot be run.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct UsageError(pub String);

impl From<clap::Error> for UsageError {
    fn from(err: clap::Error) -> Self {
        let rendered = err.to_string();
        let headline = rendered.lines().next().unwrap_or_default();
        let message = headline.strip_prefix("error: ").unwrap_or(headline);
        UsageError(message.to_string())
    }
}

impl TryFrom<Options> for Command {
    type Error = UsageError;

    /// Help is answered before anything else is validated, so `prog -h`
    /// prints help and succeeds even without an address.
    fn try_from(options: Options) -> Result<Self, Self::Error> {
        if options.help {
            return Ok(Command::Help);
        }

        let address = options
            .addresses
            .last()
            .cloned()
            .ok_or_else(|| UsageError(MISSING_ADDRESS.to_string()))?;

        Ok(Command::Run(Config {
            format: options.format.map(|f| f.to_lowercase()),
            mac: options.show.map(|m| m.to_uppercase()),
            address,
        }))
    }
}

/// Parse a full argument vector, program name included.
pub fn parse_args<I, T>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Options::try_parse_from(args)?.try_into()
}

/// Base name of `argv[0]`.
pub fn program_name(arg0: Option<&str>) -> String {
    arg0.and_then(|arg| Path::new(arg).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_PROGRAM_NAME)
        .to_string()
}

/// Text printed for `--help`.
pub fn help_text(prog: &str) -> String {
    format!(
        "usage: {prog} [OPTIONS]... ADDRESS
Display information from a ruuvitag-hark server in a specified format.

Options:
  -F, --format FORMAT  Specify what FORMAT to use for the output. See FORMAT
      --show MAC       Show ruuvitag with MAC address
  -h, --help           Print this message then exits

FORMAT:
  Supported formats:
    waybar: wayland bar for wlroots based compositors.
    influxdb: time series database.
"
    )
}

/// Usage error report, `prog: message` followed by the help hint.
pub fn usage_message(prog: &str, message: &str) -> String {
    format!("{prog}: {message}\nTry `{prog} --help' for more information.")
}
