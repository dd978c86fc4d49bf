//! Core application runner (business logic) for `ruuvitag-form`.
//!
//! This module is intentionally decoupled from CLI parsing and process exit codes
//! so it can be tested deterministically.

use crate::cli::Config;
use crate::fetch::{DecodeError, Fetcher};
use crate::output::{Format, RenderError, UnsupportedFormat, effective_mac};
use std::io;
use std::io::Write;
use thiserror::Error;

/// Errors returned by the core runner.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormat),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RunError {
    /// Whether the error can be fixed by changing the command line.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            RunError::UnsupportedFormat(_) | RunError::Render(RenderError::UnknownTag(_))
        )
    }
}

/// Fetch the tags and write them in the configured format to `out`.
///
/// - An unreachable server is reported on `err` and rendered as having no tags.
/// - The format is resolved after fetching, so the transport warning comes first.
/// - Nothing is written to `out` unless rendering succeeds.
pub async fn run_with_io(
    config: &Config,
    fetcher: &dyn Fetcher,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), RunError> {
    let (tags, warning) = fetcher.fetch(&config.address).await?.into_parts();
    if let Some(warning) = warning {
        writeln!(err, "{warning}")?;
    }

    let mac = effective_mac(&tags, config.mac.as_deref());
    let formatter = Format::from_name(config.format.as_deref())?.formatter();
    let payload = formatter.format(&tags, mac)?;

    out.write_all(payload.as_bytes())?;
    out.flush()?;
    Ok(())
}
