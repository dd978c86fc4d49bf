//! Output formatters for RuuviTag readings.
//!
//! This module provides a trait for rendering a fetched [`TagSet`] and
//! implementations for the supported formats: waybar JSON and InfluxDB line
//! protocol.

pub mod influxdb;
pub mod waybar;

use crate::tag::TagSet;
use thiserror::Error;

pub use influxdb::InfluxDbFormatter;
pub use waybar::WaybarFormatter;

/// Errors raised while rendering tags.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Tag \"{0}\" does not exist")]
    UnknownTag(String),
    #[error("Tag \"{mac}\" has an invalid time: {value:?}")]
    InvalidTimestamp { mac: String, value: String },
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// A format name no formatter exists for.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0} is currently not supported")]
pub struct UnsupportedFormat(pub String);

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// JSON object for a waybar custom module
    #[default]
    Waybar,
    /// InfluxDB line protocol
    InfluxDb,
}

impl Format {
    /// Look up a format by name. No name selects waybar.
    pub fn from_name(name: Option<&str>) -> Result<Self, UnsupportedFormat> {
        match name {
            None => Ok(Format::Waybar),
            Some(name) if name.eq_ignore_ascii_case("waybar") => Ok(Format::Waybar),
            Some(name) if name.eq_ignore_ascii_case("influxdb") => Ok(Format::InfluxDb),
            Some(name) => Err(UnsupportedFormat(name.to_string())),
        }
    }

    pub fn formatter(self) -> Box<dyn OutputFormatter> {
        match self {
            Format::Waybar => Box::new(WaybarFormatter),
            Format::InfluxDb => Box::new(InfluxDbFormatter),
        }
    }
}

/// The tag chosen for single-value display: the requested one, or else the
/// first tag the server reported.
pub fn effective_mac<'a>(tags: &'a TagSet, show: Option<&'a str>) -> Option<&'a str> {
    show.or_else(|| tags.first_mac())
}

/// Trait for rendering tags into output text.
///
/// Implementations return the complete payload, including any trailing
/// newlines, ready to be written to stdout as-is.
pub trait OutputFormatter: Send + Sync {
    /// Render the tags.
    ///
    /// # Arguments
    /// * `tags` - All tags of one fetch
    /// * `mac` - The tag selected for single-value display, if any
    fn format(&self, tags: &TagSet, mac: Option<&str>) -> Result<String, RenderError>;
}
