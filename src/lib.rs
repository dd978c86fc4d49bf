//! `ruuvitag-form` library.
//!
//! The binary (`src/main.rs`) is responsible for process exit codes.
//! The core “business logic” lives in [`crate::app`] where it can be tested
//! deterministically with an injected fetcher + injected output streams.

pub mod app;
pub mod cli;
pub mod fetch;
pub mod output;
pub mod tag;
pub mod timestamp;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use app::{RunError, run_with_io};
pub use cli::{Command, Config, UsageError, parse_args};
pub use fetch::{DecodeError, FetchOutcome, Fetcher, HttpFetcher, decode_tags};
pub use output::{
    Format, InfluxDbFormatter, OutputFormatter, RenderError, UnsupportedFormat, WaybarFormatter,
};
pub use tag::{Acceleration, Reading, Tag, TagSet};
