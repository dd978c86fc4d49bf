//! Waybar custom module output formatter.
//!
//! Emits one JSON object with `text`, `tooltip`, `class` and `percentage`,
//! spaced as `{"key": value, ...}` with non-ASCII characters escaped.

use crate::output::{OutputFormatter, RenderError, effective_mac};
use crate::tag::{Reading, Tag, TagSet};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

/// CSS class of the waybar module.
pub const CLASS: &str = "ruuvitag";

#[derive(Debug, Serialize)]
struct WaybarOutput {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tooltip: Option<String>,
    class: &'static str,
    percentage: Reading,
}

/// JSON layout with `", "` and `": "` separators and `\uXXXX` escapes for
/// DEL and everything outside ASCII.
struct SpacedAsciiFormatter;

impl Formatter for SpacedAsciiFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units).iter() {
                writer.write_all(format!("\\u{unit:04x}").as_bytes())?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

fn to_json(output: &WaybarOutput) -> Result<String, RenderError> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedAsciiFormatter);
    output.serialize(&mut serializer)?;
    // Every non-ASCII character has been escaped.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// One `name: display` line per tag, in server order.
fn tooltip(tags: &TagSet) -> String {
    tags.iter()
        .map(|(_, tag)| format!("{}: {}", tag.name, tag))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Waybar formatter.
///
/// With no tags the module shows the default tag and 0 percent, without a
/// tooltip. Otherwise it shows the selected tag, with humidity as the
/// percentage and every tag listed in the tooltip.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaybarFormatter;

impl WaybarFormatter {
    fn output(&self, tags: &TagSet, mac: Option<&str>) -> Result<WaybarOutput, RenderError> {
        if tags.is_empty() {
            return Ok(WaybarOutput {
                text: Tag::default().to_string(),
                tooltip: None,
                class: CLASS,
                percentage: Reading::Number(0.into()),
            });
        }

        let mac = effective_mac(tags, mac).unwrap_or_default();
        let selected = tags
            .get(mac)
            .ok_or_else(|| RenderError::UnknownTag(mac.to_string()))?;

        Ok(WaybarOutput {
            text: selected.to_string(),
            tooltip: Some(tooltip(tags)),
            class: CLASS,
            percentage: selected.humidity.clone(),
        })
    }
}

impl OutputFormatter for WaybarFormatter {
    fn format(&self, tags: &TagSet, mac: Option<&str>) -> Result<String, RenderError> {
        to_json(&self.output(tags, mac)?)
    }
}
