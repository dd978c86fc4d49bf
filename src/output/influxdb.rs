//! InfluxDB line protocol output formatter.

use crate::output::{OutputFormatter, RenderError};
use crate::tag::{Reading, Tag, TagSet};
use crate::timestamp::epoch_nanos;
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

/// Field values for InfluxDB line protocol
#[derive(Debug, PartialEq)]
pub enum FieldValue {
    Number(Number),
    /// Written unquoted, exactly as the server sent it
    Placeholder(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Number(num) => write!(f, "{num}"),
            FieldValue::Placeholder(s) => write!(f, "{s}"),
        }
    }
}

impl From<&Reading> for FieldValue {
    fn from(reading: &Reading) -> Self {
        match reading {
            Reading::Number(num) => FieldValue::Number(num.clone()),
            Reading::Placeholder(s) => FieldValue::Placeholder(s.clone()),
        }
    }
}

/// Data point in InfluxDB line protocol
#[derive(Debug)]
pub struct DataPoint {
    pub measurement: String,
    pub tag_set: BTreeMap<String, String>,
    pub field_set: BTreeMap<String, FieldValue>,
    /// Nanoseconds since the Unix epoch
    pub timestamp: i64,
}

fn fmt_tags(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    for (key, value) in data_point.tag_set.iter() {
        write!(fmt, ",{}={}", key, value)?;
    }
    Ok(())
}

fn fmt_fields(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    let mut first = true;
    for (key, value) in data_point.field_set.iter() {
        if first {
            first = false;
        } else {
            write!(fmt, ",")?;
        }
        write!(fmt, "{}={}", key, value)?;
    }
    Ok(())
}

fn fmt_timestamp(data_point: &DataPoint, fmt: &mut fmt::Formatter) -> fmt::Result {
    write!(fmt, " {}", data_point.timestamp)
}

impl fmt::Display for DataPoint {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.measurement)?;
        fmt_tags(self, fmt)?;
        write!(fmt, " ")?;
        fmt_fields(self, fmt)?;
        fmt_timestamp(self, fmt)
    }
}

/// InfluxDB line protocol formatter.
///
/// Every tag becomes seven points, one measurement per reading, tagged with
/// the MAC address the server keyed the tag by. The selected tag is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct InfluxDbFormatter;

impl InfluxDbFormatter {
    /// Measurement name, field name and value for each point of a tag.
    fn fields(tag: &Tag) -> [(&'static str, &'static str, FieldValue); 7] {
        let accel = &tag.acceleration;
        [
            ("temperature", "temp_C", FieldValue::from(&tag.temperature)),
            (
                "humidity",
                "humidity_percent",
                FieldValue::from(&tag.humidity),
            ),
            ("pressure", "pressure_hPa", FieldValue::from(&tag.pressure)),
            (
                "acceleration_x",
                "acceleration_g",
                FieldValue::from(&accel.x),
            ),
            (
                "acceleration_y",
                "acceleration_g",
                FieldValue::from(&accel.y),
            ),
            (
                "acceleration_z",
                "acceleration_g",
                FieldValue::from(&accel.z),
            ),
            ("battery", "battery_volt", FieldValue::from(&tag.battery)),
        ]
    }

    fn to_data_points(&self, mac: &str, tag: &Tag) -> Result<Vec<DataPoint>, RenderError> {
        let timestamp = epoch_nanos(&tag.time).ok_or_else(|| RenderError::InvalidTimestamp {
            mac: mac.to_string(),
            value: tag.time.clone(),
        })?;

        let points = Self::fields(tag)
            .into_iter()
            .map(|(measurement, field, value)| DataPoint {
                measurement: measurement.to_string(),
                tag_set: BTreeMap::from([("mac".to_string(), mac.to_string())]),
                field_set: BTreeMap::from([(field.to_string(), value)]),
                timestamp,
            })
            .collect();
        Ok(points)
    }
}

impl OutputFormatter for InfluxDbFormatter {
    fn format(&self, tags: &TagSet, _mac: Option<&str>) -> Result<String, RenderError> {
        let mut output = String::new();
        for (mac, tag) in tags.iter() {
            for point in self.to_data_points(mac, tag)? {
                output.push_str(&point.to_string());
                output.push('\n');
            }
        }
        Ok(output)
    }
}
