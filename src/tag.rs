//! RuuviTag reading data structures, as reported by a ruuvitag-hark server.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Placeholder shown for humidity, temperature and pressure without data.
pub const MISSING_READING: &str = "-";

/// Placeholder shown for battery and time without data.
pub const UNKNOWN_READING: &str = "?";

/// Placeholder MAC address of the default tag.
pub const UNKNOWN_MAC: &str = "--:--:--:--:--:--";

/// A single sensor value.
///
/// The server sends either a JSON number or a placeholder string when the
/// tag has not reported that value yet. Numbers keep their JSON
/// representation, so `1013.0` is printed back as `1013.0` and `40` as `40`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(Number),
    Placeholder(String),
}

impl Reading {
    /// Create a placeholder reading.
    pub fn placeholder(text: &str) -> Self {
        Reading::Placeholder(text.to_string())
    }

    /// The numeric value, if the reading holds one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Reading::Number(num) => num.as_f64(),
            Reading::Placeholder(_) => None,
        }
    }

    /// Format with two decimals. Placeholders are rendered verbatim.
    pub fn fixed(&self) -> String {
        match self.as_f64() {
            Some(value) => format!("{value:.2}"),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reading::Number(num) => write!(f, "{num}"),
            Reading::Placeholder(text) => write!(f, "{text}"),
        }
    }
}

impl From<f64> for Reading {
    /// Non-finite values have no JSON representation and become the `-` placeholder.
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(Reading::Number)
            .unwrap_or_else(|| Reading::placeholder(MISSING_READING))
    }
}

/// Acceleration vector in g. Each axis may be a placeholder like any other reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Acceleration {
    pub x: Reading,
    pub y: Reading,
    pub z: Reading,
}

impl Default for Acceleration {
    fn default() -> Self {
        Self {
            x: Reading::Number(0.into()),
            y: Reading::Number(0.into()),
            z: Reading::Number(0.into()),
        }
    }
}

/// Last known reading of one RuuviTag.
///
/// Units:
/// - Humidity in percent (0-100)
/// - Temperature in Celsius
/// - Pressure in hPa
/// - Battery voltage in Volts
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// MAC address, e.g. `AA:BB:CC:DD:EE:FF`
    pub mac: String,
    /// Human-readable name given to the tag on the server
    pub name: String,
    pub humidity: Reading,
    pub temperature: Reading,
    pub pressure: Reading,
    pub acceleration: Acceleration,
    pub battery: Reading,
    /// ISO-8601 time of the reading
    pub time: String,
}

impl Default for Tag {
    /// The tag shown when the server has nothing to report.
    fn default() -> Self {
        Self {
            mac: UNKNOWN_MAC.to_string(),
            name: "Unknown".to_string(),
            humidity: Reading::placeholder(MISSING_READING),
            temperature: Reading::placeholder(MISSING_READING),
            pressure: Reading::placeholder(MISSING_READING),
            acceleration: Acceleration::default(),
            battery: Reading::placeholder(UNKNOWN_READING),
            time: UNKNOWN_READING.to_string(),
        }
    }
}

impl fmt::Display for Tag {
    /// Short display string, e.g. `21.50C 40.20% 1013.00hPa`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}C {}% {}hPa",
            self.temperature.fixed(),
            self.humidity.fixed(),
            self.pressure.fixed()
        )
    }
}

/// All tags returned by one fetch, keyed by MAC address in the order the
/// server listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSet {
    tags: Vec<(String, Tag)>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag. An existing key keeps its position and gets the new tag.
    pub fn insert(&mut self, mac: String, tag: Tag) {
        match self.tags.iter_mut().find(|(key, _)| *key == mac) {
            Some((_, existing)) => *existing = tag,
            None => self.tags.push((mac, tag)),
        }
    }

    pub fn get(&self, mac: &str) -> Option<&Tag> {
        self.tags
            .iter()
            .find(|(key, _)| key == mac)
            .map(|(_, tag)| tag)
    }

    /// Key of the first tag the server reported.
    pub fn first_mac(&self) -> Option<&str> {
        self.tags.first().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.tags.iter().map(|(key, tag)| (key.as_str(), tag))
    }
}

impl FromIterator<(String, Tag)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (String, Tag)>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for (mac, tag) in iter {
            set.insert(mac, tag);
        }
        set
    }
}
