//! Fetching and decoding tags from a ruuvitag-hark server.
//!
//! The server answers `GET <address>/data` with a JSON object mapping MAC
//! addresses to the last reading of each tag.

use crate::tag::{Acceleration, Reading, Tag, TagSet};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Upper bound for the whole request, including reading the body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fields every tag entry must carry.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "mac",
    "name",
    "humidity",
    "temperature",
    "pressure",
    "acceleration_x",
    "acceleration_y",
    "acceleration_z",
    "battery",
    "time",
];

/// Errors for a response that arrived but could not be understood.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Response is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Tag \"{mac}\" is missing field `{field}`")]
    MissingField { mac: String, field: &'static str },
    #[error("Tag \"{mac}\" has invalid data: {source}")]
    InvalidEntry {
        mac: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of asking the server for its tags.
///
/// A server that cannot be reached is not an error: the caller reports the
/// message and carries on with no tags.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Tags(TagSet),
    Unreachable(String),
}

impl FetchOutcome {
    /// Split into the tags to render and an optional transport warning.
    pub fn into_parts(self) -> (TagSet, Option<String>) {
        match self {
            FetchOutcome::Tags(tags) => (tags, None),
            FetchOutcome::Unreachable(message) => (TagSet::new(), Some(message)),
        }
    }
}

#[derive(Deserialize)]
struct Entry {
    mac: String,
    name: String,
    humidity: Reading,
    temperature: Reading,
    pressure: Reading,
    acceleration_x: Reading,
    acceleration_y: Reading,
    acceleration_z: Reading,
    battery: Reading,
    time: String,
}

impl From<Entry> for Tag {
    fn from(entry: Entry) -> Self {
        Tag {
            mac: entry.mac,
            name: entry.name,
            humidity: entry.humidity,
            temperature: entry.temperature,
            pressure: entry.pressure,
            acceleration: Acceleration {
                x: entry.acceleration_x,
                y: entry.acceleration_y,
                z: entry.acceleration_z,
            },
            battery: entry.battery,
            time: entry.time,
        }
    }
}

fn decode_entry(mac: &str, value: Value) -> Result<Tag, DecodeError> {
    if let Value::Object(fields) = &value
        && let Some(field) = REQUIRED_FIELDS
            .into_iter()
            .find(|field| !fields.contains_key(*field))
    {
        return Err(DecodeError::MissingField {
            mac: mac.to_string(),
            field,
        });
    }

    serde_json::from_value::<Entry>(value)
        .map(Tag::from)
        .map_err(|source| DecodeError::InvalidEntry {
            mac: mac.to_string(),
            source,
        })
}

/// Decode a `/data` response body into a `TagSet`.
///
/// Decoding is strict: an entry lacking any of [`REQUIRED_FIELDS`] fails the
/// whole response. Unknown fields are ignored.
pub fn decode_tags(body: &[u8]) -> Result<TagSet, DecodeError> {
    let text = std::str::from_utf8(body)?;
    let entries: Map<String, Value> = serde_json::from_str(text)?;

    entries
        .into_iter()
        .map(|(mac, value)| decode_entry(&mac, value).map(|tag| (mac, tag)))
        .collect()
}

/// URL of the data endpoint. The address is used as given.
pub fn data_url(address: &str) -> String {
    format!("{address}/data")
}

/// Render an error with all of its sources, `outer: inner: ...`.
fn describe(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

/// Fetcher abstraction to enable deterministic unit tests without a server.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        address: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<FetchOutcome, DecodeError>> + Send + 'a>>;
}

/// Fetcher talking plain HTTP to a ruuvitag-hark server.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher using [`REQUEST_TIMEOUT`].
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn get_body(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// GET `<address>/data` and decode the tags.
    ///
    /// The status code is not inspected; whatever body arrives is decoded.
    pub async fn fetch_tags(&self, address: &str) -> Result<FetchOutcome, DecodeError> {
        let body = match self.get_body(&data_url(address)).await {
            Ok(body) => body,
            Err(error) => return Ok(FetchOutcome::Unreachable(describe(&error))),
        };
        decode_tags(&body).map(FetchOutcome::Tags)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        address: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<FetchOutcome, DecodeError>> + Send + 'a>> {
        Box::pin(self.fetch_tags(address))
    }
}
