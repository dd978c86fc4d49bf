use crate::tag::{Acceleration, Reading, Tag, TagSet};

/// A stable MAC address for unit tests.
pub const TEST_MAC: &str = "AA:BB:CC:DD:EE:FF";

/// A second MAC address for tests that need more than one tag.
pub const OTHER_MAC: &str = "11:22:33:44:55:66";

/// Build a `Tag` with the given display values and fixed remaining fields.
///
/// Tests can override just the fields they care about.
pub fn tag(mac: &str, name: &str, temperature: f64, humidity: f64, pressure: f64) -> Tag {
    Tag {
        mac: mac.to_string(),
        name: name.to_string(),
        humidity: Reading::from(humidity),
        temperature: Reading::from(temperature),
        pressure: Reading::from(pressure),
        acceleration: Acceleration {
            x: Reading::from(0.004),
            y: Reading::from(-0.004),
            z: Reading::from(1.036),
        },
        battery: Reading::from(2.977),
        time: "2020-01-01T00:00:00+00:00".to_string(),
    }
}

/// Build a `TagSet` keyed by each tag's own MAC address.
pub fn tag_set(tags: Vec<Tag>) -> TagSet {
    tags.into_iter().map(|t| (t.mac.clone(), t)).collect()
}

/// Serve a single HTTP request on a loopback port, answering with `body`.
///
/// Returns the base address to fetch from and a handle resolving to the
/// raw request head the client sent.
pub async fn serve_once(body: &str) -> (String, tokio::task::JoinHandle<String>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (address, handle)
}
