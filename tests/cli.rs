//! Process level tests: exit codes and stream contents of the binary.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};

const TAGS: &str = r#"{"AA:BB:CC:DD:EE:FF": {"mac": "AA:BB:CC:DD:EE:FF", "name": "Kitchen", "humidity": 40.2, "temperature": 21.5, "pressure": 1013.0, "acceleration_x": 0.0, "acceleration_y": 0.0, "acceleration_z": 1.0, "battery": 3.0, "time": "2020-01-01T00:00:00+00:00"}}"#;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ruuvitag-form"))
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

/// Answer one HTTP request with `body`.
fn serve_once(body: &'static str) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .unwrap();
    });
    (address, handle)
}

/// An address nothing listens on.
fn refused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    // Make sure the port is really closed before handing it out.
    assert!(TcpStream::connect(address.trim_start_matches("http://")).is_err());
    address
}

#[test]
fn help_exits_successfully() {
    let output = run(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with("usage: ruuvitag-form [OPTIONS]... ADDRESS\n"));
    assert!(stdout(&output).ends_with("influxdb: time series database.\n\n"));
    assert!(stderr(&output).is_empty());
}

#[test]
fn missing_address_is_usage_error() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stderr(&output),
        "ruuvitag-form: Need to specify an url to a ruuvitag-hark server.\n\
         Try `ruuvitag-form --help' for more information.\n"
    );
    assert!(stdout(&output).is_empty());
}

#[test]
fn unknown_option_is_usage_error() {
    let output = run(&["--bogus", "http://127.0.0.1:1"]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.starts_with("ruuvitag-form: "));
    assert!(err.contains("--bogus"));
    assert!(err.ends_with("Try `ruuvitag-form --help' for more information.\n"));
}

#[test]
fn unreachable_server_renders_default_waybar() {
    let output = run(&[&refused_address()]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        r#"{"text": "-C -% -hPa", "class": "ruuvitag", "percentage": 0}"#
    );
    assert!(!stderr(&output).is_empty());
    assert!(!stderr(&output).contains("--help"));
}

#[test]
fn unsupported_format_is_usage_error() {
    let output = run(&["--format=XML", &refused_address()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("ruuvitag-form: xml is currently not supported\n"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn unknown_tag_is_usage_error() {
    let (address, server) = serve_once(TAGS);
    let output = run(&["--show=unknown", &address]);
    server.join().unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stderr(&output),
        "ruuvitag-form: Tag \"UNKNOWN\" does not exist\n\
         Try `ruuvitag-form --help' for more information.\n"
    );
}

#[test]
fn waybar_output_for_served_tag() {
    let (address, server) = serve_once(TAGS);
    let output = run(&["--show=aa:bb:cc:dd:ee:ff", &address]);
    server.join().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        r#"{"text": "21.50C 40.20% 1013.00hPa", "tooltip": "Kitchen: 21.50C 40.20% 1013.00hPa", "class": "ruuvitag", "percentage": 40.2}"#
    );
}

#[test]
fn influxdb_output_for_served_tag() {
    let (address, server) = serve_once(TAGS);
    let output = run(&["-F", "influxdb", &address]);
    server.join().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "temperature,mac=AA:BB:CC:DD:EE:FF temp_C=21.5 1577836800000000000\n\
         humidity,mac=AA:BB:CC:DD:EE:FF humidity_percent=40.2 1577836800000000000\n\
         pressure,mac=AA:BB:CC:DD:EE:FF pressure_hPa=1013.0 1577836800000000000\n\
         acceleration_x,mac=AA:BB:CC:DD:EE:FF acceleration_g=0.0 1577836800000000000\n\
         acceleration_y,mac=AA:BB:CC:DD:EE:FF acceleration_g=0.0 1577836800000000000\n\
         acceleration_z,mac=AA:BB:CC:DD:EE:FF acceleration_g=1.0 1577836800000000000\n\
         battery,mac=AA:BB:CC:DD:EE:FF battery_volt=3.0 1577836800000000000\n"
    );
}

#[test]
fn missing_field_is_fatal() {
    let (address, server) = serve_once(r#"{"AA:BB:CC:DD:EE:FF": {"mac": "AA:BB:CC:DD:EE:FF"}}"#);
    let output = run(&[&address]);
    server.join().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "ruuvitag-form: Tag \"AA:BB:CC:DD:EE:FF\" is missing field `name`\n"
    );
    assert!(stdout(&output).is_empty());
}

#[test]
fn placeholder_acceleration_renders_waybar() {
    let (address, server) = serve_once(
        r#"{"AA:BB:CC:DD:EE:FF": {"mac": "AA:BB:CC:DD:EE:FF", "name": "Kitchen", "humidity": 40.2, "temperature": 21.5, "pressure": 1013.0, "acceleration_x": "-", "acceleration_y": "-", "acceleration_z": "-", "battery": 3.0, "time": "2020-01-01T00:00:00+00:00"}}"#,
    );
    let output = run(&[&address]);
    server.join().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with(r#"{"text": "21.50C 40.20% 1013.00hPa", "#));
    assert!(stderr(&output).is_empty());
}

#[test]
fn abbreviated_long_options_are_accepted() {
    let (address, server) = serve_once(TAGS);
    let output = run(&["--form=influxdb", "--sh", "aa:bb:cc:dd:ee:ff", &address]);
    server.join().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output).lines().count(), 7);
}
