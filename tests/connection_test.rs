//! Connection tests against a loopback mock device.
//!
//! Run with: cargo test --test connection_test

mod common;

use common::{MockDevice, UPGRADE_OK};
use pixelblaze_ws::{Command, Config, Connection, Error, Session};
use std::time::Duration;

fn config_for(port: u16) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port,
        read_timeout_ms: Some(5_000),
        ..Config::default()
    }
}

#[test]
fn test_handshake_request_on_the_wire() {
    let device = MockDevice::start(UPGRADE_OK);
    let port = device.port;
    let conn = Connection::connect(&config_for(port)).unwrap();
    conn.close().unwrap();

    let captured = device.finish();
    let request = captured.request_text();
    assert!(request.starts_with("GET / HTTP/1.1\r\n"));
    assert!(request.contains(&format!("Host: 127.0.0.1:{port}\r\n")));
    assert!(request.contains("Upgrade: websocket\r\n"));
    assert!(request.contains("Connection: Upgrade\r\n"));
    assert!(request.contains("Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n"));
    assert!(request.contains("Sec-WebSocket-Version: 13\r\n"));
    assert!(captured.frames.is_empty());
}

#[test]
fn test_any_101_response_is_accepted() {
    let device = MockDevice::start(b"HTTP/1.1 101 Whatever\r\n\r\n");
    assert!(Connection::connect(&config_for(device.port)).is_ok());
    device.finish();
}

#[test]
fn test_404_response_is_handshake_error() {
    let device = MockDevice::start(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
    let result = Connection::connect(&config_for(device.port));
    assert!(matches!(result, Err(Error::Handshake(_))));
    device.finish();
}

#[test]
fn test_response_split_across_segments() {
    let device = MockDevice::start_chunked(vec![
        b"HTTP/1.1 10".to_vec(),
        b"1 Switching Protocols\r\n\r".to_vec(),
        b"\n".to_vec(),
    ]);
    assert!(Connection::connect(&config_for(device.port)).is_ok());
    device.finish();
}

#[test]
fn test_server_closing_early_is_handshake_error() {
    let device = MockDevice::start(b"HTTP/1.1 101 Switching Protocols\r\n");
    let result = Connection::connect(&config_for(device.port));
    assert!(matches!(result, Err(Error::Handshake(msg)) if msg.contains("closed")));
    device.finish();
}

#[test]
fn test_strict_mode_checks_accept_header() {
    let device = MockDevice::start(UPGRADE_OK);
    let config = Config {
        strict_handshake: true,
        ..config_for(device.port)
    };
    assert!(Connection::connect(&config).is_ok());
    device.finish();

    let device = MockDevice::start(
        b"HTTP/1.1 101 Switching Protocols\r\nSec-WebSocket-Accept: bogus\r\n\r\n",
    );
    let config = Config {
        strict_handshake: true,
        ..config_for(device.port)
    };
    assert!(matches!(
        Connection::connect(&config),
        Err(Error::Handshake(_))
    ));
    device.finish();
}

#[test]
fn test_session_frames_reach_device() {
    let device = MockDevice::start(UPGRADE_OK);
    let conn = Connection::connect(&config_for(device.port)).unwrap();
    let mut session = Session::new(conn, Duration::ZERO);

    session.send(&Command::parse_line("all 255 0 128").unwrap().unwrap()).unwrap();
    session.send(&Command::Off).unwrap();
    session.send(&Command::Off).unwrap();
    session.close().unwrap();

    let captured = device.finish();
    let payloads = captured.payloads();
    assert_eq!(payloads.len(), 3);

    let all = &payloads[0]["setVars"];
    assert_eq!(all["mode"], 2);
    assert!(all.get("ledIndex").is_none());
    assert_eq!(all["r"], 1.0);
    assert_eq!(all["g"], 0.0);
    let b = all["b"].as_f64().unwrap();
    assert!((b - 128.0 / 255.0).abs() < 1e-9);

    assert_eq!(payloads[1], payloads[2]);
    assert_eq!(payloads[1]["setVars"]["mode"], 0);
}

#[test]
fn test_connect_timeout_config_still_connects() {
    let device = MockDevice::start(UPGRADE_OK);
    let mut config = config_for(device.port);
    config.set_timeout_ms(2_000);
    assert!(Connection::connect(&config).is_ok());
    device.finish();
}
