//! Loopback mock of the device's WebSocket endpoint.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;
use std::time::Duration;

use pixelblaze_ws::frame::{apply_mask, header};

pub const UPGRADE_OK: &[u8] = b"HTTP/1.1 101 Switching Protocols\r\n\
    Upgrade: websocket\r\n\
    Connection: Upgrade\r\n\
    Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n\r\n";

/// What the mock saw from the client.
#[derive(Debug, Default)]
pub struct Captured {
    /// Bytes up to and including the request's blank line.
    pub request: Vec<u8>,
    /// Everything the client wrote afterwards.
    pub frames: Vec<u8>,
}

impl Captured {
    pub fn request_text(&self) -> String {
        String::from_utf8_lossy(&self.request).into_owned()
    }

    /// Unmasked payloads of every frame after the handshake.
    pub fn payloads(&self) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        let mut rest = self.frames.as_slice();
        while rest.len() >= header::LEN {
            assert_eq!(rest[0], 0x81, "expected FIN text frame");
            assert_eq!(rest[1] & 0x80, 0x80, "client frames must be masked");
            let len = (rest[1] & 0x7f) as usize;
            let key = [rest[2], rest[3], rest[4], rest[5]];
            let mut payload = rest[header::LEN..header::LEN + len].to_vec();
            apply_mask(&mut payload, key);
            out.push(serde_json::from_slice(&payload).expect("payload is JSON"));
            rest = &rest[header::LEN + len..];
        }
        out
    }
}

/// Mock server that answers the handshake with `response` chunks.
pub struct MockDevice {
    pub port: u16,
    handle: JoinHandle<Captured>,
}

impl MockDevice {
    /// Accept one client, reply with `response`, then record until EOF.
    pub fn start(response: &[u8]) -> Self {
        Self::start_chunked(vec![response.to_vec()])
    }

    /// Like [`MockDevice::start`], writing the response in separate pieces.
    pub fn start_chunked(chunks: Vec<Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let port = listener.local_addr().expect("local addr").port();

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept client");
            stream
                .set_read_timeout(Some(Duration::from_secs(10)))
                .expect("set timeout");

            let mut captured = Captured::default();
            let mut buf = [0u8; 512];
            while !captured.request.ends_with(b"\r\n\r\n") {
                let n = stream.read(&mut buf[..1]).expect("read request");
                if n == 0 {
                    return captured;
                }
                captured.request.extend_from_slice(&buf[..n]);
            }

            for chunk in chunks {
                stream.write_all(&chunk).expect("write response");
                stream.flush().expect("flush response");
                std::thread::sleep(Duration::from_millis(20));
            }
            // Closing without a terminator lets the client observe EOF.
            let _ = stream.shutdown(std::net::Shutdown::Write);

            loop {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => captured.frames.extend_from_slice(&buf[..n]),
                }
            }
            captured
        });

        Self { port, handle }
    }

    /// Wait for the client to disconnect and return what it sent.
    pub fn finish(self) -> Captured {
        self.handle.join().expect("mock device thread panicked")
    }
}
