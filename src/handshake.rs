//! WebSocket opening handshake (client side).
//!
//! The request is fixed text with the RFC 6455 sample key:
//!
//! ```http
//! GET / HTTP/1.1
//! Host: 192.168.86.65:81
//! Upgrade: websocket
//! Connection: Upgrade
//! Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==
//! Sec-WebSocket-Version: 13
//! ```
//!
//! The response is read until the blank line that ends the headers. In
//! [`HandshakeMode::Lenient`] it is accepted if "101" occurs anywhere in it,
//! which is what the device firmware has always been driven with.
//! [`HandshakeMode::Strict`] also checks the status line and
//! `Sec-WebSocket-Accept`.

use std::io::{ErrorKind, Read};

use base64::Engine;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

/// Static `Sec-WebSocket-Key`, not randomized per connection.
pub const HANDSHAKE_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";

/// RFC 6455 GUID for Sec-WebSocket-Accept calculation.
const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Blank line terminating the HTTP header block.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Upper bound on the accumulated header block.
pub const MAX_RESPONSE_LEN: usize = 16 * 1024;

/// Size of each read while waiting for the header block.
const READ_CHUNK: usize = 1024;

/// How the upgrade response is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandshakeMode {
    /// Accept iff the header block contains the bytes "101".
    #[default]
    Lenient,
    /// Require a `101` status line and a matching `Sec-WebSocket-Accept`.
    Strict,
}

/// Build the upgrade request text.
pub fn request(host: &str, port: u16, path: &str) -> String {
    format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {host}:{port}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: {HANDSHAKE_KEY}\r\n\
         Sec-WebSocket-Version: 13\r\n\
         \r\n"
    )
}

/// Compute the Sec-WebSocket-Accept value for a client key.
///
/// base64(SHA-1(key ++ GUID)), per RFC 6455 section 4.2.2.
pub fn compute_accept_key(client_key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(client_key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
}

/// Read from `reader` until the header terminator has been seen.
///
/// Returns the header block including the terminator. Anything the server
/// sent after it in the same read is dropped.
///
/// # Errors
///
/// - [`Error::Handshake`] if the peer closes first, the block exceeds
///   [`MAX_RESPONSE_LEN`], or a read timeout fires.
/// - [`Error::Io`] for other socket failures.
pub fn read_response<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut response = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(Error::handshake(format!(
                    "timed out waiting for upgrade response ({} bytes received)",
                    response.len()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if n == 0 {
            return Err(Error::handshake(format!(
                "connection closed before end of response headers ({} bytes received)",
                response.len()
            )));
        }

        // Only the tail of the previous buffer can complete a terminator.
        let search_from = response.len().saturating_sub(HEADER_TERMINATOR.len() - 1);
        response.extend_from_slice(&chunk[..n]);

        if let Some(pos) = find(&response[search_from..], HEADER_TERMINATOR) {
            let end = search_from + pos + HEADER_TERMINATOR.len();
            let trailing = response.len() - end;
            if trailing > 0 {
                log::debug!("Discarding {} bytes received after upgrade headers", trailing);
            }
            response.truncate(end);
            return Ok(response);
        }

        if response.len() > MAX_RESPONSE_LEN {
            return Err(Error::handshake(format!(
                "response headers exceed {MAX_RESPONSE_LEN} bytes"
            )));
        }
    }
}

/// Judge a header block returned by [`read_response`].
///
/// # Errors
///
/// Returns [`Error::Handshake`] describing why the upgrade was refused.
pub fn validate(response: &[u8], mode: HandshakeMode) -> Result<()> {
    if find(response, b"101").is_none() {
        return Err(Error::handshake(format!(
            "server did not switch protocols: {}",
            status_line(response)
        )));
    }

    if mode == HandshakeMode::Lenient {
        return Ok(());
    }

    let text = String::from_utf8_lossy(response);
    let mut lines = text.split("\r\n");

    let status = lines.next().unwrap_or_default();
    let code = status.split_whitespace().nth(1);
    if !status.starts_with("HTTP/1.1") || code != Some("101") {
        return Err(Error::handshake(format!(
            "expected 101 Switching Protocols, got '{status}'"
        )));
    }

    let accept = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("sec-websocket-accept"))
        .map(|(_, value)| value.trim())
        .ok_or_else(|| Error::handshake("missing Sec-WebSocket-Accept header"))?;

    let expected = compute_accept_key(HANDSHAKE_KEY);
    if accept != expected {
        return Err(Error::handshake(format!(
            "invalid Sec-WebSocket-Accept: expected {expected}, got {accept}"
        )));
    }

    Ok(())
}

/// First line of the response, for error messages.
fn status_line(response: &[u8]) -> String {
    let end = find(response, b"\r\n").unwrap_or(response.len());
    String::from_utf8_lossy(&response[..end]).into_owned()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
