//! WebSocket connection to the device.
//!
//! Blocking, single-owner transport: dial, upgrade, then write masked text
//! frames. Nothing is ever read after the handshake, so there is no frame
//! parser, ping/pong, or close handshake.
//!
//! [`Connection`] is generic over the byte stream so the handshake and frame
//! writes can be exercised against in-memory streams; production code uses
//! the `TcpStream` default.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame;
use crate::handshake::{self, HandshakeMode};
use crate::vars::VarRecord;

/// An upgraded WebSocket connection that owns its stream.
///
/// Dropping the connection closes the socket.
#[derive(Debug)]
pub struct Connection<S: Read + Write = TcpStream> {
    stream: S,
    peer: String,
    frames_sent: u64,
}

impl Connection<TcpStream> {
    /// Dial the configured device and perform the upgrade handshake.
    ///
    /// # Errors
    ///
    /// [`Error::Connection`] if the TCP connect fails, [`Error::Handshake`]
    /// if the upgrade response is rejected.
    pub fn connect(config: &Config) -> Result<Self> {
        let addr = config.addr();
        log::info!("Connecting to Pixelblaze at {}", addr);

        let stream = open_tcp(&addr, config.connect_timeout())?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_nodelay(true)?;

        let conn = Self::handshake(
            stream,
            &config.host,
            config.port,
            &config.path,
            config.handshake_mode(),
        )?;
        log::info!("WebSocket connected to Pixelblaze at {}", addr);
        Ok(conn)
    }
}

impl<S: Read + Write> Connection<S> {
    /// Send the upgrade request over `stream` and validate the response.
    ///
    /// # Errors
    ///
    /// [`Error::Handshake`] if the response is rejected under `mode`, or
    /// [`Error::Io`] if the stream fails.
    pub fn handshake(
        mut stream: S,
        host: &str,
        port: u16,
        path: &str,
        mode: HandshakeMode,
    ) -> Result<Self> {
        let request = handshake::request(host, port, path);
        stream.write_all(request.as_bytes())?;
        stream.flush()?;

        let response = handshake::read_response(&mut stream)?;
        log::debug!(
            "Upgrade response ({} bytes): {}",
            response.len(),
            String::from_utf8_lossy(&response).trim_end()
        );
        handshake::validate(&response, mode)?;

        Ok(Self {
            stream,
            peer: format!("{host}:{port}"),
            frames_sent: 0,
        })
    }

    /// Write `payload` as one masked text frame and flush it.
    ///
    /// # Errors
    ///
    /// [`Error::PayloadTooLarge`] before anything is written, or
    /// [`Error::Io`] if the write fails.
    pub fn send_text(&mut self, payload: &[u8]) -> Result<()> {
        let bytes = frame::encode(payload)?;
        self.stream.write_all(&bytes)?;
        self.stream.flush()?;
        self.frames_sent += 1;
        log::trace!(
            "Sent frame #{} to {} ({} byte payload)",
            self.frames_sent,
            self.peer,
            payload.len()
        );
        Ok(())
    }

    /// Serialize `record` as `{"setVars": ...}` and send it.
    pub fn send_vars(&mut self, record: &VarRecord) -> Result<()> {
        let payload = record.payload()?;
        log::debug!("Sending: {}", String::from_utf8_lossy(&payload));
        self.send_text(&payload)
    }

    /// Number of frames written so far.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// `host:port` this connection was opened to.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Flush and release the stream.
    pub fn close(mut self) -> Result<()> {
        self.stream.flush()?;
        log::info!(
            "Pixelblaze connection to {} closed after {} frame(s)",
            self.peer,
            self.frames_sent
        );
        Ok(())
    }
}

/// Connect to `addr`, trying each resolved address when a timeout is set.
fn open_tcp(addr: &str, timeout: Option<Duration>) -> Result<TcpStream> {
    let connection_error = |source: std::io::Error| Error::Connection {
        addr: addr.to_string(),
        source,
    };

    let Some(timeout) = timeout else {
        return TcpStream::connect(addr).map_err(connection_error);
    };

    let mut last_err = None;
    for socket_addr in addr.to_socket_addrs().map_err(connection_error)? {
        match TcpStream::connect_timeout(&socket_addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                log::debug!("Connection attempt to {} failed: {}", socket_addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(connection_error(last_err.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "host resolved to no addresses",
        )
    })))
}
