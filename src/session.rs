//! Session drivers: one-shot send, the stdin/stdout bridge, and the LED
//! detection sequence.
//!
//! A [`Session`] owns exactly one [`Connection`]. Every send is followed by a
//! fixed settle delay; the device needs it to apply a frame before the socket
//! is reused or closed, and TCP gives no application-level acknowledgment.

use std::io::{BufRead, Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use crate::command::{Command, Rgb8};
use crate::constants::{ACK_LINE, QUIT_COMMAND, READY_LINE, SEQUENCE_MARKER_BLINKS};
use crate::error::Result;
use crate::ws::Connection;

/// Counters reported when the bridge loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeSummary {
    /// Lines answered with `OK`.
    pub acknowledged: usize,
    /// Lines that produced a frame.
    pub sent: usize,
    /// Lines that were acknowledged without sending.
    pub ignored: usize,
    /// Whether the loop ended on `quit` (as opposed to end of input).
    pub quit: bool,
}

/// What the detection sequence is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep {
    /// Start marker at index 0.
    Blue,
    /// Intermediate LED.
    Green,
    /// End marker at the last index.
    Red,
}

/// Exclusive owner of one device connection.
#[derive(Debug)]
pub struct Session<S: Read + Write = TcpStream> {
    conn: Connection<S>,
    settle: Duration,
}

impl<S: Read + Write> Session<S> {
    /// Wrap an upgraded connection; `settle` is slept after every send.
    pub fn new(conn: Connection<S>, settle: Duration) -> Self {
        Self { conn, settle }
    }

    /// Send one command and wait out the settle delay.
    pub fn send(&mut self, command: &Command) -> Result<()> {
        self.conn.send_vars(&command.vars())?;
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
        Ok(())
    }

    /// Borrow the connection.
    pub fn connection(&self) -> &Connection<S> {
        &self.conn
    }

    /// Close the connection.
    pub fn close(self) -> Result<()> {
        self.conn.close()
    }

    /// Line-oriented control loop for an external driver process.
    ///
    /// Writes `READY`, then for each input line:
    /// - blank: skipped, no reply
    /// - `quit` (any case): loop ends, no reply
    /// - anything else: parsed and sent if valid, then exactly one `OK`
    ///
    /// Invalid commands and oversized payloads are logged and still
    /// acknowledged so the driver never waits on a reply, including lines
    /// that are not valid UTF-8. End of input ends the loop like `quit`. Every reply is flushed immediately.
    ///
    /// # Errors
    ///
    /// Socket write failures and stdio failures are returned; they end the
    /// session.
    pub fn run_bridge<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> Result<BridgeSummary> {
        writeln!(output, "{READY_LINE}")?;
        output.flush()?;

        let mut summary = BridgeSummary::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            // Undecodable bytes become U+FFFD and fail to parse like any other junk.
            let line = String::from_utf8_lossy(&buf);
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let word = trimmed.split_whitespace().next().unwrap_or_default();
            if word.eq_ignore_ascii_case(QUIT_COMMAND) {
                log::info!("Bridge received quit");
                summary.quit = true;
                break;
            }

            match Command::parse_line(trimmed) {
                Ok(Some(command)) => match self.send(&command) {
                    Ok(()) => summary.sent += 1,
                    Err(e @ crate::Error::PayloadTooLarge { .. }) => {
                        log::warn!("Dropping '{}': {}", trimmed, e);
                        summary.ignored += 1;
                    }
                    Err(e) => return Err(e),
                },
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Ignoring '{}': {}", trimmed, e);
                    summary.ignored += 1;
                }
            }

            writeln!(output, "{ACK_LINE}")?;
            output.flush()?;
            summary.acknowledged += 1;
        }

        log::info!(
            "Bridge finished: {} acknowledged, {} sent, {} ignored",
            summary.acknowledged,
            summary.sent,
            summary.ignored
        );
        Ok(summary)
    }

    /// Walk the strip so a camera can locate every LED.
    ///
    /// Blinks blue at index 0, lights green at each index from 1 to
    /// `pixel_count - 2` with an `off` in between, then blinks red at the last
    /// index. Each half of a blink lasts `blink / 2` on top of the settle
    /// delay. `on_lit` is called once per LED position as it is shown.
    pub fn run_sequence<F>(&mut self, pixel_count: u32, blink: Duration, mut on_lit: F) -> Result<()>
    where
        F: FnMut(u32, SequenceStep),
    {
        if pixel_count == 0 {
            log::warn!("Detection sequence requested for an empty strip");
            return Ok(());
        }

        let half = blink / 2;
        let last = pixel_count - 1;
        log::info!("Starting LED detection sequence with {} pixels", pixel_count);

        for _ in 0..SEQUENCE_MARKER_BLINKS {
            self.blink(&Command::Blue, half)?;
        }
        on_lit(0, SequenceStep::Blue);

        for index in 1..last {
            self.blink(&Command::Green { index }, half)?;
            on_lit(index, SequenceStep::Green);
        }

        if last > 0 {
            let red = Command::Led {
                index: last,
                color: Rgb8::RED,
            };
            for _ in 0..SEQUENCE_MARKER_BLINKS {
                self.blink(&red, half)?;
            }
            on_lit(last, SequenceStep::Red);
        }

        log::info!("LED detection sequence complete");
        Ok(())
    }

    /// Blink one LED `count` times: lit for `period / 2`, then all off for
    /// `period / 2`.
    pub fn run_blink(
        &mut self,
        index: u32,
        color: Rgb8,
        count: u32,
        period: Duration,
    ) -> Result<()> {
        log::info!("Blinking LED {} {} {} times", index, color, count);
        let command = Command::Led { index, color };
        let half = period / 2;
        for _ in 0..count {
            self.blink(&command, half)?;
        }
        Ok(())
    }

    /// Quick wiring check: blue at index 0, red at the last index, green in
    /// the middle, each held for `hold`, then everything off for
    /// `clear_hold`. `on_lit` is called as each marker is shown.
    pub fn run_check<F>(
        &mut self,
        pixel_count: u32,
        hold: Duration,
        clear_hold: Duration,
        mut on_lit: F,
    ) -> Result<()>
    where
        F: FnMut(u32, SequenceStep),
    {
        if pixel_count == 0 {
            log::warn!("Connection check requested for an empty strip");
            return Ok(());
        }

        let last = pixel_count - 1;
        let middle = pixel_count / 2;
        let markers = [
            (0, SequenceStep::Blue, Command::Blue),
            (
                last,
                SequenceStep::Red,
                Command::Led {
                    index: last,
                    color: Rgb8::RED,
                },
            ),
            (middle, SequenceStep::Green, Command::Green { index: middle }),
        ];

        for (index, step, command) in markers {
            self.send(&command)?;
            on_lit(index, step);
            thread::sleep(hold);
        }

        self.send(&Command::Off)?;
        thread::sleep(clear_hold);
        log::info!("Connection check complete");
        Ok(())
    }

    fn blink(&mut self, command: &Command, half: Duration) -> Result<()> {
        self.send(command)?;
        thread::sleep(half);
        self.send(&Command::Off)?;
        thread::sleep(half);
        Ok(())
    }
}
