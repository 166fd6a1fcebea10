//! Application-wide constants.
//!
//! Device address defaults and the post-send delays the firmware needs.

use std::time::Duration;

// ============================================================================
// Device
// ============================================================================

/// Default device address.
pub const DEFAULT_HOST: &str = "192.168.86.65";

/// Default Pixelblaze WebSocket port.
pub const DEFAULT_PORT: u16 = 81;

// ============================================================================
// Timing
// ============================================================================

/// Delay after the single frame of the one-shot CLI, before the socket is
/// closed.
///
/// Closing sooner can drop the frame before the device has applied it.
pub const ONESHOT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Delay after each frame in the bridge loop, before `OK` is written.
pub const BRIDGE_SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Default full blink period (on + off) for the detection sequence.
pub const SEQUENCE_BLINK: Duration = Duration::from_millis(200);

/// Number of blinks for the start and end markers of the detection sequence.
pub const SEQUENCE_MARKER_BLINKS: usize = 3;

/// Default full blink period (on + off) for `blink`.
pub const BLINK_PERIOD: Duration = Duration::from_millis(500);

/// Default number of blinks for `blink`.
pub const BLINK_COUNT: u32 = 20;

/// How long each marker stays lit during `check`.
pub const CHECK_HOLD: Duration = Duration::from_secs(1);

/// Pause after the final clear of `check`.
pub const CHECK_CLEAR_HOLD: Duration = Duration::from_millis(500);

/// Strip length assumed by `check` when none is given.
pub const DEFAULT_PIXEL_COUNT: u32 = 256;

// ============================================================================
// Bridge protocol
// ============================================================================

/// Line written once the device connection is up.
pub const READY_LINE: &str = "READY";

/// Line written after every processed input line.
pub const ACK_LINE: &str = "OK";

/// Input line that ends the bridge loop.
pub const QUIT_COMMAND: &str = "quit";
