//! Pixelblaze bridge: a stdin/stdout command loop for an external driver.
//!
//! Protocol: `READY` once connected, then one `OK` per non-blank input line
//! until `quit` or end of input. See [`pixelblaze_ws::Session::run_bridge`].

use anyhow::{Context, Result};
use clap::Parser;
use pixelblaze_ws::{logging, Config, Connection, Session};

// CLI
#[derive(Parser)]
#[command(name = "pixelblaze-bridge")]
#[command(version)]
#[command(about = "Line-oriented Pixelblaze control loop (stdin commands, stdout acks)")]
struct Cli {
    /// Device host name or IP address (same as --host)
    host_arg: Option<String>,
    /// Device host name or IP address
    #[arg(long)]
    host: Option<String>,
    /// Device WebSocket port
    #[arg(long)]
    port: Option<u16>,
    /// Verify the status line and Sec-WebSocket-Accept
    #[arg(long)]
    strict_handshake: bool,
    /// Connect and handshake timeout in milliseconds (0 blocks)
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load()?;
    if let Some(host) = cli.host.or(cli.host_arg) {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if cli.strict_handshake {
        config.strict_handshake = true;
    }
    if let Some(ms) = cli.timeout_ms {
        config.set_timeout_ms(ms);
    }

    let conn = Connection::connect(&config)
        .with_context(|| format!("Could not open WebSocket to {}", config.addr()))?;
    let mut session = Session::new(conn, config.bridge_settle());

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let result = session.run_bridge(stdin.lock(), stdout.lock());

    let closed = session.close();
    result.context("Bridge loop failed")?;
    closed.context("Failed to close connection")?;
    Ok(())
}
