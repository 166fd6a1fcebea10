//! Pixelblaze one-shot CLI: send a single command and exit.
//!
//! See the `pixelblaze_ws` library for the protocol core.

use anyhow::{Context, Result};
use clap::Parser;
use pixelblaze_ws::{constants, logging, Command, Config, Connection, Rgb8, Session};
use std::time::Duration;

/// Usage text printed for no arguments or an unrecognized command.
const USAGE: &str = "\
Pixelblaze LED Controller
Usage:
    pixelblaze off                          # Turn all LEDs off
    pixelblaze white                        # All LEDs white
    pixelblaze all <r> <g> <b>              # All LEDs custom color (0-255)
    pixelblaze led <index> <r> <g> <b>      # Single LED
    pixelblaze blue                         # Blue at index 0
    pixelblaze red                          # Red at index 255
    pixelblaze green <index>                # Green at specified index
    pixelblaze pixel <index> [brightness]   # White at index, brightness 0-100
    pixelblaze sequence <count> [blink_ms]  # Blink blue/green/red across the strip
    pixelblaze blink <index> <color> [n]    # Blink one LED (blue|red|green|white)
    pixelblaze check [count]                # Blue first, red last, green middle, off

Options:
    --host <HOST>          Device address (env PIXELBLAZE_HOST)
    --port <PORT>          Device port (env PIXELBLAZE_PORT)
    --strict-handshake     Verify Sec-WebSocket-Accept
    --timeout-ms <MS>      Connect/handshake timeout, 0 = block
    -v, --verbose          Debug logging on stderr
";

// CLI
#[derive(Parser)]
#[command(name = "pixelblaze")]
#[command(version)]
#[command(about = "Send a single setVars command to a Pixelblaze")]
#[command(disable_help_flag = true)]
struct Cli {
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
    /// Print usage
    #[arg(short, long)]
    help: bool,
    /// Command word followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = Config::load()?;
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.strict_handshake {
            config.strict_handshake = true;
        }
        if let Some(ms) = self.timeout_ms {
            config.set_timeout_ms(ms);
        }
        Ok(config)
    }
}

/// What the command line asked for.
enum Action {
    Send(Command),
    Sequence { pixel_count: u32, blink: Duration },
    Blink { index: u32, color: Rgb8, count: u32 },
    Check { pixel_count: u32 },
}

fn parse_action(words: &[String]) -> pixelblaze_ws::Result<Action> {
    let (name, args) = words
        .split_first()
        .ok_or_else(|| pixelblaze_ws::Error::argument("no command given"))?;

    let parse_num = |raw: &String, what: &str| {
        raw.parse::<u32>()
            .map_err(|e| pixelblaze_ws::Error::argument(format!("invalid {what} '{raw}': {e}")))
    };

    if name.eq_ignore_ascii_case("blink") {
        return match args {
            [index, color] | [index, color, _] => Ok(Action::Blink {
                index: parse_num(index, "LED index")?,
                color: Rgb8::from_name(color)?,
                count: match args.get(2) {
                    Some(count) => parse_num(count, "blink count")?,
                    None => constants::BLINK_COUNT,
                },
            }),
            _ => Err(pixelblaze_ws::Error::argument(
                "blink expects <index> <color> [count]",
            )),
        };
    }

    if name.eq_ignore_ascii_case("check") {
        return match args {
            [] => Ok(Action::Check {
                pixel_count: constants::DEFAULT_PIXEL_COUNT,
            }),
            [count] => Ok(Action::Check {
                pixel_count: parse_num(count, "pixel count")?,
            }),
            _ => Err(pixelblaze_ws::Error::argument("check expects [count]")),
        };
    }

    if name.eq_ignore_ascii_case("sequence") {
        return match args {
            [count] => Ok(Action::Sequence {
                pixel_count: parse_num(count, "pixel count")?,
                blink: constants::SEQUENCE_BLINK,
            }),
            [count, blink_ms] => Ok(Action::Sequence {
                pixel_count: parse_num(count, "pixel count")?,
                blink: Duration::from_millis(u64::from(parse_num(blink_ms, "blink time")?)),
            }),
            _ => Err(pixelblaze_ws::Error::argument(
                "sequence expects <count> [blink_ms]",
            )),
        };
    }

    Command::parse(name, args).map(Action::Send)
}

fn run(config: &Config, action: &Action) -> Result<()> {
    let conn = Connection::connect(config)
        .with_context(|| format!("Could not open WebSocket to {}", config.addr()))?;
    let mut session = Session::new(conn, config.oneshot_settle());

    let result = match action {
        Action::Send(command) => session.send(command).map(|()| println!("{}", command)),
        Action::Sequence { pixel_count, blink } => session
            .run_sequence(*pixel_count, *blink, |index, step| {
                println!("{:?} at index {}", step, index);
            }),
        Action::Blink {
            index,
            color,
            count,
        } => session
            .run_blink(*index, *color, *count, constants::BLINK_PERIOD)
            .map(|()| println!("LED {} blinked {} {} times", index, color, count)),
        Action::Check { pixel_count } => session.run_check(
            *pixel_count,
            constants::CHECK_HOLD,
            constants::CHECK_CLEAR_HOLD,
            |index, step| println!("{:?} at index {}", step, index),
        ),
    };

    // Close on every path, but report the send failure first.
    let closed = session.close();
    result.context("Failed to send command")?;
    closed.context("Failed to close connection")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.help || cli.command.is_empty() {
        print!("{USAGE}");
        return Ok(());
    }

    let action = match parse_action(&cli.command) {
        Ok(action) => action,
        Err(e) if e.is_command_error() => {
            log::debug!("{}", e);
            print!("{USAGE}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let config = cli.config()?;
    log::debug!("Using config: {:?}", config);
    run(&config, &action)
}
