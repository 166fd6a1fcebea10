//! Command vocabulary shared by the one-shot CLI and the bridge loop.
//!
//! | command | args                    | record                                  |
//! |---------|-------------------------|-----------------------------------------|
//! | `off`   | -                       | mode 0, black                           |
//! | `white` | -                       | mode 2, white                           |
//! | `all`   | `r g b` (0-255)         | mode 2, rgb / 255                       |
//! | `led`   | `idx r g b` (0-255)     | mode 1, `ledIndex` idx, rgb / 255       |
//! | `blue`  | -                       | mode 1, `ledIndex` 0, blue              |
//! | `red`   | -                       | mode 1, `ledIndex` 255, red             |
//! | `green` | `idx`                   | mode 1, `ledIndex` idx, green           |
//! | `pixel` | `idx [brightness 0-100]`| mode 1, `ledIndex` idx, white * b / 100 |
//!
//! Names are matched case-insensitively. `clear` and `light` are accepted as
//! aliases of `off` and `led`.

use std::fmt;

use crate::error::{Error, Result};
use crate::vars::{Mode, VarRecord};

/// Index the `red` command lights.
pub const RED_INDEX: u32 = 255;

/// Brightness used by `pixel` when none is given.
pub const DEFAULT_BRIGHTNESS: f64 = 100.0;

/// 8-bit color as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb8 {
    /// Full red.
    pub const RED: Self = Self { r: 255, g: 0, b: 0 };
    /// Full green.
    pub const GREEN: Self = Self { r: 0, g: 255, b: 0 };
    /// Full blue.
    pub const BLUE: Self = Self { r: 0, g: 0, b: 255 };
    /// Full white.
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255 };

    /// Look up one of the marker colors by name (`blue`, `red`, `green`,
    /// `white`), ignoring case.
    ///
    /// # Errors
    ///
    /// [`Error::Argument`] for any other name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "blue" => Ok(Self::BLUE),
            "red" => Ok(Self::RED),
            "green" => Ok(Self::GREEN),
            "white" => Ok(Self::WHITE),
            _ => Err(Error::argument(format!(
                "unknown color '{name}' (use blue, red, green or white)"
            ))),
        }
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({},{},{})", self.r, self.g, self.b)
    }
}

/// A recognized LED command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Turn every LED off.
    Off,
    /// Every LED full white.
    White,
    /// Every LED one color.
    All(Rgb8),
    /// One LED one color.
    Led {
        /// LED index.
        index: u32,
        /// Color.
        color: Rgb8,
    },
    /// Blue at index 0 (start marker).
    Blue,
    /// Red at index 255 (end marker).
    Red,
    /// Green at the given index.
    Green {
        /// LED index.
        index: u32,
    },
    /// White at the given index, scaled by brightness.
    Pixel {
        /// LED index.
        index: u32,
        /// Brightness percentage in [0, 100].
        brightness: f64,
    },
}

impl Command {
    /// Parse a command word and its arguments.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownCommand`] for words outside the vocabulary,
    /// [`Error::Argument`] for a wrong argument count or a value that does
    /// not parse.
    pub fn parse<S: AsRef<str>>(name: &str, args: &[S]) -> Result<Self> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let lowered = name.to_ascii_lowercase();

        match lowered.as_str() {
            "off" | "clear" => {
                expect_arity(&lowered, &args, 0, "")?;
                Ok(Self::Off)
            }
            "white" => {
                expect_arity(&lowered, &args, 0, "")?;
                Ok(Self::White)
            }
            "blue" => {
                expect_arity(&lowered, &args, 0, "")?;
                Ok(Self::Blue)
            }
            "red" => {
                expect_arity(&lowered, &args, 0, "")?;
                Ok(Self::Red)
            }
            "all" => {
                expect_arity(&lowered, &args, 3, "<r> <g> <b>")?;
                Ok(Self::All(parse_rgb(&args)?))
            }
            "led" | "light" => {
                expect_arity(&lowered, &args, 4, "<index> <r> <g> <b>")?;
                Ok(Self::Led {
                    index: parse_index(args[0])?,
                    color: parse_rgb(&args[1..])?,
                })
            }
            "green" => {
                expect_arity(&lowered, &args, 1, "<index>")?;
                Ok(Self::Green {
                    index: parse_index(args[0])?,
                })
            }
            "pixel" => match args.as_slice() {
                [index] => Ok(Self::Pixel {
                    index: parse_index(index)?,
                    brightness: DEFAULT_BRIGHTNESS,
                }),
                [index, brightness] => Ok(Self::Pixel {
                    index: parse_index(index)?,
                    brightness: parse_brightness(brightness)?,
                }),
                _ => Err(Error::argument(format!(
                    "pixel expects <index> [brightness], got {} argument(s)",
                    args.len()
                ))),
            },
            _ => Err(Error::UnknownCommand(name.to_string())),
        }
    }

    /// Parse a whitespace-separated line such as `led 4 255 0 0`.
    ///
    /// Returns `Ok(None)` for a blank line.
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = tokens.collect();
        Self::parse(name, &args).map(Some)
    }

    /// Variable record the device should receive for this command.
    pub fn vars(&self) -> VarRecord {
        match *self {
            Self::Off => VarRecord::off(),
            Self::White => VarRecord::new(Mode::All, None, 1.0, 1.0, 1.0),
            Self::All(Rgb8 { r, g, b }) => VarRecord::from_rgb8(Mode::All, None, r, g, b),
            Self::Led {
                index,
                color: Rgb8 { r, g, b },
            } => VarRecord::from_rgb8(Mode::Single, Some(index), r, g, b),
            Self::Blue => VarRecord::new(Mode::Single, Some(0), 0.0, 0.0, 1.0),
            Self::Red => VarRecord::new(Mode::Single, Some(RED_INDEX), 1.0, 0.0, 0.0),
            Self::Green { index } => VarRecord::new(Mode::Single, Some(index), 0.0, 1.0, 0.0),
            Self::Pixel { index, brightness } => {
                let level = brightness / 100.0;
                VarRecord::new(Mode::Single, Some(index), level, level, level)
            }
        }
    }
}

/// Confirmation line printed by the one-shot CLI.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "LEDs OFF"),
            Self::White => write!(f, "All LEDs WHITE"),
            Self::All(color) => write!(f, "All LEDs {color}"),
            Self::Led { index, color } => write!(f, "LED {index} = {color}"),
            Self::Blue => write!(f, "BLUE at index 0"),
            Self::Red => write!(f, "RED at index {RED_INDEX}"),
            Self::Green { index } => write!(f, "GREEN at index {index}"),
            Self::Pixel { index, brightness } => {
                write!(f, "PIXEL {index} at {brightness}% brightness")
            }
        }
    }
}

fn expect_arity(name: &str, args: &[&str], expected: usize, usage: &str) -> Result<()> {
    if args.len() == expected {
        return Ok(());
    }
    if usage.is_empty() {
        Err(Error::argument(format!(
            "{name} takes no arguments, got {}",
            args.len()
        )))
    } else {
        Err(Error::argument(format!(
            "{name} expects {usage}, got {} argument(s)",
            args.len()
        )))
    }
}

fn parse_index(raw: &str) -> Result<u32> {
    raw.parse::<u32>()
        .map_err(|e| Error::argument(format!("invalid LED index '{raw}': {e}")))
}

/// 0-255 channel; out-of-range integers are clamped.
fn parse_channel(raw: &str) -> Result<u8> {
    let value = raw
        .parse::<i64>()
        .map_err(|e| Error::argument(format!("invalid color value '{raw}': {e}")))?;
    Ok(value.clamp(0, 255) as u8)
}

fn parse_rgb(args: &[&str]) -> Result<Rgb8> {
    Ok(Rgb8 {
        r: parse_channel(args[0])?,
        g: parse_channel(args[1])?,
        b: parse_channel(args[2])?,
    })
}

/// 0-100 percentage; out-of-range values are clamped.
fn parse_brightness(raw: &str) -> Result<f64> {
    let value = raw
        .parse::<f64>()
        .map_err(|e| Error::argument(format!("invalid brightness '{raw}': {e}")))?;
    if !value.is_finite() {
        return Err(Error::argument(format!("invalid brightness '{raw}'")));
    }
    Ok(value.clamp(0.0, 100.0))
}
