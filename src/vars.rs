//! `setVars` payloads understood by the LED pattern running on the device.
//!
//! The pattern exports `mode`, `ledIndex`, `r`, `g` and `b`. Colors are
//! normalized floats, never 0-255.

use serde::{Serialize, Serializer};

use crate::error::Result;

/// Display mode exported by the device pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// All LEDs dark.
    Off = 0,
    /// Only `ledIndex` lit.
    Single = 1,
    /// Every LED the same color.
    All = 2,
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// One variable assignment sent to the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarRecord {
    /// Display mode.
    pub mode: Mode,
    /// Target LED for [`Mode::Single`].
    #[serde(rename = "ledIndex", skip_serializing_if = "Option::is_none")]
    pub led_index: Option<u32>,
    /// Red channel in [0.0, 1.0].
    pub r: f64,
    /// Green channel in [0.0, 1.0].
    pub g: f64,
    /// Blue channel in [0.0, 1.0].
    pub b: f64,
}

#[derive(Serialize)]
struct SetVars<'a> {
    #[serde(rename = "setVars")]
    set_vars: &'a VarRecord,
}

impl VarRecord {
    /// Build a record, clamping channels into [0.0, 1.0].
    pub fn new(mode: Mode, led_index: Option<u32>, r: f64, g: f64, b: f64) -> Self {
        Self {
            mode,
            led_index,
            r: clamp_unit(r),
            g: clamp_unit(g),
            b: clamp_unit(b),
        }
    }

    /// Build a record from 8-bit channels (divided by 255).
    pub fn from_rgb8(mode: Mode, led_index: Option<u32>, r: u8, g: u8, b: u8) -> Self {
        Self::new(
            mode,
            led_index,
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        )
    }

    /// All LEDs off.
    pub fn off() -> Self {
        Self::new(Mode::Off, None, 0.0, 0.0, 0.0)
    }

    /// JSON payload `{"setVars":{...}}` as UTF-8 bytes.
    pub fn payload(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&SetVars { set_vars: self })?)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_payload() {
        let payload = VarRecord::off().payload().unwrap();
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            r#"{"setVars":{"mode":0,"r":0.0,"g":0.0,"b":0.0}}"#
        );
    }

    #[test]
    fn test_led_index_serialized_as_camel_case() {
        let record = VarRecord::new(Mode::Single, Some(42), 0.0, 1.0, 0.0);
        let value: serde_json::Value = serde_json::from_slice(&record.payload().unwrap()).unwrap();
        assert_eq!(value["setVars"]["mode"], 1);
        assert_eq!(value["setVars"]["ledIndex"], 42);
        assert_eq!(value["setVars"]["g"], 1.0);
    }

    #[test]
    fn test_channels_are_clamped() {
        let record = VarRecord::new(Mode::All, None, 1.5, -0.2, f64::NAN);
        assert_eq!((record.r, record.g, record.b), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_from_rgb8_normalizes() {
        let record = VarRecord::from_rgb8(Mode::All, None, 255, 0, 128);
        assert!((record.r - 1.0).abs() < f64::EPSILON);
        assert!(record.g.abs() < f64::EPSILON);
        assert!((record.b - 0.502).abs() < 0.001);
    }

    #[test]
    fn test_worst_case_payload_fits_one_frame() {
        let record = VarRecord::from_rgb8(Mode::Single, Some(u32::MAX), 128, 128, 128);
        assert!(record.payload().unwrap().len() <= crate::frame::MAX_PAYLOAD_LEN);
    }
}
