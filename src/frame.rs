//! Client-to-server WebSocket frame encoder.
//!
//! Only the subset the device needs: a single unfragmented, masked text frame
//! with a 7-bit payload length.
//!
//! ```text
//! [0x81] [0x80 | len] [0x12 0x34 0x56 0x78] [payload[i] ^ key[i % 4] ...]
//! ```
//!
//! The masking key is a fixed constant. There is no extended length encoding,
//! so payloads above [`MAX_PAYLOAD_LEN`] are rejected rather than split.

use crate::error::{Error, Result};

/// Largest payload that fits the 7-bit length field.
pub const MAX_PAYLOAD_LEN: usize = 125;

/// Fixed masking key applied to every frame.
pub const MASK_KEY: [u8; 4] = [0x12, 0x34, 0x56, 0x78];

/// Header byte constants.
pub mod header {
    /// FIN bit with the text opcode (0x1).
    pub const FIN_TEXT: u8 = 0x81;
    /// MASK bit in the second header byte.
    pub const MASK_BIT: u8 = 0x80;
    /// Bytes before the payload: two header bytes plus the masking key.
    pub const LEN: usize = 6;
}

/// Encode `payload` as one masked text frame.
///
/// # Errors
///
/// Returns [`Error::PayloadTooLarge`] if the payload is longer than
/// [`MAX_PAYLOAD_LEN`] bytes.
pub fn encode(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(Error::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }

    let mut buf = Vec::with_capacity(header::LEN + payload.len());
    buf.push(header::FIN_TEXT);
    buf.push(header::MASK_BIT | payload.len() as u8);
    buf.extend_from_slice(&MASK_KEY);
    buf.extend_from_slice(payload);
    apply_mask(&mut buf[header::LEN..], MASK_KEY);
    Ok(buf)
}

/// XOR `data` in place with `key`, cycling the key every 4 bytes.
///
/// Masking is an involution, so the same call unmasks.
pub fn apply_mask(data: &mut [u8], key: [u8; 4]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= key[i % 4];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unmask(frame: &[u8]) -> Vec<u8> {
        let mut payload = frame[header::LEN..].to_vec();
        let key = [frame[2], frame[3], frame[4], frame[5]];
        apply_mask(&mut payload, key);
        payload
    }

    #[test]
    fn test_header_layout() {
        let frame = encode(b"hi").unwrap();
        assert_eq!(frame[0], 0x81);
        assert_eq!(frame[1], 0x80 | 2);
        assert_eq!(&frame[2..6], &[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(frame.len(), 8);
    }

    #[test]
    fn test_known_masked_bytes() {
        // 'a' = 0x61, 'b' = 0x62, 'c' = 0x63, 'd' = 0x64, 'e' = 0x65
        let frame = encode(b"abcde").unwrap();
        assert_eq!(
            &frame[6..],
            &[0x61 ^ 0x12, 0x62 ^ 0x34, 0x63 ^ 0x56, 0x64 ^ 0x78, 0x65 ^ 0x12]
        );
    }

    #[test]
    fn test_unmask_recovers_payload_at_every_length() {
        for len in 0..=MAX_PAYLOAD_LEN {
            let payload: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            let frame = encode(&payload).unwrap();
            assert_eq!(frame[1], 0x80 | len as u8);
            assert_eq!(frame.len(), header::LEN + len);
            assert_eq!(unmask(&frame), payload);
        }
    }

    #[test]
    fn test_empty_payload() {
        let frame = encode(b"").unwrap();
        assert_eq!(frame, vec![0x81, 0x80, 0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_length_boundary() {
        assert!(encode(&[b'x'; 125]).is_ok());

        match encode(&[b'x'; 126]) {
            Err(Error::PayloadTooLarge { len, max }) => {
                assert_eq!(len, 126);
                assert_eq!(max, 125);
            }
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let payload = br#"{"setVars":{"mode":0,"r":0.0,"g":0.0,"b":0.0}}"#;
        assert_eq!(encode(payload).unwrap(), encode(payload).unwrap());
    }

    #[test]
    fn test_apply_mask_is_involution() {
        let mut data = b"setVars".to_vec();
        apply_mask(&mut data, MASK_KEY);
        assert_ne!(data, b"setVars");
        apply_mask(&mut data, MASK_KEY);
        assert_eq!(data, b"setVars");
    }
}
