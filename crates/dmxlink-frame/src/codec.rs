use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Start-of-message delimiter.
pub const START_BYTE: u8 = 0x7E;

/// End-of-message delimiter.
pub const STOP_BYTE: u8 = 0xE7;

/// Framing overhead: start + label + length pair + stop = 5 bytes.
pub const OVERHEAD: usize = 5;

/// Maximum payload size the protocol allows.
pub const MAX_PAYLOAD: usize = 600;

/// Total wire size of a frame carrying `payload_len` bytes.
pub fn wire_size(payload_len: usize) -> usize {
    payload_len + OVERHEAD
}

/// Split a length into its little-endian byte pair.
///
/// Fails with [`FrameError::ValueOutOfRange`] if `n` does not fit the
/// 16-bit wire field.
pub fn split_length(n: usize) -> Result<(u8, u8)> {
    if n >= 1 << 16 {
        return Err(FrameError::ValueOutOfRange {
            value: n,
            max: (1 << 16) - 1,
        });
    }
    Ok((n as u8, (n >> 8) as u8))
}

/// Encode a message into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────┬───────────┬──────────────┬──────────────┬────────────┐
/// │ 0x7E       │ Label     │ Length       │ Payload      │ 0xE7       │
/// │ (start)    │ (1B)      │ (2B LE)      │ (0..=600B)   │ (stop)     │
/// └────────────┴───────────┴──────────────┴──────────────┴────────────┘
/// ```
pub fn encode_frame(label: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let (len_lo, len_hi) = split_length(payload.len())?;

    dst.reserve(wire_size(payload.len()));
    dst.put_u8(START_BYTE);
    dst.put_u8(label);
    dst.put_u8(len_lo);
    dst.put_u8(len_hi);
    dst.put_slice(payload);
    dst.put_u8(STOP_BYTE);
    Ok(())
}

/// Decode a complete reply frame of known payload length.
///
/// The protocol carries no correlation identifiers, so the caller knows
/// exactly which label and payload length it is waiting for; this verifies
/// the total length and the label echo, and returns the payload slice.
///
/// The stop byte's value is deliberately not validated. Reply lengths are
/// fixed per label, so a corrupted trailer surfaces as a length or label
/// mismatch on the next exchange rather than here.
pub fn decode_reply(raw: &[u8], expected_label: u8, expected_payload_len: usize) -> Result<Bytes> {
    let expected_total = wire_size(expected_payload_len);
    if raw.len() != expected_total {
        return Err(FrameError::LengthMismatch {
            expected: expected_total,
            actual: raw.len(),
        });
    }

    if raw[1] != expected_label {
        return Err(FrameError::UnexpectedLabel {
            expected: expected_label,
            actual: raw[1],
        });
    }

    Ok(Bytes::copy_from_slice(&raw[4..raw.len() - 1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels;

    #[test]
    fn encode_decode_roundtrip() {
        let payload = b"widget parameters";
        let mut wire = BytesMut::new();

        encode_frame(labels::GET_PARAMETERS, payload, &mut wire).unwrap();

        assert_eq!(wire.len(), wire_size(payload.len()));
        assert_eq!(wire[0], START_BYTE);
        assert_eq!(wire[wire.len() - 1], STOP_BYTE);

        let decoded = decode_reply(&wire, labels::GET_PARAMETERS, payload.len()).unwrap();
        assert_eq!(decoded.as_ref(), payload);
    }

    #[test]
    fn roundtrip_across_payload_sizes() {
        for len in [0usize, 1, 23, 24, 512, 600] {
            let payload = vec![0x5A; len];
            let mut wire = BytesMut::new();
            encode_frame(labels::OUTPUT_ONLY_DMX, &payload, &mut wire).unwrap();

            let decoded = decode_reply(&wire, labels::OUTPUT_ONLY_DMX, len).unwrap();
            assert_eq!(decoded.as_ref(), payload.as_slice());
        }
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let mut wire = BytesMut::new();

        let err = encode_frame(labels::OUTPUT_ONLY_DMX, &payload, &mut wire).unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { size: 601, max: 600 }
        ));
        assert!(wire.is_empty());
    }

    #[test]
    fn split_length_little_endian_pairs() {
        assert_eq!(split_length(511).unwrap(), (0xFF, 0x01));
        assert_eq!(split_length(256).unwrap(), (0x00, 0x01));
        assert_eq!(split_length(0).unwrap(), (0x00, 0x00));
        assert_eq!(split_length(65535).unwrap(), (0xFF, 0xFF));
    }

    #[test]
    fn split_length_rejects_wide_values() {
        let err = split_length(65536).unwrap_err();
        assert!(matches!(err, FrameError::ValueOutOfRange { value: 65536, .. }));
    }

    #[test]
    fn decode_rejects_length_mismatch() {
        let mut wire = BytesMut::new();
        encode_frame(labels::GET_SERIAL, &[1, 2, 3, 4], &mut wire).unwrap();

        let err = decode_reply(&wire, labels::GET_SERIAL, 5).unwrap_err();
        assert!(matches!(
            err,
            FrameError::LengthMismatch {
                expected: 10,
                actual: 9
            }
        ));
    }

    #[test]
    fn decode_rejects_label_mismatch() {
        let mut wire = BytesMut::new();
        encode_frame(labels::GET_SERIAL, &[1, 2, 3, 4], &mut wire).unwrap();

        let err = decode_reply(&wire, labels::GET_PARAMETERS, 4).unwrap_err();
        assert!(matches!(
            err,
            FrameError::UnexpectedLabel {
                expected: labels::GET_PARAMETERS,
                actual: labels::GET_SERIAL
            }
        ));
    }

    #[test]
    fn decode_does_not_inspect_stop_byte() {
        let mut wire = BytesMut::new();
        encode_frame(labels::GET_SERIAL, &[9, 9, 9, 9], &mut wire).unwrap();
        let last = wire.len() - 1;
        wire[last] = 0x00;

        let decoded = decode_reply(&wire, labels::GET_SERIAL, 4).unwrap();
        assert_eq!(decoded.as_ref(), &[9, 9, 9, 9]);
    }

    #[test]
    fn empty_payload_frame() {
        let mut wire = BytesMut::new();
        encode_frame(labels::GET_SERIAL, &[], &mut wire).unwrap();

        assert_eq!(wire.as_ref(), &[START_BYTE, labels::GET_SERIAL, 0, 0, STOP_BYTE]);
        let decoded = decode_reply(&wire, labels::GET_SERIAL, 0).unwrap();
        assert!(decoded.is_empty());
    }
}
