//! RTU frame codec: `[slave:1][fc:1][pdu:N][crc_lo:1][crc_hi:1]`.
//!
//! CRC-16/Modbus: polynomial 0xA001 (reflected 0x8005), init 0xFFFF, no
//! final XOR, serialized little-endian. `original_source` ships only
//! `crc16.h` (the interface) with no corresponding `.c` — the algorithm
//! below is the standard Modbus CRC-16, not reconstructed from any
//! decompiled source.

use super::ParsedFrame;
use crate::error::{MbError, Result};

const MIN_FRAME_LEN: usize = 4;

/// CRC-16/Modbus over `data`, table-free bit-shift form.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

fn crc16_verify(frame: &[u8]) -> bool {
    if frame.len() < 2 {
        return false;
    }
    let (body, crc_bytes) = frame.split_at(frame.len() - 2);
    let expected = crc16(body);
    let got = u16::from_le_bytes([crc_bytes[0], crc_bytes[1]]);
    expected == got
}

pub fn build(slave_id: u8, fc: u8, pdu: &[u8]) -> Result<Vec<u8>> {
    let mut frame = Vec::with_capacity(2 + pdu.len() + 2);
    frame.push(slave_id);
    frame.push(fc);
    frame.extend_from_slice(pdu);
    let crc = crc16(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());
    Ok(frame)
}

pub fn parse(frame: &[u8]) -> Result<ParsedFrame> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(MbError::InvalidFrame(format!(
            "RTU frame too short: {} bytes",
            frame.len()
        )));
    }
    if !crc16_verify(frame) {
        return Err(MbError::CrcMismatch);
    }
    Ok(ParsedFrame {
        slave_id: frame[0],
        function_code: frame[1],
        pdu: frame[2..frame.len() - 2].to_vec(),
        transaction_id: None,
    })
}

pub fn calc_frame_length(pdu_len: usize) -> usize {
    1 + 1 + pdu_len + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc16_matches_known_vector() {
        // slave=1, fc=0x03, start=0x0000, quantity=2: 01 03 00 00 00 02 C4 0B
        let body = [0x01, 0x03, 0x00, 0x00, 0x00, 0x02];
        let crc = crc16(&body);
        assert_eq!(crc.to_le_bytes(), [0xC4, 0x0B]);
    }

    #[test]
    fn rtu_round_trip_seed_scenario() {
        let frame = build(1, 0x03, &[0x00, 0x00, 0x00, 0x02]).unwrap();
        assert_eq!(frame, vec![0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x0B]);

        let parsed = parse(&frame).unwrap();
        assert_eq!(parsed.slave_id, 1);
        assert_eq!(parsed.function_code, 0x03);
        assert_eq!(parsed.pdu, vec![0x00, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn crc_mismatch_is_rejected() {
        let mut frame = build(1, 0x03, &[0x00, 0x00, 0x00, 0x02]).unwrap();
        *frame.last_mut().unwrap() ^= 0xFF;
        assert_eq!(parse(&frame).unwrap_err(), MbError::CrcMismatch);
    }

    #[test]
    fn frame_too_short_is_rejected() {
        assert!(matches!(
            parse(&[0x01, 0x02, 0x03]),
            Err(MbError::InvalidFrame(_))
        ));
    }
}
