//! TCP frame codec: MBAP header `[txn:2][proto:2=0][length:2][unit:1][fc:1][pdu:N]`,
//! all big-endian. `length = 2 + N`. Ported from `tcp_frame.c`, using
//! `byteorder` for the big-endian reads/writes the way the teacher's
//! `tcp.rs` does for its own telegram headers.
//!
//! Transaction id allocation belongs to the master (`Wrapping<u16>`
//! counter, incremented per request and verified on response) — unlike
//! `frame_builder.c`, which always builds with `transaction_id = 0` and
//! never increments it.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::ParsedFrame;
use crate::error::{MbError, Result};

const MBAP_LEN: usize = 7;
const MIN_FRAME_LEN: usize = MBAP_LEN + 1;

pub fn build(transaction_id: u16, unit_id: u8, fc: u8, pdu: &[u8]) -> Result<Vec<u8>> {
    let length = 2 + pdu.len();
    let mut frame = Vec::with_capacity(MBAP_LEN + 1 + pdu.len());
    frame
        .write_u16::<BigEndian>(transaction_id)
        .expect("writing to a Vec cannot fail");
    frame
        .write_u16::<BigEndian>(0x0000)
        .expect("writing to a Vec cannot fail");
    frame
        .write_u16::<BigEndian>(length as u16)
        .expect("writing to a Vec cannot fail");
    frame.push(unit_id);
    frame.push(fc);
    frame.extend_from_slice(pdu);
    Ok(frame)
}

pub fn parse(frame: &[u8]) -> Result<ParsedFrame> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(MbError::InvalidFrame(format!(
            "TCP frame too short: {} bytes",
            frame.len()
        )));
    }
    let mut cursor = frame;
    let transaction_id = cursor
        .read_u16::<BigEndian>()
        .map_err(|e| MbError::InvalidFrame(e.to_string()))?;
    let protocol_id = cursor
        .read_u16::<BigEndian>()
        .map_err(|e| MbError::InvalidFrame(e.to_string()))?;
    if protocol_id != 0x0000 {
        return Err(MbError::InvalidFrame(format!(
            "non-zero protocol id {protocol_id:#06x}"
        )));
    }
    let length = cursor
        .read_u16::<BigEndian>()
        .map_err(|e| MbError::InvalidFrame(e.to_string()))? as usize;
    if MBAP_LEN + length != frame.len() {
        return Err(MbError::InvalidFrame(format!(
            "length field {length} inconsistent with frame size {}",
            frame.len()
        )));
    }

    let unit_id = frame[MBAP_LEN - 1];
    let fc = frame[MBAP_LEN];
    let pdu = frame[MBAP_LEN + 1..].to_vec();

    Ok(ParsedFrame {
        slave_id: unit_id,
        function_code: fc,
        pdu,
        transaction_id: Some(transaction_id),
    })
}

pub fn calc_frame_length(pdu_len: usize) -> usize {
    MBAP_LEN + 1 + pdu_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tcp_round_trip_preserves_length_field() {
        let frame = build(42, 1, 0x03, &[0x00, 0x00, 0x00, 0x02]).unwrap();
        assert_eq!(
            frame,
            vec![0x00, 0x2A, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x02]
        );

        let parsed = parse(&frame).unwrap();
        assert_eq!(parsed.transaction_id, Some(42));
        assert_eq!(parsed.slave_id, 1);
        assert_eq!(parsed.function_code, 0x03);
        assert_eq!(parsed.pdu, vec![0x00, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn non_zero_protocol_id_is_rejected() {
        let mut frame = build(1, 1, 0x03, &[]).unwrap();
        frame[2] = 0x01;
        assert!(matches!(parse(&frame), Err(MbError::InvalidFrame(_))));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut frame = build(1, 1, 0x03, &[0x00, 0x00]).unwrap();
        frame.push(0xFF); // trailing byte not reflected in length
        assert!(matches!(parse(&frame), Err(MbError::InvalidFrame(_))));
    }

    #[test]
    fn frame_too_short_is_rejected() {
        assert!(matches!(
            parse(&[0x00, 0x00, 0x00]),
            Err(MbError::InvalidFrame(_))
        ));
    }
}
