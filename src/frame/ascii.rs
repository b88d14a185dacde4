//! ASCII frame codec: `:` + hex(slave) + hex(fc) + hex(pdu) + hex(lrc) +
//! CR LF, each byte as two hex characters. LRC is the two's complement of
//! the 8-bit sum of slave+fc+pdu. Ported from `ascii_frame.c`/`lrc.c`.

use super::ParsedFrame;
use crate::error::{MbError, Result};

const MIN_FRAME_LEN: usize = 9;

/// Two's complement of the 8-bit sum of `data`.
pub fn lrc(data: &[u8]) -> u8 {
    let sum: u8 = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    sum.wrapping_neg()
}

fn byte_to_hex(byte: u8, out: &mut String) {
    out.push_str(&format!("{byte:02X}"));
}

fn hex_to_byte(hi: u8, lo: u8) -> Result<u8> {
    let hi = (hi as char)
        .to_digit(16)
        .ok_or_else(|| MbError::InvalidFrame("non-hex digit".into()))?;
    let lo = (lo as char)
        .to_digit(16)
        .ok_or_else(|| MbError::InvalidFrame("non-hex digit".into()))?;
    Ok(((hi << 4) | lo) as u8)
}

pub fn build(slave_id: u8, fc: u8, pdu: &[u8]) -> Result<Vec<u8>> {
    let mut lrc_input = Vec::with_capacity(2 + pdu.len());
    lrc_input.push(slave_id);
    lrc_input.push(fc);
    lrc_input.extend_from_slice(pdu);
    let checksum = lrc(&lrc_input);

    let mut out = String::with_capacity(1 + lrc_input.len() * 2 + 4);
    out.push(':');
    for &b in &lrc_input {
        byte_to_hex(b, &mut out);
    }
    byte_to_hex(checksum, &mut out);
    out.push('\r');
    out.push('\n');
    Ok(out.into_bytes())
}

pub fn parse(frame: &[u8]) -> Result<ParsedFrame> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(MbError::InvalidFrame(format!(
            "ASCII frame too short: {} bytes",
            frame.len()
        )));
    }
    if frame[0] != b':' {
        return Err(MbError::InvalidFrame("missing ':' start".into()));
    }
    let n = frame.len();
    if frame[n - 2] != b'\r' || frame[n - 1] != b'\n' {
        return Err(MbError::InvalidFrame("missing CRLF terminator".into()));
    }

    let hex_body = &frame[1..n - 2]; // slave+fc+pdu+lrc, as hex chars
    if hex_body.len() % 2 != 0 {
        return Err(MbError::InvalidFrame("odd hex digit count".into()));
    }

    let mut bytes = Vec::with_capacity(hex_body.len() / 2);
    for pair in hex_body.chunks_exact(2) {
        bytes.push(hex_to_byte(pair[0], pair[1])?);
    }
    if bytes.len() < 3 {
        return Err(MbError::InvalidFrame("frame too short after decode".into()));
    }

    let (data, checksum_slice) = bytes.split_at(bytes.len() - 1);
    let frame_lrc = checksum_slice[0];
    let calculated = lrc(data);
    if calculated != frame_lrc {
        return Err(MbError::LrcMismatch);
    }

    Ok(ParsedFrame {
        slave_id: data[0],
        function_code: data[1],
        pdu: data[2..].to_vec(),
        transaction_id: None,
    })
}

pub fn calc_frame_length(pdu_len: usize) -> usize {
    1 + 2 + 2 + (pdu_len * 2) + 2 + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lrc_is_twos_complement_of_sum() {
        assert_eq!(lrc(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x02]), 0xFA);
    }

    #[test]
    fn ascii_round_trip_emits_upper_case() {
        let frame = build(1, 0x03, &[0x00, 0x00, 0x00, 0x02]).unwrap();
        assert_eq!(frame, b":010300000002FA\r\n".to_vec());

        let parsed = parse(&frame).unwrap();
        assert_eq!(parsed.slave_id, 1);
        assert_eq!(parsed.function_code, 0x03);
        assert_eq!(parsed.pdu, vec![0x00, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn ascii_parse_accepts_lower_case_hex() {
        let parsed = parse(b":010300000002fa\r\n").unwrap();
        assert_eq!(parsed.slave_id, 1);
        assert_eq!(parsed.pdu, vec![0x00, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn lrc_mismatch_is_rejected() {
        assert_eq!(
            parse(b":010300000002FF\r\n").unwrap_err(),
            MbError::LrcMismatch
        );
    }

    #[test]
    fn missing_start_or_terminator_is_rejected() {
        assert!(matches!(
            parse(b"X010300000002FA\r\n"),
            Err(MbError::InvalidFrame(_))
        ));
        assert!(matches!(
            parse(b":010300000002FAxx"),
            Err(MbError::InvalidFrame(_))
        ));
    }
}
