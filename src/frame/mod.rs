//! Frame codec dispatch.
//!
//! Builds and parses wire frames for the three supported modes, each in
//! its own submodule. Generalizes `frame_builder.c`'s switch-on-`mode`
//! dispatch into match arms over the `Mode` tag, selected once at master
//! construction rather than per call.

pub mod ascii;
pub mod rtu;
pub mod tcp;

use crate::error::Result;
use crate::transport::Mode;

/// One decoded frame: the PDU payload plus the slave/unit id it echoed,
/// and — for TCP — the transaction id that was carried alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    pub slave_id: u8,
    pub function_code: u8,
    pub pdu: Vec<u8>,
    pub transaction_id: Option<u16>,
}

/// Builds a complete wire frame for `mode`. `transaction_id` is ignored
/// outside `Mode::Tcp`.
pub fn build_frame(
    mode: Mode,
    slave_id: u8,
    fc: u8,
    pdu: &[u8],
    transaction_id: u16,
) -> Result<Vec<u8>> {
    match mode {
        Mode::Rtu => rtu::build(slave_id, fc, pdu),
        Mode::Ascii => ascii::build(slave_id, fc, pdu),
        Mode::Tcp => tcp::build(transaction_id, slave_id, fc, pdu),
    }
}

/// Parses a complete wire frame for `mode`.
pub fn parse_frame(mode: Mode, frame: &[u8]) -> Result<ParsedFrame> {
    match mode {
        Mode::Rtu => rtu::parse(frame),
        Mode::Ascii => ascii::parse(frame),
        Mode::Tcp => tcp::parse(frame),
    }
}

/// Total wire length for a frame carrying `pdu_len` PDU bytes under `mode`.
pub fn calc_frame_length(mode: Mode, pdu_len: usize) -> usize {
    match mode {
        Mode::Rtu => rtu::calc_frame_length(pdu_len),
        Mode::Ascii => ascii::calc_frame_length(pdu_len),
        Mode::Tcp => tcp::calc_frame_length(pdu_len),
    }
}
