//! Error taxonomy for the Smart Modbus master.
//!
//! Every fallible public operation returns `Result<T, Error>`. No panics,
//! no hidden retries: the taxonomy mirrors §7 of the design spec and keeps
//! parameter, framing, protocol, transport, and capacity failures distinct
//! so callers can decide what to do with each.

use thiserror::Error;

/// Errors surfaced by the planner, codecs, and master driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MbError {
    // -- Parameter --
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
    #[error("buffer too small: need {needed}, have {have}")]
    BufferTooSmall { needed: usize, have: usize },
    #[error("invalid function code: 0x{0:02X}")]
    InvalidFc(u8),
    #[error("invalid address: start {start} quantity {quantity}")]
    InvalidAddress { start: u16, quantity: u16 },
    #[error("invalid quantity {quantity} for fc 0x{fc:02X} (max {max})")]
    InvalidQuantity { fc: u8, quantity: u16, max: u16 },

    // -- Framing --
    #[error("CRC mismatch")]
    CrcMismatch,
    #[error("LRC mismatch")]
    LrcMismatch,
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    // -- Protocol --
    #[error("exception response: code {code}")]
    ExceptionResponse { code: u8 },

    // -- Transport --
    #[error("transport error: {0}")]
    Transport(String),
    #[error("timeout after {0:?}")]
    Timeout(std::time::Duration),

    // -- Capacity --
    #[error("no blocks to process")]
    NoBlocks,
    #[error("too many blocks: {count} exceeds cap {cap}")]
    TooManyBlocks { count: usize, cap: usize },
    #[error("PDU too large: {data_bytes} bytes exceeds max_pdu_chars {max}")]
    PduTooLarge { data_bytes: usize, max: usize },
    #[error("too many plans: {count} exceeds cap {cap}")]
    TooManyPlans { count: usize, cap: usize },
    #[error("out of memory")]
    OutOfMemory,

    // -- Support --
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl MbError {
    /// Exception code carried by `ExceptionResponse`, if this is one.
    pub fn exception_code(&self) -> Option<u8> {
        match self {
            MbError::ExceptionResponse { code } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MbError>;
