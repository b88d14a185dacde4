//! PDU container and First-Fit Decreasing packer.
//!
//! After the gap-aware merge pass, surviving blocks are packed into PDU
//! containers bounded by `max_pdu_chars`. Packing is range-union sizing,
//! exactly like merge, but runs as a separate pass *after* the cost-based
//! merge — it may legally fold blocks whose gap the cost test rejected,
//! since its only question is "does it fit the frame", not "is it
//! beneficial". Ported from `ffd_pack.c`.

use crate::block::Block;
use crate::error::{MbError, Result};
use crate::policy;

/// An accumulator during packing: the address-range union of every block
/// folded into it so far, plus the resulting data byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pdu {
    pub slave_id: u8,
    pub function_code: u8,
    pub start_address: u16,
    pub quantity: u16,
    pub total_chars: u16,
}

impl Pdu {
    fn empty(slave_id: u8, function_code: u8) -> Self {
        Pdu {
            slave_id,
            function_code,
            start_address: 0,
            quantity: 0,
            total_chars: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

/// Whether folding `block` into `pdu` stays within the function code's max
/// quantity and `max_pdu_chars`. An empty PDU always fits if the block
/// alone is within `max_pdu_chars`.
pub fn fits_pdu(block: &Block, pdu: &Pdu, max_pdu_chars: u16) -> bool {
    if pdu.is_empty() {
        return block.data_size() <= max_pdu_chars;
    }
    if block.slave_id != pdu.slave_id || block.function_code != pdu.function_code {
        return false;
    }
    let min_addr = block.start_address.min(pdu.start_address);
    let block_end = block.end();
    let pdu_end = pdu.start_address as u32 + pdu.quantity as u32;
    let max_end = block_end.max(pdu_end);
    let merged_quantity = (max_end - min_addr as u32) as u16;

    let max_quantity = policy::max_quantity(block.function_code);
    if merged_quantity > max_quantity {
        return false;
    }
    policy::data_bytes(block.function_code, merged_quantity) <= max_pdu_chars
}

/// Folds `block` into `pdu`, widening its address range union. Caller must
/// have already confirmed `fits_pdu`.
pub fn add_block_to_pdu(block: &Block, pdu: &mut Pdu) {
    if pdu.is_empty() {
        pdu.slave_id = block.slave_id;
        pdu.function_code = block.function_code;
        pdu.start_address = block.start_address;
        pdu.quantity = block.quantity;
        pdu.total_chars = block.data_size();
        return;
    }
    let min_addr = block.start_address.min(pdu.start_address);
    let max_end = block.end().max(pdu.start_address as u32 + pdu.quantity as u32);
    pdu.start_address = min_addr;
    pdu.quantity = (max_end - min_addr as u32) as u16;
    pdu.total_chars = policy::data_bytes(pdu.function_code, pdu.quantity);
}

/// Packs `blocks` into PDUs bounded by `max_pdu_chars`, First-Fit
/// Decreasing: blocks are tried largest-quantity first, placed into the
/// first existing PDU they fit, else seed a new one. Returns the PDUs plus
/// a map from each input block's index to the PDU index it landed in,
/// needed to keep the scatter/gather chain intact since packing reorders
/// blocks internally.
pub fn ffd_pack(blocks: &[Block], max_pdu_chars: u16, max_pdus: usize) -> Result<(Vec<Pdu>, Vec<usize>)> {
    if blocks.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut order: Vec<usize> = (0..blocks.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(blocks[i].quantity));

    let mut pdus: Vec<Pdu> = Vec::new();
    let mut block_to_pdu = vec![0usize; blocks.len()];

    for &i in &order {
        let block = &blocks[i];
        let mut placed = None;
        for (j, pdu) in pdus.iter().enumerate() {
            if fits_pdu(block, pdu, max_pdu_chars) {
                placed = Some(j);
                break;
            }
        }
        match placed {
            Some(j) => {
                add_block_to_pdu(block, &mut pdus[j]);
                block_to_pdu[i] = j;
            }
            None => {
                let empty = Pdu::empty(block.slave_id, block.function_code);
                if !fits_pdu(block, &empty, max_pdu_chars) {
                    return Err(MbError::PduTooLarge {
                        data_bytes: block.data_size() as usize,
                        max: max_pdu_chars as usize,
                    });
                }
                if pdus.len() >= max_pdus {
                    return Err(MbError::TooManyPlans {
                        count: pdus.len() + 1,
                        cap: max_pdus,
                    });
                }
                let mut pdu = empty;
                add_block_to_pdu(block, &mut pdu);
                pdus.push(pdu);
                block_to_pdu[i] = pdus.len() - 1;
            }
        }
    }

    Ok((pdus, block_to_pdu))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FC_READ_HOLDING_REGISTERS;

    #[test]
    fn empty_pdu_accepts_any_block_within_limit() {
        let pdu = Pdu::empty(1, FC_READ_HOLDING_REGISTERS);
        let block = Block::new(1, FC_READ_HOLDING_REGISTERS, 0, 100);
        assert!(fits_pdu(&block, &pdu, 253));

        let too_big = Block::new(1, FC_READ_HOLDING_REGISTERS, 0, 125);
        assert!(!fits_pdu(&too_big, &pdu, 200)); // 125*2=250 > 200
    }

    #[test]
    fn ffd_pack_single_block_one_pdu() {
        let blocks = vec![Block::new(1, FC_READ_HOLDING_REGISTERS, 0, 10)];
        let (pdus, map) = ffd_pack(&blocks, 253, 16).unwrap();
        assert_eq!(pdus.len(), 1);
        assert_eq!(map, vec![0]);
        assert_eq!(pdus[0].total_chars, 20);
    }

    #[test]
    fn ffd_pack_splits_incompatible_blocks_into_separate_pdus() {
        let blocks = vec![
            Block::new(1, FC_READ_HOLDING_REGISTERS, 0, 10),
            Block::new(2, FC_READ_HOLDING_REGISTERS, 0, 10),
        ];
        let (pdus, _) = ffd_pack(&blocks, 253, 16).unwrap();
        assert_eq!(pdus.len(), 2);
    }

    #[test]
    fn ffd_pack_respects_max_pdu_chars() {
        // Two 100-register blocks (200 bytes each) can't share a 253-byte PDU.
        let blocks = vec![
            Block::new(1, FC_READ_HOLDING_REGISTERS, 0, 100),
            Block::new(1, FC_READ_HOLDING_REGISTERS, 200, 100),
        ];
        let (pdus, _) = ffd_pack(&blocks, 253, 16).unwrap();
        assert_eq!(pdus.len(), 2);
    }

    #[test]
    fn ffd_pack_rejects_a_block_too_large_for_any_pdu() {
        // 125 registers (at policy max) = 250 bytes, doesn't fit a 200-byte PDU.
        let blocks = vec![Block::new(1, FC_READ_HOLDING_REGISTERS, 0, 125)];
        let err = ffd_pack(&blocks, 200, 16).unwrap_err();
        assert!(matches!(err, MbError::PduTooLarge { .. }));
    }

    #[test]
    fn ffd_pack_exceeding_max_pdus_fails() {
        let blocks = vec![
            Block::new(1, FC_READ_HOLDING_REGISTERS, 0, 10),
            Block::new(2, FC_READ_HOLDING_REGISTERS, 0, 10),
        ];
        let err = ffd_pack(&blocks, 253, 1).unwrap_err();
        assert!(matches!(err, MbError::TooManyPlans { .. }));
    }
}
