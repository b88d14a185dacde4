//! Function-code policy table.
//!
//! A fixed, read-only registry of per-function-code constants: mergeability,
//! read/write disposition, fixed request/response overhead in characters,
//! per-unit cost (×100 fixed point), and maximum quantity. Generalizes the
//! teacher's `constant.rs` word-length table (`WL_BIT..WL_TIMER`,
//! `data_size_byte`) to the ten Modbus function codes this crate supports.

/// Read Coils.
pub const FC_READ_COILS: u8 = 0x01;
/// Read Discrete Inputs.
pub const FC_READ_DISCRETE_INPUTS: u8 = 0x02;
/// Read Holding Registers.
pub const FC_READ_HOLDING_REGISTERS: u8 = 0x03;
/// Read Input Registers.
pub const FC_READ_INPUT_REGISTERS: u8 = 0x04;
/// Write Single Coil.
pub const FC_WRITE_SINGLE_COIL: u8 = 0x05;
/// Write Single Register.
pub const FC_WRITE_SINGLE_REGISTER: u8 = 0x06;
/// Write Multiple Coils.
pub const FC_WRITE_MULTIPLE_COILS: u8 = 0x0F;
/// Write Multiple Registers.
pub const FC_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;
/// Mask Write Register.
pub const FC_MASK_WRITE_REGISTER: u8 = 0x16;
/// Read/Write Multiple Registers.
pub const FC_READ_WRITE_MULTIPLE_REGISTERS: u8 = 0x17;

/// The unit a function code addresses: a single bit (coil) or a 16-bit word
/// (register). Governs both data-byte sizing and gap-cost arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Bit,
    Register,
}

/// Policy entry for one function code: `{fc, supports_merge, is_read,
/// req_fixed_chars, resp_fixed_chars, extra_unit_chars_x100, max_quantity}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FcPolicy {
    pub fc: u8,
    pub supports_merge: bool,
    pub is_read: bool,
    pub req_fixed_chars: u8,
    pub resp_fixed_chars: u8,
    /// Per-unit cost scaled ×100 (so 0.125 B/bit and 2 B/reg share a table).
    /// Sizing itself always uses the integer rule in `unit_kind`, not this.
    pub extra_unit_chars_x100: u16,
    pub max_quantity: u16,
}

const TABLE: &[FcPolicy] = &[
    FcPolicy {
        fc: FC_READ_COILS,
        supports_merge: true,
        is_read: true,
        req_fixed_chars: 6,
        resp_fixed_chars: 5,
        extra_unit_chars_x100: 12,
        max_quantity: 2000,
    },
    FcPolicy {
        fc: FC_READ_DISCRETE_INPUTS,
        supports_merge: true,
        is_read: true,
        req_fixed_chars: 6,
        resp_fixed_chars: 5,
        extra_unit_chars_x100: 12,
        max_quantity: 2000,
    },
    FcPolicy {
        fc: FC_READ_HOLDING_REGISTERS,
        supports_merge: true,
        is_read: true,
        req_fixed_chars: 6,
        resp_fixed_chars: 5,
        extra_unit_chars_x100: 200,
        max_quantity: 125,
    },
    FcPolicy {
        fc: FC_READ_INPUT_REGISTERS,
        supports_merge: true,
        is_read: true,
        req_fixed_chars: 6,
        resp_fixed_chars: 5,
        extra_unit_chars_x100: 200,
        max_quantity: 125,
    },
    FcPolicy {
        fc: FC_WRITE_SINGLE_COIL,
        supports_merge: false,
        is_read: false,
        req_fixed_chars: 6,
        resp_fixed_chars: 6,
        extra_unit_chars_x100: 0,
        max_quantity: 1,
    },
    FcPolicy {
        fc: FC_WRITE_SINGLE_REGISTER,
        supports_merge: false,
        is_read: false,
        req_fixed_chars: 6,
        resp_fixed_chars: 6,
        extra_unit_chars_x100: 0,
        max_quantity: 1,
    },
    FcPolicy {
        fc: FC_WRITE_MULTIPLE_COILS,
        supports_merge: false, // only contiguous blocks
        is_read: false,
        req_fixed_chars: 7,
        resp_fixed_chars: 6,
        extra_unit_chars_x100: 0,
        max_quantity: 1968,
    },
    FcPolicy {
        fc: FC_WRITE_MULTIPLE_REGISTERS,
        supports_merge: false, // only contiguous blocks
        is_read: false,
        req_fixed_chars: 7,
        resp_fixed_chars: 6,
        extra_unit_chars_x100: 0,
        max_quantity: 123,
    },
    FcPolicy {
        fc: FC_MASK_WRITE_REGISTER,
        supports_merge: false,
        is_read: false,
        req_fixed_chars: 8,
        resp_fixed_chars: 8,
        extra_unit_chars_x100: 0,
        max_quantity: 1,
    },
    FcPolicy {
        fc: FC_READ_WRITE_MULTIPLE_REGISTERS,
        supports_merge: false,
        is_read: true, // primarily a read operation
        req_fixed_chars: 11,
        resp_fixed_chars: 5,
        extra_unit_chars_x100: 0,
        max_quantity: 121,
    },
];

/// Looks up the policy entry for `fc`, `None` if unlisted.
pub fn policy(fc: u8) -> Option<&'static FcPolicy> {
    TABLE.iter().find(|p| p.fc == fc)
}

pub fn is_valid(fc: u8) -> bool {
    policy(fc).is_some()
}

pub fn supports_merge(fc: u8) -> bool {
    policy(fc).is_some_and(|p| p.supports_merge)
}

pub fn is_read(fc: u8) -> bool {
    policy(fc).is_some_and(|p| p.is_read)
}

pub fn max_quantity(fc: u8) -> u16 {
    policy(fc).map_or(0, |p| p.max_quantity)
}

/// Unit-size rule used for sizing (not cost scaling): bit-based function
/// codes round quantity up to whole bytes; register-based ones are 2 bytes
/// per unit. `None` for an unlisted function code.
pub fn unit_kind(fc: u8) -> Option<UnitKind> {
    match fc {
        FC_READ_COILS | FC_READ_DISCRETE_INPUTS | FC_WRITE_SINGLE_COIL
        | FC_WRITE_MULTIPLE_COILS => Some(UnitKind::Bit),
        FC_READ_HOLDING_REGISTERS
        | FC_READ_INPUT_REGISTERS
        | FC_WRITE_SINGLE_REGISTER
        | FC_WRITE_MULTIPLE_REGISTERS
        | FC_MASK_WRITE_REGISTER
        | FC_READ_WRITE_MULTIPLE_REGISTERS => Some(UnitKind::Register),
        _ => None,
    }
}

/// Data bytes for `quantity` units of `fc`: `⌈q/8⌉` for bits, `2·q` for
/// registers. Zero for an unknown function code.
pub fn data_bytes(fc: u8, quantity: u16) -> u16 {
    match unit_kind(fc) {
        Some(UnitKind::Bit) => quantity.div_ceil(8),
        Some(UnitKind::Register) => quantity.saturating_mul(2),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_fc_has_policy() {
        let p = policy(FC_READ_HOLDING_REGISTERS).unwrap();
        assert_eq!(p.max_quantity, 125);
        assert!(p.supports_merge);
    }

    #[test]
    fn unknown_fc_is_invalid() {
        assert!(!is_valid(0x99));
        assert_eq!(policy(0x99), None);
        assert_eq!(max_quantity(0x99), 0);
    }

    #[test]
    fn data_bytes_bit_rounds_up() {
        assert_eq!(data_bytes(FC_READ_COILS, 1), 1);
        assert_eq!(data_bytes(FC_READ_COILS, 8), 1);
        assert_eq!(data_bytes(FC_READ_COILS, 9), 2);
    }

    #[test]
    fn data_bytes_register_is_doubled() {
        assert_eq!(data_bytes(FC_READ_HOLDING_REGISTERS, 3), 6);
    }

    #[test]
    fn fc17_is_read_but_does_not_merge() {
        assert!(is_read(FC_READ_WRITE_MULTIPLE_REGISTERS));
        assert!(!supports_merge(FC_READ_WRITE_MULTIPLE_REGISTERS));
    }
}
