//! Character-based cost model.
//!
//! The planner's merge/split decisions all reduce to a count of wire
//! characters: the fixed overhead of one extra request/response round trip
//! versus the data cost of reading the gap between two blocks instead of
//! issuing a second request for it. Protocol-agnostic by design — baud rate
//! and framing mode never enter the comparison, only character counts.
//! Ported from the fixed-point arithmetic in `char_model.c`.

use crate::policy::{self, UnitKind};
use crate::transport::Mode;

/// Per-function-code cost parameters for one planning pass: fixed request
/// and response overhead, the inter-frame gap (serial only), and an
/// estimate of network/processing latency, all in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostParams {
    pub req_fixed_chars: u8,
    pub resp_fixed_chars: u8,
    pub gap_chars: u8,
    pub latency_chars: u8,
}

impl CostParams {
    /// Builds cost parameters for `fc` under `mode`, defaulting the
    /// inter-frame gap to 4 characters on RTU/ASCII (the ~3.5-character
    /// silence rounded up) and 0 on TCP, which carries no gap.
    pub fn new(mode: Mode, fc: u8, latency_chars: u8) -> Option<Self> {
        let p = policy::policy(fc)?;
        let gap_chars = if mode.is_serial() { 4 } else { 0 };
        Some(CostParams {
            req_fixed_chars: p.req_fixed_chars,
            resp_fixed_chars: p.resp_fixed_chars,
            gap_chars,
            latency_chars,
        })
    }
}

/// Fixed overhead, in characters, of issuing one request/response round
/// trip for `fc` under `mode`: the two fixed frame costs, plus the
/// inter-frame gap on serial modes, plus an estimate of latency.
pub fn calc_overhead_chars(mode: Mode, fc: u8, gap_chars: u8, latency_chars: u8) -> u16 {
    let Some(p) = policy::policy(fc) else {
        return 0;
    };
    let mut overhead = p.req_fixed_chars as u16 + p.resp_fixed_chars as u16;
    if mode.is_serial() {
        overhead += gap_chars as u16;
    }
    overhead += latency_chars as u16;
    overhead
}

/// Cost, in characters, of reading `gap_units` extra addressable units
/// (instead of skipping them with a second request). Always the integer
/// sizing rule — `⌈g/8⌉` for bit-based function codes, `2·g` for
/// register-based ones — never the policy table's ×100 per-unit field,
/// which only scales relative costs, not absolute byte counts.
pub fn calc_gap_cost(fc: u8, gap_units: u16) -> u16 {
    if gap_units == 0 {
        return 0;
    }
    match policy::unit_kind(fc) {
        Some(UnitKind::Bit) => gap_units.div_ceil(8),
        Some(UnitKind::Register) => gap_units.saturating_mul(2),
        None => 0,
    }
}

/// Full request cost, in characters, for a block of `quantity` units of
/// `fc`: fixed overhead plus the data itself.
pub fn calc_request_cost(fc: u8, quantity: u16, mode: Mode, gap_chars: u8, latency_chars: u8) -> u16 {
    let overhead = calc_overhead_chars(mode, fc, gap_chars, latency_chars);
    let data_cost = policy::data_bytes(fc, quantity);
    overhead + data_cost
}

/// Savings, in characters, of merging two adjacent blocks across a gap of
/// `gap_units` addresses versus issuing them as two separate requests.
/// Positive means merging wins; zero or negative means it does not — a
/// result of exactly zero is NOT beneficial and must not be merged, since
/// it buys nothing for the packer's added complexity.
pub fn calc_merge_savings(gap_units: u16, fc: u8, cost_params: &CostParams) -> i32 {
    let overhead_cost = cost_params.req_fixed_chars as i32
        + cost_params.resp_fixed_chars as i32
        + cost_params.gap_chars as i32
        + cost_params.latency_chars as i32;
    let gap_cost = calc_gap_cost(fc, gap_units) as i32;
    overhead_cost - gap_cost
}

/// Whether merging across `gap_units` addresses is worth it: `savings > 0`.
/// Exactly zero savings is explicitly not beneficial.
pub fn is_merge_beneficial(gap_units: u16, fc: u8, cost_params: &CostParams) -> bool {
    calc_merge_savings(gap_units, fc, cost_params) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overhead_includes_gap_on_serial_only() {
        let rtu = calc_overhead_chars(Mode::Rtu, policy::FC_READ_HOLDING_REGISTERS, 4, 2);
        let tcp = calc_overhead_chars(Mode::Tcp, policy::FC_READ_HOLDING_REGISTERS, 4, 1);
        assert_eq!(rtu, 6 + 5 + 4 + 2);
        assert_eq!(tcp, 6 + 5 + 1);
    }

    #[test]
    fn gap_cost_uses_integer_rule_not_policy_scale() {
        assert_eq!(calc_gap_cost(policy::FC_READ_COILS, 1), 1);
        assert_eq!(calc_gap_cost(policy::FC_READ_COILS, 8), 1);
        assert_eq!(calc_gap_cost(policy::FC_READ_HOLDING_REGISTERS, 3), 6);
        assert_eq!(calc_gap_cost(policy::FC_READ_HOLDING_REGISTERS, 0), 0);
    }

    #[test]
    fn zero_savings_is_not_beneficial() {
        let params = CostParams {
            req_fixed_chars: 0,
            resp_fixed_chars: 0,
            gap_chars: 0,
            latency_chars: 0,
        };
        assert_eq!(
            calc_merge_savings(1, policy::FC_READ_HOLDING_REGISTERS, &params),
            -2
        );
        let zero_params = CostParams {
            req_fixed_chars: 2,
            resp_fixed_chars: 0,
            gap_chars: 0,
            latency_chars: 0,
        };
        assert_eq!(
            calc_merge_savings(1, policy::FC_READ_HOLDING_REGISTERS, &zero_params),
            0
        );
        assert!(!is_merge_beneficial(
            1,
            policy::FC_READ_HOLDING_REGISTERS,
            &zero_params
        ));
    }

    #[test]
    fn tight_merge_seed_scenario_savings_is_negative_seven() {
        // RTU, FC03, latency=2: overhead 17, gap of 12 registers (24 bytes).
        let params = CostParams::new(Mode::Rtu, policy::FC_READ_HOLDING_REGISTERS, 2).unwrap();
        let savings = calc_merge_savings(12, policy::FC_READ_HOLDING_REGISTERS, &params);
        assert_eq!(savings, -7);
    }

    #[test]
    fn small_gap_merge_seed_scenario_savings_is_thirteen() {
        // Same parameters, gap of 2 registers (4 bytes).
        let params = CostParams::new(Mode::Rtu, policy::FC_READ_HOLDING_REGISTERS, 2).unwrap();
        let savings = calc_merge_savings(2, policy::FC_READ_HOLDING_REGISTERS, &params);
        assert_eq!(savings, 13);
    }

    #[test]
    fn coil_merge_seed_scenario_savings_is_fifteen() {
        // RTU, FC01, latency=2, gap of 16 coils (2 bytes).
        let params = CostParams::new(Mode::Rtu, policy::FC_READ_COILS, 2).unwrap();
        let savings = calc_merge_savings(16, policy::FC_READ_COILS, &params);
        assert_eq!(savings, 15);
    }

    #[test]
    fn tcp_overhead_lower_seed_scenario_boundary() {
        // TCP, FC03, latency=1: overhead 12.
        let params = CostParams::new(Mode::Tcp, policy::FC_READ_HOLDING_REGISTERS, 1).unwrap();
        assert!(is_merge_beneficial(5, policy::FC_READ_HOLDING_REGISTERS, &params));
        assert!(!is_merge_beneficial(6, policy::FC_READ_HOLDING_REGISTERS, &params));
    }
}
