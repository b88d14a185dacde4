//! The master driver: ties the planner, frame codecs, and transport
//! together into the public read/write API. Generalizes the teacher's
//! `client.rs` (`PG<T: Transport>`/`OP<T: Transport>`, each owning a
//! transport and exposing `db_read`/`mb_read`/... methods that build a
//! PDU, send, receive, and parse) to this crate's single `Master<T>`.
//! Ported from `master_api.c`, correcting its documented bugs rather than
//! reproducing them: `total_requests` increments once per issued frame,
//! `blocks_merged`/`rounds_saved` use the corrected formulas in `config`,
//! and TCP transaction ids are assigned and verified by an owned counter
//! instead of always being built as zero.

use std::num::Wrapping;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{Config, Stats};
use crate::error::{MbError, Result};
use crate::frame::{self, ParsedFrame};
use crate::plan::{self, ReadRequest};
use crate::policy;
use crate::response::{self, Value};
use crate::transport::Transport;

/// Owns a transport, the active configuration, and statistics. Not
/// internally synchronized: one `Master` must not be shared across
/// threads without the caller's own locking.
pub struct Master<T: Transport> {
    config: Config,
    transport: T,
    stats: Stats,
    transaction_id: Wrapping<u16>,
}

impl<T: Transport> Master<T> {
    pub fn new(config: Config, transport: T) -> Self {
        Master {
            config,
            transport,
            stats: Stats::default(),
            transaction_id: Wrapping(0),
        }
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    fn next_transaction_id(&mut self) -> u16 {
        let id = self.transaction_id.0;
        self.transaction_id += Wrapping(1);
        id
    }

    /// Sends `pdu` under `fc` to `slave_id`, receives and parses the
    /// response, and verifies the slave/unit echo. Updates character and
    /// attempt counters regardless of outcome.
    fn round_trip(&mut self, slave_id: u8, fc: u8, pdu: &[u8]) -> Result<ParsedFrame> {
        let transaction_id = self.next_transaction_id();
        let frame = frame::build_frame(self.config.mode, slave_id, fc, pdu, transaction_id)?;

        self.stats.record_request_attempt();
        self.transport.send(&frame)?;
        if self.config.mode.is_serial() {
            self.transport.delay_chars(self.config.gap_chars as u16)?;
        }
        self.stats.total_chars_sent += frame.len() as u64;

        let mut buf = vec![0u8; frame::calc_frame_length(self.config.mode, 253).max(260)];
        let timeout = Duration::from_millis(self.config.timeout_ms as u64);
        let n = self.transport.recv(&mut buf, timeout)?;
        let n = crate::transport::require_nonzero(n, timeout)?;
        self.stats.total_chars_recv += n as u64;

        let parsed = frame::parse_frame(self.config.mode, &buf[..n])?;
        if parsed.slave_id != slave_id {
            warn!(expected = slave_id, got = parsed.slave_id, "slave id mismatch");
            return Err(MbError::InvalidFrame("response slave id mismatch".into()));
        }
        if self.config.mode == crate::transport::Mode::Tcp
            && parsed.transaction_id != Some(transaction_id)
        {
            return Err(MbError::InvalidFrame(
                "response transaction id mismatch".into(),
            ));
        }
        Ok(parsed)
    }

    fn read_pdu(start_address: u16, quantity: u16) -> Vec<u8> {
        let mut pdu = Vec::with_capacity(4);
        pdu.extend_from_slice(&start_address.to_be_bytes());
        pdu.extend_from_slice(&quantity.to_be_bytes());
        pdu
    }

    /// Runs the planner over `request`, executes each plan sequentially,
    /// and scatters the decoded values into `out` at the positions that
    /// correspond to `request.addresses` (same length, same order — `out[i]`
    /// is the value for `request.addresses[i]`, `None` if that address
    /// never received a value, which cannot happen for a successful call).
    pub fn read_optimized(&mut self, request: &ReadRequest, out: &mut [Option<Value>]) -> Result<()> {
        if out.len() < request.addresses.len() {
            return Err(MbError::BufferTooSmall {
                needed: request.addresses.len(),
                have: out.len(),
            });
        }

        let optimized = plan::optimize(
            request,
            self.config.mode,
            self.config.max_pdu_chars,
            self.config.latency_chars,
            self.config.limits.max_blocks,
            self.config.limits.max_plans,
        )?;
        debug!(
            plans = optimized.plans.len(),
            blocks_in = optimized.blocks_in,
            blocks_out = optimized.blocks_out,
            "request optimized"
        );

        let address_to_out: std::collections::HashMap<u16, usize> = request
            .addresses
            .iter()
            .enumerate()
            .map(|(i, &addr)| (addr, i))
            .collect();

        for (plan_index, plan) in optimized.plans.iter().enumerate() {
            let pdu = Self::read_pdu(plan.start_address, plan.quantity);
            let parsed = self.round_trip(plan.slave_id, plan.function_code, &pdu)?;
            let values = response::parse_read_response(parsed.function_code, &parsed.pdu, plan.quantity)?;

            response::scatter_into(
                plan_index,
                plan,
                &values,
                &optimized.locations,
                &address_to_out,
                out,
            );
        }

        self.stats.record_optimized_call(
            request.address_count(),
            optimized.plans.len(),
            optimized.blocks_in,
            optimized.blocks_out,
        );
        Ok(())
    }

    /// One unoptimized read: a single plan, no merging.
    pub fn read_single(&mut self, slave_id: u8, fc: u8, start: u16, quantity: u16, out: &mut [Value]) -> Result<()> {
        let p = policy::policy(fc).ok_or(MbError::InvalidFc(fc))?;
        if !p.is_read {
            return Err(MbError::NotSupported(format!("fc 0x{fc:02X} is not a read")));
        }
        if quantity == 0 || quantity > p.max_quantity {
            return Err(MbError::InvalidQuantity {
                fc,
                quantity,
                max: p.max_quantity,
            });
        }
        if out.len() < quantity as usize {
            return Err(MbError::BufferTooSmall {
                needed: quantity as usize,
                have: out.len(),
            });
        }

        let pdu = Self::read_pdu(start, quantity);
        let parsed = self.round_trip(slave_id, fc, &pdu)?;
        let values = response::parse_read_response(parsed.function_code, &parsed.pdu, quantity)?;
        out[..values.len()].copy_from_slice(&values);
        Ok(())
    }

    pub fn write_single_coil(&mut self, slave_id: u8, addr: u16, value: bool) -> Result<()> {
        let mut pdu = addr.to_be_bytes().to_vec();
        pdu.extend_from_slice(if value { &[0xFF, 0x00] } else { &[0x00, 0x00] });
        let parsed = self.round_trip(slave_id, policy::FC_WRITE_SINGLE_COIL, &pdu)?;
        response::parse_write_response(
            parsed.function_code,
            &parsed.pdu,
            addr,
            if value { 1 } else { 0 },
        )
    }

    pub fn write_single_register(&mut self, slave_id: u8, addr: u16, value: u16) -> Result<()> {
        let mut pdu = addr.to_be_bytes().to_vec();
        pdu.extend_from_slice(&value.to_be_bytes());
        let parsed = self.round_trip(slave_id, policy::FC_WRITE_SINGLE_REGISTER, &pdu)?;
        response::parse_write_response(parsed.function_code, &parsed.pdu, addr, value)
    }

    pub fn write_multiple_registers(&mut self, slave_id: u8, start: u16, values: &[u16]) -> Result<()> {
        let max = policy::max_quantity(policy::FC_WRITE_MULTIPLE_REGISTERS);
        if values.is_empty() || values.len() > max as usize {
            return Err(MbError::InvalidQuantity {
                fc: policy::FC_WRITE_MULTIPLE_REGISTERS,
                quantity: values.len() as u16,
                max,
            });
        }
        let quantity = values.len() as u16;
        let mut pdu = start.to_be_bytes().to_vec();
        pdu.extend_from_slice(&quantity.to_be_bytes());
        pdu.push((quantity * 2) as u8);
        for &v in values {
            pdu.extend_from_slice(&v.to_be_bytes());
        }
        let parsed = self.round_trip(slave_id, policy::FC_WRITE_MULTIPLE_REGISTERS, &pdu)?;
        response::parse_write_response(parsed.function_code, &parsed.pdu, start, quantity)
    }
}
