//! A Modbus master library built around an optimizing request planner.
//!
//! Given a caller's declarative list of addresses — possibly unsorted,
//! duplicated, or scattered across gaps — the planner coalesces them into
//! blocks, merges adjacent or cheaply-bridged runs using a character-based
//! cost model, and packs the result into the fewest PDU-bounded requests
//! the wire format allows. RTU, ASCII, and TCP framing are supported
//! through the same planner and master driver.
//!
//! # Examples
//! ```no_run
//! # use smart_modbus::{config::Config, master::Master, plan::ReadRequest, policy, transport::Mode};
//! # use std::time::Duration;
//! # struct MyTransport;
//! # impl smart_modbus::transport::Transport for MyTransport {
//! #     fn send(&mut self, _frame: &[u8]) -> smart_modbus::error::Result<()> { Ok(()) }
//! #     fn recv(&mut self, _buf: &mut [u8], _timeout: Duration) -> smart_modbus::error::Result<usize> { Ok(0) }
//! # }
//! # fn main() {
//! let config = Config::default_for_mode(Mode::Rtu);
//! let mut master = Master::new(config, MyTransport);
//!
//! let request = ReadRequest::new(1, policy::FC_READ_HOLDING_REGISTERS, vec![100, 101, 105]);
//! let mut out = vec![None; request.addresses.len()];
//! match master.read_optimized(&request, &mut out) {
//!     Ok(()) => println!("{:?}", out),
//!     Err(e) => println!("{e}"),
//! }
//! # }
//! ```

pub mod block;
pub mod config;
pub mod cost;
pub mod error;
pub mod frame;
pub mod master;
pub mod pack;
pub mod plan;
pub mod policy;
pub mod response;
pub mod transport;

pub use config::Config;
pub use error::{MbError, Result};
pub use master::Master;
pub use plan::ReadRequest;
pub use transport::{Mode, Transport};
