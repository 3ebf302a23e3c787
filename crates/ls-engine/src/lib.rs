//! ls-engine: consumer side of the Lumasonic handoff
//!
//! - [`Reader`]: consumer thread with three wait strategies ([`ThreadMode`])
//! - [`PerfChannel`]: rolling timing telemetry
//! - [`ListenerRegistry`]: listeners invoked once per decoded sample
//! - [`UdpRelayListener`]: relays samples as 32-byte datagrams
//! - [`Codec`]: integer-ID registry over decoders, readers and listeners
//! - [`ReaderSettings`]: JSON configuration
//!
//! [`ThreadMode`]: ls_core::ThreadMode

pub mod listener;
pub mod perf;
pub mod reader;
pub mod udp;
pub mod codec;
pub mod settings;

pub use listener::*;
pub use perf::*;
pub use reader::*;
pub use udp::*;
pub use codec::*;
pub use settings::*;
