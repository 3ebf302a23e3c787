//! ls-audio: audio thread side of the Lumasonic handoff
//!
//! Everything reachable from [`StereoDecoder::process_block`] is realtime
//! safe: no allocation, no blocking locks, no syscalls. The decoder hands
//! samples to the consumer side through a [`SampleChannel`] and publishes
//! the latest levels through lock-free [`LevelRegisters`].

pub mod ringbuf;
pub mod levels;
pub mod decoder;

pub use ringbuf::*;
pub use levels::*;
pub use decoder::*;
