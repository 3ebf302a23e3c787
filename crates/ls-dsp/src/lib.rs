//! ls-dsp: Lumasonic signal processing
//!
//! - [`ToneGenerator`]: single sine oscillator
//! - [`StaticEncoder`]: seven carrier tones encoding a fixed stereo color
//! - [`ToneLevelEngine`]: Goertzel-based carrier level detector
//! - interleave helpers for feeding stereo callbacks

mod tone;
mod encoder;
mod goertzel;
mod interleave;

pub use tone::*;
pub use encoder::*;
pub use goertzel::*;
pub use interleave::*;
