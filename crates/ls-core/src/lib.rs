//! ls-core: Shared types, constants, and utilities for the Lumasonic toolkit
//!
//! This crate provides the foundational types used across all `ls-*` crates:
//! the decoded [`StereoColorSample`] and its 32-byte wire format, reader
//! [`ThreadMode`]s, [`PerfSnapshot`] telemetry records, UDP relay
//! configuration, and the common error type.

mod sample;
mod mode;
mod perf;
mod net;
mod error;

pub use sample::*;
pub use mode::*;
pub use perf::*;
pub use net::*;
pub use error::*;

// ═══════════════════════════════════════════════════════════════════════════════
// CARRIER FREQUENCIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Lumasonic data/reference tone (Hz)
pub const LS_REF_TONE_FREQ: f64 = 22_500.0;
/// Lumasonic red tone (Hz)
pub const LS_RED_TONE_FREQ: f64 = 21_000.0;
/// Lumasonic green tone (Hz)
pub const LS_GREEN_TONE_FREQ: f64 = 19_500.0;
/// Lumasonic blue tone (Hz)
pub const LS_BLUE_TONE_FREQ: f64 = 18_000.0;

/// SpectraStrobe reference tone (Hz)
pub const SS_REF_TONE_FREQ: f64 = 18_200.0;
/// SpectraStrobe red tone (Hz)
pub const SS_RED_TONE_FREQ: f64 = 18_700.0;
/// SpectraStrobe green tone (Hz)
pub const SS_GREEN_TONE_FREQ: f64 = 19_200.0;
/// SpectraStrobe blue tone (Hz)
pub const SS_BLUE_TONE_FREQ: f64 = 19_700.0;

/// AudioStrobe tone (Hz)
pub const AS_TONE_FREQ: f64 = 19_200.0;

/// Default level of the reference tone when encoding (dB)
pub const DEFAULT_REF_TONE_DB: f64 = -32.0;

/// Sample rate the codec is designed around
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;

/// Default audio buffer size in samples
pub const DEFAULT_BUFFER_SIZE: usize = 256;

// ═══════════════════════════════════════════════════════════════════════════════
// CODEC SELECTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Light/sound codec carried by a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LightSoundCodec {
    /// No codec detected
    None = 0,
    /// Default Lumasonic codec
    #[default]
    Lumasonic = 1,
    /// SpectraStrobe codec
    SpectraStrobe = 2,
    /// AudioStrobe codec
    AudioStrobe = 3,
}

impl LightSoundCodec {
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`as_u8`](Self::as_u8); unknown values map to `None`.
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Lumasonic,
            2 => Self::SpectraStrobe,
            3 => Self::AudioStrobe,
            _ => Self::None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECIBELS
// ═══════════════════════════════════════════════════════════════════════════════

/// ln(10) / 20, for dB → gain
const LN10_OVER_20: f64 = std::f64::consts::LN_10 / 20.0;

/// Smallest gain that still maps to a finite dB value
const MIN_GAIN: f64 = 2.980_232_238_769_531_25e-8;

/// Convert decibels to a linear gain factor
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    (db * LN10_OVER_20).exp()
}

/// Convert a linear gain factor to decibels, floored at `inf_db`
#[inline]
pub fn gain_to_db(gain: f64, inf_db: f64) -> f64 {
    if gain < MIN_GAIN {
        return inf_db;
    }
    let db = gain.ln() / LN10_OVER_20;
    db.max(inf_db)
}
