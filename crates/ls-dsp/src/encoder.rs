//! Static Lumasonic encoder
//!
//! Generates the carrier tones for a fixed set of stereo color values:
//!
//! ```text
//! left  = ref + red0 + green0 + blue0
//! right = ref + red1 + green1 + blue1
//! ```
//!
//! Color tone amplitude = reference gain × color value. Values are expected
//! in 0.0 - 1.0 and are not clamped. No anti-aliasing is applied when the
//! color changes between blocks, so callers must rate-limit changes.

use ls_core::{
    db_to_gain, StereoColorSample, DEFAULT_REF_TONE_DB, LS_BLUE_TONE_FREQ, LS_GREEN_TONE_FREQ,
    LS_RED_TONE_FREQ, LS_REF_TONE_FREQ,
};

use crate::ToneGenerator;

/// Per-channel color tones
#[derive(Debug, Clone)]
struct ColorTones {
    red: ToneGenerator,
    green: ToneGenerator,
    blue: ToneGenerator,
}

impl ColorTones {
    fn new() -> Self {
        Self {
            red: ToneGenerator::new(LS_RED_TONE_FREQ, 0.0),
            green: ToneGenerator::new(LS_GREEN_TONE_FREQ, 0.0),
            blue: ToneGenerator::new(LS_BLUE_TONE_FREQ, 0.0),
        }
    }

    fn set_levels(&mut self, gain: f64, r: f32, g: f32, b: f32) {
        self.red.set_amplitude(gain * r as f64);
        self.green.set_amplitude(gain * g as f64);
        self.blue.set_amplitude(gain * b as f64);
    }

    fn reset(&mut self, sample_rate: f64) {
        self.red.reset(sample_rate);
        self.green.reset(sample_rate);
        self.blue.reset(sample_rate);
    }

    #[inline]
    fn next_sample(&mut self) -> f64 {
        self.red.next_sample() + self.green.next_sample() + self.blue.next_sample()
    }
}

/// Encodes a static stereo color into an audio stream
#[derive(Debug, Clone)]
pub struct StaticEncoder {
    reference: ToneGenerator,
    reference_gain: f64,
    left: ColorTones,
    right: ColorTones,
    color: StereoColorSample,
}

impl Default for StaticEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticEncoder {
    /// Encoder with the reference tone at the default level
    pub fn new() -> Self {
        Self::with_max_level_db(DEFAULT_REF_TONE_DB)
    }

    /// Encoder whose 100% output level is `max_level_db`
    pub fn with_max_level_db(max_level_db: f64) -> Self {
        let reference_gain = db_to_gain(max_level_db);
        Self {
            reference: ToneGenerator::new(LS_REF_TONE_FREQ, reference_gain),
            reference_gain,
            left: ColorTones::new(),
            right: ColorTones::new(),
            color: StereoColorSample::EMPTY,
        }
    }

    /// Linear gain of the reference tone
    #[inline]
    pub fn reference_gain(&self) -> f64 {
        self.reference_gain
    }

    /// Set the color values encoded by [`process_block`](Self::process_block)
    pub fn set_stereo_color(&mut self, r0: f32, g0: f32, b0: f32, r1: f32, g1: f32, b1: f32) {
        self.color = StereoColorSample::new(0, r0, g0, b0, r1, g1, b1);
        self.left.set_levels(self.reference_gain, r0, g0, b0);
        self.right.set_levels(self.reference_gain, r1, g1, b1);
    }

    /// Currently encoded color (timestamp 0)
    #[inline]
    pub fn stereo_color(&self) -> StereoColorSample {
        self.color
    }

    /// Reset all seven tones to `sample_rate`
    pub fn reset(&mut self, sample_rate: f64) {
        self.reference.reset(sample_rate);
        self.left.reset(sample_rate);
        self.right.reset(sample_rate);
    }

    /// Encode `num_samples` into `out0`/`out1`.
    ///
    /// With `replace` the buffers are overwritten, otherwise the encoded
    /// signal is mixed additively into the existing content.
    pub fn process_block(&mut self, out0: &mut [f32], out1: &mut [f32], num_samples: usize, replace: bool) {
        let n = num_samples.min(out0.len()).min(out1.len());

        for (l, r) in out0[..n].iter_mut().zip(out1[..n].iter_mut()) {
            let reference = self.reference.next_sample();
            let left = (reference + self.left.next_sample()) as f32;
            let right = (reference + self.right.next_sample()) as f32;

            if replace {
                *l = left;
                *r = right;
            } else {
                *l += left;
                *r += right;
            }
        }
    }
}
