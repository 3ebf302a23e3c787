//! Goertzel carrier level detection
//!
//! Reference detector for the Lumasonic, SpectraStrobe and AudioStrobe
//! carriers. Each filter block measures the amplitude of the reference and
//! color tones per channel and reports `color / reference`. Block sizes that
//! hold an integer number of cycles of every carrier give exact, leakage-free
//! levels: 256 @ 48 kHz for Lumasonic, 480 @ 48 kHz for all three codecs.
//!
//! All state is preallocated; [`ToneLevelEngine::process`] is realtime safe.

use ls_core::{
    db_to_gain, LightSoundCodec, AS_TONE_FREQ, DEFAULT_BUFFER_SIZE, DEFAULT_REF_TONE_DB,
    DEFAULT_SAMPLE_RATE, LS_BLUE_TONE_FREQ, LS_GREEN_TONE_FREQ, LS_RED_TONE_FREQ, LS_REF_TONE_FREQ,
    SS_BLUE_TONE_FREQ, SS_GREEN_TONE_FREQ, SS_RED_TONE_FREQ, SS_REF_TONE_FREQ,
};

// ═══════════════════════════════════════════════════════════════════════════════
// GOERTZEL FILTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Single-frequency DFT bin evaluated sample by sample
#[derive(Debug, Clone, Copy)]
pub struct Goertzel {
    coeff: f64,
    cos: f64,
    sin: f64,
    s1: f64,
    s2: f64,
}

impl Goertzel {
    pub fn new(frequency: f64, sample_rate: f64) -> Self {
        let omega = std::f64::consts::TAU * frequency / sample_rate;
        Self {
            coeff: 2.0 * omega.cos(),
            cos: omega.cos(),
            sin: omega.sin(),
            s1: 0.0,
            s2: 0.0,
        }
    }

    #[inline]
    pub fn push(&mut self, x: f64) {
        let s0 = x + self.coeff * self.s1 - self.s2;
        self.s2 = self.s1;
        self.s1 = s0;
    }

    /// Sine amplitude at the bin frequency after `n` pushed samples
    #[inline]
    pub fn amplitude(&self, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let real = self.s1 - self.s2 * self.cos;
        let imag = self.s2 * self.sin;
        2.0 * (real * real + imag * imag).sqrt() / n as f64
    }

    #[inline]
    pub fn clear(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CARRIER BANK
// ═══════════════════════════════════════════════════════════════════════════════

/// A reference tone must reach this fraction of its strongest color tone.
/// Rejects reference bins that only hold leakage from a neighboring codec.
const REFERENCE_DOMINANCE: f64 = 0.5;

/// Detection state of one channel for one filter block
#[derive(Debug, Clone, Copy, PartialEq)]
enum ChannelDetect {
    Lumasonic([f32; 3]),
    SpectraStrobe([f32; 3]),
    AudioStrobe(f32),
    Silent,
}

/// Reference tone plus red, green and blue tones of one codec
#[derive(Debug, Clone, Copy)]
struct ToneSet {
    reference: Goertzel,
    colors: [Goertzel; 3],
}

impl ToneSet {
    fn new(frequencies: [f64; 4], sample_rate: f64) -> Self {
        let [reference, red, green, blue] = frequencies;
        Self {
            reference: Goertzel::new(reference, sample_rate),
            colors: [red, green, blue].map(|f| Goertzel::new(f, sample_rate)),
        }
    }

    #[inline]
    fn push(&mut self, x: f64) {
        self.reference.push(x);
        for color in &mut self.colors {
            color.push(x);
        }
    }

    /// `color / reference` levels, if the reference carrier is present
    fn levels(&self, n: usize, floor: f64) -> Option<[f32; 3]> {
        let reference = self.reference.amplitude(n);
        let colors = self.colors.map(|g| g.amplitude(n));
        let strongest = colors.iter().copied().fold(0.0, f64::max);

        if reference < floor || reference < strongest * REFERENCE_DOMINANCE {
            return None;
        }
        Some(colors.map(|c| (c / reference).clamp(0.0, 1.0) as f32))
    }

    fn clear(&mut self) {
        self.reference.clear();
        for color in &mut self.colors {
            color.clear();
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CarrierBank {
    lumasonic: ToneSet,
    spectra: ToneSet,
    strobe: Goertzel,
}

impl CarrierBank {
    fn new(sample_rate: f64) -> Self {
        Self {
            lumasonic: ToneSet::new(
                [LS_REF_TONE_FREQ, LS_RED_TONE_FREQ, LS_GREEN_TONE_FREQ, LS_BLUE_TONE_FREQ],
                sample_rate,
            ),
            spectra: ToneSet::new(
                [SS_REF_TONE_FREQ, SS_RED_TONE_FREQ, SS_GREEN_TONE_FREQ, SS_BLUE_TONE_FREQ],
                sample_rate,
            ),
            strobe: Goertzel::new(AS_TONE_FREQ, sample_rate),
        }
    }

    #[inline]
    fn push(&mut self, x: f64) {
        self.lumasonic.push(x);
        self.spectra.push(x);
        self.strobe.push(x);
    }

    /// Lumasonic first, then SpectraStrobe, then a bare AudioStrobe tone.
    /// The AudioStrobe tone shares its frequency with the SpectraStrobe green
    /// tone, so SpectraStrobe must be ruled out before it.
    fn detect(&mut self, n: usize, floor: f64, full_scale: f64) -> ChannelDetect {
        let result = if let Some(rgb) = self.lumasonic.levels(n, floor) {
            ChannelDetect::Lumasonic(rgb)
        } else if let Some(rgb) = self.spectra.levels(n, floor) {
            ChannelDetect::SpectraStrobe(rgb)
        } else {
            let strobe = self.strobe.amplitude(n);
            if strobe >= floor {
                ChannelDetect::AudioStrobe((strobe / full_scale).clamp(0.0, 1.0) as f32)
            } else {
                ChannelDetect::Silent
            }
        };

        self.lumasonic.clear();
        self.spectra.clear();
        self.strobe.clear();
        result
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TONE LEVEL ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Levels measured for one completed filter block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneLevels {
    /// `r0, g0, b0, r1, g1, b1`, each 0.0 - 1.0
    pub levels: [f32; 6],
    /// Codec detected in this block
    pub codec: LightSoundCodec,
    /// Stream position (samples) at the end of the block; never 0
    pub position: u64,
}

impl ToneLevels {
    #[inline]
    pub fn is_audio_strobe(&self) -> bool {
        self.codec == LightSoundCodec::AudioStrobe
    }
}

/// Goertzel-based carrier level detector
#[derive(Debug, Clone)]
pub struct ToneLevelEngine {
    sample_rate: f64,
    block_size: usize,
    filled: usize,
    position: u64,
    floor: f64,
    full_scale: f64,
    channels: [CarrierBank; 2],
}

impl Default for ToneLevelEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneLevelEngine {
    pub const MIN_BLOCK_SIZE: usize = 64;
    pub const MAX_BLOCK_SIZE: usize = 2048;

    /// Carrier presence threshold (dB)
    pub const FLOOR_DB: f64 = -80.0;

    pub fn new() -> Self {
        let mut engine = Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BUFFER_SIZE,
            filled: 0,
            position: 0,
            floor: db_to_gain(Self::FLOOR_DB),
            full_scale: db_to_gain(DEFAULT_REF_TONE_DB),
            channels: [CarrierBank::new(DEFAULT_SAMPLE_RATE); 2],
        };
        engine.reset(DEFAULT_SAMPLE_RATE, DEFAULT_BUFFER_SIZE);
        engine
    }

    /// Pick a filter block for the stream and clear all state.
    ///
    /// Returns the filter block size in samples.
    pub fn reset(&mut self, sample_rate: f64, buffer_size: usize) -> usize {
        self.sample_rate = sample_rate;
        self.block_size = buffer_size.clamp(Self::MIN_BLOCK_SIZE, Self::MAX_BLOCK_SIZE);
        self.filled = 0;
        self.position = 0;
        self.channels = [CarrierBank::new(sample_rate); 2];

        log::debug!(
            "Tone level engine reset: {} Hz, filter block {} samples",
            sample_rate,
            self.block_size
        );
        self.block_size
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Total samples consumed since the last reset
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Feed a stereo block, calling `emit` once per completed filter block
    pub fn process<F>(&mut self, in0: &[f32], in1: &[f32], mut emit: F)
    where
        F: FnMut(ToneLevels),
    {
        let n = in0.len().min(in1.len());

        for (&l, &r) in in0[..n].iter().zip(in1[..n].iter()) {
            self.channels[0].push(l as f64);
            self.channels[1].push(r as f64);
            self.filled += 1;
            self.position += 1;

            if self.filled == self.block_size {
                emit(self.finish_block());
            }
        }
    }

    fn finish_block(&mut self) -> ToneLevels {
        let n = self.filled;
        self.filled = 0;

        let left = self.channels[0].detect(n, self.floor, self.full_scale);
        let right = self.channels[1].detect(n, self.floor, self.full_scale);

        let codec = match (left, right) {
            (ChannelDetect::Lumasonic(_), _) | (_, ChannelDetect::Lumasonic(_)) => LightSoundCodec::Lumasonic,
            (ChannelDetect::SpectraStrobe(_), _) | (_, ChannelDetect::SpectraStrobe(_)) => {
                LightSoundCodec::SpectraStrobe
            }
            (ChannelDetect::AudioStrobe(_), _) | (_, ChannelDetect::AudioStrobe(_)) => {
                LightSoundCodec::AudioStrobe
            }
            _ => LightSoundCodec::None,
        };

        let rgb = |detect: ChannelDetect| match detect {
            ChannelDetect::Lumasonic(rgb) | ChannelDetect::SpectraStrobe(rgb) => rgb,
            ChannelDetect::AudioStrobe(level) => [level; 3],
            ChannelDetect::Silent => [0.0; 3],
        };
        let [r0, g0, b0] = rgb(left);
        let [r1, g1, b1] = rgb(right);

        ToneLevels {
            levels: [r0, g0, b0, r1, g1, b1],
            codec,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StaticEncoder, ToneGenerator};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_goertzel_amplitude_on_bin() {
        let mut tone = ToneGenerator::new(LS_REF_TONE_FREQ, 0.5);
        tone.reset(48_000.0);
        let mut bin = Goertzel::new(LS_REF_TONE_FREQ, 48_000.0);
        for _ in 0..256 {
            bin.push(tone.next_sample());
        }
        assert_abs_diff_eq!(bin.amplitude(256), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_goertzel_rejects_other_bin() {
        let mut tone = ToneGenerator::new(LS_RED_TONE_FREQ, 0.5);
        tone.reset(48_000.0);
        let mut bin = Goertzel::new(LS_REF_TONE_FREQ, 48_000.0);
        for _ in 0..256 {
            bin.push(tone.next_sample());
        }
        assert_abs_diff_eq!(bin.amplitude(256), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_decodes_static_encoder() {
        let mut encoder = StaticEncoder::new();
        encoder.set_stereo_color(1.0, 0.5, 0.25, 0.5, 0.25, 0.125);
        encoder.reset(48_000.0);

        let mut engine = ToneLevelEngine::new();
        assert_eq!(engine.reset(48_000.0, 256), 256);

        let mut left = vec![0.0f32; 256];
        let mut right = vec![0.0f32; 256];
        let mut frames = Vec::new();

        for _ in 0..4 {
            encoder.process_block(&mut left, &mut right, 256, true);
            engine.process(&left, &right, |frame| frames.push(frame));
        }

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].position, 256);
        assert_eq!(frames[3].position, 1024);

        let expected = [1.0, 0.5, 0.25, 0.5, 0.25, 0.125];
        for frame in &frames {
            assert_eq!(frame.codec, LightSoundCodec::Lumasonic);
            for (got, want) in frame.levels.iter().zip(expected.iter()) {
                assert_abs_diff_eq!(*got, *want, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_silence_reports_no_codec() {
        let mut engine = ToneLevelEngine::new();
        engine.reset(48_000.0, 128);

        let silence = vec![0.0f32; 128];
        let mut frames = Vec::new();
        engine.process(&silence, &silence, |frame| frames.push(frame));

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].codec, LightSoundCodec::None);
        assert_eq!(frames[0].levels, [0.0; 6]);
    }

    #[test]
    fn test_detects_audio_strobe() {
        let mut strobe = ToneGenerator::new(AS_TONE_FREQ, db_to_gain(DEFAULT_REF_TONE_DB) * 0.5);
        strobe.reset(48_000.0);

        // 19.2 kHz completes 2 cycles every 5 samples; 480 samples is bin-exact
        let mut engine = ToneLevelEngine::new();
        engine.reset(48_000.0, 480);

        let signal: Vec<f32> = (0..480).map(|_| strobe.next_sample() as f32).collect();
        let mut frames = Vec::new();
        engine.process(&signal, &signal, |frame| frames.push(frame));

        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_audio_strobe());
        assert_abs_diff_eq!(frames[0].levels[0], 0.5, epsilon = 1e-3);
    }

    fn spectra_strobe_signal(levels: [f64; 3], len: usize) -> Vec<f32> {
        let reference = db_to_gain(DEFAULT_REF_TONE_DB);
        let mut tones = [
            ToneGenerator::new(SS_REF_TONE_FREQ, reference),
            ToneGenerator::new(SS_RED_TONE_FREQ, reference * levels[0]),
            ToneGenerator::new(SS_GREEN_TONE_FREQ, reference * levels[1]),
            ToneGenerator::new(SS_BLUE_TONE_FREQ, reference * levels[2]),
        ];
        for tone in &mut tones {
            tone.reset(48_000.0);
        }
        (0..len)
            .map(|_| tones.iter_mut().map(|t| t.next_sample()).sum::<f64>() as f32)
            .collect()
    }

    #[test]
    fn test_detects_spectra_strobe() {
        let mut engine = ToneLevelEngine::new();
        engine.reset(48_000.0, 480);

        let left = spectra_strobe_signal([0.8, 0.4, 0.2], 960);
        let right = spectra_strobe_signal([0.1, 1.0, 0.5], 960);
        let mut frames = Vec::new();
        engine.process(&left, &right, |frame| frames.push(frame));

        assert_eq!(frames.len(), 2);
        let expected = [0.8, 0.4, 0.2, 0.1, 1.0, 0.5];
        for frame in &frames {
            // The green tone sits on the AudioStrobe frequency
            assert_eq!(frame.codec, LightSoundCodec::SpectraStrobe);
            assert!(!frame.is_audio_strobe());
            for (got, want) in frame.levels.iter().zip(expected.iter()) {
                assert_abs_diff_eq!(*got, *want, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_audio_strobe_not_mistaken_for_spectra_strobe() {
        let mut strobe = ToneGenerator::new(AS_TONE_FREQ, db_to_gain(DEFAULT_REF_TONE_DB));
        strobe.reset(48_000.0);

        // 256 is not bin-exact for 19.2 kHz; leakage reaches the reference bins
        let mut engine = ToneLevelEngine::new();
        engine.reset(48_000.0, 256);

        let signal: Vec<f32> = (0..512).map(|_| strobe.next_sample() as f32).collect();
        let mut frames = Vec::new();
        engine.process(&signal, &signal, |frame| frames.push(frame));

        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(ToneLevels::is_audio_strobe));
    }

    #[test]
    fn test_block_size_clamped() {
        let mut engine = ToneLevelEngine::new();
        assert_eq!(engine.reset(48_000.0, 16), ToneLevelEngine::MIN_BLOCK_SIZE);
        assert_eq!(engine.reset(48_000.0, 1 << 16), ToneLevelEngine::MAX_BLOCK_SIZE);
    }

    #[test]
    fn test_blocks_span_callbacks() {
        let mut engine = ToneLevelEngine::new();
        engine.reset(48_000.0, 100);

        let buf = vec![0.0f32; 64];
        let mut count = 0;
        for _ in 0..5 {
            engine.process(&buf, &buf, |_| count += 1);
        }
        // 320 samples → 3 complete blocks of 100
        assert_eq!(count, 3);
        assert_eq!(engine.position(), 320);
    }
}
