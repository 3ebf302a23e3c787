//! Sine tone generator

use std::f64::consts::TAU;

use ls_core::DEFAULT_SAMPLE_RATE;

/// Unoptimized sine oscillator used to synthesize carrier tones.
///
/// The phase accumulates without wrapping; `sin` is periodic so output stays
/// correct, at the cost of slowly growing floating point error over very
/// long runs.
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    frequency: f64,
    sample_rate: f64,
    phase: f64,
    phase_increment: f64,
    amplitude: f64,
}

impl Default for ToneGenerator {
    fn default() -> Self {
        Self::new(1.0, 0.25)
    }
}

impl ToneGenerator {
    /// Create a generator at the default sample rate. Call [`reset`](Self::reset)
    /// with the stream's real rate before generating audio.
    pub fn new(frequency: f64, amplitude: f64) -> Self {
        let mut tone = Self {
            frequency,
            sample_rate: DEFAULT_SAMPLE_RATE,
            phase: 0.0,
            phase_increment: 0.0,
            amplitude,
        };
        tone.update_increment();
        tone
    }

    #[inline]
    fn update_increment(&mut self) {
        self.phase_increment = TAU / (self.sample_rate / self.frequency);
    }

    /// Reset phase to zero and recompute the increment for `sample_rate`
    pub fn reset(&mut self, sample_rate: f64) {
        self.phase = 0.0;
        self.sample_rate = sample_rate;
        self.update_increment();
    }

    /// Change frequency using the current sample rate
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
        self.update_increment();
    }

    #[inline]
    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
    }

    /// Set phase from a normalized 0.0 - 1.0 value
    #[inline]
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = phase * TAU;
    }

    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    #[inline]
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[inline]
    pub fn phase_increment(&self) -> f64 {
        self.phase_increment
    }

    /// Next output sample, then advance the phase
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        let sample = self.amplitude * self.phase.sin();
        self.phase += self.phase_increment;
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_sample_after_reset_is_zero() {
        for &(rate, freq) in &[(48_000.0, 22_500.0), (44_100.0, 1_000.0), (8_000.0, 3_999.0), (1.0, 0.25)] {
            for &amp in &[0.0, 0.25, 1.0, 1000.0] {
                let mut tone = ToneGenerator::new(freq, amp);
                tone.next_sample();
                tone.next_sample();
                tone.reset(rate);
                assert_eq!(tone.next_sample(), 0.0);
            }
        }
    }

    #[test]
    fn test_phase_increment() {
        let mut tone = ToneGenerator::new(12_000.0, 1.0);
        tone.reset(48_000.0);
        assert_relative_eq!(tone.phase_increment(), TAU / 4.0);

        // Quarter-period steps: 0, 1, 0, -1
        assert_relative_eq!(tone.next_sample(), 0.0);
        assert_relative_eq!(tone.next_sample(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(tone.next_sample(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(tone.next_sample(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_set_frequency_before_reset_uses_default_rate() {
        let mut tone = ToneGenerator::default();
        tone.set_frequency(DEFAULT_SAMPLE_RATE / 8.0);
        assert_relative_eq!(tone.phase_increment(), TAU / 8.0);
        assert!(tone.phase_increment().is_finite());
    }

    #[test]
    fn test_set_frequency_keeps_sample_rate() {
        let mut tone = ToneGenerator::new(1_000.0, 1.0);
        tone.reset(96_000.0);
        tone.set_frequency(2_000.0);
        assert_eq!(tone.sample_rate(), 96_000.0);
        assert_relative_eq!(tone.phase_increment(), TAU / 48.0);
    }

    #[test]
    fn test_set_phase_normalized() {
        let mut tone = ToneGenerator::new(1_000.0, 2.0);
        tone.reset(48_000.0);
        tone.set_phase(0.25);
        assert_relative_eq!(tone.next_sample(), 2.0, epsilon = 1e-12);
    }
}
