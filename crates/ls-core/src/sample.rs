//! Decoded stereo color samples and their UDP wire format
//!
//! Wire layout (32 bytes, little-endian):
//!
//! ```text
//! [0..8)   u64 timestamp
//! [8..12)  f32 r0    [12..16) f32 g0    [16..20) f32 b0
//! [20..24) f32 r1    [24..28) f32 g1    [28..32) f32 b1
//! ```
//!
//! A timestamp of 0 means "no data".

/// Size of a serialized [`StereoColorSample`] in bytes
pub const STEREO_COLOR_WIRE_SIZE: usize = 32;

/// Two sets of RGB levels (left/right) and a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct StereoColorSample {
    /// Timestamp; 0 means "no data"
    pub timestamp: u64,
    pub r0: f32,
    pub g0: f32,
    pub b0: f32,
    pub r1: f32,
    pub g1: f32,
    pub b1: f32,
}

impl StereoColorSample {
    /// Empty sample (black on both channels, no data)
    pub const EMPTY: Self = Self {
        timestamp: 0,
        r0: 0.0,
        g0: 0.0,
        b0: 0.0,
        r1: 0.0,
        g1: 0.0,
        b1: 0.0,
    };

    #[inline]
    pub const fn new(timestamp: u64, r0: f32, g0: f32, b0: f32, r1: f32, g1: f32, b1: f32) -> Self {
        Self {
            timestamp,
            r0,
            g0,
            b0,
            r1,
            g1,
            b1,
        }
    }

    /// Build a sample from the six levels in `r0, g0, b0, r1, g1, b1` order
    #[inline]
    pub const fn from_levels(timestamp: u64, levels: [f32; 6]) -> Self {
        Self::new(
            timestamp, levels[0], levels[1], levels[2], levels[3], levels[4], levels[5],
        )
    }

    /// Levels in `r0, g0, b0, r1, g1, b1` order
    #[inline]
    pub const fn levels(&self) -> [f32; 6] {
        [self.r0, self.g0, self.b0, self.r1, self.g1, self.b1]
    }

    /// True if this is the "no data" sentinel
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.timestamp == 0
    }

    /// Serialize to the 32-byte wire format
    pub fn to_bytes(&self) -> [u8; STEREO_COLOR_WIRE_SIZE] {
        let mut out = [0u8; STEREO_COLOR_WIRE_SIZE];
        out[0..8].copy_from_slice(&self.timestamp.to_le_bytes());
        for (i, level) in self.levels().iter().enumerate() {
            let offset = 8 + i * 4;
            out[offset..offset + 4].copy_from_slice(&level.to_le_bytes());
        }
        out
    }

    /// Deserialize from the 32-byte wire format.
    ///
    /// Buffers shorter than 32 bytes decode to [`EMPTY`](Self::EMPTY).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.len() < STEREO_COLOR_WIRE_SIZE {
            return Self::EMPTY;
        }

        let mut ts = [0u8; 8];
        ts.copy_from_slice(&bytes[0..8]);

        let mut levels = [0.0f32; 6];
        for (i, level) in levels.iter_mut().enumerate() {
            let offset = 8 + i * 4;
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&bytes[offset..offset + 4]);
            *level = f32::from_le_bytes(raw);
        }

        Self::from_levels(u64::from_le_bytes(ts), levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(sample: &StereoColorSample) -> (u64, [u32; 6]) {
        (sample.timestamp, sample.levels().map(f32::to_bits))
    }

    #[test]
    fn test_wire_roundtrip_bit_identical() {
        let samples = [
            StereoColorSample::EMPTY,
            StereoColorSample::new(0, 1.0, 0.5, 0.25, 0.5, 0.25, 0.125),
            StereoColorSample::new(u64::MAX, -0.0, f32::MIN_POSITIVE, 1e-30, 7.5, f32::MAX, -1.0),
            StereoColorSample::new(48_256, f32::NAN, f32::INFINITY, 0.0, 0.0, 0.0, 0.0),
        ];

        for sample in samples {
            let decoded = StereoColorSample::from_bytes(&sample.to_bytes());
            assert_eq!(bits(&decoded), bits(&sample));
        }
    }

    #[test]
    fn test_wire_layout() {
        let sample = StereoColorSample::new(0x0102_0304_0506_0708, 1.0, 0.0, 0.0, 0.0, 0.0, 2.0);
        let bytes = sample.to_bytes();

        assert_eq!(bytes.len(), STEREO_COLOR_WIRE_SIZE);
        assert_eq!(&bytes[0..8], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[8..12], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[28..32], &2.0f32.to_le_bytes());
    }

    #[test]
    fn test_short_buffer_is_empty() {
        let decoded = StereoColorSample::from_bytes(&[0xFF; 31]);
        assert!(decoded.is_empty());
        assert_eq!(decoded, StereoColorSample::EMPTY);
    }

    #[test]
    fn test_structural_equality() {
        let a = StereoColorSample::new(10, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6);
        let b = StereoColorSample::from_levels(10, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        assert_eq!(a, b);
        assert_ne!(a, StereoColorSample { timestamp: 11, ..a });
        assert!(!a.is_empty());
        assert_eq!(StereoColorSample::default(), StereoColorSample::EMPTY);
    }
}
