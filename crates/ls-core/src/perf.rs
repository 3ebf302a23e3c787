//! Reader timing telemetry record

/// Timing statistics for the reader, in milliseconds.
///
/// `thread_*` values measure the delta between reader wake cycles,
/// `data_*` values the delta between successive data availability.
/// `current_*`/`average` cover the rolling window, `total_*` the session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerfSnapshot {
    pub thread_current_min_ms: f64,
    pub thread_current_max_ms: f64,
    pub thread_average_ms: f64,
    pub thread_total_min_ms: f64,
    pub thread_total_max_ms: f64,
    pub data_current_min_ms: f64,
    pub data_current_max_ms: f64,
    pub data_average_ms: f64,
    pub data_total_min_ms: f64,
    pub data_total_max_ms: f64,
    /// False until at least one data delta has been measured
    pub has_data: bool,
}

impl PerfSnapshot {
    /// Ideal data delta for a given sample rate and buffer size
    #[inline]
    pub fn expected_frame_time_ms(sample_rate: f64, buffer_size: usize) -> f64 {
        if sample_rate <= 0.0 {
            return 0.0;
        }
        buffer_size as f64 * 1000.0 / sample_rate
    }

    /// Window jitter of the data category (max - min)
    #[inline]
    pub fn data_jitter_ms(&self) -> f64 {
        if !self.has_data {
            return 0.0;
        }
        self.data_current_max_ms - self.data_current_min_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_expected_frame_time() {
        assert_relative_eq!(PerfSnapshot::expected_frame_time_ms(48_000.0, 256), 5.333_333, epsilon = 1e-5);
        assert_eq!(PerfSnapshot::expected_frame_time_ms(0.0, 256), 0.0);
    }

    #[test]
    fn test_jitter_requires_data() {
        let mut snap = PerfSnapshot {
            data_current_min_ms: 5.0,
            data_current_max_ms: 6.5,
            ..Default::default()
        };
        assert_eq!(snap.data_jitter_ms(), 0.0);
        snap.has_data = true;
        assert_relative_eq!(snap.data_jitter_ms(), 1.5);
    }
}
