//! Reader timing telemetry
//!
//! The reader thread measures two deltas:
//! - thread: time between successive wake cycles
//! - data: time between successive wake cycles that found new samples
//!
//! Each category keeps a rolling window of the last [`PERF_WINDOW`] deltas
//! and session-wide min/max. A [`PerfSnapshot`] is pushed into the
//! [`PerfChannel`] every [`PERF_INTERVAL`].

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rtrb::{Consumer, Producer, RingBuffer};

use ls_core::PerfSnapshot;

/// Deltas per rolling window
pub const PERF_WINDOW: usize = 128;

/// Reader time between snapshots
pub const PERF_INTERVAL: Duration = Duration::from_millis(250);

/// Snapshots buffered before new ones are dropped
pub const PERF_CHANNEL_CAPACITY: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════════
// DELTA WINDOW
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct WindowStats {
    current_min: f64,
    current_max: f64,
    average: f64,
    total_min: f64,
    total_max: f64,
}

/// Rolling window of time deltas plus session extremes
#[derive(Debug, Clone)]
struct DeltaWindow {
    last: Option<Instant>,
    deltas: [f64; PERF_WINDOW],
    len: usize,
    next: usize,
    total_min: f64,
    total_max: f64,
}

impl DeltaWindow {
    fn new() -> Self {
        Self {
            last: None,
            deltas: [0.0; PERF_WINDOW],
            len: 0,
            next: 0,
            total_min: f64::INFINITY,
            total_max: 0.0,
        }
    }

    fn mark(&mut self, now: Instant) {
        if let Some(last) = self.last {
            self.record_ms(now.saturating_duration_since(last).as_secs_f64() * 1000.0);
        }
        self.last = Some(now);
    }

    fn record_ms(&mut self, delta_ms: f64) {
        self.deltas[self.next] = delta_ms;
        self.next = (self.next + 1) % PERF_WINDOW;
        self.len = (self.len + 1).min(PERF_WINDOW);
        self.total_min = self.total_min.min(delta_ms);
        self.total_max = self.total_max.max(delta_ms);
    }

    fn has_data(&self) -> bool {
        self.len > 0
    }

    fn stats(&self) -> WindowStats {
        if self.len == 0 {
            return WindowStats::default();
        }

        let window = &self.deltas[..self.len];
        let (min, max, sum) = window
            .iter()
            .fold((f64::INFINITY, 0.0f64, 0.0), |(min, max, sum), &d| (min.min(d), max.max(d), sum + d));

        WindowStats {
            current_min: min,
            current_max: max,
            average: sum / self.len as f64,
            total_min: self.total_min,
            total_max: self.total_max,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PERF MONITOR (reader thread)
// ═══════════════════════════════════════════════════════════════════════════════

/// Producer side of the telemetry, owned by the reader thread
pub struct PerfMonitor {
    thread: DeltaWindow,
    data: DeltaWindow,
    last_emit: Option<Instant>,
    producer: Producer<PerfSnapshot>,
    dropped: u64,
}

impl PerfMonitor {
    fn new(producer: Producer<PerfSnapshot>) -> Self {
        Self {
            thread: DeltaWindow::new(),
            data: DeltaWindow::new(),
            last_emit: None,
            producer,
            dropped: 0,
        }
    }

    /// Start of a wake cycle
    #[inline]
    pub fn thread_tick(&mut self, now: Instant) {
        self.thread.mark(now);
    }

    /// A wake cycle found new samples
    #[inline]
    pub fn data_tick(&mut self, now: Instant) {
        self.data.mark(now);
    }

    /// Current statistics
    pub fn snapshot(&self) -> PerfSnapshot {
        let thread = self.thread.stats();
        let data = self.data.stats();

        PerfSnapshot {
            thread_current_min_ms: thread.current_min,
            thread_current_max_ms: thread.current_max,
            thread_average_ms: thread.average,
            thread_total_min_ms: thread.total_min,
            thread_total_max_ms: thread.total_max,
            data_current_min_ms: data.current_min,
            data_current_max_ms: data.current_max,
            data_average_ms: data.average,
            data_total_min_ms: data.total_min,
            data_total_max_ms: data.total_max,
            has_data: self.data.has_data(),
        }
    }

    /// Push a snapshot if [`PERF_INTERVAL`] has elapsed. Returns whether one was queued.
    pub fn maybe_emit(&mut self, now: Instant) -> bool {
        let last = *self.last_emit.get_or_insert(now);
        if now.saturating_duration_since(last) < PERF_INTERVAL {
            return false;
        }
        self.last_emit = Some(now);
        self.emit()
    }

    /// Push a snapshot now. Returns `false` if the channel is full.
    pub fn emit(&mut self) -> bool {
        if !self.thread.has_data() {
            return false;
        }
        let snapshot = self.snapshot();
        match self.producer.push(snapshot) {
            Ok(()) => true,
            Err(_) => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Snapshots dropped because the channel was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn into_producer(self) -> Producer<PerfSnapshot> {
        self.producer
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PERF CHANNEL
// ═══════════════════════════════════════════════════════════════════════════════

/// SPSC channel of [`PerfSnapshot`]s.
///
/// The producer is lent to one reader thread at a time through
/// [`start_session`](Self::start_session) / [`end_session`](Self::end_session).
/// The consumer may be polled from any thread.
pub struct PerfChannel {
    producer: Mutex<Option<Producer<PerfSnapshot>>>,
    consumer: Mutex<Consumer<PerfSnapshot>>,
}

impl Default for PerfChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl PerfChannel {
    pub fn new() -> Self {
        let (producer, consumer) = RingBuffer::new(PERF_CHANNEL_CAPACITY);
        Self {
            producer: Mutex::new(Some(producer)),
            consumer: Mutex::new(consumer),
        }
    }

    /// Take the producer for a new session with fresh statistics.
    ///
    /// Returns `None` while a session is already active.
    pub fn start_session(&self) -> Option<PerfMonitor> {
        self.producer.lock().take().map(PerfMonitor::new)
    }

    /// Return the producer of a finished session
    pub fn end_session(&self, monitor: PerfMonitor) {
        if monitor.dropped() > 0 {
            log::debug!("Perf channel full, {} snapshots dropped", monitor.dropped());
        }
        *self.producer.lock() = Some(monitor.into_producer());
    }

    /// Replace both ends after a session was lost (e.g. reader thread panic)
    pub fn recover(&self) {
        let (producer, consumer) = RingBuffer::new(PERF_CHANNEL_CAPACITY);
        *self.consumer.lock() = consumer;
        *self.producer.lock() = Some(producer);
    }

    pub fn pop(&self) -> Option<PerfSnapshot> {
        self.consumer.lock().pop().ok()
    }

    /// Discard pending snapshots, returning how many were discarded
    pub fn clear(&self) -> usize {
        let mut consumer = self.consumer.lock();
        let mut count = 0;
        while consumer.pop().is_ok() {
            count += 1;
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.consumer.lock().slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_stats() {
        let mut window = DeltaWindow::new();
        for delta in [4.0, 6.0, 5.0] {
            window.record_ms(delta);
        }
        let stats = window.stats();
        assert_eq!(stats.current_min, 4.0);
        assert_eq!(stats.current_max, 6.0);
        assert_relative_eq!(stats.average, 5.0);
    }

    #[test]
    fn test_window_rolls_but_totals_persist() {
        let mut window = DeltaWindow::new();
        window.record_ms(100.0);
        for _ in 0..PERF_WINDOW {
            window.record_ms(1.0);
        }
        let stats = window.stats();
        assert_eq!(stats.current_max, 1.0);
        assert_eq!(stats.total_max, 100.0);
        assert_eq!(stats.total_min, 1.0);
    }

    #[test]
    fn test_mark_uses_instants() {
        let mut window = DeltaWindow::new();
        let t0 = Instant::now();
        window.mark(t0);
        assert!(!window.has_data());
        window.mark(t0 + Duration::from_millis(5));
        assert!(window.has_data());
        assert_relative_eq!(window.stats().current_min, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_session_emits_on_interval() {
        let channel = PerfChannel::new();
        let mut monitor = channel.start_session().expect("producer available");
        assert!(channel.start_session().is_none());

        let t0 = Instant::now();
        monitor.thread_tick(t0);
        monitor.thread_tick(t0 + Duration::from_millis(1));
        monitor.data_tick(t0);
        monitor.data_tick(t0 + Duration::from_millis(5));

        assert!(!monitor.maybe_emit(t0));
        assert!(!monitor.maybe_emit(t0 + Duration::from_millis(100)));
        assert!(monitor.maybe_emit(t0 + PERF_INTERVAL));

        channel.end_session(monitor);
        let snapshot = channel.pop().expect("snapshot");
        assert!(snapshot.has_data);
        assert_relative_eq!(snapshot.thread_average_ms, 1.0, epsilon = 1e-6);
        assert_relative_eq!(snapshot.data_current_max_ms, 5.0, epsilon = 1e-6);
        assert!(channel.pop().is_none());
        assert!(channel.start_session().is_some());
    }

    #[test]
    fn test_full_channel_drops_new() {
        let channel = PerfChannel::new();
        let mut monitor = channel.start_session().expect("producer available");
        let t0 = Instant::now();
        monitor.thread_tick(t0);
        monitor.thread_tick(t0 + Duration::from_millis(2));

        for _ in 0..PERF_CHANNEL_CAPACITY {
            assert!(monitor.emit());
        }
        assert!(!monitor.emit());
        assert_eq!(monitor.dropped(), 1);

        assert_eq!(channel.pending(), PERF_CHANNEL_CAPACITY);
        assert_eq!(channel.clear(), PERF_CHANNEL_CAPACITY);
        assert!(channel.pop().is_none());
        channel.end_session(monitor);
    }
}
