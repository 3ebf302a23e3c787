//! Sample channel between the audio thread and its consumer
//!
//! CRITICAL: the producer side runs inside the audio callback. `push` is
//! wait-free and never allocates.
//!
//! The channel is shared by reference (`&self`) so that the decoder and its
//! handle can live on different threads. Consumers serialize on a lock, so
//! any thread may pop or clear. A push that finds another push in progress
//! is rejected and counted as dropped, so the producer never waits.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

// ═══════════════════════════════════════════════════════════════════════════════
// SAMPLE CHANNEL
// ═══════════════════════════════════════════════════════════════════════════════

/// Bounded queue of `Copy` values with a wait-free producer side.
///
/// When full, `push` drops the NEW value and counts it; queued values are
/// never overwritten, so the consumer always sees pushes in order.
#[repr(align(64))]
pub struct SampleChannel<T> {
    /// Slot storage
    buffer: Box<[UnsafeCell<T>]>,
    /// Capacity (power of 2)
    capacity: usize,
    /// Capacity mask for index wrapping
    mask: usize,
    /// Write position (only modified by producer)
    write_pos: AtomicUsize,
    /// Read position (only modified by consumer)
    read_pos: AtomicUsize,
    /// Values rejected because the channel was full or busy
    dropped: AtomicU64,
    /// Set while a push is writing a slot
    producing: AtomicBool,
    /// Held for the whole of `pop` and `clear`
    consumer: Mutex<()>,
}

// SAFETY: a slot is only written while `producing` is held and before
// `write_pos` publishes it, and only read under `consumer` after observing it.
unsafe impl<T: Copy + Send> Send for SampleChannel<T> {}
unsafe impl<T: Copy + Send> Sync for SampleChannel<T> {}

impl<T: Copy + Default> SampleChannel<T> {
    /// Create a channel holding at least `min_capacity` values (rounded up to a power of 2)
    pub fn new(min_capacity: usize) -> Self {
        let capacity = min_capacity.max(2).next_power_of_two();
        let buffer = (0..capacity)
            .map(|_| UnsafeCell::new(T::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            buffer,
            capacity,
            mask: capacity - 1,
            write_pos: AtomicUsize::new(0),
            read_pos: AtomicUsize::new(0),
            dropped: AtomicU64::new(0),
            producing: AtomicBool::new(false),
            consumer: Mutex::new(()),
        }
    }
}

impl<T: Copy> SampleChannel<T> {
    /// Push one value (producer side - audio thread)
    ///
    /// Returns `false` and counts a drop if the channel is full or another
    /// push is in progress.
    #[inline]
    pub fn push(&self, value: T) -> bool {
        if self.producing.swap(true, Ordering::Acquire) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let pushed = self.push_exclusive(value);
        self.producing.store(false, Ordering::Release);

        if !pushed {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        pushed
    }

    #[inline]
    fn push_exclusive(&self, value: T) -> bool {
        let write = self.write_pos.load(Ordering::Relaxed);
        let read = self.read_pos.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= self.capacity {
            return false;
        }

        // SAFETY: `producing` is held; the consumer never touches this slot
        // until the release store below publishes it
        unsafe {
            *self.buffer[write & self.mask].get() = value;
        }

        self.write_pos.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Pop the oldest value (consumer side)
    #[inline]
    pub fn pop(&self) -> Option<T> {
        let _consumer = self.consumer.lock();
        let read = self.read_pos.load(Ordering::Relaxed);
        let write = self.write_pos.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        // SAFETY: `consumer` is held; the producer published this slot with
        // release and will not reuse it until `read_pos` moves past it
        let value = unsafe { *self.buffer[read & self.mask].get() };

        self.read_pos.store(read.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    /// Discard everything queued (consumer side)
    ///
    /// Returns the number of values discarded.
    pub fn clear(&self) -> usize {
        let _consumer = self.consumer.lock();
        let read = self.read_pos.load(Ordering::Relaxed);
        let write = self.write_pos.load(Ordering::Acquire);
        self.read_pos.store(write, Ordering::Release);
        write.wrapping_sub(read)
    }

    /// Number of values waiting to be popped
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        write.wrapping_sub(read).min(self.capacity)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total values dropped since creation
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T> std::fmt::Debug for SampleChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleChannel")
            .field("capacity", &self.capacity)
            .field("write_pos", &self.write_pos.load(Ordering::Relaxed))
            .field("read_pos", &self.read_pos.load(Ordering::Relaxed))
            .field("dropped", &self.dropped.load(Ordering::Relaxed))
            .finish()
    }
}
