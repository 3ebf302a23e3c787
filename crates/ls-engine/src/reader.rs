//! Stereo reader: the consumer thread of a decoder's sample channel
//!
//! One reader owns one consumer thread. On each wake it drains the decoder's
//! sample channel, dispatching every sample to all registered listeners,
//! then checks the cancellation flag. How it waits between drain passes is
//! selected by [`ThreadMode`] and can change while running.
//!
//! ```text
//! Sleep ─► sleep ~1 ms ──────────────┐
//! Event ─► wait for decoder notify ──┼─► drain pass ─► exit requested? ─► stop
//! Loop  ─► spin ─────────────────────┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::{Mutex, RwLock};

use ls_audio::{DecoderHandle, WaitingProcess};
use ls_core::{LsError, LsResult, PerfSnapshot, ThreadMode};

use crate::{ListenerRef, ListenerRegistry, PerfChannel, PerfMonitor, RunningProcess};

/// Poll interval in [`ThreadMode::Sleep`]
pub const SLEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Upper bound on an Event mode wait, so a missed notify only delays samples
pub const EVENT_TIMEOUT: Duration = Duration::from_millis(50);

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// State shared between the reader handle, its thread and the decoder
struct ReaderShared {
    mode: AtomicU8,
    running: AtomicBool,
    should_exit: AtomicBool,
    listeners: ListenerRegistry,
    decoder: RwLock<Option<DecoderHandle>>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    perf: PerfChannel,
    dispatched: AtomicU64,
}

impl ReaderShared {
    #[inline]
    fn thread_mode(&self) -> ThreadMode {
        ThreadMode::from_u8(self.mode.load(Ordering::Relaxed))
    }

    /// Pop and dispatch everything queued when the pass starts.
    ///
    /// Samples pushed during the pass wait for the next one, so a busy
    /// producer cannot keep a pass open. Cancellation is checked by the
    /// caller after the pass returns. Returns the number of samples dispatched.
    fn drain_pass(&self) -> usize {
        let Some(decoder) = self.decoder.read().clone() else {
            return 0;
        };

        let queued = decoder.pending_samples();
        let mut count = 0;
        while count < queued {
            let Some(sample) = decoder.pop_color_sample() else {
                break;
            };
            self.listeners.dispatch(self, &sample);
            count += 1;
        }

        self.dispatched.fetch_add(count as u64, Ordering::Relaxed);
        count
    }

    /// Block according to the current thread mode
    fn wait(&self) {
        match self.thread_mode() {
            ThreadMode::Sleep => thread::sleep(SLEEP_INTERVAL),
            ThreadMode::Event => match self.wake_rx.recv_timeout(EVENT_TIMEOUT) {
                Ok(()) | Err(RecvTimeoutError::Timeout) => {}
                // Sender lives in this struct; cannot disconnect while we run
                Err(RecvTimeoutError::Disconnected) => thread::sleep(SLEEP_INTERVAL),
            },
            ThreadMode::Loop => std::hint::spin_loop(),
        }
    }

    fn run(&self, mut perf: PerfMonitor) -> PerfMonitor {
        log::debug!("Reader thread started in {} mode", self.thread_mode());

        loop {
            let now = Instant::now();
            perf.thread_tick(now);

            if self.drain_pass() > 0 {
                perf.data_tick(now);
            }
            perf.maybe_emit(now);

            if self.should_exit.load(Ordering::Acquire) {
                break;
            }
            self.wait();
        }

        self.running.store(false, Ordering::Release);
        log::debug!("Reader thread exiting");
        perf
    }
}

impl WaitingProcess for ReaderShared {
    fn notify(&self) {
        // Capacity 1: a pending wake already covers this one
        let _ = self.wake_tx.try_send(());
    }

    fn thread_mode(&self) -> ThreadMode {
        ReaderShared::thread_mode(self)
    }
}

impl RunningProcess for ReaderShared {
    fn signal_should_exit(&self) {
        self.should_exit.store(true, Ordering::Release);
        let _ = self.wake_tx.try_send(());
    }

    fn should_exit(&self) -> bool {
        self.should_exit.load(Ordering::Acquire)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// READER
// ═══════════════════════════════════════════════════════════════════════════════

/// Consumer thread for one decoder
pub struct Reader {
    shared: Arc<ReaderShared>,
    thread: Mutex<Option<JoinHandle<PerfMonitor>>>,
}

impl Default for Reader {
    fn default() -> Self {
        Self::new(ThreadMode::default())
    }
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("thread_mode", &self.thread_mode())
            .field("running", &self.is_running())
            .field("listeners", &self.listeners().len())
            .finish()
    }
}

impl Reader {
    pub fn new(mode: ThreadMode) -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            shared: Arc::new(ReaderShared {
                mode: AtomicU8::new(mode.as_u8()),
                running: AtomicBool::new(false),
                should_exit: AtomicBool::new(false),
                listeners: ListenerRegistry::new(),
                decoder: RwLock::new(None),
                wake_tx,
                wake_rx,
                perf: PerfChannel::new(),
                dispatched: AtomicU64::new(0),
            }),
            thread: Mutex::new(None),
        }
    }

    pub fn thread_mode(&self) -> ThreadMode {
        self.shared.thread_mode()
    }

    /// Change the wait strategy; takes effect on the next wait cycle
    pub fn set_thread_mode(&self, mode: ThreadMode) {
        self.shared.mode.store(mode.as_u8(), Ordering::Relaxed);
        // Release a thread still parked in an Event wait
        let _ = self.shared.wake_tx.try_send(());
        log::debug!("Reader thread mode set to {}", mode);
    }

    /// Wake the reader (Event mode). Safe to call from any thread.
    pub fn notify(&self) {
        self.shared.notify();
    }

    /// Request exit at the end of the current drain pass
    pub fn signal_should_exit(&self) {
        self.shared.signal_should_exit();
    }

    /// The process the decoder wakes in Event mode
    pub fn waiting_process(&self) -> Arc<dyn WaitingProcess> {
        self.shared.clone()
    }

    /// Set the decoder this reader drains, without linking notifications
    pub fn set_decoder(&self, decoder: Option<DecoderHandle>) {
        *self.shared.decoder.write() = decoder;
    }

    pub fn decoder(&self) -> Option<DecoderHandle> {
        self.shared.decoder.read().clone()
    }

    /// Link both directions: this reader drains `decoder`, and `decoder`
    /// notifies this reader
    pub fn connect(&self, decoder: &DecoderHandle) {
        decoder.set_reader(Some(self.waiting_process()));
        self.set_decoder(Some(decoder.clone()));
    }

    /// Undo [`connect`](Self::connect). Only clears links that point at each other.
    pub fn disconnect(&self, decoder: &DecoderHandle) -> bool {
        let mut current = self.shared.decoder.write();
        let linked = current.as_ref().is_some_and(|d| d.same_decoder(decoder));
        if linked {
            *current = None;
            decoder.set_reader(None);
        }
        linked
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.shared.listeners
    }

    pub fn add_listener(&self, listener: ListenerRef) -> bool {
        self.shared.listeners.add(listener)
    }

    pub fn remove_listener(&self, listener: &ListenerRef) -> bool {
        self.shared.listeners.remove(listener)
    }

    pub fn clear_listeners(&self) {
        self.shared.listeners.clear();
    }

    /// Spawn the consumer thread. No-op if already running.
    pub fn start(&self) -> LsResult<()> {
        let mut slot = self.thread.lock();

        if self.shared.running.load(Ordering::Acquire) {
            return Ok(());
        }
        // Reap a thread that exited on its own (listener cancellation)
        if let Some(handle) = slot.take() {
            self.reap(handle);
        }

        let perf = self
            .shared
            .perf
            .start_session()
            .ok_or_else(|| LsError::InvalidParam("perf channel busy".into()))?;

        self.shared.should_exit.store(false, Ordering::Release);
        while self.shared.wake_rx.try_recv().is_ok() {}
        self.shared.running.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("ls-reader".into())
            .spawn(move || shared.run(perf));

        match spawned {
            Ok(handle) => {
                *slot = Some(handle);
                log::info!("Reader started ({} mode)", self.thread_mode());
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                // The monitor moved into the failed closure; rebuild the channel
                self.shared.perf.recover();
                log::warn!("Failed to spawn reader thread: {}", e);
                Err(LsError::Io(e))
            }
        }
    }

    /// Request exit and join the consumer thread. No-op if not running.
    pub fn stop(&self) {
        let Some(handle) = self.thread.lock().take() else {
            return;
        };

        self.shared.should_exit.store(true, Ordering::Release);
        let _ = self.shared.wake_tx.try_send(());
        self.reap(handle);
        log::info!("Reader stopped");
    }

    fn reap(&self, handle: JoinHandle<PerfMonitor>) {
        match handle.join() {
            Ok(monitor) => self.shared.perf.end_session(monitor),
            Err(_) => {
                log::warn!("Reader thread panicked");
                self.shared.perf.recover();
            }
        }
        self.shared.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Total samples dispatched since creation
    pub fn samples_dispatched(&self) -> u64 {
        self.shared.dispatched.load(Ordering::Relaxed)
    }

    pub fn pop_perf_info(&self) -> Option<PerfSnapshot> {
        self.shared.perf.pop()
    }

    /// Discard pending perf snapshots, returning how many were discarded
    pub fn clear_perf_info(&self) -> usize {
        self.shared.perf.clear()
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        self.stop();
        if let Some(decoder) = self.shared.decoder.write().take() {
            decoder.set_reader(None);
        }
    }
}
