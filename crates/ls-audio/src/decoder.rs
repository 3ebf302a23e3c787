//! Stereo decoder: audio thread producer of [`StereoColorSample`]s
//!
//! Split in two halves:
//! - [`StereoDecoder`] is owned by the audio thread and runs the decode engine
//! - [`DecoderHandle`] is shared with any thread and exposes levels, settings
//!   and the consumer side of the sample channel
//!
//! ```text
//! audio callback ─► StereoDecoder::process_block ─► SampleChannel ─► DecoderHandle::pop_color_sample
//!                              │                                         (reader thread)
//!                              └─► notify() if the linked reader is in Event mode
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use parking_lot::{Mutex, RwLock};
use portable_atomic::AtomicF32;

use ls_core::{LightSoundCodec, StereoColorSample, ThreadMode, DEFAULT_BUFFER_SIZE, DEFAULT_SAMPLE_RATE};
use ls_dsp::{ToneLevelEngine, ToneLevels};

use crate::{LevelIndex, LevelRegisters, SampleChannel};

/// Smallest sample channel created by [`StereoDecoder::reset`]
pub const MIN_CHANNEL_CAPACITY: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════════
// SEAMS
// ═══════════════════════════════════════════════════════════════════════════════

/// A consumer that can be woken when new samples are available
pub trait WaitingProcess: Send + Sync {
    /// Signal that new data is available. Called from the audio thread.
    fn notify(&self);

    /// Current wait strategy; the decoder only notifies in [`ThreadMode::Event`]
    fn thread_mode(&self) -> ThreadMode;
}

/// One decoded filter block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedFrame {
    /// `r0, g0, b0, r1, g1, b1` before brightness
    pub levels: [f32; 6],
    pub codec: LightSoundCodec,
    /// Audio sample position at the end of the block (non-zero)
    pub position: u64,
}

impl From<ToneLevels> for DecodedFrame {
    fn from(levels: ToneLevels) -> Self {
        Self {
            levels: levels.levels,
            codec: levels.codec,
            position: levels.position,
        }
    }
}

/// Frequency-domain decoding filter
///
/// Implementations must be realtime safe in [`process`](Self::process).
pub trait DecodeEngine: Send {
    /// Prepare for a stream, returning the internal filter block size
    fn reset(&mut self, sample_rate: f64, buffer_size: usize) -> usize;

    /// Consume a stereo block, emitting one frame per completed filter block
    fn process(&mut self, in0: &[f32], in1: &[f32], emit: &mut dyn FnMut(DecodedFrame));

    fn block_size(&self) -> usize;
}

impl DecodeEngine for ToneLevelEngine {
    fn reset(&mut self, sample_rate: f64, buffer_size: usize) -> usize {
        ToneLevelEngine::reset(self, sample_rate, buffer_size)
    }

    fn process(&mut self, in0: &[f32], in1: &[f32], emit: &mut dyn FnMut(DecodedFrame)) {
        ToneLevelEngine::process(self, in0, in1, |levels| emit(levels.into()));
    }

    fn block_size(&self) -> usize {
        ToneLevelEngine::block_size(self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED STATE
// ═══════════════════════════════════════════════════════════════════════════════

struct DecoderShared {
    /// Replaced only by `reset`; the audio thread keeps its own clone
    channel: RwLock<Arc<SampleChannel<StereoColorSample>>>,
    levels: LevelRegisters,
    brightness: AtomicF32,
    audio_strobe: AtomicBool,
    codec: AtomicU8,
    /// Audio thread only ever `try_lock`s this
    reader: Mutex<Option<Arc<dyn WaitingProcess>>>,
}

/// Thread-safe view of a [`StereoDecoder`]
#[derive(Clone)]
pub struct DecoderHandle {
    shared: Arc<DecoderShared>,
}

impl std::fmt::Debug for DecoderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderHandle")
            .field("codec", &self.codec())
            .field("brightness", &self.brightness())
            .field("pending", &self.pending_samples())
            .finish()
    }
}

impl DecoderHandle {
    #[inline]
    pub fn level(&self, index: LevelIndex) -> f32 {
        self.shared.levels.get(index)
    }

    pub fn level_r0(&self) -> f32 {
        self.level(LevelIndex::Red0)
    }

    pub fn level_g0(&self) -> f32 {
        self.level(LevelIndex::Green0)
    }

    pub fn level_b0(&self) -> f32 {
        self.level(LevelIndex::Blue0)
    }

    pub fn level_r1(&self) -> f32 {
        self.level(LevelIndex::Red1)
    }

    pub fn level_g1(&self) -> f32 {
        self.level(LevelIndex::Green1)
    }

    pub fn level_b1(&self) -> f32 {
        self.level(LevelIndex::Blue1)
    }

    /// All six current levels
    pub fn levels(&self) -> [f32; 6] {
        self.shared.levels.snapshot()
    }

    /// Global output brightness (0.0 - 1.0)
    pub fn brightness(&self) -> f32 {
        self.shared.brightness.load(Ordering::Relaxed)
    }

    /// Set output brightness, clamped to 0.0 - 1.0. NaN is ignored.
    pub fn set_brightness(&self, brightness: f32) {
        if brightness.is_nan() {
            return;
        }
        self.shared
            .brightness
            .store(brightness.clamp(0.0, 1.0), Ordering::Relaxed);
    }

    pub fn is_audio_strobe(&self) -> bool {
        self.shared.audio_strobe.load(Ordering::Relaxed)
    }

    /// Codec of the most recent decoded block
    pub fn codec(&self) -> LightSoundCodec {
        LightSoundCodec::from_u8(self.shared.codec.load(Ordering::Relaxed))
    }

    /// Override the codec. The decoder sets it again after the next block.
    pub fn set_codec(&self, codec: LightSoundCodec) {
        self.shared.codec.store(codec.as_u8(), Ordering::Relaxed);
        self.shared
            .audio_strobe
            .store(codec == LightSoundCodec::AudioStrobe, Ordering::Relaxed);
    }

    /// Pop the next decoded sample.
    ///
    /// Callable from any thread. Concurrent callers each get distinct
    /// samples, so a manual pop takes a sample away from an attached reader.
    pub fn pop_color_sample(&self) -> Option<StereoColorSample> {
        self.shared.channel.read().pop()
    }

    /// Discard all pending samples, returning how many were discarded
    pub fn clear_color_samples(&self) -> usize {
        self.shared.channel.read().clear()
    }

    pub fn pending_samples(&self) -> usize {
        self.shared.channel.read().len()
    }

    /// Samples dropped because the channel was full since the last reset
    pub fn dropped_samples(&self) -> u64 {
        self.shared.channel.read().dropped()
    }

    pub fn channel_capacity(&self) -> usize {
        self.shared.channel.read().capacity()
    }

    /// Attach or detach the process woken in Event mode
    pub fn set_reader(&self, reader: Option<Arc<dyn WaitingProcess>>) {
        *self.shared.reader.lock() = reader;
    }

    pub fn has_reader(&self) -> bool {
        self.shared.reader.lock().is_some()
    }

    /// Whether both handles refer to the same decoder
    pub fn same_decoder(&self, other: &DecoderHandle) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEREO DECODER
// ═══════════════════════════════════════════════════════════════════════════════

/// Audio thread half of the decoder
pub struct StereoDecoder {
    engine: Box<dyn DecodeEngine>,
    channel: Arc<SampleChannel<StereoColorSample>>,
    shared: Arc<DecoderShared>,
    sample_rate: f64,
    buffer_size: usize,
}

impl Default for StereoDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StereoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StereoDecoder")
            .field("sample_rate", &self.sample_rate)
            .field("buffer_size", &self.buffer_size)
            .field("block_size", &self.engine.block_size())
            .field("channel", &self.channel)
            .finish()
    }
}

impl StereoDecoder {
    /// Decoder using the Goertzel [`ToneLevelEngine`]
    pub fn new() -> Self {
        Self::with_engine(Box::new(ToneLevelEngine::new()))
    }

    pub fn with_engine(engine: Box<dyn DecodeEngine>) -> Self {
        let channel = Arc::new(SampleChannel::new(MIN_CHANNEL_CAPACITY));
        let shared = Arc::new(DecoderShared {
            channel: RwLock::new(Arc::clone(&channel)),
            levels: LevelRegisters::new(),
            brightness: AtomicF32::new(1.0),
            audio_strobe: AtomicBool::new(false),
            codec: AtomicU8::new(LightSoundCodec::default().as_u8()),
            reader: Mutex::new(None),
        });

        let mut decoder = Self {
            engine,
            channel,
            shared,
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: DEFAULT_BUFFER_SIZE,
        };
        decoder.reset(DEFAULT_SAMPLE_RATE, DEFAULT_BUFFER_SIZE);
        decoder
    }

    /// Shared handle for other threads
    pub fn handle(&self) -> DecoderHandle {
        DecoderHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Prepare for a stream. Call from the audio thread before streaming.
    ///
    /// Recreates the sample channel (pending samples are discarded) sized
    /// for the engine's filter block.
    pub fn reset(&mut self, sample_rate: f64, buffer_size: usize) {
        let block_size = self.engine.reset(sample_rate, buffer_size).max(1);
        let blocks_per_buffer = buffer_size.div_ceil(block_size).max(1);
        let capacity = (4 * blocks_per_buffer)
            .max(MIN_CHANNEL_CAPACITY)
            .next_power_of_two();

        let channel = Arc::new(SampleChannel::new(capacity));
        *self.shared.channel.write() = Arc::clone(&channel);
        self.channel = channel;

        self.shared.levels.clear();
        self.shared.audio_strobe.store(false, Ordering::Relaxed);
        self.sample_rate = sample_rate;
        self.buffer_size = buffer_size;

        log::info!(
            "Decoder reset: {} Hz, buffer {} samples, filter block {}, channel capacity {}",
            sample_rate,
            buffer_size,
            block_size,
            capacity
        );
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.engine.block_size()
    }

    /// Decode `num_samples` from each channel (audio thread only).
    ///
    /// Realtime safe apart from the Event mode wake-up of a linked reader.
    pub fn process_block(&mut self, in0: &[f32], in1: &[f32], num_samples: usize) {
        let n = num_samples.min(in0.len()).min(in1.len());
        if n == 0 {
            return;
        }

        let shared = &*self.shared;
        let channel = &*self.channel;
        let brightness = shared.brightness.load(Ordering::Relaxed);
        let mut produced = false;

        self.engine.process(&in0[..n], &in1[..n], &mut |frame: DecodedFrame| {
            let levels = frame.levels.map(|level| level * brightness);
            shared.levels.store(levels);
            shared.codec.store(frame.codec.as_u8(), Ordering::Relaxed);
            shared
                .audio_strobe
                .store(frame.codec == LightSoundCodec::AudioStrobe, Ordering::Relaxed);

            channel.push(StereoColorSample::from_levels(frame.position, levels));
            produced = true;
        });

        if produced {
            self.notify_reader();
        }
    }

    #[inline]
    fn notify_reader(&self) {
        // Never block the audio thread; a contended link skips one wake-up and
        // the reader's timeout picks the samples up
        if let Some(reader) = self.shared.reader.try_lock() {
            if let Some(reader) = reader.as_ref() {
                if reader.thread_mode().needs_notify() {
                    reader.notify();
                }
            }
        }
    }
}
