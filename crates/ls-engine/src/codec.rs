//! Instance registry addressed by integer IDs
//!
//! [`Codec`] owns decoders, readers and listeners and hands out
//! non-negative `i32` IDs from per-kind counters that never reuse a value.
//! Operations on unknown IDs return sentinels instead of errors:
//!
//! | Return type | Sentinel |
//! |-------------|----------|
//! | `i32`/`i64` | `-1`     |
//! | `f32`       | `-1.0`   |
//! | `bool`      | `false`  |
//! | `Option<T>` | `None`   |
//!
//! Decoder↔reader links are explicit: [`Codec::connect`] wires both
//! directions, [`Codec::disconnect`] and destruction clear them.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use parking_lot::{Mutex, RwLock};

use ls_audio::{DecoderHandle, StereoDecoder};
use ls_core::{NetworkInterface, PerfSnapshot, StereoColorSample, ThreadMode, UdpConfig};
use ls_dsp::{deinterleave_stereo, StaticEncoder};

use crate::{ListenerRef, Reader, UdpRelayListener};

/// Listener types [`Codec::listener_create`] can build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    UdpRelay,
}

struct DecoderEntry {
    /// Locked by whichever thread drives the audio stream
    decoder: Mutex<StereoDecoder>,
    handle: DecoderHandle,
}

#[derive(Clone)]
enum ListenerEntry {
    UdpRelay(Arc<UdpRelayListener>),
    Custom(ListenerRef),
}

impl ListenerEntry {
    fn as_listener(&self) -> ListenerRef {
        match self {
            Self::UdpRelay(udp) => udp.clone(),
            Self::Custom(listener) => listener.clone(),
        }
    }

    fn as_udp(&self) -> Option<&Arc<UdpRelayListener>> {
        match self {
            Self::UdpRelay(udp) => Some(udp),
            Self::Custom(_) => None,
        }
    }
}

/// Registry of decoders, readers and listeners
pub struct Codec {
    decoders: RwLock<BTreeMap<i32, Arc<DecoderEntry>>>,
    readers: RwLock<BTreeMap<i32, Arc<Reader>>>,
    listeners: RwLock<BTreeMap<i32, ListenerEntry>>,
    /// Active `(decoder_id, reader_id)` links
    links: Mutex<Vec<(i32, i32)>>,
    next_decoder_id: AtomicI32,
    next_reader_id: AtomicI32,
    next_listener_id: AtomicI32,
    encoder: Mutex<StaticEncoder>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    pub fn new() -> Self {
        Self {
            decoders: RwLock::new(BTreeMap::new()),
            readers: RwLock::new(BTreeMap::new()),
            listeners: RwLock::new(BTreeMap::new()),
            links: Mutex::new(Vec::new()),
            next_decoder_id: AtomicI32::new(0),
            next_reader_id: AtomicI32::new(0),
            next_listener_id: AtomicI32::new(0),
            encoder: Mutex::new(StaticEncoder::new()),
        }
    }

    fn next_id(counter: &AtomicI32) -> i32 {
        let id = counter.fetch_add(1, Ordering::Relaxed);
        if id < 0 {
            // Counter exhausted; stay negative forever
            counter.store(i32::MIN, Ordering::Relaxed);
            return -1;
        }
        id
    }

    fn decoder_entry(&self, id: i32) -> Option<Arc<DecoderEntry>> {
        self.decoders.read().get(&id).cloned()
    }

    fn reader_entry(&self, id: i32) -> Option<Arc<Reader>> {
        self.readers.read().get(&id).cloned()
    }

    fn listener_entry(&self, id: i32) -> Option<ListenerEntry> {
        self.listeners.read().get(&id).cloned()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LINKS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Link a decoder and a reader in both directions.
    ///
    /// A decoder notifies one reader and a reader drains one decoder, so any
    /// existing link of either is dropped first.
    pub fn connect(&self, decoder_id: i32, reader_id: i32) -> bool {
        let (Some(decoder), Some(reader)) = (self.decoder_entry(decoder_id), self.reader_entry(reader_id)) else {
            return false;
        };

        let mut links = self.links.lock();
        let stale: Vec<(i32, i32)> = links
            .iter()
            .copied()
            .filter(|&(d, r)| d == decoder_id || r == reader_id)
            .collect();
        for (d, r) in stale {
            self.unlink(&mut links, d, r);
        }

        reader.connect(&decoder.handle);
        links.push((decoder_id, reader_id));
        log::debug!("Connected decoder {} → reader {}", decoder_id, reader_id);
        true
    }

    pub fn disconnect(&self, decoder_id: i32, reader_id: i32) -> bool {
        let mut links = self.links.lock();
        self.unlink(&mut links, decoder_id, reader_id)
    }

    fn unlink(&self, links: &mut Vec<(i32, i32)>, decoder_id: i32, reader_id: i32) -> bool {
        let Some(pos) = links.iter().position(|&link| link == (decoder_id, reader_id)) else {
            return false;
        };
        links.remove(pos);

        if let (Some(decoder), Some(reader)) = (self.decoder_entry(decoder_id), self.reader_entry(reader_id)) {
            reader.disconnect(&decoder.handle);
        }
        log::debug!("Disconnected decoder {} → reader {}", decoder_id, reader_id);
        true
    }

    /// Stop all readers, clear all links and destroy every instance
    pub fn shutdown(&self) {
        let readers: Vec<Arc<Reader>> = self.readers.read().values().cloned().collect();
        for reader in &readers {
            reader.stop();
        }

        {
            let mut links = self.links.lock();
            let all: Vec<(i32, i32)> = links.clone();
            for (d, r) in all {
                self.unlink(&mut links, d, r);
            }
        }

        for reader in &readers {
            reader.clear_listeners();
        }
        self.readers.write().clear();
        self.decoders.write().clear();
        for entry in std::mem::take(&mut *self.listeners.write()).into_values() {
            if let Some(udp) = entry.as_udp() {
                udp.stop_udp();
            }
        }

        log::info!("Codec shut down");
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DECODERS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn decoder_create(&self) -> i32 {
        let id = Self::next_id(&self.next_decoder_id);
        if id < 0 {
            return -1;
        }
        let decoder = StereoDecoder::new();
        let handle = decoder.handle();
        self.decoders.write().insert(
            id,
            Arc::new(DecoderEntry {
                decoder: Mutex::new(decoder),
                handle,
            }),
        );
        id
    }

    pub fn decoder_destroy(&self, id: i32) -> bool {
        {
            let mut links = self.links.lock();
            let linked: Vec<(i32, i32)> = links.iter().copied().filter(|&(d, _)| d == id).collect();
            for (d, r) in linked {
                self.unlink(&mut links, d, r);
            }
        }
        self.decoders.write().remove(&id).is_some()
    }

    pub fn decoder_count(&self) -> i32 {
        self.decoders.read().len() as i32
    }

    /// Oldest live decoder, or `-1`
    pub fn decoder_main_id(&self) -> i32 {
        self.decoders.read().keys().next().copied().unwrap_or(-1)
    }

    /// Shared handle for direct use from Rust
    pub fn decoder(&self, id: i32) -> Option<DecoderHandle> {
        self.decoder_entry(id).map(|entry| entry.handle.clone())
    }

    pub fn decoder_reset(&self, id: i32, sample_rate: f64, buffer_size: usize) -> bool {
        match self.decoder_entry(id) {
            Some(entry) => {
                entry.decoder.lock().reset(sample_rate, buffer_size);
                true
            }
            None => false,
        }
    }

    /// Decode one audio block. Never blocks: returns `false` if the decoder
    /// is unknown or being driven by another thread.
    pub fn decoder_process_block(&self, id: i32, in0: &[f32], in1: &[f32], num_samples: usize) -> bool {
        let Some(entry) = self.decoder_entry(id) else {
            return false;
        };
        let Some(mut decoder) = entry.decoder.try_lock() else {
            return false;
        };
        decoder.process_block(in0, in1, num_samples);
        true
    }

    pub fn decoder_is_audio_strobe(&self, id: i32) -> bool {
        self.decoder(id).is_some_and(|d| d.is_audio_strobe())
    }

    pub fn decoder_get_brightness(&self, id: i32) -> f32 {
        self.decoder(id).map_or(-1.0, |d| d.brightness())
    }

    pub fn decoder_set_brightness(&self, id: i32, brightness: f32) -> bool {
        self.decoder(id).map(|d| d.set_brightness(brightness)).is_some()
    }

    pub fn decoder_get_level_r_0(&self, id: i32) -> f32 {
        self.decoder(id).map_or(-1.0, |d| d.level_r0())
    }

    pub fn decoder_get_level_g_0(&self, id: i32) -> f32 {
        self.decoder(id).map_or(-1.0, |d| d.level_g0())
    }

    pub fn decoder_get_level_b_0(&self, id: i32) -> f32 {
        self.decoder(id).map_or(-1.0, |d| d.level_b0())
    }

    pub fn decoder_get_level_r_1(&self, id: i32) -> f32 {
        self.decoder(id).map_or(-1.0, |d| d.level_r1())
    }

    pub fn decoder_get_level_g_1(&self, id: i32) -> f32 {
        self.decoder(id).map_or(-1.0, |d| d.level_g1())
    }

    pub fn decoder_get_level_b_1(&self, id: i32) -> f32 {
        self.decoder(id).map_or(-1.0, |d| d.level_b1())
    }

    /// Manual consumer access. Competes with an attached reader for samples.
    pub fn decoder_pop_color_sample(&self, id: i32) -> Option<StereoColorSample> {
        self.decoder(id)?.pop_color_sample()
    }

    /// Number of samples discarded, or `-1`
    pub fn decoder_clear_color_samples(&self, id: i32) -> i32 {
        self.decoder(id)
            .map_or(-1, |d| d.clear_color_samples().min(i32::MAX as usize) as i32)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // READERS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn reader_create(&self) -> i32 {
        let id = Self::next_id(&self.next_reader_id);
        if id < 0 {
            return -1;
        }
        self.readers.write().insert(id, Arc::new(Reader::default()));
        id
    }

    pub fn reader_destroy(&self, id: i32) -> bool {
        let Some(reader) = self.reader_entry(id) else {
            return false;
        };
        reader.stop();
        {
            let mut links = self.links.lock();
            let linked: Vec<(i32, i32)> = links.iter().copied().filter(|&(_, r)| r == id).collect();
            for (d, r) in linked {
                self.unlink(&mut links, d, r);
            }
        }
        reader.clear_listeners();
        self.readers.write().remove(&id).is_some()
    }

    pub fn reader_count(&self) -> i32 {
        self.readers.read().len() as i32
    }

    /// Oldest live reader, or `-1`
    pub fn reader_main_id(&self) -> i32 {
        self.readers.read().keys().next().copied().unwrap_or(-1)
    }

    /// Shared reader for direct use from Rust
    pub fn reader(&self, id: i32) -> Option<Arc<Reader>> {
        self.reader_entry(id)
    }

    pub fn reader_get_thread_mode(&self, id: i32) -> Option<ThreadMode> {
        self.reader_entry(id).map(|r| r.thread_mode())
    }

    pub fn reader_set_thread_mode(&self, id: i32, mode: ThreadMode) -> bool {
        self.reader_entry(id).map(|r| r.set_thread_mode(mode)).is_some()
    }

    pub fn reader_start(&self, id: i32) -> bool {
        let Some(reader) = self.reader_entry(id) else {
            return false;
        };
        match reader.start() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Reader {} failed to start: {}", id, e);
                false
            }
        }
    }

    pub fn reader_stop(&self, id: i32) -> bool {
        self.reader_entry(id).map(|r| r.stop()).is_some()
    }

    pub fn reader_is_running(&self, id: i32) -> bool {
        self.reader_entry(id).is_some_and(|r| r.is_running())
    }

    pub fn reader_add_listener(&self, reader_id: i32, listener_id: i32) -> bool {
        match (self.reader_entry(reader_id), self.listener_entry(listener_id)) {
            (Some(reader), Some(listener)) => reader.add_listener(listener.as_listener()),
            _ => false,
        }
    }

    pub fn reader_remove_listener(&self, reader_id: i32, listener_id: i32) -> bool {
        match (self.reader_entry(reader_id), self.listener_entry(listener_id)) {
            (Some(reader), Some(listener)) => reader.remove_listener(&listener.as_listener()),
            _ => false,
        }
    }

    pub fn reader_clear_listeners(&self, id: i32) -> bool {
        self.reader_entry(id).map(|r| r.clear_listeners()).is_some()
    }

    pub fn reader_pop_perf_info(&self, id: i32) -> Option<PerfSnapshot> {
        self.reader_entry(id)?.pop_perf_info()
    }

    pub fn reader_clear_perf_info(&self, id: i32) -> bool {
        self.reader_entry(id).map(|r| r.clear_perf_info()).is_some()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LISTENERS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn listener_create(&self, kind: ListenerKind) -> i32 {
        let entry = match kind {
            ListenerKind::UdpRelay => ListenerEntry::UdpRelay(Arc::new(UdpRelayListener::new())),
        };
        self.insert_listener(entry)
    }

    /// Register a caller-provided listener under a new ID
    pub fn listener_register(&self, listener: ListenerRef) -> i32 {
        self.insert_listener(ListenerEntry::Custom(listener))
    }

    fn insert_listener(&self, entry: ListenerEntry) -> i32 {
        let id = Self::next_id(&self.next_listener_id);
        if id < 0 {
            return -1;
        }
        self.listeners.write().insert(id, entry);
        id
    }

    /// Destroy a listener, removing it from every reader first
    pub fn listener_destroy(&self, id: i32) -> bool {
        let Some(entry) = self.listeners.write().remove(&id) else {
            return false;
        };
        let listener = entry.as_listener();
        for reader in self.readers.read().values() {
            reader.remove_listener(&listener);
        }
        if let Some(udp) = entry.as_udp() {
            udp.stop_udp();
        }
        true
    }

    pub fn listener_count(&self) -> i32 {
        self.listeners.read().len() as i32
    }

    pub fn listener(&self, id: i32) -> Option<ListenerRef> {
        self.listener_entry(id).map(|entry| entry.as_listener())
    }

    pub fn udp_listener(&self, id: i32) -> Option<Arc<UdpRelayListener>> {
        self.listener_entry(id)?.as_udp().cloned()
    }

    /// Open the UDP relay socket; `false` for unknown IDs, other listener
    /// kinds or bind failures
    pub fn listener_udp_config(&self, id: i32, config: UdpConfig) -> bool {
        let Some(udp) = self.udp_listener(id) else {
            return false;
        };
        match udp.start_udp(config) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("UDP listener {} config failed: {}", id, e);
                false
            }
        }
    }

    /// Relay to `127.0.0.1:port` over a shared socket
    pub fn listener_udp_loopback(&self, id: i32, port: u16) -> bool {
        self.listener_udp_config(id, UdpConfig::loopback(port))
    }

    pub fn listener_udp_get_num_packets_sent(&self, id: i32) -> i64 {
        self.udp_listener(id)
            .map_or(-1, |udp| udp.num_packets_sent().min(i64::MAX as u64) as i64)
    }

    pub fn listener_udp_reset_num_packets_sent(&self, id: i32) -> bool {
        self.udp_listener(id).map(|udp| udp.reset_num_packets_sent()).is_some()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATIC ENCODER
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn static_encoder_reset(&self, sample_rate: f64) {
        self.encoder.lock().reset(sample_rate);
    }

    pub fn static_encoder_set_stereo_color(&self, r0: f32, g0: f32, b0: f32, r1: f32, g1: f32, b1: f32) {
        self.encoder.lock().set_stereo_color(r0, g0, b0, r1, g1, b1);
    }

    pub fn static_encoder_process_block(&self, out0: &mut [f32], out1: &mut [f32], num_samples: usize, replace: bool) {
        self.encoder.lock().process_block(out0, out1, num_samples, replace);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // UTILITIES
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn deinterleave_audio(input: &[f32], out0: &mut [f32], out1: &mut [f32], samples_per_channel: usize) -> bool {
        deinterleave_stereo(input, out0, out1, samples_per_channel)
    }

    /// Decode a received relay datagram
    pub fn udp_stereo_color(data: &[u8]) -> StereoColorSample {
        StereoColorSample::from_bytes(data)
    }

    pub fn ipv4_from_str(address: &str) -> Option<u32> {
        ls_core::ipv4_from_str(address).ok()
    }

    pub fn ipv4_to_string(address: u32) -> String {
        ls_core::ipv4_to_string(address)
    }

    /// Number of local IPv4 interfaces; 0 if they cannot be listed
    pub fn num_network_interfaces() -> u32 {
        Self::network_interfaces().len() as u32
    }

    /// Interface name at `index`, as listed by [`Codec::num_network_interfaces`]
    pub fn network_interface_name(index: i32) -> Option<String> {
        Self::network_interface(index).map(|i| i.name)
    }

    /// Numeric IPv4 address at `index`, or 0
    pub fn network_interface_address(index: i32) -> u32 {
        Self::network_interface(index).map_or(0, |i| i.address)
    }

    fn network_interface(index: i32) -> Option<NetworkInterface> {
        let index = usize::try_from(index).ok()?;
        Self::network_interfaces().into_iter().nth(index)
    }

    fn network_interfaces() -> Vec<NetworkInterface> {
        ls_core::ipv4_interfaces().unwrap_or_else(|e| {
            log::debug!("Cannot list network interfaces: {}", e);
            Vec::new()
        })
    }
}

impl Drop for Codec {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_never_reused() {
        let codec = Codec::new();
        let a = codec.decoder_create();
        let b = codec.decoder_create();
        assert_eq!((a, b), (0, 1));
        assert_eq!(codec.decoder_main_id(), 0);

        assert!(codec.decoder_destroy(a));
        assert_eq!(codec.decoder_main_id(), 1);
        assert_eq!(codec.decoder_create(), 2);
        assert_eq!(codec.decoder_count(), 2);
    }

    #[test]
    fn test_unknown_ids_return_sentinels() {
        let codec = Codec::new();
        assert_eq!(codec.decoder_main_id(), -1);
        assert_eq!(codec.reader_main_id(), -1);
        assert_eq!(codec.decoder_get_brightness(7), -1.0);
        assert_eq!(codec.decoder_get_level_r_0(7), -1.0);
        assert_eq!(codec.decoder_get_level_b_1(7), -1.0);
        assert_eq!(codec.decoder_clear_color_samples(7), -1);
        assert!(codec.decoder_pop_color_sample(7).is_none());
        assert!(!codec.decoder_is_audio_strobe(7));
        assert!(!codec.decoder_set_brightness(7, 0.5));
        assert!(!codec.decoder_reset(7, 48_000.0, 256));
        assert!(!codec.decoder_process_block(7, &[0.0], &[0.0], 1));
        assert!(codec.reader_get_thread_mode(7).is_none());
        assert!(!codec.reader_start(7));
        assert!(!codec.reader_is_running(7));
        assert!(!codec.reader_add_listener(7, 7));
        assert!(codec.reader_pop_perf_info(7).is_none());
        assert_eq!(codec.listener_udp_get_num_packets_sent(7), -1);
        assert!(!codec.listener_udp_loopback(7, 8000));
        assert!(!codec.connect(7, 7));
        assert!(!codec.disconnect(7, 7));
        assert!(!codec.decoder_destroy(7));
        assert!(!codec.reader_destroy(7));
        assert!(!codec.listener_destroy(7));
    }

    #[test]
    fn test_connect_replaces_previous_link() {
        let codec = Codec::new();
        let d0 = codec.decoder_create();
        let d1 = codec.decoder_create();
        let r = codec.reader_create();

        assert!(codec.connect(d0, r));
        assert!(codec.decoder(d0).is_some_and(|d| d.has_reader()));

        assert!(codec.connect(d1, r));
        assert!(!codec.decoder(d0).is_some_and(|d| d.has_reader()));
        assert!(codec.decoder(d1).is_some_and(|d| d.has_reader()));
        assert!(!codec.disconnect(d0, r));
        assert!(codec.disconnect(d1, r));
        assert!(!codec.decoder(d1).is_some_and(|d| d.has_reader()));
    }

    #[test]
    fn test_destroy_clears_links() {
        let codec = Codec::new();
        let d = codec.decoder_create();
        let r = codec.reader_create();
        codec.connect(d, r);

        assert!(codec.reader_destroy(r));
        assert!(!codec.decoder(d).is_some_and(|h| h.has_reader()));
        assert_eq!(codec.reader_count(), 0);
    }

    #[test]
    fn test_decoder_levels_through_ids() {
        let codec = Codec::new();
        let d = codec.decoder_create();
        assert!(codec.decoder_reset(d, 48_000.0, 256));

        codec.static_encoder_set_stereo_color(1.0, 0.5, 0.25, 0.5, 0.25, 0.125);
        codec.static_encoder_reset(48_000.0);
        let mut left = vec![0.0f32; 256];
        let mut right = vec![0.0f32; 256];
        codec.static_encoder_process_block(&mut left, &mut right, 256, true);

        assert!(codec.decoder_process_block(d, &left, &right, 256));
        assert!((codec.decoder_get_level_g_0(d) - 0.5).abs() < 1e-3);
        assert!((codec.decoder_get_level_r_1(d) - 0.5).abs() < 1e-3);

        let sample = codec.decoder_pop_color_sample(d).expect("sample");
        assert_eq!(sample.timestamp, 256);
        assert_eq!(codec.decoder_clear_color_samples(d), 0);
    }

    #[test]
    fn test_udp_listener_kind_only() {
        let codec = Codec::new();
        let custom = codec.listener_register(crate::FnListener::shared(
            |_: &dyn crate::RunningProcess, _: &StereoColorSample| {},
        ));
        assert!(!codec.listener_udp_loopback(custom, 8000));
        assert_eq!(codec.listener_udp_get_num_packets_sent(custom), -1);

        let udp = codec.listener_create(ListenerKind::UdpRelay);
        assert_ne!(udp, custom);
        assert_eq!(codec.listener_udp_get_num_packets_sent(udp), 0);
        assert_eq!(codec.listener_count(), 2);
    }

    #[test]
    fn test_shutdown_destroys_everything() {
        let codec = Codec::new();
        let d = codec.decoder_create();
        let r = codec.reader_create();
        let l = codec.listener_create(ListenerKind::UdpRelay);
        codec.connect(d, r);
        codec.reader_add_listener(r, l);
        assert!(codec.reader_start(r));

        codec.shutdown();
        assert_eq!(codec.decoder_count(), 0);
        assert_eq!(codec.reader_count(), 0);
        assert_eq!(codec.listener_count(), 0);
        assert_eq!(codec.reader_create(), 1);
    }

    #[test]
    fn test_utilities() {
        assert_eq!(Codec::ipv4_from_str("127.0.0.1"), Some(0x7F00_0001));
        assert_eq!(Codec::ipv4_from_str("not an ip"), None);
        assert_eq!(Codec::ipv4_to_string(0xC0A8_0001), "192.168.0.1");

        let sample = StereoColorSample::new(9, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6);
        assert_eq!(Codec::udp_stereo_color(&sample.to_bytes()), sample);
        assert!(Codec::udp_stereo_color(&[0u8; 4]).is_empty());

        let mut l = [0.0; 2];
        let mut r = [0.0; 2];
        assert!(Codec::deinterleave_audio(&[1.0, 2.0, 3.0, 4.0], &mut l, &mut r, 2));
        assert_eq!((l, r), ([1.0, 3.0], [2.0, 4.0]));
    }

    #[cfg(unix)]
    #[test]
    fn test_network_interfaces_by_index() {
        let count = Codec::num_network_interfaces();
        assert!(count > 0);

        let loopback = (0..count as i32)
            .find(|&i| Codec::network_interface_address(i) == ls_core::LOOPBACK_ADDRESS)
            .expect("loopback interface");
        assert!(Codec::network_interface_name(loopback).is_some_and(|name| !name.is_empty()));

        assert_eq!(Codec::network_interface_address(-1), 0);
        assert_eq!(Codec::network_interface_name(count as i32 + 100), None);
    }
}
