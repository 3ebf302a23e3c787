//! Audio thread → consumer thread handoff tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use approx::assert_abs_diff_eq;
use ls_audio::{SampleChannel, StereoDecoder};
use ls_core::{LightSoundCodec, StereoColorSample};
use ls_dsp::StaticEncoder;

#[test]
fn test_encode_decode_roundtrip_across_callbacks() {
    let mut encoder = StaticEncoder::new();
    encoder.set_stereo_color(0.9, 0.1, 0.7, 0.3, 0.6, 0.05);
    encoder.reset(48_000.0);

    let mut decoder = StereoDecoder::new();
    decoder.reset(48_000.0, 256);
    let handle = decoder.handle();

    // Audio callbacks of 128 samples: two callbacks per filter block
    let mut left = vec![0.0f32; 128];
    let mut right = vec![0.0f32; 128];
    for _ in 0..8 {
        encoder.process_block(&mut left, &mut right, 128, true);
        decoder.process_block(&left, &right, 128);
    }

    let samples: Vec<StereoColorSample> = std::iter::from_fn(|| handle.pop_color_sample()).collect();
    assert_eq!(samples.len(), 4);

    for (i, sample) in samples.iter().enumerate() {
        assert_eq!(sample.timestamp, 256 * (i as u64 + 1));
        let expected = [0.9, 0.1, 0.7, 0.3, 0.6, 0.05];
        for (got, want) in sample.levels().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-3);
        }
    }
    assert_eq!(handle.codec(), LightSoundCodec::Lumasonic);
}

#[test]
fn test_spsc_order_two_threads() {
    const COUNT: u64 = 100_000;
    let channel = Arc::new(SampleChannel::new(256));

    let producer = {
        let channel = Arc::clone(&channel);
        thread::spawn(move || {
            let mut ts = 1;
            while ts <= COUNT {
                if channel.push(StereoColorSample::from_levels(ts, [ts as f32; 6])) {
                    ts += 1;
                } else {
                    thread::yield_now();
                }
            }
        })
    };

    let mut expected = 1;
    while expected <= COUNT {
        match channel.pop() {
            Some(sample) => {
                assert_eq!(sample.timestamp, expected);
                assert_eq!(sample.r0, expected as f32);
                expected += 1;
            }
            None => thread::yield_now(),
        }
    }

    producer.join().expect("producer thread");
    assert!(channel.is_empty());
}

#[test]
fn test_handle_consumes_on_other_thread() {
    let mut decoder = StereoDecoder::new();
    decoder.reset(48_000.0, 64);
    let handle = decoder.handle();

    let consumer = thread::spawn(move || {
        let mut timestamps = Vec::new();
        while timestamps.len() < 10 {
            match handle.pop_color_sample() {
                Some(sample) => timestamps.push(sample.timestamp),
                None => thread::yield_now(),
            }
        }
        timestamps
    });

    let silence = [0.0f32; 64];
    for _ in 0..10 {
        decoder.process_block(&silence, &silence, 64);
    }

    let timestamps = consumer.join().expect("consumer thread");
    let expected: Vec<u64> = (1..=10).map(|i| i * 64).collect();
    assert_eq!(timestamps, expected);
}

#[test]
fn test_two_handles_never_receive_the_same_sample() {
    const BLOCKS: u64 = 5_000;

    let mut decoder = StereoDecoder::new();
    decoder.reset(48_000.0, 64);
    let done = Arc::new(AtomicBool::new(false));

    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let handle = decoder.handle();
            let done = done.clone();
            thread::spawn(move || {
                let mut timestamps = Vec::new();
                loop {
                    match handle.pop_color_sample() {
                        Some(sample) => timestamps.push(sample.timestamp),
                        None if done.load(Ordering::Acquire) => break,
                        None => thread::yield_now(),
                    }
                }
                timestamps
            })
        })
        .collect();

    let silence = [0.0f32; 64];
    for _ in 0..BLOCKS {
        decoder.process_block(&silence, &silence, 64);
    }
    done.store(true, Ordering::Release);

    let mut all = Vec::new();
    for consumer in consumers {
        let timestamps = consumer.join().expect("consumer thread");
        assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
        all.extend(timestamps);
    }
    let handle = decoder.handle();
    all.extend(std::iter::from_fn(|| handle.pop_color_sample()).map(|s| s.timestamp));

    let total = all.len() as u64;
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len() as u64, total);
    assert_eq!(total + handle.dropped_samples(), BLOCKS);
}
