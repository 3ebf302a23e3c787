//! Lumasonic demo reader
//!
//! Encodes a static stereo color, feeds it through a decoder from a
//! simulated audio thread and reads the decoded samples back on a reader
//! thread, optionally relaying them over UDP. Ctrl-C stops the reader and
//! shuts down cleanly.
//!
//! Usage:
//!   lumasonic-reader                                 - 512 samples, sleep mode
//!   lumasonic-reader --thread-mode efficient --debug - event mode with perf output
//!   lumasonic-reader --udp-port 8000                 - relay to 127.0.0.1:8000
//!   lumasonic-reader --settings reader.json          - load settings from JSON

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

use ls_core::{PerfSnapshot, StereoColorSample, ThreadMode, UdpConfig};
use ls_engine::{Codec, FnListener, ListenerKind, ReaderSettings, RunningProcess};

#[derive(Parser)]
#[command(name = "lumasonic-reader", about = "Lumasonic encode → decode → read demo")]
struct Cli {
    /// Reader wait strategy: safe|efficient|performance (or sleep|event|loop)
    #[arg(short = 'm', long)]
    thread_mode: Option<ThreadMode>,

    /// Print reader timing snapshots
    #[arg(short, long)]
    debug: bool,

    /// JSON settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Stop after this many dispatched samples
    #[arg(short = 'n', long, default_value_t = 512)]
    samples: u64,

    /// Relay samples to 127.0.0.1:PORT
    #[arg(short, long)]
    udp_port: Option<u16>,

    /// Encoded color as r0,g0,b0,r1,g1,b1
    #[arg(short, long, value_parser = parse_color, default_value = "1.0,0.5,0.25,0.5,0.25,0.125")]
    color: [f32; 6],
}

fn parse_color(s: &str) -> Result<[f32; 6], String> {
    let values: Vec<f32> = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<_, _>>()?;

    values
        .try_into()
        .map_err(|v: Vec<f32>| format!("expected 6 comma-separated values, got {}", v.len()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => ReaderSettings::load_from(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => ReaderSettings::default(),
    };
    if let Some(mode) = cli.thread_mode {
        settings.thread_mode = mode;
    }
    if let Some(port) = cli.udp_port {
        settings.udp = Some(UdpConfig::loopback(port));
    }

    run(&cli, &settings)
}

fn run(cli: &Cli, settings: &ReaderSettings) -> Result<()> {
    let codec = Arc::new(Codec::new());

    let decoder = codec.decoder_create();
    let reader = codec.reader_create();
    if decoder < 0 || reader < 0 {
        bail!("failed to create decoder/reader");
    }

    codec.decoder_reset(decoder, settings.sample_rate, settings.buffer_size);
    codec.decoder_set_brightness(decoder, settings.brightness);
    codec.reader_set_thread_mode(reader, settings.thread_mode);
    codec.connect(decoder, reader);

    let udp = match settings.udp {
        Some(config) => {
            let id = codec.listener_create(ListenerKind::UdpRelay);
            if !codec.listener_udp_config(id, config) {
                bail!(
                    "failed to open UDP relay to {}:{}",
                    Codec::ipv4_to_string(config.remote_address),
                    config.remote_port
                );
            }
            codec.reader_add_listener(reader, id);
            Some(id)
        }
        None => None,
    };

    let target = cli.samples.max(1);
    let count = Arc::new(AtomicU64::new(0));
    let printer = {
        let count = count.clone();
        FnListener::shared(move |process: &dyn RunningProcess, sample: &StereoColorSample| {
            let n = count.fetch_add(1, Ordering::Relaxed) + 1;
            if n == 1 || n % 100 == 0 || n == target {
                println!(
                    "#{n:<6} ts {:>9}  L ({:.3} {:.3} {:.3})  R ({:.3} {:.3} {:.3})",
                    sample.timestamp, sample.r0, sample.g0, sample.b0, sample.r1, sample.g1, sample.b1
                );
            }
            if n >= target {
                process.signal_should_exit();
            }
        })
    };
    let printer = codec.listener_register(printer);
    codec.reader_add_listener(reader, printer);

    let [r0, g0, b0, r1, g1, b1] = cli.color;
    codec.static_encoder_set_stereo_color(r0, g0, b0, r1, g1, b1);
    codec.static_encoder_reset(settings.sample_rate);

    log::info!(
        "Reading {} samples: {} Hz, buffer {}, {} mode",
        target,
        settings.sample_rate,
        settings.buffer_size,
        settings.thread_mode
    );

    if !codec.reader_start(reader) {
        bail!("failed to start reader");
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || interrupted.store(true, Ordering::Relaxed))
            .context("installing Ctrl-C handler")?;
    }

    let stop_audio = Arc::new(AtomicBool::new(false));
    let audio = spawn_audio_thread(codec.clone(), decoder, settings, stop_audio.clone())?;

    if !wait_for_reader(&codec, reader, &interrupted, cli.debug.then_some(settings)) {
        log::info!("Interrupted, shutting down");
    }

    stop_audio.store(true, Ordering::Relaxed);
    if audio.join().is_err() {
        log::warn!("Audio thread panicked");
    }
    codec.reader_stop(reader);

    println!("Dispatched {} samples", count.load(Ordering::Relaxed));
    if let Some(handle) = codec.decoder(decoder) {
        println!("Dropped {} samples", handle.dropped_samples());
    }
    if let Some(id) = udp {
        println!("Sent {} UDP packets", codec.listener_udp_get_num_packets_sent(id));
    }

    codec.shutdown();
    Ok(())
}

/// Poll until the reader exits on its own or `interrupted` is set.
///
/// Prints perf snapshots when `perf` is given. Returns `false` if interrupted.
fn wait_for_reader(codec: &Codec, reader: i32, interrupted: &AtomicBool, perf: Option<&ReaderSettings>) -> bool {
    while codec.reader_is_running(reader) {
        if interrupted.load(Ordering::Relaxed) {
            return false;
        }
        thread::sleep(Duration::from_millis(50));
        if let Some(settings) = perf {
            while let Some(info) = codec.reader_pop_perf_info(reader) {
                print_perf(&info, settings);
            }
        }
    }
    true
}

/// Encode and decode one buffer per buffer period, like an audio callback
fn spawn_audio_thread(
    codec: Arc<Codec>,
    decoder: i32,
    settings: &ReaderSettings,
    stop: Arc<AtomicBool>,
) -> Result<thread::JoinHandle<()>> {
    let buffer_size = settings.buffer_size;
    let period = Duration::from_secs_f64(buffer_size as f64 / settings.sample_rate);

    thread::Builder::new()
        .name("ls-audio".into())
        .spawn(move || {
            let mut left = vec![0.0f32; buffer_size];
            let mut right = vec![0.0f32; buffer_size];

            while !stop.load(Ordering::Relaxed) {
                codec.static_encoder_process_block(&mut left, &mut right, buffer_size, true);
                codec.decoder_process_block(decoder, &left, &right, buffer_size);
                thread::sleep(period);
            }
        })
        .context("spawning audio thread")
}

fn print_perf(info: &PerfSnapshot, settings: &ReaderSettings) {
    let expected = PerfSnapshot::expected_frame_time_ms(settings.sample_rate, settings.buffer_size);
    println!(
        "[perf] thread {:.3}/{:.3}/{:.3} ms (total {:.3}-{:.3})",
        info.thread_current_min_ms,
        info.thread_average_ms,
        info.thread_current_max_ms,
        info.thread_total_min_ms,
        info.thread_total_max_ms
    );
    if info.has_data {
        println!(
            "[perf] data   {:.3}/{:.3}/{:.3} ms (total {:.3}-{:.3}), expected {:.3} ms, jitter {:.3} ms",
            info.data_current_min_ms,
            info.data_average_ms,
            info.data_current_max_ms,
            info.data_total_min_ms,
            info.data_total_max_ms,
            expected,
            info.data_jitter_ms()
        );
    }
}
