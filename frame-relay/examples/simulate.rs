// SPDX-FileCopyrightText: 2025 Contributors to the Frame Relay project.
// SPDX-License-Identifier: Apache-2.0

//! Simulates a decoder feeding an encoder through a [`FrameRelay`].
//!
//! A decoder thread renders frames at a fixed interval and an encoder thread
//! takes a fixed time to process each one. Every [`RelayEvent`] is printed to
//! stdout as one JSON object per line, followed by the final relay snapshot.
//!
//! Stall the decoder to watch the watchdog force the stream to end:
//!
//! ```text
//! cargo run --example simulate -- --frames 10 --stall-after 6 --timeout-ms 200
//! ```

mod common;

use std::{collections::VecDeque, sync::Arc, time::Duration};

use clap::Parser;
use crossbeam_channel::{Receiver, Sender};
use frame_relay::{
    ArrivalNotifier, BoxError, ConsumerLink, FrameConsumer, FrameInfo, FrameProducer, FrameRelay,
    InputTexture, RelayEvent, TransformMatrix, config::RelayConfig,
};
use parking_lot::Mutex;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Relay simulated decoder output to a simulated encoder")]
struct Args {
    /// Number of frames to register
    #[arg(short = 'n', long, default_value = "30")]
    frames: u32,

    /// Frame width
    #[arg(long, default_value = "1920")]
    width: u32,

    /// Frame height
    #[arg(long, default_value = "1080")]
    height: u32,

    /// Offset added to every presentation time, in microseconds
    #[arg(long, default_value = "0")]
    offset_us: i64,

    /// Time between decoded frames, in milliseconds
    #[arg(long, default_value = "10")]
    interval_ms: u64,

    /// Time the encoder spends on each frame, in milliseconds
    #[arg(long, default_value = "5")]
    process_ms: u64,

    /// Stop decoding after this many frames
    #[arg(long)]
    stall_after: Option<u32>,

    /// Watchdog timeout, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Use the longer watchdog timeout suited to software decoders
    #[arg(long)]
    emulator: bool,
}

/// Frame rate the decoder timestamps frames at.
const FRAME_DURATION_NS: i64 = 33_333_333;

#[derive(Default)]
struct DecoderState {
    notifier: Option<ArrivalNotifier>,
    backlog: VecDeque<i64>,
}

#[derive(Clone, Default)]
struct SimDecoder {
    state: Arc<Mutex<DecoderState>>,
}

impl SimDecoder {
    fn render(&self, timestamp_ns: i64) -> bool {
        let notifier = {
            let mut state = self.state.lock();
            state.backlog.push_back(timestamp_ns);
            state.notifier.clone()
        };
        notifier.is_some_and(|n| n.notify_frame_available().is_ok())
    }
}

impl FrameProducer for SimDecoder {
    fn create_surface(&mut self, notifier: ArrivalNotifier) -> Result<u32, BoxError> {
        self.state.lock().notifier = Some(notifier);
        Ok(1)
    }

    fn set_default_buffer_size(&mut self, _width: u32, _height: u32) {}

    fn claim_frame(&mut self) -> i64 {
        self.state.lock().backlog.pop_front().unwrap_or_default()
    }

    fn transform_matrix(&self) -> TransformMatrix {
        TransformMatrix::IDENTITY
    }

    fn release(&mut self) {
        self.state.lock().notifier = None;
    }
}

/// Hands queued frames to the encoder thread.
struct SimEncoder {
    frames: Sender<InputTexture>,
}

impl FrameConsumer for SimEncoder {
    fn queue_input_frame(&mut self, texture: InputTexture, _presentation_time_us: i64) {
        let _ = self.frames.send(texture);
    }

    fn signal_end_of_current_input_stream(&mut self) {
        info!("Encoder reached end of stream");
    }
}

fn run_encoder(frames: Receiver<InputTexture>, link: ConsumerLink, process: Duration) {
    if link.on_ready_to_accept_input_frame().is_err() {
        return;
    }
    for texture in frames {
        std::thread::sleep(process);
        if link.on_input_frame_processed(texture).is_err()
            || link.on_ready_to_accept_input_frame().is_err()
        {
            break;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::setup_logging();
    let args = Args::parse();

    let mut config = if args.emulator {
        RelayConfig::for_emulator()
    } else {
        RelayConfig::default()
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_watchdog_timeout(Duration::from_millis(timeout_ms));
    }

    let decoder = SimDecoder::default();
    let (frames_tx, frames_rx) = crossbeam_channel::unbounded();
    let (events_tx, events_rx) = crossbeam_channel::unbounded();
    let relay = FrameRelay::with_event_callback(
        config,
        decoder.clone(),
        SimEncoder { frames: frames_tx },
        Arc::new(move |event| {
            let _ = events_tx.send(event);
        }),
    )?;
    info!(id = %relay.config().id, "Relay started");

    let link = relay.consumer_link();
    let process = Duration::from_millis(args.process_ms);
    let encoder = std::thread::spawn(move || run_encoder(frames_rx, link, process));

    let info = FrameInfo::new(args.width, args.height).with_offset_to_add_us(args.offset_us);
    for _ in 0..args.frames {
        relay.register_input_frame(info)?;
    }
    relay.signal_end_of_current_input_stream()?;

    let rendered = args.stall_after.unwrap_or(args.frames).min(args.frames);
    let interval = Duration::from_millis(args.interval_ms);
    let decoder_thread = std::thread::spawn(move || {
        for i in 0..rendered {
            std::thread::sleep(interval);
            if !decoder.render(i64::from(i) * FRAME_DURATION_NS) {
                break;
            }
        }
    });

    let deadline = relay.config().watchdog_timeout() * 2
        + interval * args.frames
        + process * args.frames;
    loop {
        match events_rx.recv_timeout(deadline) {
            Ok(event) => {
                println!("{}", serde_json::to_string(&event)?);
                if event == RelayEvent::EndOfStream {
                    break;
                }
            }
            Err(_) => {
                warn!("No end of stream within {:?}", deadline);
                break;
            }
        }
    }

    if decoder_thread.join().is_err() {
        warn!("Decoder thread panicked");
    }
    println!("{}", serde_json::to_string(&relay.snapshot()?)?);
    relay.release()?;
    if encoder.join().is_err() {
        warn!("Encoder thread panicked");
    }
    Ok(())
}
