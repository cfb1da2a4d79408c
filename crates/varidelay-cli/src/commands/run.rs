//! Run the engine against live audio and MIDI.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Args;
use varidelay_config::Settings;
use varidelay_core::{ParamSnapshot, ParameterStore, Session, control_queue};
use varidelay_io::{
    ControlPoller, ControlSink, CpalBackend, DEFAULT_POLL_INTERVAL, DeviceSelection,
    DuplexStream, MidiInput,
};

/// How often the main thread checks for Ctrl+C and parameter changes.
const WATCH_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Args)]
pub struct RunArgs {
    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<f32>,

    /// Frames per processing block
    #[arg(long)]
    block_size: Option<usize>,

    /// Capture channels (0 for output only)
    #[arg(long)]
    input_channels: Option<usize>,

    /// Playback channels
    #[arg(long)]
    output_channels: Option<usize>,

    /// Capture device name
    #[arg(long)]
    input_device: Option<String>,

    /// Playback device name
    #[arg(long)]
    output_device: Option<String>,

    /// MIDI input port name
    #[arg(long)]
    midi_port: Option<String>,

    /// Do not open a MIDI input
    #[arg(long)]
    no_midi: bool,

    /// Do not open audio streams; only apply MIDI control
    #[arg(long)]
    no_audio: bool,

    /// Startup delay, normalized to the maximum delay (0-1)
    #[arg(long)]
    delay: Option<f32>,

    /// Startup feedback (0-1)
    #[arg(long)]
    feedback: Option<f32>,

    /// Startup filter coefficient (0-1, 1 is no filtering)
    #[arg(long)]
    filter: Option<f32>,
}

impl RunArgs {
    fn apply(&self, settings: &mut Settings) {
        let audio = &mut settings.audio;
        if let Some(v) = self.sample_rate {
            audio.sample_rate = v;
        }
        if let Some(v) = self.block_size {
            audio.block_size = v;
        }
        if let Some(v) = self.input_channels {
            audio.input_channels = v;
        }
        if let Some(v) = self.output_channels {
            audio.output_channels = v;
        }
        if self.input_device.is_some() {
            audio.input_device.clone_from(&self.input_device);
        }
        if self.output_device.is_some() {
            audio.output_device.clone_from(&self.output_device);
        }

        if self.midi_port.is_some() {
            settings.midi.input_port.clone_from(&self.midi_port);
        }
        if self.no_midi {
            settings.midi.enabled = false;
        }

        if self.delay.is_some() {
            settings.delay.initial_delay = self.delay;
        }
        if let Some(v) = self.feedback {
            settings.delay.initial_feedback = v;
        }
        if let Some(v) = self.filter {
            settings.delay.initial_filter = v;
        }
    }
}

pub fn run(args: RunArgs, mut settings: Settings) -> anyhow::Result<()> {
    args.apply(&mut settings);
    settings.validate()?;

    let descriptor = settings.to_descriptor()?;
    let session = Session::with_params(descriptor, settings.initial_params())?;
    let params = session.params();
    let (sender, receiver) = control_queue(settings.midi.queue_size);

    let midi = if settings.midi.enabled {
        let sink = ControlSink::new(sender, settings.cc_map());
        match MidiInput::connect(settings.midi.input_port.as_deref(), sink) {
            Ok(input) => Some(input),
            Err(e) => {
                tracing::warn!("continuing without MIDI control: {e}");
                None
            }
        }
    } else {
        None
    };

    let running = super::interrupt_flag()?;

    println!(
        "varidelay: {} Hz, block {}, {:.2} s max delay, {} filter stage(s)",
        descriptor.sample_rate,
        descriptor.block_size,
        descriptor.max_delay_seconds,
        descriptor.filter_stages
    );
    if let Some(input) = &midi {
        println!("  MIDI:   {}", input.port_name());
    }

    if args.no_audio {
        let poller = ControlPoller::spawn(receiver, Arc::clone(&params), DEFAULT_POLL_INTERVAL)?;
        println!("  Audio:  disabled");
        println!("\nPress Ctrl+C to stop...\n");

        watch(&running, &params, || {});

        if let Some(input) = midi {
            input.close();
        }
        poller.stop();
    } else {
        let backend = CpalBackend::new();
        let devices = DeviceSelection {
            input: settings.audio.input_device.clone(),
            output: settings.audio.output_device.clone(),
        };
        let stream = DuplexStream::start(
            &backend,
            &descriptor,
            &devices,
            session.into_dispatcher(Some(receiver)),
        )?;
        println!(
            "  Audio:  {} in / {} out",
            descriptor.input_channels, descriptor.output_channels
        );
        println!("\nPress Ctrl+C to stop...\n");

        let mut reported = 0;
        watch(&running, &params, || {
            let errors = stream.error_count();
            if errors > reported {
                tracing::warn!(errors, xruns = stream.xrun_count(), "audio stream trouble");
                reported = errors;
            }
        });

        if let Some(input) = midi {
            input.close();
        }
        stream.stop();
    }

    println!("Done!");
    Ok(())
}

/// Block until Ctrl+C, logging parameter changes as they happen.
fn watch(running: &AtomicBool, params: &ParameterStore, mut tick: impl FnMut()) {
    let mut last = params.snapshot();
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(WATCH_INTERVAL);
        let now = params.snapshot();
        if now != last {
            log_params(&now);
            last = now;
        }
        tick();
    }
}

fn log_params(p: &ParamSnapshot) {
    tracing::info!(
        delay = p.delay,
        feedback = p.feedback,
        filter = p.coefficient,
        "parameters"
    );
}
