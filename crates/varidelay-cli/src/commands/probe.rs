//! Offline impulse probe.
//!
//! Builds a session, feeds it a unit impulse followed by silence and reports
//! where the echo came out. No audio or MIDI hardware is touched.

use clap::Args;
use varidelay_core::{ParamSnapshot, Session, SessionDescriptor};

/// Samples quieter than this do not count as an echo.
const SILENCE: f32 = 1e-6;

#[derive(Args)]
pub struct ProbeArgs {
    /// Delay, normalized to the maximum delay (0-1)
    #[arg(long, default_value_t = 0.5)]
    delay: f32,

    /// Feedback (0-1)
    #[arg(long, default_value_t = 0.0)]
    feedback: f32,

    /// Filter coefficient (0-1, 1 is no filtering)
    #[arg(long, default_value_t = 1.0)]
    filter: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 48000.0)]
    sample_rate: f32,

    /// Frames per processing block
    #[arg(long, default_value_t = 128)]
    block_size: usize,

    /// Maximum delay in seconds
    #[arg(long, default_value_t = 2.0)]
    max_delay: f32,

    /// Samples to render (default: one line capacity)
    #[arg(long)]
    samples: Option<usize>,
}

/// Where the impulse came back.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Echo {
    index: usize,
    peak: f32,
}

pub fn run(args: ProbeArgs) -> anyhow::Result<()> {
    let descriptor = SessionDescriptor {
        sample_rate: args.sample_rate,
        block_size: args.block_size,
        input_channels: 1,
        output_channels: 1,
        max_delay_seconds: args.max_delay,
        ..SessionDescriptor::default()
    };
    let initial = ParamSnapshot {
        delay: args.delay,
        feedback: args.feedback,
        coefficient: args.filter,
    };
    let session = Session::with_params(descriptor, initial)?;
    let capacity = descriptor.capacity();
    let total = args.samples.unwrap_or(capacity);

    let output = render_impulse(session, total);

    println!(
        "capacity {capacity} samples, block {}, delay {:.4}, feedback {:.4}, filter {:.4}",
        descriptor.block_size, args.delay, args.feedback, args.filter
    );
    match first_echo(&output) {
        Some(echo) => {
            println!(
                "echo at sample {} ({:.6} s)",
                echo.index,
                echo.index as f64 / f64::from(descriptor.sample_rate)
            );
            println!("peak {:.6}", echo.peak);
        }
        None => println!("no echo within {total} samples"),
    }
    Ok(())
}

fn render_impulse(session: Session, total: usize) -> Vec<f32> {
    let block = session.descriptor().block_size;
    let mut dispatcher = session.into_dispatcher(None);

    let mut input = vec![0.0f32; total];
    if let Some(first) = input.first_mut() {
        *first = 1.0;
    }
    let mut output = vec![0.0f32; total];
    for (x, y) in input.chunks(block).zip(output.chunks_mut(block)) {
        dispatcher.process_block(x, y);
    }
    output
}

/// Loudest sample of the first echo: the first audible run of output, up to
/// where it falls silent again.
fn first_echo(output: &[f32]) -> Option<Echo> {
    let start = output.iter().position(|y| y.abs() > SILENCE)?;
    let run = output[start..]
        .iter()
        .position(|y| y.abs() <= SILENCE)
        .unwrap_or(output.len() - start);
    output[start..start + run]
        .iter()
        .enumerate()
        .fold(None, |best: Option<Echo>, (i, &y)| match best {
            Some(b) if b.peak.abs() >= y.abs() => Some(b),
            _ => Some(Echo {
                index: start + i,
                peak: y,
            }),
        })
}
