//! MIDI monitor command.

use std::sync::atomic::Ordering;
use std::time::Duration;

use clap::Args;
use crossbeam_channel::RecvTimeoutError;
use varidelay_config::Settings;
use varidelay_io::{MidiInput, MidiMonitor, MonitorEvent};

#[derive(Args)]
pub struct MonitorArgs {
    /// MIDI input port name (default: from settings, else the first port)
    #[arg(long)]
    midi_port: Option<String>,
}

pub fn run(args: MonitorArgs, settings: &Settings) -> anyhow::Result<()> {
    let port = args.midi_port.or_else(|| settings.midi.input_port.clone());
    let (monitor, events) = MidiMonitor::new();
    let input = MidiInput::connect(port.as_deref(), monitor)?;
    let running = super::interrupt_flag()?;

    println!("Monitoring {}", input.port_name());
    println!("\nPress Ctrl+C to stop...\n");

    let map = settings.cc_map();
    while running.load(Ordering::SeqCst) {
        match events.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let line = format_event(&event);
                match event.message.as_ref().and_then(|m| map.map(m)) {
                    Some(control) => {
                        tracing::info!("{line}  -> {} {:.3}", control.target, control.value);
                    }
                    None => tracing::info!("{line}"),
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    input.close();
    Ok(())
}

/// One monitor line: driver timestamp in milliseconds, then the decoded
/// message or the raw bytes.
fn format_event(event: &MonitorEvent) -> String {
    let ms = event.timestamp_us as f64 / 1000.0;
    match &event.message {
        Some(msg) => format!("{ms:>12.3} ms  {msg}"),
        None => {
            let hex: Vec<String> = event.bytes.iter().map(|b| format!("{b:02X}")).collect();
            format!("{ms:>12.3} ms  unknown    [{}]", hex.join(" "))
        }
    }
}
