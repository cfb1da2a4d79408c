//! Audio device and MIDI port listing.

use varidelay_io::{AudioBackend, CpalBackend, list_midi_ports};

pub fn run() -> anyhow::Result<()> {
    let backend = CpalBackend::new();
    let devices = backend.list_devices()?;

    println!("Audio Devices ({})", backend.name());
    println!("=============\n");

    if devices.is_empty() {
        println!("No audio devices found.\n");
    } else {
        let inputs: Vec<_> = devices.iter().filter(|d| d.is_input).collect();
        if !inputs.is_empty() {
            println!("Input Devices:");
            for device in &inputs {
                println!("  {} ({} Hz)", device.name, device.default_sample_rate);
            }
            println!();
        }

        let outputs: Vec<_> = devices.iter().filter(|d| d.is_output).collect();
        if !outputs.is_empty() {
            println!("Output Devices:");
            for device in &outputs {
                println!("  {} ({} Hz)", device.name, device.default_sample_rate);
            }
            println!();
        }
    }

    println!("MIDI Input Ports");
    println!("================\n");
    match list_midi_ports() {
        Ok(ports) if ports.is_empty() => println!("No MIDI input ports found."),
        Ok(ports) => {
            for port in &ports {
                println!("  {port}");
            }
        }
        Err(e) => println!("MIDI unavailable: {e}"),
    }

    println!();
    println!("Tip: pass exact names to `varidelay run`:");
    println!("  varidelay run --input-device \"USB Audio\" --midi-port \"Launch Control\"");
    Ok(())
}
