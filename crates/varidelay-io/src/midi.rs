//! MIDI input via midir.
//!
//! midir delivers each incoming message on its own callback thread. The
//! handlers here never touch the audio thread directly:
//!
//! - [`ControlSink`] maps Control Change messages through a [`CcMap`] and
//!   pushes the result into the lock-free control queue
//! - [`MidiMonitor`] decodes every message and forwards it over a crossbeam
//!   channel to whoever prints it

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use midir::{Ignore, MidiInputConnection};
use varidelay_core::{CcMap, ControlSender, MidiMessage};

use crate::{Error, Result};

const CLIENT_NAME: &str = "varidelay";

/// Receives raw MIDI messages on the midir callback thread.
pub trait MidiHandler: Send + 'static {
    /// Handle one complete message. `timestamp_us` is the driver timestamp.
    fn on_message(&mut self, timestamp_us: u64, bytes: &[u8]);

    /// Whether clock, active sensing and SysEx should be filtered out by the
    /// driver before reaching [`on_message`](Self::on_message).
    fn ignores_system(&self) -> bool {
        true
    }
}

/// Names of the available MIDI input ports.
pub fn list_midi_ports() -> Result<Vec<String>> {
    let input = midir::MidiInput::new(CLIENT_NAME).map_err(|e| Error::MidiInit(e.to_string()))?;
    Ok(input
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| {
            input
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown port {i}"))
        })
        .collect())
}

/// An open MIDI input connection.
///
/// The connection stays open until [`close`](Self::close) or drop.
pub struct MidiInput {
    connection: Option<MidiInputConnection<()>>,
    port_name: String,
}

impl MidiInput {
    /// Open `port_name`, or the first port if it is `None` or not found.
    pub fn connect<H: MidiHandler>(port_name: Option<&str>, mut handler: H) -> Result<Self> {
        let mut input =
            midir::MidiInput::new(CLIENT_NAME).map_err(|e| Error::MidiInit(e.to_string()))?;
        input.ignore(if handler.ignores_system() {
            Ignore::All
        } else {
            Ignore::None
        });

        let ports = input.ports();
        let named = port_name.and_then(|wanted| {
            let found = ports
                .iter()
                .find(|p| input.port_name(p).is_ok_and(|n| n == wanted));
            if found.is_none() {
                tracing::warn!(port = wanted, "MIDI port not found, using first port");
            }
            found
        });
        let port = named.or_else(|| ports.first()).ok_or(Error::NoMidiPort)?;
        let name = input
            .port_name(port)
            .unwrap_or_else(|_| "unknown".to_string());

        let connection = input
            .connect(
                port,
                "varidelay-input",
                move |stamp, message, _| handler.on_message(stamp, message),
                (),
            )
            .map_err(|e| Error::MidiConnect(e.to_string()))?;

        tracing::info!(port = %name, "MIDI input connected");
        Ok(Self {
            connection: Some(connection),
            port_name: name,
        })
    }

    /// Name of the connected port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Close the connection. No handler call happens after this returns.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            tracing::info!(port = %self.port_name, "MIDI input closed");
        }
    }
}

impl Drop for MidiInput {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for MidiInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiInput")
            .field("port_name", &self.port_name)
            .field("open", &self.connection.is_some())
            .finish()
    }
}

/// Maps Control Change messages to control messages and queues them.
#[derive(Debug)]
pub struct ControlSink {
    sender: ControlSender,
    map: CcMap,
    dropped: Arc<AtomicUsize>,
}

impl ControlSink {
    /// Queue mapped messages into `sender`.
    pub fn new(sender: ControlSender, map: CcMap) -> Self {
        Self {
            sender,
            map,
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter of messages dropped because the queue was full.
    pub fn dropped_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.dropped)
    }
}

impl MidiHandler for ControlSink {
    fn on_message(&mut self, _timestamp_us: u64, bytes: &[u8]) {
        let Some(msg) = self.map.map_bytes(bytes) else {
            return;
        };
        if self.sender.send(msg) {
            tracing::trace!(target_param = %msg.target, value = msg.value, "control queued");
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(target_param = %msg.target, "control queue full, message dropped");
        }
    }
}

/// A decoded message as seen by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorEvent {
    /// Driver timestamp in microseconds.
    pub timestamp_us: u64,
    /// Raw bytes.
    pub bytes: Vec<u8>,
    /// Decoded message, `None` if the bytes were not a valid message.
    pub message: Option<MidiMessage>,
}

/// Forwards every incoming message, system messages included.
#[derive(Debug)]
pub struct MidiMonitor {
    tx: Sender<MonitorEvent>,
}

impl MidiMonitor {
    /// Create a monitor and the receiving end of its channel.
    pub fn new() -> (Self, Receiver<MonitorEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl MidiHandler for MidiMonitor {
    fn on_message(&mut self, timestamp_us: u64, bytes: &[u8]) {
        let event = MonitorEvent {
            timestamp_us,
            bytes: bytes.to_vec(),
            message: MidiMessage::parse(bytes),
        };
        // Receiver gone means the monitor is shutting down.
        let _ = self.tx.send(event);
    }

    fn ignores_system(&self) -> bool {
        false
    }
}
