//! Audio and MIDI I/O for the varidelay engine.
//!
//! This crate connects a [`varidelay_core::CallbackDispatcher`] to the outside
//! world:
//!
//! - **Audio**: [`DuplexStream`] opens input and output streams through an
//!   [`AudioBackend`] (cpal by default) and runs the dispatcher in the output
//!   callback
//! - **MIDI**: [`MidiInput`] opens a port with midir; [`ControlSink`] turns
//!   incoming Control Change messages into queued control messages
//! - **Control-only mode**: [`ControlPoller`] applies queued control messages
//!   on a timer when no audio stream is running
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use varidelay_core::{control_queue, CcMap, Session, SessionDescriptor};
//! use varidelay_io::{ControlSink, CpalBackend, DeviceSelection, DuplexStream, MidiInput};
//!
//! let session = Session::new(SessionDescriptor::default())?;
//! let descriptor = *session.descriptor();
//! let (sender, receiver) = control_queue(1024);
//!
//! let midi = MidiInput::connect(None, ControlSink::new(sender, CcMap::default()))?;
//! let backend = CpalBackend::new();
//! let stream = DuplexStream::start(
//!     &backend,
//!     &descriptor,
//!     &DeviceSelection::default(),
//!     session.into_dispatcher(Some(receiver)),
//! )?;
//! // ... run until interrupted ...
//! midi.close();
//! stream.stop();
//! ```

pub mod backend;
mod cpal_backend;
mod duplex;
mod midi;
mod poller;

pub use backend::{
    AudioBackend, AudioDevice, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback,
    StreamHandle,
};
pub use cpal_backend::CpalBackend;
pub use duplex::{DeviceSelection, DuplexStream};
pub use midi::{ControlSink, MidiHandler, MidiInput, MidiMonitor, MonitorEvent, list_midi_ports};
pub use poller::{ControlPoller, DEFAULT_POLL_INTERVAL};

/// Error types for audio and MIDI I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// MIDI subsystem could not be initialised.
    #[error("MIDI init error: {0}")]
    MidiInit(String),

    /// Opening a MIDI port failed.
    #[error("MIDI connect error: {0}")]
    MidiConnect(String),

    /// No MIDI input port is available.
    #[error("No MIDI input port available")]
    NoMidiPort,

    /// A background thread could not be started.
    #[error("Thread spawn error: {0}")]
    Thread(#[from] std::io::Error),
}

/// Convenience result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
