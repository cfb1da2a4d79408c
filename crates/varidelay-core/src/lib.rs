//! Varidelay Core - real-time delay engine
//!
//! This crate provides the real-time signal path of varidelay: a fractional
//! delay line whose length glides towards a control target, a cascade of
//! one-pole smoothing filters, a feedback mix, and the lock-free plumbing that
//! lets control messages reach the audio thread without blocking it.
//!
//! # Core Abstractions
//!
//! ## Signal Path
//!
//! - [`DelayLine`] - Circular buffer with smoothed, interpolated reads
//! - [`FilterCascade`] - N one-pole stages sharing one coefficient
//! - [`SignalProcessor`] - Per-sample processing trait
//! - [`DelayProcessor`] - Delay, cascade and feedback composed
//!
//! ## Real-Time Entry Point
//!
//! - [`CallbackDispatcher`] - Drains controls, processes a block, fans out channels
//!
//! ## Control Plane
//!
//! - [`ParameterStore`] - Atomic, clamped parameters shared with the audio thread
//! - [`ControlMessage`] / [`ControlTarget`] - Requests to change one parameter
//! - [`control_queue`] - SPSC ring buffer carrying control messages
//! - [`MidiMessage`] / [`CcMap`] - MIDI decoding and controller assignment
//!
//! ## Sessions
//!
//! - [`SessionDescriptor`] - Sample rate, block size, channels, delay range
//! - [`Session`] - Validated composition of all of the above
//!
//! # Example
//!
//! ```rust
//! use varidelay_core::{
//!     control_queue, ControlMessage, ControlTarget, Session, SessionDescriptor,
//! };
//!
//! let descriptor = SessionDescriptor {
//!     sample_rate: 48000.0,
//!     block_size: 128,
//!     ..SessionDescriptor::default()
//! };
//! let session = Session::new(descriptor).unwrap();
//!
//! let (mut controls, receiver) = control_queue(64);
//! let mut dispatcher = session.into_dispatcher(Some(receiver));
//!
//! // Control thread
//! controls.send(ControlMessage::new(ControlTarget::Feedback, 0.4));
//!
//! // Audio thread
//! let input = [0.0f32; 128];
//! let mut output = [0.0f32; 256];
//! dispatcher.process_block(&input, &mut output);
//! assert_eq!(dispatcher.params().snapshot().feedback, 0.4);
//! ```

pub mod cascade;
pub mod control;
pub mod delay;
pub mod dispatcher;
pub mod error;
pub mod midi;
pub mod params;
pub mod processor;
pub mod session;

pub use cascade::{DEFAULT_STAGES, FilterCascade};
pub use control::{
    ControlMessage, ControlReceiver, ControlSender, ControlTarget, DEFAULT_QUEUE_CAPACITY,
    control_queue,
};
pub use delay::DelayLine;
pub use dispatcher::CallbackDispatcher;
pub use error::{Result, SessionError};
pub use midi::{
    CcMap, ChannelMode, DEFAULT_DELAY_CC, DEFAULT_FEEDBACK_CC, DEFAULT_FILTER_CC, MidiMessage,
    cc_to_unit, note_name,
};
pub use params::{AtomicParam, ParamSnapshot, ParameterStore};
pub use processor::{DelayProcessor, SignalProcessor};
pub use session::{
    DEFAULT_BLOCK_SIZE, DEFAULT_GLIDE_SECONDS, DEFAULT_INPUT_CHANNELS, DEFAULT_OUTPUT_CHANNELS,
    DEFAULT_SAMPLE_RATE, MAX_CAPACITY, Session, SessionDescriptor,
};
