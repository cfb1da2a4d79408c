//! Real-time block callback.
//!
//! [`CallbackDispatcher`] is the one object the audio thread touches. Each
//! call to [`process_block`](CallbackDispatcher::process_block):
//!
//! 1. applies control messages queued before the call,
//! 2. runs channel 0 of the interleaved input through the processor one frame
//!    at a time,
//! 3. writes each output sample to every output channel of its frame.
//!
//! Nothing in this path allocates, locks, logs or panics. Buffers of any
//! length are accepted; missing input reads as silence and a trailing partial
//! output frame is zeroed.

use std::sync::Arc;

use crate::control::{ControlMessage, ControlReceiver};
use crate::params::ParameterStore;
use crate::processor::SignalProcessor;

/// Drives a [`SignalProcessor`] from interleaved audio buffers.
#[derive(Debug)]
pub struct CallbackDispatcher<P> {
    processor: P,
    params: Arc<ParameterStore>,
    controls: Option<ControlReceiver>,
    input_channels: usize,
    output_channels: usize,
}

impl<P: SignalProcessor> CallbackDispatcher<P> {
    /// Wrap `processor`. `output_channels` of zero is treated as one.
    pub fn new(
        processor: P,
        params: Arc<ParameterStore>,
        controls: Option<ControlReceiver>,
        input_channels: usize,
        output_channels: usize,
    ) -> Self {
        Self {
            processor,
            params,
            controls,
            input_channels,
            output_channels: output_channels.max(1),
        }
    }

    /// Process one block of interleaved audio.
    ///
    /// `output.len() / output_channels` frames are produced.
    #[inline]
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        if let Some(controls) = self.controls.as_mut() {
            controls.drain_into(&self.params);
        }

        let out_ch = self.output_channels;
        let in_ch = self.input_channels;
        let mut frames = output.chunks_exact_mut(out_ch);

        for (n, frame) in (&mut frames).enumerate() {
            let x = if in_ch == 0 {
                0.0
            } else {
                input.get(n * in_ch).copied().unwrap_or(0.0)
            };
            let y = self.processor.process_sample(x);
            frame.fill(y);
        }
        frames.into_remainder().fill(0.0);
    }

    /// Apply control messages delivered as a slice, oldest first.
    pub fn apply_controls(&self, messages: &[ControlMessage]) {
        for &msg in messages {
            self.params.apply(msg);
        }
    }

    /// Shared parameter store.
    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    /// The wrapped processor.
    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Mutable access to the wrapped processor.
    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }

    /// Interleaved input channel count.
    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    /// Interleaved output channel count.
    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// Reset the processor state.
    pub fn reset(&mut self) {
        self.processor.reset();
    }
}
