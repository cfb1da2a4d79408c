//! Duplex audio stream hosting a [`CallbackDispatcher`].
//!
//! Capture and playback run as two backend streams. The input callback pushes
//! interleaved samples into an SPSC ring buffer; the output callback pops
//! input into a scratch buffer allocated before the stream starts and hands
//! both buffers to the dispatcher, chunk by chunk for oversized host buffers. When the ring runs dry the missing
//! input is replaced by silence and counted as an xrun.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ringbuf::{HeapCons, HeapRb, traits::*};
use varidelay_core::{CallbackDispatcher, SessionDescriptor, SignalProcessor};

use crate::Result;
use crate::backend::{AudioBackend, BackendStreamConfig, StreamHandle};

/// Blocks of input buffered between the input and output callbacks.
const RING_BLOCKS: usize = 8;

/// Blocks of input the output callback pulls at a time. Larger host buffers
/// are processed in several chunks.
const SCRATCH_BLOCKS: usize = 4;

/// Which devices to open. `None` selects the system default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSelection {
    /// Capture device name.
    pub input: Option<String>,
    /// Playback device name.
    pub output: Option<String>,
}

/// A running input/output stream pair.
///
/// Dropping the stream (or calling [`stop`](Self::stop)) stops playback
/// first, then capture.
pub struct DuplexStream {
    output: Option<StreamHandle>,
    input: Option<StreamHandle>,
    errors: Arc<AtomicUsize>,
    xruns: Arc<AtomicUsize>,
}

impl DuplexStream {
    /// Open the streams described by `descriptor` and start processing.
    ///
    /// No input stream is opened when `descriptor.input_channels` is 0.
    pub fn start<P>(
        backend: &dyn AudioBackend,
        descriptor: &SessionDescriptor,
        devices: &DeviceSelection,
        mut dispatcher: CallbackDispatcher<P>,
    ) -> Result<Self>
    where
        P: SignalProcessor + 'static,
    {
        let errors = Arc::new(AtomicUsize::new(0));
        let xruns = Arc::new(AtomicUsize::new(0));
        let block = descriptor.block_size;
        let in_ch = descriptor.input_channels;
        let out_ch = descriptor.output_channels.max(1);

        let mut input_handle = None;
        let mut input_cons: Option<HeapCons<f32>> = None;
        if in_ch > 0 {
            let (mut prod, cons) = HeapRb::<f32>::new(block * in_ch * RING_BLOCKS).split();
            let overruns = Arc::clone(&xruns);
            let config = BackendStreamConfig {
                sample_rate: descriptor.sample_rate as u32,
                buffer_size: block as u32,
                channels: in_ch as u16,
                device_name: devices.input.clone(),
            };
            input_handle = Some(backend.build_input_stream(
                &config,
                Box::new(move |data: &[f32]| {
                    if prod.push_slice(data) < data.len() {
                        overruns.fetch_add(1, Ordering::Relaxed);
                    }
                }),
                error_counter(&errors, "input"),
            )?);
            input_cons = Some(cons);
        }

        let mut scratch = vec![0.0f32; block * in_ch * SCRATCH_BLOCKS];
        let chunk_len = block * SCRATCH_BLOCKS * out_ch;
        let underruns = Arc::clone(&xruns);
        let config = BackendStreamConfig {
            sample_rate: descriptor.sample_rate as u32,
            buffer_size: block as u32,
            channels: out_ch as u16,
            device_name: devices.output.clone(),
        };
        let output_handle = backend.build_output_stream(
            &config,
            Box::new(move |data: &mut [f32]| {
                let mut short = false;
                for chunk in data.chunks_mut(chunk_len) {
                    let wanted = chunk.len() / out_ch * in_ch;
                    let got = input_cons
                        .as_mut()
                        .map_or(0, |cons| cons.pop_slice(&mut scratch[..wanted]));
                    if got < wanted {
                        scratch[got..wanted].fill(0.0);
                        short = true;
                    }
                    dispatcher.process_block(&scratch[..wanted], chunk);
                }
                if short {
                    underruns.fetch_add(1, Ordering::Relaxed);
                }
            }),
            error_counter(&errors, "output"),
        )?;

        tracing::info!(
            backend = backend.name(),
            sample_rate = descriptor.sample_rate,
            block_size = block,
            input_channels = in_ch,
            output_channels = out_ch,
            "audio stream running"
        );

        Ok(Self {
            output: Some(output_handle),
            input: input_handle,
            errors,
            xruns,
        })
    }

    /// Stream errors reported by the backend so far.
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// Input overruns plus underruns so far.
    pub fn xrun_count(&self) -> usize {
        self.xruns.load(Ordering::Relaxed)
    }

    /// Whether a capture stream is open.
    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    /// Stop playback, then capture.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for DuplexStream {
    fn drop(&mut self) {
        if self.output.take().is_some() {
            self.input.take();
            tracing::info!(
                errors = self.error_count(),
                xruns = self.xrun_count(),
                "audio stream stopped"
            );
        }
    }
}

impl std::fmt::Debug for DuplexStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplexStream")
            .field("has_input", &self.has_input())
            .field("errors", &self.error_count())
            .field("xruns", &self.xrun_count())
            .finish()
    }
}

fn error_counter(errors: &Arc<AtomicUsize>, direction: &'static str) -> crate::ErrorCallback {
    let errors = Arc::clone(errors);
    Box::new(move |msg: &str| {
        errors.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(direction, "stream error: {msg}");
    })
}
