//! Session descriptor and composition root.
//!
//! A [`SessionDescriptor`] carries the values fixed for the lifetime of an
//! audio session. [`Session::new`] validates it and builds the processor, the
//! parameter store and the delay line that belong to that session; the session
//! is then handed to the audio thread as a
//! [`CallbackDispatcher`](crate::CallbackDispatcher).

use std::sync::Arc;

use crate::cascade::{DEFAULT_STAGES, FilterCascade};
use crate::control::ControlReceiver;
use crate::delay::DelayLine;
use crate::dispatcher::CallbackDispatcher;
use crate::error::{Result, SessionError};
use crate::params::{DEFAULT_MAX_DELAY_SECONDS, ParamSnapshot, ParameterStore};
use crate::processor::DelayProcessor;

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;
/// Default frames per block.
pub const DEFAULT_BLOCK_SIZE: usize = 512;
/// Default input channel count.
pub const DEFAULT_INPUT_CHANNELS: usize = 1;
/// Default output channel count.
pub const DEFAULT_OUTPUT_CHANNELS: usize = 2;
/// Default delay glide time constant in seconds.
pub const DEFAULT_GLIDE_SECONDS: f32 = 1.0;
/// Largest delay line accepted, in samples (1 GiB of `f32`).
pub const MAX_CAPACITY: usize = 1 << 28;

/// Per-session constants.
///
/// | Field | Constraint | Default |
/// |-------|------------|---------|
/// | `sample_rate` | > 0 | 44100 |
/// | `block_size` | > 0, < capacity | 512 |
/// | `input_channels` | any | 1 |
/// | `output_channels` | >= 1 | 2 |
/// | `max_delay_seconds` | > 0 | 2.0 |
/// | `filter_stages` | >= 1 | 4 |
/// | `glide_seconds` | > 0 | 1.0 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionDescriptor {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Frames per audio callback.
    pub block_size: usize,
    /// Interleaved input channels; only the first is processed.
    pub input_channels: usize,
    /// Interleaved output channels, all receiving the same signal.
    pub output_channels: usize,
    /// Longest delay the line can hold, in seconds.
    pub max_delay_seconds: f32,
    /// Number of one-pole stages in the filter cascade.
    pub filter_stages: usize,
    /// Time constant of delay-length smoothing, in seconds.
    pub glide_seconds: f32,
}

impl Default for SessionDescriptor {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            input_channels: DEFAULT_INPUT_CHANNELS,
            output_channels: DEFAULT_OUTPUT_CHANNELS,
            max_delay_seconds: DEFAULT_MAX_DELAY_SECONDS,
            filter_stages: DEFAULT_STAGES,
            glide_seconds: DEFAULT_GLIDE_SECONDS,
        }
    }
}

impl SessionDescriptor {
    /// Delay line capacity in samples, `floor(sample_rate × max_delay_seconds)`.
    pub fn capacity(&self) -> usize {
        (f64::from(self.sample_rate) * f64::from(self.max_delay_seconds)) as usize
    }

    /// Per-sample smoothing coefficient for the delay line.
    pub fn glide_coefficient(&self) -> f64 {
        (1.0 / (f64::from(self.sample_rate) * f64::from(self.glide_seconds))).min(1.0)
    }

    /// Check every constraint.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SessionError::InvalidSampleRate(self.sample_rate));
        }
        if self.block_size == 0 {
            return Err(SessionError::ZeroBlockSize);
        }
        if self.output_channels == 0 {
            return Err(SessionError::NoOutputChannels);
        }
        if !(self.max_delay_seconds.is_finite() && self.max_delay_seconds > 0.0) {
            return Err(SessionError::InvalidMaxDelay(self.max_delay_seconds));
        }
        if self.filter_stages == 0 {
            return Err(SessionError::NoFilterStages);
        }
        if !(self.glide_seconds.is_finite() && self.glide_seconds > 0.0) {
            return Err(SessionError::InvalidGlide(self.glide_seconds));
        }
        let samples = f64::from(self.sample_rate) * f64::from(self.max_delay_seconds);
        if samples > MAX_CAPACITY as f64 {
            return Err(SessionError::CapacityTooLarge {
                samples,
                max: MAX_CAPACITY,
            });
        }
        let capacity = self.capacity();
        if self.block_size >= capacity {
            return Err(SessionError::BlockExceedsCapacity {
                block_size: self.block_size,
                capacity,
            });
        }
        Ok(())
    }
}

/// One engine session: descriptor, parameters and processor.
///
/// # Example
///
/// ```rust
/// use varidelay_core::{Session, SessionDescriptor};
///
/// let session = Session::new(SessionDescriptor::default()).unwrap();
/// let params = session.params();
/// params.set_feedback(0.4);
///
/// let mut dispatcher = session.into_dispatcher(None);
/// let mut out = vec![0.0; 512 * 2];
/// dispatcher.process_block(&[0.0; 512], &mut out);
/// ```
#[derive(Debug)]
pub struct Session {
    descriptor: SessionDescriptor,
    params: Arc<ParameterStore>,
    processor: DelayProcessor,
}

impl Session {
    /// Build a session with default parameters for its delay range.
    pub fn new(descriptor: SessionDescriptor) -> Result<Self> {
        let initial = ParamSnapshot::defaults_for(descriptor.max_delay_seconds);
        Self::with_params(descriptor, initial)
    }

    /// Build a session whose parameters start at `initial`.
    ///
    /// The delay line starts at `initial.delay` without gliding.
    pub fn with_params(descriptor: SessionDescriptor, initial: ParamSnapshot) -> Result<Self> {
        descriptor.validate()?;

        let params = Arc::new(ParameterStore::new(initial));
        let delay = DelayLine::new(
            descriptor.capacity(),
            descriptor.block_size,
            descriptor.glide_coefficient(),
        )?;
        let cascade = FilterCascade::new(descriptor.filter_stages);
        let processor = DelayProcessor::new(delay, cascade, Arc::clone(&params));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = descriptor.sample_rate,
            block_size = descriptor.block_size,
            capacity = descriptor.capacity(),
            stages = descriptor.filter_stages,
            "session created"
        );

        Ok(Self {
            descriptor,
            params,
            processor,
        })
    }

    /// The validated descriptor.
    pub fn descriptor(&self) -> &SessionDescriptor {
        &self.descriptor
    }

    /// Handle to the shared parameter store.
    pub fn params(&self) -> Arc<ParameterStore> {
        Arc::clone(&self.params)
    }

    /// The delay processor.
    pub fn processor(&self) -> &DelayProcessor {
        &self.processor
    }

    /// Mutable access to the delay processor, for offline rendering.
    pub fn processor_mut(&mut self) -> &mut DelayProcessor {
        &mut self.processor
    }

    /// Move the processor into a dispatcher for the audio thread.
    ///
    /// `controls` is drained at the start of every block when present.
    pub fn into_dispatcher(self, controls: Option<ControlReceiver>) -> CallbackDispatcher<DelayProcessor> {
        CallbackDispatcher::new(
            self.processor,
            self.params,
            controls,
            self.descriptor.input_channels,
            self.descriptor.output_channels,
        )
    }
}
