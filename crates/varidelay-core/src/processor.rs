//! Per-sample signal processing.
//!
//! [`SignalProcessor`] is the capability the
//! [`CallbackDispatcher`](crate::CallbackDispatcher) drives: one mono sample
//! in, one mono sample out. [`DelayProcessor`] is the delay-with-feedback
//! implementation; other processors can be dropped into a dispatcher without
//! touching it.
//!
//! ## Design Decisions
//!
//! - **Mono processing**: the dispatcher fans one output sample out to every
//!   channel, so processors only ever see a single stream.
//! - **Parameters read per sample**: a processor takes a fresh
//!   [`ParamSnapshot`](crate::ParamSnapshot) for every sample rather than per
//!   block, so control changes land on the very next sample.
//! - **No allocations**: every method is callable from the audio callback.

use std::sync::Arc;

use crate::cascade::FilterCascade;
use crate::delay::DelayLine;
use crate::params::ParameterStore;

/// Core trait for real-time mono processors.
///
/// # Example
///
/// ```rust
/// use varidelay_core::SignalProcessor;
///
/// struct Gain(f32);
///
/// impl SignalProcessor for Gain {
///     fn process_sample(&mut self, input: f32) -> f32 {
///         input * self.0
///     }
///
///     fn reset(&mut self) {}
/// }
///
/// let mut g = Gain(0.5);
/// assert_eq!(g.process_sample(1.0), 0.5);
/// ```
pub trait SignalProcessor: Send {
    /// Process a single sample, advancing internal state by one step.
    fn process_sample(&mut self, input: f32) -> f32;

    /// Process a block of samples.
    ///
    /// Default implementation calls `process_sample()` for each pair of
    /// samples; extra samples in the longer buffer are left untouched.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process_sample(*inp);
        }
    }

    /// Clear internal state without touching parameters.
    fn reset(&mut self);
}

/// Delay line, filter cascade and feedback mix.
///
/// For every sample:
///
/// ```text
/// p    = params.snapshot()
/// out  = cascade.apply(delay.read(p.delay), p.coefficient)
/// feed = input * (1 - p.feedback) + out * p.feedback
/// delay.write(feed)
/// ```
///
/// The read happens before the write, so a sample never hears itself within
/// the same step. With `feedback < 1` the feed is a convex combination of
/// bounded values and the output stays bounded by the input peak.
#[derive(Debug)]
pub struct DelayProcessor {
    delay: DelayLine,
    cascade: FilterCascade,
    params: Arc<ParameterStore>,
}

impl DelayProcessor {
    /// Assemble a processor from its parts.
    ///
    /// The smoothed delay starts at the store's current target, so a session
    /// does not glide in from zero.
    pub fn new(mut delay: DelayLine, cascade: FilterCascade, params: Arc<ParameterStore>) -> Self {
        delay.snap_delay(params.snapshot().delay);
        Self {
            delay,
            cascade,
            params,
        }
    }

    /// Shared parameter store.
    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    /// The delay line.
    pub fn delay_line(&self) -> &DelayLine {
        &self.delay
    }

    /// The filter cascade.
    pub fn cascade(&self) -> &FilterCascade {
        &self.cascade
    }
}

impl SignalProcessor for DelayProcessor {
    #[inline]
    fn process_sample(&mut self, input: f32) -> f32 {
        let p = self.params.snapshot();
        let out = self
            .cascade
            .apply(self.delay.read(p.delay), p.coefficient);
        let feed = input * (1.0 - p.feedback) + out * p.feedback;
        self.delay.write(feed);
        out
    }

    fn reset(&mut self) {
        self.delay.clear();
        self.cascade.reset();
    }
}
