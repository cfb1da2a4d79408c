//! Lock-free parameter storage shared between the control plane and the
//! audio thread.
//!
//! Every parameter is a normalized `f32` in `[0, 1]` stored as raw bits in an
//! [`AtomicU32`]. Control threads write with `Release` ordering, the audio
//! thread reads with `Acquire`, so a value written before a control message is
//! acknowledged is visible to the next processed sample. Neither side ever
//! blocks.
//!
//! | Parameter | Meaning | Default |
//! |-----------|---------|---------|
//! | `delay` | Fraction of the usable delay line | `0.1 s / max_delay_seconds` |
//! | `feedback` | Share of the output mixed back into the line | `0.0` |
//! | `coefficient` | One-pole smoothing coefficient (1 = no smoothing) | `0.5` |
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use varidelay_core::ParameterStore;
//!
//! let params = Arc::new(ParameterStore::default());
//! params.set_feedback(1.7);
//! assert_eq!(params.snapshot().feedback, 1.0);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

use crate::control::{ControlMessage, ControlTarget};

/// Delay time used for the initial delay target, in seconds.
pub const DEFAULT_DELAY_SECONDS: f32 = 0.1;

/// Initial feedback amount.
pub const DEFAULT_FEEDBACK: f32 = 0.0;

/// Initial filter coefficient.
pub const DEFAULT_COEFFICIENT: f32 = 0.5;

/// Maximum delay assumed by [`ParamSnapshot::default`], in seconds.
pub const DEFAULT_MAX_DELAY_SECONDS: f32 = 2.0;

/// A thread-safe normalized parameter using bit-cast f32.
///
/// Control thread writes, audio thread reads. No locks, no allocations.
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicU32,
    default: f32,
}

impl AtomicParam {
    /// Create a parameter holding `default` (clamped to `[0, 1]`).
    pub fn new(default: f32) -> Self {
        let default = clamp_unit(default).unwrap_or(0.0);
        Self {
            value: AtomicU32::new(default.to_bits()),
            default,
        }
    }

    /// Store `v` clamped to `[0, 1]`. NaN is ignored.
    #[inline]
    pub fn set(&self, v: f32) {
        if let Some(clamped) = clamp_unit(v) {
            self.value.store(clamped.to_bits(), Ordering::Release);
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Reset to the construction default.
    pub fn reset(&self) {
        self.value.store(self.default.to_bits(), Ordering::Release);
    }
}

#[inline]
fn clamp_unit(v: f32) -> Option<f32> {
    if v.is_nan() {
        None
    } else {
        Some(v.clamp(0.0, 1.0))
    }
}

/// Value copy of all parameters, taken once per processed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    /// Normalized target delay in `[0, 1]`.
    pub delay: f32,
    /// Feedback amount in `[0, 1]`.
    pub feedback: f32,
    /// Filter coefficient in `[0, 1]`.
    pub coefficient: f32,
}

impl ParamSnapshot {
    /// Startup values for a line holding `max_delay_seconds` of audio: a
    /// 100 ms delay, no feedback and a half-strength filter.
    pub fn defaults_for(max_delay_seconds: f32) -> Self {
        let delay = if max_delay_seconds > 0.0 {
            (DEFAULT_DELAY_SECONDS / max_delay_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            delay,
            feedback: DEFAULT_FEEDBACK,
            coefficient: DEFAULT_COEFFICIENT,
        }
    }
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self::defaults_for(DEFAULT_MAX_DELAY_SECONDS)
    }
}

/// The three control parameters of a delay session.
///
/// Shared as `Arc<ParameterStore>`: the control plane calls the setters, the
/// signal processor calls [`snapshot`](Self::snapshot).
#[derive(Debug)]
pub struct ParameterStore {
    delay: AtomicParam,
    feedback: AtomicParam,
    coefficient: AtomicParam,
}

impl ParameterStore {
    /// Create a store starting at `initial` (each field clamped to `[0, 1]`).
    pub fn new(initial: ParamSnapshot) -> Self {
        Self {
            delay: AtomicParam::new(initial.delay),
            feedback: AtomicParam::new(initial.feedback),
            coefficient: AtomicParam::new(initial.coefficient),
        }
    }

    /// Set the normalized target delay.
    #[inline]
    pub fn set_delay(&self, v: f32) {
        self.delay.set(v);
    }

    /// Set the feedback amount.
    #[inline]
    pub fn set_feedback(&self, v: f32) {
        self.feedback.set(v);
    }

    /// Set the filter coefficient.
    #[inline]
    pub fn set_filter_coefficient(&self, v: f32) {
        self.coefficient.set(v);
    }

    /// Route a control message to the matching setter.
    #[inline]
    pub fn apply(&self, msg: ControlMessage) {
        match msg.target {
            ControlTarget::Delay => self.set_delay(msg.value),
            ControlTarget::Feedback => self.set_feedback(msg.value),
            ControlTarget::Filter => self.set_filter_coefficient(msg.value),
        }
    }

    /// Read all three parameters.
    #[inline]
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            delay: self.delay.get(),
            feedback: self.feedback.get(),
            coefficient: self.coefficient.get(),
        }
    }

    /// Restore every parameter to its construction value.
    pub fn reset(&self) {
        self.delay.reset();
        self.feedback.reset();
        self.coefficient.reset();
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(ParamSnapshot::default())
    }
}
