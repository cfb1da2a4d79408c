//! Session construction errors.
//!
//! Everything that can go wrong in this crate goes wrong while a session is
//! being built. Once a [`Session`](crate::Session) exists, the real-time path
//! has no failure modes: out-of-range control values are clamped and buffer
//! indices are kept in range by modulo arithmetic.

use thiserror::Error;

/// Reasons a [`SessionDescriptor`](crate::SessionDescriptor) is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Sample rate must be finite and positive.
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),

    /// Block size of zero frames.
    #[error("block size must be at least one frame")]
    ZeroBlockSize,

    /// At least one output channel is required.
    #[error("at least one output channel is required")]
    NoOutputChannels,

    /// Maximum delay must be finite and positive.
    #[error("maximum delay must be positive, got {0} s")]
    InvalidMaxDelay(f32),

    /// The filter cascade needs at least one stage.
    #[error("filter cascade needs at least one stage")]
    NoFilterStages,

    /// Glide time must be finite and positive.
    #[error("delay glide time must be positive, got {0} s")]
    InvalidGlide(f32),

    /// `sample_rate × max_delay_seconds` is more samples than a delay line
    /// may hold.
    #[error("delay line of {samples} samples exceeds the limit of {max} samples")]
    CapacityTooLarge {
        /// Requested capacity in samples.
        samples: f64,
        /// Largest accepted capacity.
        max: usize,
    },

    /// The delay line cannot reserve a block of headroom.
    #[error(
        "block size {block_size} does not fit in a delay line of {capacity} samples; \
         raise the maximum delay or lower the block size"
    )]
    BlockExceedsCapacity {
        /// Requested frames per block.
        block_size: usize,
        /// Delay line capacity in samples.
        capacity: usize,
    },
}

/// Convenience alias for session construction results.
pub type Result<T> = std::result::Result<T, SessionError>;
